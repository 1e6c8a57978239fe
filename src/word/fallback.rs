//! Convert-then-screenshot, else extract text directly

use serde::Serialize;
use thiserror::Error;

use super::{doc::extract_doc_text, docx::extract_docx_pages, ExtractionError};
use crate::office::{ConversionError, OfficeConverter, WordFormat};
use crate::pdf::{RasterError, Rasterizer};
use crate::screenshot::{screenshot_pages, PageScreenshots, ScreenshotError};

/// Characters per pseudo-page for legacy `.doc` text
pub const LEGACY_CHUNK_CHARS: usize = 3000;

/// Single page returned when no text could be recovered
pub const EMPTY_DOCUMENT_PLACEHOLDER: &str =
    "The document appears to be empty or could not be read.";

/// Which path produced the pages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessingMethod {
    Screenshot,
    TextExtraction,
}

/// One page of a processed Word document
#[derive(Debug, Clone, Serialize)]
pub struct WordPage {
    pub page: usize,
    pub screenshots: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

/// Result of the two-step attempt sequence
#[derive(Debug)]
pub enum WordOutcome {
    /// Converted to PDF and screenshotted
    Converted(Vec<PageScreenshots>),
    /// Text read directly from the document; never empty
    Extracted(Vec<String>),
    /// Both steps failed
    Failed(String),
}

impl WordOutcome {
    pub fn method(&self) -> ProcessingMethod {
        match self {
            Self::Converted(_) => ProcessingMethod::Screenshot,
            Self::Extracted(_) | Self::Failed(_) => ProcessingMethod::TextExtraction,
        }
    }

    /// Response pages; a failed extraction becomes the placeholder page
    pub fn into_pages(self) -> Vec<WordPage> {
        match self {
            Self::Converted(pages) => pages
                .into_iter()
                .map(|p| WordPage {
                    page: p.page,
                    screenshots: p.screenshots,
                    text: None,
                })
                .collect(),
            Self::Extracted(texts) => text_pages(texts),
            Self::Failed(_) => text_pages(vec![EMPTY_DOCUMENT_PLACEHOLDER.to_string()]),
        }
    }
}

fn text_pages(texts: Vec<String>) -> Vec<WordPage> {
    texts
        .into_iter()
        .enumerate()
        .map(|(index, text)| WordPage {
            page: index + 1,
            screenshots: Vec::new(),
            text: Some(text),
        })
        .collect()
}

#[derive(Debug, Error)]
enum ScreenshotAttemptError {
    #[error(transparent)]
    Conversion(#[from] ConversionError),

    #[error(transparent)]
    Rasterize(#[from] RasterError),

    #[error(transparent)]
    Screenshot(#[from] ScreenshotError),

    #[error("converted PDF has no pages")]
    NoPages,
}

/// Split text into chunks of at most `size` characters, dropping blank ones
pub fn chunk_text(text: &str, size: usize) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    chars
        .chunks(size.max(1))
        .map(|chunk| chunk.iter().collect::<String>())
        .filter(|chunk| !chunk.trim().is_empty())
        .collect()
}

/// Pseudo-pages of text read straight from the document structure
pub fn extract_text_pages(data: &[u8], format: WordFormat) -> Result<Vec<String>, ExtractionError> {
    match format {
        WordFormat::Docx => extract_docx_pages(data),
        WordFormat::Doc => Ok(chunk_text(&extract_doc_text(data)?, LEGACY_CHUNK_CHARS)),
    }
}

/// Runs the Word fallback chain
pub struct WordProcessor<'a> {
    converter: &'a OfficeConverter,
    rasterizer: Rasterizer,
}

impl<'a> WordProcessor<'a> {
    pub fn new(converter: &'a OfficeConverter, rasterizer: Rasterizer) -> Self {
        Self {
            converter,
            rasterizer,
        }
    }

    pub async fn process(&self, data: &[u8], format: WordFormat) -> WordOutcome {
        match self.screenshots(data, format).await {
            Ok(pages) => {
                tracing::info!(pages = pages.len(), "Word document converted and screenshotted");
                return WordOutcome::Converted(pages);
            }
            Err(e) => tracing::warn!(
                format = format.extension(),
                "Word conversion failed, falling back to text extraction: {}",
                e
            ),
        }

        match extract_text_pages(data, format) {
            Ok(pages) if pages.is_empty() => {
                tracing::info!("No text recovered from Word document");
                WordOutcome::Extracted(vec![EMPTY_DOCUMENT_PLACEHOLDER.to_string()])
            }
            Ok(pages) => {
                tracing::info!(pages = pages.len(), "Extracted Word document text");
                WordOutcome::Extracted(pages)
            }
            Err(e) => {
                tracing::error!("Word text extraction failed: {}", e);
                WordOutcome::Failed(e.to_string())
            }
        }
    }

    async fn screenshots(
        &self,
        data: &[u8],
        format: WordFormat,
    ) -> Result<Vec<PageScreenshots>, ScreenshotAttemptError> {
        let pdf = self.converter.convert_bytes(data, format).await?;
        let images = self.rasterizer.render_bytes(pdf).await?;
        if images.is_empty() {
            return Err(ScreenshotAttemptError::NoPages);
        }
        Ok(screenshot_pages(images).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::word::{doc::build_doc, docx::build_docx};
    use std::time::Duration;
    use tempfile::TempDir;

    fn failing_converter(temp_dir: &TempDir) -> OfficeConverter {
        OfficeConverter::new("/nonexistent/soffice", Duration::from_secs(1), temp_dir.path())
    }

    #[test]
    fn test_chunk_text() {
        let text = "a".repeat(7000);
        let chunks = chunk_text(&text, LEGACY_CHUNK_CHARS);

        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].chars().count(), 3000);
        assert_eq!(chunks[2].chars().count(), 1000);
    }

    #[test]
    fn test_chunk_text_multibyte_and_blank() {
        assert_eq!(chunk_text("ąčęė", 3), vec!["ąčę".to_string(), "ė".to_string()]);
        assert!(chunk_text("   \n ", 3).is_empty());
    }

    #[tokio::test]
    async fn test_docx_falls_back_to_extraction() {
        let temp_dir = TempDir::new().unwrap();
        let converter = failing_converter(&temp_dir);
        let processor = WordProcessor::new(&converter, Rasterizer::new(72));
        let docx = build_docx("<w:p><w:r><w:t>Fallback text</w:t></w:r></w:p>");

        let outcome = processor.process(&docx, WordFormat::Docx).await;

        assert_eq!(outcome.method(), ProcessingMethod::TextExtraction);
        let pages = outcome.into_pages();
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].text.as_deref(), Some("Fallback text"));
        assert!(pages[0].screenshots.is_empty());
    }

    #[tokio::test]
    async fn test_legacy_doc_falls_back_to_chunks() {
        let temp_dir = TempDir::new().unwrap();
        let converter = failing_converter(&temp_dir);
        let processor = WordProcessor::new(&converter, Rasterizer::new(72));
        let doc = build_doc(&"x".repeat(3500), true);

        let outcome = processor.process(&doc, WordFormat::Doc).await;

        match &outcome {
            WordOutcome::Extracted(pages) => assert_eq!(pages.len(), 2),
            other => panic!("expected extraction, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_corrupt_document_yields_placeholder() {
        let temp_dir = TempDir::new().unwrap();
        let converter = failing_converter(&temp_dir);
        let processor = WordProcessor::new(&converter, Rasterizer::new(72));

        let outcome = processor.process(b"corrupted bytes", WordFormat::Docx).await;

        assert!(matches!(outcome, WordOutcome::Failed(_)));
        assert_eq!(outcome.method(), ProcessingMethod::TextExtraction);
        let pages = outcome.into_pages();
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].text.as_deref(), Some(EMPTY_DOCUMENT_PLACEHOLDER));
    }

    #[tokio::test]
    async fn test_empty_docx_yields_placeholder() {
        let temp_dir = TempDir::new().unwrap();
        let converter = failing_converter(&temp_dir);
        let processor = WordProcessor::new(&converter, Rasterizer::new(72));

        let outcome = processor.process(&build_docx(""), WordFormat::Docx).await;

        match outcome {
            WordOutcome::Extracted(pages) => assert_eq!(pages, vec![EMPTY_DOCUMENT_PLACEHOLDER.to_string()]),
            other => panic!("expected extraction, got {:?}", other),
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_conversion_success_uses_screenshots() {
        use crate::test_support::{blank_pdf, fake_binary};

        let temp_dir = TempDir::new().unwrap();
        // Copy a real PDF to the expected output path
        let fixture = temp_dir.path().join("fixture.pdf");
        std::fs::write(&fixture, blank_pdf(2)).unwrap();
        let script = format!(
            r#"stem=$(basename "$7"); stem="${{stem%.*}}"; cp "{}" "$6/$stem.pdf""#,
            fixture.display()
        );
        let binary = fake_binary(temp_dir.path(), "soffice", &script);
        let scratch = temp_dir.path().join("scratch");
        std::fs::create_dir(&scratch).unwrap();
        let converter = OfficeConverter::new(binary, Duration::from_secs(10), &scratch);
        let processor = WordProcessor::new(&converter, Rasterizer::new(36));

        let outcome = processor.process(&build_docx(""), WordFormat::Docx).await;

        assert_eq!(outcome.method(), ProcessingMethod::Screenshot);
        let pages = outcome.into_pages();
        assert_eq!(pages.len(), 2);
        assert!(pages.iter().all(|p| p.screenshots.len() == 3 && p.text.is_none()));
        assert_eq!(std::fs::read_dir(&scratch).unwrap().count(), 0);
    }
}
