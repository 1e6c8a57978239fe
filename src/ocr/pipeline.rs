//! Multi-page OCR
//!
//! Pages are recognized one after another. A failure on one page is recorded
//! inline in that page's text and the remaining pages are still processed.

use std::path::Path;

use serde::Serialize;

use super::engine::OcrEngine;

/// Recognized text for one page (1-indexed)
#[derive(Debug, Clone, Serialize)]
pub struct PageText {
    pub page: usize,
    pub text: String,
    /// Whether `text` is an inline error marker
    #[serde(skip)]
    pub failed: bool,
}

/// Header written before each page's text
pub fn page_marker(page: usize) -> String {
    format!("--- Page {} ---", page)
}

/// Run OCR over each image in order
pub async fn ocr_pages<P: AsRef<Path>>(
    engine: &dyn OcrEngine,
    images: &[P],
    languages: &str,
) -> Vec<PageText> {
    let mut pages = Vec::with_capacity(images.len());

    for (index, image) in images.iter().enumerate() {
        let page = index + 1;
        match engine.recognize(image.as_ref(), languages).await {
            Ok(text) => {
                tracing::debug!(page, chars = text.len(), "Page recognized");
                pages.push(PageText {
                    page,
                    text,
                    failed: false,
                });
            }
            Err(e) => {
                tracing::warn!(page, engine = engine.name(), "OCR failed for page: {}", e);
                pages.push(PageText {
                    page,
                    text: format!("[OCR failed for page {}: {}]", page, e),
                    failed: true,
                });
            }
        }
    }

    pages
}

/// Concatenate page results into one text blob
pub fn render_pages(pages: &[PageText]) -> String {
    let mut output = String::new();
    for page in pages {
        output.push_str(&page_marker(page.page));
        output.push('\n');
        output.push_str(&page.text);
        output.push_str("\n\n");
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ocr::MockEngine;
    use std::path::PathBuf;

    fn images(n: usize) -> Vec<PathBuf> {
        (0..n).map(|i| PathBuf::from(format!("/tmp/page_{}.png", i))).collect()
    }

    #[tokio::test]
    async fn test_markers_in_order() {
        let engine = MockEngine::new("hello");
        let pages = ocr_pages(&engine, &images(3), "eng").await;
        let blob = render_pages(&pages);

        assert_eq!(blob.matches("--- Page ").count(), 3);
        let p1 = blob.find("--- Page 1 ---").unwrap();
        let p2 = blob.find("--- Page 2 ---").unwrap();
        let p3 = blob.find("--- Page 3 ---").unwrap();
        assert!(p1 < p2 && p2 < p3);
        assert!(blob.starts_with("--- Page 1 ---\nhello\n\n"));
    }

    #[tokio::test]
    async fn test_page_failure_does_not_abort_batch() {
        let mut engine = MockEngine::new("text");
        engine.fail_on = Some(1);

        let pages = ocr_pages(&engine, &images(3), "eng").await;

        assert_eq!(pages.len(), 3);
        assert!(!pages[0].failed);
        assert!(pages[1].failed);
        assert!(pages[1].text.starts_with("[OCR failed for page 2:"));
        assert_eq!(pages[2].text, "text");
    }

    #[tokio::test]
    async fn test_no_pages() {
        let engine = MockEngine::new("unused");
        let pages = ocr_pages(&engine, &images(0), "eng").await;

        assert!(pages.is_empty());
        assert_eq!(render_pages(&pages), "");
    }
}
