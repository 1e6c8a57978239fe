//! Markdown to PDF
//!
//! Markdown is rendered to a standalone HTML document, which LibreOffice then
//! prints to PDF.

use pulldown_cmark::{html, Options, Parser};
use thiserror::Error;

use crate::office::{ConversionError, OfficeConverter};
use crate::scratch::ScratchFile;

#[derive(Debug, Error)]
pub enum MarkdownError {
    #[error("Markdown file is not valid UTF-8")]
    InvalidEncoding,

    #[error("Failed to convert Markdown to PDF: {0}")]
    Conversion(#[from] ConversionError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Render Markdown as a complete HTML document
pub fn markdown_to_html(markdown: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);

    let mut body = String::new();
    html::push_html(&mut body, Parser::new_ext(markdown, options));

    format!(
        r#"<!DOCTYPE html>
<html>
<head>
<meta charset="UTF-8">
<style>
body {{ font-family: Arial, sans-serif; margin: 40px; }}
table {{ border-collapse: collapse; }}
td, th {{ border: 1px solid #ddd; padding: 8px; }}
pre {{ background: #f5f5f5; padding: 8px; }}
</style>
</head>
<body>
{}
</body>
</html>"#,
        body
    )
}

/// Convert raw Markdown bytes to PDF bytes
pub async fn markdown_to_pdf(converter: &OfficeConverter, data: &[u8]) -> Result<Vec<u8>, MarkdownError> {
    let markdown = std::str::from_utf8(data).map_err(|_| MarkdownError::InvalidEncoding)?;
    let html = markdown_to_html(markdown);

    let source = ScratchFile::write(converter.scratch_dir(), "markdown", ".html", html.as_bytes()).await?;
    Ok(converter.convert_path(source.path()).await?)
}
