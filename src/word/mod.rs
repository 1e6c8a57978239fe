//! Word document processing
//!
//! The preferred path converts the document to PDF and screenshots each page.
//! When that fails, text is read straight out of the document structure:
//!
//! - `.docx`: paragraphs from `word/document.xml`, grouped into pseudo-pages
//! - `.doc`: the main text stream of the OLE compound file, chunked by length

mod doc;
mod docx;
mod fallback;

pub use doc::extract_doc_text;
pub use docx::{extract_docx_pages, PARAGRAPHS_PER_PAGE};
pub use fallback::{
    chunk_text, extract_text_pages, ProcessingMethod, WordOutcome, WordPage, WordProcessor,
    EMPTY_DOCUMENT_PLACEHOLDER, LEGACY_CHUNK_CHARS,
};

use thiserror::Error;

/// Direct text extraction errors
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("Failed to read DOCX archive: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("Failed to parse document XML: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("Failed to read legacy document: {0}")]
    Compound(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}
