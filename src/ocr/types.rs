//! OCR Types

/// OCR error types
#[derive(Debug, thiserror::Error)]
pub enum OcrError {
    #[error("Failed to run OCR engine: {0}")]
    Spawn(#[source] std::io::Error),

    #[cfg(test)]
    #[error("OCR processing failed: {0}")]
    ProcessingError(String),
}
