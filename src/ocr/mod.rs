//! OCR Module
//!
//! Runs the external `tesseract` binary over page images and assembles the
//! recognized text.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use ocr_service::ocr::{ocr_pages, render_pages, OcrEngine, TesseractEngine};
//!
//! let engine = TesseractEngine::new("tesseract", 3);
//! let text = engine.recognize(Path::new("/tmp/page.png"), "eng+deu").await?;
//!
//! // Multi-page: one `--- Page N ---` block per image
//! let pages = ocr_pages(&engine, &image_paths, "eng").await;
//! let blob = render_pages(&pages);
//! ```

mod engine;
mod pipeline;
mod types;

pub use engine::{OcrEngine, TesseractEngine};
pub use pipeline::{ocr_pages, page_marker, render_pages, PageText};
pub use types::OcrError;

#[cfg(test)]
pub use engine::MockEngine;
