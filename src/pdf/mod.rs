//! PDF rasterization via MuPDF
//!
//! Turns each page of a PDF into an RGB bitmap at a fixed DPI. The OCR route
//! writes the pages out as PNG scratch files for tesseract; the screenshot
//! routes keep them in memory for cropping.

mod rasterizer;

pub use rasterizer::{RasterError, Rasterizer};
