//! Page rasterizer
//!
//! MuPDF documents are not thread-safe, so every document is opened, rendered
//! and dropped inside a single `spawn_blocking` task. Only owned bytes or
//! paths go in and only decoded images or scratch files come out.

use std::path::{Path, PathBuf};

use image::{DynamicImage, RgbaImage};
use mupdf::{Colorspace, Document, Matrix};
use thiserror::Error;

use crate::scratch::ScratchFile;

/// PDF points per inch
const POINTS_PER_INCH: f32 = 72.0;

#[derive(Debug, Error)]
pub enum RasterError {
    /// The input could not be opened as a PDF
    #[error("Failed to open PDF: {0}")]
    Open(String),

    #[error("Failed to render page {page}: {message}")]
    Render { page: usize, message: String },

    #[error("Image error: {0}")]
    ImageError(String),

    #[error("Task join error: {0}")]
    Join(String),
}

enum Source {
    Bytes(Vec<u8>),
    Path(PathBuf),
}

/// Renders PDF pages at a fixed resolution
#[derive(Debug, Clone, Copy)]
pub struct Rasterizer {
    dpi: u32,
}

impl Rasterizer {
    pub fn new(dpi: u32) -> Self {
        Self { dpi: dpi.max(1) }
    }

    fn scale(&self) -> f32 {
        self.dpi as f32 / POINTS_PER_INCH
    }

    /// Render every page of an in-memory PDF
    pub async fn render_bytes(&self, data: Vec<u8>) -> Result<Vec<DynamicImage>, RasterError> {
        let scale = self.scale();
        tokio::task::spawn_blocking(move || {
            let doc = open_document(&Source::Bytes(data))?;
            render_document(&doc, scale)
        })
        .await
        .map_err(|e| RasterError::Join(e.to_string()))?
    }

    /// Render every page of a PDF on disk to PNG scratch files in `dir`.
    ///
    /// Files are returned in page order. If any page fails, the files already
    /// written are removed along with the dropped guards.
    pub async fn render_to_png_files(
        &self,
        pdf_path: &Path,
        dir: &Path,
    ) -> Result<Vec<ScratchFile>, RasterError> {
        let scale = self.scale();
        let source = Source::Path(pdf_path.to_path_buf());
        let dir = dir.to_path_buf();

        tokio::task::spawn_blocking(move || {
            let doc = open_document(&source)?;
            let page_count = doc
                .page_count()
                .map_err(|e| RasterError::Open(e.to_string()))? as usize;

            let mut files = Vec::with_capacity(page_count);
            for index in 0..page_count {
                let image = render_page(&doc, index, scale)?;
                let file = ScratchFile::reserve(&dir, &format!("page_{}", index + 1), ".png");
                image
                    .save_with_format(file.path(), image::ImageFormat::Png)
                    .map_err(|e| RasterError::ImageError(e.to_string()))?;
                files.push(file);
            }
            Ok(files)
        })
        .await
        .map_err(|e| RasterError::Join(e.to_string()))?
    }
}

fn open_document(source: &Source) -> Result<Document, RasterError> {
    let doc = match source {
        Source::Bytes(data) => Document::from_bytes(data, "application/pdf"),
        Source::Path(path) => Document::open(&*path.to_string_lossy()),
    };
    doc.map_err(|e| RasterError::Open(e.to_string()))
}

fn render_document(doc: &Document, scale: f32) -> Result<Vec<DynamicImage>, RasterError> {
    let page_count = doc
        .page_count()
        .map_err(|e| RasterError::Open(e.to_string()))? as usize;

    let mut pages = Vec::with_capacity(page_count);
    for index in 0..page_count {
        pages.push(render_page(doc, index, scale)?);
    }

    tracing::debug!(pages = pages.len(), scale, "Rasterized PDF");
    Ok(pages)
}

fn render_page(doc: &Document, index: usize, scale: f32) -> Result<DynamicImage, RasterError> {
    let render_err = |e: mupdf::Error| RasterError::Render {
        page: index + 1,
        message: e.to_string(),
    };

    let page = doc.load_page(index as i32).map_err(render_err)?;
    let matrix = Matrix::new_scale(scale, scale);
    let colorspace = Colorspace::device_rgb();
    // No alpha: transparent page backgrounds come out white
    let pixmap = page
        .to_pixmap(&matrix, &colorspace, false, true)
        .map_err(render_err)?;

    pixmap_to_image(&pixmap)
}

fn pixmap_to_image(pixmap: &mupdf::Pixmap) -> Result<DynamicImage, RasterError> {
    let width = pixmap.width() as u32;
    let height = pixmap.height() as u32;
    let samples = pixmap.samples();
    let n = pixmap.n() as usize;

    let mut rgba_buffer = Vec::with_capacity((width * height * 4) as usize);

    for y in 0..height as usize {
        for x in 0..width as usize {
            let offset = (y * width as usize + x) * n;
            let r = samples.get(offset).copied().unwrap_or(0);
            let g = samples.get(offset + 1).copied().unwrap_or(r);
            let b = samples.get(offset + 2).copied().unwrap_or(r);
            let a = if n >= 4 {
                samples.get(offset + 3).copied().unwrap_or(255)
            } else {
                255
            };
            rgba_buffer.extend_from_slice(&[r, g, b, a]);
        }
    }

    let img = RgbaImage::from_raw(width, height, rgba_buffer)
        .ok_or_else(|| RasterError::ImageError("Failed to create image buffer".to_string()))?;

    // Pages are opaque; drop the alpha channel
    Ok(DynamicImage::ImageRgb8(DynamicImage::ImageRgba8(img).to_rgb8()))
}
