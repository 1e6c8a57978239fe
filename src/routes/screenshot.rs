//! POST /screenshot - three overlapping band screenshots per page

use axum::{
    extract::{Multipart, State},
    Json,
};
use serde::Serialize;

use super::upload::Upload;
use crate::error::{AppError, Result};
use crate::office::WordFormat;
use crate::screenshot::{screenshot_pages, PageScreenshots};
use crate::state::AppState;

const UNSUPPORTED_DOCUMENT: &str =
    "Unsupported file type. Only .pdf, .doc, and .docx are supported.";

#[derive(Serialize)]
pub struct ScreenshotResponse {
    pub pages: Vec<PageScreenshots>,
}

enum DocumentKind {
    Pdf,
    Word(WordFormat),
}

impl DocumentKind {
    fn from_extension(ext: &str) -> Option<Self> {
        if ext == "pdf" {
            return Some(Self::Pdf);
        }
        WordFormat::from_extension(ext).map(Self::Word)
    }
}

pub async fn screenshot(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<ScreenshotResponse>> {
    let upload = Upload::from_multipart(&mut multipart).await?;
    let kind = upload
        .extension()
        .as_deref()
        .and_then(DocumentKind::from_extension)
        .ok_or(AppError::UnsupportedFileType(UNSUPPORTED_DOCUMENT))?;
    upload.ensure_not_empty()?;

    let pdf = match kind {
        DocumentKind::Pdf => upload.data.to_vec(),
        DocumentKind::Word(format) => state
            .converter()
            .convert_bytes(&upload.data, format)
            .await
            .map_err(|source| AppError::Conversion {
                context: "Failed to convert Word document to PDF.",
                source,
            })?,
    };

    let images = state
        .rasterizer()
        .render_bytes(pdf)
        .await
        .map_err(|source| AppError::Rasterize {
            context: "Failed to convert document to images.",
            source,
        })?;

    let pages = screenshot_pages(images).await?;

    tracing::info!(file_name = %upload.file_name, pages = pages.len(), "Screenshots generated");
    Ok(Json(ScreenshotResponse { pages }))
}
