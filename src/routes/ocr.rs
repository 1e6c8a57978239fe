//! OCR routes
//!
//! - POST /ocr - OCR every page of a PDF
//! - POST /ocr-image - OCR a single PNG/JPEG image

use axum::{
    extract::{Multipart, Query, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use super::upload::Upload;
use crate::error::{AppError, Result};
use crate::ocr::{ocr_pages, render_pages};
use crate::scratch::ScratchFile;
use crate::state::AppState;

/// Extensions accepted by `/ocr-image`
const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg"];

const UNSUPPORTED_IMAGE: &str = "Unsupported file type. Only .png, .jpg, .jpeg are supported.";

#[derive(Debug, Default, Deserialize)]
pub struct OcrQuery {
    /// Return the text as a `.txt` attachment instead of JSON
    #[serde(default)]
    pub download: bool,
}

#[derive(Serialize)]
pub struct OcrResponse {
    pub text: String,
    pub status: &'static str,
    pub pages_processed: usize,
}

#[derive(Serialize)]
pub struct ImageOcrResponse {
    pub text: String,
}

/// POST /ocr
pub async fn ocr_pdf(
    State(state): State<AppState>,
    Query(query): Query<OcrQuery>,
    mut multipart: Multipart,
) -> Result<Response> {
    let upload = Upload::from_multipart(&mut multipart).await?;
    upload.ensure_not_empty()?;
    upload.ensure_within(state.config().limits.max_pdf_bytes)?;

    tracing::info!(file_name = %upload.file_name, bytes = upload.data.len(), "OCR request");

    let scratch_dir = &state.config().scratch_dir;
    let pdf = ScratchFile::write(scratch_dir, "ocr", ".pdf", &upload.data).await?;

    let images = state
        .rasterizer()
        .render_to_png_files(pdf.path(), scratch_dir)
        .await
        .map_err(|source| AppError::Rasterize {
            context: "Failed to convert document to images.",
            source,
        })?;

    let languages = state.config().ocr.language_flag();
    let pages = ocr_pages(state.ocr_engine(), &images, &languages).await;
    let failed = pages.iter().filter(|p| p.failed).count();
    let text = render_pages(&pages);

    tracing::info!(pages = pages.len(), failed, "OCR complete");

    if query.download {
        return Ok((
            [
                (header::CONTENT_TYPE, "text/plain; charset=utf-8"),
                (header::CONTENT_DISPOSITION, "attachment; filename=\"ocr_output.txt\""),
            ],
            text,
        )
            .into_response());
    }

    Ok(Json(OcrResponse {
        text,
        status: "success",
        pages_processed: pages.len(),
    })
    .into_response())
}

/// POST /ocr-image
pub async fn ocr_image(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<ImageOcrResponse>> {
    let upload = Upload::from_multipart(&mut multipart).await?;

    // Reject before anything is written
    let extension = upload
        .extension()
        .filter(|ext| IMAGE_EXTENSIONS.contains(&ext.as_str()))
        .ok_or(AppError::UnsupportedFileType(UNSUPPORTED_IMAGE))?;
    upload.ensure_not_empty()?;

    let image = ScratchFile::write(
        &state.config().scratch_dir,
        "image",
        &format!(".{}", extension),
        &upload.data,
    )
    .await?;

    let languages = state.config().ocr.language_flag();
    let text = state.ocr_engine().recognize(image.path(), &languages).await?;

    tracing::info!(file_name = %upload.file_name, chars = text.len(), "Image OCR complete");
    Ok(Json(ImageOcrResponse { text }))
}
