//! POST /process-word

use axum::{
    extract::{Multipart, State},
    Json,
};
use serde::Serialize;

use super::upload::Upload;
use crate::error::{AppError, Result};
use crate::office::WordFormat;
use crate::state::AppState;
use crate::word::{ProcessingMethod, WordPage, WordProcessor};

const UNSUPPORTED_WORD: &str = "Unsupported file type. Only .doc and .docx are supported.";

#[derive(Serialize)]
pub struct WordResponse {
    pub pages: Vec<WordPage>,
    pub method: ProcessingMethod,
}

pub async fn process_word(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<WordResponse>> {
    let upload = Upload::from_multipart(&mut multipart).await?;
    let format = upload
        .extension()
        .as_deref()
        .and_then(WordFormat::from_extension)
        .ok_or(AppError::UnsupportedFileType(UNSUPPORTED_WORD))?;
    upload.ensure_not_empty()?;

    let processor = WordProcessor::new(state.converter(), state.rasterizer());
    let outcome = processor.process(&upload.data, format).await;
    let method = outcome.method();
    let pages = outcome.into_pages();

    tracing::info!(
        file_name = %upload.file_name,
        pages = pages.len(),
        method = ?method,
        "Word document processed"
    );
    Ok(Json(WordResponse { pages, method }))
}
