//! POST /convert-md-to-pdf

use axum::{
    extract::{Multipart, State},
    http::header,
    response::IntoResponse,
};

use super::upload::Upload;
use crate::error::{AppError, Result};
use crate::markdown::markdown_to_pdf;
use crate::state::AppState;

pub async fn convert_md_to_pdf(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse> {
    let upload = Upload::from_multipart(&mut multipart).await?;
    if !upload.file_name.to_ascii_lowercase().ends_with(".md") {
        return Err(AppError::BadRequest("Only .md files are supported".to_string()));
    }

    let pdf = markdown_to_pdf(state.converter(), &upload.data).await?;
    let disposition = format!("attachment; filename=\"{}.pdf\"", upload.stem());

    tracing::info!(file_name = %upload.file_name, bytes = pdf.len(), "Markdown converted to PDF");
    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        pdf,
    ))
}
