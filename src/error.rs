//! Error types for the OCR service

use axum::{
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::markdown::MarkdownError;
use crate::ocr::OcrError;
use crate::office::ConversionError;
use crate::pdf::RasterError;
use crate::screenshot::ScreenshotError;

/// Application-wide result type
pub type Result<T> = std::result::Result<T, AppError>;

/// Application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("{0}")]
    UnsupportedFileType(&'static str),

    #[error("Uploaded file is too large ({size} bytes, limit {max})")]
    FileTooLarge { size: usize, max: usize },

    #[error("{context}")]
    Conversion {
        context: &'static str,
        #[source]
        source: ConversionError,
    },

    #[error("{context}")]
    Rasterize {
        context: &'static str,
        #[source]
        source: RasterError,
    },

    #[error("Failed to process image: {0}")]
    Ocr(#[from] OcrError),

    #[error(transparent)]
    Markdown(#[from] MarkdownError),

    #[error("Failed to encode screenshots: {0}")]
    Screenshot(#[from] ScreenshotError),

    #[error("Invalid multipart request: {0}")]
    Multipart(#[from] MultipartError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Error response body
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Multipart(e) => e.status(),
            AppError::UnsupportedFileType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            AppError::FileTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::Conversion { .. } => StatusCode::BAD_GATEWAY,
            AppError::Rasterize { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Markdown(MarkdownError::InvalidEncoding) => StatusCode::BAD_REQUEST,
            AppError::Markdown(_) => StatusCode::BAD_GATEWAY,
            AppError::Ocr(_) | AppError::Screenshot(_) | AppError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let (error, details) = match &self {
            AppError::BadRequest(msg) => (msg.clone(), None),
            AppError::Conversion { context, source } => {
                tracing::error!("{}: {}", context, source);
                (context.to_string(), Some(source.to_string()))
            }
            AppError::Rasterize { context, source } => {
                tracing::error!("{}: {}", context, source);
                (context.to_string(), Some(source.to_string()))
            }
            AppError::Markdown(e) => {
                tracing::error!("Markdown conversion error: {}", e);
                (e.to_string(), None)
            }
            AppError::Io(e) => {
                tracing::error!("IO error: {}", e);
                ("IO error".to_string(), Some(e.to_string()))
            }
            other => {
                if status.is_server_error() {
                    tracing::error!("{}", other);
                }
                (other.to_string(), None)
            }
        };

        (status, Json(ErrorResponse { error, details })).into_response()
    }
}
