//! Route modules for the OCR service

pub mod health;
pub mod markdown;
pub mod ocr;
pub mod screenshot;
pub mod upload;
pub mod word;

use axum::{routing::post, Router};

use crate::state::AppState;

/// All service routes, without middleware
pub fn router() -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .route("/ocr", post(ocr::ocr_pdf))
        .route("/ocr-image", post(ocr::ocr_image))
        .route("/screenshot", post(screenshot::screenshot))
        .route("/process-word", post(word::process_word))
        .route("/convert-md-to-pdf", post(markdown::convert_md_to_pdf))
}
