//! OCR Service Library
//!
//! A document conversion microservice: OCR for PDFs and images, page
//! screenshots, Word processing with a text-extraction fallback, and
//! Markdown to PDF. The server binary is in main.rs.
//!
//! # Modules
//!
//! - `ocr`: OCR engine seam and the multi-page pipeline
//! - `pdf`: MuPDF page rasterization
//! - `office`: LibreOffice conversion to PDF
//! - `word`: Word document processing and text extraction
//! - `routes`: HTTP handlers

pub mod config;
pub mod error;
pub mod markdown;
pub mod ocr;
pub mod office;
pub mod pdf;
pub mod routes;
pub mod scratch;
pub mod screenshot;
pub mod state;
pub mod word;

#[cfg(test)]
mod test_support;

use axum::{extract::DefaultBodyLimit, Router};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use state::AppState;

/// Build the application router with middleware
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let body_limit = state.config().limits.max_body_bytes;

    routes::router()
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
