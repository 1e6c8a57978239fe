//! Multipart upload extraction
//!
//! Every route takes a single file. The field named `file` is preferred; any
//! other field carrying a filename is accepted when `file` is absent.

use std::path::Path;

use axum::body::Bytes;
use axum::extract::Multipart;

use crate::error::{AppError, Result};

/// Name used when the client sends no filename
const UNNAMED_UPLOAD: &str = "upload";

/// An uploaded file held in memory
#[derive(Debug, Clone)]
pub struct Upload {
    pub file_name: String,
    pub data: Bytes,
}

impl Upload {
    pub async fn from_multipart(multipart: &mut Multipart) -> Result<Self> {
        let mut fallback = None;

        while let Some(field) = multipart.next_field().await? {
            let name = field.name().unwrap_or("").to_string();
            let file_name = field.file_name().map(|s| s.to_string());

            tracing::debug!(
                "Received field: name='{}', filename={:?}, content_type={:?}",
                name,
                file_name,
                field.content_type()
            );

            let is_file_field = name == "file";
            if !is_file_field && (fallback.is_some() || file_name.is_none()) {
                continue;
            }

            let upload = Upload {
                file_name: file_name.unwrap_or_else(|| UNNAMED_UPLOAD.to_string()),
                data: field.bytes().await?,
            };

            if is_file_field {
                return Ok(upload);
            }
            fallback = Some(upload);
        }

        fallback.ok_or_else(|| AppError::BadRequest("No file uploaded".to_string()))
    }

    /// Lower-cased extension after the last `.`
    pub fn extension(&self) -> Option<String> {
        Path::new(&self.file_name)
            .extension()
            .map(|ext| ext.to_string_lossy().to_ascii_lowercase())
    }

    /// File name without directories or extension
    pub fn stem(&self) -> String {
        Path::new(&self.file_name)
            .file_stem()
            .map(|stem| stem.to_string_lossy().replace('"', "_"))
            .filter(|stem| !stem.is_empty())
            .unwrap_or_else(|| UNNAMED_UPLOAD.to_string())
    }

    pub fn ensure_not_empty(&self) -> Result<()> {
        if self.data.is_empty() {
            return Err(AppError::BadRequest("Uploaded file is empty".to_string()));
        }
        Ok(())
    }

    pub fn ensure_within(&self, max: usize) -> Result<()> {
        if self.data.len() > max {
            return Err(AppError::FileTooLarge {
                size: self.data.len(),
                max,
            });
        }
        Ok(())
    }
}
