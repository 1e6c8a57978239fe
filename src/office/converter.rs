//! LibreOffice converter

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use thiserror::Error;
use tokio::process::Command;

use crate::scratch::ScratchFile;

/// Word formats accepted for conversion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WordFormat {
    /// Word 97-2003 binary
    Doc,
    /// Office Open XML
    Docx,
}

impl WordFormat {
    /// Parse a lower-case extension without the dot
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "doc" => Some(Self::Doc),
            "docx" => Some(Self::Docx),
            _ => None,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Self::Doc => "doc",
            Self::Docx => "docx",
        }
    }
}

#[derive(Debug, Error)]
pub enum ConversionError {
    #[error("Conversion timed out after {0:?}")]
    Timeout(Duration),

    #[error("Converter exited with status {code:?}: {stderr}")]
    NonZeroExit { code: Option<i32>, stderr: String },

    #[error("Converter did not produce {0}")]
    MissingOutput(PathBuf),

    #[error("Converter produced an empty PDF")]
    EmptyOutput,

    #[error("Failed to launch converter: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Headless LibreOffice converter
#[derive(Debug, Clone)]
pub struct OfficeConverter {
    binary: PathBuf,
    timeout: Duration,
    scratch_dir: PathBuf,
}

impl OfficeConverter {
    pub fn new(binary: impl Into<PathBuf>, timeout: Duration, scratch_dir: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
            timeout,
            scratch_dir: scratch_dir.into(),
        }
    }

    pub fn scratch_dir(&self) -> &Path {
        &self.scratch_dir
    }

    /// Convert an uploaded Word document to PDF bytes
    pub async fn convert_bytes(&self, data: &[u8], format: WordFormat) -> Result<Vec<u8>, ConversionError> {
        let source = ScratchFile::write(
            &self.scratch_dir,
            "office",
            &format!(".{}", format.extension()),
            data,
        )
        .await?;

        self.convert_path(source.path()).await
    }

    /// Convert a file already on disk.
    ///
    /// The PDF is written next to `source` and removed once read. `source`
    /// itself stays owned by the caller.
    pub async fn convert_path(&self, source: &Path) -> Result<Vec<u8>, ConversionError> {
        let outdir = source
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.scratch_dir.clone());
        let output = ScratchFile::adopt(source.with_extension("pdf"));
        // One LibreOffice profile per run; concurrent runs must not share it
        let profile = tempfile::Builder::new()
            .prefix("soffice_profile_")
            .tempdir_in(&self.scratch_dir)?;
        let profile_dir = tokio::fs::canonicalize(profile.path()).await?;

        tracing::debug!(
            source = %source.display(),
            timeout = ?self.timeout,
            "Converting document to PDF"
        );

        let mut command = Command::new(&self.binary);
        command
            .arg(user_installation_arg(&profile_dir))
            .arg("--headless")
            .arg("--convert-to")
            .arg("pdf")
            .arg("--outdir")
            .arg(&outdir)
            .arg(source)
            .stdin(Stdio::null())
            .kill_on_drop(true);

        let result = match tokio::time::timeout(self.timeout, command.output()).await {
            Ok(result) => result.map_err(ConversionError::Spawn)?,
            Err(_) => {
                tracing::error!(source = %source.display(), "Office conversion timed out");
                return Err(ConversionError::Timeout(self.timeout));
            }
        };

        if !result.status.success() {
            return Err(ConversionError::NonZeroExit {
                code: result.status.code(),
                stderr: String::from_utf8_lossy(&result.stderr).trim().to_string(),
            });
        }

        let pdf = match tokio::fs::read(output.path()).await {
            Ok(pdf) => pdf,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(ConversionError::MissingOutput(output.path().to_path_buf()));
            }
            Err(e) => return Err(e.into()),
        };

        if pdf.is_empty() {
            return Err(ConversionError::EmptyOutput);
        }

        tracing::info!(source = %source.display(), bytes = pdf.len(), "Converted document to PDF");
        Ok(pdf)
    }
}

/// `-env:UserInstallation=file://<dir>` for an absolute `dir`
fn user_installation_arg(dir: &Path) -> String {
    format!("-env:UserInstallation=file://{}", dir.display())
}
