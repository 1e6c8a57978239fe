//! OCR Engines
//!
//! Defines the engine trait and the `tesseract` command-line implementation.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;

use super::types::OcrError;
use crate::scratch::ScratchFile;

/// OCR engine trait
#[async_trait]
pub trait OcrEngine: Send + Sync {
    /// Engine name for logging
    fn name(&self) -> &'static str;

    /// Check if the engine can be invoked
    async fn is_available(&self) -> bool;

    /// Recognize the text in an image file.
    ///
    /// `languages` is a `+`-joined language list (e.g. `eng+deu`).
    async fn recognize(&self, image_path: &Path, languages: &str) -> Result<String, OcrError>;
}

/// Tesseract CLI engine
///
/// Runs `tesseract <image> <image>_output -l <langs> --psm <psm> txt` and
/// reads back `<image>_output.txt`.
#[derive(Debug, Clone)]
pub struct TesseractEngine {
    binary: PathBuf,
    psm: u8,
}

impl TesseractEngine {
    pub fn new(binary: impl Into<PathBuf>, psm: u8) -> Self {
        Self {
            binary: binary.into(),
            psm,
        }
    }
}

/// `<image>_output`, the base name tesseract appends `.txt` to
fn output_base(image_path: &Path) -> PathBuf {
    let mut base = OsString::from(image_path.as_os_str());
    base.push("_output");
    PathBuf::from(base)
}

#[async_trait]
impl OcrEngine for TesseractEngine {
    fn name(&self) -> &'static str {
        "tesseract"
    }

    async fn is_available(&self) -> bool {
        Command::new(&self.binary)
            .arg("--version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
            .map(|status| status.success())
            .unwrap_or(false)
    }

    async fn recognize(&self, image_path: &Path, languages: &str) -> Result<String, OcrError> {
        let base = output_base(image_path);
        let mut txt_path = base.clone().into_os_string();
        txt_path.push(".txt");
        // Removed on every exit path, including a failed read
        let txt_file = ScratchFile::adopt(txt_path);

        tracing::debug!(
            image = %image_path.display(),
            languages = %languages,
            "Running tesseract"
        );

        let output = Command::new(&self.binary)
            .arg(image_path)
            .arg(&base)
            .arg("-l")
            .arg(languages)
            .arg("--psm")
            .arg(self.psm.to_string())
            .arg("txt")
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(OcrError::Spawn)?;

        if !output.status.success() {
            tracing::warn!(
                image = %image_path.display(),
                status = %output.status,
                "Tesseract exited unsuccessfully: {}",
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }

        match tokio::fs::read_to_string(txt_file.path()).await {
            Ok(text) => Ok(text),
            Err(e) => {
                tracing::error!(path = %txt_file.path().display(), "Reading OCR output failed: {}", e);
                Ok(format!("Error reading OCR output: {}", e))
            }
        }
    }
}

/// Mock engine for testing
#[cfg(test)]
pub struct MockEngine {
    pub text: String,
    /// Zero-based call index that fails
    pub fail_on: Option<usize>,
    pub calls: std::sync::atomic::AtomicUsize,
}

#[cfg(test)]
impl MockEngine {
    pub fn new(text: &str) -> Self {
        Self {
            text: text.to_string(),
            fail_on: None,
            calls: std::sync::atomic::AtomicUsize::new(0),
        }
    }
}

#[cfg(test)]
#[async_trait]
impl OcrEngine for MockEngine {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn is_available(&self) -> bool {
        true
    }

    async fn recognize(&self, _image_path: &Path, _languages: &str) -> Result<String, OcrError> {
        let call = self.calls.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        if self.fail_on == Some(call) {
            return Err(OcrError::ProcessingError("mock failure".to_string()));
        }
        Ok(self.text.clone())
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::test_support::fake_binary;
    use tempfile::TempDir;

    #[test]
    fn test_output_base() {
        assert_eq!(
            output_base(Path::new("/tmp/page_1.png")),
            PathBuf::from("/tmp/page_1.png_output")
        );
    }

    #[tokio::test]
    async fn test_recognize_reads_and_removes_output() {
        let temp_dir = TempDir::new().unwrap();
        // Echo the arguments so the invocation can be checked
        let binary = fake_binary(
            temp_dir.path(),
            "tesseract",
            r#"printf '%s|' "$@" > "$2.txt""#,
        );
        let image = temp_dir.path().join("scan.png");
        std::fs::write(&image, b"png").unwrap();

        let engine = TesseractEngine::new(&binary, 3);
        let text = engine.recognize(&image, "eng+deu").await.unwrap();

        let expected = format!(
            "{}|{}|-l|eng+deu|--psm|3|txt|",
            image.display(),
            output_base(&image).display()
        );
        assert_eq!(text, expected);

        let leftover = temp_dir.path().join("scan.png_output.txt");
        assert!(!leftover.exists());
    }

    #[tokio::test]
    async fn test_missing_output_becomes_error_text() {
        let temp_dir = TempDir::new().unwrap();
        let binary = fake_binary(temp_dir.path(), "tesseract", "exit 1");
        let image = temp_dir.path().join("scan.png");
        std::fs::write(&image, b"png").unwrap();

        let engine = TesseractEngine::new(&binary, 3);
        let text = engine.recognize(&image, "eng").await.unwrap();

        assert!(text.starts_with("Error reading OCR output:"));
    }

    #[tokio::test]
    async fn test_missing_binary_is_spawn_error() {
        let engine = TesseractEngine::new("/nonexistent/tesseract", 3);

        assert!(!engine.is_available().await);

        let result = engine.recognize(Path::new("/tmp/none.png"), "eng").await;
        assert!(matches!(result, Err(OcrError::Spawn(_))));
    }

    #[tokio::test]
    async fn test_is_available() {
        let temp_dir = TempDir::new().unwrap();
        let binary = fake_binary(temp_dir.path(), "tesseract", "echo 'tesseract 5.3.0'");

        assert!(TesseractEngine::new(&binary, 3).is_available().await);
    }
}
