//! Scratch files
//!
//! Every artifact a request writes to disk (uploaded PDFs, page images,
//! converter output) is held by a [`ScratchFile`] guard. The file is removed
//! when the guard drops, so cleanup runs on success, partial failure and
//! early return alike. Removal is best-effort: failures are logged and never
//! reach the caller.

use std::io;
use std::path::{Path, PathBuf};

use uuid::Uuid;

/// A uniquely named file in the scratch directory, deleted on drop
#[derive(Debug)]
pub struct ScratchFile {
    path: PathBuf,
}

impl ScratchFile {
    /// Reserve a unique path without creating anything on disk.
    ///
    /// Names look like `<prefix>_<uuid><suffix>`; `suffix` should include the
    /// leading dot (e.g. `.pdf`).
    pub fn reserve(dir: &Path, prefix: &str, suffix: &str) -> Self {
        let name = format!("{}_{}{}", prefix, Uuid::new_v4().simple(), suffix);
        Self {
            path: dir.join(name),
        }
    }

    /// Reserve a unique path and write `data` to it
    pub async fn write(dir: &Path, prefix: &str, suffix: &str, data: &[u8]) -> io::Result<Self> {
        let file = Self::reserve(dir, prefix, suffix);
        tokio::fs::write(&file.path, data).await?;
        Ok(file)
    }

    /// Take ownership of a file produced by an external tool
    pub fn adopt(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl AsRef<Path> for ScratchFile {
    fn as_ref(&self) -> &Path {
        &self.path
    }
}

impl Drop for ScratchFile {
    fn drop(&mut self) {
        match std::fs::remove_file(&self.path) {
            Ok(()) => tracing::trace!(path = %self.path.display(), "Removed scratch file"),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => tracing::warn!(
                path = %self.path.display(),
                "Failed to remove scratch file: {}",
                e
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_write_and_drop_removes_file() {
        let temp_dir = TempDir::new().unwrap();

        let file = ScratchFile::write(temp_dir.path(), "upload", ".pdf", b"%PDF-1.4")
            .await
            .unwrap();
        let path = file.path().to_path_buf();

        assert!(path.exists());
        assert!(path.file_name().unwrap().to_str().unwrap().starts_with("upload_"));
        assert_eq!(path.extension().unwrap(), "pdf");

        drop(file);
        assert!(!path.exists());
    }

    #[test]
    fn test_reserve_does_not_touch_disk() {
        let temp_dir = TempDir::new().unwrap();

        let file = ScratchFile::reserve(temp_dir.path(), "page", ".png");
        assert!(!file.path().exists());

        // Dropping a guard whose file never existed is fine
        drop(file);
        assert_eq!(std::fs::read_dir(temp_dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_reserved_names_are_unique() {
        let temp_dir = TempDir::new().unwrap();

        let a = ScratchFile::reserve(temp_dir.path(), "img", ".png");
        let b = ScratchFile::reserve(temp_dir.path(), "img", ".png");
        assert_ne!(a.path(), b.path());
    }

    #[test]
    fn test_adopt_removes_external_output() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("converted.pdf");
        std::fs::write(&path, b"data").unwrap();

        drop(ScratchFile::adopt(&path));
        assert!(!path.exists());
    }
}
