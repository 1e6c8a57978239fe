//! Shared fixtures for the HTTP tests

#![allow(dead_code)]

mod fixtures;

use std::path::PathBuf;

use axum_test::TestServer;
use tempfile::TempDir;

use ocr_service::config::Config;
use ocr_service::state::AppState;

pub use fixtures::{blank_pdf, fake_binary};

/// Writes `<base>.txt` containing the image's file name
pub const ECHO_TESSERACT: &str = r#"printf 'text from %s' "$(basename "$1")" > "$2.txt""#;

/// Fails every conversion
pub const FAILING_SOFFICE: &str = "echo 'source file could not be loaded' >&2; exit 1";

/// A server wired to fake binaries and a private scratch directory
pub struct TestApp {
    pub server: TestServer,
    pub scratch: PathBuf,
    _temp_dir: TempDir,
}

impl TestApp {
    pub fn new(tesseract: &str, soffice: &str) -> Self {
        let temp_dir = TempDir::new().unwrap();
        let bin_dir = temp_dir.path().join("bin");
        let scratch = temp_dir.path().join("scratch");
        std::fs::create_dir(&bin_dir).unwrap();
        std::fs::create_dir(&scratch).unwrap();

        let mut config = Config::default();
        config.ocr.binary = fake_binary(&bin_dir, "tesseract", tesseract);
        config.office.binary = fake_binary(&bin_dir, "soffice", soffice);
        config.office.timeout_secs = 10;
        config.render.dpi = 36;
        config.scratch_dir = scratch.clone();

        let server = TestServer::new(ocr_service::app(AppState::new(config))).unwrap();

        Self {
            server,
            scratch,
            _temp_dir: temp_dir,
        }
    }

    pub fn scratch_is_empty(&self) -> bool {
        std::fs::read_dir(&self.scratch).unwrap().count() == 0
    }
}
