//! Application state management

use std::sync::Arc;

use crate::config::Config;
use crate::ocr::{OcrEngine, TesseractEngine};
use crate::office::OfficeConverter;
use crate::pdf::Rasterizer;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: Config,
    ocr_engine: Arc<dyn OcrEngine>,
    converter: OfficeConverter,
    rasterizer: Rasterizer,
}

impl AppState {
    /// Create state backed by the configured `tesseract` binary
    pub fn new(config: Config) -> Self {
        let engine = TesseractEngine::new(config.ocr.binary.clone(), config.ocr.psm);
        Self::with_engine(config, Arc::new(engine))
    }

    /// Create state with a specific OCR engine
    pub fn with_engine(config: Config, ocr_engine: Arc<dyn OcrEngine>) -> Self {
        let converter = OfficeConverter::new(
            config.office.binary.clone(),
            config.office.timeout(),
            config.scratch_dir.clone(),
        );
        let rasterizer = Rasterizer::new(config.render.dpi);

        Self {
            inner: Arc::new(AppStateInner {
                config,
                ocr_engine,
                converter,
                rasterizer,
            }),
        }
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    pub fn ocr_engine(&self) -> &dyn OcrEngine {
        self.inner.ocr_engine.as_ref()
    }

    pub fn converter(&self) -> &OfficeConverter {
        &self.inner.converter
    }

    pub fn rasterizer(&self) -> Rasterizer {
        self.inner.rasterizer
    }
}
