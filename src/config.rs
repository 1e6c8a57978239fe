//! Configuration management for the OCR service

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

/// Upload size limit for the PDF OCR route: 50MB
pub const DEFAULT_MAX_PDF_BYTES: usize = 50 * 1024 * 1024;

/// Request body limit applied to every route: 100MB
pub const DEFAULT_MAX_BODY_BYTES: usize = 100 * 1024 * 1024;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub ocr: OcrConfig,
    pub office: OfficeConfig,
    pub render: RenderConfig,
    pub limits: LimitsConfig,
    /// Directory where per-request scratch files are created
    pub scratch_dir: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OcrConfig {
    /// Tesseract executable
    pub binary: PathBuf,
    /// Languages passed to `-l`, joined with `+`
    pub languages: Vec<String>,
    /// Page segmentation mode (`--psm`)
    pub psm: u8,
}

impl OcrConfig {
    /// Language flag value, e.g. `eng+deu`
    pub fn language_flag(&self) -> String {
        self.languages.join("+")
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct OfficeConfig {
    /// LibreOffice executable
    pub binary: PathBuf,
    pub timeout_secs: u64,
}

impl OfficeConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RenderConfig {
    pub dpi: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LimitsConfig {
    pub max_pdf_bytes: usize,
    pub max_body_bytes: usize,
}

/// Configuration error
#[derive(Debug, thiserror::Error)]
#[error("Invalid value for {name}: {value:?}")]
pub struct ConfigError {
    pub name: &'static str,
    pub value: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8000,
            },
            ocr: OcrConfig {
                binary: PathBuf::from("tesseract"),
                languages: vec!["eng".to_string()],
                psm: 3,
            },
            office: OfficeConfig {
                binary: PathBuf::from("soffice"),
                timeout_secs: 30,
            },
            render: RenderConfig { dpi: 200 },
            limits: LimitsConfig {
                max_pdf_bytes: DEFAULT_MAX_PDF_BYTES,
                max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            },
            scratch_dir: env::temp_dir(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Config::default();

        Ok(Config {
            server: ServerConfig {
                host: env::var("SERVER_HOST").unwrap_or(defaults.server.host),
                port: parse_var("SERVER_PORT", defaults.server.port)?,
            },
            ocr: OcrConfig {
                binary: env::var("TESSERACT_BIN")
                    .map(PathBuf::from)
                    .unwrap_or(defaults.ocr.binary),
                languages: env::var("TESS_LANGS")
                    .ok()
                    .map(|raw| parse_languages(&raw))
                    .filter(|langs| !langs.is_empty())
                    .unwrap_or(defaults.ocr.languages),
                psm: parse_var("TESSERACT_PSM", defaults.ocr.psm)?,
            },
            office: OfficeConfig {
                binary: env::var("SOFFICE_BIN")
                    .map(PathBuf::from)
                    .unwrap_or(defaults.office.binary),
                timeout_secs: parse_var("SOFFICE_TIMEOUT_SECS", defaults.office.timeout_secs)?,
            },
            render: RenderConfig {
                dpi: parse_var("RENDER_DPI", defaults.render.dpi)?,
            },
            limits: LimitsConfig {
                max_pdf_bytes: parse_var("MAX_PDF_BYTES", defaults.limits.max_pdf_bytes)?,
                max_body_bytes: parse_var("MAX_BODY_BYTES", defaults.limits.max_body_bytes)?,
            },
            scratch_dir: env::var("SCRATCH_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.scratch_dir),
        })
    }
}

/// Split a language list such as `eng,deu` or `eng+deu` into codes
pub fn parse_languages(raw: &str) -> Vec<String> {
    raw.split([',', '+'])
        .map(str::trim)
        .filter(|lang| !lang.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_var<T: std::str::FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(value) => value.trim().parse().map_err(|_| ConfigError { name, value }),
        Err(_) => Ok(default),
    }
}
