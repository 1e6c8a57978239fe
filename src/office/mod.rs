//! Office-to-PDF conversion
//!
//! Word documents (and the HTML produced for Markdown uploads) are converted
//! by a headless LibreOffice process:
//!
//! ```text
//! soffice -env:UserInstallation=file://<profile> --headless \
//!     --convert-to pdf --outdir <scratch dir> <source>
//! ```
//!
//! `<profile>` is a fresh directory per call, deleted afterwards.
//!
//! Source and output both live in the scratch directory and are removed
//! before the conversion call returns.

mod converter;

pub use converter::{ConversionError, OfficeConverter, WordFormat};
