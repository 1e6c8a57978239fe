//! Helpers shared by unit tests

#[path = "../tests/common/fixtures.rs"]
mod fixtures;

pub use fixtures::blank_pdf;
#[cfg(unix)]
pub use fixtures::fake_binary;
