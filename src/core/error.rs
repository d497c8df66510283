//! Labeled failures surfaced to callers.
//!
//! Everything else travels as `anyhow::Error`; callers that need to tell a
//! validation failure apart can `downcast_ref::<ReportError>()`.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Invalid date '{input}': expected format {expected}")]
    InvalidDate { input: String, expected: &'static str },

    #[error("Settings file not found: {}", .0.display())]
    SettingsNotFound(PathBuf),

    #[error("Failed to parse settings file {}: {source}", .path.display())]
    SettingsParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Transactions file not found: {}", .0.display())]
    TransactionsNotFound(PathBuf),

    #[error("Unsupported transactions file format: {}", .0.display())]
    UnsupportedFormat(PathBuf),

    #[error("Failed to read spreadsheet: {0}")]
    Spreadsheet(String),

    #[error("Missing required column: {0}")]
    MissingColumn(&'static str),
}
