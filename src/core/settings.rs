//! User preferences: which currencies and stocks to quote.
//!
//! Two entry points with different contracts. [`load_or_create`] is the
//! forgiving one used for general access; [`read_user_settings`] is strict
//! and is what the quote lookups rely on.

use crate::core::error::ReportError;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserSettings {
    pub user_currencies: Vec<String>,
    pub user_stocks: Vec<String>,
}

/// Reads the settings file as free-form JSON.
///
/// A missing file is created holding `{}` and that empty object is returned.
/// Malformed JSON yields `Ok(None)`.
pub fn load_or_create<P: AsRef<Path>>(path: P) -> Result<Option<Value>> {
    let path = path.as_ref();
    match fs::read_to_string(path) {
        Ok(text) => match serde_json::from_str::<Value>(&text) {
            Ok(value) => {
                debug!("Loaded settings from {}", path.display());
                Ok(Some(value))
            }
            Err(e) => {
                warn!(error = %e, "Settings file {} is not valid JSON", path.display());
                Ok(None)
            }
        },
        Err(e) if e.kind() == ErrorKind::NotFound => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
            }
            let empty = Value::Object(Default::default());
            fs::write(path, empty.to_string())
                .with_context(|| format!("Failed to write settings file: {}", path.display()))?;
            info!("Created empty settings file at {}", path.display());
            Ok(Some(empty))
        }
        Err(e) => Err(e).with_context(|| format!("Failed to read settings file: {}", path.display())),
    }
}

/// Reads tracked currencies and stocks. Fails if the file is missing or is
/// not a valid settings object.
pub fn read_user_settings<P: AsRef<Path>>(path: P) -> Result<UserSettings> {
    let path = path.as_ref();
    debug!("Reading user settings from {}", path.display());
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Err(ReportError::SettingsNotFound(path.to_path_buf()).into());
        }
        Err(e) => {
            return Err(e)
                .with_context(|| format!("Failed to read settings file: {}", path.display()));
        }
    };

    let settings: UserSettings =
        serde_json::from_str(&text).map_err(|source| ReportError::SettingsParse {
            path: path.to_path_buf(),
            source,
        })?;
    info!(
        currencies = settings.user_currencies.len(),
        stocks = settings.user_stocks.len(),
        "Loaded user settings"
    );
    Ok(settings)
}
