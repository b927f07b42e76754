//! Settings persistence.

use crate::SettingsRecord;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

/// Environment variable overriding the settings file location.
pub const SETTINGS_ENV: &str = "AUTOCLICK_SETTINGS";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Get the app data directory for autoclick.
pub fn get_app_data_dir() -> PathBuf {
    let base = dirs_next::data_dir().unwrap_or_else(|| PathBuf::from("."));
    base.join("autoclick")
}

/// Directory for rolling log files.
pub fn get_log_dir() -> PathBuf {
    get_app_data_dir().join("logs")
}

/// Settings file path, honoring `AUTOCLICK_SETTINGS`.
pub fn settings_path() -> PathBuf {
    match std::env::var_os(SETTINGS_ENV) {
        Some(path) if !path.is_empty() => PathBuf::from(path),
        _ => get_app_data_dir().join("settings.dat"),
    }
}

/// Load the settings record. A missing file yields defaults.
pub fn load_record(path: &Path) -> StorageResult<SettingsRecord> {
    match fs::read(path) {
        Ok(data) => {
            debug!(?path, len = data.len(), "Loaded settings");
            Ok(SettingsRecord::from_bytes(&data))
        }
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!(?path, "No settings file, using defaults");
            Ok(SettingsRecord::default())
        }
        Err(e) => Err(e.into()),
    }
}

/// Save the settings record, creating parent directories as needed.
pub fn save_record(path: &Path, record: &SettingsRecord) -> StorageResult<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent)?;
            info!(?parent, "Created settings directory");
        }
    }
    fs::write(path, record.to_bytes())?;
    info!(?path, "Saved settings");
    Ok(())
}
