use std::fs;
use std::io;
use std::path::Path;
use std::time::Duration;

use clip_engine::{DownloadSettings, FetchSettings, ScanSettings};
use clip_logging::{clip_error, clip_info, clip_warn};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub(crate) enum SettingsError {
    #[error("failed to read settings: {0}")]
    Read(#[from] io::Error),
    #[error("failed to parse settings: {0}")]
    Parse(#[from] ron::error::SpannedError),
    #[error("failed to serialize settings: {0}")]
    Serialize(#[from] ron::Error),
}

/// Everything the harness reads from `clip_settings.ron`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct AppSettings {
    pub page_url: String,
    pub viewport_height: f64,
    pub scan: ScanSettings,
    pub download: DownloadSettings,
    pub max_download_mb: u64,
    /// How long to wait for the scan to report back.
    pub scan_timeout_secs: u64,
    pub download_timeout_secs: u64,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            page_url: "https://chat.local/replay".to_string(),
            viewport_height: 800.0,
            scan: ScanSettings::default(),
            download: DownloadSettings::default(),
            max_download_mb: 2048,
            scan_timeout_secs: 600,
            download_timeout_secs: 300,
        }
    }
}

impl AppSettings {
    pub fn fetch_settings(&self) -> FetchSettings {
        FetchSettings {
            max_bytes: self.max_download_mb.saturating_mul(1024 * 1024),
            request_timeout: Duration::from_secs(self.download_timeout_secs),
            ..FetchSettings::default()
        }
    }

    pub fn scan_timeout(&self) -> Duration {
        Duration::from_secs(self.scan_timeout_secs)
    }
}

/// Missing file means defaults; an unreadable or malformed one is logged and
/// defaults are used.
pub(crate) fn load_settings(path: &Path) -> AppSettings {
    match read_settings(path) {
        Ok(Some(settings)) => {
            clip_info!("Loaded settings from {:?}", path);
            settings
        }
        Ok(None) => AppSettings::default(),
        Err(err) => {
            clip_warn!("Ignoring settings file {:?}: {}", path, err);
            AppSettings::default()
        }
    }
}

fn read_settings(path: &Path) -> Result<Option<AppSettings>, SettingsError> {
    let content = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(err) => return Err(err.into()),
    };
    Ok(Some(ron::from_str(&content)?))
}

pub(crate) fn save_settings(path: &Path, settings: &AppSettings) {
    if let Err(err) = write_settings(path, settings) {
        clip_error!("Failed to write settings to {:?}: {}", path, err);
    }
}

fn write_settings(path: &Path, settings: &AppSettings) -> Result<(), SettingsError> {
    let pretty = ron::ser::PrettyConfig::new();
    let content = ron::ser::to_string_pretty(settings, pretty)?;
    fs::write(path, content)?;
    clip_info!("Saved settings to {:?}", path);
    Ok(())
}
