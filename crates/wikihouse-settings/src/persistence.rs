//! Settings Persistence
//!
//! Loads and saves settings files. Files hold the same `name -> value` map the
//! settings dialog exchanges, tagged with the unit the values are written in,
//! so they remain readable and hand-editable:
//!
//! ```toml
//! unit = "mm"
//!
//! [values]
//! sheet_height = 1200.0
//! margin = 2.5
//! ```

use crate::config::Settings;
use crate::error::{SettingsError, SettingsResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use wikihouse_core::DisplayUnit;

/// Directory name under the platform config directory
const APP_DIR: &str = "wikihouse";

/// Default settings file name
const SETTINGS_FILE: &str = "settings.toml";

/// On-disk representation of [`Settings`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettingsDocument {
    #[serde(default)]
    pub unit: DisplayUnit,
    pub values: BTreeMap<String, f64>,
}

impl SettingsDocument {
    pub fn from_settings(settings: &Settings, unit: DisplayUnit) -> Self {
        Self {
            unit,
            values: settings.to_display_map(unit),
        }
    }

    /// Apply the document on top of the defaults
    pub fn to_settings(&self) -> SettingsResult<Settings> {
        let mut settings = Settings::default();
        settings.apply_display_update(&self.values, self.unit)?;
        Ok(settings)
    }
}

enum FileFormat {
    Json,
    Toml,
}

fn file_format(path: &Path) -> SettingsResult<FileFormat> {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("json") => Ok(FileFormat::Json),
        Some("toml") | Some("conf") => Ok(FileFormat::Toml),
        other => Err(SettingsError::UnsupportedFormat(
            other.unwrap_or("<none>").to_string(),
        )),
    }
}

/// Platform settings file location (e.g. `~/.config/wikihouse/settings.toml`)
pub fn default_settings_path() -> SettingsResult<PathBuf> {
    let dir = dirs::config_dir().ok_or_else(|| {
        SettingsError::ConfigDirectory("no configuration directory on this platform".to_string())
    })?;
    Ok(dir.join(APP_DIR).join(SETTINGS_FILE))
}

/// Load settings from a .toml or .json file
pub fn load_settings(path: &Path) -> SettingsResult<Settings> {
    let format = file_format(path)?;
    let content = std::fs::read_to_string(path).map_err(|e| SettingsError::LoadError {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    let document: SettingsDocument = match format {
        FileFormat::Json => serde_json::from_str(&content)?,
        FileFormat::Toml => toml::from_str(&content)?,
    };

    let settings = document.to_settings()?;
    debug!(path = %path.display(), "Loaded settings");
    Ok(settings)
}

/// Load settings, falling back to defaults when the file does not exist
pub fn load_settings_or_default(path: &Path) -> SettingsResult<Settings> {
    if path.exists() {
        load_settings(path)
    } else {
        debug!(path = %path.display(), "No settings file, using defaults");
        Ok(Settings::default())
    }
}

/// Save settings as millimetres to a .toml or .json file, creating parent directories
pub fn save_settings(settings: &Settings, path: &Path) -> SettingsResult<()> {
    settings.validate()?;
    let format = file_format(path)?;
    let document = SettingsDocument::from_settings(settings, DisplayUnit::Millimeters);

    let content = match format {
        FileFormat::Json => serde_json::to_string_pretty(&document)?,
        FileFormat::Toml => toml::to_string_pretty(&document)?,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| {
            SettingsError::ConfigDirectory(format!("{}: {}", parent.display(), e))
        })?;
    }

    std::fs::write(path, content).map_err(|e| SettingsError::SaveError {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    info!(path = %path.display(), "Saved settings");
    Ok(())
}
