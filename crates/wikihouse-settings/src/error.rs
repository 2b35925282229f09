//! Error types for the settings crate.
//!
//! Structured errors for settings validation, ingress of user-edited values,
//! and settings-file persistence.

use std::path::PathBuf;
use thiserror::Error;
use wikihouse_core::{Length, UnitError};

/// Errors that can occur during settings operations.
#[derive(Error, Debug)]
pub enum SettingsError {
    /// A dimension that must be strictly positive is zero or negative.
    #[error("Invalid setting '{key}': must be positive, got {value}")]
    NonPositive { key: String, value: Length },

    /// A value is NaN or infinite.
    #[error("Invalid setting '{key}': value is not a finite number")]
    NonFinite { key: String },

    /// The margin leaves no usable sheet area.
    #[error("Invalid setting 'margin': {margin} must be less than half of {limit}")]
    MarginTooLarge { margin: Length, limit: Length },

    /// Padding on both sides of a panel exceeds the inner sheet.
    #[error("Invalid setting 'padding': twice {padding} must be less than {limit}")]
    PaddingTooLarge { padding: Length, limit: Length },

    /// The setting name is not one of the known keys.
    #[error("Unknown setting: {0}")]
    UnknownSetting(String),

    /// A user-entered value could not be parsed.
    #[error("Invalid value for '{key}': {source}")]
    InvalidValue {
        key: String,
        #[source]
        source: UnitError,
    },

    /// The settings file could not be loaded.
    #[error("Failed to load settings from {path}: {reason}")]
    LoadError { path: PathBuf, reason: String },

    /// The settings file could not be saved.
    #[error("Failed to save settings to {path}: {reason}")]
    SaveError { path: PathBuf, reason: String },

    /// The file extension is neither .toml nor .json.
    #[error("Unsupported settings format: {0}")]
    UnsupportedFormat(String),

    /// The configuration directory could not be found or created.
    #[error("Config directory error: {0}")]
    ConfigDirectory(String),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// TOML deserialization error.
    #[error("TOML error: {0}")]
    TomlError(#[from] toml::de::Error),

    /// TOML serialization error.
    #[error("TOML error: {0}")]
    TomlSerializeError(#[from] toml::ser::Error),
}

/// Result type alias for settings operations.
pub type SettingsResult<T> = Result<T, SettingsError>;

#[cfg(test)]
mod tests {
    use super::*;
    use wikihouse_core::LengthExt;

    #[test]
    fn test_settings_error_display() {
        let err = SettingsError::NonPositive {
            key: "sheet_width".to_string(),
            value: 0.0.mm(),
        };
        assert_eq!(
            err.to_string(),
            "Invalid setting 'sheet_width': must be positive, got 0.0mm"
        );

        let err = SettingsError::MarginTooLarge {
            margin: 700.0.mm(),
            limit: 1200.0.mm(),
        };
        assert_eq!(
            err.to_string(),
            "Invalid setting 'margin': 700.0mm must be less than half of 1200.0mm"
        );

        let err = SettingsError::UnknownSetting("sheet_colour".to_string());
        assert_eq!(err.to_string(), "Unknown setting: sheet_colour");
    }

    #[test]
    fn test_error_conversion() {
        let json_err = serde_json::from_str::<u32>("nope").unwrap_err();
        let err: SettingsError = json_err.into();
        assert!(matches!(err, SettingsError::JsonError(_)));
    }
}
