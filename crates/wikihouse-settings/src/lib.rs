//! WikiHouse Settings Crate
//!
//! Fabrication settings (sheet size, margin, padding, label height), the
//! front-end settings store, and settings-file persistence.

pub mod config;
pub mod controller;
pub mod error;
pub mod persistence;

pub use config::{SettingKey, Settings};
pub use controller::{SettingsController, SettingsSource};
pub use error::{SettingsError, SettingsResult};
pub use persistence::{
    default_settings_path, load_settings, load_settings_or_default, save_settings,
    SettingsDocument,
};
