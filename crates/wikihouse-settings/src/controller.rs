//! Settings Controller
//!
//! The "current settings" store owned by the front end. It keeps the live
//! settings next to the immutable defaults, answers the settings dialog's
//! fetch/update requests in display units, and persists changes.
//!
//! The fabrication pipeline never reads this store directly; callers hand it a
//! [`Settings`] snapshot via [`SettingsController::settings`].

use crate::config::Settings;
use crate::error::{SettingsError, SettingsResult};
use crate::persistence::{load_settings_or_default, save_settings};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::info;
use wikihouse_core::DisplayUnit;

/// Which settings a fetch request refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsSource {
    Current,
    Default,
}

impl FromStr for SettingsSource {
    type Err = SettingsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "current" => Ok(Self::Current),
            "default" => Ok(Self::Default),
            other => Err(SettingsError::UnknownSetting(other.to_string())),
        }
    }
}

type ChangeListener = Box<dyn Fn(&Settings)>;

/// Front-end owned store for the live settings
pub struct SettingsController {
    current: Settings,
    defaults: Settings,
    path: Option<PathBuf>,
    listeners: Vec<ChangeListener>,
}

impl fmt::Debug for SettingsController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SettingsController")
            .field("current", &self.current)
            .field("path", &self.path)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl Default for SettingsController {
    fn default() -> Self {
        Self::new(Settings::default())
    }
}

impl SettingsController {
    /// Store starting from `current`, with factory defaults for recall
    pub fn new(current: Settings) -> Self {
        Self {
            current,
            defaults: Settings::default(),
            path: None,
            listeners: Vec::new(),
        }
    }

    /// Store backed by a settings file; a missing file yields defaults
    pub fn open(path: impl AsRef<Path>) -> SettingsResult<Self> {
        let path = path.as_ref();
        let current = load_settings_or_default(path)?;
        Ok(Self {
            path: Some(path.to_path_buf()),
            ..Self::new(current)
        })
    }

    /// Snapshot for a fabrication run
    pub fn settings(&self) -> &Settings {
        &self.current
    }

    pub fn defaults(&self) -> &Settings {
        &self.defaults
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Register a callback run after every successful change
    pub fn on_settings_changed<F>(&mut self, callback: F)
    where
        F: Fn(&Settings) + 'static,
    {
        self.listeners.push(Box::new(callback));
    }

    /// Settings as a `name -> value` map for the dialog
    pub fn fetch(&self, source: SettingsSource, unit: DisplayUnit) -> BTreeMap<String, f64> {
        match source {
            SettingsSource::Current => self.current.to_display_map(unit),
            SettingsSource::Default => self.defaults.to_display_map(unit),
        }
    }

    /// Apply a user-edited map; nothing changes if any value is invalid
    pub fn update(
        &mut self,
        values: &BTreeMap<String, f64>,
        unit: DisplayUnit,
    ) -> SettingsResult<&Settings> {
        self.current.apply_display_update(values, unit)?;
        info!(changed = values.len(), "Settings updated");
        self.notify();
        Ok(&self.current)
    }

    /// Replace the current settings with the defaults
    pub fn restore_defaults(&mut self) {
        self.current = self.defaults.clone();
        self.notify();
    }

    /// Write the current settings to the backing file, if there is one
    pub fn save(&self) -> SettingsResult<()> {
        match &self.path {
            Some(path) => save_settings(&self.current, path),
            None => Err(SettingsError::ConfigDirectory(
                "settings store has no backing file".to_string(),
            )),
        }
    }

    fn notify(&self) {
        for listener in &self.listeners {
            listener(&self.current);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn test_fetch_default_vs_current() {
        let mut store = SettingsController::default();
        let mut update = BTreeMap::new();
        update.insert("sheet_width".to_string(), 2000.0);
        store.update(&update, DisplayUnit::Millimeters).unwrap();

        let current = store.fetch(SettingsSource::Current, DisplayUnit::Millimeters);
        let defaults = store.fetch(SettingsSource::Default, DisplayUnit::Millimeters);
        assert!((current["sheet_width"] - 2000.0).abs() < 1e-9);
        assert!((current["sheet_inner_width"] - 1995.0).abs() < 1e-9);
        assert!((defaults["sheet_width"] - 2400.0).abs() < 1e-9);
    }

    #[test]
    fn test_listeners_run_on_change_only() {
        let calls = Rc::new(Cell::new(0));
        let seen = calls.clone();
        let mut store = SettingsController::default();
        store.on_settings_changed(move |_| seen.set(seen.get() + 1));

        let mut bad = BTreeMap::new();
        bad.insert("margin".to_string(), 0.0);
        assert!(store.update(&bad, DisplayUnit::Millimeters).is_err());
        assert_eq!(calls.get(), 0);

        store.restore_defaults();
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_source_from_str() {
        assert_eq!("default".parse::<SettingsSource>().unwrap(), SettingsSource::Default);
        assert!("other".parse::<SettingsSource>().is_err());
    }

    #[test]
    fn test_save_without_path_fails() {
        let store = SettingsController::default();
        assert!(matches!(store.save(), Err(SettingsError::ConfigDirectory(_))));
    }
}
