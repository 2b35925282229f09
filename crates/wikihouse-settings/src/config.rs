//! Fabrication settings
//!
//! Sheet dimensions, margin, padding and label size. Values are held as
//! canonical [`Length`]s. The inner sheet dimensions are derived from
//! height/width/margin and recomputed after every change; they cannot be set.
//!
//! Defaults match the standard WikiHouse stock: 1200 x 2400 x 18 mm plywood,
//! 25 mm between neighbouring parts (12.5 mm padding on each side) and a 15 mm
//! clearance from the sheet edge to the nearest cut (margin + padding).

use crate::error::{SettingsError, SettingsResult};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use tracing::debug;
use wikihouse_core::{DisplayUnit, Length, LengthExt};

/// Named setting keys, in the order they are presented to users
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SettingKey {
    SheetHeight,
    SheetWidth,
    SheetDepth,
    Padding,
    Margin,
    FontHeight,
    SheetInnerHeight,
    SheetInnerWidth,
}

impl SettingKey {
    pub const ALL: [SettingKey; 8] = [
        SettingKey::SheetHeight,
        SettingKey::SheetWidth,
        SettingKey::SheetDepth,
        SettingKey::Padding,
        SettingKey::Margin,
        SettingKey::FontHeight,
        SettingKey::SheetInnerHeight,
        SettingKey::SheetInnerWidth,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::SheetHeight => "sheet_height",
            Self::SheetWidth => "sheet_width",
            Self::SheetDepth => "sheet_depth",
            Self::Padding => "padding",
            Self::Margin => "margin",
            Self::FontHeight => "font_height",
            Self::SheetInnerHeight => "sheet_inner_height",
            Self::SheetInnerWidth => "sheet_inner_width",
        }
    }

    /// Derived keys are computed from the others and never accepted as input
    pub fn is_derived(self) -> bool {
        matches!(self, Self::SheetInnerHeight | Self::SheetInnerWidth)
    }
}

impl fmt::Display for SettingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SettingKey {
    type Err = SettingsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SettingKey::ALL
            .into_iter()
            .find(|k| k.as_str() == s.trim())
            .ok_or_else(|| SettingsError::UnknownSetting(s.to_string()))
    }
}

/// Complete fabrication settings
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    sheet_height: Length,
    sheet_width: Length,
    sheet_depth: Length,
    padding: Length,
    margin: Length,
    font_height: Length,
    sheet_inner_height: Length,
    sheet_inner_width: Length,
}

impl Default for Settings {
    fn default() -> Self {
        let padding = 25.0.mm() / 2.0;
        let mut settings = Self {
            sheet_height: 1200.0.mm(),
            sheet_width: 2400.0.mm(),
            sheet_depth: 18.0.mm(),
            padding,
            margin: 15.0.mm() - padding,
            font_height: 30.0.mm(),
            sheet_inner_height: Length::ZERO,
            sheet_inner_width: Length::ZERO,
        };
        settings.recompute_inner();
        settings
    }
}

impl Settings {
    /// Build validated settings from the six independent values
    pub fn new(
        sheet_height: Length,
        sheet_width: Length,
        sheet_depth: Length,
        padding: Length,
        margin: Length,
        font_height: Length,
    ) -> SettingsResult<Self> {
        let mut settings = Self {
            sheet_height,
            sheet_width,
            sheet_depth,
            padding,
            margin,
            font_height,
            sheet_inner_height: Length::ZERO,
            sheet_inner_width: Length::ZERO,
        };
        settings.recompute_inner();
        settings.validate()?;
        Ok(settings)
    }

    pub fn sheet_height(&self) -> Length {
        self.sheet_height
    }

    pub fn sheet_width(&self) -> Length {
        self.sheet_width
    }

    /// Material thickness every panel must match
    pub fn sheet_depth(&self) -> Length {
        self.sheet_depth
    }

    /// Half-gap kept clear around every panel
    pub fn padding(&self) -> Length {
        self.padding
    }

    /// Border along each sheet edge where nothing is placed
    pub fn margin(&self) -> Length {
        self.margin
    }

    pub fn font_height(&self) -> Length {
        self.font_height
    }

    pub fn sheet_inner_height(&self) -> Length {
        self.sheet_inner_height
    }

    pub fn sheet_inner_width(&self) -> Length {
        self.sheet_inner_width
    }

    /// Look a value up by key
    pub fn get(&self, key: SettingKey) -> Length {
        match key {
            SettingKey::SheetHeight => self.sheet_height,
            SettingKey::SheetWidth => self.sheet_width,
            SettingKey::SheetDepth => self.sheet_depth,
            SettingKey::Padding => self.padding,
            SettingKey::Margin => self.margin,
            SettingKey::FontHeight => self.font_height,
            SettingKey::SheetInnerHeight => self.sheet_inner_height,
            SettingKey::SheetInnerWidth => self.sheet_inner_width,
        }
    }

    /// Change one independent value. The change is discarded if the result is invalid.
    pub fn set(&mut self, key: SettingKey, value: Length) -> SettingsResult<()> {
        let mut candidate = self.clone();
        candidate.assign(key, value);
        candidate.recompute_inner();
        candidate.validate()?;
        *self = candidate;
        Ok(())
    }

    /// Apply a user-edited map of `name -> value` expressed in `unit`
    ///
    /// Keys may be a subset of the settings; missing keys keep their value.
    /// Derived inner dimensions in the map are ignored and recomputed.
    /// Either every value is applied or none is.
    pub fn apply_display_update(
        &mut self,
        values: &BTreeMap<String, f64>,
        unit: DisplayUnit,
    ) -> SettingsResult<()> {
        let mut candidate = self.clone();
        for (name, value) in values {
            let key: SettingKey = name.parse()?;
            if key.is_derived() {
                debug!(setting = %key, "Ignoring derived setting in update");
                continue;
            }
            if !value.is_finite() {
                return Err(SettingsError::NonFinite {
                    key: key.to_string(),
                });
            }
            candidate.assign(key, Length::new(*value, unit));
        }
        candidate.recompute_inner();
        candidate.validate()?;
        *self = candidate;
        debug!(?self, "Settings updated");
        Ok(())
    }

    /// All eight values, including derived ones, expressed in `unit`
    pub fn to_display_map(&self, unit: DisplayUnit) -> BTreeMap<String, f64> {
        SettingKey::ALL
            .into_iter()
            .map(|key| (key.to_string(), self.get(key).to(unit)))
            .collect()
    }

    /// Check the values describe a usable sheet
    pub fn validate(&self) -> SettingsResult<()> {
        for key in SettingKey::ALL.into_iter().filter(|k| !k.is_derived()) {
            let value = self.get(key);
            if !value.is_finite() {
                return Err(SettingsError::NonFinite {
                    key: key.to_string(),
                });
            }
            if !value.is_positive() {
                return Err(SettingsError::NonPositive {
                    key: key.to_string(),
                    value,
                });
            }
        }

        let shortest = self.sheet_height.min(self.sheet_width);
        if self.margin * 2.0 >= shortest {
            return Err(SettingsError::MarginTooLarge {
                margin: self.margin,
                limit: shortest,
            });
        }

        let inner = self.sheet_inner_height.min(self.sheet_inner_width);
        if self.padding * 2.0 >= inner {
            return Err(SettingsError::PaddingTooLarge {
                padding: self.padding,
                limit: inner,
            });
        }

        Ok(())
    }

    fn assign(&mut self, key: SettingKey, value: Length) {
        match key {
            SettingKey::SheetHeight => self.sheet_height = value,
            SettingKey::SheetWidth => self.sheet_width = value,
            SettingKey::SheetDepth => self.sheet_depth = value,
            SettingKey::Padding => self.padding = value,
            SettingKey::Margin => self.margin = value,
            SettingKey::FontHeight => self.font_height = value,
            SettingKey::SheetInnerHeight | SettingKey::SheetInnerWidth => {}
        }
    }

    fn recompute_inner(&mut self) {
        self.sheet_inner_height = self.sheet_height - self.margin * 2.0;
        self.sheet_inner_width = self.sheet_width - self.margin * 2.0;
    }
}
