//! Viewer settings and preferences
//!
//! Only per-viewer choices live here. Anything that changes the simulation
//! itself is a constant in `consts`, since every client must agree on it.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::RESET_COOLDOWN_MS;
use crate::error::SettingsError;
use crate::input::KeyBindings;

/// Viewer settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Wall-clock delay before a scored ball is relaunched (ms)
    pub reset_cooldown_ms: f64,

    // === Controls ===
    pub keys: KeyBindings,

    // === HUD ===
    /// Draw seat holders' names
    pub show_names: bool,
    /// Draw the dotted center line
    pub center_line: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            reset_cooldown_ms: RESET_COOLDOWN_MS,
            keys: KeyBindings::default(),
            show_names: true,
            center_line: true,
        }
    }
}

impl Settings {
    /// Parse and validate settings JSON; omitted fields keep their defaults
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        let settings: Settings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn to_json(&self) -> Result<String, SettingsError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        if !self.reset_cooldown_ms.is_finite() || self.reset_cooldown_ms <= 0.0 {
            return Err(SettingsError::InvalidCooldown(self.reset_cooldown_ms));
        }
        self.keys.validate()
    }

    /// Load settings from a JSON file, falling back to defaults
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match std::fs::read_to_string(path)
            .map_err(SettingsError::from)
            .and_then(|json| Self::from_json(&json))
        {
            Ok(settings) => {
                log::info!("Loaded settings from {}", path.display());
                settings
            }
            Err(e) => {
                log::warn!("Using default settings ({}: {})", path.display(), e);
                Self::default()
            }
        }
    }

    /// Save settings as JSON
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), SettingsError> {
        std::fs::write(path.as_ref(), self.to_json()?)?;
        log::info!("Settings saved");
        Ok(())
    }
}
