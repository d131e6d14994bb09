//! Settings persistence using TOML
//!
//! Stores settings in ~/.config/rowcrush/settings.toml (or platform equivalent)

use crate::game::GameConfig;
use crate::input::{
    DEFAULT_INITIAL_MOVE_DELAY_MS, DEFAULT_REPEAT_DELAY_MS, MAX_REPEAT_DELAY_MS,
    MIN_REPEAT_DELAY_MS, clamp_repeat_delay,
};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

/// Errors from writing the settings file
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("could not determine config directory")]
    NoConfigDir,
    #[error("settings file I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to serialize settings: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Persisted settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Gameplay settings
    pub gameplay: GameplaySettings,
    /// Help screen settings
    pub help: HelpSettings,
    /// Best score seen on this machine
    pub high_score: u64,
}

/// Gameplay settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameplaySettings {
    /// Interval between repeats of a held key, in milliseconds
    pub repeat_delay_ms: u64,
    /// Wait before a held key starts repeating, in milliseconds
    pub initial_move_delay_ms: u64,
}

/// Help screen settings
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HelpSettings {
    /// Skip the help screen at startup
    pub hide_help: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            gameplay: GameplaySettings::default(),
            help: HelpSettings::default(),
            high_score: 0,
        }
    }
}

impl Default for GameplaySettings {
    fn default() -> Self {
        Self {
            repeat_delay_ms: DEFAULT_REPEAT_DELAY_MS,
            initial_move_delay_ms: DEFAULT_INITIAL_MOVE_DELAY_MS,
        }
    }
}

impl Settings {
    /// Get the config directory path
    fn config_dir() -> Option<PathBuf> {
        ProjectDirs::from("com", "rowcrush", "rowcrush").map(|dirs| dirs.config_dir().to_path_buf())
    }

    /// Get the settings file path
    pub fn settings_path() -> Option<PathBuf> {
        Self::config_dir().map(|dir| dir.join("settings.toml"))
    }

    /// Load settings from the platform config dir, or fall back to defaults
    pub fn load() -> Self {
        match Self::settings_path() {
            Some(path) => Self::load_from(&path),
            None => Self::default(),
        }
    }

    /// Load settings from a file; a missing or unreadable file yields defaults
    pub fn load_from(path: &Path) -> Self {
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) => {
                debug!("no settings at {}: {}", path.display(), e);
                return Self::default();
            }
        };

        match Self::from_toml(&contents) {
            Ok(settings) => settings,
            Err(e) => {
                warn!("ignoring malformed settings at {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Parse settings, clamping out-of-range values
    pub fn from_toml(contents: &str) -> Result<Self, toml::de::Error> {
        let mut settings: Settings = toml::from_str(contents)?;
        settings.gameplay.repeat_delay_ms = clamp_repeat_delay(settings.gameplay.repeat_delay_ms);
        Ok(settings)
    }

    /// Save settings to the platform config dir
    pub fn save(&self) -> Result<(), SettingsError> {
        let path = Self::settings_path().ok_or(SettingsError::NoConfigDir)?;
        self.save_to(&path)
    }

    /// Save settings to a file, creating its directory if needed
    pub fn save_to(&self, path: &Path) -> Result<(), SettingsError> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        let contents = toml::to_string_pretty(self)?;
        fs::write(path, contents)?;
        debug!("saved settings to {}", path.display());
        Ok(())
    }

    /// Set the repeat delay, clamped to [50, 300]; returns the value stored
    pub fn set_repeat_delay(&mut self, ms: u64) -> u64 {
        self.gameplay.repeat_delay_ms = clamp_repeat_delay(ms);
        self.gameplay.repeat_delay_ms
    }

    /// Set the repeat delay from a sensitivity slider position.
    ///
    /// 0.0 is the slowest repeat (300 ms), 1.0 the fastest (50 ms).
    pub fn set_repeat_delay_from_sensitivity(&mut self, ratio: f64) -> u64 {
        let ratio = ratio.clamp(0.0, 1.0);
        let span = (MAX_REPEAT_DELAY_MS - MIN_REPEAT_DELAY_MS) as f64;
        let delay = MAX_REPEAT_DELAY_MS as f64 - ratio * span;
        self.set_repeat_delay(delay as u64)
    }

    /// Record a finished or running score; returns true if it is a new best
    pub fn record_score(&mut self, score: u64) -> bool {
        if score > self.high_score {
            self.high_score = score;
            true
        } else {
            false
        }
    }

    pub fn reset_high_score(&mut self) {
        self.high_score = 0;
    }

    /// Build the game configuration these settings describe
    pub fn game_config(&self) -> GameConfig {
        GameConfig {
            initial_move_delay_ms: self.gameplay.initial_move_delay_ms,
            repeat_delay_ms: clamp_repeat_delay(self.gameplay.repeat_delay_ms),
            ..GameConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_settings_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("rowcrush-test-{}-{}", name, std::process::id()))
            .join("settings.toml")
    }

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.gameplay.repeat_delay_ms, 100);
        assert_eq!(settings.gameplay.initial_move_delay_ms, 1000);
        assert!(!settings.help.hide_help);
        assert_eq!(settings.high_score, 0);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let settings = Settings::from_toml("high_score = 750\n").unwrap();
        assert_eq!(settings.high_score, 750);
        assert_eq!(settings.gameplay.repeat_delay_ms, 100);
    }

    #[test]
    fn test_out_of_range_delay_is_clamped_on_load() {
        let settings = Settings::from_toml("[gameplay]\nrepeat_delay_ms = 5\n").unwrap();
        assert_eq!(settings.gameplay.repeat_delay_ms, 50);
        let settings = Settings::from_toml("[gameplay]\nrepeat_delay_ms = 900\n").unwrap();
        assert_eq!(settings.gameplay.repeat_delay_ms, 300);
    }

    #[test]
    fn test_malformed_file_yields_defaults() {
        let path = temp_settings_path("malformed");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "high_score = \"lots\"").unwrap();
        assert_eq!(Settings::load_from(&path), Settings::default());
        let _ = fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let path = temp_settings_path("missing");
        assert_eq!(Settings::load_from(&path), Settings::default());
    }

    #[test]
    fn test_save_and_load() {
        let path = temp_settings_path("save");
        let mut settings = Settings::default();
        settings.set_repeat_delay(180);
        settings.help.hide_help = true;
        settings.record_score(1_250);

        settings.save_to(&path).unwrap();
        assert_eq!(Settings::load_from(&path), settings);
        let _ = fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn test_sensitivity_slider() {
        let mut settings = Settings::default();
        assert_eq!(settings.set_repeat_delay_from_sensitivity(0.0), 300);
        assert_eq!(settings.set_repeat_delay_from_sensitivity(1.0), 50);
        assert_eq!(settings.set_repeat_delay_from_sensitivity(0.5), 175);
        assert_eq!(settings.set_repeat_delay_from_sensitivity(7.0), 50);
    }

    #[test]
    fn test_high_score() {
        let mut settings = Settings::default();
        assert!(settings.record_score(300));
        assert!(!settings.record_score(200));
        assert!(!settings.record_score(300));
        assert_eq!(settings.high_score, 300);
        settings.reset_high_score();
        assert_eq!(settings.high_score, 0);
    }

    #[test]
    fn test_game_config() {
        let mut settings = Settings::default();
        settings.set_repeat_delay(220);
        let config = settings.game_config();
        assert_eq!(config.repeat_delay_ms, 220);
        assert_eq!(config.initial_move_delay_ms, 1000);
        assert_eq!(config.initial_falling_speed_ms, 500);
    }
}
