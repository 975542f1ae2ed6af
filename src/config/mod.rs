//! Configuration Management
//!
//! Handles loading, validation, and change notification for:
//! - TOML files (host configuration)
//! - Persisted user settings (icon variant, prompt toggle)
//!
//! Settings changes are pushed to subscribers over a watch channel; the
//! background context re-applies the icon on every change.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tokio::sync::watch;

/// Icon variant choices, mutually exclusive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IconVariant {
    /// Black outline icon
    Black,
    /// Full-color icon
    Color,
    /// Gray outline icon
    Gray,
    /// White outline icon
    White,
}

impl IconVariant {
    /// SVG fragment addressing this variant
    pub fn fragment(self) -> &'static str {
        match self {
            IconVariant::Black => "#black",
            IconVariant::Color => "#color",
            IconVariant::Gray => "#gray",
            IconVariant::White => "#white",
        }
    }
}

impl Default for IconVariant {
    fn default() -> Self {
        IconVariant::Gray
    }
}

/// Persisted user settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Selected icon variant
    pub icon_variant: IconVariant,
    /// Offer the user-input override before each copy
    pub prompt_on_copy: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            icon_variant: IconVariant::default(),
            prompt_on_copy: true,
        }
    }
}

/// Broker runtime configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrokerConfig {
    /// Capacity of the background event and bus channels
    pub channel_capacity: usize,
}

impl Default for BrokerConfig {
    fn default() -> Self {
        Self {
            channel_capacity: 100,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default log level
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Broker configuration
    pub broker: BrokerConfig,
    /// Persisted user settings
    pub settings: Settings,
    /// Logging configuration
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .context(format!("Failed to read config file: {}", path))?;

        let config: Config = toml::from_str(&content).context("Failed to parse config file")?;

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.broker.channel_capacity == 0 {
            anyhow::bail!("channel_capacity must be greater than zero");
        }

        match self.logging.level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            other => anyhow::bail!("Invalid log level: {}", other),
        }

        Ok(())
    }
}

/// Settings store with change notification
///
/// `get` returns the current snapshot; `subscribe` hands out a watch receiver
/// that observes every subsequent `update`.
#[derive(Debug)]
pub struct SettingsStore {
    tx: watch::Sender<Settings>,
}

impl SettingsStore {
    /// Store seeded with the given settings
    pub fn new(initial: Settings) -> Self {
        let (tx, _rx) = watch::channel(initial);
        Self { tx }
    }

    /// Current settings snapshot
    pub fn get(&self) -> Settings {
        *self.tx.borrow()
    }

    /// Observe settings changes
    pub fn subscribe(&self) -> watch::Receiver<Settings> {
        self.tx.subscribe()
    }

    /// Replace the settings and notify subscribers
    pub fn update(&self, settings: Settings) {
        // Send only fails with no receivers, which is fine for a store
        let _ = self.tx.send(settings);
    }
}

impl Default for SettingsStore {
    fn default() -> Self {
        Self::new(Settings::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.broker.channel_capacity, 100);
        assert_eq!(config.settings.icon_variant, IconVariant::Gray);
        assert!(config.settings.prompt_on_copy);
        assert_eq!(config.logging.level, "info");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[settings]\nicon_variant = \"color\"\nprompt_on_copy = false\n\n[logging]\nlevel = \"debug\"\n"
        )
        .unwrap();

        let config = Config::load(file.path().to_str().unwrap()).unwrap();
        assert_eq!(config.settings.icon_variant, IconVariant::Color);
        assert!(!config.settings.prompt_on_copy);
        assert_eq!(config.logging.level, "debug");
        // Unspecified sections fall back to defaults
        assert_eq!(config.broker.channel_capacity, 100);
    }

    #[test]
    fn test_validation_rejects_zero_capacity() {
        let mut config = Config::default();
        config.broker.channel_capacity = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_rejects_unknown_level() {
        let mut config = Config::default();
        config.logging.level = "verbose".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_settings_store_notifies_subscribers() {
        let store = SettingsStore::default();
        let mut rx = store.subscribe();
        assert!(!rx.has_changed().unwrap());

        let mut updated = store.get();
        updated.icon_variant = IconVariant::White;
        store.update(updated);

        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().icon_variant, IconVariant::White);
        assert_eq!(store.get().icon_variant, IconVariant::White);
    }
}
