//! # Settings Repository
//!
//! Preferences are stored in a single YAML file `settings.yaml` at the root of
//! the data directory.
//!
//! ## YAML Format
//!
//! ```yaml
//! pin: "1234"
//! default_price: 10.0
//! data_format_version: "1.0"
//! created_at: "2025-01-21T19:30:00+00:00"
//! updated_at: "2025-01-21T19:35:00+00:00"
//! ```
//!
//! A missing file means nothing has been saved yet and the defaults apply;
//! reading never creates the file.

use anyhow::{Context, Result};
use chrono::Utc;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::fs;

use super::connection::CsvConnection;
use crate::backend::domain::models::settings::{Settings as DomainSettings, DEFAULT_PRICE_PER_CUP};
use crate::backend::storage::traits::SettingsStorage;

const DATA_FORMAT_VERSION: &str = "1.0";

/// On-disk settings document
#[derive(Debug, Clone, Serialize, Deserialize)]
struct SettingsFile {
    #[serde(default)]
    pin: Option<String>,
    #[serde(default = "default_price")]
    default_price: f64,
    data_format_version: String,
    created_at: String,
    updated_at: String,
}

fn default_price() -> f64 {
    DEFAULT_PRICE_PER_CUP
}

/// YAML-backed settings repository
#[derive(Clone)]
pub struct SettingsRepository {
    connection: CsvConnection,
}

impl SettingsRepository {
    pub fn new(connection: CsvConnection) -> Self {
        Self { connection }
    }

    fn load_settings_file(&self) -> Result<Option<SettingsFile>> {
        let path = self.connection.settings_file_path();
        if !path.exists() {
            return Ok(None);
        }

        let yaml_content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let file: SettingsFile = serde_yaml::from_str(&yaml_content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        debug!("Loaded settings from {:?}", path);
        Ok(Some(file))
    }
}

impl SettingsStorage for SettingsRepository {
    fn get_settings(&self) -> Result<DomainSettings> {
        Ok(match self.load_settings_file()? {
            Some(file) => DomainSettings {
                pin: file.pin,
                default_price: file.default_price,
            },
            None => DomainSettings::default(),
        })
    }

    fn save_settings(&self, settings: &DomainSettings) -> Result<()> {
        let now = Utc::now().to_rfc3339();
        let created_at = self
            .load_settings_file()?
            .map(|existing| existing.created_at)
            .unwrap_or_else(|| now.clone());

        let file = SettingsFile {
            pin: settings.pin.clone(),
            default_price: settings.default_price,
            data_format_version: DATA_FORMAT_VERSION.to_string(),
            created_at,
            updated_at: now,
        };

        let yaml_content = serde_yaml::to_string(&file)?;
        self.connection
            .write_atomically(&self.connection.settings_file_path(), yaml_content.as_bytes())?;

        info!(
            "Saved settings (default_price: {:.2}, pin enabled: {})",
            settings.default_price,
            settings.pin.is_some()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::storage::csv::test_utils::TestEnvironment;

    #[test]
    fn test_get_settings_defaults_without_creating_file() {
        let env = TestEnvironment::new().unwrap();
        let repo = SettingsRepository::new(env.connection.clone());

        let settings = repo.get_settings().unwrap();
        assert_eq!(settings, DomainSettings::default());
        assert!(!env.connection.settings_file_path().exists());
    }

    #[test]
    fn test_save_and_reload_settings() {
        let env = TestEnvironment::new().unwrap();
        let repo = SettingsRepository::new(env.connection.clone());

        let settings = DomainSettings {
            pin: Some("0420".to_string()),
            default_price: 12.5,
        };
        repo.save_settings(&settings).unwrap();

        // Simulate an app restart
        let reopened = SettingsRepository::new(CsvConnection::new(env.base_directory()).unwrap());
        assert_eq!(reopened.get_settings().unwrap(), settings);
    }

    #[test]
    fn test_pin_with_leading_zero_stays_a_string() {
        let env = TestEnvironment::new().unwrap();
        let repo = SettingsRepository::new(env.connection.clone());

        repo.save_settings(&DomainSettings {
            pin: Some("0007".to_string()),
            default_price: 10.0,
        })
        .unwrap();

        assert_eq!(repo.get_settings().unwrap().pin.as_deref(), Some("0007"));
    }

    #[test]
    fn test_created_at_preserved_across_saves() {
        let env = TestEnvironment::new().unwrap();
        let repo = SettingsRepository::new(env.connection.clone());

        repo.save_settings(&DomainSettings::default()).unwrap();
        let first = repo.load_settings_file().unwrap().unwrap();

        repo.save_settings(&DomainSettings {
            pin: None,
            default_price: 15.0,
        })
        .unwrap();
        let second = repo.load_settings_file().unwrap().unwrap();

        assert_eq!(first.created_at, second.created_at);
        assert_eq!(second.default_price, 15.0);
        assert_eq!(second.data_format_version, "1.0");
    }

    #[test]
    fn test_missing_default_price_falls_back() {
        let env = TestEnvironment::new().unwrap();
        let repo = SettingsRepository::new(env.connection.clone());

        fs::write(
            env.connection.settings_file_path(),
            "data_format_version: \"1.0\"\ncreated_at: \"x\"\nupdated_at: \"x\"\n",
        )
        .unwrap();

        let settings = repo.get_settings().unwrap();
        assert_eq!(settings.default_price, 10.0);
        assert_eq!(settings.pin, None);
    }
}
