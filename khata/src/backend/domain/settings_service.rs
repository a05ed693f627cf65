use anyhow::Result;
use log::info;
use std::sync::Arc;

use crate::backend::domain::commands::settings::{UpdateSettingsCommand, UpdateSettingsResult};
use crate::backend::domain::errors::KhataError;
use crate::backend::domain::models::settings::Settings;
use crate::backend::storage::csv::{CsvConnection, SettingsRepository};
use crate::backend::storage::traits::SettingsStorage;

/// Service for reading and changing shop preferences
#[derive(Clone)]
pub struct SettingsService {
    settings_repository: SettingsRepository,
}

impl SettingsService {
    pub fn new(csv_conn: Arc<CsvConnection>) -> Self {
        let settings_repository = SettingsRepository::new((*csv_conn).clone());
        Self { settings_repository }
    }

    /// Current settings, or the defaults when nothing has been saved
    pub fn get_settings(&self) -> Result<Settings> {
        self.settings_repository.get_settings()
    }

    /// Apply the provided changes and persist them
    pub fn update_settings(&self, command: UpdateSettingsCommand) -> Result<UpdateSettingsResult> {
        info!(
            "Updating settings: default_price={:?}, pin change requested={}",
            command.default_price,
            command.pin.is_some()
        );

        let mut settings = self.settings_repository.get_settings()?;

        if let Some(price) = command.default_price {
            if !price.is_finite() || price <= 0.0 {
                return Err(KhataError::InvalidPrice(price).into());
            }
            settings.default_price = price;
        }

        if let Some(pin) = command.pin {
            settings.pin = match pin {
                Some(pin) => {
                    let pin = pin.trim().to_string();
                    if !Settings::is_valid_pin(&pin) {
                        return Err(KhataError::InvalidPin.into());
                    }
                    Some(pin)
                }
                None => None,
            };
        }

        self.settings_repository.save_settings(&settings)?;

        let success_message = if settings.pin_enabled() {
            format!("Settings saved (default price ₹{}, PIN on)", settings.default_price)
        } else {
            format!("Settings saved (default price ₹{}, PIN off)", settings.default_price)
        };

        Ok(UpdateSettingsResult {
            settings,
            success_message,
        })
    }
}
