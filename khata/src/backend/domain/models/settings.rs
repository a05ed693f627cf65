//! Domain model for shop preferences.

use serde::{Deserialize, Serialize};

pub const DEFAULT_PRICE_PER_CUP: f64 = 10.0;
pub const PIN_LENGTH: usize = 4;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Four digit PIN, None when the gate is off
    pub pin: Option<String>,
    pub default_price: f64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            pin: None,
            default_price: DEFAULT_PRICE_PER_CUP,
        }
    }
}

impl Settings {
    pub fn pin_enabled(&self) -> bool {
        self.pin.is_some()
    }

    /// A PIN is exactly four ASCII digits
    pub fn is_valid_pin(pin: &str) -> bool {
        pin.len() == PIN_LENGTH && pin.chars().all(|c| c.is_ascii_digit())
    }
}
