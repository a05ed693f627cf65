//! PIN gate for the ledger.
//!
//! When a PIN is configured every command has to present it first. Each check
//! is logged to the attempt history (outcome only) so the owner can see if
//! someone has been guessing.

use anyhow::Result;
use log::{info, warn};
use std::sync::Arc;

use crate::backend::domain::commands::pin::{ValidatePinCommand, ValidatePinResult};
use crate::backend::domain::errors::KhataError;
use crate::backend::domain::models::pin_attempt::PinAttempt;
use crate::backend::storage::csv::{CsvConnection, PinAttemptRepository, SettingsRepository};
use crate::backend::storage::traits::{PinAttemptStorage, SettingsStorage};

/// Service for checking the ledger PIN
#[derive(Clone)]
pub struct PinService {
    settings_repository: SettingsRepository,
    pin_attempt_repository: PinAttemptRepository,
}

impl PinService {
    pub fn new(csv_conn: Arc<CsvConnection>) -> Self {
        Self {
            settings_repository: SettingsRepository::new((*csv_conn).clone()),
            pin_attempt_repository: PinAttemptRepository::new((*csv_conn).clone()),
        }
    }

    /// True when a PIN has been set
    pub fn is_locked(&self) -> Result<bool> {
        Ok(self.settings_repository.get_settings()?.pin_enabled())
    }

    /// Compare an attempt against the stored PIN and record the outcome
    pub fn verify_pin(&self, command: ValidatePinCommand) -> Result<ValidatePinResult> {
        let settings = self.settings_repository.get_settings()?;

        let Some(expected) = settings.pin else {
            return Ok(ValidatePinResult {
                success: true,
                message: "No PIN set".to_string(),
            });
        };

        let attempted = command.pin.trim();
        let is_correct = attempted == expected;

        match self.pin_attempt_repository.record_pin_attempt(is_correct) {
            Ok(attempt_id) => info!("Recorded PIN attempt with ID: {}", attempt_id),
            // The check itself still stands even if the log can't be written
            Err(e) => warn!("Failed to record PIN attempt: {}", e),
        }

        Ok(if is_correct {
            info!("PIN accepted");
            ValidatePinResult {
                success: true,
                message: "PIN accepted".to_string(),
            }
        } else {
            warn!("Incorrect PIN entered");
            ValidatePinResult {
                success: false,
                message: "Incorrect PIN".to_string(),
            }
        })
    }

    /// Gate used before running any command
    pub fn unlock(&self, attempt: Option<&str>) -> Result<()> {
        if !self.is_locked()? {
            return Ok(());
        }

        let Some(pin) = attempt else {
            return Err(KhataError::PinRequired.into());
        };

        let result = self.verify_pin(ValidatePinCommand {
            pin: pin.to_string(),
        })?;
        if result.success {
            Ok(())
        } else {
            Err(KhataError::IncorrectPin.into())
        }
    }

    /// Most recent attempts first
    pub fn recent_attempts(&self, limit: Option<u32>) -> Result<Vec<PinAttempt>> {
        let attempts = self.pin_attempt_repository.get_pin_attempts(limit)?;
        info!("Retrieved {} PIN attempts", attempts.len());
        Ok(attempts)
    }

    pub fn attempt_stats(&self) -> Result<PinAttemptStats> {
        let all_attempts = self.pin_attempt_repository.get_pin_attempts(None)?;

        let total_attempts = all_attempts.len();
        let successful_attempts = all_attempts.iter().filter(|a| a.success).count();
        let failed_attempts = total_attempts - successful_attempts;

        let success_rate = if total_attempts > 0 {
            (successful_attempts as f64 / total_attempts as f64) * 100.0
        } else {
            0.0
        };

        Ok(PinAttemptStats {
            total_attempts,
            successful_attempts,
            failed_attempts,
            success_rate,
        })
    }
}

/// Summary of the PIN attempt history
#[derive(Debug, Clone, PartialEq)]
pub struct PinAttemptStats {
    pub total_attempts: usize,
    pub successful_attempts: usize,
    pub failed_attempts: usize,
    pub success_rate: f64, // Percentage
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::domain::models::settings::Settings;
    use crate::backend::storage::csv::test_utils::TestEnvironment;

    fn setup_test(pin: Option<&str>) -> (TestEnvironment, PinService) {
        let env = TestEnvironment::new().unwrap();
        if let Some(pin) = pin {
            SettingsRepository::new(env.connection.clone())
                .save_settings(&Settings {
                    pin: Some(pin.to_string()),
                    default_price: 10.0,
                })
                .unwrap();
        }
        let service = PinService::new(Arc::new(env.connection.clone()));
        (env, service)
    }

    fn verify(service: &PinService, pin: &str) -> bool {
        service
            .verify_pin(ValidatePinCommand { pin: pin.to_string() })
            .unwrap()
            .success
    }

    #[test]
    fn test_unlocked_ledger_accepts_anything() {
        let (_env, service) = setup_test(None);

        assert!(!service.is_locked().unwrap());
        assert!(verify(&service, "9999"));
        assert!(service.unlock(None).is_ok());

        // Nothing to record when there is no gate
        assert!(service.recent_attempts(None).unwrap().is_empty());
    }

    #[test]
    fn test_correct_and_incorrect_pin() {
        let (_env, service) = setup_test(Some("0420"));

        assert!(service.is_locked().unwrap());
        assert!(verify(&service, "0420"));
        assert!(verify(&service, " 0420 "));
        assert!(!verify(&service, "420"));
        assert!(!verify(&service, "1234"));
    }

    #[test]
    fn test_unlock_errors() {
        let (_env, service) = setup_test(Some("1234"));

        let err = service.unlock(None).unwrap_err();
        assert_eq!(err.downcast_ref::<KhataError>(), Some(&KhataError::PinRequired));

        let err = service.unlock(Some("4321")).unwrap_err();
        assert_eq!(err.downcast_ref::<KhataError>(), Some(&KhataError::IncorrectPin));

        assert!(service.unlock(Some("1234")).is_ok());
    }

    #[test]
    fn test_attempts_are_recorded_with_stats() {
        let (_env, service) = setup_test(Some("1234"));

        verify(&service, "0000");
        verify(&service, "1111");
        verify(&service, "1234");
        verify(&service, "2222");

        let recent = service.recent_attempts(Some(2)).unwrap();
        assert_eq!(recent.len(), 2);
        assert!(!recent[0].success);
        assert!(recent[1].success);

        let stats = service.attempt_stats().unwrap();
        assert_eq!(stats.total_attempts, 4);
        assert_eq!(stats.successful_attempts, 1);
        assert_eq!(stats.failed_attempts, 3);
        assert_eq!(stats.success_rate, 25.0);
    }

    #[test]
    fn test_stats_with_no_attempts() {
        let (_env, service) = setup_test(Some("1234"));

        let stats = service.attempt_stats().unwrap();
        assert_eq!(stats.total_attempts, 0);
        assert_eq!(stats.success_rate, 0.0);
    }
}
