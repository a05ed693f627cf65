use crate::backend::domain::models::pin_attempt::PinAttempt as DomainPinAttempt;
use crate::backend::domain::models::settings::Settings as DomainSettings;
use crate::backend::domain::pin_service::PinAttemptStats;
use shared::{PinAttempt as SharedPinAttempt, PinAttemptsResponse, Settings as SharedSettings};

/// Settings and PIN DTO conversions. The PIN itself never leaves the domain layer.
pub struct SettingsMapper;

impl SettingsMapper {
    pub fn to_dto(domain: &DomainSettings) -> SharedSettings {
        SharedSettings {
            pin_enabled: domain.pin_enabled(),
            default_price: domain.default_price,
        }
    }

    pub fn to_pin_attempt_dto(domain: DomainPinAttempt) -> SharedPinAttempt {
        SharedPinAttempt {
            id: domain.id,
            timestamp: domain.timestamp,
            success: domain.success,
        }
    }

    pub fn to_pin_attempts_dto(attempts: Vec<DomainPinAttempt>, stats: &PinAttemptStats) -> PinAttemptsResponse {
        PinAttemptsResponse {
            attempts: attempts.into_iter().map(Self::to_pin_attempt_dto).collect(),
            total_attempts: stats.total_attempts,
            failed_attempts: stats.failed_attempts,
        }
    }
}
