//! # CSV PIN Attempt Repository
//!
//! Every PIN check is appended to `pin_attempts.csv`:
//!
//! ```csv
//! id,timestamp,success
//! 1,2024-01-15T10:30:00.000Z,false
//! 2,2024-01-15T10:31:00.000Z,true
//! ```
//!
//! IDs auto-increment from the highest one on file.

use anyhow::{Context, Result};
use csv::{Reader, WriterBuilder};
use log::debug;
use serde::{Deserialize, Serialize};

use super::connection::CsvConnection;
use crate::backend::domain::models::pin_attempt::PinAttempt as DomainPinAttempt;
use crate::backend::storage::traits::PinAttemptStorage;

const HEADER: [&str; 3] = ["id", "timestamp", "success"];

/// CSV record structure for PIN attempts
#[derive(Debug, Clone, Serialize, Deserialize)]
struct PinAttemptRecord {
    id: i64,
    timestamp: String,
    success: bool,
}

impl From<PinAttemptRecord> for DomainPinAttempt {
    fn from(record: PinAttemptRecord) -> Self {
        DomainPinAttempt::new(record.id, record.timestamp, record.success)
    }
}

impl From<&DomainPinAttempt> for PinAttemptRecord {
    fn from(attempt: &DomainPinAttempt) -> Self {
        PinAttemptRecord {
            id: attempt.id,
            timestamp: attempt.timestamp.clone(),
            success: attempt.success,
        }
    }
}

/// CSV-based PIN attempt repository
#[derive(Clone)]
pub struct PinAttemptRepository {
    connection: CsvConnection,
}

impl PinAttemptRepository {
    pub fn new(connection: CsvConnection) -> Self {
        Self { connection }
    }

    /// Read all attempts in file (chronological) order
    fn read_attempts(&self) -> Result<Vec<DomainPinAttempt>> {
        let path = self.connection.pin_attempts_file_path();
        self.connection.ensure_csv_file_exists(&path, &HEADER)?;

        let mut reader = Reader::from_path(&path)
            .with_context(|| format!("Failed to open {}", path.display()))?;

        reader
            .deserialize::<PinAttemptRecord>()
            .map(|result| {
                result
                    .map(DomainPinAttempt::from)
                    .context("Malformed row in pin_attempts.csv")
            })
            .collect()
    }

    fn write_attempts(&self, attempts: &[DomainPinAttempt]) -> Result<()> {
        let mut writer = WriterBuilder::new().has_headers(false).from_writer(Vec::new());
        writer.write_record(HEADER)?;
        for attempt in attempts {
            writer.serialize(PinAttemptRecord::from(attempt))?;
        }
        let bytes = writer.into_inner().context("Failed to flush PIN attempts CSV")?;

        self.connection
            .write_atomically(&self.connection.pin_attempts_file_path(), &bytes)
    }
}

impl PinAttemptStorage for PinAttemptRepository {
    fn record_pin_attempt(&self, success: bool) -> Result<i64> {
        let mut attempts = self.read_attempts()?;
        let next_id = attempts.iter().map(|a| a.id).max().unwrap_or(0) + 1;

        attempts.push(DomainPinAttempt::new(
            next_id,
            DomainPinAttempt::generate_current_timestamp(),
            success,
        ));
        self.write_attempts(&attempts)?;

        debug!("Recorded PIN attempt {} (success: {})", next_id, success);
        Ok(next_id)
    }

    fn get_pin_attempts(&self, limit: Option<u32>) -> Result<Vec<DomainPinAttempt>> {
        let mut attempts = self.read_attempts()?;
        attempts.sort_by(|a, b| b.id.cmp(&a.id));

        if let Some(limit) = limit {
            attempts.truncate(limit as usize);
        }

        Ok(attempts)
    }
}
