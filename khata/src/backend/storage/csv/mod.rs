//! # CSV Storage Module
//!
//! File-based storage for the ledger. Everything lives in one data directory:
//!
//! ```text
//! data/
//! ├── customers.csv
//! ├── entries.csv
//! ├── pin_attempts.csv
//! └── settings.yaml
//! ```
//!
//! Every write goes through a temp file followed by a rename.

pub mod connection;
pub mod customer_repository;
pub mod entry_repository;
pub mod pin_attempt_repository;
pub mod settings_repository;

#[cfg(test)]
pub mod test_utils;

pub use connection::CsvConnection;
pub use customer_repository::CustomerRepository;
pub use entry_repository::EntryRepository;
pub use pin_attempt_repository::PinAttemptRepository;
pub use settings_repository::SettingsRepository;
