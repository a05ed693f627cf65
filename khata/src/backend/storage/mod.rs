//! # Storage Module
//!
//! Handles all data persistence for the ledger. The domain layer only talks to
//! the traits in [`traits`]; the CSV implementation in [`csv`] is the one the
//! application ships with.

pub mod csv;
pub mod traits;

pub use traits::{CustomerStorage, EntryStorage, PinAttemptStorage, SettingsStorage};
