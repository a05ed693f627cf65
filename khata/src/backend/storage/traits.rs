//! # Storage Traits
//!
//! This module defines the storage abstraction traits that allow different
//! storage backends to be used interchangeably in the domain layer.

use anyhow::Result;
use crate::backend::domain::models::customer::Customer as DomainCustomer;
use crate::backend::domain::models::entry::Entry as DomainEntry;
use crate::backend::domain::models::pin_attempt::PinAttempt as DomainPinAttempt;
use crate::backend::domain::models::settings::Settings as DomainSettings;

/// Trait defining the interface for customer storage operations
pub trait CustomerStorage: Send + Sync {
    /// Store a new customer
    fn store_customer(&self, customer: &DomainCustomer) -> Result<()>;

    /// Retrieve a specific customer by ID
    fn get_customer(&self, customer_id: &str) -> Result<Option<DomainCustomer>>;

    /// List all customers, newest first
    fn list_customers(&self) -> Result<Vec<DomainCustomer>>;

    /// Update an existing customer
    /// Returns false if no customer with that ID exists
    fn update_customer(&self, customer: &DomainCustomer) -> Result<bool>;

    /// Delete a customer by ID
    /// Returns true if the customer was found and deleted
    fn delete_customer(&self, customer_id: &str) -> Result<bool>;
}

/// Trait defining the interface for ledger entry storage operations
///
/// Entries are append-only from the domain's point of view; the only removal
/// is the cascade when a customer is deleted.
pub trait EntryStorage: Send + Sync {
    /// Append a new entry
    fn store_entry(&self, entry: &DomainEntry) -> Result<()>;

    /// List entries for one customer, newest first
    fn list_entries(&self, customer_id: &str) -> Result<Vec<DomainEntry>>;

    /// List every entry across all customers, newest first
    fn list_all_entries(&self) -> Result<Vec<DomainEntry>>;

    /// Delete all entries belonging to a customer
    /// Returns the number of entries removed
    fn delete_entries_for_customer(&self, customer_id: &str) -> Result<usize>;
}

/// Trait defining the interface for settings storage operations
pub trait SettingsStorage: Send + Sync {
    /// Get stored settings, or the defaults when none were saved
    fn get_settings(&self) -> Result<DomainSettings>;

    /// Replace the stored settings
    fn save_settings(&self, settings: &DomainSettings) -> Result<()>;
}

/// Trait defining the interface for PIN attempt storage operations
pub trait PinAttemptStorage: Send + Sync {
    /// Record a PIN validation attempt, returning its ID
    fn record_pin_attempt(&self, success: bool) -> Result<i64>;

    /// Get PIN attempts, most recent first, with optional limit
    fn get_pin_attempts(&self, limit: Option<u32>) -> Result<Vec<DomainPinAttempt>>;
}
