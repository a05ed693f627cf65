/// Test utilities module for automatic cleanup and consistent test infrastructure
///
/// This module provides RAII-based cleanup that guarantees test data is removed
/// even if tests panic or fail.

use anyhow::Result;
use chrono::{DateTime, TimeZone, Utc};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use super::connection::CsvConnection;
use crate::backend::domain::models::customer::Customer as DomainCustomer;
use crate::backend::domain::models::entry::{Entry as DomainEntry, EntryType};

/// RAII Test Environment that automatically cleans up on drop
///
/// The temporary directory lives as long as this struct does.
pub struct TestEnvironment {
    /// The temporary directory - kept alive to prevent auto-cleanup until drop
    _temp_dir: TempDir,
    /// The CSV connection for the test
    pub connection: CsvConnection,
    /// Base directory path for manual inspection if needed
    pub base_path: PathBuf,
}

impl TestEnvironment {
    /// Create a new test environment with automatic cleanup
    pub fn new() -> Result<Self> {
        let temp_dir = TempDir::with_prefix("chai_khata_test_")?;
        let base_path = temp_dir.path().to_path_buf();
        let connection = CsvConnection::new(&base_path)?;

        Ok(TestEnvironment {
            _temp_dir: temp_dir,
            connection,
            base_path,
        })
    }

    /// Get the base directory path for this test environment
    pub fn base_directory(&self) -> &Path {
        &self.base_path
    }
}

impl Drop for TestEnvironment {
    fn drop(&mut self) {
        if std::env::var("CHAI_KHATA_DEBUG_TESTS").is_ok() {
            println!("Cleaning up test environment: {:?}", self.base_path);
        }
    }
}

/// UTC instant from epoch milliseconds
pub fn at_millis(millis: i64) -> DateTime<Utc> {
    Utc.timestamp_millis_opt(millis).single().expect("valid test timestamp")
}

/// Build a customer with a fixed creation time
pub fn customer_at(id: &str, name: &str, price_per_cup: Option<f64>, created_millis: i64) -> DomainCustomer {
    DomainCustomer {
        id: id.to_string(),
        name: name.to_string(),
        price_per_cup,
        created_at: at_millis(created_millis),
    }
}

/// Build an entry with a fixed timestamp
pub fn entry_at(id: &str, customer_id: &str, entry_type: EntryType, qty: u32, millis: i64) -> DomainEntry {
    DomainEntry {
        id: id.to_string(),
        customer_id: customer_id.to_string(),
        qty,
        note: None,
        entry_type,
        timestamp: at_millis(millis),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_environment_cleanup() -> Result<()> {
        let base_path;
        {
            let env = TestEnvironment::new()?;
            base_path = env.base_path.clone();
            assert!(base_path.exists());
        }
        assert!(!base_path.exists());
        Ok(())
    }
}
