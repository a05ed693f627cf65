//! # Backend Module
//!
//! Wires the domain services to file storage. The CLI builds one [`Backend`]
//! per invocation and calls services on it directly; everything is synchronous.

use anyhow::Result;
use std::path::Path;
use std::sync::Arc;

pub mod domain;
pub mod io;
pub mod storage;

pub use storage::csv::CsvConnection;

/// Main backend struct that holds every service
#[derive(Clone)]
pub struct Backend {
    pub customer_service: domain::CustomerService,
    pub entry_service: domain::EntryService,
    pub balance_service: domain::BalanceService,
    pub settings_service: domain::SettingsService,
    pub pin_service: domain::PinService,
    pub export_service: domain::ExportService,
    pub customer_table_service: domain::CustomerTableService,
}

impl Backend {
    /// Create a backend over the given connection
    pub fn new(csv_conn: Arc<CsvConnection>) -> Self {
        let customer_service = domain::CustomerService::new(csv_conn.clone());
        let balance_service = domain::BalanceService::new(csv_conn.clone());
        let entry_service = domain::EntryService::new(
            csv_conn.clone(),
            customer_service.clone(),
            balance_service.clone(),
        );
        let settings_service = domain::SettingsService::new(csv_conn.clone());
        let pin_service = domain::PinService::new(csv_conn);

        Backend {
            customer_service,
            entry_service,
            balance_service,
            settings_service,
            pin_service,
            export_service: domain::ExportService::new(),
            customer_table_service: domain::CustomerTableService::new(),
        }
    }

    /// Open the ledger in `data_dir`, or in the default data directory
    pub fn open(data_dir: Option<&Path>) -> Result<Self> {
        let connection = match data_dir {
            Some(dir) => CsvConnection::new(dir)?,
            None => CsvConnection::new_default()?,
        };
        log::info!("Using data directory {}", connection.base_directory().display());
        Ok(Self::new(Arc::new(connection)))
    }
}
