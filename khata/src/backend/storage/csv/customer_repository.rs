//! # CSV Customer Repository
//!
//! Customers live in a single `customers.csv` at the root of the data directory.
//!
//! ```csv
//! id,name,price_per_cup,created_at
//! customer::1729238400000,Ramesh,12.0,2024-10-18T08:00:00.000Z
//! customer::1729242000000,Suresh,,2024-10-18T09:00:00.000Z
//! ```
//!
//! An empty `price_per_cup` means the customer pays the shop default.

use anyhow::{Context, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use csv::{Reader, WriterBuilder};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use super::connection::CsvConnection;
use crate::backend::domain::models::customer::Customer as DomainCustomer;
use crate::backend::storage::traits::CustomerStorage;

const HEADER: [&str; 4] = ["id", "name", "price_per_cup", "created_at"];

/// CSV record structure for customers
#[derive(Debug, Clone, Serialize, Deserialize)]
struct CustomerRecord {
    id: String,
    name: String,
    price_per_cup: Option<f64>,
    created_at: String,
}

impl From<&DomainCustomer> for CustomerRecord {
    fn from(customer: &DomainCustomer) -> Self {
        CustomerRecord {
            id: customer.id.clone(),
            name: customer.name.clone(),
            price_per_cup: customer.price_per_cup,
            created_at: customer.created_at.to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }
}

impl TryFrom<CustomerRecord> for DomainCustomer {
    type Error = anyhow::Error;

    fn try_from(record: CustomerRecord) -> Result<Self> {
        let created_at = DateTime::parse_from_rfc3339(&record.created_at)
            .with_context(|| format!("Invalid created_at for customer {}", record.id))?
            .with_timezone(&Utc);

        Ok(DomainCustomer {
            id: record.id,
            name: record.name,
            price_per_cup: record.price_per_cup,
            created_at,
        })
    }
}

/// CSV-based customer repository
#[derive(Clone)]
pub struct CustomerRepository {
    connection: CsvConnection,
}

impl CustomerRepository {
    /// Create a new CSV customer repository
    pub fn new(connection: CsvConnection) -> Self {
        Self { connection }
    }

    /// Read all customers in file order
    fn read_customers(&self) -> Result<Vec<DomainCustomer>> {
        let path = self.connection.customers_file_path();
        self.connection.ensure_csv_file_exists(&path, &HEADER)?;

        let mut reader = Reader::from_path(&path)
            .with_context(|| format!("Failed to open {}", path.display()))?;

        let mut customers = Vec::new();
        // A bad row fails the whole read so the next rewrite can't drop it
        for (index, result) in reader.deserialize::<CustomerRecord>().enumerate() {
            let customer = result
                .map_err(anyhow::Error::from)
                .and_then(DomainCustomer::try_from)
                .with_context(|| format!("Unreadable record {} in {}", index + 1, path.display()))?;
            customers.push(customer);
        }

        debug!("Read {} customers from {}", customers.len(), path.display());
        Ok(customers)
    }

    /// Rewrite the whole customers file
    fn write_customers(&self, customers: &[DomainCustomer]) -> Result<()> {
        let mut writer = WriterBuilder::new().has_headers(false).from_writer(Vec::new());
        writer.write_record(HEADER)?;
        for customer in customers {
            writer.serialize(CustomerRecord::from(customer))?;
        }
        let bytes = writer.into_inner().context("Failed to flush customers CSV")?;

        self.connection
            .write_atomically(&self.connection.customers_file_path(), &bytes)
    }
}

impl CustomerStorage for CustomerRepository {
    fn store_customer(&self, customer: &DomainCustomer) -> Result<()> {
        info!("Storing customer in CSV: {}", customer.id);

        let mut customers = self.read_customers()?;
        if customers.iter().any(|c| c.id == customer.id) {
            return Err(anyhow::anyhow!("Customer already exists: {}", customer.id));
        }
        customers.push(customer.clone());
        self.write_customers(&customers)
    }

    fn get_customer(&self, customer_id: &str) -> Result<Option<DomainCustomer>> {
        let customers = self.read_customers()?;
        Ok(customers.into_iter().find(|c| c.id == customer_id))
    }

    fn list_customers(&self) -> Result<Vec<DomainCustomer>> {
        let mut customers = self.read_customers()?;
        customers.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(customers)
    }

    fn update_customer(&self, customer: &DomainCustomer) -> Result<bool> {
        let mut customers = self.read_customers()?;

        match customers.iter_mut().find(|c| c.id == customer.id) {
            Some(existing) => {
                *existing = customer.clone();
                self.write_customers(&customers)?;
                info!("Updated customer: {}", customer.id);
                Ok(true)
            }
            None => {
                warn!("Customer not found for update: {}", customer.id);
                Ok(false)
            }
        }
    }

    fn delete_customer(&self, customer_id: &str) -> Result<bool> {
        let mut customers = self.read_customers()?;
        let initial_len = customers.len();
        customers.retain(|c| c.id != customer_id);

        if customers.len() < initial_len {
            self.write_customers(&customers)?;
            info!("Deleted customer: {}", customer_id);
            Ok(true)
        } else {
            warn!("Customer not found for deletion: {}", customer_id);
            Ok(false)
        }
    }
}
