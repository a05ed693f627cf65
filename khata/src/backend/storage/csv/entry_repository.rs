//! # CSV Entry Repository
//!
//! Every ledger entry for every customer is kept in one `entries.csv`:
//!
//! ```csv
//! id,customer_id,qty,note,entry_type,timestamp
//! entry::1729238400000::0a1f,customer::1729238000000,1,,sale,2024-10-18T08:00:00.000Z
//! entry::1729242000000::93bc,customer::1729238000000,1,1 कप का भुगतान,settlement,2024-10-18T09:00:00.000Z
//! ```
//!
//! Rows are kept in chronological order on disk; readers sort as they need.

use anyhow::{Context, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use csv::{Reader, WriterBuilder};
use log::{debug, info};
use serde::{Deserialize, Serialize};

use super::connection::CsvConnection;
use crate::backend::domain::models::entry::{Entry as DomainEntry, EntryType};
use crate::backend::storage::traits::EntryStorage;

const HEADER: [&str; 6] = ["id", "customer_id", "qty", "note", "entry_type", "timestamp"];

/// CSV record structure for ledger entries
#[derive(Debug, Clone, Serialize, Deserialize)]
struct EntryRecord {
    id: String,
    customer_id: String,
    qty: u32,
    note: Option<String>,
    entry_type: EntryType,
    timestamp: String,
}

impl From<&DomainEntry> for EntryRecord {
    fn from(entry: &DomainEntry) -> Self {
        EntryRecord {
            id: entry.id.clone(),
            customer_id: entry.customer_id.clone(),
            qty: entry.qty,
            note: entry.note.clone(),
            entry_type: entry.entry_type,
            timestamp: entry.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }
}

impl TryFrom<EntryRecord> for DomainEntry {
    type Error = anyhow::Error;

    fn try_from(record: EntryRecord) -> Result<Self> {
        let timestamp = DateTime::parse_from_rfc3339(&record.timestamp)
            .with_context(|| format!("Invalid timestamp for entry {}", record.id))?
            .with_timezone(&Utc);

        Ok(DomainEntry {
            id: record.id,
            customer_id: record.customer_id,
            qty: record.qty,
            note: record.note.filter(|n| !n.is_empty()),
            entry_type: record.entry_type,
            timestamp,
        })
    }
}

/// CSV-based entry repository
#[derive(Clone)]
pub struct EntryRepository {
    connection: CsvConnection,
}

impl EntryRepository {
    /// Create a new CSV entry repository
    pub fn new(connection: CsvConnection) -> Self {
        Self { connection }
    }

    /// Read all entries in file order
    fn read_entries(&self) -> Result<Vec<DomainEntry>> {
        let path = self.connection.entries_file_path();
        self.connection.ensure_csv_file_exists(&path, &HEADER)?;

        let mut reader = Reader::from_path(&path)
            .with_context(|| format!("Failed to open {}", path.display()))?;

        let mut entries = Vec::new();
        // A bad row fails the whole read so the next rewrite can't drop it
        for (index, result) in reader.deserialize::<EntryRecord>().enumerate() {
            let entry = result
                .map_err(anyhow::Error::from)
                .and_then(DomainEntry::try_from)
                .with_context(|| format!("Unreadable record {} in {}", index + 1, path.display()))?;
            entries.push(entry);
        }

        debug!("Read {} entries from {}", entries.len(), path.display());
        Ok(entries)
    }

    /// Rewrite the whole entries file in chronological order
    fn write_entries(&self, entries: &mut Vec<DomainEntry>) -> Result<()> {
        entries.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));

        let mut writer = WriterBuilder::new().has_headers(false).from_writer(Vec::new());
        writer.write_record(HEADER)?;
        for entry in entries.iter() {
            writer.serialize(EntryRecord::from(entry))?;
        }
        let bytes = writer.into_inner().context("Failed to flush entries CSV")?;

        self.connection
            .write_atomically(&self.connection.entries_file_path(), &bytes)
    }

    fn newest_first(mut entries: Vec<DomainEntry>) -> Vec<DomainEntry> {
        entries.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        entries
    }
}

impl EntryStorage for EntryRepository {
    fn store_entry(&self, entry: &DomainEntry) -> Result<()> {
        info!("Storing entry in CSV: {} for {}", entry.id, entry.customer_id);

        let mut entries = self.read_entries()?;
        if entries.iter().any(|e| e.id == entry.id) {
            return Err(anyhow::anyhow!("Entry already exists: {}", entry.id));
        }
        entries.push(entry.clone());
        self.write_entries(&mut entries)
    }

    fn list_entries(&self, customer_id: &str) -> Result<Vec<DomainEntry>> {
        let mut entries = self.read_entries()?;
        entries.retain(|e| e.customer_id == customer_id);
        Ok(Self::newest_first(entries))
    }

    fn list_all_entries(&self) -> Result<Vec<DomainEntry>> {
        Ok(Self::newest_first(self.read_entries()?))
    }

    fn delete_entries_for_customer(&self, customer_id: &str) -> Result<usize> {
        let mut entries = self.read_entries()?;
        let initial_len = entries.len();
        entries.retain(|e| e.customer_id != customer_id);

        let deleted = initial_len - entries.len();
        if deleted > 0 {
            self.write_entries(&mut entries)?;
            info!("Deleted {} entries for customer {}", deleted, customer_id);
        }

        Ok(deleted)
    }
}
