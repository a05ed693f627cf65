//! Export service domain logic for the ledger.
//!
//! Produces a spreadsheet-friendly CSV of every entry, grouped by customer,
//! and optionally writes it to disk. Column headings and entry types are in
//! Hindi to match what the vendor sees in the app.

use anyhow::{Context, Result};
use chrono::{Local, TimeZone, Utc};
use csv::WriterBuilder;
use log::{error, info};
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use crate::backend::domain::commands::export::{ExportDataResult, ExportToPathCommand, ExportToPathResult};
use crate::backend::domain::customer_service::CustomerService;
use crate::backend::domain::customer_table::short_date;
use crate::backend::domain::entry_service::EntryService;
use crate::backend::domain::models::customer::Customer as DomainCustomer;
use crate::backend::domain::models::entry::{Entry as DomainEntry, EntryType};

pub const EXPORT_HEADER: [&str; 5] = ["ग्राहक का नाम", "कप संख्या", "प्रकार", "टिप्पणी", "तारीख"];

/// Lets spreadsheet apps detect UTF-8 so Devanagari renders correctly
const UTF8_BOM: &str = "\u{feff}";

/// Type column label for an entry
pub fn entry_type_label(entry_type: EntryType) -> &'static str {
    match entry_type {
        EntryType::Sale => "बिक्री",
        EntryType::Settlement => "भुगतान",
    }
}

/// CSV text plus how much of the ledger went into it
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedCsv {
    pub content: String,
    pub row_count: usize,
    /// Customers with at least one exported row
    pub customer_count: usize,
}

/// Export service that handles all export-related business logic
#[derive(Clone, Debug, Default)]
pub struct ExportService;

impl ExportService {
    pub fn new() -> Self {
        Self
    }

    /// Build the CSV for the whole ledger, dates in the local timezone
    pub fn export_csv(
        &self,
        customer_service: &CustomerService,
        entry_service: &EntryService,
    ) -> Result<ExportDataResult> {
        info!("Exporting ledger as CSV");

        let customers = customer_service.list_customers()?.customers;
        let entries = entry_service.list_all_entries()?.entries;

        let rendered = self.render_csv(&customers, &entries, &Local)?;
        let filename = format!("chai-khata-{}.csv", Utc::now().timestamp_millis());

        info!(
            "Exported {} rows for {} of {} customers ({} bytes) as {}",
            rendered.row_count,
            rendered.customer_count,
            customers.len(),
            rendered.content.len(),
            filename
        );

        Ok(ExportDataResult {
            csv_content: rendered.content,
            filename,
            row_count: rendered.row_count,
            customer_count: rendered.customer_count,
        })
    }

    /// Render rows grouped by customer in the order given, each customer's
    /// entries newest first. Customers without entries add no rows.
    pub fn render_csv<Tz: TimeZone>(
        &self,
        customers: &[DomainCustomer],
        entries: &[DomainEntry],
        tz: &Tz,
    ) -> Result<RenderedCsv> {
        let mut by_customer: HashMap<&str, Vec<&DomainEntry>> = HashMap::new();
        for entry in entries {
            by_customer.entry(entry.customer_id.as_str()).or_default().push(entry);
        }

        let mut writer = WriterBuilder::new().has_headers(false).from_writer(Vec::new());
        writer.write_record(EXPORT_HEADER)?;

        let mut row_count = 0;
        let mut customer_count = 0;
        for customer in customers {
            let Some(customer_entries) = by_customer.get_mut(customer.id.as_str()) else {
                continue;
            };
            customer_count += 1;
            customer_entries.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));

            for entry in customer_entries.iter() {
                let qty = entry.qty.to_string();
                let date = short_date(&entry.timestamp, tz);
                writer.write_record([
                    customer.name.as_str(),
                    qty.as_str(),
                    entry_type_label(entry.entry_type),
                    entry.note.as_deref().unwrap_or(""),
                    date.as_str(),
                ])?;
                row_count += 1;
            }
        }

        let bytes = writer.into_inner().context("Failed to flush export CSV")?;
        let content = String::from_utf8(bytes).context("Export CSV is not valid UTF-8")?;
        Ok(RenderedCsv {
            content,
            row_count,
            customer_count,
        })
    }

    /// Write the export to a directory (or the default location)
    pub fn export_to_path(
        &self,
        command: ExportToPathCommand,
        customer_service: &CustomerService,
        entry_service: &EntryService,
    ) -> Result<ExportToPathResult> {
        info!("Exporting to path - custom_path: {:?}", command.custom_path);

        let export = self.export_csv(customer_service, entry_service)?;

        let export_dir = match command.custom_path {
            Some(custom_path) if !custom_path.trim().is_empty() => {
                PathBuf::from(self.sanitize_path(&custom_path))
            }
            _ => match dirs::document_dir().or_else(dirs::home_dir) {
                Some(dir) => dir,
                None => {
                    error!("Could not determine default export directory");
                    return Ok(ExportToPathResult {
                        success: false,
                        message: "Failed to determine export directory".to_string(),
                        file_path: String::new(),
                        row_count: 0,
                        customer_count: 0,
                    });
                }
            },
        };

        if let Err(e) = fs::create_dir_all(&export_dir) {
            error!("Failed to create export directory {:?}: {}", export_dir, e);
            return Ok(ExportToPathResult {
                success: false,
                message: format!("Failed to create export directory: {}", e),
                file_path: export_dir.to_string_lossy().to_string(),
                row_count: 0,
                customer_count: 0,
            });
        }

        let file_path = export_dir.join(&export.filename);
        let file_path_str = file_path.to_string_lossy().to_string();
        let contents = format!("{}{}", UTF8_BOM, export.csv_content);

        match fs::write(&file_path, contents) {
            Ok(()) => {
                info!("Exported {} rows to: {}", export.row_count, file_path_str);
                Ok(ExportToPathResult {
                    success: true,
                    message: format!("File exported successfully to: {}", file_path_str),
                    file_path: file_path_str,
                    row_count: export.row_count,
                    customer_count: export.customer_count,
                })
            }
            Err(e) => {
                error!("Failed to write export file to {:?}: {}", file_path, e);
                Ok(ExportToPathResult {
                    success: false,
                    message: format!("Failed to write export file: {}", e),
                    file_path: file_path_str,
                    row_count: 0,
                    customer_count: 0,
                })
            }
        }
    }

    /// Tidy a user-typed directory: quotes, escaped spaces, trailing slashes and `~`
    fn sanitize_path(&self, path: &str) -> String {
        let mut cleaned = path.trim();

        for quote in ['"', '\''] {
            if cleaned.len() >= 2 && cleaned.starts_with(quote) && cleaned.ends_with(quote) {
                cleaned = &cleaned[1..cleaned.len() - 1];
            }
        }

        let mut cleaned = cleaned.trim().replace("\\ ", " ");
        while cleaned.len() > 1 && (cleaned.ends_with('/') || cleaned.ends_with('\\')) {
            cleaned.pop();
        }

        if let Some(home) = dirs::home_dir() {
            if cleaned == "~" {
                return home.to_string_lossy().to_string();
            }
            if let Some(rest) = cleaned.strip_prefix("~/").or_else(|| cleaned.strip_prefix("~\\")) {
                return home.join(rest).to_string_lossy().to_string();
            }
        }

        cleaned
    }
}
