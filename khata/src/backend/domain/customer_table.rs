//! Display formatting for the customer list and a customer's ledger.
//!
//! Turns domain values into the strings shown to the vendor: relative
//! last-visit labels, rupee amounts and per-entry lines. Everything here is
//! pure; callers pass in the clock and timezone so output is reproducible.

use chrono::{DateTime, Datelike, TimeZone, Timelike, Utc};

use crate::backend::domain::models::entry::{Entry, EntryType};

const MILLIS_PER_DAY: i64 = 1000 * 60 * 60 * 24;

/// Hindi short month names, January first
const MONTHS_SHORT: [&str; 12] = [
    "जन॰", "फ़र॰", "मार्च", "अप्रैल", "मई", "जून", "जुल॰", "अग॰", "सित॰", "अक्तू॰", "नव॰", "दिस॰",
];

/// Date as `D/M/YYYY` in the given timezone
pub fn short_date<Tz: TimeZone>(timestamp: &DateTime<Utc>, tz: &Tz) -> String {
    let local = timestamp.with_timezone(tz);
    format!("{}/{}/{}", local.day(), local.month(), local.year())
}

/// Service for customer list and ledger presentation
#[derive(Clone, Debug, Default)]
pub struct CustomerTableService;

impl CustomerTableService {
    pub fn new() -> Self {
        Self
    }

    /// How long ago the customer was last seen.
    ///
    /// Days are whole 24 hour periods, so something 23 hours ago is still
    /// "today" even if the calendar date changed.
    pub fn last_visit_label<Tz: TimeZone>(
        &self,
        last_visit: Option<DateTime<Utc>>,
        now: &DateTime<Tz>,
    ) -> String {
        let Some(last_visit) = last_visit else {
            return "कभी नहीं".to_string();
        };

        let elapsed_ms = now.timestamp_millis() - last_visit.timestamp_millis();
        let diff_days = elapsed_ms.div_euclid(MILLIS_PER_DAY);

        match diff_days {
            // Clock skew can put an entry slightly in the future
            d if d <= 0 => "आज".to_string(),
            1 => "कल".to_string(),
            d if d < 7 => format!("{} दिन पहले", d),
            _ => short_date(&last_visit, &now.timezone()),
        }
    }

    /// `₹` amount, without decimals when it is a whole number
    pub fn format_rupees(&self, amount: f64) -> String {
        if amount.fract() == 0.0 {
            format!("₹{}", amount as i64)
        } else {
            format!("₹{:.2}", amount)
        }
    }

    /// Date and time of an entry, e.g. `18 अक्तू॰ 2024, 14:05`
    pub fn format_date_time<Tz: TimeZone>(&self, timestamp: &DateTime<Utc>, tz: &Tz) -> String {
        let local = timestamp.with_timezone(tz);
        format!(
            "{} {} {}, {:02}:{:02}",
            local.day(),
            MONTHS_SHORT[local.month0() as usize],
            local.year(),
            local.hour(),
            local.minute()
        )
    }

    /// Label for one ledger line
    pub fn entry_label(&self, entry: &Entry) -> String {
        match entry.entry_type {
            EntryType::Sale => format!("+{} कप", entry.qty),
            EntryType::Settlement => format!("भुगतान: {} कप", entry.qty),
        }
    }

    /// Format a customer's entries for display, keeping their order
    pub fn format_entries<Tz: TimeZone>(
        &self,
        entries: &[Entry],
        price_per_cup: f64,
        tz: &Tz,
    ) -> Vec<shared::FormattedEntry> {
        entries
            .iter()
            .map(|entry| self.format_entry(entry, price_per_cup, tz))
            .collect()
    }

    pub fn format_entry<Tz: TimeZone>(
        &self,
        entry: &Entry,
        price_per_cup: f64,
        tz: &Tz,
    ) -> shared::FormattedEntry {
        shared::FormattedEntry {
            id: entry.id.clone(),
            label: self.entry_label(entry),
            note: entry.note.clone(),
            formatted_value: self.format_rupees(entry.qty as f64 * price_per_cup),
            formatted_date: self.format_date_time(&entry.timestamp, tz),
            entry_type: match entry.entry_type {
                EntryType::Sale => shared::EntryType::Sale,
                EntryType::Settlement => shared::EntryType::Settlement,
            },
            raw_qty: entry.qty,
            raw_timestamp: entry
                .timestamp
                .to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
        }
    }
}
