use serde::{Deserialize, Serialize};

/// Customer ID in format: "customer::epoch_millis"
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    pub id: String,
    pub name: String,
    /// Price charged per cup; falls back to the default price when absent
    pub price_per_cup: Option<f64>,
    pub created_at: String, // RFC 3339 timestamp
}

/// Kind of ledger entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryType {
    /// Cups served on credit
    Sale,
    /// Payment that clears everything before it
    Settlement,
}

/// Entry ID in format: "entry::epoch_millis::suffix"
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    pub id: String,
    pub customer_id: String,
    pub qty: u32,
    pub note: Option<String>,
    pub entry_type: EntryType,
    pub timestamp: String, // RFC 3339 timestamp
}

/// Outstanding cups for a customer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerBalance {
    pub cups: u32,
    /// Newest entry of any type, None if the customer has no entries
    pub last_visit: Option<String>,
}

/// A customer row for the list screen
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerSummary {
    pub customer: Customer,
    pub balance: CustomerBalance,
    pub price_per_cup: f64,
    pub amount_due: f64,
    pub last_visit_label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerListResponse {
    pub customers: Vec<CustomerSummary>,
    pub total_cups: u64,
    pub total_amount_due: f64,
}

/// Response after creating or updating a customer
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CustomerResponse {
    pub customer: Customer,
    pub success_message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DeleteCustomerResponse {
    pub deleted_entries: usize,
    pub success_message: String,
}

/// Full ledger view for a single customer
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CustomerDetailResponse {
    pub customer: Customer,
    pub balance: CustomerBalance,
    pub price_per_cup: f64,
    pub amount_due: f64,
    pub entries: Vec<FormattedEntry>,
}

/// Entry prepared for display
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FormattedEntry {
    pub id: String,
    pub label: String,
    pub note: Option<String>,
    pub formatted_value: String,
    pub formatted_date: String,
    pub entry_type: EntryType,
    pub raw_qty: u32,
    pub raw_timestamp: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EntryResponse {
    pub entry: Entry,
    pub balance: CustomerBalance,
    pub success_message: String,
}

/// Stored preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    pub pin_enabled: bool,
    pub default_price: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SettingsResponse {
    pub settings: Settings,
    pub success_message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PinAttempt {
    pub id: i64,
    pub timestamp: String,
    pub success: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PinAttemptsResponse {
    pub attempts: Vec<PinAttempt>,
    pub total_attempts: usize,
    pub failed_attempts: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExportDataResponse {
    pub csv_content: String,
    pub filename: String,
    pub row_count: usize,
    pub customer_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExportToPathResponse {
    pub success: bool,
    pub message: String,
    pub file_path: String,
    pub row_count: usize,
    pub customer_count: usize,
}

impl Customer {
    /// Generate a customer ID based on timestamp
    pub fn generate_id(epoch_millis: u64) -> String {
        format!("customer::{}", epoch_millis)
    }
}

impl Entry {
    /// Generate an entry ID from the timestamp and a short disambiguating suffix
    pub fn generate_id(epoch_millis: u64, suffix: &str) -> String {
        format!("entry::{}::{}", epoch_millis, suffix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_customer_id() {
        let id = Customer::generate_id(1702516122000);
        assert_eq!(id, "customer::1702516122000");
    }

    #[test]
    fn test_generate_entry_id() {
        let id = Entry::generate_id(1702516125000, "af3c");
        assert_eq!(id, "entry::1702516125000::af3c");
    }

    #[test]
    fn test_entry_type_serializes_lowercase() {
        let json = serde_json::to_string(&EntryType::Settlement).unwrap();
        assert_eq!(json, "\"settlement\"");
        let parsed: EntryType = serde_json::from_str("\"sale\"").unwrap();
        assert_eq!(parsed, EntryType::Sale);
    }
}
