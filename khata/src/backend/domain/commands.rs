// khata/src/backend/domain/commands.rs

//! Domain-level command and query types
//! These structs are used by services inside the domain layer and are **not**
//! exposed to callers. The IO layer is responsible for mapping the public DTOs
//! defined in the `shared` crate to these internal types.

pub mod customer {
    use crate::backend::domain::models::customer::Customer;

    /// Input for creating a new customer.
    #[derive(Debug, Clone)]
    pub struct CreateCustomerCommand {
        pub name: String,
        /// None means use the current default price
        pub price_per_cup: Option<f64>,
    }

    /// Input for updating a customer. Fields left as None are unchanged.
    #[derive(Debug, Clone)]
    pub struct UpdateCustomerCommand {
        pub customer_id: String,
        pub name: Option<String>,
        pub price_per_cup: Option<f64>,
    }

    #[derive(Debug, Clone)]
    pub struct GetCustomerCommand {
        pub customer_id: String,
    }

    #[derive(Debug, Clone)]
    pub struct DeleteCustomerCommand {
        pub customer_id: String,
    }

    #[derive(Debug, Clone)]
    pub struct CreateCustomerResult {
        pub customer: Customer,
    }

    #[derive(Debug, Clone)]
    pub struct UpdateCustomerResult {
        pub customer: Customer,
    }

    #[derive(Debug, Clone)]
    pub struct GetCustomerResult {
        pub customer: Option<Customer>,
    }

    #[derive(Debug, Clone)]
    pub struct ListCustomersResult {
        pub customers: Vec<Customer>,
    }

    #[derive(Debug, Clone)]
    pub struct DeleteCustomerResult {
        pub customer: Customer,
        /// Number of ledger entries removed with the customer
        pub deleted_entries: usize,
        pub success_message: String,
    }
}

pub mod entry {
    use crate::backend::domain::models::entry::Entry;
    use crate::backend::domain::balance_service::CustomerBalance;

    /// Input for recording cups sold on credit.
    #[derive(Debug, Clone)]
    pub struct AddSaleCommand {
        pub customer_id: String,
        /// Defaults to a single cup
        pub qty: Option<u32>,
        pub note: Option<String>,
    }

    /// Input for settling everything a customer owes.
    #[derive(Debug, Clone)]
    pub struct SettleCommand {
        pub customer_id: String,
    }

    #[derive(Debug, Clone)]
    pub struct EntryListQuery {
        pub customer_id: String,
    }

    /// Result of appending an entry, with the balance after it.
    #[derive(Debug, Clone)]
    pub struct RecordEntryResult {
        pub entry: Entry,
        pub balance: CustomerBalance,
        pub success_message: String,
    }

    #[derive(Debug, Clone)]
    pub struct EntryListResult {
        pub entries: Vec<Entry>,
    }
}

pub mod settings {
    use crate::backend::domain::models::settings::Settings;

    /// Input for changing preferences.
    #[derive(Debug, Clone, Default)]
    pub struct UpdateSettingsCommand {
        pub default_price: Option<f64>,
        /// Some(Some(pin)) enables the gate, Some(None) turns it off
        pub pin: Option<Option<String>>,
    }

    #[derive(Debug, Clone)]
    pub struct UpdateSettingsResult {
        pub settings: Settings,
        pub success_message: String,
    }
}

pub mod pin {
    /// Input for checking a PIN.
    #[derive(Debug, Clone)]
    pub struct ValidatePinCommand {
        pub pin: String,
    }

    #[derive(Debug, Clone)]
    pub struct ValidatePinResult {
        pub success: bool,
        pub message: String,
    }
}

pub mod export {
    /// Input for writing the CSV export to disk.
    #[derive(Debug, Clone, Default)]
    pub struct ExportToPathCommand {
        pub custom_path: Option<String>,
    }

    /// CSV content ready to be saved or printed.
    #[derive(Debug, Clone)]
    pub struct ExportDataResult {
        pub csv_content: String,
        pub filename: String,
        pub row_count: usize,
        /// Customers that contributed at least one row
        pub customer_count: usize,
    }

    #[derive(Debug, Clone)]
    pub struct ExportToPathResult {
        pub success: bool,
        pub message: String,
        pub file_path: String,
        pub row_count: usize,
        pub customer_count: usize,
    }
}
