//! Balance computation for the ledger.
//!
//! A customer's outstanding balance is never stored. It is rebuilt from the
//! entry log every time it is needed:
//!
//! 1. The newest `Settlement` entry marks the cutoff.
//! 2. Outstanding cups are the sum of `Sale` quantities strictly after the cutoff.
//! 3. The last visit is the newest entry of any kind.
//!
//! Settlement quantities are only a record of what was paid; they never
//! subtract from the count. A count that no longer fits in a `u32` is reported
//! as [`KhataError::CupCountOverflow`].

use anyhow::Result;
use chrono::{DateTime, Utc};
use log::{debug, info};
use std::collections::HashMap;
use std::sync::Arc;

use crate::backend::domain::errors::KhataError;
use crate::backend::domain::models::customer::Customer as DomainCustomer;
use crate::backend::domain::models::entry::Entry as DomainEntry;
use crate::backend::domain::models::settings::Settings;
use crate::backend::storage::csv::{CsvConnection, CustomerRepository, EntryRepository, SettingsRepository};
use crate::backend::storage::traits::{CustomerStorage, EntryStorage, SettingsStorage};

/// Outstanding cups for one customer
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CustomerBalance {
    pub cups: u32,
    /// None when the customer has no entries at all
    pub last_visit: Option<DateTime<Utc>>,
}

/// A customer together with what they currently owe
#[derive(Debug, Clone, PartialEq)]
pub struct CustomerSummary {
    pub customer: DomainCustomer,
    pub balance: CustomerBalance,
    pub price_per_cup: f64,
    pub amount_due: f64,
}

/// Shop-wide outstanding totals
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LedgerTotals {
    pub total_cups: u64,
    pub total_amount_due: f64,
}

/// Rebuild the outstanding balance from a customer's entries.
///
/// The input does not need to be sorted.
pub fn compute_balance(entries: &[DomainEntry]) -> Result<CustomerBalance> {
    let last_settlement = entries
        .iter()
        .filter(|e| e.is_settlement())
        .map(|e| e.timestamp)
        .max();

    let cups = entries
        .iter()
        .filter(|e| e.is_sale())
        .filter(|e| last_settlement.map_or(true, |cutoff| e.timestamp > cutoff))
        .try_fold(0u32, |total, e| {
            total
                .checked_add(e.qty)
                .ok_or_else(|| KhataError::CupCountOverflow(e.customer_id.clone()))
        })?;

    let last_visit = entries.iter().map(|e| e.timestamp).max();

    Ok(CustomerBalance { cups, last_visit })
}

/// Money owed for the given cups at the customer's effective price
pub fn amount_due(customer: &DomainCustomer, balance: &CustomerBalance, settings: &Settings) -> f64 {
    balance.cups as f64 * customer.effective_price(settings.default_price)
}

/// Service responsible for balance lookups and summaries
#[derive(Clone)]
pub struct BalanceService {
    customer_repository: CustomerRepository,
    entry_repository: EntryRepository,
    settings_repository: SettingsRepository,
}

impl BalanceService {
    pub fn new(csv_conn: Arc<CsvConnection>) -> Self {
        Self {
            customer_repository: CustomerRepository::new((*csv_conn).clone()),
            entry_repository: EntryRepository::new((*csv_conn).clone()),
            settings_repository: SettingsRepository::new((*csv_conn).clone()),
        }
    }

    /// Current balance for one customer
    pub fn get_customer_balance(&self, customer_id: &str) -> Result<CustomerBalance> {
        let entries = self.entry_repository.list_entries(customer_id)?;
        let balance = compute_balance(&entries)?;

        debug!(
            "Balance for {}: {} cups over {} entries",
            customer_id,
            balance.cups,
            entries.len()
        );
        Ok(balance)
    }

    /// Balance plus price and amount due for one customer
    pub fn summarize_customer(&self, customer: &DomainCustomer) -> Result<CustomerSummary> {
        let settings = self.settings_repository.get_settings()?;
        let balance = self.get_customer_balance(&customer.id)?;
        Ok(Self::build_summary(customer.clone(), balance, &settings))
    }

    /// Every customer with their balance, newest customer first
    pub fn summaries(&self) -> Result<Vec<CustomerSummary>> {
        let settings = self.settings_repository.get_settings()?;
        let customers = self.customer_repository.list_customers()?;

        let mut entries_by_customer: HashMap<String, Vec<DomainEntry>> = HashMap::new();
        for entry in self.entry_repository.list_all_entries()? {
            entries_by_customer
                .entry(entry.customer_id.clone())
                .or_default()
                .push(entry);
        }

        let summaries = customers
            .into_iter()
            .map(|customer| {
                let balance = match entries_by_customer.get(&customer.id) {
                    Some(entries) => compute_balance(entries)?,
                    None => CustomerBalance::default(),
                };
                Ok(Self::build_summary(customer, balance, &settings))
            })
            .collect::<Result<Vec<CustomerSummary>>>()?;

        info!("Computed balances for {} customers", summaries.len());
        Ok(summaries)
    }

    /// Add up what every customer owes
    pub fn totals(summaries: &[CustomerSummary]) -> LedgerTotals {
        summaries.iter().fold(LedgerTotals::default(), |mut acc, s| {
            acc.total_cups += u64::from(s.balance.cups);
            acc.total_amount_due += s.amount_due;
            acc
        })
    }

    fn build_summary(customer: DomainCustomer, balance: CustomerBalance, settings: &Settings) -> CustomerSummary {
        let price_per_cup = customer.effective_price(settings.default_price);
        let amount_due = amount_due(&customer, &balance, settings);
        CustomerSummary {
            customer,
            balance,
            price_per_cup,
            amount_due,
        }
    }
}
