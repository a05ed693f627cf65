//! Entry service: appends sales and settlements to a customer's ledger.
//!
//! The ledger is append-only. Nothing here edits or removes an entry; the
//! only way entries disappear is deleting the customer they belong to.
use anyhow::Result;
use chrono::{DateTime, Duration, TimeZone, Utc};
use log::{debug, info};
use std::sync::Arc;

use crate::backend::domain::balance_service::{compute_balance, BalanceService};
use crate::backend::domain::commands::entry::{
    AddSaleCommand, EntryListQuery, EntryListResult, RecordEntryResult, SettleCommand,
};
use crate::backend::domain::customer_service::CustomerService;
use crate::backend::domain::errors::KhataError;
use crate::backend::domain::models::entry::{Entry as DomainEntry, EntryType};
use crate::backend::storage::csv::{CsvConnection, EntryRepository};
use crate::backend::storage::traits::EntryStorage;

/// Largest quantity a single sale may record
pub const MAX_CUPS_PER_SALE: u32 = 1_000;

/// Note written on every settlement entry
pub fn settlement_note(cups: u32) -> String {
    format!("{} कप का भुगतान", cups)
}

#[derive(Clone)]
pub struct EntryService {
    entry_repository: EntryRepository,
    customer_service: CustomerService,
    balance_service: BalanceService,
}

impl EntryService {
    pub fn new(
        connection: Arc<CsvConnection>,
        customer_service: CustomerService,
        balance_service: BalanceService,
    ) -> Self {
        let entry_repository = EntryRepository::new((*connection).clone());
        Self {
            entry_repository,
            customer_service,
            balance_service,
        }
    }

    /// Record cups taken on credit. Quantity defaults to one cup.
    ///
    /// Nothing is written unless the new outstanding count still fits.
    pub fn add_sale(&self, command: AddSaleCommand) -> Result<RecordEntryResult> {
        let qty = command.qty.unwrap_or(1);
        if qty == 0 || qty > MAX_CUPS_PER_SALE {
            return Err(KhataError::InvalidQuantity {
                qty,
                max: MAX_CUPS_PER_SALE,
            }
            .into());
        }

        let customer = self.customer_service.require_customer(&command.customer_id)?;
        let history = self.entry_repository.list_entries(&customer.id)?;

        let outstanding = compute_balance(&history)?.cups;
        if outstanding.checked_add(qty).is_none() {
            return Err(KhataError::CupCountOverflow(customer.id).into());
        }

        let note = command
            .note
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty());

        let entry = self.build_entry(&customer.id, EntryType::Sale, qty, note, &history);
        self.save_entry(&entry)?;

        let balance = self.balance_service.get_customer_balance(&customer.id)?;
        info!(
            "Recorded sale of {} cups for {} (now {} outstanding)",
            qty, customer.name, balance.cups
        );

        Ok(RecordEntryResult {
            entry,
            balance,
            success_message: format!("{} को {} कप लिखे गए", customer.name, qty),
        })
    }

    /// Settle everything the customer currently owes
    pub fn settle(&self, command: SettleCommand) -> Result<RecordEntryResult> {
        let customer = self.customer_service.require_customer(&command.customer_id)?;
        let history = self.entry_repository.list_entries(&customer.id)?;

        let cups = compute_balance(&history)?.cups;
        if cups == 0 {
            return Err(KhataError::NothingToSettle(customer.id).into());
        }

        let entry = self.build_entry(
            &customer.id,
            EntryType::Settlement,
            cups,
            Some(settlement_note(cups)),
            &history,
        );
        self.save_entry(&entry)?;

        let balance = self.balance_service.get_customer_balance(&customer.id)?;
        info!("Settled {} cups for {}", cups, customer.name);

        Ok(RecordEntryResult {
            entry,
            balance,
            success_message: format!("{}: {}", customer.name, settlement_note(cups)),
        })
    }

    /// A customer's entries, newest first
    pub fn list_entries(&self, query: EntryListQuery) -> Result<EntryListResult> {
        let entries = self.entry_repository.list_entries(&query.customer_id)?;
        debug!("Found {} entries for {}", entries.len(), query.customer_id);
        Ok(EntryListResult { entries })
    }

    /// Every entry in the ledger, newest first
    pub fn list_all_entries(&self) -> Result<EntryListResult> {
        let entries = self.entry_repository.list_all_entries()?;
        Ok(EntryListResult { entries })
    }

    /// Append an entry as-is
    pub fn save_entry(&self, entry: &DomainEntry) -> Result<()> {
        self.entry_repository.store_entry(entry)
    }

    fn build_entry(
        &self,
        customer_id: &str,
        entry_type: EntryType,
        qty: u32,
        note: Option<String>,
        history: &[DomainEntry],
    ) -> DomainEntry {
        let timestamp = next_timestamp(now_millis_precision(), history);

        DomainEntry {
            id: DomainEntry::generate_id(timestamp.timestamp_millis() as u64),
            customer_id: customer_id.to_string(),
            qty,
            note,
            entry_type,
            timestamp,
        }
    }
}

/// Current time truncated to what storage keeps
fn now_millis_precision() -> DateTime<Utc> {
    let now = Utc::now();
    Utc.timestamp_millis_opt(now.timestamp_millis())
        .single()
        .unwrap_or(now)
}

/// Keep entry timestamps strictly increasing per customer.
///
/// A new entry that would land on or before the newest existing one is moved
/// to one millisecond after it.
fn next_timestamp(now: DateTime<Utc>, history: &[DomainEntry]) -> DateTime<Utc> {
    match history.iter().map(|e| e.timestamp).max() {
        Some(latest) if latest >= now => {
            let adjusted = latest + Duration::milliseconds(1);
            debug!("Timestamp conflict at {}, using {}", now, adjusted);
            adjusted
        }
        _ => now,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::domain::commands::customer::CreateCustomerCommand;
    use crate::backend::storage::csv::test_utils::{at_millis, entry_at, TestEnvironment};

    fn setup_test() -> (TestEnvironment, EntryService, String) {
        let env = TestEnvironment::new().unwrap();
        let connection = Arc::new(env.connection.clone());
        let customer_service = CustomerService::new(connection.clone());
        let balance_service = BalanceService::new(connection.clone());

        let customer = customer_service
            .create_customer(CreateCustomerCommand {
                name: "Ramesh".to_string(),
                price_per_cup: Some(10.0),
            })
            .unwrap()
            .customer;

        let service = EntryService::new(connection, customer_service, balance_service);
        (env, service, customer.id)
    }

    fn sale(service: &EntryService, customer_id: &str, qty: Option<u32>) -> RecordEntryResult {
        service
            .add_sale(AddSaleCommand {
                customer_id: customer_id.to_string(),
                qty,
                note: None,
            })
            .unwrap()
    }

    #[test]
    fn test_add_sale_defaults_to_one_cup() {
        let (_env, service, customer_id) = setup_test();

        let result = sale(&service, &customer_id, None);
        assert_eq!(result.entry.qty, 1);
        assert_eq!(result.entry.entry_type, EntryType::Sale);
        assert_eq!(result.balance.cups, 1);
        assert_eq!(result.balance.last_visit, Some(result.entry.timestamp));
    }

    #[test]
    fn test_add_sale_rejects_zero_and_unknown_customer() {
        let (_env, service, customer_id) = setup_test();

        let err = service
            .add_sale(AddSaleCommand {
                customer_id: customer_id.clone(),
                qty: Some(0),
                note: None,
            })
            .unwrap_err();
        assert_eq!(
            err.downcast_ref::<KhataError>(),
            Some(&KhataError::InvalidQuantity { qty: 0, max: MAX_CUPS_PER_SALE })
        );

        let err = service
            .add_sale(AddSaleCommand {
                customer_id: "customer::404".to_string(),
                qty: Some(1),
                note: None,
            })
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<KhataError>(),
            Some(KhataError::CustomerNotFound(_))
        ));
    }

    #[test]
    fn test_add_sale_rejects_huge_quantity_before_writing() {
        let (_env, service, customer_id) = setup_test();

        for qty in [MAX_CUPS_PER_SALE + 1, 3_000_000_000] {
            let err = service
                .add_sale(AddSaleCommand {
                    customer_id: customer_id.clone(),
                    qty: Some(qty),
                    note: None,
                })
                .unwrap_err();
            assert_eq!(
                err.downcast_ref::<KhataError>(),
                Some(&KhataError::InvalidQuantity { qty, max: MAX_CUPS_PER_SALE })
            );
        }

        let result = sale(&service, &customer_id, Some(MAX_CUPS_PER_SALE));
        assert_eq!(result.balance.cups, MAX_CUPS_PER_SALE);

        let entries = service.list_entries(EntryListQuery { customer_id }).unwrap().entries;
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn test_add_sale_refuses_to_overflow_outstanding_cups() {
        let (_env, service, customer_id) = setup_test();

        // A count this high can only come from an edited data file
        let near_limit = entry_at("entry::1::aaaa", &customer_id, EntryType::Sale, u32::MAX - 10, 1);
        service.save_entry(&near_limit).unwrap();

        let err = service
            .add_sale(AddSaleCommand {
                customer_id: customer_id.clone(),
                qty: Some(11),
                note: None,
            })
            .unwrap_err();
        assert_eq!(
            err.downcast_ref::<KhataError>(),
            Some(&KhataError::CupCountOverflow(customer_id.clone()))
        );

        let entries = service
            .list_entries(EntryListQuery {
                customer_id: customer_id.clone(),
            })
            .unwrap()
            .entries;
        assert_eq!(entries.len(), 1);

        // Settling still works and clears the count
        let settled = service.settle(SettleCommand { customer_id }).unwrap();
        assert_eq!(settled.entry.qty, u32::MAX - 10);
        assert_eq!(settled.balance.cups, 0);
    }

    #[test]
    fn test_blank_note_is_dropped() {
        let (_env, service, customer_id) = setup_test();

        let result = service
            .add_sale(AddSaleCommand {
                customer_id,
                qty: Some(2),
                note: Some("   ".to_string()),
            })
            .unwrap();
        assert_eq!(result.entry.note, None);
    }

    #[test]
    fn test_settle_resets_balance() {
        let (_env, service, customer_id) = setup_test();

        sale(&service, &customer_id, Some(2));
        sale(&service, &customer_id, Some(3));

        let result = service
            .settle(SettleCommand {
                customer_id: customer_id.clone(),
            })
            .unwrap();
        assert_eq!(result.entry.entry_type, EntryType::Settlement);
        assert_eq!(result.entry.qty, 5);
        assert_eq!(result.entry.note.as_deref(), Some("5 कप का भुगतान"));
        assert_eq!(result.balance.cups, 0);

        // A sale right after the settlement starts a fresh count
        let after = sale(&service, &customer_id, Some(1));
        assert_eq!(after.balance.cups, 1);
    }

    #[test]
    fn test_settle_with_nothing_owed() {
        let (_env, service, customer_id) = setup_test();

        let err = service
            .settle(SettleCommand {
                customer_id: customer_id.clone(),
            })
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<KhataError>(),
            Some(KhataError::NothingToSettle(_))
        ));

        sale(&service, &customer_id, None);
        service
            .settle(SettleCommand {
                customer_id: customer_id.clone(),
            })
            .unwrap();
        assert!(service.settle(SettleCommand { customer_id }).is_err());
    }

    #[test]
    fn test_rapid_entries_get_increasing_timestamps() {
        let (_env, service, customer_id) = setup_test();

        for _ in 0..5 {
            sale(&service, &customer_id, None);
        }
        service
            .settle(SettleCommand {
                customer_id: customer_id.clone(),
            })
            .unwrap();
        let last = sale(&service, &customer_id, None);

        let entries = service.list_entries(EntryListQuery { customer_id }).unwrap().entries;
        assert_eq!(entries.len(), 7);
        for pair in entries.windows(2) {
            assert!(pair[0].timestamp > pair[1].timestamp);
        }
        assert_eq!(last.balance.cups, 1);
    }

    #[test]
    fn test_next_timestamp_moves_past_latest() {
        let history = vec![entry_at("e1", "c", EntryType::Sale, 1, 5_000)];

        assert_eq!(next_timestamp(at_millis(9_000), &history), at_millis(9_000));
        assert_eq!(next_timestamp(at_millis(5_000), &history), at_millis(5_001));
        assert_eq!(next_timestamp(at_millis(4_000), &history), at_millis(5_001));
        assert_eq!(next_timestamp(at_millis(1), &[]), at_millis(1));
    }

    #[test]
    fn test_list_all_entries_across_customers() {
        let (env, service, customer_id) = setup_test();
        let other = CustomerService::new(Arc::new(env.connection.clone()))
            .create_customer(CreateCustomerCommand {
                name: "Suresh".to_string(),
                price_per_cup: None,
            })
            .unwrap()
            .customer;

        sale(&service, &customer_id, None);
        sale(&service, &other.id, Some(2));

        let all = service.list_all_entries().unwrap().entries;
        assert_eq!(all.len(), 2);
        assert!(all[0].timestamp >= all[1].timestamp);
    }
}
