use anyhow::Result;
use chrono::{TimeZone, Utc};
use log::{info, warn};
use std::sync::Arc;

use crate::backend::domain::commands::customer::{
    CreateCustomerCommand, CreateCustomerResult, DeleteCustomerCommand, DeleteCustomerResult,
    GetCustomerCommand, GetCustomerResult, ListCustomersResult, UpdateCustomerCommand,
    UpdateCustomerResult,
};
use crate::backend::domain::errors::KhataError;
use crate::backend::domain::models::customer::Customer as DomainCustomer;
use crate::backend::storage::csv::{CsvConnection, CustomerRepository, EntryRepository, SettingsRepository};
use crate::backend::storage::traits::{CustomerStorage, EntryStorage, SettingsStorage};

const MAX_NAME_CHARS: usize = 100;

/// Service for managing the customers of the shop
#[derive(Clone)]
pub struct CustomerService {
    customer_repository: CustomerRepository,
    entry_repository: EntryRepository,
    settings_repository: SettingsRepository,
}

impl CustomerService {
    pub fn new(csv_conn: Arc<CsvConnection>) -> Self {
        Self {
            customer_repository: CustomerRepository::new((*csv_conn).clone()),
            entry_repository: EntryRepository::new((*csv_conn).clone()),
            settings_repository: SettingsRepository::new((*csv_conn).clone()),
        }
    }

    /// Create a new customer
    pub fn create_customer(&self, command: CreateCustomerCommand) -> Result<CreateCustomerResult> {
        info!("Creating customer: name={}", command.name);

        let name = validate_name(&command.name)?;
        if let Some(price) = command.price_per_cup {
            validate_price(price)?;
        }

        // Customers without their own price are pinned to today's default
        let price_per_cup = match command.price_per_cup {
            Some(price) => price,
            None => self.settings_repository.get_settings()?.default_price,
        };

        // IDs are millisecond based; step past any customer created in the same instant
        let existing = self.customer_repository.list_customers()?;
        let mut created_ms = Utc::now().timestamp_millis();
        while existing
            .iter()
            .any(|c| c.id == DomainCustomer::generate_id(created_ms as u64))
        {
            created_ms += 1;
        }
        let created_at = Utc
            .timestamp_millis_opt(created_ms)
            .single()
            .unwrap_or_else(Utc::now);

        let customer = DomainCustomer {
            id: DomainCustomer::generate_id(created_ms as u64),
            name,
            price_per_cup: Some(price_per_cup),
            created_at,
        };

        self.customer_repository.store_customer(&customer)?;

        info!("Created customer: {} with ID: {}", customer.name, customer.id);
        Ok(CreateCustomerResult { customer })
    }

    /// Get a customer by ID
    pub fn get_customer(&self, command: GetCustomerCommand) -> Result<GetCustomerResult> {
        let customer = self.customer_repository.get_customer(&command.customer_id)?;

        if customer.is_none() {
            warn!("Customer not found: {}", command.customer_id);
        }

        Ok(GetCustomerResult { customer })
    }

    /// Get a customer by ID, failing when it does not exist
    pub fn require_customer(&self, customer_id: &str) -> Result<DomainCustomer> {
        self.customer_repository
            .get_customer(customer_id)?
            .ok_or_else(|| KhataError::CustomerNotFound(customer_id.to_string()).into())
    }

    /// List all customers, newest first
    pub fn list_customers(&self) -> Result<ListCustomersResult> {
        let customers = self.customer_repository.list_customers()?;
        info!("Found {} customers", customers.len());
        Ok(ListCustomersResult { customers })
    }

    /// Rename a customer or change their price
    pub fn update_customer(&self, command: UpdateCustomerCommand) -> Result<UpdateCustomerResult> {
        info!("Updating customer: {}", command.customer_id);

        let mut customer = self.require_customer(&command.customer_id)?;

        if let Some(ref name) = command.name {
            customer.name = validate_name(name)?;
        }
        if let Some(price) = command.price_per_cup {
            validate_price(price)?;
            customer.price_per_cup = Some(price);
        }

        self.customer_repository.update_customer(&customer)?;

        info!("Updated customer: {} with ID: {}", customer.name, customer.id);
        Ok(UpdateCustomerResult { customer })
    }

    /// Delete a customer together with their whole ledger
    pub fn delete_customer(&self, command: DeleteCustomerCommand) -> Result<DeleteCustomerResult> {
        info!("Deleting customer: {}", command.customer_id);

        let customer = self.require_customer(&command.customer_id)?;

        // Entries first, so a failure never leaves orphaned rows behind
        let deleted_entries = self.entry_repository.delete_entries_for_customer(&customer.id)?;
        self.customer_repository.delete_customer(&customer.id)?;

        info!(
            "Deleted customer: {} with ID: {} ({} entries)",
            customer.name, customer.id, deleted_entries
        );

        let success_message = format!("Customer '{}' deleted successfully", customer.name);
        Ok(DeleteCustomerResult {
            customer,
            deleted_entries,
            success_message,
        })
    }
}

fn validate_name(name: &str) -> Result<String> {
    let trimmed = name.trim();

    if trimmed.is_empty() {
        return Err(KhataError::InvalidName("name cannot be empty".to_string()).into());
    }

    if trimmed.chars().count() > MAX_NAME_CHARS {
        return Err(KhataError::InvalidName(format!(
            "name cannot exceed {} characters",
            MAX_NAME_CHARS
        ))
        .into());
    }

    Ok(trimmed.to_string())
}

fn validate_price(price: f64) -> Result<()> {
    if !price.is_finite() || price <= 0.0 {
        return Err(KhataError::InvalidPrice(price).into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::domain::models::entry::EntryType;
    use crate::backend::domain::models::settings::Settings;
    use crate::backend::storage::csv::test_utils::{entry_at, TestEnvironment};

    fn setup_test() -> (TestEnvironment, CustomerService) {
        let env = TestEnvironment::new().unwrap();
        let service = CustomerService::new(Arc::new(env.connection.clone()));
        (env, service)
    }

    fn create(service: &CustomerService, name: &str, price: Option<f64>) -> DomainCustomer {
        service
            .create_customer(CreateCustomerCommand {
                name: name.to_string(),
                price_per_cup: price,
            })
            .unwrap()
            .customer
    }

    #[test]
    fn test_create_customer_trims_name() {
        let (_env, service) = setup_test();

        let customer = create(&service, "  Ramesh  ", Some(12.0));
        assert_eq!(customer.name, "Ramesh");
        assert_eq!(customer.price_per_cup, Some(12.0));
        assert!(customer.id.starts_with("customer::"));

        let loaded = service
            .get_customer(GetCustomerCommand {
                customer_id: customer.id.clone(),
            })
            .unwrap()
            .customer
            .unwrap();
        assert_eq!(loaded, customer);
    }

    #[test]
    fn test_create_customer_takes_default_price() {
        let (env, service) = setup_test();
        SettingsRepository::new(env.connection.clone())
            .save_settings(&Settings {
                pin: None,
                default_price: 15.0,
            })
            .unwrap();

        let customer = create(&service, "Suresh", None);
        assert_eq!(customer.price_per_cup, Some(15.0));
    }

    #[test]
    fn test_create_customer_validation() {
        let (_env, service) = setup_test();

        let err = service
            .create_customer(CreateCustomerCommand {
                name: "   ".to_string(),
                price_per_cup: None,
            })
            .unwrap_err();
        assert!(matches!(err.downcast_ref::<KhataError>(), Some(KhataError::InvalidName(_))));

        let err = service
            .create_customer(CreateCustomerCommand {
                name: "क".repeat(101),
                price_per_cup: None,
            })
            .unwrap_err();
        assert!(matches!(err.downcast_ref::<KhataError>(), Some(KhataError::InvalidName(_))));

        // 100 multi-byte characters are fine
        create(&service, &"क".repeat(100), None);

        let err = service
            .create_customer(CreateCustomerCommand {
                name: "Ramesh".to_string(),
                price_per_cup: Some(0.0),
            })
            .unwrap_err();
        assert_eq!(err.downcast_ref::<KhataError>(), Some(&KhataError::InvalidPrice(0.0)));
    }

    #[test]
    fn test_list_customers_newest_first() {
        let (_env, service) = setup_test();

        let first = create(&service, "Pehla", None);
        std::thread::sleep(std::time::Duration::from_millis(5));
        let second = create(&service, "Doosra", None);

        let customers = service.list_customers().unwrap().customers;
        assert_eq!(customers.len(), 2);
        assert_eq!(customers[0].id, second.id);
        assert_eq!(customers[1].id, first.id);
    }

    #[test]
    fn test_update_customer() {
        let (_env, service) = setup_test();
        let customer = create(&service, "Ramesh", Some(10.0));

        let updated = service
            .update_customer(UpdateCustomerCommand {
                customer_id: customer.id.clone(),
                name: Some("Ramesh Bhai".to_string()),
                price_per_cup: Some(12.0),
            })
            .unwrap()
            .customer;
        assert_eq!(updated.name, "Ramesh Bhai");
        assert_eq!(updated.price_per_cup, Some(12.0));
        assert_eq!(updated.created_at, customer.created_at);

        let err = service
            .update_customer(UpdateCustomerCommand {
                customer_id: "customer::404".to_string(),
                name: None,
                price_per_cup: None,
            })
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<KhataError>(),
            Some(KhataError::CustomerNotFound(_))
        ));
    }

    #[test]
    fn test_delete_customer_cascades_to_entries() {
        let (env, service) = setup_test();
        let entries = EntryRepository::new(env.connection.clone());

        let ramesh = create(&service, "Ramesh", None);
        std::thread::sleep(std::time::Duration::from_millis(2));
        let suresh = create(&service, "Suresh", None);

        entries.store_entry(&entry_at("e1", &ramesh.id, EntryType::Sale, 2, 1_000)).unwrap();
        entries.store_entry(&entry_at("e2", &ramesh.id, EntryType::Settlement, 2, 2_000)).unwrap();
        entries.store_entry(&entry_at("e3", &suresh.id, EntryType::Sale, 1, 3_000)).unwrap();

        let result = service
            .delete_customer(DeleteCustomerCommand {
                customer_id: ramesh.id.clone(),
            })
            .unwrap();
        assert_eq!(result.deleted_entries, 2);
        assert!(result.success_message.contains("Ramesh"));

        assert!(entries.list_entries(&ramesh.id).unwrap().is_empty());
        assert_eq!(entries.list_entries(&suresh.id).unwrap().len(), 1);
        assert_eq!(service.list_customers().unwrap().customers.len(), 1);
    }

    #[test]
    fn test_delete_unknown_customer() {
        let (_env, service) = setup_test();

        let err = service
            .delete_customer(DeleteCustomerCommand {
                customer_id: "customer::404".to_string(),
            })
            .unwrap_err();
        assert_eq!(
            err.downcast_ref::<KhataError>(),
            Some(&KhataError::CustomerNotFound("customer::404".to_string()))
        );
    }
}
