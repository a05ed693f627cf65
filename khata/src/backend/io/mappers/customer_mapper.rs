//! khata/src/backend/io/mappers/customer_mapper.rs

use chrono::SecondsFormat;

use crate::backend::domain::balance_service::{
    CustomerBalance as DomainBalance, CustomerSummary as DomainSummary, LedgerTotals,
};
use crate::backend::domain::models::customer::Customer as DomainCustomer;
use shared::{
    Customer as SharedCustomer, CustomerBalance as SharedBalance, CustomerListResponse,
    CustomerResponse, CustomerSummary as SharedSummary,
};

/// Mapper from domain customers and balances to the shared DTOs.
pub struct CustomerMapper;

impl CustomerMapper {
    /// Converts a domain Customer model to a shared Customer DTO.
    pub fn to_dto(domain: DomainCustomer) -> SharedCustomer {
        SharedCustomer {
            id: domain.id,
            name: domain.name,
            price_per_cup: domain.price_per_cup,
            created_at: domain.created_at.to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }

    pub fn to_balance_dto(domain: DomainBalance) -> SharedBalance {
        SharedBalance {
            cups: domain.cups,
            last_visit: domain
                .last_visit
                .map(|ts| ts.to_rfc3339_opts(SecondsFormat::Millis, true)),
        }
    }

    pub fn to_summary_dto(domain: DomainSummary, last_visit_label: String) -> SharedSummary {
        SharedSummary {
            customer: Self::to_dto(domain.customer),
            balance: Self::to_balance_dto(domain.balance),
            price_per_cup: domain.price_per_cup,
            amount_due: domain.amount_due,
            last_visit_label,
        }
    }

    pub fn to_customer_list_dto(customers: Vec<SharedSummary>, totals: LedgerTotals) -> CustomerListResponse {
        CustomerListResponse {
            customers,
            total_cups: totals.total_cups,
            total_amount_due: totals.total_amount_due,
        }
    }

    pub fn to_customer_response_dto(domain: DomainCustomer, message: &str) -> CustomerResponse {
        CustomerResponse {
            customer: Self::to_dto(domain),
            success_message: message.to_string(),
        }
    }
}
