use chrono::SecondsFormat;

use crate::backend::domain::commands::entry::RecordEntryResult;
use crate::backend::domain::models::entry::{Entry as DomainEntry, EntryType as DomainEntryType};
use crate::backend::io::mappers::customer_mapper::CustomerMapper;
use shared::{Entry as SharedEntry, EntryResponse, EntryType as SharedEntryType};

pub struct EntryMapper;

impl EntryMapper {
    pub fn to_dto(domain: DomainEntry) -> SharedEntry {
        SharedEntry {
            id: domain.id,
            customer_id: domain.customer_id,
            qty: domain.qty,
            note: domain.note,
            entry_type: Self::to_dto_type(domain.entry_type),
            timestamp: domain.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }

    pub fn to_entry_response_dto(result: RecordEntryResult) -> EntryResponse {
        EntryResponse {
            entry: Self::to_dto(result.entry),
            balance: CustomerMapper::to_balance_dto(result.balance),
            success_message: result.success_message,
        }
    }

    fn to_dto_type(domain_type: DomainEntryType) -> SharedEntryType {
        match domain_type {
            DomainEntryType::Sale => SharedEntryType::Sale,
            DomainEntryType::Settlement => SharedEntryType::Settlement,
        }
    }
}
