//! # Domain Module
//!
//! Business rules for the tea stall ledger.
//!
//! A customer's ledger is an append-only list of entries. A `sale` adds cups on
//! credit; a `settlement` records a payment and clears everything before it.
//! Balances are never stored, they are recomputed from the entries
//! (see [`balance_service::compute_balance`]).
//!
//! ## Module Organization
//!
//! - **customer_service**: creating, renaming, repricing and deleting customers
//! - **entry_service**: recording sales and settlements
//! - **balance_service**: outstanding cups, amounts due and shop totals
//! - **settings_service**: default price and PIN preferences
//! - **pin_service**: the PIN gate and its attempt history
//! - **export_service**: CSV export of the whole ledger
//! - **customer_table**: display formatting for lists and ledgers
//!
//! ## Business Rules
//!
//! - Customer names are trimmed, non-empty and at most 100 characters
//! - Prices must be greater than zero
//! - A sale is between 1 and `MAX_CUPS_PER_SALE` cups
//! - A settlement covers every outstanding cup and can't be made when nothing is owed
//! - Deleting a customer removes their entries too

pub mod balance_service;
pub mod commands;
pub mod customer_service;
pub mod customer_table;
pub mod entry_service;
pub mod errors;
pub mod export_service;
pub mod models;
pub mod pin_service;
pub mod settings_service;

pub use balance_service::*;
pub use customer_service::*;
pub use customer_table::*;
pub use entry_service::*;
pub use errors::*;
pub use export_service::*;
pub use pin_service::*;
pub use settings_service::*;
