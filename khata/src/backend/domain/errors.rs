//! Failure kinds the domain layer reports.
//!
//! Services return `anyhow::Result`; these are raised through it so callers
//! can `downcast_ref::<KhataError>()` when they need to react to a specific case.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum KhataError {
    #[error("Customer not found: {0}")]
    CustomerNotFound(String),

    #[error("Invalid customer name: {0}")]
    InvalidName(String),

    #[error("Price per cup must be greater than zero (got {0})")]
    InvalidPrice(f64),

    #[error("Quantity must be between 1 and {max} cups (got {qty})")]
    InvalidQuantity { qty: u32, max: u32 },

    #[error("Too many outstanding cups for customer {0}")]
    CupCountOverflow(String),

    #[error("Nothing to settle: customer {0} has no outstanding cups")]
    NothingToSettle(String),

    #[error("PIN must be exactly 4 digits")]
    InvalidPin,

    #[error("This ledger is locked; supply the PIN with --pin")]
    PinRequired,

    #[error("Incorrect PIN")]
    IncorrectPin,
}
