pub mod customer;
pub mod entry;
pub mod pin_attempt;
pub mod settings;
