//! Chai Khata: a cup ledger for tea vendors.
//!
//! Tracks who drank how many cups on credit and when they paid up.

pub mod backend;

pub use backend::Backend;
