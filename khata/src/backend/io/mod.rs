//! # IO Module
//!
//! The command-line surface of the ledger. [`cli`] parses arguments and turns
//! service results into text or JSON; [`mappers`] convert domain models to the
//! DTOs in the `shared` crate, which is what `--json` prints.

pub mod cli;
pub mod mappers;
