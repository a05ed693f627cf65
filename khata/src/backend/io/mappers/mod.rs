pub mod customer_mapper;
pub mod entry_mapper;
pub mod settings_mapper;

pub use customer_mapper::*;
pub use entry_mapper::*;
pub use settings_mapper::*;
