//! Supplier-isolated model record storage.

pub mod in_memory;
pub mod seed;

pub use in_memory::InMemoryModelStore;
pub use seed::{SeedError, SupplierRecords};
