//! Infrastructure layer: model lookup backends.

pub mod model_store;

pub use model_store::{InMemoryModelStore, SeedError, SupplierRecords};
