// Service exports
pub mod catalog;

pub use catalog::{CatalogStore, StoreError};
