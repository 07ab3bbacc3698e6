//! Estate Catalog - catalog service for real-estate listings
//!
//! This library ingests listing exports (CSV with source-system headers),
//! normalizes them against a deduplicated address table, and exposes both
//! entities through a filterable, sortable, paginated HTTP API.

pub mod auth;
pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use crate::core::{import_file, ImportSummary};
pub use crate::models::{Address, Listing, ListingWithAddress, NewAddress, NewListing};
pub use crate::services::{CatalogStore, StoreError};
