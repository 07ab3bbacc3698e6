// Core pipeline exports
pub mod fields;
pub mod import;
pub mod key;
pub mod query;

pub use fields::{address_field, listing_field, AddressField, ListingField};
pub use import::{import_file, ImportError, ImportSummary, RowFailure};
pub use key::{address_key, listing_key};
pub use query::{address_query, listing_query, parse_ordering, QueryPlan};
