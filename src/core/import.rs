//! CSV import pipeline for listing exports.
//!
//! Each data row carries one listing and the address it sits at. The
//! pipeline maps source headers to canonical attributes, drops blank cells,
//! then resolves the address get-or-create before doing the same for the
//! listing, so re-running a file never duplicates records. A bad row is
//! logged and counted, not fatal; only an unreadable file or header aborts
//! the run.

use std::collections::HashMap;
use std::fs::File;
use std::path::Path;

use chrono::NaiveDate;
use thiserror::Error;

use crate::core::fields::{address_field, listing_field, AddressField, ListingField};
use crate::models::domain::{NewAddress, NewListing};
use crate::services::catalog::CatalogStore;

/// Errors that abort an import run
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("Failed to open {path}: {source}")]
    Open {
        path: String,
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Outcome of one import run
#[derive(Debug, Clone, Default)]
pub struct ImportSummary {
    pub rows: u64,
    pub addresses_created: u64,
    pub listings_created: u64,
    pub listings_matched: u64,
    pub failures: Vec<RowFailure>,
}

/// A data row that could not be imported
#[derive(Debug, Clone)]
pub struct RowFailure {
    /// 1-based data row number; the header row does not count
    pub row: u64,
    pub reason: String,
}

#[derive(Debug, Clone, Copy)]
enum HeaderSlot {
    Address(AddressField),
    Listing(ListingField),
    Ignored,
}

#[derive(Debug, Default)]
struct RowValues {
    address: HashMap<AddressField, String>,
    listing: HashMap<ListingField, String>,
}

struct RowOutcome {
    address_created: bool,
    listing_created: bool,
}

/// Import every data row of the given CSV file into the store
pub async fn import_file(
    store: &CatalogStore,
    path: impl AsRef<Path>,
) -> Result<ImportSummary, ImportError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| ImportError::Open {
        path: path.display().to_string(),
        source,
    })?;

    tracing::info!("Importing listings from {}", path.display());

    let mut reader = csv::Reader::from_reader(file);
    let slots = resolve_header(reader.headers()?);

    let mut summary = ImportSummary::default();
    for (index, record) in reader.records().enumerate() {
        let row = index as u64 + 1;
        summary.rows += 1;
        match import_row(store, &slots, record).await {
            Ok(outcome) => {
                if outcome.address_created {
                    summary.addresses_created += 1;
                }
                if outcome.listing_created {
                    summary.listings_created += 1;
                } else {
                    summary.listings_matched += 1;
                }
            }
            Err(reason) => {
                tracing::warn!("Skipping row {}: {}", row, reason);
                summary.failures.push(RowFailure { row, reason });
            }
        }
    }

    tracing::info!(
        "Import finished: {} rows, {} addresses created, {} listings created, {} matched, {} failed",
        summary.rows,
        summary.addresses_created,
        summary.listings_created,
        summary.listings_matched,
        summary.failures.len()
    );

    Ok(summary)
}

async fn import_row(
    store: &CatalogStore,
    slots: &[HeaderSlot],
    record: Result<csv::StringRecord, csv::Error>,
) -> Result<RowOutcome, String> {
    let record = record.map_err(|error| format!("unreadable record: {error}"))?;
    let values = extract_row(slots, &record);

    // Parse both entities before touching the store so a bad listing cell
    // does not leave a stray address behind
    let address = build_address(values.address)?;
    let listing = build_listing(values.listing)?;

    let (address, address_created) = store
        .get_or_create_address(&address)
        .await
        .map_err(|error| error.to_string())?;
    let (stored, listing_created) = store
        .get_or_create_listing(address.id, &listing)
        .await
        .map_err(|error| error.to_string())?;

    tracing::debug!(
        "Imported listing {} at {}",
        stored.listing.listing_number,
        stored.address
    );

    Ok(RowOutcome {
        address_created,
        listing_created,
    })
}

/// Map each header column to the attribute it feeds, if any
fn resolve_header(header: &csv::StringRecord) -> Vec<HeaderSlot> {
    header
        .iter()
        .map(|column| {
            if let Some(field) = address_field(column) {
                HeaderSlot::Address(field)
            } else if let Some(field) = listing_field(column) {
                HeaderSlot::Listing(field)
            } else {
                HeaderSlot::Ignored
            }
        })
        .collect()
}

/// Pull the mapped, non-blank cells out of one record
fn extract_row(slots: &[HeaderSlot], record: &csv::StringRecord) -> RowValues {
    let mut values = RowValues::default();
    for (slot, cell) in slots.iter().zip(record.iter()) {
        let cell = cell.trim();
        if cell.is_empty() {
            continue;
        }
        match slot {
            HeaderSlot::Address(field) => {
                values.address.insert(*field, cell.to_string());
            }
            HeaderSlot::Listing(field) => {
                values.listing.insert(*field, cell.to_string());
            }
            HeaderSlot::Ignored => {}
        }
    }
    values
}

fn build_address(mut values: HashMap<AddressField, String>) -> Result<NewAddress, String> {
    use AddressField::*;

    Ok(NewAddress {
        street_address: values
            .remove(&StreetAddress)
            .ok_or_else(|| missing(StreetAddress.name()))?,
        unit_number: values.remove(&UnitNumber),
        city: values.remove(&City).ok_or_else(|| missing(City.name()))?,
        state: values.remove(&State).ok_or_else(|| missing(State.name()))?,
        zipcode: values.remove(&Zipcode).ok_or_else(|| missing(Zipcode.name()))?,
        country: values.remove(&Country).ok_or_else(|| missing(Country.name()))?,
        latitude: values
            .remove(&Latitude)
            .map(|raw| parse_decimal(Latitude.name(), &raw))
            .transpose()?,
        longitude: values
            .remove(&Longitude)
            .map(|raw| parse_decimal(Longitude.name(), &raw))
            .transpose()?,
    })
}

fn build_listing(mut values: HashMap<ListingField, String>) -> Result<NewListing, String> {
    use ListingField::*;

    Ok(NewListing {
        listing_number: values
            .remove(&ListingNumber)
            .ok_or_else(|| missing(ListingNumber.name()))?,
        date_accessed: values
            .remove(&DateAccessed)
            .ok_or_else(|| missing(DateAccessed.name()))
            .and_then(|raw| parse_date(DateAccessed.name(), &raw))?,
        price: values
            .remove(&Price)
            .ok_or_else(|| missing(Price.name()))
            .and_then(|raw| parse_integer(Price.name(), &raw))?,
        details_url: values
            .remove(&DetailsUrl)
            .ok_or_else(|| missing(DetailsUrl.name()))?,
        size_interior: values.remove(&SizeInterior),
        bedrooms: values.remove(&Bedrooms).ok_or_else(|| missing(Bedrooms.name()))?,
        num_bathrooms: values
            .remove(&NumBathrooms)
            .ok_or_else(|| missing(NumBathrooms.name()))
            .and_then(|raw| parse_decimal(NumBathrooms.name(), &raw))?,
        num_stories: values
            .remove(&NumStories)
            .map(|raw| parse_decimal(NumStories.name(), &raw))
            .transpose()?,
        num_units: values
            .remove(&NumUnits)
            .map(|raw| parse_integer(NumUnits.name(), &raw))
            .transpose()?,
        land_size: values.remove(&LandSize),
        frontage: values.remove(&Frontage),
        photo_link: values.remove(&PhotoLink),
        property_type: values
            .remove(&PropertyType)
            .ok_or_else(|| missing(PropertyType.name()))?,
        building_type: values
            .remove(&BuildingType)
            .ok_or_else(|| missing(BuildingType.name()))?,
        ownership_type: values
            .remove(&OwnershipType)
            .ok_or_else(|| missing(OwnershipType.name()))?,
        parking_type: values.remove(&ParkingType),
        num_parking: values
            .remove(&NumParking)
            .map(|raw| parse_integer(NumParking.name(), &raw))
            .transpose()?,
        description: values.remove(&Description),
    })
}

fn missing(name: &str) -> String {
    format!("missing value for {name}")
}

fn parse_integer(field: &str, raw: &str) -> Result<i64, String> {
    raw.parse::<i64>()
        .map_err(|_| format!("{field}: invalid integer {raw:?}"))
}

fn parse_decimal(field: &str, raw: &str) -> Result<f64, String> {
    raw.parse::<f64>()
        .map_err(|_| format!("{field}: invalid decimal {raw:?}"))
}

fn parse_date(field: &str, raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| format!("{field}: invalid date {raw:?}"))
}
