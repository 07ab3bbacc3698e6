//! Canonical identity keys for catalog records.
//!
//! A record's key is the concatenation of `name=value` pairs over its
//! populated attributes, in canonical attribute order, joined by an ASCII
//! unit separator. Two payloads produce the same key exactly when they
//! populate the same attributes with identical values, which lets the
//! storage layer collapse duplicates with a plain unique index.

use crate::core::fields::{AddressField, ListingField};
use crate::models::domain::{NewAddress, NewListing};

/// Separator between `name=value` pairs
const SEPARATOR: char = '\u{1f}';

fn push_pair(key: &mut String, name: &str, value: &str) {
    if !key.is_empty() {
        key.push(SEPARATOR);
    }
    key.push_str(name);
    key.push('=');
    key.push_str(value);
}

/// Identity key over the populated attributes of an address payload.
///
/// Callers are expected to pass normalized payloads; a blank attribute that
/// survives normalization would count as populated here.
pub fn address_key(address: &NewAddress) -> String {
    let mut key = String::new();
    push_pair(&mut key, AddressField::StreetAddress.name(), &address.street_address);
    if let Some(unit) = &address.unit_number {
        push_pair(&mut key, AddressField::UnitNumber.name(), unit);
    }
    push_pair(&mut key, AddressField::City.name(), &address.city);
    push_pair(&mut key, AddressField::State.name(), &address.state);
    push_pair(&mut key, AddressField::Zipcode.name(), &address.zipcode);
    push_pair(&mut key, AddressField::Country.name(), &address.country);
    if let Some(latitude) = address.latitude {
        push_pair(&mut key, AddressField::Latitude.name(), &latitude.to_string());
    }
    if let Some(longitude) = address.longitude {
        push_pair(&mut key, AddressField::Longitude.name(), &longitude.to_string());
    }
    key
}

/// Identity key over a listing payload and the address row it belongs to.
///
/// The owning address participates by id, so the same listing attributes at
/// two different addresses stay distinct records.
pub fn listing_key(address_id: i64, listing: &NewListing) -> String {
    let mut key = String::new();
    push_pair(&mut key, "address", &address_id.to_string());
    push_pair(&mut key, ListingField::ListingNumber.name(), &listing.listing_number);
    push_pair(
        &mut key,
        ListingField::DateAccessed.name(),
        &listing.date_accessed.to_string(),
    );
    push_pair(&mut key, ListingField::Price.name(), &listing.price.to_string());
    push_pair(&mut key, ListingField::DetailsUrl.name(), &listing.details_url);
    if let Some(size_interior) = &listing.size_interior {
        push_pair(&mut key, ListingField::SizeInterior.name(), size_interior);
    }
    push_pair(&mut key, ListingField::Bedrooms.name(), &listing.bedrooms);
    push_pair(
        &mut key,
        ListingField::NumBathrooms.name(),
        &listing.num_bathrooms.to_string(),
    );
    if let Some(num_stories) = listing.num_stories {
        push_pair(&mut key, ListingField::NumStories.name(), &num_stories.to_string());
    }
    if let Some(num_units) = listing.num_units {
        push_pair(&mut key, ListingField::NumUnits.name(), &num_units.to_string());
    }
    if let Some(land_size) = &listing.land_size {
        push_pair(&mut key, ListingField::LandSize.name(), land_size);
    }
    if let Some(frontage) = &listing.frontage {
        push_pair(&mut key, ListingField::Frontage.name(), frontage);
    }
    if let Some(photo_link) = &listing.photo_link {
        push_pair(&mut key, ListingField::PhotoLink.name(), photo_link);
    }
    push_pair(&mut key, ListingField::PropertyType.name(), &listing.property_type);
    push_pair(&mut key, ListingField::BuildingType.name(), &listing.building_type);
    push_pair(&mut key, ListingField::OwnershipType.name(), &listing.ownership_type);
    if let Some(parking_type) = &listing.parking_type {
        push_pair(&mut key, ListingField::ParkingType.name(), parking_type);
    }
    if let Some(num_parking) = listing.num_parking {
        push_pair(&mut key, ListingField::NumParking.name(), &num_parking.to_string());
    }
    if let Some(description) = &listing.description {
        push_pair(&mut key, ListingField::Description.name(), description);
    }
    key
}
