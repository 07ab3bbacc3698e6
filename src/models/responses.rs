use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::domain::{Address, Listing, ListingWithAddress};
use crate::models::requests::Page;

/// Reduced address projection used by collection endpoints
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddressSummary {
    pub id: i64,
    pub street_address: String,
    pub unit_number: Option<String>,
    pub city: String,
    pub state: String,
    pub zipcode: String,
}

impl From<&Address> for AddressSummary {
    fn from(address: &Address) -> Self {
        Self {
            id: address.id,
            street_address: address.street_address.clone(),
            unit_number: address.unit_number.clone(),
            city: address.city.clone(),
            state: address.state.clone(),
            zipcode: address.zipcode.clone(),
        }
    }
}

/// Reduced listing projection used by the listing collection endpoint.
///
/// Carries the reduced form of its address; detail endpoints return
/// [`ListingDetail`] with everything.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListingSummary {
    pub id: i64,
    pub address: AddressSummary,
    pub listing_number: String,
    pub date_accessed: NaiveDate,
    pub price: i64,
    pub size_interior: Option<String>,
    pub bedrooms: String,
    pub num_bathrooms: f64,
    pub num_stories: Option<f64>,
    pub num_units: Option<i64>,
    pub land_size: Option<String>,
    pub property_type: String,
    pub building_type: String,
    pub ownership_type: String,
    pub num_parking: Option<i64>,
}

impl From<&ListingWithAddress> for ListingSummary {
    fn from(row: &ListingWithAddress) -> Self {
        let listing = &row.listing;
        Self {
            id: listing.id,
            address: AddressSummary::from(&row.address),
            listing_number: listing.listing_number.clone(),
            date_accessed: listing.date_accessed,
            price: listing.price,
            size_interior: listing.size_interior.clone(),
            bedrooms: listing.bedrooms.clone(),
            num_bathrooms: listing.num_bathrooms,
            num_stories: listing.num_stories,
            num_units: listing.num_units,
            land_size: listing.land_size.clone(),
            property_type: listing.property_type.clone(),
            building_type: listing.building_type.clone(),
            ownership_type: listing.ownership_type.clone(),
            num_parking: listing.num_parking,
        }
    }
}

/// Full listing projection with its full nested address
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListingDetail {
    pub id: i64,
    pub address: Address,
    pub listing_number: String,
    pub date_accessed: NaiveDate,
    pub price: i64,
    pub details_url: String,
    pub size_interior: Option<String>,
    pub bedrooms: String,
    pub num_bathrooms: f64,
    pub num_stories: Option<f64>,
    pub num_units: Option<i64>,
    pub land_size: Option<String>,
    pub frontage: Option<String>,
    pub photo_link: Option<String>,
    pub property_type: String,
    pub building_type: String,
    pub ownership_type: String,
    pub parking_type: Option<String>,
    pub num_parking: Option<i64>,
    pub description: Option<String>,
}

impl From<ListingWithAddress> for ListingDetail {
    fn from(row: ListingWithAddress) -> Self {
        let ListingWithAddress { listing, address } = row;
        let Listing {
            id,
            address_id: _,
            listing_number,
            date_accessed,
            price,
            details_url,
            size_interior,
            bedrooms,
            num_bathrooms,
            num_stories,
            num_units,
            land_size,
            frontage,
            photo_link,
            property_type,
            building_type,
            ownership_type,
            parking_type,
            num_parking,
            description,
        } = listing;
        Self {
            id,
            address,
            listing_number,
            date_accessed,
            price,
            details_url,
            size_interior,
            bedrooms,
            num_bathrooms,
            num_stories,
            num_units,
            land_size,
            frontage,
            photo_link,
            property_type,
            building_type,
            ownership_type,
            parking_type,
            num_parking,
            description,
        }
    }
}

/// Page envelope returned by collection endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paginated<T> {
    pub count: i64,
    pub next: Option<u32>,
    pub previous: Option<u32>,
    pub results: Vec<T>,
}

impl<T> Paginated<T> {
    /// Wrap one page of results, deriving neighbor page numbers from the
    /// total count
    pub fn new(count: i64, page: &Page, results: Vec<T>) -> Self {
        let consumed = i64::from(page.number) * i64::from(page.size);
        let next = if consumed < count {
            Some(page.number + 1)
        } else {
            None
        };
        let previous = if page.number > 1 {
            Some(page.number - 1)
        } else {
            None
        };
        Self {
            count,
            next,
            previous,
            results,
        }
    }
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}
