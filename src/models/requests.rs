use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::config::PaginationSettings;
use crate::models::domain::{NewAddress, NewListing};

/// Query parameters accepted by the address collection endpoint.
///
/// Every parameter is optional; present parameters are combined with AND.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AddressFilterParams {
    pub id: Option<i64>,
    pub street_address: Option<String>,
    pub unit_number: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zipcode: Option<String>,
    pub zipcode_contains: Option<String>,
    pub country: Option<String>,
    pub min_latitude: Option<f64>,
    pub max_latitude: Option<f64>,
    pub min_longitude: Option<f64>,
    pub max_longitude: Option<f64>,
}

/// Query parameters accepted by the listing collection endpoint.
///
/// Address-scoped parameters filter on the joined address row. String
/// matches are case-insensitive here, unlike the exact matches on the
/// address endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListingFilterParams {
    pub address_id: Option<i64>,
    pub street_address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zipcode: Option<String>,
    pub zipcode_contains: Option<String>,
    pub country: Option<String>,
    pub listing_number: Option<String>,
    pub min_date: Option<chrono::NaiveDate>,
    pub max_date: Option<chrono::NaiveDate>,
    pub min_price: Option<i64>,
    pub max_price: Option<i64>,
    pub min_size_interior: Option<String>,
    pub min_bedrooms: Option<String>,
    pub min_bathrooms: Option<f64>,
    pub min_units: Option<i64>,
    pub ownership_type: Option<String>,
    pub min_parking: Option<i64>,
    pub description: Option<String>,
    pub ordering: Option<String>,
}

/// Page selection parameters shared by both collection endpoints
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct PageParams {
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

impl PageParams {
    /// Resolve raw parameters against configured defaults and caps
    pub fn resolve(&self, settings: &PaginationSettings) -> Page {
        let size = self
            .page_size
            .unwrap_or(settings.default_page_size)
            .clamp(1, settings.max_page_size);
        let number = self.page.unwrap_or(1).max(1);
        Page {
            number,
            size,
            limit: i64::from(size),
            offset: i64::from(number - 1) * i64::from(size),
        }
    }
}

/// A resolved page window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub number: u32,
    pub size: u32,
    pub limit: i64,
    pub offset: i64,
}

/// Create/update payload for a listing: its attributes plus a nested
/// address, which is resolved get-or-create before the listing is written
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ListingPayload {
    #[validate(nested)]
    pub address: NewAddress,
    #[serde(flatten)]
    #[validate(nested)]
    pub listing: NewListing,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> PaginationSettings {
        PaginationSettings {
            default_page_size: 20,
            max_page_size: 100,
        }
    }

    #[test]
    fn test_resolve_defaults() {
        let page = PageParams::default().resolve(&settings());
        assert_eq!(page.number, 1);
        assert_eq!(page.size, 20);
        assert_eq!(page.limit, 20);
        assert_eq!(page.offset, 0);
    }

    #[test]
    fn test_resolve_caps_page_size() {
        let params = PageParams {
            page: Some(3),
            page_size: Some(500),
        };
        let page = params.resolve(&settings());
        assert_eq!(page.size, 100);
        assert_eq!(page.offset, 200);
    }

    #[test]
    fn test_resolve_clamps_zero_inputs() {
        let params = PageParams {
            page: Some(0),
            page_size: Some(0),
        };
        let page = params.resolve(&settings());
        assert_eq!(page.number, 1);
        assert_eq!(page.size, 1);
        assert_eq!(page.offset, 0);
    }

    #[test]
    fn test_listing_payload_flattens_listing_fields() {
        let body = serde_json::json!({
            "address": {
                "street_address": "100 Regina St. S.",
                "city": "Waterloo",
                "state": "Ontario",
                "zipcode": "N2J4P9",
                "country": "Canada"
            },
            "listing_number": "99995555",
            "date_accessed": "2021-05-16",
            "price": 1000000,
            "details_url": "realtor.ca/real-estate/",
            "bedrooms": "3 + 1",
            "num_bathrooms": 1.5,
            "property_type": "Single Family",
            "building_type": "House",
            "ownership_type": "Freehold"
        });

        let payload: ListingPayload = serde_json::from_value(body).unwrap();
        assert_eq!(payload.address.city, "Waterloo");
        assert_eq!(payload.listing.listing_number, "99995555");
        assert_eq!(payload.listing.price, 1_000_000);
        assert_eq!(payload.listing.size_interior, None);
    }
}
