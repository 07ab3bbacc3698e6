use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// A deduplicated physical address shared by any number of listings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Address {
    pub id: i64,
    pub street_address: String,
    pub unit_number: Option<String>,
    pub city: String,
    pub state: String,
    pub zipcode: String,
    pub country: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl std::fmt::Display for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(unit) = &self.unit_number {
            write!(f, "{}-", unit)?;
        }
        write!(f, "{}, {}, {}", self.street_address, self.city, self.state)
    }
}

/// A property listing tied to exactly one address
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Listing {
    pub id: i64,
    pub address_id: i64,
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

/// A listing joined with its address row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListingWithAddress {
    pub listing: Listing,
    pub address: Address,
}

/// Address attributes as submitted by clients or the import pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct NewAddress {
    #[validate(length(min = 1, message = "must not be empty"))]
    pub street_address: String,
    pub unit_number: Option<String>,
    #[validate(length(min = 1, message = "must not be empty"))]
    pub city: String,
    #[validate(length(min = 1, message = "must not be empty"))]
    pub state: String,
    #[validate(length(min = 1, message = "must not be empty"))]
    pub zipcode: String,
    #[validate(length(min = 1, message = "must not be empty"))]
    pub country: String,
    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: Option<f64>,
    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: Option<f64>,
}

impl NewAddress {
    /// Collapse blank optional attributes to absent so identity keys and
    /// stored rows never distinguish "" from missing
    pub fn normalized(&self) -> Self {
        let mut normalized = self.clone();
        normalized.unit_number = non_blank(normalized.unit_number);
        normalized
    }
}

/// Listing attributes as submitted by clients or the import pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct NewListing {
    #[validate(length(min = 1, message = "must not be empty"))]
    pub listing_number: String,
    pub date_accessed: NaiveDate,
    #[validate(range(min = 0))]
    pub price: i64,
    #[validate(length(min = 1, message = "must not be empty"))]
    pub details_url: String,
    pub size_interior: Option<String>,
    #[validate(length(min = 1, message = "must not be empty"))]
    pub bedrooms: String,
    #[validate(range(min = 0.0))]
    pub num_bathrooms: f64,
    pub num_stories: Option<f64>,
    pub num_units: Option<i64>,
    pub land_size: Option<String>,
    pub frontage: Option<String>,
    pub photo_link: Option<String>,
    #[validate(length(min = 1, message = "must not be empty"))]
    pub property_type: String,
    #[validate(length(min = 1, message = "must not be empty"))]
    pub building_type: String,
    #[validate(length(min = 1, message = "must not be empty"))]
    pub ownership_type: String,
    pub parking_type: Option<String>,
    pub num_parking: Option<i64>,
    pub description: Option<String>,
}

impl NewListing {
    /// Collapse blank optional attributes to absent, mirroring [`NewAddress::normalized`]
    pub fn normalized(&self) -> Self {
        let mut normalized = self.clone();
        normalized.size_interior = non_blank(normalized.size_interior);
        normalized.land_size = non_blank(normalized.land_size);
        normalized.frontage = non_blank(normalized.frontage);
        normalized.photo_link = non_blank(normalized.photo_link);
        normalized.parking_type = non_blank(normalized.parking_type);
        normalized.description = non_blank(normalized.description);
        normalized
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
