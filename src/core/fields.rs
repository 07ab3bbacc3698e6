//! Canonical attribute names for the two catalog entities and the mapping
//! from import-file column headers onto them.
//!
//! The import format carries source-system headers like
//! `Property.Address.StreetAddress`; everything downstream (storage, identity
//! keys, the API) speaks the canonical snake_case names. Headers with no
//! mapping are ignored wholesale.

/// Address attributes, declared in canonical order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AddressField {
    StreetAddress,
    UnitNumber,
    City,
    State,
    Zipcode,
    Country,
    Latitude,
    Longitude,
}

impl AddressField {
    pub const ALL: [AddressField; 8] = [
        AddressField::StreetAddress,
        AddressField::UnitNumber,
        AddressField::City,
        AddressField::State,
        AddressField::Zipcode,
        AddressField::Country,
        AddressField::Latitude,
        AddressField::Longitude,
    ];

    /// Canonical attribute name, as used in storage and API payloads
    #[inline]
    pub fn name(self) -> &'static str {
        match self {
            AddressField::StreetAddress => "street_address",
            AddressField::UnitNumber => "unit_number",
            AddressField::City => "city",
            AddressField::State => "state",
            AddressField::Zipcode => "zipcode",
            AddressField::Country => "country",
            AddressField::Latitude => "latitude",
            AddressField::Longitude => "longitude",
        }
    }
}

/// Listing attributes, declared in canonical order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListingField {
    ListingNumber,
    DateAccessed,
    Price,
    DetailsUrl,
    SizeInterior,
    Bedrooms,
    NumBathrooms,
    NumStories,
    NumUnits,
    LandSize,
    Frontage,
    PhotoLink,
    PropertyType,
    BuildingType,
    OwnershipType,
    ParkingType,
    NumParking,
    Description,
}

impl ListingField {
    pub const ALL: [ListingField; 18] = [
        ListingField::ListingNumber,
        ListingField::DateAccessed,
        ListingField::Price,
        ListingField::DetailsUrl,
        ListingField::SizeInterior,
        ListingField::Bedrooms,
        ListingField::NumBathrooms,
        ListingField::NumStories,
        ListingField::NumUnits,
        ListingField::LandSize,
        ListingField::Frontage,
        ListingField::PhotoLink,
        ListingField::PropertyType,
        ListingField::BuildingType,
        ListingField::OwnershipType,
        ListingField::ParkingType,
        ListingField::NumParking,
        ListingField::Description,
    ];

    /// Canonical attribute name, as used in storage and API payloads
    #[inline]
    pub fn name(self) -> &'static str {
        match self {
            ListingField::ListingNumber => "listing_number",
            ListingField::DateAccessed => "date_accessed",
            ListingField::Price => "price",
            ListingField::DetailsUrl => "details_url",
            ListingField::SizeInterior => "size_interior",
            ListingField::Bedrooms => "bedrooms",
            ListingField::NumBathrooms => "num_bathrooms",
            ListingField::NumStories => "num_stories",
            ListingField::NumUnits => "num_units",
            ListingField::LandSize => "land_size",
            ListingField::Frontage => "frontage",
            ListingField::PhotoLink => "photo_link",
            ListingField::PropertyType => "property_type",
            ListingField::BuildingType => "building_type",
            ListingField::OwnershipType => "ownership_type",
            ListingField::ParkingType => "parking_type",
            ListingField::NumParking => "num_parking",
            ListingField::Description => "description",
        }
    }
}

/// Import-file headers that map onto address attributes
pub const ADDRESS_COLUMNS: &[(&str, AddressField)] = &[
    ("Property.Address.StreetAddress", AddressField::StreetAddress),
    ("Property.Address.UnitNumber", AddressField::UnitNumber),
    ("Property.Address.City", AddressField::City),
    ("Property.Address.Province", AddressField::State),
    ("PostalCode", AddressField::Zipcode),
    ("Property.Address.Country", AddressField::Country),
    ("Property.Address.Latitude", AddressField::Latitude),
    ("Property.Address.Longitude", AddressField::Longitude),
];

/// Import-file headers that map onto listing attributes
pub const LISTING_COLUMNS: &[(&str, ListingField)] = &[
    ("MlsNumber", ListingField::ListingNumber),
    ("DateAccessed", ListingField::DateAccessed),
    ("Property.PriceUnformattedValue", ListingField::Price),
    ("DetailsURL", ListingField::DetailsUrl),
    ("Building.SizeInterior", ListingField::SizeInterior),
    ("Building.Bedrooms", ListingField::Bedrooms),
    ("Building.BathroomTotal", ListingField::NumBathrooms),
    ("Building.StoriesTotal", ListingField::NumStories),
    ("Building.UnitTotal", ListingField::NumUnits),
    ("Land.SizeTotal", ListingField::LandSize),
    ("Land.SizeFrontage", ListingField::Frontage),
    ("Property.PhotoLink", ListingField::PhotoLink),
    ("Property.Type", ListingField::PropertyType),
    ("Building.Type", ListingField::BuildingType),
    ("Property.OwnershipType", ListingField::OwnershipType),
    ("Property.Parking", ListingField::ParkingType),
    ("Property.ParkingSpaceTotal", ListingField::NumParking),
    ("PublicRemarks", ListingField::Description),
];

/// Resolve an import-file header to an address attribute, if it maps to one
#[inline]
pub fn address_field(header: &str) -> Option<AddressField> {
    ADDRESS_COLUMNS
        .iter()
        .find(|(column, _)| *column == header)
        .map(|(_, field)| *field)
}

/// Resolve an import-file header to a listing attribute, if it maps to one
#[inline]
pub fn listing_field(header: &str) -> Option<ListingField> {
    LISTING_COLUMNS
        .iter()
        .find(|(column, _)| *column == header)
        .map(|(_, field)| *field)
}
