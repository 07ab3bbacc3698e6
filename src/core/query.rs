//! Translation of collection query parameters into a [`QueryPlan`].
//!
//! This layer is pure: it decides which conditions apply and with which
//! comparison semantics, while the storage layer renders the plan into SQL
//! with bound values. Unknown parameters never reach this module (the HTTP
//! layer drops them) and unknown ordering names collapse to the default
//! order rather than erroring.

use crate::models::requests::{AddressFilterParams, ListingFilterParams};

/// Filterable columns of the two catalog entities.
///
/// Listing queries run against a join, so address columns resolve to the
/// joined address row there.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    AddressId,
    StreetAddress,
    UnitNumber,
    City,
    State,
    Zipcode,
    Country,
    Latitude,
    Longitude,
    ListingNumber,
    DateAccessed,
    Price,
    SizeInterior,
    Bedrooms,
    NumBathrooms,
    NumUnits,
    OwnershipType,
    NumParking,
    Description,
}

impl Column {
    /// Qualified column reference for SQL rendering
    #[inline]
    pub fn sql(self) -> &'static str {
        match self {
            Column::AddressId => "a.id",
            Column::StreetAddress => "a.street_address",
            Column::UnitNumber => "a.unit_number",
            Column::City => "a.city",
            Column::State => "a.state",
            Column::Zipcode => "a.zipcode",
            Column::Country => "a.country",
            Column::Latitude => "a.latitude",
            Column::Longitude => "a.longitude",
            Column::ListingNumber => "l.listing_number",
            Column::DateAccessed => "l.date_accessed",
            Column::Price => "l.price",
            Column::SizeInterior => "l.size_interior",
            Column::Bedrooms => "l.bedrooms",
            Column::NumBathrooms => "l.num_bathrooms",
            Column::NumUnits => "l.num_units",
            Column::OwnershipType => "l.ownership_type",
            Column::NumParking => "l.num_parking",
            Column::Description => "l.description",
        }
    }
}

/// Comparison semantics for one condition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    /// Case-sensitive equality
    Exact,
    /// Case-insensitive equality
    IExact,
    /// Case-insensitive substring containment
    IContains,
    /// Greater than or equal; lexicographic on text columns
    Gte,
    /// Less than or equal
    Lte,
}

/// A value bound into a rendered condition
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Int(i64),
    Float(f64),
    Text(String),
    Date(chrono::NaiveDate),
}

/// One rendered-to-be condition; conditions in a plan combine with AND
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    pub column: Column,
    pub op: Op,
    pub value: Scalar,
}

impl Condition {
    fn new(column: Column, op: Op, value: Scalar) -> Self {
        Self { column, op, value }
    }
}

/// Result ordering for the listing collection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderBy {
    pub column: &'static str,
    pub descending: bool,
}

/// Everything the storage layer needs to render one collection query
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryPlan {
    pub conditions: Vec<Condition>,
    pub order: Option<OrderBy>,
}

/// Build the query plan for the address collection.
///
/// String parameters match exactly here; only `zipcode_contains` is
/// case-insensitive.
pub fn address_query(params: &AddressFilterParams) -> QueryPlan {
    let mut conditions = Vec::new();

    if let Some(id) = params.id {
        conditions.push(Condition::new(Column::AddressId, Op::Exact, Scalar::Int(id)));
    }
    if let Some(value) = &params.street_address {
        conditions.push(Condition::new(
            Column::StreetAddress,
            Op::Exact,
            Scalar::Text(value.clone()),
        ));
    }
    if let Some(value) = &params.unit_number {
        conditions.push(Condition::new(
            Column::UnitNumber,
            Op::Exact,
            Scalar::Text(value.clone()),
        ));
    }
    if let Some(value) = &params.city {
        conditions.push(Condition::new(Column::City, Op::Exact, Scalar::Text(value.clone())));
    }
    if let Some(value) = &params.state {
        conditions.push(Condition::new(Column::State, Op::Exact, Scalar::Text(value.clone())));
    }
    if let Some(value) = &params.zipcode {
        conditions.push(Condition::new(
            Column::Zipcode,
            Op::Exact,
            Scalar::Text(value.clone()),
        ));
    }
    if let Some(value) = &params.zipcode_contains {
        conditions.push(Condition::new(
            Column::Zipcode,
            Op::IContains,
            Scalar::Text(value.clone()),
        ));
    }
    if let Some(value) = &params.country {
        conditions.push(Condition::new(
            Column::Country,
            Op::Exact,
            Scalar::Text(value.clone()),
        ));
    }
    if let Some(value) = params.min_latitude {
        conditions.push(Condition::new(Column::Latitude, Op::Gte, Scalar::Float(value)));
    }
    if let Some(value) = params.max_latitude {
        conditions.push(Condition::new(Column::Latitude, Op::Lte, Scalar::Float(value)));
    }
    if let Some(value) = params.min_longitude {
        conditions.push(Condition::new(Column::Longitude, Op::Gte, Scalar::Float(value)));
    }
    if let Some(value) = params.max_longitude {
        conditions.push(Condition::new(Column::Longitude, Op::Lte, Scalar::Float(value)));
    }

    QueryPlan {
        conditions,
        order: None,
    }
}

/// Build the query plan for the listing collection.
///
/// Address-scoped string parameters match case-insensitively against the
/// joined address row. `min_size_interior` and `min_bedrooms` compare
/// lexicographically because those attributes are free-form text.
pub fn listing_query(params: &ListingFilterParams) -> QueryPlan {
    let mut conditions = Vec::new();

    if let Some(id) = params.address_id {
        conditions.push(Condition::new(Column::AddressId, Op::Exact, Scalar::Int(id)));
    }
    if let Some(value) = &params.street_address {
        conditions.push(Condition::new(
            Column::StreetAddress,
            Op::IExact,
            Scalar::Text(value.clone()),
        ));
    }
    if let Some(value) = &params.city {
        conditions.push(Condition::new(Column::City, Op::IExact, Scalar::Text(value.clone())));
    }
    if let Some(value) = &params.state {
        conditions.push(Condition::new(Column::State, Op::IExact, Scalar::Text(value.clone())));
    }
    if let Some(value) = &params.zipcode {
        conditions.push(Condition::new(
            Column::Zipcode,
            Op::IExact,
            Scalar::Text(value.clone()),
        ));
    }
    if let Some(value) = &params.zipcode_contains {
        conditions.push(Condition::new(
            Column::Zipcode,
            Op::IContains,
            Scalar::Text(value.clone()),
        ));
    }
    if let Some(value) = &params.country {
        conditions.push(Condition::new(
            Column::Country,
            Op::IExact,
            Scalar::Text(value.clone()),
        ));
    }
    if let Some(value) = &params.listing_number {
        conditions.push(Condition::new(
            Column::ListingNumber,
            Op::IExact,
            Scalar::Text(value.clone()),
        ));
    }
    if let Some(value) = params.min_date {
        conditions.push(Condition::new(Column::DateAccessed, Op::Gte, Scalar::Date(value)));
    }
    if let Some(value) = params.max_date {
        conditions.push(Condition::new(Column::DateAccessed, Op::Lte, Scalar::Date(value)));
    }
    if let Some(value) = params.min_price {
        conditions.push(Condition::new(Column::Price, Op::Gte, Scalar::Int(value)));
    }
    if let Some(value) = params.max_price {
        conditions.push(Condition::new(Column::Price, Op::Lte, Scalar::Int(value)));
    }
    if let Some(value) = &params.min_size_interior {
        conditions.push(Condition::new(
            Column::SizeInterior,
            Op::Gte,
            Scalar::Text(value.clone()),
        ));
    }
    if let Some(value) = &params.min_bedrooms {
        conditions.push(Condition::new(
            Column::Bedrooms,
            Op::Gte,
            Scalar::Text(value.clone()),
        ));
    }
    if let Some(value) = params.min_bathrooms {
        conditions.push(Condition::new(Column::NumBathrooms, Op::Gte, Scalar::Float(value)));
    }
    if let Some(value) = params.min_units {
        conditions.push(Condition::new(Column::NumUnits, Op::Gte, Scalar::Int(value)));
    }
    if let Some(value) = &params.ownership_type {
        conditions.push(Condition::new(
            Column::OwnershipType,
            Op::IExact,
            Scalar::Text(value.clone()),
        ));
    }
    if let Some(value) = params.min_parking {
        conditions.push(Condition::new(Column::NumParking, Op::Gte, Scalar::Int(value)));
    }
    if let Some(value) = &params.description {
        conditions.push(Condition::new(
            Column::Description,
            Op::IContains,
            Scalar::Text(value.clone()),
        ));
    }

    QueryPlan {
        conditions,
        order: params.ordering.as_deref().and_then(parse_ordering),
    }
}

/// Parse an `ordering` parameter (`name` or `-name`) against the whitelist
/// of sortable listing columns, returning `None` for anything else
pub fn parse_ordering(raw: &str) -> Option<OrderBy> {
    let (name, descending) = match raw.strip_prefix('-') {
        Some(rest) => (rest, true),
        None => (raw, false),
    };
    order_column(name).map(|column| OrderBy { column, descending })
}

#[inline]
fn order_column(name: &str) -> Option<&'static str> {
    let column = match name {
        "id" => "l.id",
        "listing_number" => "l.listing_number",
        "date_accessed" => "l.date_accessed",
        "price" => "l.price",
        "num_bathrooms" => "l.num_bathrooms",
        "num_stories" => "l.num_stories",
        "num_units" => "l.num_units",
        "num_parking" => "l.num_parking",
        _ => return None,
    };
    Some(column)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_empty_params_produce_empty_plan() {
        let plan = address_query(&AddressFilterParams::default());
        assert!(plan.conditions.is_empty());
        assert!(plan.order.is_none());

        let plan = listing_query(&ListingFilterParams::default());
        assert!(plan.conditions.is_empty());
        assert!(plan.order.is_none());
    }

    #[test]
    fn test_address_strings_match_exactly() {
        let params = AddressFilterParams {
            city: Some("Waterloo".to_string()),
            ..Default::default()
        };
        let plan = address_query(&params);
        assert_eq!(
            plan.conditions,
            vec![Condition::new(
                Column::City,
                Op::Exact,
                Scalar::Text("Waterloo".to_string())
            )]
        );
    }

    #[test]
    fn test_address_coordinate_bounds() {
        let params = AddressFilterParams {
            min_latitude: Some(43.0),
            max_latitude: Some(44.0),
            min_longitude: Some(-81.0),
            max_longitude: Some(-80.0),
            ..Default::default()
        };
        let plan = address_query(&params);
        assert_eq!(plan.conditions.len(), 4);
        assert_eq!(plan.conditions[0].op, Op::Gte);
        assert_eq!(plan.conditions[1].op, Op::Lte);
        assert_eq!(plan.conditions[0].column, Column::Latitude);
        assert_eq!(plan.conditions[2].column, Column::Longitude);
    }

    #[test]
    fn test_zipcode_contains_is_case_insensitive_containment() {
        let params = AddressFilterParams {
            zipcode_contains: Some("2j4".to_string()),
            ..Default::default()
        };
        let plan = address_query(&params);
        assert_eq!(plan.conditions[0].op, Op::IContains);
        assert_eq!(plan.conditions[0].column, Column::Zipcode);
    }

    #[test]
    fn test_listing_address_strings_match_case_insensitively() {
        let params = ListingFilterParams {
            city: Some("cambridge".to_string()),
            country: Some("canada".to_string()),
            ..Default::default()
        };
        let plan = listing_query(&params);
        assert_eq!(plan.conditions.len(), 2);
        assert!(plan.conditions.iter().all(|c| c.op == Op::IExact));
    }

    #[test]
    fn test_listing_ranges() {
        let params = ListingFilterParams {
            min_price: Some(500_000),
            max_price: Some(900_000),
            min_date: Some(NaiveDate::from_ymd_opt(2021, 1, 1).unwrap()),
            max_date: Some(NaiveDate::from_ymd_opt(2021, 12, 31).unwrap()),
            min_bathrooms: Some(1.5),
            ..Default::default()
        };
        let plan = listing_query(&params);
        assert_eq!(plan.conditions.len(), 5);
        assert_eq!(plan.conditions[0].value, Scalar::Int(500_000));
        assert_eq!(plan.conditions[2].op, Op::Gte);
        assert_eq!(
            plan.conditions[2].value,
            Scalar::Date(NaiveDate::from_ymd_opt(2021, 1, 1).unwrap())
        );
        assert_eq!(plan.conditions[4].value, Scalar::Float(1.5));
    }

    #[test]
    fn test_text_ranges_stay_text() {
        let params = ListingFilterParams {
            min_size_interior: Some("1050".to_string()),
            min_bedrooms: Some("3".to_string()),
            ..Default::default()
        };
        let plan = listing_query(&params);
        assert_eq!(
            plan.conditions[0],
            Condition::new(Column::SizeInterior, Op::Gte, Scalar::Text("1050".to_string()))
        );
        assert_eq!(
            plan.conditions[1],
            Condition::new(Column::Bedrooms, Op::Gte, Scalar::Text("3".to_string()))
        );
    }

    #[test]
    fn test_ordering_parses_direction() {
        assert_eq!(
            parse_ordering("price"),
            Some(OrderBy {
                column: "l.price",
                descending: false
            })
        );
        assert_eq!(
            parse_ordering("-price"),
            Some(OrderBy {
                column: "l.price",
                descending: true
            })
        );
    }

    #[test]
    fn test_unknown_ordering_is_dropped() {
        assert_eq!(parse_ordering("city"), None);
        assert_eq!(parse_ordering("-dedup_key"), None);
        assert_eq!(parse_ordering(""), None);

        let params = ListingFilterParams {
            ordering: Some("nonsense".to_string()),
            ..Default::default()
        };
        assert!(listing_query(&params).order.is_none());
    }

    #[test]
    fn test_ordering_rides_along_with_conditions() {
        let params = ListingFilterParams {
            min_price: Some(100),
            ordering: Some("-date_accessed".to_string()),
            ..Default::default()
        };
        let plan = listing_query(&params);
        assert_eq!(plan.conditions.len(), 1);
        assert_eq!(
            plan.order,
            Some(OrderBy {
                column: "l.date_accessed",
                descending: true
            })
        );
    }
}
