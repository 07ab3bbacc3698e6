use std::str::FromStr;

use sqlx::error::ErrorKind;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow};
use sqlx::{QueryBuilder, Row, Sqlite, SqlitePool};
use thiserror::Error;

use crate::core::key::{address_key, listing_key};
use crate::core::query::{Condition, Op, QueryPlan, Scalar};
use crate::models::domain::{Address, Listing, ListingWithAddress, NewAddress, NewListing};
use crate::models::requests::Page;

/// Errors that can occur when interacting with the catalog database
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("SQLx error: {0}")]
    SqlxError(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    MigrateError(#[from] sqlx::migrate::MigrateError),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Invalid reference: {0}")]
    InvalidReference(String),
}

const ADDRESS_SELECT: &str = "\
    SELECT a.id, a.street_address, a.unit_number, a.city, a.state, a.zipcode, \
    a.country, a.latitude, a.longitude FROM addresses a";

const LISTING_SELECT: &str = "\
    SELECT l.id, l.address_id, l.listing_number, l.date_accessed, l.price, l.details_url, \
    l.size_interior, l.bedrooms, l.num_bathrooms, l.num_stories, l.num_units, l.land_size, \
    l.frontage, l.photo_link, l.property_type, l.building_type, l.ownership_type, \
    l.parking_type, l.num_parking, l.description, \
    a.id AS a_id, a.street_address AS a_street_address, a.unit_number AS a_unit_number, \
    a.city AS a_city, a.state AS a_state, a.zipcode AS a_zipcode, a.country AS a_country, \
    a.latitude AS a_latitude, a.longitude AS a_longitude \
    FROM listings l JOIN addresses a ON a.id = l.address_id";

/// SQLite-backed store for addresses and listings.
///
/// Record identity lives in the `dedup_key` column: the store recomputes it
/// on every write and relies on its unique index for get-or-create, so
/// concurrent writers racing on the same payload still converge on one row.
#[derive(Clone)]
pub struct CatalogStore {
    pool: SqlitePool,
}

impl CatalogStore {
    /// Open (and migrate) the catalog database at the given URL
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .foreign_keys(true);

        // An in-memory database exists per connection; more than one
        // connection would see different data.
        let max_connections = if database_url.contains(":memory:") || database_url.contains("mode=memory")
        {
            1
        } else {
            max_connections
        };

        tracing::info!("Connecting to catalog database: {}", database_url);

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await?;

        // Run migrations on startup
        sqlx::migrate!("./migrations").run(&pool).await?;

        Ok(Self { pool })
    }

    /// Fetch the address with the given payload's identity, inserting it
    /// first if no such row exists. Returns the row and whether it was
    /// created by this call.
    pub async fn get_or_create_address(
        &self,
        address: &NewAddress,
    ) -> Result<(Address, bool), StoreError> {
        let address = address.normalized();
        let key = address_key(&address);

        let query = r#"
            INSERT INTO addresses (dedup_key, street_address, unit_number, city, state, zipcode, country, latitude, longitude)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(dedup_key) DO NOTHING
        "#;

        let result = sqlx::query(query)
            .bind(&key)
            .bind(&address.street_address)
            .bind(&address.unit_number)
            .bind(&address.city)
            .bind(&address.state)
            .bind(&address.zipcode)
            .bind(&address.country)
            .bind(address.latitude)
            .bind(address.longitude)
            .execute(&self.pool)
            .await?;

        let created = result.rows_affected() > 0;
        let stored = self.address_by_key(&key).await?;

        if created {
            tracing::debug!("Created address {}: {}", stored.id, stored);
        } else {
            tracing::debug!("Matched existing address {}: {}", stored.id, stored);
        }

        Ok((stored, created))
    }

    /// Get a single address by id
    pub async fn get_address(&self, id: i64) -> Result<Address, StoreError> {
        sqlx::query_as::<_, Address>(&format!("{ADDRESS_SELECT} WHERE a.id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| StoreError::NotFound(format!("address {id}")))
    }

    /// List addresses matching the plan, with the total match count
    pub async fn list_addresses(
        &self,
        plan: &QueryPlan,
        page: &Page,
    ) -> Result<(Vec<Address>, i64), StoreError> {
        let count = self.count("addresses a", &plan.conditions).await?;

        let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new(ADDRESS_SELECT);
        push_conditions(&mut builder, &plan.conditions);
        builder.push(" ORDER BY a.id");
        builder.push(" LIMIT ");
        builder.push_bind(page.limit);
        builder.push(" OFFSET ");
        builder.push_bind(page.offset);

        let addresses = builder
            .build_query_as::<Address>()
            .fetch_all(&self.pool)
            .await?;

        Ok((addresses, count))
    }

    /// Replace an address's attributes, recomputing its identity
    pub async fn update_address(&self, id: i64, address: &NewAddress) -> Result<Address, StoreError> {
        let address = address.normalized();
        let key = address_key(&address);

        let query = r#"
            UPDATE addresses
            SET dedup_key = ?, street_address = ?, unit_number = ?, city = ?, state = ?, zipcode = ?, country = ?, latitude = ?, longitude = ?
            WHERE id = ?
        "#;

        let result = sqlx::query(query)
            .bind(&key)
            .bind(&address.street_address)
            .bind(&address.unit_number)
            .bind(&address.city)
            .bind(&address.state)
            .bind(&address.zipcode)
            .bind(&address.country)
            .bind(address.latitude)
            .bind(address.longitude)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|error| match constraint_kind(&error) {
                Some(ErrorKind::UniqueViolation) => StoreError::Conflict(
                    "another address with identical attributes already exists".to_string(),
                ),
                _ => StoreError::from(error),
            })?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(format!("address {id}")));
        }

        tracing::debug!("Updated address {}", id);
        self.get_address(id).await
    }

    /// Delete an address; its listings go with it
    pub async fn delete_address(&self, id: i64) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM addresses WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(format!("address {id}")));
        }

        tracing::info!("Deleted address {} and its listings", id);
        Ok(())
    }

    /// Fetch the listing with the given payload's identity at the given
    /// address, inserting it first if no such row exists
    pub async fn get_or_create_listing(
        &self,
        address_id: i64,
        listing: &NewListing,
    ) -> Result<(ListingWithAddress, bool), StoreError> {
        let listing = listing.normalized();
        let key = listing_key(address_id, &listing);

        let query = r#"
            INSERT INTO listings (dedup_key, address_id, listing_number, date_accessed, price, details_url, size_interior, bedrooms, num_bathrooms, num_stories, num_units, land_size, frontage, photo_link, property_type, building_type, ownership_type, parking_type, num_parking, description)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(dedup_key) DO NOTHING
        "#;

        let result = sqlx::query(query)
            .bind(&key)
            .bind(address_id)
            .bind(&listing.listing_number)
            .bind(listing.date_accessed)
            .bind(listing.price)
            .bind(&listing.details_url)
            .bind(&listing.size_interior)
            .bind(&listing.bedrooms)
            .bind(listing.num_bathrooms)
            .bind(listing.num_stories)
            .bind(listing.num_units)
            .bind(&listing.land_size)
            .bind(&listing.frontage)
            .bind(&listing.photo_link)
            .bind(&listing.property_type)
            .bind(&listing.building_type)
            .bind(&listing.ownership_type)
            .bind(&listing.parking_type)
            .bind(listing.num_parking)
            .bind(&listing.description)
            .execute(&self.pool)
            .await
            .map_err(|error| match constraint_kind(&error) {
                Some(ErrorKind::ForeignKeyViolation) => StoreError::InvalidReference(format!(
                    "address {address_id} does not exist"
                )),
                _ => StoreError::from(error),
            })?;

        let created = result.rows_affected() > 0;
        let stored = self.listing_by_key(&key).await?;

        if created {
            tracing::debug!(
                "Created listing {} ({}) at address {}",
                stored.listing.id,
                stored.listing.listing_number,
                stored.address
            );
        } else {
            tracing::debug!(
                "Matched existing listing {} ({})",
                stored.listing.id,
                stored.listing.listing_number
            );
        }

        Ok((stored, created))
    }

    /// Get a single listing (with its address) by id
    pub async fn get_listing(&self, id: i64) -> Result<ListingWithAddress, StoreError> {
        let row = sqlx::query(&format!("{LISTING_SELECT} WHERE l.id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => Ok(listing_from_row(&row)?),
            None => Err(StoreError::NotFound(format!("listing {id}"))),
        }
    }

    /// List listings matching the plan, with the total match count
    pub async fn list_listings(
        &self,
        plan: &QueryPlan,
        page: &Page,
    ) -> Result<(Vec<ListingWithAddress>, i64), StoreError> {
        let count = self
            .count("listings l JOIN addresses a ON a.id = l.address_id", &plan.conditions)
            .await?;

        let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new(LISTING_SELECT);
        push_conditions(&mut builder, &plan.conditions);
        match plan.order {
            Some(order) => {
                builder.push(" ORDER BY ");
                builder.push(order.column);
                builder.push(if order.descending { " DESC" } else { " ASC" });
                // Secondary sort keeps page windows stable under equal keys
                builder.push(", l.id");
            }
            None => {
                builder.push(" ORDER BY l.id");
            }
        }
        builder.push(" LIMIT ");
        builder.push_bind(page.limit);
        builder.push(" OFFSET ");
        builder.push_bind(page.offset);

        let rows = builder.build().fetch_all(&self.pool).await?;
        let listings = rows
            .iter()
            .map(listing_from_row)
            .collect::<Result<Vec<_>, sqlx::Error>>()?;

        Ok((listings, count))
    }

    /// Replace a listing's attributes, re-pointing it at the given address
    /// and recomputing its identity
    pub async fn update_listing(
        &self,
        id: i64,
        address_id: i64,
        listing: &NewListing,
    ) -> Result<ListingWithAddress, StoreError> {
        let listing = listing.normalized();
        let key = listing_key(address_id, &listing);

        let query = r#"
            UPDATE listings
            SET dedup_key = ?, address_id = ?, listing_number = ?, date_accessed = ?, price = ?, details_url = ?, size_interior = ?, bedrooms = ?, num_bathrooms = ?, num_stories = ?, num_units = ?, land_size = ?, frontage = ?, photo_link = ?, property_type = ?, building_type = ?, ownership_type = ?, parking_type = ?, num_parking = ?, description = ?
            WHERE id = ?
        "#;

        let result = sqlx::query(query)
            .bind(&key)
            .bind(address_id)
            .bind(&listing.listing_number)
            .bind(listing.date_accessed)
            .bind(listing.price)
            .bind(&listing.details_url)
            .bind(&listing.size_interior)
            .bind(&listing.bedrooms)
            .bind(listing.num_bathrooms)
            .bind(listing.num_stories)
            .bind(listing.num_units)
            .bind(&listing.land_size)
            .bind(&listing.frontage)
            .bind(&listing.photo_link)
            .bind(&listing.property_type)
            .bind(&listing.building_type)
            .bind(&listing.ownership_type)
            .bind(&listing.parking_type)
            .bind(listing.num_parking)
            .bind(&listing.description)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|error| match constraint_kind(&error) {
                Some(ErrorKind::UniqueViolation) => StoreError::Conflict(
                    "another listing with identical attributes already exists".to_string(),
                ),
                Some(ErrorKind::ForeignKeyViolation) => StoreError::InvalidReference(format!(
                    "address {address_id} does not exist"
                )),
                _ => StoreError::from(error),
            })?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(format!("listing {id}")));
        }

        tracing::debug!("Updated listing {}", id);
        self.get_listing(id).await
    }

    /// Delete a listing by id
    pub async fn delete_listing(&self, id: i64) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM listings WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(format!("listing {id}")));
        }

        tracing::info!("Deleted listing {}", id);
        Ok(())
    }

    /// Health check for the database connection
    pub async fn health_check(&self) -> Result<bool, StoreError> {
        sqlx::query("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map(|_| true)
            .map_err(Into::into)
    }

    async fn address_by_key(&self, key: &str) -> Result<Address, StoreError> {
        sqlx::query_as::<_, Address>(&format!("{ADDRESS_SELECT} WHERE a.dedup_key = ?"))
            .bind(key)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| StoreError::NotFound("freshly written address row".to_string()))
    }

    async fn listing_by_key(&self, key: &str) -> Result<ListingWithAddress, StoreError> {
        let row = sqlx::query(&format!("{LISTING_SELECT} WHERE l.dedup_key = ?"))
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => Ok(listing_from_row(&row)?),
            None => Err(StoreError::NotFound(
                "freshly written listing row".to_string(),
            )),
        }
    }

    async fn count(&self, from: &str, conditions: &[Condition]) -> Result<i64, StoreError> {
        let mut builder: QueryBuilder<Sqlite> =
            QueryBuilder::new(format!("SELECT COUNT(*) FROM {from}"));
        push_conditions(&mut builder, conditions);

        let row = builder.build().fetch_one(&self.pool).await?;
        Ok(row.get::<i64, _>(0))
    }
}

/// Render the plan's conditions into the builder with bound values
fn push_conditions(builder: &mut QueryBuilder<'_, Sqlite>, conditions: &[Condition]) {
    for (index, condition) in conditions.iter().enumerate() {
        builder.push(if index == 0 { " WHERE " } else { " AND " });
        let column = condition.column.sql();
        match condition.op {
            Op::Exact => {
                builder.push(column);
                builder.push(" = ");
                push_scalar(builder, &condition.value);
            }
            Op::IExact => {
                builder.push("LOWER(");
                builder.push(column);
                builder.push(") = LOWER(");
                push_scalar(builder, &condition.value);
                builder.push(")");
            }
            Op::IContains => {
                // INSTR instead of LIKE so `%` and `_` in values stay literal
                builder.push("INSTR(LOWER(");
                builder.push(column);
                builder.push("), LOWER(");
                push_scalar(builder, &condition.value);
                builder.push(")) > 0");
            }
            Op::Gte => {
                builder.push(column);
                builder.push(" >= ");
                push_scalar(builder, &condition.value);
            }
            Op::Lte => {
                builder.push(column);
                builder.push(" <= ");
                push_scalar(builder, &condition.value);
            }
        }
    }
}

fn push_scalar(builder: &mut QueryBuilder<'_, Sqlite>, value: &Scalar) {
    match value {
        Scalar::Int(v) => builder.push_bind(*v),
        Scalar::Float(v) => builder.push_bind(*v),
        Scalar::Text(v) => builder.push_bind(v.clone()),
        Scalar::Date(v) => builder.push_bind(*v),
    };
}

fn constraint_kind(error: &sqlx::Error) -> Option<ErrorKind> {
    match error {
        sqlx::Error::Database(db) => Some(db.kind()),
        _ => None,
    }
}

fn listing_from_row(row: &SqliteRow) -> Result<ListingWithAddress, sqlx::Error> {
    Ok(ListingWithAddress {
        listing: Listing {
            id: row.try_get("id")?,
            address_id: row.try_get("address_id")?,
            listing_number: row.try_get("listing_number")?,
            date_accessed: row.try_get("date_accessed")?,
            price: row.try_get("price")?,
            details_url: row.try_get("details_url")?,
            size_interior: row.try_get("size_interior")?,
            bedrooms: row.try_get("bedrooms")?,
            num_bathrooms: row.try_get("num_bathrooms")?,
            num_stories: row.try_get("num_stories")?,
            num_units: row.try_get("num_units")?,
            land_size: row.try_get("land_size")?,
            frontage: row.try_get("frontage")?,
            photo_link: row.try_get("photo_link")?,
            property_type: row.try_get("property_type")?,
            building_type: row.try_get("building_type")?,
            ownership_type: row.try_get("ownership_type")?,
            parking_type: row.try_get("parking_type")?,
            num_parking: row.try_get("num_parking")?,
            description: row.try_get("description")?,
        },
        address: Address {
            id: row.try_get("a_id")?,
            street_address: row.try_get("a_street_address")?,
            unit_number: row.try_get("a_unit_number")?,
            city: row.try_get("a_city")?,
            state: row.try_get("a_state")?,
            zipcode: row.try_get("a_zipcode")?,
            country: row.try_get("a_country")?,
            latitude: row.try_get("a_latitude")?,
            longitude: row.try_get("a_longitude")?,
        },
    })
}
