use actix_web::{web, HttpResponse, Responder};
use validator::Validate;

use crate::auth::Authenticated;
use crate::core::query::listing_query;
use crate::models::requests::{ListingFilterParams, ListingPayload, PageParams};
use crate::models::responses::{ListingDetail, ListingSummary, Paginated};
use crate::routes::{store_error, validation_failed, AppState};

/// Configure listing collection routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/listings")
            .route("", web::get().to(list_listings))
            .route("", web::post().to(create_listing))
            .route("/{id}", web::get().to(get_listing))
            .route("/{id}", web::put().to(update_listing))
            .route("/{id}", web::patch().to(update_listing))
            .route("/{id}", web::delete().to(delete_listing)),
    );
}

/// List listings matching the query parameters
///
/// GET /api/v1/listings
///
/// Address-scoped filters apply to the joined address row and match
/// case-insensitively. `ordering` accepts a whitelisted column name,
/// prefixed with `-` for descending.
async fn list_listings(
    state: web::Data<AppState>,
    _auth: Authenticated,
    filters: web::Query<ListingFilterParams>,
    page: web::Query<PageParams>,
) -> impl Responder {
    let plan = listing_query(&filters);
    let page = page.resolve(&state.pagination);

    match state.store.list_listings(&plan, &page).await {
        Ok((listings, count)) => {
            let results: Vec<ListingSummary> =
                listings.iter().map(ListingSummary::from).collect();
            HttpResponse::Ok().json(Paginated::new(count, &page, results))
        }
        Err(error) => store_error(error),
    }
}

/// Create a listing, resolving its nested address get-or-create first
///
/// POST /api/v1/listings
///
/// An identical listing payload collapses onto the existing record; the
/// nested address likewise never duplicates an existing address row.
async fn create_listing(
    state: web::Data<AppState>,
    _auth: Authenticated,
    payload: web::Json<ListingPayload>,
) -> impl Responder {
    if let Err(errors) = payload.validate() {
        return validation_failed(&errors);
    }

    let (address, _) = match state.store.get_or_create_address(&payload.address).await {
        Ok(resolved) => resolved,
        Err(error) => return store_error(error),
    };

    match state
        .store
        .get_or_create_listing(address.id, &payload.listing)
        .await
    {
        Ok((listing, _created)) => HttpResponse::Created().json(ListingDetail::from(listing)),
        Err(error) => store_error(error),
    }
}

/// Get a single listing in the full projection
///
/// GET /api/v1/listings/{id}
async fn get_listing(
    state: web::Data<AppState>,
    _auth: Authenticated,
    path: web::Path<i64>,
) -> impl Responder {
    match state.store.get_listing(path.into_inner()).await {
        Ok(listing) => HttpResponse::Ok().json(ListingDetail::from(listing)),
        Err(error) => store_error(error),
    }
}

/// Replace a listing's attributes, re-resolving its nested address
///
/// PUT/PATCH /api/v1/listings/{id}
async fn update_listing(
    state: web::Data<AppState>,
    _auth: Authenticated,
    path: web::Path<i64>,
    payload: web::Json<ListingPayload>,
) -> impl Responder {
    if let Err(errors) = payload.validate() {
        return validation_failed(&errors);
    }

    let (address, _) = match state.store.get_or_create_address(&payload.address).await {
        Ok(resolved) => resolved,
        Err(error) => return store_error(error),
    };

    match state
        .store
        .update_listing(path.into_inner(), address.id, &payload.listing)
        .await
    {
        Ok(listing) => HttpResponse::Ok().json(ListingDetail::from(listing)),
        Err(error) => store_error(error),
    }
}

/// Delete a listing; its address stays
///
/// DELETE /api/v1/listings/{id}
async fn delete_listing(
    state: web::Data<AppState>,
    _auth: Authenticated,
    path: web::Path<i64>,
) -> impl Responder {
    match state.store.delete_listing(path.into_inner()).await {
        Ok(()) => HttpResponse::NoContent().finish(),
        Err(error) => store_error(error),
    }
}
