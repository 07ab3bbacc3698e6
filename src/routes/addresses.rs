use actix_web::{web, HttpResponse, Responder};
use validator::Validate;

use crate::auth::Authenticated;
use crate::core::query::address_query;
use crate::models::domain::NewAddress;
use crate::models::requests::{AddressFilterParams, PageParams};
use crate::models::responses::{AddressSummary, Paginated};
use crate::routes::{store_error, validation_failed, AppState};

/// Configure address collection routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/addresses")
            .route("", web::get().to(list_addresses))
            .route("", web::post().to(create_address))
            .route("/{id}", web::get().to(get_address))
            .route("/{id}", web::put().to(update_address))
            .route("/{id}", web::patch().to(update_address))
            .route("/{id}", web::delete().to(delete_address)),
    );
}

/// List addresses matching the query parameters
///
/// GET /api/v1/addresses
///
/// Filter parameters match exactly (`zipcode_contains` is the one
/// case-insensitive exception); results come back in the reduced
/// projection, paginated.
async fn list_addresses(
    state: web::Data<AppState>,
    _auth: Authenticated,
    filters: web::Query<AddressFilterParams>,
    page: web::Query<PageParams>,
) -> impl Responder {
    let plan = address_query(&filters);
    let page = page.resolve(&state.pagination);

    match state.store.list_addresses(&plan, &page).await {
        Ok((addresses, count)) => {
            let results: Vec<AddressSummary> =
                addresses.iter().map(AddressSummary::from).collect();
            HttpResponse::Ok().json(Paginated::new(count, &page, results))
        }
        Err(error) => store_error(error),
    }
}

/// Create an address, collapsing onto any existing identical one
///
/// POST /api/v1/addresses
async fn create_address(
    state: web::Data<AppState>,
    _auth: Authenticated,
    payload: web::Json<NewAddress>,
) -> impl Responder {
    if let Err(errors) = payload.validate() {
        return validation_failed(&errors);
    }

    match state.store.get_or_create_address(&payload).await {
        Ok((address, _created)) => HttpResponse::Created().json(address),
        Err(error) => store_error(error),
    }
}

/// Get a single address in the full projection
///
/// GET /api/v1/addresses/{id}
async fn get_address(
    state: web::Data<AppState>,
    _auth: Authenticated,
    path: web::Path<i64>,
) -> impl Responder {
    match state.store.get_address(path.into_inner()).await {
        Ok(address) => HttpResponse::Ok().json(address),
        Err(error) => store_error(error),
    }
}

/// Replace an address's attributes
///
/// PUT/PATCH /api/v1/addresses/{id}
async fn update_address(
    state: web::Data<AppState>,
    _auth: Authenticated,
    path: web::Path<i64>,
    payload: web::Json<NewAddress>,
) -> impl Responder {
    if let Err(errors) = payload.validate() {
        return validation_failed(&errors);
    }

    match state.store.update_address(path.into_inner(), &payload).await {
        Ok(address) => HttpResponse::Ok().json(address),
        Err(error) => store_error(error),
    }
}

/// Delete an address and, through the store, every listing at it
///
/// DELETE /api/v1/addresses/{id}
async fn delete_address(
    state: web::Data<AppState>,
    _auth: Authenticated,
    path: web::Path<i64>,
) -> impl Responder {
    match state.store.delete_address(path.into_inner()).await {
        Ok(()) => HttpResponse::NoContent().finish(),
        Err(error) => store_error(error),
    }
}
