// Route exports
pub mod addresses;
pub mod listings;

use std::fmt;
use std::sync::Arc;

use actix_web::http::StatusCode;
use actix_web::{web, HttpResponse, Responder, ResponseError};

use crate::config::{AuthSettings, PaginationSettings};
use crate::models::responses::{ErrorResponse, HealthResponse};
use crate::services::{CatalogStore, StoreError};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub store: CatalogStore,
    pub auth: Arc<AuthSettings>,
    pub pagination: PaginationSettings,
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .route("/health", web::get().to(health_check))
            .configure(addresses::configure)
            .configure(listings::configure),
    );
}

/// Health check endpoint; the only route that skips authentication
async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let db_healthy = state.store.health_check().await.unwrap_or(false);

    let status = if db_healthy { "healthy" } else { "degraded" };

    HttpResponse::Ok().json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    })
}

/// Request-level failure raised by extractors and payload handlers,
/// rendered as the standard error envelope
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    error: &'static str,
    message: String,
}

impl ApiError {
    pub fn forbidden() -> Self {
        Self {
            status: StatusCode::FORBIDDEN,
            error: "forbidden",
            message: "authentication credentials were missing or invalid".to_string(),
        }
    }

    pub fn bad_request(error: &'static str, message: String) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            error,
            message,
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.error, self.message)
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        self.status
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status).json(ErrorResponse {
            error: self.error.to_string(),
            message: self.message.clone(),
            status_code: self.status.as_u16(),
            details: None,
        })
    }
}

/// Render a payload validation failure as the standard 400 envelope,
/// with per-field detail
pub(crate) fn validation_failed(errors: &validator::ValidationErrors) -> HttpResponse {
    HttpResponse::BadRequest().json(ErrorResponse {
        error: "validation_failed".to_string(),
        message: "request payload failed validation".to_string(),
        status_code: 400,
        details: serde_json::to_value(errors).ok(),
    })
}

/// Map a storage error onto the response it should produce
pub(crate) fn store_error(error: StoreError) -> HttpResponse {
    match error {
        StoreError::NotFound(what) => HttpResponse::NotFound().json(ErrorResponse {
            error: "not_found".to_string(),
            message: format!("{what} not found"),
            status_code: 404,
            details: None,
        }),
        StoreError::Conflict(message) => HttpResponse::Conflict().json(ErrorResponse {
            error: "conflict".to_string(),
            message,
            status_code: 409,
            details: None,
        }),
        StoreError::InvalidReference(message) => HttpResponse::BadRequest().json(ErrorResponse {
            error: "invalid_reference".to_string(),
            message,
            status_code: 400,
            details: None,
        }),
        error => {
            tracing::error!("Storage failure: {}", error);
            HttpResponse::InternalServerError().json(ErrorResponse {
                error: "internal_error".to_string(),
                message: "internal server error".to_string(),
                status_code: 500,
                details: None,
            })
        }
    }
}
