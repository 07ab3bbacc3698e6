use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{error, middleware, web, App, HttpServer};
use tracing::{error, info};

use estate_catalog::config::Settings;
use estate_catalog::routes::{self, ApiError, AppState};
use estate_catalog::services::CatalogStore;

/// Handle JSON payload errors
fn handle_json_payload_error(
    err: error::JsonPayloadError,
    req: &actix_web::HttpRequest,
) -> actix_web::Error {
    tracing::info!("JSON payload error on {}: {}", req.path(), err);
    ApiError::bad_request("invalid_json", format!("Invalid JSON: {}", err)).into()
}

/// Handle query payload errors
fn handle_query_payload_error(
    err: error::QueryPayloadError,
    _req: &actix_web::HttpRequest,
) -> actix_web::Error {
    ApiError::bad_request("invalid_query", format!("Invalid query: {}", err)).into()
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    // Load configuration
    let settings = Settings::load().unwrap_or_else(|e| {
        eprintln!("Failed to load configuration: {}", e);
        panic!("Configuration error: {}", e);
    });

    // Initialize logging
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&settings.logging.level)),
        )
        .with_target(false)
        .with_level(true);

    if settings.logging.format == "pretty" {
        subscriber.pretty().init();
    } else {
        subscriber.init();
    }

    info!("Starting estate catalog service...");

    if settings.auth.api_keys.is_empty() {
        error!("No API keys configured; every catalog endpoint will reject its callers");
    }

    // Connect to the catalog database and run migrations
    let db_max_conn = settings.database.max_connections.unwrap_or(10);

    let store = CatalogStore::connect(&settings.database.url, db_max_conn)
        .await
        .unwrap_or_else(|e| {
            error!("Failed to open catalog database: {}", e);
            panic!("Database error: {}", e);
        });

    info!("Catalog store initialized (max: {} connections)", db_max_conn);

    // Build application state
    let app_state = AppState {
        store,
        auth: Arc::new(settings.auth),
        pagination: settings.pagination,
    };

    // Configure HTTP server
    let host = settings.server.host.clone();
    let port = settings.server.port;
    let workers = settings.server.workers.unwrap_or(4);

    info!("Starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .app_data(web::JsonConfig::default().error_handler(handle_json_payload_error))
            .app_data(web::QueryConfig::default().error_handler(handle_query_payload_error))
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            .configure(routes::configure_routes)
    })
    .workers(workers)
    .bind((host, port))?
    .run()
    .await
}
