//! Batch import job: load one CSV listing export into the catalog.
//!
//! Usage: `import-listings <file.csv>`. Re-running the same file is safe;
//! rows that already exist resolve to their stored records instead of
//! duplicating them.

use std::process::ExitCode;

use tracing::{error, info, warn};

use estate_catalog::config::Settings;
use estate_catalog::core::import_file;
use estate_catalog::services::CatalogStore;

#[tokio::main]
async fn main() -> ExitCode {
    // Load .env file if present
    dotenv::dotenv().ok();

    let settings = match Settings::load() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&settings.logging.level)),
        )
        .with_target(false)
        .init();

    let path = match std::env::args().nth(1) {
        Some(path) => path,
        None => {
            eprintln!("Usage: import-listings <file.csv>");
            return ExitCode::FAILURE;
        }
    };

    let store = match CatalogStore::connect(&settings.database.url, 1).await {
        Ok(store) => store,
        Err(e) => {
            error!("Failed to open catalog database: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let summary = match import_file(&store, &path).await {
        Ok(summary) => summary,
        Err(e) => {
            error!("Import aborted: {}", e);
            return ExitCode::FAILURE;
        }
    };

    for failure in &summary.failures {
        warn!("Row {} failed: {}", failure.row, failure.reason);
    }

    info!(
        "Imported {} of {} rows ({} new listings, {} already present, {} new addresses)",
        summary.rows - summary.failures.len() as u64,
        summary.rows,
        summary.listings_created,
        summary.listings_matched,
        summary.addresses_created
    );

    if summary.rows > 0 && summary.failures.len() as u64 == summary.rows {
        error!("Every row failed; see warnings above");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}
