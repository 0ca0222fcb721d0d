use std::process::ExitCode;
use tracing::{error, info, warn};

mod api;
mod config;
mod models;
mod services;
mod utils;

use config::Config;
use services::pipeline_service;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    dotenv::dotenv().ok();

    let config = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    // Keep the guard alive so file logs are flushed on exit
    let _log_guard = match utils::logging::setup_logging(&config.log_dir) {
        Ok(guard) => Some(guard),
        Err(e) => {
            eprintln!("Failed to set up file logging in {}: {}", config.log_dir.display(), e);
            None
        }
    };

    info!("Starting commodity price scraper");
    info!("Dataset: {}", config.dataset_path.display());

    match pipeline_service::run(&config).await {
        Ok(report) => {
            if report.records.is_empty() {
                warn!("No prices were scraped");
            }
            info!(
                "Run complete: {} price(s) scraped, {} row(s) appended",
                report.records.len(),
                report.rows_appended
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
