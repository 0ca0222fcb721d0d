use tracing::{info, warn};

use crate::api::tradingeconomics::TradingEconomicsClient;
use crate::config::Config;
use crate::models::{PriceRecord, SummaryTable};
use crate::services::{chart_service, dataset_service, extract_service, summary_service};
use crate::utils::errors::PipelineError;
use crate::utils::format::format_price;

/// What one run produced
#[derive(Debug)]
pub struct RunReport {
    pub records: Vec<PriceRecord>,
    pub rows_appended: usize,
    /// `None` when there is no history to summarize yet
    pub summary: Option<SummaryTable>,
}

/// Fetch the page and run the rest of the pipeline on it
pub async fn run(config: &Config) -> Result<RunReport, PipelineError> {
    let client = TradingEconomicsClient::with_source_url(config.source_url.clone(), config.http_timeout)?;
    let markup = client.fetch_commodities_page().await?;
    process_markup(&markup, config)
}

/// Extract, persist and report from already-fetched markup
///
/// Extraction happens before anything is written, so a `ParseError` leaves the
/// dataset untouched.
pub fn process_markup(markup: &str, config: &Config) -> Result<RunReport, PipelineError> {
    let records = extract_service::extract(markup)?;

    if records.is_empty() {
        warn!("No target commodities found on the page; dataset not modified");
    }
    for record in &records {
        println!("{}: ${} per tonne", record.commodity, format_price(record.price));
    }

    let rows_appended = dataset_service::append(&records, &config.dataset_path)?;

    if !config.dataset_path.exists() {
        info!("No dataset at {} yet; skipping summary", config.dataset_path.display());
        return Ok(RunReport {
            records,
            rows_appended,
            summary: None,
        });
    }

    let summary = summary_service::summarize(&config.dataset_path)?;

    if summary.is_empty() {
        warn!("Dataset {} has no valid rows; skipping report", config.dataset_path.display());
    } else {
        println!("\nCommodity Price Summary:");
        println!("{}", summary_service::format_summary(&summary));
        summary_service::export_summary(&summary, &config.summary_path)?;
        chart_service::render(&summary, &config.chart_path)?;
    }

    Ok(RunReport {
        records,
        rows_appended,
        summary: Some(summary),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Commodity;
    use crate::utils::errors::ParseError;
    use std::fs;
    use std::path::Path;
    use std::time::Duration;

    fn config_in(dir: &Path, source_url: &str) -> Config {
        Config {
            source_url: source_url.to_string(),
            dataset_path: dir.join("prices.csv"),
            chart_path: dir.join("chart.png"),
            summary_path: dir.join("summary.csv"),
            log_dir: dir.join("logs"),
            http_timeout: Duration::from_secs(5),
        }
    }

    #[test]
    fn test_parse_error_leaves_dataset_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path(), "http://unused");
        let existing = "commodity,price,timestamp\nLead,2000,2024-01-15T08:00:00Z\n";
        fs::write(&config.dataset_path, existing).unwrap();

        let err = process_markup("<html><body>Just a moment...</body></html>", &config).unwrap_err();

        assert!(matches!(err, PipelineError::Parse(ParseError::NoRows)));
        assert_eq!(fs::read_to_string(&config.dataset_path).unwrap(), existing);
    }

    #[test]
    fn test_no_matches_on_first_run_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path(), "http://unused");
        let html = "<table><tr><th>Name</th><th>Price</th></tr><tr><td>Gold</td><td>2300</td></tr></table>";

        let report = process_markup(html, &config).unwrap();

        assert!(report.records.is_empty());
        assert_eq!(report.rows_appended, 0);
        assert!(report.summary.is_none());
        assert!(!config.dataset_path.exists());
        assert!(!config.chart_path.exists());
    }

    #[tokio::test]
    async fn test_run_fetch_failure_is_fetch_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/commodities")
            .with_status(403)
            .create_async()
            .await;

        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path(), &format!("{}/commodities", server.url()));

        let err = run(&config).await.unwrap_err();

        assert!(matches!(err, PipelineError::Fetch(_)));
        assert!(!config.dataset_path.exists());
    }

    #[tokio::test]
    async fn test_run_appends_extracted_rows() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/commodities")
            .with_status(200)
            .with_body(
                "<table><tr><th>Metals</th><th>Price</th></tr>\
                 <tr><td>Lithium</td><td>15,230 USD</td></tr>\
                 <tr><td>Cobalt</td><td>33,500 USD</td></tr></table>",
            )
            .create_async()
            .await;

        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path(), &format!("{}/commodities", server.url()));

        let report = run(&config).await.expect("run should succeed");

        assert_eq!(report.rows_appended, 2);
        assert_eq!(report.summary.as_ref().map(|s| s.rows.len()), Some(2));
        assert!(config.chart_path.exists());
        assert!(config.summary_path.exists());

        let contents = dataset_service::read_dataset(&config.dataset_path).unwrap();
        let commodities: Vec<Commodity> = contents.records.iter().map(|r| r.commodity).collect();
        assert_eq!(commodities, vec![Commodity::Lithium, Commodity::Cobalt]);
        assert_eq!(contents.records[0].price, 15230.0);
        assert_eq!(contents.records[1].price, 33500.0);
    }
}
