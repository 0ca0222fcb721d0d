use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tracing::{info, warn};

use crate::models::{Commodity, CommoditySummary, PriceRecord, SummaryTable};
use crate::services::dataset_service;
use crate::utils::errors::StorageError;
use crate::utils::format::{format_percent, format_price};
use crate::utils::Table;

/// Summarize the dataset at `path`: latest price and trend per commodity
pub fn summarize(path: &Path) -> Result<SummaryTable, StorageError> {
    let contents = dataset_service::read_dataset(path)?;
    if contents.skipped_rows > 0 {
        warn!(
            "Skipped {} malformed row(s) while summarizing {}",
            contents.skipped_rows,
            path.display()
        );
    }
    Ok(build_summary(&contents.records, contents.skipped_rows))
}

/// Group records by commodity and compare the two most recent observations
///
/// Records are ordered by timestamp; equal timestamps keep their file order, so
/// the last-seen row wins for the latest timestamp.
pub fn build_summary(records: &[PriceRecord], skipped_rows: usize) -> SummaryTable {
    let mut grouped: HashMap<Commodity, Vec<&PriceRecord>> = HashMap::new();
    for record in records {
        grouped.entry(record.commodity).or_default().push(record);
    }

    let rows = Commodity::ALL
        .iter()
        .filter_map(|commodity| {
            let mut history = grouped.remove(commodity)?;
            // Stable sort keeps file order among duplicate timestamps
            history.sort_by_key(|r| r.timestamp);

            let latest = history.last()?;
            let previous = history.len().checked_sub(2).map(|i| history[i].price);

            Some(CommoditySummary {
                commodity: *commodity,
                latest_price: latest.price,
                latest_timestamp: latest.timestamp,
                previous_price: previous,
                observations: history.len(),
            })
        })
        .collect();

    SummaryTable { rows, skipped_rows }
}

/// Render the summary as a text table for the terminal
pub fn format_summary(table: &SummaryTable) -> String {
    let mut out = Table::new(vec![
        "Commodity",
        "Price (USD/tonne)",
        "Change",
        "Trend",
        "Observations",
        "Timestamp",
    ]);

    for row in &table.rows {
        let change = row.change_percent().map(format_percent).unwrap_or_else(|| "-".to_string());
        let observations = row.observations.to_string();
        let timestamp = row.latest_timestamp.format("%Y-%m-%d %H:%M:%S").to_string();
        let trend = row.trend().to_string();
        out.add_row(vec![
            row.commodity.name(),
            &format_price(row.latest_price),
            &change,
            &trend,
            &observations,
            &timestamp,
        ]);
    }

    out.render()
}

/// Overwrite `path` with a CSV export of the summary table
pub fn export_summary(table: &SummaryTable, path: &Path) -> Result<(), StorageError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| StorageError::Write {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    let csv_err = |source: csv::Error| StorageError::Csv {
        path: path.to_path_buf(),
        source,
    };

    let mut writer = csv::Writer::from_path(path).map_err(csv_err)?;
    writer
        .write_record(["Commodity", "Price (USD/tonne)", "Change (%)", "Timestamp"])
        .map_err(csv_err)?;

    for row in &table.rows {
        let change = row
            .change_percent()
            .map(|pct| format!("{:.2}", pct))
            .unwrap_or_default();
        writer
            .write_record([
                row.commodity.name().to_string(),
                format_price(row.latest_price),
                change,
                row.latest_timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
            ])
            .map_err(csv_err)?;
    }

    writer.flush().map_err(|source| StorageError::Write {
        path: path.to_path_buf(),
        source,
    })?;

    info!("Summary saved to: {}", path.display());
    Ok(())
}
