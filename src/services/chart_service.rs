use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use std::fs;
use std::path::Path;
use tracing::info;

use crate::models::SummaryTable;
use crate::utils::errors::StorageError;
use crate::utils::format::format_thousands;

pub const CHART_WIDTH: u32 = 1200;
pub const CHART_HEIGHT: u32 = 800;

/// Sea green, royal blue, crimson
const BAR_COLORS: [RGBColor; 3] = [
    RGBColor(0x2E, 0x8B, 0x57),
    RGBColor(0x41, 0x69, 0xE1),
    RGBColor(0xDC, 0x14, 0x3C),
];

/// Top of the price axis, leaving room for the value labels above the bars
pub fn value_axis_max(prices: &[f64]) -> f64 {
    let max_price = prices.iter().copied().fold(0.0, f64::max);
    (max_price * 1.15).max(1.0)
}

/// Render the latest price of every commodity in `table` as a PNG bar chart
pub fn render(table: &SummaryTable, path: &Path) -> Result<(), StorageError> {
    if table.is_empty() {
        return Err(StorageError::Chart("No price data available for visualization".to_string()));
    }

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| StorageError::Write {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    let labels: Vec<&str> = table.rows.iter().map(|row| row.commodity.name()).collect();
    let prices: Vec<f64> = table.rows.iter().map(|row| row.latest_price).collect();
    let bar_count = table.rows.len() as u32;

    let root = BitMapBackend::new(path, (CHART_WIDTH, CHART_HEIGHT)).into_drawing_area();
    root.fill(&WHITE)
        .map_err(|e| StorageError::Chart(format!("Failed to fill canvas: {}", e)))?;

    let mut chart = ChartBuilder::on(&root)
        .caption(
            "Commodity Prices",
            ("sans-serif", 40.0).into_font().style(FontStyle::Bold),
        )
        .margin(20)
        .x_label_area_size(60)
        .y_label_area_size(100)
        .build_cartesian_2d((0u32..bar_count).into_segmented(), 0f64..value_axis_max(&prices))
        .map_err(|e| StorageError::Chart(format!("Failed to build chart: {}", e)))?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_desc("Commodity")
        .y_desc("Price (USD per tonne)")
        .axis_desc_style(("sans-serif", 20).into_font().style(FontStyle::Bold))
        .x_label_formatter(&|x| match x {
            SegmentValue::CenterOf(i) => labels
                .get(*i as usize)
                .map(|label| label.to_string())
                .unwrap_or_default(),
            _ => String::new(),
        })
        .y_label_formatter(&|y| format_thousands(*y, 0))
        .draw()
        .map_err(|e| StorageError::Chart(format!("Failed to draw mesh: {}", e)))?;

    chart
        .draw_series(prices.iter().enumerate().map(|(i, price)| {
            let i = i as u32;
            let color = BAR_COLORS[i as usize % BAR_COLORS.len()];
            let mut bar = Rectangle::new(
                [(SegmentValue::Exact(i), 0.0), (SegmentValue::Exact(i + 1), *price)],
                color.mix(0.8).filled(),
            );
            bar.set_margin(0, 0, 40, 40);
            bar
        }))
        .map_err(|e| StorageError::Chart(format!("Failed to draw bars: {}", e)))?;

    let value_style = TextStyle::from(("sans-serif", 20).into_font())
        .pos(Pos::new(HPos::Center, VPos::Bottom));
    chart
        .draw_series(prices.iter().enumerate().map(|(i, price)| {
            Text::new(
                format_thousands(*price, 0),
                (SegmentValue::CenterOf(i as u32), *price),
                value_style.clone(),
            )
        }))
        .map_err(|e| StorageError::Chart(format!("Failed to draw labels: {}", e)))?;

    if let Some(collected) = table.latest_timestamp() {
        root.draw(&Text::new(
            format!("Data collected: {}", collected.format("%Y-%m-%d %H:%M:%S")),
            (15, CHART_HEIGHT as i32 - 25),
            ("sans-serif", 14).into_font().style(FontStyle::Italic),
        ))
        .map_err(|e| StorageError::Chart(format!("Failed to draw footnote: {}", e)))?;
    }

    root.present()
        .map_err(|e| StorageError::Chart(format!("Failed to render chart: {}", e)))?;

    info!("Chart with {} bar(s) saved to {}", bar_count, path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Commodity, CommoditySummary};
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_value_axis_leaves_headroom() {
        assert_eq!(value_axis_max(&[15230.0, 33500.0]), 33500.0 * 1.15);
        assert_eq!(value_axis_max(&[]), 1.0);
    }

    #[test]
    fn test_render_two_bars() {
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 9, 30, 0).unwrap();
        let table = SummaryTable {
            rows: vec![
                CommoditySummary {
                    commodity: Commodity::Lithium,
                    latest_price: 15230.0,
                    latest_timestamp: at,
                    previous_price: None,
                    observations: 1,
                },
                CommoditySummary {
                    commodity: Commodity::Cobalt,
                    latest_price: 33500.0,
                    latest_timestamp: at,
                    previous_price: Some(33000.0),
                    observations: 2,
                },
            ],
            skipped_rows: 0,
        };
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("charts").join("prices.png");

        render(&table, &path).expect("chart should render");

        let size = std::fs::metadata(&path).unwrap().len();
        assert!(size > 0);
    }

    #[test]
    fn test_render_empty_table_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chart.png");

        let err = render(&SummaryTable::default(), &path).unwrap_err();

        assert!(matches!(err, StorageError::Chart(_)));
        assert!(!path.exists());
    }
}
