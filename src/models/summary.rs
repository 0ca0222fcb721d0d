//! Summary models derived from the price history

use chrono::{DateTime, Utc};
use std::fmt;

use super::Commodity;

/// Direction of the latest move compared to the previous observation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trend {
    Up,
    Down,
    Flat,
    /// Only one observation so far
    New,
}

impl fmt::Display for Trend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Trend::Up => "up",
            Trend::Down => "down",
            Trend::Flat => "flat",
            Trend::New => "new",
        };
        f.write_str(label)
    }
}

/// Latest price and trend for one commodity
#[derive(Debug, Clone, PartialEq)]
pub struct CommoditySummary {
    pub commodity: Commodity,
    pub latest_price: f64,
    pub latest_timestamp: DateTime<Utc>,
    pub previous_price: Option<f64>,
    pub observations: usize,
}

impl CommoditySummary {
    pub fn change(&self) -> Option<f64> {
        self.previous_price.map(|prev| self.latest_price - prev)
    }

    pub fn change_percent(&self) -> Option<f64> {
        self.previous_price
            .filter(|prev| *prev != 0.0)
            .map(|prev| (self.latest_price - prev) / prev * 100.0)
    }

    pub fn trend(&self) -> Trend {
        match self.change() {
            None => Trend::New,
            Some(delta) if delta > 0.0 => Trend::Up,
            Some(delta) if delta < 0.0 => Trend::Down,
            Some(_) => Trend::Flat,
        }
    }
}

/// Per-commodity summary of the whole dataset
#[derive(Debug, Clone, Default)]
pub struct SummaryTable {
    pub rows: Vec<CommoditySummary>,
    /// Rows of the dataset that could not be parsed
    pub skipped_rows: usize,
}

impl SummaryTable {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    #[cfg(test)]
    pub fn get(&self, commodity: Commodity) -> Option<&CommoditySummary> {
        self.rows.iter().find(|row| row.commodity == commodity)
    }

    pub fn latest_timestamp(&self) -> Option<DateTime<Utc>> {
        self.rows.iter().map(|row| row.latest_timestamp).max()
    }
}
