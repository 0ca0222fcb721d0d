//! Commodity and price observation models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The commodities tracked by the scraper
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Commodity {
    Lithium,
    Lead,
    Cobalt,
}

impl Commodity {
    /// All tracked commodities in reporting order
    pub const ALL: [Commodity; 3] = [Commodity::Lithium, Commodity::Lead, Commodity::Cobalt];

    pub fn name(&self) -> &'static str {
        match self {
            Commodity::Lithium => "Lithium",
            Commodity::Lead => "Lead",
            Commodity::Cobalt => "Cobalt",
        }
    }

    /// Find the tracked commodity mentioned in a cleaned row label (case-insensitive)
    pub fn match_label(label: &str) -> Option<Commodity> {
        let label = label.to_lowercase();
        Self::ALL
            .into_iter()
            .find(|c| label.contains(&c.name().to_lowercase()))
    }

    /// Parse an exact commodity name as stored in the dataset
    pub fn from_name(name: &str) -> Option<Commodity> {
        let name = name.trim();
        Self::ALL
            .into_iter()
            .find(|c| c.name().eq_ignore_ascii_case(name))
    }
}

impl fmt::Display for Commodity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A single price observation captured from the source page
#[derive(Debug, Clone, PartialEq)]
pub struct PriceRecord {
    pub commodity: Commodity,
    pub price: f64,
    pub timestamp: DateTime<Utc>,
}

/// One row of the dataset CSV: `commodity,price,timestamp`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetRow {
    pub commodity: String,
    pub price: String,
    pub timestamp: String,
}

impl From<&PriceRecord> for DatasetRow {
    fn from(record: &PriceRecord) -> Self {
        DatasetRow {
            commodity: record.commodity.name().to_string(),
            price: record.price.to_string(),
            timestamp: record
                .timestamp
                .to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
        }
    }
}

impl TryFrom<DatasetRow> for PriceRecord {
    type Error = String;

    fn try_from(row: DatasetRow) -> Result<Self, Self::Error> {
        let commodity = Commodity::from_name(&row.commodity)
            .ok_or_else(|| format!("unknown commodity '{}'", row.commodity))?;

        let price: f64 = row
            .price
            .trim()
            .parse()
            .map_err(|_| format!("invalid price '{}'", row.price))?;
        if !price.is_finite() || price <= 0.0 {
            return Err(format!("non-positive price '{}'", row.price));
        }

        let timestamp = DateTime::parse_from_rfc3339(row.timestamp.trim())
            .map_err(|e| format!("invalid timestamp '{}': {}", row.timestamp, e))?
            .with_timezone(&Utc);

        Ok(PriceRecord {
            commodity,
            price,
            timestamp,
        })
    }
}
