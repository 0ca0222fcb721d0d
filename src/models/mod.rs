//! Data models for the commodity tracker
//!
//! Observations captured from the source page and the summaries derived from
//! the accumulated dataset.

pub mod commodity;
pub mod summary;

// Re-export commonly used types for convenience
pub use commodity::{Commodity, DatasetRow, PriceRecord};
pub use summary::{CommoditySummary, SummaryTable, Trend};
