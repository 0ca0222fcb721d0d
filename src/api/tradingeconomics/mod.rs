pub mod client;
pub mod models;

pub use client::TradingEconomicsClient;
pub use models::FetchError;
