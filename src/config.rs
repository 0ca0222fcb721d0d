use std::path::PathBuf;
use std::time::Duration;

use crate::api::tradingeconomics::TradingEconomicsClient;
use crate::utils::errors::ConfigError;

/// Run configuration, read from the environment (and `.env`)
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub source_url: String,
    pub dataset_path: PathBuf,
    pub chart_path: PathBuf,
    pub summary_path: PathBuf,
    pub log_dir: PathBuf,
    pub http_timeout: Duration,
}

impl Config {
    pub const DEFAULT_DATASET_PATH: &'static str = "data/commodity_prices.csv";
    pub const DEFAULT_CHART_PATH: &'static str = "commodity_prices_chart.png";
    pub const DEFAULT_SUMMARY_PATH: &'static str = "commodity_prices_summary.csv";
    pub const DEFAULT_LOG_DIR: &'static str = "logs";
    pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from any key lookup; empty values count as unset
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let http_timeout = match get("COMMODITY_HTTP_TIMEOUT_SECS") {
            Some(raw) => {
                let secs: u64 = raw.parse().map_err(|_| ConfigError {
                    key: "COMMODITY_HTTP_TIMEOUT_SECS".to_string(),
                    value: raw.clone(),
                    reason: "expected a whole number of seconds".to_string(),
                })?;
                if secs == 0 {
                    return Err(ConfigError {
                        key: "COMMODITY_HTTP_TIMEOUT_SECS".to_string(),
                        value: raw,
                        reason: "timeout must be at least one second".to_string(),
                    });
                }
                Duration::from_secs(secs)
            }
            None => Duration::from_secs(Self::DEFAULT_TIMEOUT_SECS),
        };

        Ok(Config {
            source_url: get("COMMODITY_SOURCE_URL")
                .unwrap_or_else(|| TradingEconomicsClient::DEFAULT_SOURCE_URL.to_string()),
            dataset_path: get("COMMODITY_DATASET_PATH")
                .unwrap_or_else(|| Self::DEFAULT_DATASET_PATH.to_string())
                .into(),
            chart_path: get("COMMODITY_CHART_PATH")
                .unwrap_or_else(|| Self::DEFAULT_CHART_PATH.to_string())
                .into(),
            summary_path: get("COMMODITY_SUMMARY_PATH")
                .unwrap_or_else(|| Self::DEFAULT_SUMMARY_PATH.to_string())
                .into(),
            log_dir: get("COMMODITY_LOG_DIR")
                .unwrap_or_else(|| Self::DEFAULT_LOG_DIR.to_string())
                .into(),
            http_timeout,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup(&[])).unwrap();

        assert_eq!(config.source_url, "https://tradingeconomics.com/commodities");
        assert_eq!(config.dataset_path, PathBuf::from("data/commodity_prices.csv"));
        assert_eq!(config.chart_path, PathBuf::from("commodity_prices_chart.png"));
        assert_eq!(config.http_timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_overrides_and_blank_values() {
        let config = Config::from_lookup(lookup(&[
            ("COMMODITY_DATASET_PATH", "/tmp/prices.csv"),
            ("COMMODITY_HTTP_TIMEOUT_SECS", "10"),
            ("COMMODITY_CHART_PATH", "   "),
        ]))
        .unwrap();

        assert_eq!(config.dataset_path, PathBuf::from("/tmp/prices.csv"));
        assert_eq!(config.http_timeout, Duration::from_secs(10));
        assert_eq!(config.chart_path, PathBuf::from("commodity_prices_chart.png"));
    }

    #[test]
    fn test_invalid_timeout() {
        let err = Config::from_lookup(lookup(&[("COMMODITY_HTTP_TIMEOUT_SECS", "soon")])).unwrap_err();
        assert_eq!(err.key, "COMMODITY_HTTP_TIMEOUT_SECS");

        assert!(Config::from_lookup(lookup(&[("COMMODITY_HTTP_TIMEOUT_SECS", "0")])).is_err());
    }
}
