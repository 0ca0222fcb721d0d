use reqwest::Client as HttpClient;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, CONNECTION};
use std::time::Duration;
use tracing::{debug, info, warn};

use super::models::FetchError;
use crate::utils::errors::truncate_body;

/// HTTP client for the Trading Economics commodities listing
pub struct TradingEconomicsClient {
    http_client: HttpClient,
    source_url: String,
}

impl TradingEconomicsClient {
    pub const DEFAULT_SOURCE_URL: &'static str = "https://tradingeconomics.com/commodities";
    const USER_AGENT: &'static str = "Mozilla/5.0";
    const ERROR_BODY_CHARS: usize = 200;

    /// Create a client for the commodities page at `source_url`
    pub fn with_source_url(source_url: String, timeout: Duration) -> Result<Self, FetchError> {
        let http_client = HttpClient::builder()
            .timeout(timeout)
            .user_agent(Self::USER_AGENT)
            .default_headers(Self::create_headers())
            .build()
            .map_err(|e| FetchError::Client(e.to_string()))?;

        Ok(Self {
            http_client,
            source_url,
        })
    }

    /// Browser-like headers; the listing page rejects bare clients
    fn create_headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("text/html"));
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.5"));
        headers.insert(CONNECTION, HeaderValue::from_static("keep-alive"));
        headers
    }

    /// GET the configured commodities page
    pub async fn fetch_commodities_page(&self) -> Result<String, FetchError> {
        self.fetch(&self.source_url).await
    }

    /// GET `url` and return the response body as text
    ///
    /// # Returns
    /// * `Ok(String)` - Full HTML of a 2xx response
    /// * `Err(FetchError)` - Network failure, timeout or non-success status
    pub async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        info!("Fetching {}", url);

        let response = self.http_client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::Request(format!("Request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body_text = response.text().await.unwrap_or_default();
            warn!("{} returned HTTP {}", url, status.as_u16());
            return Err(FetchError::HttpStatus {
                status: status.as_u16(),
                body: truncate_body(&body_text, Self::ERROR_BODY_CHARS),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| FetchError::Body(format!("Failed to read response: {}", e)))?;

        debug!("Received {} bytes from {}", body.len(), url);
        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client_for(server: &mockito::ServerGuard) -> TradingEconomicsClient {
        TradingEconomicsClient::with_source_url(
            format!("{}/commodities", server.url()),
            Duration::from_secs(5),
        )
        .expect("client should build")
    }

    #[tokio::test]
    async fn test_fetch_returns_page_body() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/commodities")
            .match_header("user-agent", "Mozilla/5.0")
            .match_header("accept", "text/html")
            .with_status(200)
            .with_header("content-type", "text/html")
            .with_body("<html><table></table></html>")
            .create_async()
            .await;

        let client = client_for(&server);
        let body = client.fetch_commodities_page().await.expect("fetch should succeed");

        assert_eq!(body, "<html><table></table></html>");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_fetch_non_success_status_is_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/commodities")
            .with_status(503)
            .with_body("Service Unavailable")
            .create_async()
            .await;

        let client = client_for(&server);
        let err = client.fetch_commodities_page().await.unwrap_err();

        match err {
            FetchError::HttpStatus { status, body } => {
                assert_eq!(status, 503);
                assert_eq!(body, "Service Unavailable");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_fetch_unreachable_host_is_request_error() {
        let client = TradingEconomicsClient::with_source_url(
            "http://127.0.0.1:1/commodities".to_string(),
            Duration::from_secs(2),
        )
        .expect("client should build");

        let err = client.fetch_commodities_page().await.unwrap_err();
        assert!(matches!(err, FetchError::Request(_)));
    }
}
