use thiserror::Error;

/// Errors raised while downloading the commodities page
#[derive(Debug, Error)]
pub enum FetchError {
    /// The HTTP client could not be constructed
    #[error("Client error: {0}")]
    Client(String),
    /// Network failure, DNS failure or timeout
    #[error("Request error: {0}")]
    Request(String),
    /// Non-2xx response
    #[error("HTTP error ({status}): {body}")]
    HttpStatus { status: u16, body: String },
    /// The response body could not be read
    #[error("Body error: {0}")]
    Body(String),
}
