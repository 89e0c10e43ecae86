//! Error types for the pibble-status service

/// Failure of a single poll cycle against the status API.
///
/// Never escapes a poller: every variant is turned into the display
/// error message by the cycle that produced it.
#[derive(Debug, thiserror::Error)]
pub enum StatusFetchError {
    #[error("request to {url} failed: {message}")]
    Transport { url: String, message: String },

    #[error("status API returned HTTP {status}")]
    Status { status: u16 },

    #[error("malformed status response: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Errors that can occur in the pibble-status service
#[derive(Debug, thiserror::Error)]
pub enum PibbleError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Poller error: {0}")]
    Poller(String),

    #[error("Status fetch error: {0}")]
    Fetch(#[from] StatusFetchError),

    #[error("Dashboard error: {0}")]
    Dashboard(String),
}

/// Result type alias for pibble-status operations
pub type Result<T> = std::result::Result<T, PibbleError>;
