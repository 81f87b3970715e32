//! DataMall client error types.

/// Errors that can occur when talking to the LTA DataMall API.
#[derive(Debug, thiserror::Error)]
pub enum DataMallError {
    /// HTTP request failed (network error, timeout, etc.)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The account key was rejected
    #[error("unauthorized: check LTA_API_KEY")]
    Unauthorized,

    /// The account key cannot be sent as a header value
    #[error("invalid account key format")]
    InvalidCredential,

    /// Rate limited by the API
    #[error("rate limited by DataMall")]
    RateLimited,

    /// API returned an error status
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    /// Failed to parse response JSON
    #[error("JSON parse error: {message}")]
    Json {
        message: String,
        body: Option<String>,
    },

    /// Response parsed but a record is unusable
    #[error("invalid record: {message}")]
    InvalidRecord { message: String },
}

impl DataMallError {
    /// Whether this error means the credential is missing or wrong.
    ///
    /// Such errors will not go away by retrying or falling back.
    pub fn is_credential(&self) -> bool {
        matches!(
            self,
            DataMallError::Unauthorized | DataMallError::InvalidCredential
        )
    }

    /// Whether the payload was reachable but malformed.
    pub fn is_data_integrity(&self) -> bool {
        matches!(
            self,
            DataMallError::Json { .. } | DataMallError::InvalidRecord { .. }
        )
    }
}
