//! Location lookup error types.

use std::time::Duration;

use crate::domain::InvalidCoordinate;

/// Why a single location provider failed.
///
/// These never escape the resolver; they are logged and the next
/// provider is tried.
#[derive(Debug, thiserror::Error)]
pub enum LocateError {
    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Provider returned an error status
    #[error("provider returned status {0}")]
    Status(u16),

    /// Provider did not answer in time
    #[error("timed out after {0:?}")]
    Timeout(Duration),

    /// Response was missing a usable coordinate
    #[error("malformed response: {0}")]
    Malformed(String),

    /// Coordinate outside WGS84 bounds
    #[error(transparent)]
    OutOfBounds(#[from] InvalidCoordinate),

    /// Provider needs configuration that was not supplied
    #[error("not configured: {0}")]
    NotConfigured(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        assert_eq!(
            LocateError::Status(429).to_string(),
            "provider returned status 429"
        );
        assert_eq!(
            LocateError::Timeout(Duration::from_secs(5)).to_string(),
            "timed out after 5s"
        );
        assert_eq!(
            LocateError::Malformed("no loc field".into()).to_string(),
            "malformed response: no loc field"
        );
        assert_eq!(
            LocateError::NotConfigured("GOOGLE_GEOLOCATION_API_KEY").to_string(),
            "not configured: GOOGLE_GEOLOCATION_API_KEY"
        );

        let err: LocateError = InvalidCoordinate {
            latitude: 95.0,
            longitude: 0.0,
        }
        .into();
        assert_eq!(err.to_string(), "coordinate out of bounds: (95, 0)");
    }
}
