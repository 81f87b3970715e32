//! Directory error types.

use crate::datamall::DataMallError;

/// Errors that can occur when loading or refreshing the stop directory.
#[derive(Debug, thiserror::Error)]
pub enum DirectoryError {
    /// A page request failed; the refresh was abandoned
    #[error("failed to fetch bus stops at offset {skip}: {source}")]
    Fetch {
        skip: usize,
        #[source]
        source: DataMallError,
    },

    /// The listing never returned an empty page
    #[error("bus stop listing did not end after {pages} pages")]
    TooManyPages { pages: usize },

    /// Cache file exists but cannot be read or parsed
    #[error("corrupt cache: {message}")]
    Integrity { message: String },

    /// Cache operation failed
    #[error("cache error: {message}")]
    Cache { message: String },
}

impl DirectoryError {
    /// Whether the refresh failed because the account key was rejected.
    pub fn is_credential(&self) -> bool {
        matches!(self, DirectoryError::Fetch { source, .. } if source.is_credential())
    }
}
