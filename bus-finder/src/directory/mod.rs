//! Bus-stop directory: paginated fetch, disk cache and lookups.
//!
//! The full Singapore directory (~5000 stops) is fetched page by page from
//! DataMall, stored as a single JSON snapshot on disk and reused for 24
//! hours.

mod cache;
mod error;
mod lookup;
mod repository;
mod source;

pub use cache::{CacheConfig, DEFAULT_CACHE_PATH, DEFAULT_TTL, SnapshotCache};
pub use error::DirectoryError;
pub use lookup::{find_by_code, find_by_road};
pub use repository::{BusStopRepository, DEFAULT_MAX_PAGES, PAGE_SIZE};
pub use source::DirectorySource;
