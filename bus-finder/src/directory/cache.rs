//! Disk-based cache for the bus-stop directory.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

use crate::domain::{BusStop, DirectorySnapshot};

use super::error::DirectoryError;

/// Default cache TTL: 24 hours.
pub const DEFAULT_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Default cache location, relative to the working directory.
pub const DEFAULT_CACHE_PATH: &str = "data/bus_stops_cache.json";

/// On-disk form of a snapshot, as read back. `totalStops` is ignored.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CachedSnapshot {
    fetched_at: DateTime<Utc>,
    stops: Vec<BusStop>,
}

/// On-disk form of a snapshot, as written.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CachedSnapshotRef<'a> {
    fetched_at: DateTime<Utc>,
    total_stops: usize,
    stops: &'a [BusStop],
}

/// Configuration for the directory disk cache.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Path to the cache file.
    pub path: PathBuf,
    /// How long a snapshot remains valid.
    pub ttl: Duration,
}

impl CacheConfig {
    /// Create a new cache config with the given path and default TTL (24 hours).
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            ttl: DEFAULT_TTL,
        }
    }

    /// Set a custom TTL.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_PATH)
    }
}

/// Disk cache holding a single directory snapshot.
#[derive(Debug, Clone)]
pub struct SnapshotCache {
    config: CacheConfig,
}

impl SnapshotCache {
    /// Create a new snapshot cache with the given config.
    pub fn new(config: CacheConfig) -> Self {
        Self { config }
    }

    /// Read the stored snapshot, whatever its age.
    ///
    /// Returns `Ok(None)` if there is no cache file and
    /// [`DirectoryError::Integrity`] if it cannot be read or parsed.
    pub fn load(&self) -> Result<Option<DirectorySnapshot>, DirectoryError> {
        let contents = match std::fs::read_to_string(&self.config.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(DirectoryError::Integrity {
                    message: format!("failed to read {}: {}", self.config.path.display(), e),
                });
            }
        };

        let cached: CachedSnapshot =
            serde_json::from_str(&contents).map_err(|e| DirectoryError::Integrity {
                message: e.to_string(),
            })?;

        Ok(Some(DirectorySnapshot::new(cached.stops, cached.fetched_at)))
    }

    /// Replace the stored snapshot.
    ///
    /// Writes to a temporary file next to the cache and renames it into
    /// place, so readers see either the old or the new snapshot. Creates
    /// parent directories if they don't exist.
    pub fn save(&self, snapshot: &DirectorySnapshot) -> Result<(), DirectoryError> {
        let dir = match self.config.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        if !dir.exists() {
            std::fs::create_dir_all(dir).map_err(|e| DirectoryError::Cache {
                message: format!("failed to create cache directory: {}", e),
            })?;
        }

        let cached = CachedSnapshotRef {
            fetched_at: snapshot.fetched_at(),
            total_stops: snapshot.len(),
            stops: snapshot.stops(),
        };

        let json = serde_json::to_vec(&cached).map_err(|e| DirectoryError::Cache {
            message: format!("failed to serialize cache: {}", e),
        })?;

        let mut tmp = NamedTempFile::new_in(dir).map_err(|e| DirectoryError::Cache {
            message: format!("failed to create temporary cache file: {}", e),
        })?;

        tmp.write_all(&json)
            .and_then(|()| tmp.as_file().sync_all())
            .map_err(|e| DirectoryError::Cache {
                message: format!("failed to write cache file: {}", e),
            })?;

        tmp.persist(&self.config.path)
            .map_err(|e| DirectoryError::Cache {
                message: format!("failed to replace cache file: {}", e.error),
            })?;

        Ok(())
    }

    /// Get the cache file path.
    pub fn path(&self) -> &Path {
        &self.config.path
    }

    /// Get the cache TTL.
    pub fn ttl(&self) -> Duration {
        self.config.ttl
    }
}
