//! Bus-stop repository: cache-or-fetch access to the full directory.

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::domain::{BusStop, DirectorySnapshot};

use super::cache::SnapshotCache;
use super::error::DirectoryError;
use super::source::DirectorySource;

/// Records per listing page; `$skip` advances by this much.
pub const PAGE_SIZE: usize = 500;

/// Upper bound on pages fetched in one refresh.
///
/// At 500 records a page this allows for half a million stops; a listing
/// that is still returning data beyond that is treated as broken.
pub const DEFAULT_MAX_PAGES: usize = 1000;

/// Owns the directory cache and refreshes it from a [`DirectorySource`].
pub struct BusStopRepository<S> {
    source: S,
    cache: SnapshotCache,
    max_pages: usize,
}

impl<S: DirectorySource> BusStopRepository<S> {
    /// Create a repository over the given source and cache.
    pub fn new(source: S, cache: SnapshotCache) -> Self {
        Self {
            source,
            cache,
            max_pages: DEFAULT_MAX_PAGES,
        }
    }

    /// Set the page cap for a refresh.
    pub fn with_max_pages(mut self, max_pages: usize) -> Self {
        self.max_pages = max_pages;
        self
    }

    /// Get the full directory.
    ///
    /// Serves the cached snapshot when it is present, readable and younger
    /// than the TTL, unless `force_refresh` is set. Otherwise fetches every
    /// page and replaces the cache. A failed refresh leaves the cache file
    /// untouched and returns the error.
    pub async fn get_directory(
        &self,
        force_refresh: bool,
    ) -> Result<DirectorySnapshot, DirectoryError> {
        if force_refresh {
            info!("Refresh forced, ignoring cache");
        } else {
            let now = Utc::now();
            match self.cache.load() {
                Ok(Some(snapshot)) if snapshot.is_fresh(self.cache.ttl(), now) => {
                    info!(
                        stops = snapshot.len(),
                        cached_at = %snapshot.fetched_at().format("%Y-%m-%d %H:%M:%S"),
                        "Using cached bus stops"
                    );
                    return Ok(snapshot);
                }
                Ok(Some(_)) => info!("Cache expired, will fetch fresh data"),
                Ok(None) => info!(path = %self.cache.path().display(), "No cache found"),
                Err(e) => warn!(error = %e, "Error reading cache, will fetch fresh data"),
            }
        }

        self.refresh().await
    }

    /// Fetch the whole directory and replace the cache.
    pub async fn refresh(&self) -> Result<DirectorySnapshot, DirectoryError> {
        let stops = self.fetch_all().await?;
        let snapshot = DirectorySnapshot::new(stops, Utc::now());

        self.cache.save(&snapshot)?;
        info!(
            stops = snapshot.len(),
            path = %self.cache.path().display(),
            "Saved bus stops to cache"
        );

        Ok(snapshot)
    }

    /// Read whatever snapshot is on disk, fresh or not, without network access.
    pub fn cached(&self) -> Option<DirectorySnapshot> {
        match self.cache.load() {
            Ok(snapshot) => snapshot,
            Err(e) => {
                debug!(error = %e, "Cached directory unavailable");
                None
            }
        }
    }

    /// Get the underlying cache.
    pub fn cache(&self) -> &SnapshotCache {
        &self.cache
    }

    /// Page through the listing until an empty page.
    async fn fetch_all(&self) -> Result<Vec<BusStop>, DirectoryError> {
        info!("Fetching bus stops from DataMall...");
        let mut stops = Vec::new();

        for page in 0..self.max_pages {
            let skip = page * PAGE_SIZE;
            let batch = self
                .source
                .fetch_page(skip)
                .await
                .map_err(|source| DirectoryError::Fetch { skip, source })?;

            if batch.is_empty() {
                info!(total = stops.len(), pages = page, "Fetched all bus stops");
                return Ok(stops);
            }

            stops.extend(batch);
            debug!(fetched = stops.len(), skip, "Fetched bus stops so far");
        }

        Err(DirectoryError::TooManyPages {
            pages: self.max_pages,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datamall::DataMallError;
    use crate::directory::CacheConfig;
    use crate::domain::StopCode;
    use chrono::TimeDelta;
    use std::path::Path;
    use std::sync::Mutex;
    use tempfile::tempdir;

    fn stop(code: &str, road: &str) -> BusStop {
        BusStop {
            code: StopCode::parse(code).unwrap(),
            road_name: road.to_string(),
            description: format!("Near {code}"),
            latitude: 1.3,
            longitude: 103.8,
        }
    }

    /// Mock listing that serves fixed pages keyed by `skip / PAGE_SIZE`.
    struct MockSource {
        pages: Vec<Vec<BusStop>>,
        fail_at: Option<usize>,
        endless: bool,
        skips: Mutex<Vec<usize>>,
    }

    impl MockSource {
        fn new(pages: Vec<Vec<BusStop>>) -> Self {
            Self {
                pages,
                fail_at: None,
                endless: false,
                skips: Mutex::new(Vec::new()),
            }
        }

        fn failing_at(mut self, skip: usize) -> Self {
            self.fail_at = Some(skip);
            self
        }

        fn endless() -> Self {
            let mut source = Self::new(Vec::new());
            source.endless = true;
            source
        }

        fn call_count(&self) -> usize {
            self.skips.lock().unwrap().len()
        }

        fn skips(&self) -> Vec<usize> {
            self.skips.lock().unwrap().clone()
        }
    }

    impl DirectorySource for MockSource {
        async fn fetch_page(&self, skip: usize) -> Result<Vec<BusStop>, DataMallError> {
            self.skips.lock().unwrap().push(skip);

            if self.fail_at == Some(skip) {
                return Err(DataMallError::Api {
                    status: 503,
                    message: "Service Unavailable".into(),
                });
            }

            if self.endless {
                return Ok(vec![stop("99999", "Forever Rd")]);
            }

            Ok(self.pages.get(skip / PAGE_SIZE).cloned().unwrap_or_default())
        }
    }

    fn two_pages() -> Vec<Vec<BusStop>> {
        vec![
            vec![stop("01012", "Victoria St"), stop("01013", "Victoria St")],
            vec![stop("01019", "Victoria St")],
        ]
    }

    fn repo(source: MockSource, path: &Path) -> BusStopRepository<MockSource> {
        BusStopRepository::new(source, SnapshotCache::new(CacheConfig::new(path)))
    }

    fn write_cache(path: &Path, stops: Vec<BusStop>, age: TimeDelta) {
        let cache = SnapshotCache::new(CacheConfig::new(path));
        cache
            .save(&DirectorySnapshot::new(stops, Utc::now() - age))
            .unwrap();
    }

    #[tokio::test]
    async fn fetches_until_empty_page() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("stops.json");
        let repo = repo(MockSource::new(two_pages()), &path);

        let snapshot = repo.get_directory(false).await.unwrap();

        assert_eq!(snapshot.len(), 3);
        assert_eq!(repo.source.skips(), vec![0, 500, 1000]);
        assert!(path.exists());
    }

    #[tokio::test]
    async fn empty_directory_is_one_request() {
        let dir = tempdir().unwrap();
        let repo = repo(MockSource::new(Vec::new()), &dir.path().join("stops.json"));

        let snapshot = repo.get_directory(false).await.unwrap();

        assert!(snapshot.is_empty());
        assert_eq!(repo.source.skips(), vec![0]);
    }

    #[tokio::test]
    async fn pages_union_has_unique_codes() {
        let dir = tempdir().unwrap();
        let repo = repo(MockSource::new(two_pages()), &dir.path().join("stops.json"));

        let snapshot = repo.get_directory(false).await.unwrap();

        let mut codes: Vec<_> = snapshot.stops().iter().map(|s| s.code).collect();
        codes.sort();
        codes.dedup();
        assert_eq!(codes.len(), snapshot.len());
    }

    #[tokio::test]
    async fn duplicate_across_pages_last_write_wins() {
        let dir = tempdir().unwrap();
        let pages = vec![
            vec![stop("01012", "Old Rd"), stop("01013", "Victoria St")],
            vec![stop("01012", "New Rd")],
        ];
        let repo = repo(MockSource::new(pages), &dir.path().join("stops.json"));

        let snapshot = repo.get_directory(false).await.unwrap();

        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot.stops()[0].road_name, "New Rd");
    }

    #[tokio::test]
    async fn fresh_cache_makes_no_requests() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("stops.json");
        write_cache(&path, vec![stop("55555", "Cached Rd")], TimeDelta::hours(1));

        let repo = repo(MockSource::new(two_pages()), &path);
        let snapshot = repo.get_directory(false).await.unwrap();

        assert_eq!(repo.source.call_count(), 0);
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot.stops()[0].road_name, "Cached Rd");
    }

    #[tokio::test]
    async fn cache_just_under_ttl_is_fresh() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("stops.json");
        write_cache(
            &path,
            vec![stop("55555", "Cached Rd")],
            TimeDelta::hours(23) + TimeDelta::minutes(59) + TimeDelta::seconds(59),
        );

        let repo = repo(MockSource::new(two_pages()), &path);
        repo.get_directory(false).await.unwrap();

        assert_eq!(repo.source.call_count(), 0);
    }

    #[tokio::test]
    async fn cache_just_over_ttl_is_stale() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("stops.json");
        write_cache(
            &path,
            vec![stop("55555", "Cached Rd")],
            TimeDelta::hours(24) + TimeDelta::seconds(1),
        );

        let repo = repo(MockSource::new(two_pages()), &path);
        let snapshot = repo.get_directory(false).await.unwrap();

        assert_eq!(repo.source.call_count(), 3);
        assert_eq!(snapshot.len(), 3);
    }

    #[tokio::test]
    async fn force_refresh_bypasses_fresh_cache() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("stops.json");
        write_cache(&path, vec![stop("55555", "Cached Rd")], TimeDelta::minutes(1));

        let repo = repo(MockSource::new(two_pages()), &path);
        let snapshot = repo.get_directory(true).await.unwrap();

        assert!(repo.source.call_count() >= 1);
        assert_eq!(snapshot.len(), 3);

        // The refreshed snapshot replaced the old one on disk
        let on_disk = repo.cached().unwrap();
        assert_eq!(on_disk.len(), 3);
    }

    #[tokio::test]
    async fn corrupt_cache_triggers_refetch() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("stops.json");
        std::fs::write(&path, "garbage").unwrap();

        let repo = repo(MockSource::new(two_pages()), &path);
        let snapshot = repo.get_directory(false).await.unwrap();

        assert_eq!(snapshot.len(), 3);
        assert!(repo.cached().is_some());
    }

    #[tokio::test]
    async fn failed_page_aborts_without_writing() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("stops.json");
        let repo = repo(MockSource::new(two_pages()).failing_at(500), &path);

        let err = repo.get_directory(false).await.unwrap_err();

        assert!(matches!(err, DirectoryError::Fetch { skip: 500, .. }));
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn failed_refresh_preserves_previous_cache() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("stops.json");
        write_cache(&path, vec![stop("55555", "Known Good Rd")], TimeDelta::hours(30));
        let before = std::fs::read_to_string(&path).unwrap();

        let repo = repo(MockSource::new(two_pages()).failing_at(500), &path);
        assert!(repo.get_directory(false).await.is_err());

        let after = std::fs::read_to_string(&path).unwrap();
        assert_eq!(before, after);
    }

    #[tokio::test]
    async fn endless_listing_hits_page_cap() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("stops.json");
        let repo = repo(MockSource::endless(), &path).with_max_pages(3);

        let err = repo.get_directory(false).await.unwrap_err();

        assert!(matches!(err, DirectoryError::TooManyPages { pages: 3 }));
        assert_eq!(repo.source.skips(), vec![0, 500, 1000]);
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn cached_reads_stale_snapshot_without_network() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("stops.json");
        write_cache(&path, vec![stop("55555", "Old Rd")], TimeDelta::days(10));

        let repo = repo(MockSource::new(two_pages()), &path);
        let snapshot = repo.cached().unwrap();

        assert_eq!(snapshot.len(), 1);
        assert_eq!(repo.source.call_count(), 0);
    }
}
