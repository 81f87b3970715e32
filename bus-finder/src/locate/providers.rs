//! Geolocation providers.
//!
//! Each provider makes exactly one request per attempt. None of them
//! retries; the resolver moves on to the next provider instead.

use std::time::Duration;

use futures::future::BoxFuture;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::domain::Coordinate;

use super::error::LocateError;

/// Default ip-api.com endpoint.
pub const IP_API_URL: &str = "http://ip-api.com/json/";

/// Default ipinfo.io endpoint.
pub const IPINFO_URL: &str = "https://ipinfo.io/json";

/// Default ipwho.is endpoint.
pub const IPWHOIS_URL: &str = "https://ipwho.is/";

/// Default Google Geolocation API endpoint.
pub const GOOGLE_GEOLOCATE_URL: &str = "https://www.googleapis.com/geolocation/v1/geolocate";

/// A single way of finding out where we are.
pub trait LocationStrategy: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &str;

    /// Make one attempt at a coordinate.
    fn attempt(&self) -> BoxFuture<'_, Result<Coordinate, LocateError>>;
}

/// Configuration for geolocation providers.
#[derive(Debug, Clone)]
pub struct LocateConfig {
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
    /// Key for the Google Geolocation API; the Google provider is skipped without it
    pub google_api_key: Option<String>,
}

impl LocateConfig {
    /// Create a config with the default 5 second timeout.
    pub fn new() -> Self {
        Self {
            timeout_secs: 5,
            google_api_key: None,
        }
    }

    /// Set the per-request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// Set the Google Geolocation API key.
    pub fn with_google_api_key(mut self, key: impl Into<String>) -> Self {
        self.google_api_key = Some(key.into());
        self
    }

    /// The per-request timeout as a Duration.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Build an HTTP client honouring the timeout.
    pub fn http_client(&self) -> Result<reqwest::Client, LocateError> {
        let http = reqwest::Client::builder()
            .timeout(self.timeout())
            .user_agent(concat!("bus-finder/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(http)
    }
}

impl Default for LocateConfig {
    fn default() -> Self {
        Self::new()
    }
}

async fn read_json<T: DeserializeOwned>(request: reqwest::RequestBuilder) -> Result<T, LocateError> {
    let response = request.send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(LocateError::Status(status.as_u16()));
    }

    let body = response.text().await?;
    serde_json::from_str(&body).map_err(|e| LocateError::Malformed(e.to_string()))
}

// ---------------------------------------------------------------------------
// ip-api.com

#[derive(Debug, Deserialize)]
struct IpApiResponse {
    status: String,
    message: Option<String>,
    lat: Option<f64>,
    lon: Option<f64>,
    city: Option<String>,
    country: Option<String>,
}

/// City-level lookup via ip-api.com. Used as the IP step of the chain.
#[derive(Debug, Clone)]
pub struct IpApiProvider {
    http: reqwest::Client,
    url: String,
}

impl IpApiProvider {
    pub fn new(http: reqwest::Client) -> Self {
        Self::with_url(http, IP_API_URL)
    }

    pub fn with_url(http: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            http,
            url: url.into(),
        }
    }

    async fn locate(&self) -> Result<Coordinate, LocateError> {
        let resp: IpApiResponse = read_json(self.http.get(&self.url)).await?;

        if resp.status != "success" {
            return Err(LocateError::Malformed(
                resp.message.unwrap_or_else(|| format!("status {}", resp.status)),
            ));
        }

        let (Some(lat), Some(lon)) = (resp.lat, resp.lon) else {
            return Err(LocateError::Malformed("missing lat/lon".to_string()));
        };

        debug!(
            city = resp.city.as_deref().unwrap_or("Unknown"),
            country = resp.country.as_deref().unwrap_or("Unknown"),
            "ip-api located"
        );
        Ok(Coordinate::new(lat, lon))
    }
}

impl LocationStrategy for IpApiProvider {
    fn name(&self) -> &str {
        "ip-api"
    }

    fn attempt(&self) -> BoxFuture<'_, Result<Coordinate, LocateError>> {
        Box::pin(self.locate())
    }
}

// ---------------------------------------------------------------------------
// ipinfo.io

#[derive(Debug, Deserialize)]
struct IpInfoResponse {
    /// `"lat,lon"`
    loc: Option<String>,
    city: Option<String>,
}

/// Lookup via ipinfo.io.
#[derive(Debug, Clone)]
pub struct IpInfoProvider {
    http: reqwest::Client,
    url: String,
}

impl IpInfoProvider {
    pub fn new(http: reqwest::Client) -> Self {
        Self::with_url(http, IPINFO_URL)
    }

    pub fn with_url(http: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            http,
            url: url.into(),
        }
    }

    async fn locate(&self) -> Result<Coordinate, LocateError> {
        let resp: IpInfoResponse = read_json(self.http.get(&self.url)).await?;
        let loc = resp
            .loc
            .ok_or_else(|| LocateError::Malformed("missing loc".to_string()))?;
        let coord = parse_lat_lon(&loc)?;

        debug!(city = resp.city.as_deref().unwrap_or("Unknown"), "ipinfo located");
        Ok(coord)
    }
}

impl LocationStrategy for IpInfoProvider {
    fn name(&self) -> &str {
        "ipinfo"
    }

    fn attempt(&self) -> BoxFuture<'_, Result<Coordinate, LocateError>> {
        Box::pin(self.locate())
    }
}

/// Parse a `"lat,lon"` pair.
fn parse_lat_lon(s: &str) -> Result<Coordinate, LocateError> {
    let malformed = || LocateError::Malformed(format!("bad loc {s:?}"));

    let (lat, lon) = s.split_once(',').ok_or_else(malformed)?;
    let lat: f64 = lat.trim().parse().map_err(|_| malformed())?;
    let lon: f64 = lon.trim().parse().map_err(|_| malformed())?;
    Ok(Coordinate::new(lat, lon))
}

// ---------------------------------------------------------------------------
// ipwho.is

#[derive(Debug, Deserialize)]
struct IpWhoIsResponse {
    success: bool,
    message: Option<String>,
    latitude: Option<f64>,
    longitude: Option<f64>,
    city: Option<String>,
}

/// Lookup via ipwho.is.
#[derive(Debug, Clone)]
pub struct IpWhoIsProvider {
    http: reqwest::Client,
    url: String,
}

impl IpWhoIsProvider {
    pub fn new(http: reqwest::Client) -> Self {
        Self::with_url(http, IPWHOIS_URL)
    }

    pub fn with_url(http: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            http,
            url: url.into(),
        }
    }

    async fn locate(&self) -> Result<Coordinate, LocateError> {
        let resp: IpWhoIsResponse = read_json(self.http.get(&self.url)).await?;

        if !resp.success {
            return Err(LocateError::Malformed(
                resp.message.unwrap_or_else(|| "lookup unsuccessful".to_string()),
            ));
        }

        let (Some(lat), Some(lon)) = (resp.latitude, resp.longitude) else {
            return Err(LocateError::Malformed("missing latitude/longitude".to_string()));
        };

        debug!(city = resp.city.as_deref().unwrap_or("Unknown"), "ipwho.is located");
        Ok(Coordinate::new(lat, lon))
    }
}

impl LocationStrategy for IpWhoIsProvider {
    fn name(&self) -> &str {
        "ipwho.is"
    }

    fn attempt(&self) -> BoxFuture<'_, Result<Coordinate, LocateError>> {
        Box::pin(self.locate())
    }
}

// ---------------------------------------------------------------------------
// Google Geolocation API

#[derive(Debug, Deserialize)]
struct GoogleLocation {
    lat: f64,
    lng: f64,
}

#[derive(Debug, Deserialize)]
struct GoogleGeolocateResponse {
    location: GoogleLocation,
    accuracy: Option<f64>,
}

/// WiFi/cell triangulation via the Google Geolocation API.
///
/// Without network scan data the API falls back to the caller's IP, but
/// it is still usually more precise than city-level IP lookups.
#[derive(Debug, Clone)]
pub struct GoogleGeolocateProvider {
    http: reqwest::Client,
    url: String,
    api_key: Option<String>,
}

impl GoogleGeolocateProvider {
    pub fn new(http: reqwest::Client, api_key: Option<String>) -> Self {
        Self::with_url(http, GOOGLE_GEOLOCATE_URL, api_key)
    }

    pub fn with_url(http: reqwest::Client, url: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            http,
            url: url.into(),
            api_key,
        }
    }

    async fn locate(&self) -> Result<Coordinate, LocateError> {
        let key = self
            .api_key
            .as_deref()
            .ok_or(LocateError::NotConfigured("GOOGLE_GEOLOCATION_API_KEY"))?;

        let request = self
            .http
            .post(&self.url)
            .query(&[("key", key)])
            .json(&serde_json::json!({ "considerIp": true }));
        let resp: GoogleGeolocateResponse = read_json(request).await?;

        debug!(accuracy_m = resp.accuracy, "google located");
        Ok(Coordinate::new(resp.location.lat, resp.location.lng))
    }
}

impl LocationStrategy for GoogleGeolocateProvider {
    fn name(&self) -> &str {
        "google"
    }

    fn attempt(&self) -> BoxFuture<'_, Result<Coordinate, LocateError>> {
        Box::pin(self.locate())
    }
}
