//! LTA DataMall HTTP client.
//!
//! Issues single requests against the bus-stop listing and bus-arrival
//! endpoints. Pagination and caching are the repository's business.

use chrono::Utc;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde::de::DeserializeOwned;

use crate::domain::{ArrivalRecord, BusStop, StopCode};

use super::convert::{convert_arrivals, convert_stops};
use super::error::DataMallError;
use super::types::{BusArrivalResponse, BusStopsResponse};

/// Default base URL for DataMall.
pub const DEFAULT_BASE_URL: &str = "https://datamall2.mytransport.sg/ltaodataservice";

/// Header carrying the account key. DataMall documents it as `AccountKey`;
/// header names are matched case-insensitively and sent lowercase.
const ACCOUNT_KEY_HEADER: HeaderName = HeaderName::from_static("accountkey");

/// Configuration for the DataMall client.
#[derive(Debug, Clone)]
pub struct DataMallConfig {
    /// Account key issued by LTA
    pub api_key: String,
    /// Base URL for the API (defaults to production DataMall)
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl DataMallConfig {
    /// Create a new config with the given account key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: 30,
        }
    }

    /// Set a custom base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

/// DataMall API client.
#[derive(Debug, Clone)]
pub struct DataMallClient {
    http: reqwest::Client,
    base_url: String,
}

impl DataMallClient {
    /// Create a new DataMall client.
    pub fn new(config: DataMallConfig) -> Result<Self, DataMallError> {
        let mut headers = HeaderMap::new();

        let mut account_key =
            HeaderValue::from_str(&config.api_key).map_err(|_| DataMallError::InvalidCredential)?;
        account_key.set_sensitive(true);
        headers.insert(ACCOUNT_KEY_HEADER, account_key);

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Fetch one page of the bus-stop listing starting at `skip`.
    ///
    /// An empty vector means `skip` is past the end of the directory.
    pub async fn fetch_stops_page(&self, skip: usize) -> Result<Vec<BusStop>, DataMallError> {
        let url = format!("{}/BusStops", self.base_url);
        let page: BusStopsResponse = self
            .get_json(&url, &[("$skip", skip.to_string())])
            .await?;
        convert_stops(page.value)
    }

    /// Fetch live arrivals at a stop, optionally for one service only.
    pub async fn fetch_arrivals(
        &self,
        stop: &StopCode,
        service: Option<&str>,
    ) -> Result<Vec<ArrivalRecord>, DataMallError> {
        let url = format!("{}/v3/BusArrival", self.base_url);

        let mut query = vec![("BusStopCode", stop.as_str().to_string())];
        if let Some(service) = service.map(str::trim).filter(|s| !s.is_empty()) {
            query.push(("ServiceNo", service.to_string()));
        }

        let response: BusArrivalResponse = self.get_json(&url, &query).await?;
        Ok(convert_arrivals(&response, Utc::now()))
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<T, DataMallError> {
        let response = self.http.get(url).query(query).send().await?;
        let status = response.status();

        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(DataMallError::Unauthorized);
        }

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(DataMallError::RateLimited);
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DataMallError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let body = response.text().await?;

        serde_json::from_str(&body).map_err(|e| DataMallError::Json {
            message: e.to_string(),
            body: Some(body.chars().take(500).collect()),
        })
    }
}
