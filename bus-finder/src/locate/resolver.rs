//! Location fallback chain.
//!
//! GPS-style providers (if requested), then one IP lookup, then a fixed
//! default. The resolver always produces a coordinate.

use std::fmt;
use std::time::Duration;

use tracing::{info, warn};

use crate::domain::Coordinate;

use super::error::LocateError;
use super::providers::{
    GoogleGeolocateProvider, IpApiProvider, IpInfoProvider, IpWhoIsProvider, LocateConfig,
    LocationStrategy,
};

/// How hard to try to find the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocateMode {
    /// Try the triangulation providers before the IP lookup.
    Gps,
    /// Go straight to the IP lookup.
    Ip,
}

/// Where a resolved coordinate came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocationSource {
    Gps(String),
    Ip(String),
    Default,
}

impl fmt::Display for LocationSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LocationSource::Gps(name) => write!(f, "GPS via {name}"),
            LocationSource::Ip(name) => write!(f, "IP via {name}"),
            LocationSource::Default => f.write_str("default location"),
        }
    }
}

/// A coordinate and its provenance.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolved {
    pub coordinate: Coordinate,
    pub source: LocationSource,
}

impl Resolved {
    /// Marina Bay Sands, used when nothing else works.
    pub fn default_location() -> Self {
        Self {
            coordinate: Coordinate::MARINA_BAY_SANDS,
            source: LocationSource::Default,
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Tier {
    Gps,
    Ip,
}

/// Ordered fallback chain of location strategies.
pub struct LocationResolver {
    gps: Vec<Box<dyn LocationStrategy>>,
    ip: Box<dyn LocationStrategy>,
    attempt_timeout: Duration,
}

impl LocationResolver {
    /// Create a resolver from explicit strategies.
    ///
    /// `gps` is tried in order when [`LocateMode::Gps`] is requested;
    /// `ip` is the single IP lookup.
    pub fn new(gps: Vec<Box<dyn LocationStrategy>>, ip: Box<dyn LocationStrategy>) -> Self {
        Self {
            gps,
            ip,
            attempt_timeout: LocateConfig::default().timeout(),
        }
    }

    /// Create a resolver with the standard providers.
    ///
    /// GPS chain: ipinfo, Google geolocation, ipwho.is. IP step: ip-api.
    pub fn from_config(config: &LocateConfig) -> Result<Self, LocateError> {
        let http = config.http_client()?;

        let gps: Vec<Box<dyn LocationStrategy>> = vec![
            Box::new(IpInfoProvider::new(http.clone())),
            Box::new(GoogleGeolocateProvider::new(
                http.clone(),
                config.google_api_key.clone(),
            )),
            Box::new(IpWhoIsProvider::new(http.clone())),
        ];
        let ip = Box::new(IpApiProvider::new(http));

        Ok(Self::new(gps, ip).with_attempt_timeout(config.timeout()))
    }

    /// Set the time allowed for each individual attempt.
    pub fn with_attempt_timeout(mut self, timeout: Duration) -> Self {
        self.attempt_timeout = timeout;
        self
    }

    /// Resolve a location. Never fails.
    pub async fn resolve(&self, mode: LocateMode) -> Resolved {
        for (tier, strategy) in self.chain(mode) {
            let name = strategy.name();
            info!(provider = name, "Trying location provider");

            match self.try_strategy(strategy).await {
                Ok(coordinate) => {
                    let source = match tier {
                        Tier::Gps => LocationSource::Gps(name.to_string()),
                        Tier::Ip => LocationSource::Ip(name.to_string()),
                    };
                    info!(%coordinate, %source, "Location detected");
                    return Resolved { coordinate, source };
                }
                Err(e) => warn!(provider = name, error = %e, "Location provider failed"),
            }
        }

        let resolved = Resolved::default_location();
        info!(coordinate = %resolved.coordinate, "Using default location: Marina Bay Sands");
        resolved
    }

    fn chain(&self, mode: LocateMode) -> Vec<(Tier, &dyn LocationStrategy)> {
        let gps = match mode {
            LocateMode::Gps => self.gps.as_slice(),
            LocateMode::Ip => &[],
        };

        gps.iter()
            .map(|s| (Tier::Gps, s.as_ref()))
            .chain(std::iter::once((Tier::Ip, self.ip.as_ref())))
            .collect()
    }

    async fn try_strategy(&self, strategy: &dyn LocationStrategy) -> Result<Coordinate, LocateError> {
        let raw = tokio::time::timeout(self.attempt_timeout, strategy.attempt())
            .await
            .map_err(|_| LocateError::Timeout(self.attempt_timeout))??;

        Ok(Coordinate::validated(raw.latitude, raw.longitude)?)
    }
}
