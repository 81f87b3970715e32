//! Bus stops and directory snapshots.

use std::collections::HashMap;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use super::{Coordinate, StopCode};

/// A physical bus stop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BusStop {
    pub code: StopCode,
    pub road_name: String,
    /// Landmark text, e.g. "Opp Orchard Towers".
    pub description: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl BusStop {
    /// The stop's position as a coordinate.
    pub fn position(&self) -> Coordinate {
        Coordinate::new(self.latitude, self.longitude)
    }
}

/// The full bus-stop directory as of one fetch.
///
/// Created by a complete paginated fetch and replaced wholesale on refresh.
/// Stop codes are unique within a snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct DirectorySnapshot {
    stops: Vec<BusStop>,
    fetched_at: DateTime<Utc>,
}

impl DirectorySnapshot {
    /// Build a snapshot from fetched stops.
    ///
    /// If two stops share a code, the later one replaces the earlier one
    /// in the earlier one's position.
    pub fn new(stops: Vec<BusStop>, fetched_at: DateTime<Utc>) -> Self {
        let mut index: HashMap<StopCode, usize> = HashMap::with_capacity(stops.len());
        let mut unique: Vec<BusStop> = Vec::with_capacity(stops.len());

        for stop in stops {
            match index.get(&stop.code) {
                Some(&pos) => unique[pos] = stop,
                None => {
                    index.insert(stop.code, unique.len());
                    unique.push(stop);
                }
            }
        }

        Self {
            stops: unique,
            fetched_at,
        }
    }

    /// Stops in directory order.
    pub fn stops(&self) -> &[BusStop] {
        &self.stops
    }

    /// When the underlying data was fetched.
    pub fn fetched_at(&self) -> DateTime<Utc> {
        self.fetched_at
    }

    pub fn len(&self) -> usize {
        self.stops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stops.is_empty()
    }

    /// Whether the snapshot is younger than `ttl` at time `now`.
    ///
    /// A snapshot exactly `ttl` old is stale. A `fetched_at` in the future
    /// (clock skew) counts as fresh.
    pub fn is_fresh(&self, ttl: Duration, now: DateTime<Utc>) -> bool {
        let ttl = TimeDelta::from_std(ttl).unwrap_or(TimeDelta::MAX);
        now.signed_duration_since(self.fetched_at) < ttl
    }
}
