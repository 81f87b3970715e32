//! Proximity search over the stop directory.
//!
//! Distances are great-circle (haversine) distances in meters on a sphere
//! of radius 6371 km.

use std::cmp::Ordering;

use crate::domain::{BusStop, Coordinate, DirectorySnapshot};

/// Earth mean radius in meters.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Default search radius in kilometers.
pub const DEFAULT_RADIUS_KM: f64 = 0.5;

/// A stop within the search radius.
#[derive(Debug, Clone, PartialEq)]
pub struct NearbyResult {
    pub stop: BusStop,
    /// Distance from the reference point in meters.
    pub distance_m: f64,
}

/// Haversine distance between two points, in meters.
pub fn haversine_m(a: Coordinate, b: Coordinate) -> f64 {
    let lat1 = a.latitude.to_radians();
    let lat2 = b.latitude.to_radians();
    let delta_lat = (b.latitude - a.latitude).to_radians();
    let delta_lon = (b.longitude - a.longitude).to_radians();

    let h = (delta_lat / 2.0).sin().powi(2)
        + lat1.cos() * lat2.cos() * (delta_lon / 2.0).sin().powi(2);
    // Rounding can push h a hair outside [0, 1] for antipodal points.
    let h = h.clamp(0.0, 1.0);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS_M * c
}

/// Find stops within `radius_km` of `reference`, nearest first.
///
/// Ties on distance are ordered by stop code. A negative or non-finite
/// radius matches nothing.
pub fn find_nearby(
    snapshot: &DirectorySnapshot,
    reference: Coordinate,
    radius_km: f64,
) -> Vec<NearbyResult> {
    if !radius_km.is_finite() || radius_km < 0.0 {
        return Vec::new();
    }
    let radius_m = radius_km * 1000.0;

    let mut nearby: Vec<NearbyResult> = snapshot
        .stops()
        .iter()
        .filter_map(|stop| {
            let distance_m = haversine_m(reference, stop.position());
            (distance_m <= radius_m).then(|| NearbyResult {
                stop: stop.clone(),
                distance_m,
            })
        })
        .collect();

    nearby.sort_by(|a, b| match a.distance_m.total_cmp(&b.distance_m) {
        Ordering::Equal => a.stop.code.cmp(&b.stop.code),
        other => other,
    });

    nearby
}


#[cfg(test)]
mod proptests {
    use super::*;
    use crate::domain::StopCode;
    use chrono::Utc;
    use proptest::prelude::*;

    prop_compose! {
        fn coordinate()(lat in -90.0f64..=90.0, lon in -180.0f64..=180.0) -> Coordinate {
            Coordinate::new(lat, lon)
        }
    }

    prop_compose! {
        /// Points scattered around Singapore.
        fn near_singapore()(lat in 1.20f64..1.45, lon in 103.6f64..104.0) -> Coordinate {
            Coordinate::new(lat, lon)
        }
    }

    fn snapshot_of(points: &[Coordinate]) -> DirectorySnapshot {
        let stops = points
            .iter()
            .enumerate()
            .map(|(i, p)| BusStop {
                code: StopCode::parse(&format!("{:05}", i)).unwrap(),
                road_name: "Test Rd".to_string(),
                description: String::new(),
                latitude: p.latitude,
                longitude: p.longitude,
            })
            .collect();
        DirectorySnapshot::new(stops, Utc::now())
    }

    proptest! {
        /// Distance is symmetric
        #[test]
        fn haversine_symmetric(a in coordinate(), b in coordinate()) {
            let ab = haversine_m(a, b);
            let ba = haversine_m(b, a);
            prop_assert!((ab - ba).abs() < 1e-6, "{} vs {}", ab, ba);
        }

        /// Distance to self is zero
        #[test]
        fn haversine_identity(a in coordinate()) {
            prop_assert_eq!(haversine_m(a, a), 0.0);
        }

        /// Distance is never negative nor more than half the circumference
        #[test]
        fn haversine_bounded(a in coordinate(), b in coordinate()) {
            let d = haversine_m(a, b);
            prop_assert!(d >= 0.0);
            prop_assert!(d <= std::f64::consts::PI * EARTH_RADIUS_M + 1e-6);
        }

        /// Every result lies within the radius, sorted ascending
        #[test]
        fn results_within_radius(
            points in prop::collection::vec(near_singapore(), 0..60),
            reference in near_singapore(),
            radius_km in 0.0f64..10.0,
        ) {
            let snapshot = snapshot_of(&points);
            let results = find_nearby(&snapshot, reference, radius_km);

            for r in &results {
                prop_assert!(haversine_m(reference, r.stop.position()) <= radius_km * 1000.0);
            }
            prop_assert!(results.windows(2).all(|w| w[0].distance_m <= w[1].distance_m));
        }

        /// A larger radius never loses a stop
        #[test]
        fn radius_monotonic(
            points in prop::collection::vec(near_singapore(), 0..60),
            reference in near_singapore(),
            small in 0.0f64..5.0,
            extra in 0.0f64..5.0,
        ) {
            let snapshot = snapshot_of(&points);
            let inner = find_nearby(&snapshot, reference, small);
            let outer = find_nearby(&snapshot, reference, small + extra);

            prop_assert!(outer.len() >= inner.len());
            for r in &inner {
                prop_assert!(outer.iter().any(|o| o.stop.code == r.stop.code));
            }
        }
    }
}
