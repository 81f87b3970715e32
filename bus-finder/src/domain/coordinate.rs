//! Geographic coordinates.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Error returned when a coordinate is outside WGS84 bounds.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("coordinate out of bounds: ({latitude}, {longitude})")]
pub struct InvalidCoordinate {
    pub latitude: f64,
    pub longitude: f64,
}

/// A latitude/longitude pair in decimal degrees (WGS84).
///
/// This is a plain value. Use [`Coordinate::validated`] when the numbers
/// come from an untrusted source such as a geolocation provider.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    /// Marina Bay Sands, Singapore. The location of last resort.
    pub const MARINA_BAY_SANDS: Coordinate = Coordinate::new(1.2834, 103.8607);

    /// Create a coordinate without bounds checking.
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Create a coordinate, rejecting non-finite or out-of-range values.
    ///
    /// Latitude must lie in `[-90, 90]` and longitude in `[-180, 180]`.
    pub fn validated(latitude: f64, longitude: f64) -> Result<Self, InvalidCoordinate> {
        let coord = Self::new(latitude, longitude);
        if coord.is_valid() {
            Ok(coord)
        } else {
            Err(InvalidCoordinate {
                latitude,
                longitude,
            })
        }
    }

    /// Whether both components are finite and within WGS84 bounds.
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.4}, {:.4})", self.latitude, self.longitude)
    }
}
