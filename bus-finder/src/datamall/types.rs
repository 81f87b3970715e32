//! DataMall API response DTOs.
//!
//! These types map directly to the DataMall JSON responses. Absent buses
//! in the arrival feed are sent as objects full of empty strings, so the
//! nested fields are `Option` with `#[serde(default)]` throughout.

use serde::Deserialize;

/// Response from the `BusStops` listing endpoint (one page).
#[derive(Debug, Clone, Deserialize)]
pub struct BusStopsResponse {
    /// Up to 500 stops. Empty once `$skip` is past the end.
    #[serde(default)]
    pub value: Vec<BusStopDto>,
}

/// A single bus stop as listed by DataMall.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct BusStopDto {
    pub bus_stop_code: String,
    pub road_name: String,
    pub description: String,
    pub latitude: f64,
    pub longitude: f64,
}

/// Response from the `v3/BusArrival` endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct BusArrivalResponse {
    #[serde(default)]
    pub bus_stop_code: Option<String>,

    /// One entry per service calling at the stop. Empty for unknown stops.
    #[serde(default)]
    pub services: Vec<ServiceArrivalDto>,
}

/// Arrival data for one service.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceArrivalDto {
    #[serde(rename = "ServiceNo")]
    pub service_no: String,

    /// Operator code (SBST, SMRT, TTS, GAS).
    #[serde(rename = "Operator", default)]
    pub operator: Option<String>,

    #[serde(rename = "NextBus", default)]
    pub next_bus: Option<NextBusDto>,

    #[serde(rename = "NextBus2", default)]
    pub next_bus_2: Option<NextBusDto>,

    #[serde(rename = "NextBus3", default)]
    pub next_bus_3: Option<NextBusDto>,
}

/// One upcoming bus.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct NextBusDto {
    /// ISO 8601 with offset, e.g. `2024-08-01T14:16:13+08:00`.
    #[serde(default)]
    pub estimated_arrival: Option<String>,

    /// `SEA`, `SDA` or `LSD`.
    #[serde(default)]
    pub load: Option<String>,

    /// `WAB` when wheelchair accessible.
    #[serde(default)]
    pub feature: Option<String>,

    /// `SD`, `DD` or `BD`.
    #[serde(rename = "Type", default)]
    pub vehicle_type: Option<String>,
}
