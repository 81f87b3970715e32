//! LTA DataMall client.
//!
//! This module provides an HTTP client for Singapore's LTA DataMall API,
//! which publishes the national bus-stop directory and live bus arrivals.
//!
//! Key characteristics of DataMall:
//! - The `BusStops` listing is paginated with `$skip` in steps of 500 and
//!   signals the end with an empty `value` array
//! - Every request carries the `AccountKey` header
//! - Arrival slots with no bus are objects of empty strings, not nulls

mod client;
mod convert;
mod error;
mod types;

pub use client::{DEFAULT_BASE_URL, DataMallClient, DataMallConfig};
pub use convert::{convert_arrivals, convert_bus, convert_stop, convert_stops, parse_eta};
pub use error::DataMallError;
pub use types::{BusArrivalResponse, BusStopDto, BusStopsResponse, NextBusDto, ServiceArrivalDto};
