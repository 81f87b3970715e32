//! Domain types for the bus stop finder.
//!
//! This module contains the core value types shared by the directory,
//! geospatial search and arrival layers. Types that can be invalid
//! (stop codes, coordinates from providers) enforce their invariants at
//! construction time.

mod arrival;
mod coordinate;
mod stop;
mod stop_code;

pub use arrival::{ArrivalRecord, Eta, LoadLevel, UpcomingBus, VehicleType};
pub use coordinate::{Coordinate, InvalidCoordinate};
pub use stop::{BusStop, DirectorySnapshot};
pub use stop_code::{InvalidStopCode, StopCode};
