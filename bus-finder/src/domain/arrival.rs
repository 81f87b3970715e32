//! Real-time arrival data for a bus stop.

use std::fmt;

use chrono::{DateTime, Utc};

/// Time until an upcoming bus arrives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Eta {
    /// Whole minutes until arrival, rounded up. Always at least 1.
    Minutes(u32),
    /// Due now, already past, or the timestamp could not be read.
    Arriving,
    /// No bus is scheduled in this slot.
    NoData,
}

impl Eta {
    /// Compute the ETA for a bus arriving at `arrival`, as seen at `now`.
    ///
    /// Minutes are `ceil((arrival - now) / 60s)`; anything not strictly in
    /// the future is [`Eta::Arriving`].
    pub fn until(arrival: DateTime<Utc>, now: DateTime<Utc>) -> Self {
        let millis = arrival.signed_duration_since(now).num_milliseconds();
        if millis <= 0 {
            return Eta::Arriving;
        }
        let minutes = u64::try_from(millis).map_or(u64::MAX, |m| m.div_ceil(60_000));
        Eta::Minutes(u32::try_from(minutes).unwrap_or(u32::MAX))
    }
}

impl fmt::Display for Eta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Eta::Minutes(m) => write!(f, "{m} min"),
            Eta::Arriving => f.write_str("Arriving"),
            Eta::NoData => f.write_str("N/A"),
        }
    }
}

/// How crowded an arriving bus is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadLevel {
    SeatsAvailable,
    StandingAvailable,
    LimitedStanding,
    Unknown,
}

impl LoadLevel {
    /// Map the DataMall load code. Unrecognised codes are `Unknown`.
    pub fn from_code(code: &str) -> Self {
        match code.trim() {
            "SEA" => LoadLevel::SeatsAvailable,
            "SDA" => LoadLevel::StandingAvailable,
            "LSD" => LoadLevel::LimitedStanding,
            _ => LoadLevel::Unknown,
        }
    }

    /// Short label for tables.
    pub fn label(&self) -> &'static str {
        match self {
            LoadLevel::SeatsAvailable => "Seats",
            LoadLevel::StandingAvailable => "Standing",
            LoadLevel::LimitedStanding => "Limited",
            LoadLevel::Unknown => "N/A",
        }
    }
}

impl fmt::Display for LoadLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Kind of vehicle operating the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VehicleType {
    SingleDeck,
    DoubleDeck,
    Bendy,
}

impl VehicleType {
    /// Map the DataMall vehicle code (`SD`, `DD`, `BD`).
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim() {
            "SD" => Some(VehicleType::SingleDeck),
            "DD" => Some(VehicleType::DoubleDeck),
            "BD" => Some(VehicleType::Bendy),
            _ => None,
        }
    }

    /// Short label for tables.
    pub fn label(&self) -> &'static str {
        match self {
            VehicleType::SingleDeck => "Single",
            VehicleType::DoubleDeck => "Double",
            VehicleType::Bendy => "Bendy",
        }
    }
}

/// One upcoming bus for a service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpcomingBus {
    pub eta: Eta,
    pub load: LoadLevel,
    pub vehicle: Option<VehicleType>,
    pub wheelchair_accessible: bool,
}

impl UpcomingBus {
    /// A slot with no bus scheduled.
    pub fn absent() -> Self {
        Self {
            eta: Eta::NoData,
            load: LoadLevel::Unknown,
            vehicle: None,
            wheelchair_accessible: false,
        }
    }

    pub fn is_absent(&self) -> bool {
        self.eta == Eta::NoData
    }
}

/// Arrival information for one bus service at a stop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArrivalRecord {
    pub service_number: String,
    pub operator: Option<String>,
    pub next: UpcomingBus,
    pub second: UpcomingBus,
    pub third: UpcomingBus,
}

impl ArrivalRecord {
    /// The three upcoming-bus slots in arrival order.
    pub fn buses(&self) -> [&UpcomingBus; 3] {
        [&self.next, &self.second, &self.third]
    }
}
