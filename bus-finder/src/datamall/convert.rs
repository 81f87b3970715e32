//! Conversion from DataMall DTOs to domain types.
//!
//! Listing records must convert cleanly or the page is rejected. Arrival
//! records are converted leniently: a bad timestamp or load code degrades
//! that one field instead of dropping the service.

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::domain::{ArrivalRecord, BusStop, Eta, LoadLevel, StopCode, UpcomingBus, VehicleType};

use super::error::DataMallError;
use super::types::{BusArrivalResponse, BusStopDto, NextBusDto, ServiceArrivalDto};

/// Convert a listed stop, rejecting invalid codes or coordinates.
pub fn convert_stop(dto: BusStopDto) -> Result<BusStop, DataMallError> {
    let code = StopCode::parse(&dto.bus_stop_code).map_err(|e| DataMallError::InvalidRecord {
        message: e.to_string(),
    })?;

    if !dto.latitude.is_finite() || !dto.longitude.is_finite() {
        return Err(DataMallError::InvalidRecord {
            message: format!("stop {code} has non-finite coordinates"),
        });
    }

    Ok(BusStop {
        code,
        road_name: dto.road_name,
        description: dto.description,
        latitude: dto.latitude,
        longitude: dto.longitude,
    })
}

/// Convert a whole listing page.
pub fn convert_stops(dtos: Vec<BusStopDto>) -> Result<Vec<BusStop>, DataMallError> {
    dtos.into_iter().map(convert_stop).collect()
}

/// Convert an arrival response as seen at `now`.
pub fn convert_arrivals(response: &BusArrivalResponse, now: DateTime<Utc>) -> Vec<ArrivalRecord> {
    response
        .services
        .iter()
        .map(|svc| convert_service(svc, now))
        .collect()
}

fn convert_service(svc: &ServiceArrivalDto, now: DateTime<Utc>) -> ArrivalRecord {
    ArrivalRecord {
        service_number: svc.service_no.trim().to_string(),
        operator: non_empty(svc.operator.as_deref()).map(str::to_string),
        next: convert_bus(svc.next_bus.as_ref(), now),
        second: convert_bus(svc.next_bus_2.as_ref(), now),
        third: convert_bus(svc.next_bus_3.as_ref(), now),
    }
}

/// Convert one upcoming-bus slot. A missing slot is absent, never an error.
pub fn convert_bus(dto: Option<&NextBusDto>, now: DateTime<Utc>) -> UpcomingBus {
    let Some(dto) = dto else {
        return UpcomingBus::absent();
    };

    UpcomingBus {
        eta: parse_eta(dto.estimated_arrival.as_deref(), now),
        load: dto
            .load
            .as_deref()
            .map_or(LoadLevel::Unknown, LoadLevel::from_code),
        vehicle: dto.vehicle_type.as_deref().and_then(VehicleType::from_code),
        wheelchair_accessible: dto.feature.as_deref().map(str::trim) == Some("WAB"),
    }
}

/// Turn a raw `EstimatedArrival` into an ETA.
///
/// Missing or empty means no bus ([`Eta::NoData`]); an unreadable timestamp
/// is shown as [`Eta::Arriving`].
pub fn parse_eta(raw: Option<&str>, now: DateTime<Utc>) -> Eta {
    let Some(raw) = non_empty(raw) else {
        return Eta::NoData;
    };

    match DateTime::parse_from_rfc3339(raw) {
        Ok(arrival) => Eta::until(arrival.with_timezone(&Utc), now),
        Err(e) => {
            debug!(raw, error = %e, "Unreadable arrival timestamp");
            Eta::Arriving
        }
    }
}

fn non_empty(s: Option<&str>) -> Option<&str> {
    s.map(str::trim).filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, TimeDelta, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 8, 1, 6, 0, 0).unwrap()
    }

    fn sgt(dt: DateTime<Utc>) -> String {
        let offset = FixedOffset::east_opt(8 * 3600).unwrap();
        dt.with_timezone(&offset).to_rfc3339()
    }

    fn bus(arrival: &str, load: &str) -> NextBusDto {
        NextBusDto {
            estimated_arrival: Some(arrival.to_string()),
            load: Some(load.to_string()),
            feature: Some("WAB".to_string()),
            vehicle_type: Some("DD".to_string()),
        }
    }

    #[test]
    fn convert_stop_valid() {
        let stop = convert_stop(BusStopDto {
            bus_stop_code: "01012".into(),
            road_name: "Victoria St".into(),
            description: "Hotel Grand Pacific".into(),
            latitude: 1.2968,
            longitude: 103.8525,
        })
        .unwrap();

        assert_eq!(stop.code.as_str(), "01012");
        assert_eq!(stop.road_name, "Victoria St");
    }

    #[test]
    fn convert_stop_rejects_bad_code() {
        let err = convert_stop(BusStopDto {
            bus_stop_code: "1012".into(),
            road_name: "Victoria St".into(),
            description: "Hotel Grand Pacific".into(),
            latitude: 1.2968,
            longitude: 103.8525,
        })
        .unwrap_err();

        assert!(err.is_data_integrity());
    }

    #[test]
    fn ninety_seconds_ahead_is_two_minutes() {
        let raw = sgt(now() + TimeDelta::seconds(90));
        assert_eq!(parse_eta(Some(&raw), now()), Eta::Minutes(2));
    }

    #[test]
    fn past_timestamp_is_arriving() {
        let raw = sgt(now() - TimeDelta::seconds(30));
        assert_eq!(parse_eta(Some(&raw), now()), Eta::Arriving);
    }

    #[test]
    fn malformed_timestamp_is_arriving() {
        assert_eq!(parse_eta(Some("not a time"), now()), Eta::Arriving);
        assert_eq!(parse_eta(Some("2024-08-01 14:16"), now()), Eta::Arriving);
    }

    #[test]
    fn missing_timestamp_is_no_data() {
        assert_eq!(parse_eta(None, now()), Eta::NoData);
        assert_eq!(parse_eta(Some(""), now()), Eta::NoData);
        assert_eq!(parse_eta(Some("   "), now()), Eta::NoData);
    }

    #[test]
    fn convert_full_service() {
        let response = BusArrivalResponse {
            bus_stop_code: Some("83139".into()),
            services: vec![ServiceArrivalDto {
                service_no: "15".into(),
                operator: Some("GAS".into()),
                next_bus: Some(bus(&sgt(now() + TimeDelta::seconds(150)), "SEA")),
                next_bus_2: Some(bus(&sgt(now() + TimeDelta::seconds(600)), "SDA")),
                next_bus_3: Some(NextBusDto::default()),
            }],
        };

        let records = convert_arrivals(&response, now());
        assert_eq!(records.len(), 1);

        let rec = &records[0];
        assert_eq!(rec.service_number, "15");
        assert_eq!(rec.operator.as_deref(), Some("GAS"));
        assert_eq!(rec.next.eta, Eta::Minutes(3));
        assert_eq!(rec.next.load, LoadLevel::SeatsAvailable);
        assert_eq!(rec.next.vehicle, Some(VehicleType::DoubleDeck));
        assert!(rec.next.wheelchair_accessible);
        assert_eq!(rec.second.eta, Eta::Minutes(10));
        assert_eq!(rec.second.load, LoadLevel::StandingAvailable);
        assert!(rec.third.is_absent());
    }

    #[test]
    fn missing_slots_are_absent() {
        let response = BusArrivalResponse {
            bus_stop_code: None,
            services: vec![ServiceArrivalDto {
                service_no: "36".into(),
                operator: Some(String::new()),
                next_bus: None,
                next_bus_2: None,
                next_bus_3: None,
            }],
        };

        let records = convert_arrivals(&response, now());
        let rec = &records[0];
        assert_eq!(rec.operator, None);
        assert!(rec.buses().iter().all(|b| b.is_absent()));
    }

    #[test]
    fn unknown_load_code_keeps_record() {
        let response = BusArrivalResponse {
            bus_stop_code: None,
            services: vec![ServiceArrivalDto {
                service_no: "7".into(),
                operator: None,
                next_bus: Some(bus(&sgt(now() + TimeDelta::seconds(300)), "FULL")),
                next_bus_2: None,
                next_bus_3: None,
            }],
        };

        let records = convert_arrivals(&response, now());
        assert_eq!(records[0].next.load, LoadLevel::Unknown);
        assert_eq!(records[0].next.eta, Eta::Minutes(5));
    }
}
