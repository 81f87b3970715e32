//! Code and text lookups over a directory snapshot.

use crate::domain::{BusStop, DirectorySnapshot, StopCode};

/// Find a stop by its code.
pub fn find_by_code<'a>(snapshot: &'a DirectorySnapshot, code: &StopCode) -> Option<&'a BusStop> {
    snapshot.stops().iter().find(|stop| &stop.code == code)
}

/// Find stops whose road name contains `query`, ignoring case.
///
/// The query is matched as given, whitespace included. Matches keep
/// directory order. An empty query matches everything.
pub fn find_by_road<'a>(snapshot: &'a DirectorySnapshot, query: &str) -> Vec<&'a BusStop> {
    let needle = query.to_lowercase();
    snapshot
        .stops()
        .iter()
        .filter(|stop| stop.road_name.to_lowercase().contains(&needle))
        .collect()
}
