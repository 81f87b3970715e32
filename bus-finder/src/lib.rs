//! Singapore bus stop finder.
//!
//! Answers "which bus stops are near me, and when is the next bus?" using
//! LTA DataMall. The stop directory is paged in once and kept on disk for a
//! day; arrivals are always fetched live.

pub mod arrivals;
pub mod config;
pub mod datamall;
pub mod directory;
pub mod domain;
pub mod locate;
pub mod nearby;
