//! Live arrival queries.
//!
//! Arrivals are never cached: every call goes to the network. Only
//! credential problems are reported as errors. Everything else (bad stop
//! code, unreachable API, garbled payload) comes back as an empty list,
//! since the API itself does not distinguish "no services" from "no such
//! stop".

use std::future::Future;

use tracing::{debug, warn};

use crate::datamall::{DataMallClient, DataMallError};
use crate::domain::{ArrivalRecord, StopCode};

/// Errors surfaced by arrival queries.
#[derive(Debug, thiserror::Error)]
pub enum ArrivalError {
    /// The account key is missing, malformed or rejected
    #[error("credential error: {0}")]
    Credential(#[source] DataMallError),
}

/// Something that can fetch live arrivals for a stop.
///
/// This abstraction allows the query policy to be tested without HTTP.
pub trait ArrivalSource {
    fn fetch_arrivals(
        &self,
        stop: &StopCode,
        service: Option<&str>,
    ) -> impl Future<Output = Result<Vec<ArrivalRecord>, DataMallError>> + Send;
}

impl ArrivalSource for DataMallClient {
    async fn fetch_arrivals(
        &self,
        stop: &StopCode,
        service: Option<&str>,
    ) -> Result<Vec<ArrivalRecord>, DataMallError> {
        DataMallClient::fetch_arrivals(self, stop, service).await
    }
}

/// Fetch live arrivals for `stop_code`, optionally restricted to one service.
pub async fn get_arrivals<S: ArrivalSource>(
    source: &S,
    stop_code: &str,
    service: Option<&str>,
) -> Result<Vec<ArrivalRecord>, ArrivalError> {
    let stop = match StopCode::parse(stop_code) {
        Ok(stop) => stop,
        Err(e) => {
            debug!(error = %e, "Invalid stop code, no arrivals");
            return Ok(Vec::new());
        }
    };

    match source.fetch_arrivals(&stop, service).await {
        Ok(records) => {
            debug!(stop = %stop, services = records.len(), "Arrivals fetched");
            Ok(records)
        }
        Err(e) if e.is_credential() => Err(ArrivalError::Credential(e)),
        Err(e) => {
            warn!(stop = %stop, error = %e, "Failed to fetch arrivals, using empty");
            Ok(Vec::new())
        }
    }
}
