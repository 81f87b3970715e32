//! Where directory pages come from.

use std::future::Future;

use crate::datamall::{DataMallClient, DataMallError};
use crate::domain::BusStop;

/// Trait for providing pages of the bus-stop listing.
///
/// This abstraction allows the repository to be tested with mock data.
pub trait DirectorySource {
    /// Fetch the page of stops starting at offset `skip`.
    ///
    /// An empty page means there is nothing at or beyond `skip`.
    fn fetch_page(
        &self,
        skip: usize,
    ) -> impl Future<Output = Result<Vec<BusStop>, DataMallError>> + Send;
}

impl DirectorySource for DataMallClient {
    async fn fetch_page(&self, skip: usize) -> Result<Vec<BusStop>, DataMallError> {
        self.fetch_stops_page(skip).await
    }
}
