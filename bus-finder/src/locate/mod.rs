//! Finding out where the user is.
//!
//! Providers are wrapped as [`LocationStrategy`] trait objects and tried in
//! order by the [`LocationResolver`], which falls back to Marina Bay Sands
//! when nothing answers.

mod error;
mod providers;
mod resolver;

pub use error::LocateError;
pub use providers::{
    GOOGLE_GEOLOCATE_URL, GoogleGeolocateProvider, IP_API_URL, IPINFO_URL, IPWHOIS_URL,
    IpApiProvider, IpInfoProvider, IpWhoIsProvider, LocateConfig, LocationStrategy,
};
pub use resolver::{LocateMode, LocationResolver, LocationSource, Resolved};
