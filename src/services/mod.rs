//! Service layer: external API clients and the search pipeline.
//!
//! Each external collaborator (geocoding, spatial data, movie metadata,
//! device geolocation) has its own thin client; `cinema_search` composes them
//! into the pipeline consumed by the HTTP surface.

pub mod cinema_search;
pub mod geocoding;
pub mod location;
pub mod movies;
pub mod overpass;

pub use cinema_search::{CinemaSearchService, ServiceStatus};
pub use geocoding::{GeocodingClient, ResolvedLocation};
pub use location::{
    AccuracyPolicy, DeviceLocationProvider, GeolocationCapability, PermissionState,
};
pub use movies::MovieClient;
pub use overpass::{build_query, OverpassClient};
