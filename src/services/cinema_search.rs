//! Cinema search pipeline coordinator.
//!
//! One search runs through validation, location resolution (geocoding is
//! skipped when coordinates are given), the Overpass spatial query, and
//! normalization (distance cap, ascending sort, limit). Successful responses
//! are cached for ten minutes under the location parameter + radius; a cache
//! hit returns the stored response unmodified.

use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::Serialize;

use crate::cache::{CacheKey, TtlCache};
use crate::error::{AppError, AppResult};
use crate::models::osm::OverpassElement;
use crate::models::{
    Cinema, CinemaSearchParams, CinemaSearchResponse, Coordinates, SearchLocation, SearchNotice,
    CURRENT_LOCATION_LABEL, DATA_SOURCE, DEFAULT_LIMIT, DEFAULT_RADIUS_M, MAX_DISTANCE_KM,
};
use crate::services::geocoding::GeocodingClient;
use crate::services::location::DeviceLocationProvider;
use crate::services::overpass::OverpassClient;

/// TTL for cached search responses
const SEARCH_CACHE_TTL: Duration = Duration::from_secs(600);

/// Cache sizes snapshot for debugging
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceStatus {
    pub search_cache_size: usize,
    pub geocode_cache_size: usize,
}

pub struct CinemaSearchService {
    geocoder: GeocodingClient,
    overpass: OverpassClient,
    search_cache: TtlCache<CinemaSearchResponse>,
    location_provider: Option<Arc<DeviceLocationProvider>>,
}

impl CinemaSearchService {
    pub fn new(geocoder: GeocodingClient, overpass: OverpassClient) -> Self {
        Self {
            geocoder,
            overpass,
            search_cache: TtlCache::new(SEARCH_CACHE_TTL),
            location_provider: None,
        }
    }

    /// Attaches a device location capability for nearby searches
    pub fn with_location_provider(mut self, provider: DeviceLocationProvider) -> Self {
        self.location_provider = Some(Arc::new(provider));
        self
    }

    /// Searches cinemas for the given parameters.
    ///
    /// Invalid parameters fail before any network call. The cache is checked
    /// under the raw location parameter, so a repeat search within the TTL
    /// also skips geocoding.
    pub async fn search(&self, params: &CinemaSearchParams) -> AppResult<CinemaSearchResponse> {
        let location = params.location()?;
        let radius = params.radius();

        let key = CacheKey::Search {
            location: location.cache_location(),
            radius,
        };
        if let Some(cached) = self.search_cache.get(&key).await {
            tracing::debug!(key = %key, "Search cache hit");
            return Ok(cached);
        }

        let started = Instant::now();
        let (center, label) = self.resolve_center(&location).await?;
        let elements = self.overpass.find_cinemas(center, radius).await?;
        let response = Self::assemble(&elements, center, label, params.limit(), started);

        tracing::info!(
            location = %response.search_location,
            total = response.total,
            query_time_ms = response.query_time,
            "Cinema search completed"
        );

        self.search_cache.insert(&key, response.clone()).await;
        Ok(response)
    }

    /// Coordinate-first entry point for device-derived positions.
    ///
    /// Skips geocoding entirely and labels the response as the current
    /// location.
    pub async fn search_by_coordinates(
        &self,
        latitude: f64,
        longitude: f64,
        radius: Option<u32>,
    ) -> AppResult<CinemaSearchResponse> {
        let center = Coordinates {
            lat: latitude,
            lng: longitude,
        };
        let radius = radius.unwrap_or(DEFAULT_RADIUS_M);

        let key = CacheKey::Search {
            location: format!("{latitude},{longitude}"),
            radius,
        };
        if let Some(cached) = self.search_cache.get(&key).await {
            tracing::debug!(key = %key, "Search cache hit");
            return Ok(cached);
        }

        let started = Instant::now();
        let elements = self.overpass.find_cinemas(center, radius).await?;
        let response = Self::assemble(
            &elements,
            center,
            CURRENT_LOCATION_LABEL.to_string(),
            DEFAULT_LIMIT,
            started,
        );

        self.search_cache.insert(&key, response.clone()).await;
        Ok(response)
    }

    /// Searches around the device position via the attached location provider
    pub async fn search_nearby(&self, radius: Option<u32>) -> AppResult<CinemaSearchResponse> {
        let provider = self.location_provider.as_ref().ok_or_else(|| {
            AppError::Location("no geolocation capability configured".to_string())
        })?;

        let position = provider.current_location().await?;
        self.search_by_coordinates(position.lat, position.lng, radius)
            .await
    }

    /// Convenience: search by postal code
    pub async fn search_by_zip_code(&self, zip_code: &str) -> AppResult<CinemaSearchResponse> {
        self.search(&CinemaSearchParams {
            zip_code: Some(zip_code.to_string()),
            ..CinemaSearchParams::default()
        })
        .await
    }

    /// Convenience: search by city name
    pub async fn search_by_city(&self, city: &str) -> AppResult<CinemaSearchResponse> {
        self.search(&CinemaSearchParams {
            city: Some(city.to_string()),
            ..CinemaSearchParams::default()
        })
        .await
    }

    async fn resolve_center(
        &self,
        location: &SearchLocation,
    ) -> AppResult<(Coordinates, String)> {
        match location {
            SearchLocation::Coordinates(coords) => {
                Ok((*coords, format!("{:.3}, {:.3}", coords.lat, coords.lng)))
            }
            SearchLocation::ZipCode(term) | SearchLocation::City(term) => {
                let resolved = self.geocoder.resolve(term).await?;
                Ok((resolved.coordinates, resolved.display_name))
            }
        }
    }

    /// Normalizes raw elements into the response envelope: convert each
    /// element, drop the unusable ones, cap at the hard distance limit, sort
    /// ascending by distance, truncate.
    fn assemble(
        elements: &[OverpassElement],
        center: Coordinates,
        search_location: String,
        limit: usize,
        started: Instant,
    ) -> CinemaSearchResponse {
        let mut cinemas: Vec<Cinema> = elements
            .iter()
            .filter_map(|element| element.to_cinema(center))
            .filter(|cinema| cinema.distance <= MAX_DISTANCE_KM)
            .collect();
        cinemas.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        cinemas.truncate(limit);

        let notice = if cinemas.is_empty() {
            Some(SearchNotice::no_results(&search_location))
        } else {
            None
        };
        let total = cinemas.len();

        CinemaSearchResponse {
            cinemas,
            total,
            search_location,
            center: Some(center),
            data_source: DATA_SOURCE.to_string(),
            query_time: started.elapsed().as_millis() as u64,
            notice,
        }
    }

    /// Drops both caches (testing/debugging)
    pub async fn clear_caches(&self) {
        self.search_cache.clear().await;
        self.geocoder.clear_cache().await;
        tracing::debug!("Cinema search caches cleared");
    }

    /// Cache sizes snapshot
    pub async fn status(&self) -> ServiceStatus {
        ServiceStatus {
            search_cache_size: self.search_cache.len().await,
            geocode_cache_size: self.geocoder.cache_len().await,
        }
    }
}
