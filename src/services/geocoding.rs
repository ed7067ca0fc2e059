//! Nominatim geocoding client.
//!
//! Resolves a free-text postal code or city name to coordinates. The search
//! is scoped to Germany: the term is country-qualified before dispatch and
//! the service is asked for a single candidate. Successful resolutions are
//! cached for ten minutes keyed by the lower-cased term.

use std::time::Duration;

use reqwest::Client as HttpClient;
use serde::Deserialize;

use crate::cache::{CacheKey, TtlCache};
use crate::error::{AppError, AppResult};
use crate::models::Coordinates;

/// Per-request timeout for the geocoding endpoint
const GEOCODE_TIMEOUT: Duration = Duration::from_secs(5);
/// TTL for cached resolutions
const GEOCODE_CACHE_TTL: Duration = Duration::from_secs(600);
/// Country qualifier appended to every search term
const COUNTRY_QUALIFIER: &str = "Deutschland";
/// Country filter passed to the geocoding endpoint
const COUNTRY_CODES: &str = "de";
/// Nominatim etiquette requires an identifying User-Agent
pub(crate) const USER_AGENT: &str = "MovieTrends/1.0 (cinema search)";

/// One candidate match from the geocoding endpoint (lat/lon are
/// string-encoded on the wire)
#[derive(Debug, Clone, Deserialize)]
struct NominatimPlace {
    lat: String,
    lon: String,
    display_name: String,
}

/// A successfully geocoded search term
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedLocation {
    pub coordinates: Coordinates,
    pub display_name: String,
}

#[derive(Clone)]
pub struct GeocodingClient {
    http_client: HttpClient,
    base_url: String,
    cache: TtlCache<ResolvedLocation>,
}

impl GeocodingClient {
    /// Creates a client for the given Nominatim base URL (no trailing slash
    /// required; tests point this at a mock server).
    pub fn new(base_url: &str) -> AppResult<Self> {
        let http_client = HttpClient::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| AppError::Internal(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
            cache: TtlCache::new(GEOCODE_CACHE_TTL),
        })
    }

    /// Resolves a postal code or city name to coordinates.
    ///
    /// Fails with a geocoding error when the service returns zero matches or
    /// the request fails at the transport level.
    pub async fn resolve(&self, term: &str) -> AppResult<ResolvedLocation> {
        let key = CacheKey::Geocode(term.to_string());
        if let Some(cached) = self.cache.get(&key).await {
            tracing::debug!(term = %term, "Geocode cache hit");
            return Ok(cached);
        }

        let resolved = self.fetch(term).await?;
        self.cache.insert(&key, resolved.clone()).await;
        Ok(resolved)
    }

    async fn fetch(&self, term: &str) -> AppResult<ResolvedLocation> {
        let url = format!("{}/search", self.base_url);
        let query = format!("{term}, {COUNTRY_QUALIFIER}");

        let response = self
            .http_client
            .get(&url)
            .query(&[
                ("q", query.as_str()),
                ("format", "json"),
                ("limit", "1"),
                ("countrycodes", COUNTRY_CODES),
                ("addressdetails", "1"),
            ])
            .timeout(GEOCODE_TIMEOUT)
            .send()
            .await
            .map_err(|e| AppError::Geocoding(format!("request for \"{term}\" failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(AppError::Geocoding(format!(
                "geocoding service returned status {status}"
            )));
        }

        let places: Vec<NominatimPlace> = response
            .json()
            .await
            .map_err(|e| AppError::Geocoding(format!("invalid geocoding response: {e}")))?;

        let place = places.into_iter().next().ok_or_else(|| {
            AppError::Geocoding(format!("place \"{term}\" could not be resolved"))
        })?;

        let lat = place
            .lat
            .parse::<f64>()
            .map_err(|e| AppError::Geocoding(format!("malformed latitude \"{}\": {e}", place.lat)))?;
        let lng = place.lon.parse::<f64>().map_err(|e| {
            AppError::Geocoding(format!("malformed longitude \"{}\": {e}", place.lon))
        })?;

        tracing::info!(
            term = %term,
            display = %place.display_name,
            lat,
            lng,
            "Geocoded location"
        );

        Ok(ResolvedLocation {
            coordinates: Coordinates { lat, lng },
            display_name: place.display_name,
        })
    }

    /// Number of live cache entries (service status/debugging)
    pub async fn cache_len(&self) -> usize {
        self.cache.len().await
    }

    /// Drops all cached resolutions
    pub async fn clear_cache(&self) {
        self.cache.clear().await;
    }
}
