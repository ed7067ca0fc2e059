use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

pub mod osm;

/// Default search radius around the center, in meters
pub const DEFAULT_RADIUS_M: u32 = 25_000;
/// Default maximum number of cinemas in a response
pub const DEFAULT_LIMIT: usize = 50;
/// Hard safety cap on result distance, independent of the requested radius
pub const MAX_DISTANCE_KM: f64 = 50.0;
/// Minimum length of a usable city name
pub const CITY_MIN_LENGTH: usize = 2;
/// Provenance tag on every response
pub const DATA_SOURCE: &str = "openstreetmap";
/// Provenance tag on every cinema record
pub const CINEMA_SOURCE: &str = "osm";
/// Label synthesized for coordinate-first searches
pub const CURRENT_LOCATION_LABEL: &str = "Current location";

/// A latitude/longitude pair in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

/// Normalized cinema record returned to clients
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cinema {
    /// Stable identifier derived from OSM element type + numeric id
    pub id: String,
    pub name: String,
    pub address: String,
    pub city: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zip_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    /// Kilometers from the search center, rounded to one decimal place
    pub distance: f64,
    pub coordinates: Coordinates,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opening_hours: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operator: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capacity: Option<String>,
    pub wheelchair_accessible: bool,
    pub source: String,
}

/// Search parameters as supplied by the client.
///
/// Exactly one location variant is used, with zip code taking precedence over
/// city, and city over raw coordinates.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CinemaSearchParams {
    pub zip_code: Option<String>,
    pub city: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    /// Search radius in meters
    pub radius: Option<u32>,
    pub limit: Option<usize>,
}

/// The location variant resolved from [`CinemaSearchParams`]
#[derive(Debug, Clone, PartialEq)]
pub enum SearchLocation {
    ZipCode(String),
    City(String),
    Coordinates(Coordinates),
}

impl SearchLocation {
    /// Location part of the search cache key
    pub fn cache_location(&self) -> String {
        match self {
            SearchLocation::ZipCode(zip) => zip.clone(),
            SearchLocation::City(city) => city.clone(),
            SearchLocation::Coordinates(c) => format!("{},{}", c.lat, c.lng),
        }
    }

}

/// True iff `value` is a well-formed German postal code (exactly 5 digits)
pub fn is_valid_zip_code(value: &str) -> bool {
    value.len() == 5 && value.chars().all(|c| c.is_ascii_digit())
}

impl CinemaSearchParams {
    /// Resolves and validates the location variant.
    ///
    /// Empty or whitespace-only strings are treated as absent, so a blank
    /// search box fails here before any network call is issued.
    pub fn location(&self) -> AppResult<SearchLocation> {
        if let Some(zip) = non_empty(self.zip_code.as_deref()) {
            if is_valid_zip_code(zip) {
                return Ok(SearchLocation::ZipCode(zip.to_string()));
            }
            return Err(AppError::InvalidLocation(format!(
                "\"{zip}\" is not a valid postal code"
            )));
        }

        if let Some(city) = non_empty(self.city.as_deref()) {
            if city.chars().count() >= CITY_MIN_LENGTH {
                return Ok(SearchLocation::City(city.to_string()));
            }
            return Err(AppError::InvalidLocation(format!(
                "city name \"{city}\" is too short"
            )));
        }

        if let (Some(lat), Some(lng)) = (self.latitude, self.longitude) {
            return Ok(SearchLocation::Coordinates(Coordinates { lat, lng }));
        }

        Err(AppError::InvalidLocation(
            "no postal code, city or coordinates given".to_string(),
        ))
    }

    pub fn radius(&self) -> u32 {
        self.radius.unwrap_or(DEFAULT_RADIUS_M)
    }

    pub fn limit(&self) -> usize {
        self.limit.unwrap_or(DEFAULT_LIMIT)
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}

/// Non-fatal condition attached to an otherwise successful search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchNotice {
    pub code: String,
    pub message: String,
}

impl SearchNotice {
    /// The search succeeded but no cinema survived normalization/filtering
    pub fn no_results(location: &str) -> Self {
        Self {
            code: "NO_RESULTS".to_string(),
            message: format!("No cinemas found near \"{location}\"."),
        }
    }
}

/// Result envelope for a cinema search
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CinemaSearchResponse {
    pub cinemas: Vec<Cinema>,
    pub total: usize,
    /// Human-readable resolved location
    pub search_location: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub center: Option<Coordinates>,
    pub data_source: String,
    /// Wall-clock milliseconds spent serving the request
    pub query_time: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<SearchNotice>,
}

// ============================================================================
// Movie Metadata API Types
// ============================================================================

/// Raw movie entry from the metadata provider
#[derive(Debug, Clone, Deserialize)]
pub struct TmdbMovie {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub vote_average: Option<f64>,
    #[serde(default)]
    pub poster_path: Option<String>,
}

/// Raw paged listing from the metadata provider
#[derive(Debug, Clone, Deserialize)]
pub struct TmdbMoviePage {
    pub page: u32,
    pub results: Vec<TmdbMovie>,
    #[serde(default)]
    pub total_results: Option<u64>,
}

/// Raw movie details from the metadata provider
#[derive(Debug, Clone, Deserialize)]
pub struct TmdbMovieDetails {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub runtime: Option<u32>,
    #[serde(default)]
    pub vote_average: Option<f64>,
    #[serde(default)]
    pub genres: Vec<TmdbGenre>,
    #[serde(default)]
    pub poster_path: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TmdbGenre {
    pub id: u64,
    pub name: String,
}

/// Movie summary returned to clients
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MovieSummary {
    pub id: u64,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overview: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub release_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vote_average: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub poster_path: Option<String>,
}

impl From<TmdbMovie> for MovieSummary {
    fn from(movie: TmdbMovie) -> Self {
        Self {
            id: movie.id,
            title: movie.title,
            overview: movie.overview,
            release_date: movie.release_date,
            vote_average: movie.vote_average,
            poster_path: movie.poster_path,
        }
    }
}

/// One page of movie summaries
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoviePage {
    pub page: u32,
    pub movies: Vec<MovieSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_results: Option<u64>,
    pub fetched_at: DateTime<Utc>,
}

impl MoviePage {
    pub fn from_provider(page: TmdbMoviePage) -> Self {
        Self {
            page: page.page,
            movies: page.results.into_iter().map(MovieSummary::from).collect(),
            total_results: page.total_results,
            fetched_at: Utc::now(),
        }
    }
}

/// Full movie details returned to clients
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MovieDetails {
    pub id: u64,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overview: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub release_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub runtime: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vote_average: Option<f64>,
    pub genres: Vec<TmdbGenre>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub poster_path: Option<String>,
    pub fetched_at: DateTime<Utc>,
}

impl MovieDetails {
    pub fn from_provider(details: TmdbMovieDetails) -> Self {
        Self {
            id: details.id,
            title: details.title,
            overview: details.overview,
            release_date: details.release_date,
            runtime: details.runtime,
            vote_average: details.vote_average,
            genres: details.genres,
            poster_path: details.poster_path,
            fetched_at: Utc::now(),
        }
    }
}
