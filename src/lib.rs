//! Backend service for the MovieTrends app.
//!
//! The core is the cinema-lookup pipeline: a free-text postal code or city
//! name is geocoded via Nominatim, nearby cinema-tagged points-of-interest
//! are fetched from the Overpass API, normalized into uniform records with
//! distances from the search center, and returned sorted, capped and cached.
//! A thin movie-metadata proxy covers the discovery screens.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod geo;
pub mod middleware;
pub mod models;
pub mod services;
