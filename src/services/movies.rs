//! Movie metadata provider client.
//!
//! Thin wrapper around the TMDB-style REST API used by the app's discovery
//! screens: popular listings and per-movie details, both cached for an hour.

use std::time::Duration;

use reqwest::Client as HttpClient;

use crate::cache::{CacheKey, TtlCache};
use crate::error::{AppError, AppResult};
use crate::models::{MovieDetails, MoviePage, TmdbMovieDetails, TmdbMoviePage};

/// Per-request timeout for the metadata provider
const MOVIE_TIMEOUT: Duration = Duration::from_secs(10);
/// TTL for cached listings and details
const MOVIE_CACHE_TTL: Duration = Duration::from_secs(3600);

#[derive(Clone)]
pub struct MovieClient {
    http_client: HttpClient,
    base_url: String,
    api_key: String,
    page_cache: TtlCache<MoviePage>,
    details_cache: TtlCache<MovieDetails>,
}

impl MovieClient {
    pub fn new(base_url: &str, api_key: String) -> AppResult<Self> {
        let http_client = HttpClient::builder()
            .timeout(MOVIE_TIMEOUT)
            .build()
            .map_err(|e| AppError::Internal(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            page_cache: TtlCache::new(MOVIE_CACHE_TTL),
            details_cache: TtlCache::new(MOVIE_CACHE_TTL),
        })
    }

    /// One page of currently popular movies
    pub async fn popular(&self, page: u32) -> AppResult<MoviePage> {
        let key = CacheKey::Movie(format!("popular:{page}"));
        if let Some(cached) = self.page_cache.get(&key).await {
            return Ok(cached);
        }

        let url = format!("{}/movie/popular", self.base_url);
        let response = self
            .http_client
            .get(&url)
            .query(&[
                ("page", page.to_string().as_str()),
                ("api_key", self.api_key.as_str()),
            ])
            .send()
            .await
            .map_err(|e| AppError::from_reqwest("movie listing request", e))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalApi(format!(
                "movie API returned status {status}: {body}"
            )));
        }

        let raw: TmdbMoviePage = response
            .json()
            .await
            .map_err(|e| AppError::ExternalApi(format!("invalid movie listing: {e}")))?;

        let page_data = MoviePage::from_provider(raw);
        tracing::info!(
            page,
            results = page_data.movies.len(),
            "Popular movies fetched"
        );

        self.page_cache.insert(&key, page_data.clone()).await;
        Ok(page_data)
    }

    /// Full details for one movie
    pub async fn details(&self, id: u64) -> AppResult<MovieDetails> {
        let key = CacheKey::Movie(format!("details:{id}"));
        if let Some(cached) = self.details_cache.get(&key).await {
            return Ok(cached);
        }

        let url = format!("{}/movie/{}", self.base_url, id);
        let response = self
            .http_client
            .get(&url)
            .query(&[("api_key", self.api_key.as_str())])
            .send()
            .await
            .map_err(|e| AppError::from_reqwest("movie details request", e))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalApi(format!(
                "movie API returned status {status}: {body}"
            )));
        }

        let raw: TmdbMovieDetails = response
            .json()
            .await
            .map_err(|e| AppError::ExternalApi(format!("invalid movie details: {e}")))?;

        let details = MovieDetails::from_provider(raw);
        tracing::info!(movie_id = id, title = %details.title, "Movie details fetched");

        self.details_cache.insert(&key, details.clone()).await;
        Ok(details)
    }
}
