use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::AppResult;
use crate::models::{CinemaSearchParams, CinemaSearchResponse, MovieDetails, MoviePage};

use super::AppState;

/// Liveness probe with cache sizes for debugging
pub async fn health_check(State(state): State<AppState>) -> Json<Value> {
    let status = state.cinema_search.status().await;
    Json(json!({
        "status": "ok",
        "searchCacheSize": status.search_cache_size,
        "geocodeCacheSize": status.geocode_cache_size,
    }))
}

/// `GET /cinemas/search?zipCode=…|city=…|latitude=…&longitude=…`
///
/// Errors carry one of the enumerated search error codes; a successful
/// search with zero results is a 200 with a `NO_RESULTS` notice.
pub async fn search_cinemas(
    State(state): State<AppState>,
    Query(params): Query<CinemaSearchParams>,
) -> AppResult<Json<CinemaSearchResponse>> {
    let response = state.cinema_search.search(&params).await?;
    Ok(Json(response))
}

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    #[serde(default = "default_page")]
    pub page: u32,
}

fn default_page() -> u32 {
    1
}

/// `GET /movies/popular?page=…`
pub async fn popular_movies(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> AppResult<Json<MoviePage>> {
    let page = state.movies.popular(query.page).await?;
    Ok(Json(page))
}

/// `GET /movies/{id}`
pub async fn movie_details(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> AppResult<Json<MovieDetails>> {
    let details = state.movies.details(id).await?;
    Ok(Json(details))
}
