use std::sync::Arc;

use crate::services::{CinemaSearchService, MovieClient};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub cinema_search: Arc<CinemaSearchService>,
    pub movies: Arc<MovieClient>,
}

impl AppState {
    pub fn new(cinema_search: CinemaSearchService, movies: MovieClient) -> Self {
        Self {
            cinema_search: Arc::new(cinema_search),
            movies: Arc::new(movies),
        }
    }
}
