use movietrends_api::api::{create_router, AppState};
use movietrends_api::config::Config;
use movietrends_api::services::{CinemaSearchService, GeocodingClient, MovieClient, OverpassClient};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "movietrends_api=info,tower_http=info".into()),
        )
        .init();

    let config = Config::from_env()?;

    let geocoder = GeocodingClient::new(&config.nominatim_url)?;
    let overpass = OverpassClient::new(&config.overpass_url)?;
    let cinema_search = CinemaSearchService::new(geocoder, overpass);
    let movies = MovieClient::new(&config.movie_api_url, config.movie_api_key.clone())?;

    let state = AppState::new(cinema_search, movies);
    let app = create_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(addr = %addr, "MovieTrends API listening");
    axum::serve(listener, app).await?;

    Ok(())
}
