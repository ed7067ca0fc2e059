use axum_test::TestServer;
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use movietrends_api::api::{create_router, AppState};
use movietrends_api::services::{CinemaSearchService, GeocodingClient, MovieClient, OverpassClient};

fn create_test_server(nominatim: &MockServer, overpass: &MockServer, tmdb: &MockServer) -> TestServer {
    let geocoder = GeocodingClient::new(&nominatim.uri()).unwrap();
    let overpass_client =
        OverpassClient::new(&format!("{}/api/interpreter", overpass.uri())).unwrap();
    let cinema_search = CinemaSearchService::new(geocoder, overpass_client);
    let movies = MovieClient::new(&tmdb.uri(), "test-key".to_string()).unwrap();

    let state = AppState::new(cinema_search, movies);
    let app = create_router(state);
    TestServer::new(app).unwrap()
}

async fn start_backends() -> (MockServer, MockServer, MockServer) {
    (
        MockServer::start().await,
        MockServer::start().await,
        MockServer::start().await,
    )
}

#[tokio::test]
async fn test_health_check() {
    let (nominatim, overpass, tmdb) = start_backends().await;
    let server = create_test_server(&nominatim, &overpass, &tmdb);

    let response = server.get("/health").await;
    response.assert_status_ok();

    let body: serde_json::Value = response.json();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["searchCacheSize"], 0);
    assert_eq!(body["geocodeCacheSize"], 0);
}

#[tokio::test]
async fn test_search_without_location_is_bad_request() {
    let (nominatim, overpass, tmdb) = start_backends().await;
    let server = create_test_server(&nominatim, &overpass, &tmdb);

    let response = server.get("/cinemas/search").await;
    response.assert_status(axum::http::StatusCode::BAD_REQUEST);

    let body: serde_json::Value = response.json();
    assert_eq!(body["error"]["code"], "INVALID_LOCATION");
}

#[tokio::test]
async fn test_search_with_malformed_zip_is_bad_request() {
    let (nominatim, overpass, tmdb) = start_backends().await;
    let server = create_test_server(&nominatim, &overpass, &tmdb);

    let response = server
        .get("/cinemas/search")
        .add_query_param("zipCode", "603")
        .await;

    response.assert_status(axum::http::StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json();
    assert_eq!(body["error"]["code"], "INVALID_LOCATION");
}

#[tokio::test]
async fn test_cinema_search_by_zip_code() {
    let (nominatim, overpass, tmdb) = start_backends().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("q", "60311, Deutschland"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "place_id": 282653901,
            "lat": "50.1106444",
            "lon": "8.6820917",
            "display_name": "Frankfurt am Main, Hessen, Deutschland"
        }])))
        .mount(&nominatim)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/interpreter"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "elements": [{
                "type": "node",
                "id": 663398606,
                "lat": 50.1089,
                "lon": 8.6694,
                "tags": {
                    "amenity": "cinema",
                    "name": "Orfeos Erben",
                    "addr:street": "Hamburger Allee",
                    "addr:housenumber": "45",
                    "wheelchair": "yes",
                    "website": "https://orfeos.de"
                }
            }]
        })))
        .mount(&overpass)
        .await;

    let server = create_test_server(&nominatim, &overpass, &tmdb);
    let response = server
        .get("/cinemas/search")
        .add_query_param("zipCode", "60311")
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["total"], 1);
    assert_eq!(body["dataSource"], "openstreetmap");
    assert_eq!(body["searchLocation"], "Frankfurt am Main, Hessen, Deutschland");

    let cinema = &body["cinemas"][0];
    assert_eq!(cinema["id"], "osm_node_663398606");
    assert_eq!(cinema["name"], "Orfeos Erben");
    assert_eq!(cinema["address"], "Hamburger Allee 45");
    assert_eq!(cinema["wheelchairAccessible"], true);
    assert_eq!(cinema["website"], "https://orfeos.de");
    assert_eq!(cinema["source"], "osm");
}

#[tokio::test]
async fn test_geocoding_failure_is_unprocessable() {
    let (nominatim, overpass, tmdb) = start_backends().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&nominatim)
        .await;

    let server = create_test_server(&nominatim, &overpass, &tmdb);
    let response = server
        .get("/cinemas/search")
        .add_query_param("city", "Nonexistentplace1234")
        .await;

    response.assert_status(axum::http::StatusCode::UNPROCESSABLE_ENTITY);
    let body: serde_json::Value = response.json();
    assert_eq!(body["error"]["code"], "GEOCODING_ERROR");
}

#[tokio::test]
async fn test_popular_movies() {
    let (nominatim, overpass, tmdb) = start_backends().await;

    Mock::given(method("GET"))
        .and(path("/movie/popular"))
        .and(query_param("page", "1"))
        .and(query_param("api_key", "test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "page": 1,
            "total_pages": 500,
            "total_results": 10000,
            "results": [{
                "id": 27205,
                "title": "Inception",
                "overview": "A thief who steals corporate secrets.",
                "poster_path": "/inception.jpg",
                "release_date": "2010-07-15",
                "vote_average": 8.4
            }]
        })))
        .mount(&tmdb)
        .await;

    let server = create_test_server(&nominatim, &overpass, &tmdb);
    let response = server.get("/movies/popular").await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["page"], 1);
    assert_eq!(body["movies"][0]["title"], "Inception");
}

#[tokio::test]
async fn test_movie_details() {
    let (nominatim, overpass, tmdb) = start_backends().await;

    Mock::given(method("GET"))
        .and(path("/movie/27205"))
        .and(query_param("api_key", "test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 27205,
            "title": "Inception",
            "overview": "A thief who steals corporate secrets.",
            "poster_path": "/inception.jpg",
            "release_date": "2010-07-15",
            "vote_average": 8.4,
            "runtime": 148,
            "genres": [{ "id": 878, "name": "Science Fiction" }]
        })))
        .mount(&tmdb)
        .await;

    let server = create_test_server(&nominatim, &overpass, &tmdb);
    let response = server.get("/movies/27205").await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["title"], "Inception");
    assert_eq!(body["runtime"], 148);
    assert_eq!(body["genres"][0]["name"], "Science Fiction");
}

#[tokio::test]
async fn test_movie_backend_failure_is_bad_gateway() {
    let (nominatim, overpass, tmdb) = start_backends().await;

    Mock::given(method("GET"))
        .and(path("/movie/999"))
        .respond_with(ResponseTemplate::new(404).set_body_string("Not Found"))
        .mount(&tmdb)
        .await;

    let server = create_test_server(&nominatim, &overpass, &tmdb);
    let response = server.get("/movies/999").await;

    response.assert_status(axum::http::StatusCode::BAD_GATEWAY);
    let body: serde_json::Value = response.json();
    assert_eq!(body["error"]["code"], "EXTERNAL_API_ERROR");
}
