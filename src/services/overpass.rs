//! Overpass spatial query builder and client.

use std::time::Duration;

use reqwest::header::CONTENT_TYPE;
use reqwest::Client as HttpClient;

use crate::error::{AppError, AppResult};
use crate::models::osm::{OverpassElement, OverpassResponse};
use crate::models::Coordinates;
use crate::services::geocoding::USER_AGENT;

/// Client-side request timeout for the interpreter
const OVERPASS_TIMEOUT: Duration = Duration::from_secs(30);
/// Server-side execution budget in seconds, embedded in the query
const QUERY_TIMEOUT_S: u32 = 25;

/// Alternate interpreter endpoints for manual failover when the primary is
/// overloaded. No automatic rotation; callers configure one endpoint.
pub const FALLBACK_URLS: &[&str] = &[
    "https://overpass-api.de/api/interpreter",
    "https://overpass.kumi.systems/api/interpreter",
    "https://overpass.openstreetmap.ru/api/interpreter",
];

/// Builds the Overpass QL query for cinema-tagged points-of-interest within
/// `radius_m` meters of the center. Pure and deterministic; area-type
/// elements are asked for their centroid (`out center`).
pub fn build_query(lat: f64, lng: f64, radius_m: u32) -> String {
    format!(
        "[out:json][timeout:{QUERY_TIMEOUT_S}];\n\
         (\n\
         \x20 nwr[\"amenity\"=\"cinema\"](around:{radius_m},{lat},{lng});\n\
         \x20 nwr[\"leisure\"=\"cinema\"](around:{radius_m},{lat},{lng});\n\
         );\n\
         out center meta;"
    )
}

#[derive(Clone)]
pub struct OverpassClient {
    http_client: HttpClient,
    url: String,
}

impl OverpassClient {
    /// Creates a client for the given interpreter URL
    pub fn new(url: &str) -> AppResult<Self> {
        let http_client = HttpClient::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| AppError::Internal(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http_client,
            url: url.to_string(),
        })
    }

    /// Queries cinema-tagged elements around the center.
    ///
    /// The query text is POSTed as `text/plain`. Server errors map to an
    /// Overpass error, explicit timeouts to a timeout error, connectivity
    /// failures to a network error.
    pub async fn find_cinemas(
        &self,
        center: Coordinates,
        radius_m: u32,
    ) -> AppResult<Vec<OverpassElement>> {
        let query = build_query(center.lat, center.lng, radius_m);
        tracing::debug!(query = %query, "Overpass query");

        let response = self
            .http_client
            .post(&self.url)
            .header(CONTENT_TYPE, "text/plain")
            .body(query)
            .timeout(OVERPASS_TIMEOUT)
            .send()
            .await
            .map_err(|e| AppError::from_reqwest("Overpass request", e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, body = %body, "Overpass request failed");
            return Err(AppError::Overpass(format!(
                "interpreter returned status {status}: {body}"
            )));
        }

        let parsed: OverpassResponse = response
            .json()
            .await
            .map_err(|e| AppError::Overpass(format!("invalid interpreter response: {e}")))?;

        tracing::info!(elements = parsed.elements.len(), "Overpass query completed");

        Ok(parsed.elements)
    }
}
