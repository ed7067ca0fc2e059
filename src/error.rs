use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Application-level errors
///
/// Every external-call failure is classified into one of these variants at
/// the component boundary; raw transport errors never cross into the public
/// contract. Already-typed errors pass through unchanged.
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("Invalid location: {0}")]
    InvalidLocation(String),

    #[error("Geocoding failed: {0}")]
    Geocoding(String),

    #[error("Overpass query failed: {0}")]
    Overpass(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Location unavailable: {0}")]
    Location(String),

    #[error("External API error: {0}")]
    ExternalApi(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Stable error code exposed to clients
    pub fn code(&self) -> &'static str {
        match self {
            AppError::InvalidLocation(_) => "INVALID_LOCATION",
            AppError::Geocoding(_) => "GEOCODING_ERROR",
            AppError::Overpass(_) => "OVERPASS_ERROR",
            AppError::Network(_) => "NETWORK_ERROR",
            AppError::Timeout(_) => "TIMEOUT_ERROR",
            AppError::Location(_) => "LOCATION_ERROR",
            AppError::ExternalApi(_) => "EXTERNAL_API_ERROR",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Classifies a `reqwest` transport error for the given external call.
    ///
    /// Explicit timeouts become `Timeout`, everything else (connection
    /// refused, DNS failure, aborted body) is a network-level failure.
    pub fn from_reqwest(context: &str, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            AppError::Timeout(format!("{context}: {err}"))
        } else {
            AppError::Network(format!("{context}: {err}"))
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match self {
            AppError::InvalidLocation(_) | AppError::Location(_) => StatusCode::BAD_REQUEST,
            AppError::Geocoding(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Overpass(_) | AppError::Network(_) | AppError::ExternalApi(_) => {
                StatusCode::BAD_GATEWAY
            }
            AppError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({
            "error": {
                "code": self.code(),
                "message": self.to_string(),
            }
        }));

        (status, body).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
