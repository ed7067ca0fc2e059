//! Device location access.
//!
//! The platform geolocation capability (permission prompts, position fixes)
//! is behind a trait so each target platform can supply its own
//! implementation and tests can inject a mock.

use std::sync::Arc;
use std::time::Duration;

use crate::error::{AppError, AppResult};
use crate::models::Coordinates;

/// Accuracy/timeout policy for one position fix attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccuracyPolicy {
    pub high_accuracy: bool,
    /// How long to wait for a fix
    pub timeout: Duration,
    /// How old a cached fix may be
    pub max_age: Duration,
}

/// First attempt: precise fix, tolerate only a fresh cached position
pub const HIGH_ACCURACY: AccuracyPolicy = AccuracyPolicy {
    high_accuracy: true,
    timeout: Duration::from_secs(10),
    max_age: Duration::from_secs(30),
};

/// Fallback for indoor/poor-signal conditions: give up sooner but accept a
/// position up to ten minutes old
pub const LOW_ACCURACY: AccuracyPolicy = AccuracyPolicy {
    high_accuracy: false,
    timeout: Duration::from_secs(5),
    max_age: Duration::from_secs(600),
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionState {
    Granted,
    Denied,
    Prompt,
}

/// Platform geolocation capability
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait GeolocationCapability: Send + Sync {
    /// Current permission grant without prompting the user
    async fn check_permission(&self) -> AppResult<PermissionState>;

    /// Prompts the user for the location permission
    async fn request_permission(&self) -> AppResult<PermissionState>;

    /// One position fix attempt under the given policy
    async fn get_position(&self, policy: AccuracyPolicy) -> AppResult<Coordinates>;
}

/// Supplies device coordinates to the search pipeline
pub struct DeviceLocationProvider {
    capability: Arc<dyn GeolocationCapability>,
}

impl DeviceLocationProvider {
    pub fn new(capability: Arc<dyn GeolocationCapability>) -> Self {
        Self { capability }
    }

    /// Current device coordinates.
    ///
    /// Checks (and if needed requests) the location permission, then attempts
    /// a high-accuracy fix, falling back to a low-accuracy attempt before
    /// giving up. All failure modes surface as a location error; the caller
    /// maps it to a user-facing message without retrying.
    pub async fn current_location(&self) -> AppResult<Coordinates> {
        match self.capability.check_permission().await? {
            PermissionState::Granted => {}
            PermissionState::Denied => {
                return Err(AppError::Location(
                    "location permission denied".to_string(),
                ));
            }
            PermissionState::Prompt => {
                if self.capability.request_permission().await? != PermissionState::Granted {
                    return Err(AppError::Location(
                        "location permission denied".to_string(),
                    ));
                }
            }
        }

        match self.capability.get_position(HIGH_ACCURACY).await {
            Ok(position) => Ok(position),
            Err(err) => {
                tracing::warn!(error = %err, "High-accuracy fix failed, retrying with low accuracy");
                self.capability
                    .get_position(LOW_ACCURACY)
                    .await
                    .map_err(|err| match err {
                        already @ AppError::Location(_) => already,
                        other => AppError::Location(other.to_string()),
                    })
            }
        }
    }
}
