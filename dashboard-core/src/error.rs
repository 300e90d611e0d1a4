//! Error taxonomy for provider calls and geolocation.

/// Failure of a weather provider request.
///
/// `NotFound` means the provider answered but had no match. Every other
/// variant is a network-class failure (transport, unexpected status or an
/// unreadable body).
#[derive(Debug, thiserror::Error)]
pub enum WeatherError {
    #[error("{0} not found")]
    NotFound(String),
    #[error("request to weather provider failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("weather provider returned status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("failed to parse weather provider response: {0}")]
    Parse(#[from] serde_json::Error),
}

impl WeatherError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, WeatherError::NotFound(_))
    }

    pub fn is_network(&self) -> bool {
        !self.is_not_found()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum GeolocationError {
    #[error("Geolocation is not available on this platform")]
    Unavailable,
    #[error("Location permission denied")]
    PermissionDenied,
    #[error("Location request timed out")]
    Timeout,
}
