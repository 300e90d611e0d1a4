//! Position sources for "use current location".

use async_trait::async_trait;
use std::fmt::Debug;

use crate::{error::GeolocationError, model::Coordinate};

/// One-shot position lookup.
#[async_trait]
pub trait GeolocationSource: Send + Sync + Debug {
    async fn request_current_position(&self) -> Result<Coordinate, GeolocationError>;
}

/// Always reports the same position.
#[derive(Debug, Clone, Copy)]
pub struct FixedPosition(pub Coordinate);

#[async_trait]
impl GeolocationSource for FixedPosition {
    async fn request_current_position(&self) -> Result<Coordinate, GeolocationError> {
        Ok(self.0)
    }
}

/// For platforms without any position source.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoGeolocation;

#[async_trait]
impl GeolocationSource for NoGeolocation {
    async fn request_current_position(&self) -> Result<Coordinate, GeolocationError> {
        Err(GeolocationError::Unavailable)
    }
}

/// Fixed position when one is known, otherwise unavailable.
pub fn source_for(position: Option<Coordinate>) -> Box<dyn GeolocationSource> {
    match position {
        Some(coordinate) => Box::new(FixedPosition(coordinate)),
        None => Box::new(NoGeolocation),
    }
}

#[async_trait]
impl GeolocationSource for Box<dyn GeolocationSource> {
    async fn request_current_position(&self) -> Result<Coordinate, GeolocationError> {
        (**self).request_current_position().await
    }
}
