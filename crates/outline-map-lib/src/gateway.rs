use crate::{Coordinates, Result};
use async_trait::async_trait;

/// Forward geocoding: place name to candidate coordinates, best match first
#[async_trait]
pub trait GeocodingGateway: Send + Sync {
    async fn forward(&self, query: &str) -> Result<Vec<Coordinates>>;
}

/// Driving directions through ordered waypoints
#[async_trait]
pub trait DirectionsGateway: Send + Sync {
    /// Full-resolution path geometry of the first route returned by the service
    async fn driving_route(&self, waypoints: &[Coordinates]) -> Result<Vec<Coordinates>>;
}
