//! Route resolution through a directions gateway

use crate::{Coordinates, DirectionsGateway, Location};
use std::sync::Arc;

/// Fetches the driving route through an ordered list of locations
#[derive(Clone)]
pub struct RouteResolver {
    directions: Arc<dyn DirectionsGateway>,
}

impl RouteResolver {
    /// Minimum number of waypoints for a route request
    pub const MIN_WAYPOINTS: usize = 2;

    pub fn new(directions: Arc<dyn DirectionsGateway>) -> Self {
        Self { directions }
    }

    /// Path geometry through `locations`, or an empty sequence when there is no route
    pub async fn resolve(&self, locations: &[Location]) -> Vec<Coordinates> {
        if locations.len() < Self::MIN_WAYPOINTS {
            tracing::debug!(
                "Not requesting a route for {} waypoint(s)",
                locations.len()
            );
            return Vec::new();
        }

        let waypoints: Vec<Coordinates> = locations.iter().map(|l| l.coordinates).collect();
        match self.directions.driving_route(&waypoints).await {
            Ok(points) => {
                tracing::debug!(
                    "Route through {} waypoints has {} points",
                    waypoints.len(),
                    points.len()
                );
                points
            }
            Err(err) => {
                tracing::warn!(
                    "Failed to fetch route through {} waypoints: {}",
                    waypoints.len(),
                    err
                );
                Vec::new()
            }
        }
    }
}
