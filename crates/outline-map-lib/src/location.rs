//! Location resolution
//!
//! Each outline node becomes at most one [`Location`]: literal coordinates from its first child
//! win, otherwise the display name is geocoded once. Nodes that cannot be resolved are dropped
//! and logged; they never abort the batch.

use crate::{GeocodingGateway, OutlineNode};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

/// WGS84 coordinates, stored as (latitude, longitude)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinates {
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Build from the `[lon, lat]` order used by GeoJSON and the map services
    pub const fn from_lon_lat([lon, lat]: [f64; 2]) -> Self {
        Self { lat, lon }
    }
}

impl From<Coordinates> for geo::Coord<f64> {
    fn from(c: Coordinates) -> Self {
        geo::Coord { x: c.lon, y: c.lat }
    }
}

impl From<Coordinates> for geo::Point<f64> {
    fn from(c: Coordinates) -> Self {
        geo::Point::new(c.lon, c.lat)
    }
}

/// A named place with resolved coordinates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub name: String,
    pub coordinates: Coordinates,
    /// Identifier of the outline node this location came from
    pub source_id: Option<String>,
}

/// Owned snapshot of a node, so lookups can outlive the borrowed tree
#[derive(Debug, Clone)]
struct LocationQuery {
    name: String,
    literal: Option<Coordinates>,
    source_id: Option<String>,
}

impl LocationQuery {
    fn from_node(node: &OutlineNode) -> Self {
        Self {
            name: node.display_name(),
            literal: node.literal_coordinates(),
            source_id: node.id.clone(),
        }
    }
}

/// Resolves outline nodes into locations through a geocoding gateway
#[derive(Clone)]
pub struct LocationResolver {
    geocoder: Arc<dyn GeocodingGateway>,
    /// Maximum number of geocoding lookups in flight (1 = sequential)
    concurrency: usize,
}

impl LocationResolver {
    pub fn new(geocoder: Arc<dyn GeocodingGateway>) -> Self {
        Self {
            geocoder,
            concurrency: 1,
        }
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Resolve `nodes` in order, skipping the ones without coordinates
    pub async fn resolve(&self, nodes: &[&OutlineNode]) -> Vec<Location> {
        let queries: Vec<LocationQuery> = nodes
            .iter()
            .map(|node| LocationQuery::from_node(node))
            .collect();

        let locations = if self.concurrency <= 1 || queries.len() <= 1 {
            let mut locations = Vec::with_capacity(queries.len());
            for query in queries {
                if let Some(location) = resolve_query(self.geocoder.as_ref(), query).await {
                    locations.push(location);
                }
            }
            locations
        } else {
            self.resolve_fan_out(queries).await
        };

        tracing::debug!(
            "Resolved {} of {} locations",
            locations.len(),
            nodes.len()
        );
        locations
    }

    /// Bounded fan-out; results are put back into input order before returning
    async fn resolve_fan_out(&self, queries: Vec<LocationQuery>) -> Vec<Location> {
        let permits = Arc::new(Semaphore::new(self.concurrency));
        let mut tasks = JoinSet::new();

        for (index, query) in queries.into_iter().enumerate() {
            let geocoder = Arc::clone(&self.geocoder);
            let permits = Arc::clone(&permits);
            tasks.spawn(async move {
                let Ok(_permit) = permits.acquire_owned().await else {
                    return (index, None);
                };
                (index, resolve_query(geocoder.as_ref(), query).await)
            });
        }

        let mut resolved: Vec<(usize, Location)> = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, Some(location))) => resolved.push((index, location)),
                Ok((_, None)) => {}
                Err(err) => tracing::warn!("Geocoding task failed: {}", err),
            }
        }

        resolved.sort_by_key(|(index, _)| *index);
        resolved.into_iter().map(|(_, location)| location).collect()
    }
}

async fn resolve_query(geocoder: &dyn GeocodingGateway, query: LocationQuery) -> Option<Location> {
    let LocationQuery {
        name,
        literal,
        source_id,
    } = query;

    if let Some(coordinates) = literal {
        return Some(Location {
            name,
            coordinates,
            source_id,
        });
    }

    if name.is_empty() {
        tracing::debug!("Skipping outline node {:?} without a name", source_id);
        return None;
    }

    match geocoder.forward(&name).await {
        Ok(candidates) => match candidates.first() {
            Some(&coordinates) => {
                tracing::debug!("Resolved location '{}': {:?}", name, coordinates);
                Some(Location {
                    name,
                    coordinates,
                    source_id,
                })
            }
            None => {
                tracing::warn!("No geocoding candidates for '{}'", name);
                None
            }
        },
        Err(err) => {
            tracing::warn!("Failed to resolve location '{}': {}", name, err);
            None
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::{MapError, Result};
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// In-memory geocoder that records every query it receives
    #[derive(Default)]
    pub(crate) struct FakeGeocoder {
        pub(crate) places: HashMap<String, Vec<Coordinates>>,
        pub(crate) failing: Vec<String>,
        pub(crate) queries: Mutex<Vec<String>>,
        pub(crate) delay_ms: HashMap<String, u64>,
    }

    impl FakeGeocoder {
        pub(crate) fn with_place(mut self, name: &str, candidates: &[[f64; 2]]) -> Self {
            self.places.insert(
                name.to_string(),
                candidates.iter().copied().map(Coordinates::from_lon_lat).collect(),
            );
            self
        }

        pub(crate) fn failing_on(mut self, name: &str) -> Self {
            self.failing.push(name.to_string());
            self
        }

        pub(crate) fn delayed(mut self, name: &str, ms: u64) -> Self {
            self.delay_ms.insert(name.to_string(), ms);
            self
        }

        pub(crate) fn queries(&self) -> Vec<String> {
            self.queries.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl GeocodingGateway for FakeGeocoder {
        async fn forward(&self, query: &str) -> Result<Vec<Coordinates>> {
            self.queries.lock().unwrap().push(query.to_string());
            if let Some(ms) = self.delay_ms.get(query) {
                tokio::time::sleep(std::time::Duration::from_millis(*ms)).await;
            }
            if self.failing.iter().any(|name| name == query) {
                return Err(MapError::Status { status: 500 });
            }
            Ok(self.places.get(query).cloned().unwrap_or_default())
        }
    }

    fn resolver(geocoder: &Arc<FakeGeocoder>) -> LocationResolver {
        LocationResolver::new(geocoder.clone())
    }

    #[tokio::test]
    async fn test_geocoded_location_is_axis_swapped() {
        let geocoder = Arc::new(FakeGeocoder::default().with_place("CafeX", &[[-73.99, 40.73]]));
        let node = OutlineNode::new("CafeX");

        let locations = resolver(&geocoder).resolve(&[&node]).await;

        assert_eq!(
            locations,
            vec![Location {
                name: "CafeX".into(),
                coordinates: Coordinates::new(40.73, -73.99),
                source_id: None,
            }]
        );
        assert_eq!(geocoder.queries(), vec!["CafeX"]);
    }

    #[tokio::test]
    async fn test_literal_coordinates_skip_network() {
        let geocoder = Arc::new(FakeGeocoder::default());
        let node = OutlineNode::new("Home #base")
            .with_id("node-7")
            .with_child(OutlineNode::new("-12.5, 130.25"));

        let locations = resolver(&geocoder).resolve(&[&node]).await;

        assert_eq!(locations.len(), 1);
        assert_eq!(locations[0].name, "Home");
        assert_eq!(locations[0].coordinates, Coordinates::new(-12.5, 130.25));
        assert_eq!(locations[0].source_id.as_deref(), Some("node-7"));
        assert!(geocoder.queries().is_empty());
    }

    #[tokio::test]
    async fn test_first_candidate_wins() {
        let geocoder = Arc::new(
            FakeGeocoder::default().with_place("Springfield", &[[-89.65, 39.8], [-72.59, 42.1]]),
        );
        let node = OutlineNode::new("Springfield");

        let locations = resolver(&geocoder).resolve(&[&node]).await;

        assert_eq!(locations[0].coordinates, Coordinates::new(39.8, -89.65));
    }

    #[tokio::test]
    async fn test_unresolvable_nodes_are_dropped_in_order() {
        let geocoder = Arc::new(
            FakeGeocoder::default()
                .with_place("A", &[[1.0, 10.0]])
                .with_place("C", &[[3.0, 30.0]])
                .failing_on("D"),
        );
        let nodes = [
            OutlineNode::new("A"),
            OutlineNode::new("B"),
            OutlineNode::new("C"),
            OutlineNode::new("D"),
            OutlineNode::new("E").with_child(OutlineNode::new("50, 5")),
        ];
        let refs: Vec<&OutlineNode> = nodes.iter().collect();

        let locations = resolver(&geocoder).resolve(&refs).await;

        let names: Vec<_> = locations.iter().map(|l| l.name.as_str()).collect();
        assert_eq!(names, vec!["A", "C", "E"]);
        assert_eq!(geocoder.queries(), vec!["A", "B", "C", "D"]);
    }

    #[tokio::test]
    async fn test_repeated_names_are_geocoded_each_time() {
        let geocoder = Arc::new(FakeGeocoder::default().with_place("Paris", &[[2.35, 48.85]]));
        let first = OutlineNode::new("Paris");
        let second = OutlineNode::new("Paris");

        let locations = resolver(&geocoder).resolve(&[&first, &second]).await;

        assert_eq!(locations.len(), 2);
        assert_eq!(geocoder.queries().len(), 2);
    }

    #[tokio::test]
    async fn test_empty_names_without_literal_are_skipped() {
        let geocoder = Arc::new(FakeGeocoder::default());
        let node = OutlineNode::new("#tag-only");

        let locations = resolver(&geocoder).resolve(&[&node]).await;

        assert!(locations.is_empty());
        assert!(geocoder.queries().is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_fan_out_preserves_input_order() {
        let geocoder = Arc::new(
            FakeGeocoder::default()
                .with_place("Slow", &[[1.0, 1.0]])
                .with_place("Fast", &[[2.0, 2.0]])
                .with_place("Faster", &[[3.0, 3.0]])
                .delayed("Slow", 50)
                .delayed("Fast", 10),
        );
        let nodes = [
            OutlineNode::new("Slow"),
            OutlineNode::new("Missing"),
            OutlineNode::new("Fast"),
            OutlineNode::new("Faster"),
        ];
        let refs: Vec<&OutlineNode> = nodes.iter().collect();

        let locations = resolver(&geocoder)
            .with_concurrency(4)
            .resolve(&refs)
            .await;

        let names: Vec<_> = locations.iter().map(|l| l.name.as_str()).collect();
        assert_eq!(names, vec!["Slow", "Fast", "Faster"]);
        assert_eq!(geocoder.queries().len(), 4);
    }

    /// Tracks how many lookups run at the same time
    #[derive(Default)]
    struct InFlightGeocoder {
        in_flight: AtomicUsize,
        max_in_flight: AtomicUsize,
    }

    #[async_trait]
    impl GeocodingGateway for InFlightGeocoder {
        async fn forward(&self, _query: &str) -> Result<Vec<Coordinates>> {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(std::time::Duration::from_millis(20)).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            Ok(vec![Coordinates::new(1.0, 2.0)])
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_fan_out_respects_concurrency_limit() {
        let geocoder = Arc::new(InFlightGeocoder::default());
        let nodes: Vec<OutlineNode> = (0..10)
            .map(|i| OutlineNode::new(format!("Place {i}")))
            .collect();
        let refs: Vec<&OutlineNode> = nodes.iter().collect();

        let locations = LocationResolver::new(geocoder.clone())
            .with_concurrency(3)
            .resolve(&refs)
            .await;

        assert_eq!(locations.len(), 10);
        let max = geocoder.max_in_flight.load(Ordering::SeqCst);
        assert!(max <= 3, "{max} lookups in flight");
        assert!(max >= 1);
    }

    #[test]
    fn test_concurrency_is_at_least_one() {
        let geocoder = Arc::new(FakeGeocoder::default());
        assert_eq!(resolver(&geocoder).with_concurrency(0).concurrency, 1);
    }

    #[test]
    fn test_coordinate_conversions() {
        let c = Coordinates::from_lon_lat([-73.99, 40.73]);
        assert_eq!(c, Coordinates::new(40.73, -73.99));
        let p: geo::Point<f64> = c.into();
        assert_eq!((p.x(), p.y()), (-73.99, 40.73));
    }
}
