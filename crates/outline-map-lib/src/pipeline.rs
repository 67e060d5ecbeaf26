//! One resolution run: locations, then route, applied to a shared [`MapState`]

use crate::{
    DirectionsGateway, Generation, GeocodingGateway, LocationResolver, MapState, MapboxClient,
    OutlineTree, Phase, ResolutionStats, RouteResolver, ServiceConfig,
};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Location and route resolvers bound to their gateways
#[derive(Clone)]
pub struct Pipeline {
    locations: LocationResolver,
    route: RouteResolver,
}

impl Pipeline {
    pub fn new(
        geocoder: Arc<dyn GeocodingGateway>,
        directions: Arc<dyn DirectionsGateway>,
    ) -> Self {
        Self {
            locations: LocationResolver::new(geocoder),
            route: RouteResolver::new(directions),
        }
    }

    /// Pipeline backed by one [`MapboxClient`] for both services
    pub fn from_config(config: ServiceConfig) -> Self {
        let concurrency = config.lookup_concurrency;
        let client = Arc::new(MapboxClient::new(config));
        Self::new(client.clone(), client).with_concurrency(concurrency)
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.locations = self.locations.with_concurrency(concurrency);
        self
    }

    /// Set `tree` as the new input and resolve it
    ///
    /// Returns `None` when `tree` is already the current input or a newer input arrived while
    /// this run was in flight.
    pub async fn update(&self, store: &RwLock<MapState>, tree: Arc<OutlineTree>) -> Option<Phase> {
        let generation = store.write().await.set_input(tree.clone())?;
        self.run(store, generation, &tree).await
    }

    /// Resolve `tree` for `generation`, applying each stage only while it is still current
    pub async fn run(
        &self,
        store: &RwLock<MapState>,
        generation: Generation,
        tree: &OutlineTree,
    ) -> Option<Phase> {
        if !store.write().await.begin_locations(generation) {
            return None;
        }
        tracing::info!("Resolving outline for generation {}", generation.value());

        let route_nodes = tree.route_nodes();
        let place_nodes = tree.place_nodes();
        let route_locations = self.locations.resolve(&route_nodes).await;
        let places = self.locations.resolve(&place_nodes).await;

        let stats = ResolutionStats {
            requested: route_nodes.len() + place_nodes.len(),
            resolved: route_locations.len() + places.len(),
        };
        if stats.dropped() > 0 {
            tracing::info!(
                "{} of {} locations resolved",
                stats.resolved,
                stats.requested
            );
        }

        let waypoints = route_locations.clone();
        let phase = {
            let mut state = store.write().await;
            if !state.apply_locations(generation, route_locations, places, stats) {
                return None;
            }
            state.phase()
        };
        if phase != Phase::ResolvingRoute {
            return Some(phase);
        }

        let route = self.route.resolve(&waypoints).await;
        let mut state = store.write().await;
        state
            .apply_route(generation, route)
            .then(|| state.phase())
    }
}
