//! Render state store
//!
//! Every input change bumps the [`Generation`]. Resolution results are applied only when they
//! carry the current generation, so a slow run for a superseded outline can never overwrite the
//! state of the latest one.

use crate::{Coordinates, FitRequest, Location, MapScene, OutlineTree};
use std::sync::Arc;

/// Identity of one input; increases by one on every input change
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Generation(u64);

impl Generation {
    pub fn value(self) -> u64 {
        self.0
    }

    fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

/// Progress of the resolution run for the current input
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Phase {
    #[default]
    Idle,
    ResolvingLocations,
    ResolvingRoute,
    Ready,
}

impl Phase {
    pub fn is_busy(self) -> bool {
        matches!(self, Self::ResolvingLocations | Self::ResolvingRoute)
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Idle => "Idle",
            Self::ResolvingLocations => "Resolving places…",
            Self::ResolvingRoute => "Fetching route…",
            Self::Ready => "Ready",
        }
    }
}

/// How many location nodes were found and how many got coordinates
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolutionStats {
    pub requested: usize,
    pub resolved: usize,
}

impl ResolutionStats {
    pub fn dropped(&self) -> usize {
        self.requested.saturating_sub(self.resolved)
    }
}

/// Latest resolution results for the current input
#[derive(Debug, Default)]
pub struct MapState {
    generation: Generation,
    input: Option<Arc<OutlineTree>>,
    phase: Phase,
    route_locations: Vec<Location>,
    places: Vec<Location>,
    route: Vec<Coordinates>,
    stats: ResolutionStats,
    /// Fit command waiting to be taken by the map widget
    pending_fit: Option<FitRequest>,
}

impl MapState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn input(&self) -> Option<&Arc<OutlineTree>> {
        self.input.as_ref()
    }

    pub fn route_locations(&self) -> &[Location] {
        &self.route_locations
    }

    pub fn places(&self) -> &[Location] {
        &self.places
    }

    pub fn route(&self) -> &[Coordinates] {
        &self.route
    }

    pub fn stats(&self) -> ResolutionStats {
        self.stats
    }

    /// Route locations followed by standalone places
    pub fn markers(&self) -> impl Iterator<Item = &Location> {
        self.route_locations.iter().chain(self.places.iter())
    }

    pub fn is_current(&self, generation: Generation) -> bool {
        self.generation == generation
    }

    /// Replace the input, discarding all results of the previous one
    ///
    /// Returns the new generation, or `None` if `tree` is the input already being shown.
    pub fn set_input(&mut self, tree: Arc<OutlineTree>) -> Option<Generation> {
        if self
            .input
            .as_ref()
            .is_some_and(|current| Arc::ptr_eq(current, &tree))
        {
            return None;
        }

        self.generation = self.generation.next();
        self.input = Some(tree);
        self.phase = Phase::Idle;
        self.route_locations.clear();
        self.places.clear();
        self.route.clear();
        self.stats = ResolutionStats::default();
        self.pending_fit = None;

        tracing::debug!("Input changed, now at generation {}", self.generation.0);
        Some(self.generation)
    }

    pub fn begin_locations(&mut self, generation: Generation) -> bool {
        if !self.accepts(generation, "start") {
            return false;
        }
        self.phase = Phase::ResolvingLocations;
        true
    }

    /// Store resolved locations; moves on to the route phase when there are enough waypoints
    pub fn apply_locations(
        &mut self,
        generation: Generation,
        route_locations: Vec<Location>,
        places: Vec<Location>,
        stats: ResolutionStats,
    ) -> bool {
        if !self.accepts(generation, "locations") {
            return false;
        }
        self.phase = if route_locations.len() >= crate::RouteResolver::MIN_WAYPOINTS {
            Phase::ResolvingRoute
        } else {
            Phase::Ready
        };
        self.route_locations = route_locations;
        self.places = places;
        self.stats = stats;
        self.refresh_fit();
        true
    }

    pub fn apply_route(&mut self, generation: Generation, route: Vec<Coordinates>) -> bool {
        if !self.accepts(generation, "route") {
            return false;
        }
        self.route = route;
        self.phase = Phase::Ready;
        self.refresh_fit();
        true
    }

    fn accepts(&self, generation: Generation, what: &str) -> bool {
        let current = self.is_current(generation);
        if !current {
            tracing::debug!(
                "Discarding stale {} of generation {} (current is {})",
                what,
                generation.0,
                self.generation.0
            );
        }
        current
    }

    /// Every point the viewport should cover: markers and route geometry
    pub fn points(&self) -> impl Iterator<Item = Coordinates> + '_ {
        self.markers()
            .map(|location| location.coordinates)
            .chain(self.route.iter().copied())
    }

    /// Fit request over the current points, without consuming the pending one
    pub fn fit_request(&self) -> Option<FitRequest> {
        FitRequest::for_points(self.points())
    }

    fn refresh_fit(&mut self) {
        if let Some(request) = self.fit_request() {
            self.pending_fit = Some(request);
        }
    }

    /// Take the fit command issued by the last state change, if any
    pub fn take_fit_request(&mut self) -> Option<FitRequest> {
        self.pending_fit.take()
    }

    /// Declarative scene for the current state
    pub fn scene(&self) -> MapScene {
        MapScene::project(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn location(name: &str, lat: f64, lon: f64) -> Location {
        Location {
            name: name.into(),
            coordinates: Coordinates::new(lat, lon),
            source_id: None,
        }
    }

    #[test]
    fn test_same_input_is_not_restarted() {
        let mut state = MapState::new();
        let tree = Arc::new(OutlineTree::default());

        let first = state.set_input(tree.clone()).unwrap();
        assert_eq!(first.value(), 1);
        assert!(state.set_input(tree).is_none());

        let second = state.set_input(Arc::new(OutlineTree::default())).unwrap();
        assert!(second > first);
        assert_eq!(state.generation(), second);
    }

    #[test]
    fn test_phase_transitions() {
        let mut state = MapState::new();
        assert_eq!(state.phase(), Phase::Idle);
        let generation = state.set_input(Arc::new(OutlineTree::default())).unwrap();

        assert!(state.begin_locations(generation));
        assert_eq!(state.phase(), Phase::ResolvingLocations);
        assert!(state.phase().is_busy());

        let stats = ResolutionStats {
            requested: 3,
            resolved: 2,
        };
        assert!(state.apply_locations(
            generation,
            vec![location("A", 1.0, 1.0), location("B", 2.0, 2.0)],
            vec![],
            stats,
        ));
        assert_eq!(state.phase(), Phase::ResolvingRoute);
        assert_eq!(state.stats().dropped(), 1);

        assert!(state.apply_route(generation, vec![Coordinates::new(1.5, 1.5)]));
        assert_eq!(state.phase(), Phase::Ready);
    }

    #[test]
    fn test_single_waypoint_goes_straight_to_ready() {
        let mut state = MapState::new();
        let generation = state.set_input(Arc::new(OutlineTree::default())).unwrap();
        state.begin_locations(generation);
        state.apply_locations(
            generation,
            vec![location("A", 1.0, 1.0)],
            vec![location("P", 3.0, 3.0)],
            ResolutionStats::default(),
        );
        assert_eq!(state.phase(), Phase::Ready);
        let names: Vec<_> = state.markers().map(|l| l.name.as_str()).collect();
        assert_eq!(names, vec!["A", "P"]);
    }

    #[test]
    fn test_stale_results_are_discarded() {
        let mut state = MapState::new();
        let old = state.set_input(Arc::new(OutlineTree::default())).unwrap();
        state.begin_locations(old);
        let new = state.set_input(Arc::new(OutlineTree::default())).unwrap();
        state.begin_locations(new);

        assert!(state.apply_locations(
            new,
            vec![location("New", 5.0, 5.0)],
            vec![],
            ResolutionStats::default(),
        ));
        assert!(!state.apply_locations(
            old,
            vec![location("Old", 1.0, 1.0)],
            vec![],
            ResolutionStats::default(),
        ));
        assert!(!state.apply_route(old, vec![Coordinates::new(0.0, 0.0)]));
        assert!(!state.begin_locations(old));

        assert_eq!(state.route_locations()[0].name, "New");
        assert!(state.route().is_empty());
        assert_eq!(state.phase(), Phase::Ready);
    }

    #[test]
    fn test_input_change_discards_results() {
        let mut state = MapState::new();
        let generation = state.set_input(Arc::new(OutlineTree::default())).unwrap();
        state.apply_locations(
            generation,
            vec![],
            vec![location("P", 3.0, 3.0)],
            ResolutionStats::default(),
        );
        assert!(state.take_fit_request().is_some());

        state.set_input(Arc::new(OutlineTree::default()));
        assert_eq!(state.markers().count(), 0);
        assert_eq!(state.phase(), Phase::Idle);
        assert!(state.take_fit_request().is_none());
        assert!(state.fit_request().is_none());
    }

    #[test]
    fn test_fit_request_covers_markers_and_route() {
        let mut state = MapState::new();
        let generation = state.set_input(Arc::new(OutlineTree::default())).unwrap();
        state.apply_locations(
            generation,
            vec![location("A", 40.7, -74.0), location("B", 40.8, -73.9)],
            vec![],
            ResolutionStats::default(),
        );
        state.take_fit_request();

        state.apply_route(
            generation,
            vec![
                Coordinates::new(40.7, -74.0),
                Coordinates::new(40.95, -74.2),
                Coordinates::new(40.8, -73.9),
            ],
        );
        let request = state.take_fit_request().unwrap();
        assert_eq!(request.bounds.max_lat(), 40.95);
        assert_eq!(request.bounds.min_lon(), -74.2);
        assert!(state.take_fit_request().is_none());
    }

    #[test]
    fn test_nothing_resolved_issues_no_fit() {
        let mut state = MapState::new();
        let generation = state.set_input(Arc::new(OutlineTree::default())).unwrap();
        state.apply_locations(generation, vec![], vec![], ResolutionStats::default());
        assert_eq!(state.phase(), Phase::Ready);
        assert!(state.take_fit_request().is_none());
        assert!(state.scene().is_empty());
    }
}
