//! Pure projection of a [`MapState`] into what the map widget draws

use crate::{Coordinates, Location, MapState};

/// Styling of a polyline
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PolylineStyle {
    /// sRGB color
    pub color: [u8; 3],
    /// Stroke width in screen pixels
    pub width: f32,
    /// 0.0 (transparent) to 1.0 (opaque)
    pub opacity: f32,
}

/// Fixed styling of the route line
pub const ROUTE_STYLE: PolylineStyle = PolylineStyle {
    color: [70, 130, 220],
    width: 4.0,
    opacity: 0.75,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerKind {
    /// Stop `index` (zero-based) of a route with `total` stops
    Waypoint { index: usize, total: usize },
    Place,
}

/// One marker placement
#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    pub position: Coordinates,
    pub label: String,
    pub popup: String,
    pub kind: MarkerKind,
    pub source_id: Option<String>,
}

impl Marker {
    fn new(location: &Location, kind: MarkerKind) -> Self {
        let Coordinates { lat, lon } = location.coordinates;
        let popup = match kind {
            MarkerKind::Waypoint { index, total } => format!(
                "{}\nStop {} of {}\n{:.5}, {:.5}",
                location.name,
                index + 1,
                total,
                lat,
                lon
            ),
            MarkerKind::Place => format!("{}\n{:.5}, {:.5}", location.name, lat, lon),
        };
        Self {
            position: location.coordinates,
            label: location.name.clone(),
            popup,
            kind,
            source_id: location.source_id.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Polyline {
    pub points: Vec<Coordinates>,
    pub style: PolylineStyle,
}

/// Everything to draw for one state snapshot
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MapScene {
    pub markers: Vec<Marker>,
    pub polyline: Option<Polyline>,
}

impl MapScene {
    pub fn project(state: &MapState) -> Self {
        profiling::scope!("MapScene::project");

        let route = state.route_locations();
        let total = route.len();
        let markers = route
            .iter()
            .enumerate()
            .map(|(index, location)| Marker::new(location, MarkerKind::Waypoint { index, total }))
            .chain(
                state
                    .places()
                    .iter()
                    .map(|location| Marker::new(location, MarkerKind::Place)),
            )
            .collect();

        let polyline = (!state.route().is_empty()).then(|| Polyline {
            points: state.route().to_vec(),
            style: ROUTE_STYLE,
        });

        Self { markers, polyline }
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty() && self.polyline.is_none()
    }
}
