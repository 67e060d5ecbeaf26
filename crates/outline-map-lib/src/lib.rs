//! Outline Map Library - Resolution pipeline for outline-driven maps
//!
//! This library turns a small outline tree (nested text nodes) into everything a map widget needs
//! to draw a trip: resolved place markers, a driving route geometry and a viewport to fit.
//!
//! # Architecture
//!
//! - **[`OutlineTree`]**: Read-only input, with `ROUTE` and `PLACES` marker sections
//! - **[`LocationResolver`]**: Literal coordinates or one geocoding lookup per node
//! - **[`RouteResolver`]**: One directions request over the ordered waypoints
//! - **[`Bounds`]**: Order-independent bounding region plus the padded [`FitRequest`]
//! - **[`MapState`]**: Generation-tagged store, so results of superseded inputs are dropped
//! - **[`MapScene`]**: Pure projection of the store into markers and a polyline
//! - **[`Pipeline`]**: Drives one resolution run against a shared store
//!
//! Network failures never escape the resolvers: an unresolvable place is simply missing from the
//! result and a failed route is an empty polyline.

mod bounds;
mod gateway;
mod location;
pub mod mapbox;
mod outline;
mod pipeline;
mod render;
mod route;
mod state;
pub mod utils;

// Public API exports
pub use bounds::{Bounds, FIT_PADDING, FitRequest, FitView, fit_view};
pub use gateway::{DirectionsGateway, GeocodingGateway};
pub use location::{Coordinates, Location, LocationResolver};
pub use mapbox::{MapboxClient, ServiceConfig};
pub use outline::{OutlineNode, OutlineTree, Section, SectionKind, parse_literal_coordinates, strip_tags};
pub use pipeline::Pipeline;
pub use render::{MapScene, Marker, MarkerKind, Polyline, PolylineStyle, ROUTE_STYLE};
pub use route::RouteResolver;
pub use state::{Generation, MapState, Phase, ResolutionStats};

/// Error types for the resolution pipeline
#[derive(Debug, thiserror::Error)]
pub enum MapError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Service responded with status {status}")]
    Status { status: u16 },

    #[error("Unexpected response body: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("Directions service returned code {code:?}")]
    NoRoute { code: String },

    #[error("Route geometry is empty")]
    EmptyGeometry,

    #[error("Invalid outline: {0}")]
    Outline(#[source] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, MapError>;
