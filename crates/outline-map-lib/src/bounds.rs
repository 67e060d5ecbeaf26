//! Bounding region of markers and route points, and the viewport fit derived from it

use crate::{Coordinates, utils};
use geo::{Coord, Rect};

/// Screen padding kept around fitted bounds, in pixels (horizontal, vertical)
pub const FIT_PADDING: [f32; 2] = [50.0, 50.0];

/// Zoom used when all points coincide
pub const SINGLE_POINT_ZOOM: f64 = 15.0;
pub const MIN_FIT_ZOOM: f64 = 1.0;
pub const MAX_FIT_ZOOM: f64 = 18.0;

/// Smallest latitude/longitude rectangle containing a set of points
///
/// Stored as a [`geo::Rect`] with `x = longitude` and `y = latitude`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    rect: Rect<f64>,
}

impl Bounds {
    pub fn from_point(point: Coordinates) -> Self {
        let coord: Coord<f64> = point.into();
        Self {
            rect: Rect::new(coord, coord),
        }
    }

    /// Bounds of all `points`, or `None` if there are none
    pub fn from_points<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = Coordinates>,
    {
        points.into_iter().fold(None, |bounds, point| match bounds {
            Some(mut bounds) => {
                bounds.extend(point);
                Some(bounds)
            }
            None => Some(Self::from_point(point)),
        })
    }

    /// Grow to include `point`
    pub fn extend(&mut self, point: Coordinates) {
        self.rect = Rect::new(
            Coord {
                x: self.rect.min().x.min(point.lon),
                y: self.rect.min().y.min(point.lat),
            },
            Coord {
                x: self.rect.max().x.max(point.lon),
                y: self.rect.max().y.max(point.lat),
            },
        );
    }

    pub fn union(mut self, other: Bounds) -> Bounds {
        self.extend(other.south_west());
        self.extend(other.north_east());
        self
    }

    pub fn min_lat(&self) -> f64 {
        self.rect.min().y
    }

    pub fn min_lon(&self) -> f64 {
        self.rect.min().x
    }

    pub fn max_lat(&self) -> f64 {
        self.rect.max().y
    }

    pub fn max_lon(&self) -> f64 {
        self.rect.max().x
    }

    pub fn south_west(&self) -> Coordinates {
        Coordinates::new(self.min_lat(), self.min_lon())
    }

    pub fn north_east(&self) -> Coordinates {
        Coordinates::new(self.max_lat(), self.max_lon())
    }
}

/// Request to fit the map viewport to `bounds`, keeping `padding` pixels free on every side
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitRequest {
    pub bounds: Bounds,
    pub padding: [f32; 2],
}

impl FitRequest {
    /// Fit request over all `points` with [`FIT_PADDING`], `None` if there are none
    pub fn for_points<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = Coordinates>,
    {
        Bounds::from_points(points).map(|bounds| Self {
            bounds,
            padding: FIT_PADDING,
        })
    }

    pub fn view(&self, viewport: [f32; 2]) -> FitView {
        fit_view(&self.bounds, viewport, self.padding)
    }
}

/// Map camera that shows some bounds
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitView {
    pub center: Coordinates,
    pub zoom: f64,
}

/// Centre and largest zoom at which `bounds` fit into `viewport` minus `padding`
pub fn fit_view(bounds: &Bounds, viewport: [f32; 2], padding: [f32; 2]) -> FitView {
    profiling::scope!("fit_view");

    let min = utils::wgs84_to_mercator(bounds.min_lat(), bounds.min_lon());
    let max = utils::wgs84_to_mercator(bounds.max_lat(), bounds.max_lon());
    let (center_lat, center_lon) =
        utils::mercator_to_wgs84((min.x() + max.x()) / 2.0, (min.y() + max.y()) / 2.0);

    let available_x = f64::from(viewport[0] - 2.0 * padding[0]).max(1.0);
    let available_y = f64::from(viewport[1] - 2.0 * padding[1]).max(1.0);

    let zoom_for = |span: f64, available: f64| {
        (span > 0.0).then(|| {
            (available * utils::EARTH_SIZE_METERS / (utils::TILE_SIZE_PIXELS * span)).log2()
        })
    };

    let zoom = match (
        zoom_for(max.x() - min.x(), available_x),
        zoom_for(max.y() - min.y(), available_y),
    ) {
        (Some(x), Some(y)) => x.min(y),
        (Some(z), None) | (None, Some(z)) => z,
        (None, None) => SINGLE_POINT_ZOOM,
    }
    .clamp(MIN_FIT_ZOOM, MAX_FIT_ZOOM);

    tracing::trace!(
        "Fit ({:.4}, {:.4}) - ({:.4}, {:.4}) into {:?}: zoom {:.2}",
        bounds.min_lat(),
        bounds.min_lon(),
        bounds.max_lat(),
        bounds.max_lon(),
        viewport,
        zoom
    );

    FitView {
        center: Coordinates::new(center_lat, center_lon),
        zoom,
    }
}
