//! Walkers plugin drawing the resolved outline on the map
//!
//! The route polyline goes first so markers stay on top of it. Hovering a marker shows its
//! popup text next to it.

use egui::{Align2, Color32, FontId, Pos2, Stroke};
use outline_map_lib::{Coordinates, MapScene, Marker, MarkerKind, PolylineStyle};
use std::sync::Arc;
use walkers::{Plugin, Projector};

const MARKER_RADIUS: f32 = 6.0;
/// Distance from a marker centre, in screen pixels, that still counts as hovering it
const HOVER_RADIUS: f32 = 10.0;
const PLACE_COLOR: Color32 = Color32::from_rgb(230, 120, 40);

/// Plugin for rendering a [`MapScene`]
pub struct ScenePlugin {
    scene: Arc<MapScene>,
}

impl ScenePlugin {
    pub fn new(scene: Arc<MapScene>) -> Self {
        Self { scene }
    }
}

/// Stroke color with the style's opacity applied
pub fn polyline_color(style: &PolylineStyle) -> Color32 {
    let [r, g, b] = style.color;
    let alpha = (style.opacity.clamp(0.0, 1.0) * 255.0).round() as u8;
    Color32::from_rgba_unmultiplied(r, g, b, alpha)
}

pub fn marker_color(kind: MarkerKind, route_style: &PolylineStyle) -> Color32 {
    match kind {
        MarkerKind::Waypoint { .. } => {
            let [r, g, b] = route_style.color;
            Color32::from_rgb(r, g, b)
        }
        MarkerKind::Place => PLACE_COLOR,
    }
}

/// Index of the marker closest to `pointer`, if any is within [`HOVER_RADIUS`]
pub fn hovered_marker(screen_positions: &[Pos2], pointer: Pos2) -> Option<usize> {
    screen_positions
        .iter()
        .enumerate()
        .map(|(index, pos)| (index, pos.distance(pointer)))
        .filter(|(_, distance)| *distance <= HOVER_RADIUS)
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(index, _)| index)
}

fn to_screen(projector: &Projector, position: Coordinates) -> Pos2 {
    let screen_vec = projector.project(walkers::lat_lon(position.lat, position.lon));
    Pos2::new(screen_vec.x, screen_vec.y)
}

fn draw_popup(painter: &egui::Painter, anchor: Pos2, marker: &Marker) {
    let galley = painter.layout_no_wrap(
        marker.popup.clone(),
        FontId::proportional(13.0),
        Color32::from_gray(20),
    );
    let margin = egui::vec2(6.0, 4.0);
    let top_left = anchor + egui::vec2(MARKER_RADIUS + 4.0, -galley.size().y - MARKER_RADIUS);
    let rect = egui::Rect::from_min_size(top_left, galley.size() + 2.0 * margin);

    painter.rect_filled(rect, 4.0, Color32::from_white_alpha(235));
    painter.rect_stroke(
        rect,
        4.0,
        Stroke::new(1.0, Color32::from_gray(120)),
        egui::StrokeKind::Inside,
    );
    painter.galley(rect.min + margin, galley, Color32::from_gray(20));
}

impl Plugin for ScenePlugin {
    fn run(
        self: Box<Self>,
        ui: &mut egui::Ui,
        response: &egui::Response,
        projector: &Projector,
        _map_memory: &walkers::MapMemory,
    ) {
        profiling::scope!("ScenePlugin::run");

        let painter = ui.painter();
        let route_style = outline_map_lib::ROUTE_STYLE;

        if let Some(polyline) = &self.scene.polyline {
            let points: Vec<Pos2> = polyline
                .points
                .iter()
                .map(|&point| to_screen(projector, point))
                .collect();
            if points.len() >= 2 {
                let stroke = Stroke::new(polyline.style.width, polyline_color(&polyline.style));
                painter.add(egui::Shape::line(points, stroke));
            }
        }

        let positions: Vec<Pos2> = self
            .scene
            .markers
            .iter()
            .map(|marker| to_screen(projector, marker.position))
            .collect();

        for (marker, &pos) in self.scene.markers.iter().zip(&positions) {
            painter.circle(
                pos,
                MARKER_RADIUS,
                marker_color(marker.kind, &route_style),
                Stroke::new(1.5, Color32::WHITE),
            );
            if let MarkerKind::Waypoint { index, .. } = marker.kind {
                painter.text(
                    pos,
                    Align2::CENTER_CENTER,
                    (index + 1).to_string(),
                    FontId::proportional(8.0),
                    Color32::WHITE,
                );
            }
            painter.text(
                pos + egui::vec2(MARKER_RADIUS + 3.0, 0.0),
                Align2::LEFT_CENTER,
                &marker.label,
                FontId::proportional(12.0),
                Color32::from_black_alpha(200),
            );
        }

        if let Some(pointer) = response.hover_pos()
            && let Some(index) = hovered_marker(&positions, pointer)
        {
            draw_popup(painter, positions[index], &self.scene.markers[index]);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use outline_map_lib::ROUTE_STYLE;

    #[test]
    fn test_polyline_color_applies_opacity() {
        let color = polyline_color(&ROUTE_STYLE);
        assert_eq!(color.a(), 191);

        let opaque = PolylineStyle {
            opacity: 1.0,
            ..ROUTE_STYLE
        };
        assert_eq!(polyline_color(&opaque), Color32::from_rgb(70, 130, 220));
    }

    #[test]
    fn test_marker_colors() {
        let waypoint = MarkerKind::Waypoint { index: 0, total: 2 };
        assert_eq!(
            marker_color(waypoint, &ROUTE_STYLE),
            Color32::from_rgb(70, 130, 220)
        );
        assert_eq!(marker_color(MarkerKind::Place, &ROUTE_STYLE), PLACE_COLOR);
    }

    #[test]
    fn test_hovered_marker_picks_closest_in_range() {
        let positions = [
            Pos2::new(100.0, 100.0),
            Pos2::new(106.0, 100.0),
            Pos2::new(300.0, 300.0),
        ];
        assert_eq!(hovered_marker(&positions, Pos2::new(104.0, 100.0)), Some(1));
        assert_eq!(hovered_marker(&positions, Pos2::new(98.0, 101.0)), Some(0));
        assert_eq!(hovered_marker(&positions, Pos2::new(200.0, 200.0)), None);
        assert_eq!(hovered_marker(&[], Pos2::ZERO), None);
    }
}
