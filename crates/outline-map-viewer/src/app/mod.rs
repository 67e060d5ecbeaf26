//! Application module
//!
//! A full-screen map showing the ROUTE and PLACES of one outline file:
//! - The outline is reloaded when the file changes on disk (or on `F5`)
//! - The view fits the markers and route whenever new results arrive (or on `F`)
//! - `Ctrl+O` picks another outline file

mod plugin;
pub(crate) mod settings;
mod state;

use crate::app::plugin::ScenePlugin;
use crate::app::settings::Settings;
use crate::app::state::AppState;
use eframe::egui;
use outline_map_lib::FitRequest;
use walkers::{HttpTiles, Map, MapMemory, sources::OpenStreetMap};

/// Main application structure
pub struct OutlineMapApp {
    /// Outline file, shared map state and the last snapshot drawn
    state: AppState,

    tiles: HttpTiles,

    /// Map camera (position, zoom)
    map_memory: MapMemory,

    /// Fit waiting for the map's screen size to be known
    pending_fit: Option<FitRequest>,
}

impl OutlineMapApp {
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        let settings = Settings::from_cli();
        let mut state = AppState::new(&settings);

        match state.outline.path() {
            Some(path) => tracing::info!("Showing outline {}", path.display()),
            None => tracing::info!("No outline given, press Ctrl+O to open one"),
        }
        state.reload(&cc.egui_ctx, true);

        Self {
            state,
            tiles: HttpTiles::new(OpenStreetMap, cc.egui_ctx.clone()),
            map_memory: MapMemory::default(),
            pending_fit: None,
        }
    }

    /// Move the camera so `request` fits a map of `viewport` pixels
    fn fit_to_bounds(&mut self, request: FitRequest, viewport: egui::Vec2) {
        let view = request.view([viewport.x, viewport.y]);
        self.map_memory
            .center_at(walkers::lat_lon(view.center.lat, view.center.lon));
        let _ = self.map_memory.set_zoom(view.zoom);

        tracing::trace!(
            "Fitted bounds ({:.4}, {:.4}) - ({:.4}, {:.4}) at zoom {:.2}",
            request.bounds.min_lat(),
            request.bounds.min_lon(),
            request.bounds.max_lat(),
            request.bounds.max_lon(),
            view.zoom
        );
    }

    fn pick_outline_file(&mut self, ctx: &egui::Context) {
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("Outline", &["json"])
            .set_title("Open outline")
            .pick_file()
        {
            self.state.open(ctx, path);
        }
    }

    fn status_overlay(&self, ui: &mut egui::Ui) {
        let snapshot = &self.state.snapshot;
        let has_status = snapshot.phase.is_busy()
            || self.state.load_error.is_some()
            || self.state.show_stats;
        if !has_status {
            return;
        }

        egui::Area::new(egui::Id::new("status_overlay"))
            .anchor(egui::Align2::LEFT_TOP, egui::vec2(10.0, 10.0))
            .show(ui.ctx(), |ui| {
                egui::Frame::popup(ui.style()).show(ui, |ui| {
                    if snapshot.phase.is_busy() {
                        ui.horizontal(|ui| {
                            ui.spinner();
                            ui.label(snapshot.phase.label());
                        });
                    }
                    if let Some(err) = &self.state.load_error {
                        ui.colored_label(ui.visuals().error_fg_color, format!("⚠ {err}"));
                    }
                    if self.state.show_stats {
                        ui.label(format!(
                            "{} of {} locations resolved",
                            snapshot.stats.resolved, snapshot.stats.requested
                        ));
                        ui.label(format!(
                            "{} markers, {} route points",
                            snapshot.scene.markers.len(),
                            snapshot
                                .scene
                                .polyline
                                .as_ref()
                                .map_or(0, |line| line.points.len())
                        ));
                        ui.label(format!("Generation {}", snapshot.generation.value()));
                    }
                });
            });
    }
}

impl eframe::App for OutlineMapApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        profiling::finish_frame!();

        let (reload, refit, open) = ctx.input(|i| {
            (
                i.key_pressed(egui::Key::F5),
                i.key_pressed(egui::Key::F) && !i.modifiers.any(),
                i.key_pressed(egui::Key::O) && i.modifiers.command,
            )
        });
        if reload {
            self.state.reload(ctx, true);
        }
        if open {
            self.pick_outline_file(ctx);
        }
        self.state.poll_file_changes(ctx);

        if let Some(request) = self.state.sync() {
            self.pending_fit = Some(request);
        }
        if refit {
            self.pending_fit = self.state.current_fit().or(self.pending_fit);
        }

        if self.state.snapshot.phase.is_busy() {
            ctx.request_repaint_after(std::time::Duration::from_millis(100));
        }
        if let Some(interval) = self.state.outline.watch_interval() {
            ctx.request_repaint_after(interval);
        }

        egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| {
                profiling::scope!("map_panel");

                let viewport = ui.available_size();
                if let Some(request) = self.pending_fit.take() {
                    self.fit_to_bounds(request, viewport);
                }

                let plugin = ScenePlugin::new(self.state.snapshot.scene.clone());
                let map = Map::new(
                    Some(&mut self.tiles),
                    &mut self.map_memory,
                    walkers::lat_lon(0.0, 0.0),
                )
                .with_plugin(plugin);
                ui.add(map);

                self.status_overlay(ui);

                let painter = ui.painter();
                let screen_rect = ui.max_rect();
                painter.text(
                    screen_rect.center_bottom() + egui::vec2(0.0, -5.0),
                    egui::Align2::CENTER_BOTTOM,
                    "© OpenStreetMap contributors",
                    egui::FontId::proportional(10.0),
                    egui::Color32::from_black_alpha(180),
                );
            });
    }
}
