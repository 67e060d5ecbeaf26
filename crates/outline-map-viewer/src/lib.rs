//! Outline Map - Application Library
//!
//! Ties the outline pipeline from `outline-map-lib` to a walkers map inside an eframe window.

mod app;

pub use app::OutlineMapApp;

eframe_entrypoints::eframe_app!("Outline Map", |cc| Box::new(OutlineMapApp::new(cc)));
