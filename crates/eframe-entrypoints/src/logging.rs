//! Logging setup
//!
//! One global `tracing` subscriber: a `fmt` layer filtered by `RUST_LOG`. When `RUST_LOG` is not
//! set, a default filter keeps the application at `debug` (debug builds) or `info` (release)
//! while quieting the windowing, tile and HTTP crates.

use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;

const DEBUG_FILTER: &str = "debug,eframe=warn,egui::context=warn,walkers=info,hyper_util=info,reqwest::connect=info,rustls=info";
const RELEASE_FILTER: &str = "info,eframe=warn,egui::context=warn";

/// Filter used when `RUST_LOG` is unset
pub fn default_filter() -> &'static str {
    if cfg!(debug_assertions) {
        DEBUG_FILTER
    } else {
        RELEASE_FILTER
    }
}

/// Install the global subscriber; later calls are ignored
pub fn setup_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter()));
    let from_env = std::env::var("RUST_LOG").is_ok();

    let registry = tracing_subscriber::registry().with(fmt::layer().with_filter(filter));
    if registry.try_init().is_err() {
        tracing::debug!("Logging was already initialized");
        return;
    }

    if !from_env {
        tracing::info!("RUST_LOG not set, using default filter: {}", default_filter());
    }
}
