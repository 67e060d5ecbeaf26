//! Native entry points for egui/eframe applications
//!
//! This crate provides the reusable startup path of a desktop egui application: a Tokio
//! runtime that outlives the event loop (so the app can spawn network work from `update`),
//! tracing-based logging, and CLI parsing with environment fallbacks.
//!
//! # Usage
//!
//! In your application's `lib.rs`:
//!
//! ```ignore
//! eframe_entrypoints::eframe_app!("My App Name", |cc| Box::new(MyApp::new(cc)));
//! ```
//!
//! In your `main.rs`:
//!
//! ```ignore
//! fn main() {
//!     my_app::run_native();
//! }
//! ```

pub mod async_runtime;
pub mod cli;
pub mod logging;

// Re-export commonly used types
pub use cli::parse_args;
pub use logging::setup_logging;

// Re-export eframe types commonly needed for app creation
pub use eframe;
pub use eframe::CreationContext;

/// Define the native entry point of an eframe application.
///
/// # Arguments
///
/// * `$app_name` - A string literal with the application name (window title, logging)
/// * `$app_creator` - A closure that takes `&CreationContext` and returns `Box<dyn eframe::App>`
///
/// Generates `pub fn run_native()`, to be called from `main.rs`.
#[macro_export]
macro_rules! eframe_app {
    ($app_name:expr, $app_creator:expr) => {
        /// Run the application on native (desktop) platforms.
        pub fn run_native() {
            let rt = ::tokio::runtime::Builder::new_multi_thread()
                .enable_all()
                .build()
                .expect("Failed to create Tokio runtime");

            rt.block_on(async {
                $crate::native_main_impl($app_name, $app_creator).await;
            });
        }
    };
}

/// Internal implementation for the native entry point.
/// Use the `eframe_app!` macro instead of calling this directly.
#[doc(hidden)]
pub async fn native_main_impl(
    app_name: &str,
    app_creator: impl FnOnce(&eframe::CreationContext<'_>) -> Box<dyn eframe::App>,
) {
    // Must run before anything logs, the subscriber is global
    setup_logging();

    tracing::info!("Starting {} {}", app_name, env!("CARGO_PKG_VERSION"));

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 720.0])
            .with_title(app_name),
        ..Default::default()
    };

    if let Err(err) = eframe::run_native(
        app_name,
        native_options,
        Box::new(move |cc| Ok(app_creator(cc))),
    ) {
        tracing::error!("{} exited with an error: {}", app_name, err);
    }
}
