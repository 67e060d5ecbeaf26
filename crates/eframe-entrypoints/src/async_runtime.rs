//! Async runtime helpers for code running inside the eframe event loop
//!
//! `update` runs on the thread that entered the Tokio runtime in `run_native`, so tasks can be
//! spawned from UI code directly; the UI side then polls shared state with `try_read` /
//! `try_write` and never blocks a frame on a lock.

pub use tokio::sync::RwLock;

/// Spawn an async task on the application runtime.
pub fn spawn<F>(future: F) -> tokio::task::JoinHandle<F::Output>
where
    F: std::future::Future + Send + 'static,
    F::Output: Send + 'static,
{
    tracing::trace!("Spawning {}", std::any::type_name::<F>());
    tokio::spawn(future)
}

/// Check if we're running inside a tokio runtime context.
pub fn in_runtime_context() -> bool {
    tokio::runtime::Handle::try_current().is_ok()
}
