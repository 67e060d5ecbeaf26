//! Application state: the outline file being shown and the map state it resolves into

use crate::app::settings::Settings;
use eframe_entrypoints::async_runtime::{self, RwLock};
use instant::Instant;
use outline_map_lib::{
    FitRequest, Generation, MapError, MapScene, MapState, OutlineTree, Phase, Pipeline,
    ResolutionStats,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, SystemTime};

/// The outline file on disk and the tree last parsed from it
#[derive(Debug, Default)]
pub struct OutlineFile {
    path: Option<PathBuf>,
    watch_interval: Option<Duration>,
    last_modified: Option<SystemTime>,
    last_checked: Option<Instant>,
    current: Option<Arc<OutlineTree>>,
}

impl OutlineFile {
    pub fn new(path: Option<PathBuf>, watch_interval: Option<Duration>) -> Self {
        Self {
            path,
            watch_interval,
            ..Default::default()
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Polling period, `None` when watching is disabled or there is no file
    pub fn watch_interval(&self) -> Option<Duration> {
        self.path.as_ref().and(self.watch_interval)
    }

    /// Switch to another file; the next [`load`](Self::load) reads it unconditionally
    pub fn set_path(&mut self, path: PathBuf) {
        self.path = Some(path);
        self.last_modified = None;
        self.last_checked = None;
        self.current = None;
    }

    fn modified(&self) -> Option<SystemTime> {
        let path = self.path.as_ref()?;
        std::fs::metadata(path).and_then(|m| m.modified()).ok()
    }

    /// Whether the watch interval elapsed and the file's mtime moved since the last load
    pub fn changed_on_disk(&mut self, now: Instant) -> bool {
        let Some(interval) = self.watch_interval else {
            return false;
        };
        if self.path.is_none() {
            return false;
        }
        if let Some(checked) = self.last_checked
            && now.saturating_duration_since(checked) < interval
        {
            return false;
        }
        self.last_checked = Some(now);

        match self.modified() {
            Some(modified) => self.last_modified != Some(modified),
            None => false,
        }
    }

    /// Parse the file into a new tree
    ///
    /// Returns `Ok(None)` when the content is unchanged and `force` is false, so an edit that
    /// only touched the mtime does not start a new run.
    pub fn load(&mut self, force: bool) -> Result<Option<Arc<OutlineTree>>, MapError> {
        let Some(path) = self.path.clone() else {
            return Ok(None);
        };
        self.last_modified = self.modified();
        let tree = OutlineTree::from_json_file(&path)?;

        if !force && self.current.as_deref() == Some(&tree) {
            tracing::debug!("Outline {} unchanged", path.display());
            return Ok(None);
        }

        let tree = Arc::new(tree);
        self.current = Some(tree.clone());
        Ok(Some(tree))
    }
}

/// What the UI draws this frame, copied out of the shared [`MapState`]
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    pub generation: Generation,
    pub phase: Phase,
    pub stats: ResolutionStats,
    pub scene: Arc<MapScene>,
}

/// Main application state
pub struct AppState {
    /// Shared with the resolution tasks
    pub store: Arc<RwLock<MapState>>,
    pipeline: Pipeline,
    pub outline: OutlineFile,
    pub load_error: Option<String>,
    pub snapshot: Snapshot,
    pub show_stats: bool,
}

impl AppState {
    pub fn new(settings: &Settings) -> Self {
        Self::with_pipeline(settings, Pipeline::from_config(settings.service_config()))
    }

    pub fn with_pipeline(settings: &Settings, pipeline: Pipeline) -> Self {
        Self {
            store: Arc::new(RwLock::new(MapState::new())),
            pipeline,
            outline: OutlineFile::new(settings.outline.clone(), settings.watch_interval()),
            load_error: None,
            snapshot: Snapshot::default(),
            show_stats: settings.show_stats,
        }
    }

    /// Read the outline file and start resolving it in the background
    pub fn reload(&mut self, ctx: &egui::Context, force: bool) {
        let loaded = match self.outline.load(force) {
            Ok(loaded) => loaded,
            Err(err) => {
                let path = self.outline.path().map(|p| p.display().to_string());
                tracing::warn!("Failed to load outline {:?}: {}", path, err);
                self.load_error = Some(err.to_string());
                return;
            }
        };
        self.load_error = None;
        let Some(tree) = loaded else {
            return;
        };

        if !async_runtime::in_runtime_context() {
            tracing::error!("No async runtime available to resolve the outline");
            self.load_error = Some("No async runtime available".to_string());
            return;
        }

        let pipeline = self.pipeline.clone();
        let store = self.store.clone();
        let task_ctx = ctx.clone();
        async_runtime::spawn(async move {
            let phase = pipeline.update(&store, tree).await;
            tracing::debug!("Resolution run finished: {:?}", phase);
            task_ctx.request_repaint();
        });
        ctx.request_repaint();
    }

    pub fn open(&mut self, ctx: &egui::Context, path: PathBuf) {
        tracing::info!("Opening outline {}", path.display());
        self.outline.set_path(path);
        self.reload(ctx, true);
    }

    /// Reload the outline if it changed on disk since the last check
    pub fn poll_file_changes(&mut self, ctx: &egui::Context) {
        if self.outline.changed_on_disk(Instant::now()) {
            tracing::info!("Outline file changed on disk, reloading");
            self.reload(ctx, false);
        }
    }

    /// Refresh the snapshot from the store and take any pending fit request
    ///
    /// Keeps the previous snapshot when a resolution task holds the lock.
    pub fn sync(&mut self) -> Option<FitRequest> {
        let mut state = self.store.try_write().ok()?;
        if state.generation() != self.snapshot.generation || state.phase() != self.snapshot.phase
        {
            self.snapshot = Snapshot {
                generation: state.generation(),
                phase: state.phase(),
                stats: state.stats(),
                scene: Arc::new(state.scene()),
            };
        }
        state.take_fit_request()
    }

    /// Fit request over everything currently shown, ignoring whether one is pending
    pub fn current_fit(&self) -> Option<FitRequest> {
        self.store.try_read().ok()?.fit_request()
    }
}
