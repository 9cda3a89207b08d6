//! # Editor
//!
//! Single owner of the design document and everything that reacts to it:
//! scene, history, transform controller, background image loading and the
//! QR regeneration debounce.
//!
//! The design lives behind an `Rc<RefCell<_>>`. Long-lived event handlers
//! hold a clone of [`Editor::design`] and always read the current state
//! instead of a copy captured when they were registered. The editor is
//! single-threaded and not `Send`.
//!
//! ## Example
//!
//! ```
//! use qrwall::color::Rgba;
//! use qrwall::design::{BackgroundPatch, BackgroundFill, DesignState};
//! use qrwall::editor::Editor;
//! use qrwall::config::EditorConfig;
//!
//! let mut editor = Editor::new(DesignState::default(), EditorConfig::default());
//! editor.take_snapshot("Change Background");
//! editor.update_background(BackgroundPatch::fill(BackgroundFill::Solid {
//!     color: Rgba::rgb(30, 30, 30),
//! }));
//! assert!(editor.can_undo());
//! assert!(editor.undo());
//! ```

use std::cell::{Ref, RefCell};
use std::collections::HashSet;
use std::rc::Rc;
use std::time::Instant;

use image::{DynamicImage, RgbaImage};
use tokio::sync::watch;

use crate::color::Rgba;
use crate::config::EditorConfig;
use crate::design::{
    BackgroundFill, BackgroundPatch, Changes, DesignDocument, DesignState, DevicePatch, ImageSource,
    QrPatch, from_serializable, to_serializable,
};
use crate::error::Result;
use crate::export::{ExportOptions, ExportedImage, export, export_async};
use crate::history::HistoryEngine;
use crate::interaction::{InteractionOutcome, TransformController};
use crate::loader::{ImageLoader, LoadRequest, LoadTicket, LoadTracker};
use crate::render::qr::{QrEncoder, RegenDebouncer};
use crate::resources::{ResourceHandle, ResourceRegistry};
use crate::scene::SceneHost;

/// A background image load that has been started but not applied.
///
/// Holds no reference to the editor; run it with [`PendingLoad::run`] and
/// hand the result to [`Editor::finish_background_load`].
#[derive(Debug)]
pub struct PendingLoad {
    ticket: LoadTicket,
    source: ImageSource,
    request: LoadRequest,
    loader: ImageLoader,
}

impl PendingLoad {
    pub async fn run(self) -> FinishedLoad {
        let result = self.loader.load(self.request).await;
        FinishedLoad {
            ticket: self.ticket,
            source: self.source,
            result,
        }
    }
}

/// Result of a [`PendingLoad`], waiting to be applied.
#[derive(Debug)]
pub struct FinishedLoad {
    ticket: LoadTicket,
    source: ImageSource,
    result: Result<DynamicImage>,
}

/// How a background image load ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The image is now the background
    Applied,
    /// A newer load or a cancel superseded this one; nothing changed
    Stale,
    /// Loading failed; the background shows the white fallback
    FellBack,
}

pub struct Editor {
    design: Rc<RefCell<DesignState>>,
    scene: SceneHost,
    history: HistoryEngine,
    controller: TransformController,
    registry: ResourceRegistry,
    loads: LoadTracker,
    pending_blob: Option<ResourceHandle>,
    loader: Option<ImageLoader>,
    debouncer: RegenDebouncer,
    selection: watch::Sender<bool>,
}

impl Editor {
    pub fn new(state: DesignState, config: EditorConfig) -> Self {
        let device = *state.device();
        let scene = SceneHost::new(device.pixel_width, device.pixel_height, &config);
        Self::with_scene(state, config, scene)
    }

    /// Editor using a custom QR encoder.
    pub fn with_qr_encoder(
        state: DesignState,
        config: EditorConfig,
        encoder: Box<dyn QrEncoder>,
    ) -> Self {
        let device = *state.device();
        let scene =
            SceneHost::with_qr_encoder(device.pixel_width, device.pixel_height, &config, encoder);
        Self::with_scene(state, config, scene)
    }

    fn with_scene(state: DesignState, config: EditorConfig, scene: SceneHost) -> Self {
        let config = config.sanitized();
        let (selection, _) = watch::channel(false);
        Self {
            design: Rc::new(RefCell::new(state)),
            scene,
            history: HistoryEngine::new(config.history_depth),
            controller: TransformController::new(&config),
            registry: ResourceRegistry::new(),
            loads: LoadTracker::default(),
            pending_blob: None,
            loader: None,
            debouncer: RegenDebouncer::new(config.regen_debounce()),
            selection,
        }
    }

    /// Shared handle to the live design.
    pub fn design(&self) -> Rc<RefCell<DesignState>> {
        Rc::clone(&self.design)
    }

    pub fn state(&self) -> Ref<'_, DesignState> {
        self.design.borrow()
    }

    pub fn palette(&self) -> Vec<Rgba> {
        self.design.borrow().palette()
    }

    pub fn history(&self) -> &HistoryEngine {
        &self.history
    }

    pub fn controller(&self) -> &TransformController {
        &self.controller
    }

    pub fn scene(&self) -> &SceneHost {
        &self.scene
    }

    pub fn registry_mut(&mut self) -> &mut ResourceRegistry {
        &mut self.registry
    }

    /// The last rendered frame, chrome included.
    pub fn surface(&self) -> Option<&RgbaImage> {
        self.scene.surface()
    }

    // ---- mutation ----------------------------------------------------------

    /// Merge a background patch.
    ///
    /// An image fill set here only shows pixels that were already loaded for
    /// that source (e.g. by an earlier [`Editor::set_background_image`]).
    /// New images go through `set_background_image` or the
    /// begin/run/finish load steps; until then the layer renders white.
    pub fn update_background(&mut self, patch: BackgroundPatch) -> Changes {
        let old_fill = self.design.borrow().background().fill.clone();
        let changes = self.design.borrow_mut().update_background(patch);
        if changes.fill {
            // The in-flight load targets a fill that is no longer wanted
            self.loads.cancel();
            self.release_replaced_blob(&old_fill);
            self.prune_background_images();
        }
        self.after_change(changes);
        changes
    }

    /// Merge a QR patch. A payload that cannot be encoded is rejected
    /// before anything changes.
    pub fn update_qr_config(&mut self, patch: QrPatch) -> Result<Changes> {
        if let Some(payload) = &patch.payload_url {
            self.scene.prepare_payload(payload)?;
        }
        let changes = self.design.borrow_mut().update_qr(patch);
        self.after_change(changes);
        Ok(changes)
    }

    pub fn update_device_info(&mut self, patch: DevicePatch) -> Changes {
        let changes = self.design.borrow_mut().update_device(patch);
        self.after_change(changes);
        changes
    }

    fn after_change(&mut self, changes: Changes) {
        if !changes.any() {
            return;
        }
        if changes.device {
            let device = *self.design.borrow().device();
            self.scene.resize(device.pixel_width, device.pixel_height);
        }
        self.scene.apply_changes(changes);
        if changes.qr_colors && !changes.qr_payload {
            self.debouncer.schedule(Instant::now());
        }
        self.render();
    }

    /// Regenerate the QR bitmap once color edits have settled.
    ///
    /// Hosts call this from their frame or timer loop. Returns true if a
    /// regeneration happened.
    pub fn poll_regeneration(&mut self, now: Instant) -> bool {
        if !self.debouncer.poll(now) {
            return false;
        }
        tracing::debug!("QR colors settled, regenerating");
        self.scene.invalidate_qr_bitmap();
        self.render();
        true
    }

    pub fn regeneration_pending(&self) -> bool {
        self.debouncer.is_pending()
    }

    // ---- history -----------------------------------------------------------

    pub fn take_snapshot(&mut self, label: &str) -> bool {
        let taken = {
            let state = self.design.borrow();
            self.history.take_snapshot(&state, label)
        };
        if taken {
            // The oldest snapshot may have been evicted
            self.prune_background_images();
        }
        taken
    }

    pub fn undo(&mut self) -> bool {
        let current = self.design.borrow().clone();
        match self.history.undo(&current) {
            Some(state) => {
                self.restore(state);
                true
            }
            None => false,
        }
    }

    pub fn redo(&mut self) -> bool {
        let current = self.design.borrow().clone();
        match self.history.redo(&current) {
            Some(state) => {
                self.restore(state);
                true
            }
            None => false,
        }
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    fn restore(&mut self, state: DesignState) {
        self.controller.abort();
        self.debouncer.cancel();
        let device = *state.device();
        *self.design.borrow_mut() = state;
        self.scene.resize(device.pixel_width, device.pixel_height);
        self.scene.invalidate_all();
        self.render();
    }

    // ---- selection and pointer input ---------------------------------------

    pub fn select_qr(&mut self) {
        if self.controller.select() {
            self.notify_selection();
            self.render();
        }
    }

    pub fn deselect_all(&mut self) {
        if self.controller.deselect() {
            self.notify_selection();
            self.render();
        }
    }

    pub fn is_selected(&self) -> bool {
        self.controller.is_selected()
    }

    /// Receiver that observes selection changes.
    pub fn subscribe_selection(&self) -> watch::Receiver<bool> {
        self.selection.subscribe()
    }

    fn notify_selection(&self) {
        self.selection.send_replace(self.controller.is_selected());
    }

    pub fn set_locked(&mut self, locked: bool) {
        self.controller.set_locked(locked);
        self.render();
    }

    pub fn is_locked(&self) -> bool {
        self.controller.is_locked()
    }

    pub fn pointer_down(&mut self, x: f32, y: f32) -> InteractionOutcome {
        let outcome = {
            let state = self.design.borrow();
            self.controller.pointer_down(&state, x, y)
        };
        self.apply_outcome(&outcome);
        outcome
    }

    pub fn pointer_move(&mut self, x: f32, y: f32) -> InteractionOutcome {
        let outcome = {
            let state = self.design.borrow();
            self.controller.pointer_move(&state, x, y)
        };
        self.apply_outcome(&outcome);
        outcome
    }

    pub fn pointer_up(&mut self, x: f32, y: f32) -> InteractionOutcome {
        let outcome = {
            let state = self.design.borrow();
            self.controller.pointer_up(&state, x, y)
        };
        self.apply_outcome(&outcome);
        outcome
    }

    /// Pointer left the canvas or the gesture was cancelled externally.
    pub fn abort_gesture(&mut self) {
        self.controller.abort();
        self.render();
    }

    fn apply_outcome(&mut self, outcome: &InteractionOutcome) {
        if let Some(label) = outcome.snapshot {
            self.take_snapshot(label);
        }
        if outcome.selection_changed {
            self.notify_selection();
        }
        if let Some(patch) = outcome.patch.clone() {
            let changes = self.design.borrow_mut().update_qr(patch);
            self.scene.apply_changes(changes);
            self.render();
        } else if outcome.chrome_changed || outcome.selection_changed {
            self.render();
        }
    }

    // ---- rendering and export ----------------------------------------------

    /// Composite a frame with the current chrome.
    pub fn render(&mut self) {
        let chrome = self.controller.chrome();
        let state = self.design.borrow();
        self.scene.render(&state, Some(&chrome));
    }

    /// Export synchronously.
    pub fn export_image_blocking(&mut self, options: &ExportOptions) -> Result<ExportedImage> {
        let state = self.design.borrow().clone();
        let result = export(&mut self.scene, &state, options);
        self.render();
        result
    }

    /// Export, encoding on the blocking pool.
    pub async fn export_image(&mut self, options: &ExportOptions) -> Result<ExportedImage> {
        let state = self.design.borrow().clone();
        let result = export_async(&mut self.scene, &state, options).await;
        self.render();
        result
    }

    // ---- documents ---------------------------------------------------------

    pub fn to_document(&self) -> DesignDocument {
        to_serializable(&self.design.borrow())
    }

    /// Replace the design with a loaded document. History is cleared and
    /// any in-flight image load is abandoned.
    pub fn load_document(&mut self, doc: DesignDocument) -> Result<()> {
        let state = from_serializable(doc)?;
        self.scene.prepare_payload(&state.qr().payload_url)?;

        self.loads.cancel();
        if let Some(handle) = self.pending_blob.take() {
            self.registry.release(&handle);
        }
        self.history.clear();
        self.scene.clear_background_images();
        if self.controller.deselect() {
            self.notify_selection();
        }
        self.restore(state);
        tracing::info!("design document loaded");
        Ok(())
    }

    // ---- background images -------------------------------------------------

    /// Park uploaded bytes and return a source that refers to them.
    pub fn insert_blob(&mut self, bytes: Vec<u8>) -> ImageSource {
        ImageSource::Blob(self.registry.insert(bytes))
    }

    /// Start loading `source`, superseding any load in flight.
    pub fn begin_background_load(&mut self, source: ImageSource) -> Result<PendingLoad> {
        let ticket = self.loads.begin();
        if let Some(previous) = self.pending_blob.take()
            && ImageSource::Blob(previous) != source
        {
            self.registry.release(&previous);
        }

        let request = LoadRequest::resolve(&source, &self.registry)?;
        self.pending_blob = request.blob_handle();
        let loader = match &self.loader {
            Some(loader) => loader.clone(),
            None => {
                let loader = ImageLoader::new()?;
                self.loader = Some(loader.clone());
                loader
            }
        };
        Ok(PendingLoad {
            ticket,
            source,
            request,
            loader,
        })
    }

    /// Apply a finished load, unless something newer superseded it.
    pub fn finish_background_load(&mut self, finished: FinishedLoad) -> LoadOutcome {
        if !self.loads.is_current(finished.ticket) {
            tracing::debug!(source = ?finished.source, "discarding stale background load");
            return LoadOutcome::Stale;
        }
        self.pending_blob = None;

        let outcome = match finished.result {
            Ok(image) => {
                self.scene
                    .upload_background(finished.source.clone(), image, &mut self.registry);
                LoadOutcome::Applied
            }
            Err(e) => {
                tracing::warn!(error = %e, "background image failed to load; falling back to white");
                self.scene
                    .background_failed(finished.source.clone(), &mut self.registry);
                LoadOutcome::FellBack
            }
        };

        let fill = BackgroundFill::Image {
            source: finished.source,
        };
        let changes = self
            .design
            .borrow_mut()
            .update_background(BackgroundPatch::fill(fill));
        self.scene.apply_changes(changes);
        self.prune_background_images();
        self.render();
        outcome
    }

    /// Load `source` and make it the background.
    ///
    /// Holds `&mut self` across the await; hosts sharing the editor between
    /// handlers use the begin/run/finish steps instead.
    pub async fn set_background_image(&mut self, source: ImageSource) -> Result<LoadOutcome> {
        let pending = self.begin_background_load(source)?;
        let finished = pending.run().await;
        Ok(self.finish_background_load(finished))
    }

    /// Cancel any in-flight background load.
    pub fn cancel_background_load(&mut self) {
        self.loads.cancel();
    }

    /// Drop decoded backgrounds that neither the live design nor any
    /// history snapshot uses. Undo and redo only ever restore states that
    /// are still in history, so their images stay cached.
    fn prune_background_images(&mut self) {
        let mut live = HashSet::new();
        let current = self.design.borrow();
        for state in std::iter::once(&*current).chain(self.history.states()) {
            if let BackgroundFill::Image { source } = &state.background().fill {
                live.insert(source.clone());
            }
        }
        drop(current);
        self.scene.retain_background_images(|source| live.contains(source));
    }

    fn release_replaced_blob(&mut self, old_fill: &BackgroundFill) {
        if let BackgroundFill::Image {
            source: ImageSource::Blob(handle),
        } = old_fill
            && self.registry.release(handle)
        {
            tracing::debug!(%handle, "released replaced background blob");
        }
    }
}

impl std::fmt::Debug for Editor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Editor")
            .field("design", &self.design)
            .field("history", &self.history.undo_count())
            .field("selected", &self.controller.is_selected())
            .finish_non_exhaustive()
    }
}

impl Default for Editor {
    fn default() -> Self {
        Self::new(DesignState::default(), EditorConfig::default())
    }
}
