//! Interaction coordinator: one live diagram bound to one store.
//!
//! The coordinator owns the live scene, the selection and hover state, the
//! viewport, and the in-flight animations. It keeps them in sync with the
//! external store in both directions:
//!
//! - **Store → diagram**: layout and symbol changes schedule a debounced
//!   re-render (measure → layout → transform → reconcile). Selection and
//!   hover changes are turned into deltas and dispatched as actions.
//!
//! - **Diagram → store**: selection and hover actions, whether they come from
//!   the pointer or the host, write the resulting state back. A write is only
//!   issued when the value differs from the last value known to be in the
//!   store, so echoed notifications settle instead of looping.

use crate::action::{Action, ActionKind, ActionRegistry};
use crate::animation::{CompoundAnimation, ViewportAnimation};
use crate::config::SyncConfig;
use crate::debounce::Debouncer;
use crate::engine::{CharWidthMeasurer, LayoutEngine, PrecomputedLayout, TextMeasurer};
use crate::error::{Result, SyncError};
use crate::input::{InputContext, InputEvent, Intent, MouseListeners};
use crate::lifecycle::{Admission, Lifecycle, LifecycleState, poll_until_visible};
use crate::message::HostCommand;
use crate::reconcile::{AnimationPlan, reconcile};
use crate::store::{StateStore, StoreChange, StoreKey};
use crate::viewport::{Viewport, center_viewport, fit_viewport};
use elk_core::geometry::Bounds;
use elk_core::id::ElementId;
use elk_core::measure::{
    apply_measurements, collect_label_requests, estimate_label_sizes, size_compound_labels,
};
use elk_core::model::{LayoutNode, SymbolLibrary};
use elk_core::scene::{SceneElement, SceneGraph};
use elk_core::symbols::Connector;
use elk_core::transform;
use elk_render::{EdgeGeometry, edge_geometry};
use indexmap::IndexMap;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::time::MissedTickBehavior;

/// Animation frame interval of the run loop.
pub const FRAME: Duration = Duration::from_millis(16);

/// Reports the canvas's current page bounds.
pub type CanvasProbe = Box<dyn Fn() -> Bounds + Send + Sync>;

/// Events the host feeds into [`Coordinator::run`].
#[derive(Debug, Clone, PartialEq)]
pub enum HostEvent {
    Command(HostCommand),
    Input(InputEvent),
    Resize(Bounds),
    Dispose,
}

pub struct Coordinator {
    store: Arc<dyn StateStore>,
    layout_engine: Arc<dyn LayoutEngine>,
    measurer: Arc<dyn TextMeasurer>,
    config: SyncConfig,
    /// Namespaces symbol ids of this instance.
    prefix: String,

    /// The live scene (single source of truth for what is shown).
    scene: SceneGraph,
    animation: Option<CompoundAnimation>,

    viewport: Viewport,
    viewport_animation: Option<ViewportAnimation>,
    /// Canvas bounds in page pixels.
    canvas: Bounds,
    canvas_probe: Option<CanvasProbe>,

    /// Selected ids in selection order. May name elements not (yet) rendered.
    selected: Vec<ElementId>,
    hovered: Option<ElementId>,
    control_overlay: Option<Value>,

    registry: ActionRegistry<Coordinator>,
    lifecycle: Lifecycle<Action>,
    listeners: MouseListeners,
    debounce: Debouncer,
    changes: Option<mpsc::UnboundedReceiver<StoreChange>>,

    /// Last value known to be in the store, per key.
    known: HashMap<StoreKey, Value>,
    pending_writes: Vec<(StoreKey, Value)>,
    save_requested: bool,
}

impl Coordinator {
    /// Create a coordinator bound to `store`. Store changes are buffered
    /// from this point on.
    pub fn new(store: Arc<dyn StateStore>, config: SyncConfig, prefix: impl Into<String>) -> Self {
        let changes = store.subscribe();
        let debounce = Debouncer::new(config.debounce());
        Self {
            store,
            layout_engine: Arc::new(PrecomputedLayout),
            measurer: Arc::new(CharWidthMeasurer::default()),
            config,
            prefix: prefix.into(),
            scene: SceneGraph::empty(),
            animation: None,
            viewport: Viewport::default(),
            viewport_animation: None,
            canvas: Bounds::EMPTY,
            canvas_probe: None,
            selected: Vec::new(),
            hovered: None,
            control_overlay: None,
            registry: default_registry(),
            lifecycle: Lifecycle::new(),
            listeners: MouseListeners::new(),
            debounce,
            changes: Some(changes),
            known: HashMap::new(),
            pending_writes: Vec::new(),
            save_requested: false,
        }
    }

    pub fn with_layout_engine(mut self, engine: Arc<dyn LayoutEngine>) -> Self {
        self.layout_engine = engine;
        self
    }

    pub fn with_measurer(mut self, measurer: Arc<dyn TextMeasurer>) -> Self {
        self.measurer = measurer;
        self
    }

    pub fn with_canvas_probe(mut self, probe: CanvasProbe) -> Self {
        self.canvas_probe = Some(probe);
        self
    }

    // ─── Accessors ───────────────────────────────────────────────────────

    pub fn scene(&self) -> &SceneGraph {
        &self.scene
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    pub fn state(&self) -> LifecycleState {
        self.lifecycle.state()
    }

    /// Currently shown viewport.
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Where the viewport ends up once its animation finishes.
    pub fn target_viewport(&self) -> Viewport {
        self.viewport_animation
            .as_ref()
            .map_or(self.viewport, |anim| anim.to)
    }

    pub fn canvas(&self) -> Bounds {
        self.canvas
    }

    pub fn selected_ids(&self) -> &[ElementId] {
        &self.selected
    }

    /// Live elements for the selected ids. Ids without an element are skipped.
    pub fn selected_elements(&self) -> Vec<&SceneElement> {
        self.selected
            .iter()
            .filter_map(|&id| {
                let element = self.scene.get_by_id(id);
                if element.is_none() {
                    log::warn!("selected element {id} is not in the diagram");
                }
                element
            })
            .collect()
    }

    pub fn hovered(&self) -> Option<ElementId> {
        self.hovered
    }

    pub fn control_overlay(&self) -> Option<&Value> {
        self.control_overlay.as_ref()
    }

    /// Connector descriptors of the live symbol library.
    pub fn connectors(&self) -> &IndexMap<String, Connector> {
        &self.scene.symbols.connectors
    }

    /// Drawable geometry of an edge; `None` if `id` is not a live element.
    pub fn edge_geometry(&self, id: ElementId) -> Option<EdgeGeometry> {
        self.scene
            .get_by_id(id)
            .map(|element| edge_geometry(element, &self.scene.symbols))
    }

    pub fn is_animating(&self) -> bool {
        self.animation.is_some() || self.viewport_animation.is_some()
    }

    pub fn animation(&self) -> Option<&CompoundAnimation> {
        self.animation.as_ref()
    }

    // ─── Lifecycle ───────────────────────────────────────────────────────

    /// Wait until `visible` reports the canvas visible, then load the
    /// store state, render and activate.
    pub async fn mount(&mut self, visible: impl FnMut() -> bool) -> Result<()> {
        self.lifecycle.mount()?;
        log::info!("mounting diagram {}", self.prefix);
        poll_until_visible(visible, self.config.visibility_poll()).await;
        self.resize();
        self.load_from_store().await?;
        if let Err(err) = self.render().await {
            log::warn!("initial render failed: {err}");
        }
        self.activate().await
    }

    /// Resolves once the diagram is active.
    pub fn on_ready(&mut self) -> oneshot::Receiver<()> {
        self.lifecycle.on_ready()
    }

    /// Become active and replay operations queued while mounting.
    pub async fn activate(&mut self) -> Result<()> {
        let queued = self.lifecycle.activate()?;
        log::info!("diagram {} active", self.prefix);
        for action in queued {
            self.run_action(&action);
        }
        self.flush().await
    }

    /// Tear down: no further operations are accepted.
    pub fn dispose(&mut self) {
        let dropped = self.lifecycle.dispose();
        if let Some(animation) = self.animation.take() {
            animation.settle(&mut self.scene);
        }
        self.viewport_animation = None;
        self.debounce.cancel();
        self.changes = None;
        self.pending_writes.clear();
        log::info!("diagram {} disposed ({dropped} queued operation(s) dropped)", self.prefix);
    }

    fn ensure_live(&self) -> Result<()> {
        match self.lifecycle.state() {
            LifecycleState::Disposed => Err(SyncError::Lifecycle(LifecycleState::Disposed)),
            _ => Ok(()),
        }
    }

    // ─── Dispatch ────────────────────────────────────────────────────────

    /// Run `action` now, or queue it until the diagram is active.
    pub fn dispatch(&mut self, action: Action) -> Result<()> {
        if !action.requires_active() {
            self.ensure_live()?;
            self.run_action(&action);
            return Ok(());
        }
        match self.lifecycle.admit(action)? {
            Admission::Run(action) => self.run_action(&action),
            Admission::Queued => log::debug!("diagram not active, action queued"),
        }
        Ok(())
    }

    fn run_action(&mut self, action: &Action) {
        ActionRegistry::dispatch(self, |c| &c.registry, action);
    }

    /// Queue a store write unless the store already holds `value`. Only the
    /// last write per key survives until the next flush.
    fn queue_write(&mut self, key: StoreKey, value: Value) {
        if self.known.get(&key) == Some(&value) {
            return;
        }
        self.known.insert(key, value.clone());
        self.pending_writes.retain(|(k, _)| *k != key);
        self.pending_writes.push((key, value));
        self.save_requested = true;
    }

    /// Send every queued write, then save once. Reports the first failure.
    async fn flush(&mut self) -> Result<()> {
        let writes = std::mem::take(&mut self.pending_writes);
        let save = std::mem::take(&mut self.save_requested);
        let mut first_err = None;
        for (key, value) in writes {
            if let Err(err) = self.store.set(key, value).await {
                // the store value is unknown now; the next change rewrites it
                self.known.remove(&key);
                log::warn!("store write to {key:?} failed: {err}");
                first_err.get_or_insert(err);
            }
        }
        if let Some(err) = first_err {
            return Err(err);
        }
        if save {
            self.store.save().await?;
        }
        Ok(())
    }

    // ─── Selection & hover ───────────────────────────────────────────────

    /// Select `entering`, deselect `exiting`, and write the resulting
    /// selection back in one store write.
    pub async fn set_selection(
        &mut self,
        entering: Vec<ElementId>,
        exiting: Vec<ElementId>,
    ) -> Result<()> {
        self.dispatch(Action::Select {
            selected: entering,
            deselected: exiting,
        })?;
        self.flush().await
    }

    pub async fn select_all(&mut self, select: bool) -> Result<()> {
        self.dispatch(Action::SelectAll { select })?;
        self.flush().await
    }

    /// Move hover to `id`, or clear it.
    pub async fn set_hover(&mut self, id: Option<ElementId>) -> Result<()> {
        self.hover(id)?;
        self.flush().await
    }

    fn hover(&mut self, id: Option<ElementId>) -> Result<()> {
        if id == self.hovered {
            return Ok(());
        }
        let previous = self.hovered;
        if let Some(target) = id {
            self.dispatch(Action::HoverFeedback { target, on: true })?;
        }
        if let Some(target) = previous {
            self.dispatch(Action::HoverFeedback { target, on: false })?;
        }
        Ok(())
    }

    // ─── Viewport ────────────────────────────────────────────────────────

    /// Refresh the canvas bounds from the probe, if one is installed.
    pub fn resize(&mut self) {
        if let Some(probe) = &self.canvas_probe {
            let bounds = probe();
            self.run_action(&Action::InitializeCanvasBounds { bounds });
        }
    }

    /// Set the canvas bounds explicitly.
    pub fn resize_to(&mut self, bounds: Bounds) -> Result<()> {
        self.dispatch(Action::InitializeCanvasBounds { bounds })
    }

    /// Center on the bounding box of `ids` (whole diagram if empty).
    pub async fn center(&mut self, ids: Vec<ElementId>, animate: bool, retain_zoom: bool) -> Result<()> {
        self.resize();
        self.dispatch(Action::Center {
            ids,
            animate,
            retain_zoom,
            zoom: None,
        })?;
        self.flush().await
    }

    /// Zoom so the bounding box of `ids` plus `padding` fills the canvas.
    pub async fn fit(&mut self, ids: Vec<ElementId>, padding: f64, max_zoom: f64, animate: bool) -> Result<()> {
        self.resize();
        self.dispatch(Action::Fit {
            ids,
            padding,
            max_zoom,
            animate,
        })?;
        self.flush().await
    }

    pub async fn handle_command(&mut self, command: HostCommand) -> Result<()> {
        log::debug!("host command {command:?}");
        self.resize();
        self.dispatch(command.into_action())?;
        self.flush().await
    }

    fn move_viewport(&mut self, to: Viewport, animate: bool) {
        let duration = self.config.animation();
        if animate && !duration.is_zero() {
            self.viewport_animation = Some(ViewportAnimation::new(self.viewport, to, duration));
        } else {
            self.viewport_animation = None;
            self.viewport = to;
        }
    }

    // ─── Input ───────────────────────────────────────────────────────────

    /// Route a pointer event through the mouse listeners. Ignored unless
    /// the diagram is active.
    pub async fn handle_input(&mut self, event: InputEvent) -> Result<()> {
        if !self.lifecycle.is_active() {
            return Ok(());
        }
        let ctx = InputContext {
            scene: &self.scene,
            viewport: self.viewport,
            canvas: self.canvas,
            selected: &self.selected,
            hovered: self.hovered,
            config: &self.config,
        };
        let intents = self.listeners.handle(&event, &ctx);
        for intent in intents {
            match intent {
                Intent::Dispatch(action) => self.dispatch(action)?,
                Intent::Hover(id) => self.hover(id)?,
            }
        }
        self.flush().await
    }

    // ─── Store → diagram ─────────────────────────────────────────────────

    /// Read the current selection, hover and overlay without dispatching.
    async fn load_from_store(&mut self) -> Result<()> {
        if let Some(value) = self.store.get(StoreKey::Selection).await? {
            self.selected = ids_from_value(&value);
            self.known.insert(StoreKey::Selection, value);
        }
        if let Some(value) = self.store.get(StoreKey::Hover).await? {
            self.hovered = id_from_value(&value);
            self.known.insert(StoreKey::Hover, value);
        }
        if let Some(value) = self.store.get(StoreKey::ControlOverlay).await? {
            self.control_overlay = (!value.is_null()).then_some(value);
        }
        Ok(())
    }

    /// React to one store notification.
    pub async fn handle_store_change(&mut self, change: StoreChange) -> Result<()> {
        self.ensure_live()?;
        log::debug!("store change {:?}", change.key);
        match change.key {
            StoreKey::Layout | StoreKey::Symbols => self.debounce.trigger(),
            StoreKey::Selection => {
                let new = ids_from_value(&change.value);
                let old = ids_from_value(&change.previous);
                self.known.insert(StoreKey::Selection, change.value);
                let entering: Vec<ElementId> = new
                    .iter()
                    .copied()
                    .filter(|id| !old.contains(id) && !self.selected.contains(id))
                    .collect();
                let exiting: Vec<ElementId> = old
                    .iter()
                    .copied()
                    .filter(|id| !new.contains(id) && self.selected.contains(id))
                    .collect();
                if !entering.is_empty() || !exiting.is_empty() {
                    self.dispatch(Action::Select {
                        selected: entering,
                        deselected: exiting,
                    })?;
                }
            }
            StoreKey::Hover => {
                let id = id_from_value(&change.value);
                self.known.insert(StoreKey::Hover, change.value);
                self.hover(id)?;
            }
            StoreKey::ControlOverlay => {
                self.control_overlay = (!change.value.is_null()).then_some(change.value);
            }
            StoreKey::Rendered => {}
        }
        self.flush().await
    }

    /// Handle every buffered store change. Returns how many were handled.
    pub async fn drain_store_changes(&mut self) -> Result<usize> {
        let mut handled = 0;
        while let Some(change) = self.changes.as_mut().and_then(|rx| rx.try_recv().ok()) {
            self.handle_store_change(change).await?;
            handled += 1;
        }
        Ok(handled)
    }

    pub fn render_pending(&self) -> bool {
        self.debounce.is_pending()
    }

    // ─── Render ──────────────────────────────────────────────────────────

    /// Rebuild the scene from the store's layout and symbols.
    ///
    /// Returns `false` when there is no layout yet. On error the live scene
    /// is left as it was.
    pub async fn render(&mut self) -> Result<bool> {
        self.ensure_live()?;
        let Some(layout) = self.store.get(StoreKey::Layout).await? else {
            log::debug!("no layout in store yet");
            return Ok(false);
        };
        let mut tree = LayoutNode::from_json(layout)?;
        let library = match self.store.get(StoreKey::Symbols).await? {
            Some(value) if !value.is_null() => SymbolLibrary::from_json(value)?,
            _ => SymbolLibrary::default(),
        };

        if self.config.measure_labels {
            self.measure_labels(&mut tree).await;
        }
        size_compound_labels(&mut tree);

        let tree = self.layout_engine.layout(tree).await?;
        let mut next = transform(&tree, &library, &self.prefix)?;
        // published before reconcile rewinds `next` to the animation's first frame
        let rendered = next.to_json();

        // a new render supersedes the running animation
        if let Some(animation) = self.animation.take() {
            animation.settle(&mut self.scene);
        }
        let animate = !self.scene.is_empty() && self.lifecycle.is_active();
        let plan = reconcile(&self.scene, &mut next, self.config.animation(), animate);
        log::debug!("render scheduled {} animation(s)", plan.animation_count());

        for idx in next.walk() {
            let element = &mut next.graph[idx];
            element.view.selected = self.selected.contains(&element.id);
            element.view.hover_feedback = self.hovered == Some(element.id);
        }
        self.scene = next;
        if let AnimationPlan::Animate(animation) = plan {
            self.animation = Some(animation);
        }

        if let Err(err) = self.store.set(StoreKey::Rendered, rendered).await {
            log::warn!("could not publish rendered scene: {err}");
        }
        Ok(true)
    }

    /// Backfill label sizes, falling back to an estimate when the measurer fails.
    async fn measure_labels(&self, tree: &mut LayoutNode) {
        let requests = collect_label_requests(tree);
        if requests.is_empty() {
            return;
        }
        match self.measurer.measure(requests).await {
            Ok(measurements) => {
                let applied = apply_measurements(tree, &measurements);
                log::trace!("measured {applied} label(s)");
            }
            Err(err) => {
                log::warn!("label measurement failed, estimating sizes: {err}");
                estimate_label_sizes(tree);
            }
        }
    }

    // ─── Animation ───────────────────────────────────────────────────────

    /// Advance running animations by `dt`. Returns `true` while any remains.
    pub fn tick(&mut self, dt: Duration) -> bool {
        if let Some(animation) = &mut self.animation
            && animation.advance(&mut self.scene, dt)
        {
            self.animation = None;
        }
        if let Some(animation) = &mut self.viewport_animation {
            let (viewport, done) = animation.advance(dt);
            self.viewport = viewport;
            if done {
                self.viewport_animation = None;
            }
        }
        self.is_animating()
    }

    // ─── Event loop ──────────────────────────────────────────────────────

    /// Process store changes, host events, debounced renders and animation
    /// frames until the host disposes the diagram or closes `events`.
    pub async fn run(&mut self, mut events: mpsc::UnboundedReceiver<HostEvent>) -> Result<()> {
        let Some(mut changes) = self.changes.take() else {
            return Err(SyncError::Lifecycle(self.lifecycle.state()));
        };
        let mut frames = tokio::time::interval(FRAME);
        frames.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                change = changes.recv() => {
                    let Some(change) = change else { break };
                    if let Err(err) = self.handle_store_change(change).await {
                        log::warn!("store change not applied: {err}");
                    }
                }
                event = events.recv() => match event {
                    None | Some(HostEvent::Dispose) => break,
                    Some(event) => {
                        if let Err(err) = self.handle_event(event).await {
                            log::warn!("host event not applied: {err}");
                        }
                    }
                },
                _ = self.debounce.wait() => {
                    if let Err(err) = self.render().await {
                        log::warn!("render skipped: {err}");
                    }
                }
                _ = frames.tick(), if self.is_animating() => {
                    self.tick(FRAME);
                }
            }
        }
        self.dispose();
        Ok(())
    }

    async fn handle_event(&mut self, event: HostEvent) -> Result<()> {
        match event {
            HostEvent::Command(command) => self.handle_command(command).await,
            HostEvent::Input(input) => self.handle_input(input).await,
            HostEvent::Resize(bounds) => self.resize_to(bounds),
            HostEvent::Dispose => {
                self.dispose();
                Ok(())
            }
        }
    }
}

// ─── Handlers ────────────────────────────────────────────────────────────

fn default_registry() -> ActionRegistry<Coordinator> {
    let mut registry = ActionRegistry::new();
    registry.register(ActionKind::Select, on_select);
    registry.register(ActionKind::SelectAll, on_select_all);
    registry.register(ActionKind::HoverFeedback, on_hover_feedback);
    registry.register(ActionKind::Center, on_center);
    registry.register(ActionKind::Fit, on_fit);
    registry.register(ActionKind::SetViewport, on_set_viewport);
    registry.register(ActionKind::InitializeCanvasBounds, on_canvas_bounds);
    registry
}

fn set_selected_flag(c: &mut Coordinator, id: ElementId, selected: bool) {
    if let Some(element) = c.scene.get_by_id_mut(id) {
        element.view.selected = selected;
    }
}

fn write_selection(c: &mut Coordinator) {
    let value = ids_to_value(&c.selected);
    c.queue_write(StoreKey::Selection, value);
}

fn on_select(c: &mut Coordinator, action: &Action) {
    let Action::Select {
        selected,
        deselected,
    } = action
    else {
        return;
    };
    for &id in deselected {
        set_selected_flag(c, id, false);
        c.selected.retain(|s| *s != id);
    }
    for &id in selected {
        set_selected_flag(c, id, true);
        if !c.selected.contains(&id) {
            c.selected.push(id);
        }
    }
    write_selection(c);
}

fn on_select_all(c: &mut Coordinator, action: &Action) {
    let Action::SelectAll { select } = action else {
        return;
    };
    c.selected.clear();
    for idx in c.scene.walk() {
        let element = &mut c.scene.graph[idx];
        let pick = *select && element.is_selectable();
        element.view.selected = pick;
        if pick {
            c.selected.push(element.id);
        }
    }
    write_selection(c);
}

fn on_hover_feedback(c: &mut Coordinator, action: &Action) {
    let &Action::HoverFeedback { target, on } = action else {
        return;
    };
    if let Some(element) = c.scene.get_by_id_mut(target) {
        element.view.hover_feedback = on;
    }
    if on {
        c.hovered = Some(target);
        c.queue_write(StoreKey::Hover, Value::String(target.as_str().to_string()));
    } else if c.hovered == Some(target) {
        c.hovered = None;
    }
}

fn on_center(c: &mut Coordinator, action: &Action) {
    let Action::Center {
        ids,
        animate,
        retain_zoom,
        zoom,
    } = action
    else {
        return;
    };
    let target = c.scene.bounds_of(ids);
    let to = center_viewport(&target, &c.canvas, &c.target_viewport(), *retain_zoom, *zoom);
    c.move_viewport(to, *animate);
}

fn on_fit(c: &mut Coordinator, action: &Action) {
    let Action::Fit {
        ids,
        padding,
        max_zoom,
        animate,
    } = action
    else {
        return;
    };
    let target = c.scene.bounds_of(ids);
    let to = fit_viewport(&target, &c.canvas, *padding, *max_zoom);
    c.move_viewport(to, *animate);
}

fn on_set_viewport(c: &mut Coordinator, action: &Action) {
    if let &Action::SetViewport { viewport, animate } = action {
        c.move_viewport(viewport, animate);
    }
}

fn on_canvas_bounds(c: &mut Coordinator, action: &Action) {
    if let &Action::InitializeCanvasBounds { bounds } = action {
        c.canvas = bounds;
    }
}

// ─── Store values ────────────────────────────────────────────────────────

/// Selection ids from a store value: a list of strings. Anything else is empty.
fn ids_from_value(value: &Value) -> Vec<ElementId> {
    value
        .as_array()
        .map(|ids| {
            ids.iter()
                .filter_map(Value::as_str)
                .map(ElementId::intern)
                .collect()
        })
        .unwrap_or_default()
}

fn ids_to_value(ids: &[ElementId]) -> Value {
    Value::Array(
        ids.iter()
            .map(|id| Value::String(id.as_str().to_string()))
            .collect(),
    )
}

fn id_from_value(value: &Value) -> Option<ElementId> {
    value
        .as_str()
        .filter(|s| !s.is_empty())
        .map(ElementId::intern)
}
