//! Actions and the action-kind → handler table.
//!
//! Every selection, hover and viewport intent, whether it comes from the
//! pointer, the host or the store, is expressed as an [`Action`] and sent
//! through one dispatch pipeline. Handlers are plain function pointers over
//! the owning context, registered per [`ActionKind`] and run in
//! registration order.

use crate::viewport::Viewport;
use elk_core::geometry::Bounds;
use elk_core::id::ElementId;
use smallvec::SmallVec;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Add `selected` to and remove `deselected` from the selection.
    Select {
        selected: Vec<ElementId>,
        deselected: Vec<ElementId>,
    },
    /// Select or deselect every selectable element.
    SelectAll { select: bool },
    /// Pointer entered (`on`) or left an element.
    HoverFeedback { target: ElementId, on: bool },
    /// Center the view on the bounding box of `ids` (whole scene if empty).
    Center {
        ids: Vec<ElementId>,
        animate: bool,
        retain_zoom: bool,
        zoom: Option<f64>,
    },
    /// Zoom and center so the bounding box of `ids` fills the canvas.
    Fit {
        ids: Vec<ElementId>,
        padding: f64,
        max_zoom: f64,
        animate: bool,
    },
    SetViewport { viewport: Viewport, animate: bool },
    /// New canvas pixel bounds.
    InitializeCanvasBounds { bounds: Bounds },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
    Select,
    SelectAll,
    HoverFeedback,
    Center,
    Fit,
    SetViewport,
    InitializeCanvasBounds,
}

impl Action {
    pub fn kind(&self) -> ActionKind {
        match self {
            Self::Select { .. } => ActionKind::Select,
            Self::SelectAll { .. } => ActionKind::SelectAll,
            Self::HoverFeedback { .. } => ActionKind::HoverFeedback,
            Self::Center { .. } => ActionKind::Center,
            Self::Fit { .. } => ActionKind::Fit,
            Self::SetViewport { .. } => ActionKind::SetViewport,
            Self::InitializeCanvasBounds { .. } => ActionKind::InitializeCanvasBounds,
        }
    }

    /// Whether this action needs an active diagram.
    pub fn requires_active(&self) -> bool {
        !matches!(self, Self::InitializeCanvasBounds { .. })
    }
}

/// Handler signature over the dispatching context `C`.
pub type Handler<C> = fn(&mut C, &Action);

/// Action-kind → handler table.
pub struct ActionRegistry<C> {
    handlers: HashMap<ActionKind, SmallVec<[Handler<C>; 2]>>,
}

impl<C> Default for ActionRegistry<C> {
    fn default() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }
}

impl<C> ActionRegistry<C> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, kind: ActionKind, handler: Handler<C>) {
        self.handlers.entry(kind).or_default().push(handler);
    }

    /// Handlers for `kind`, copied out so the caller may borrow its context
    /// mutably while running them.
    pub fn handlers(&self, kind: ActionKind) -> SmallVec<[Handler<C>; 2]> {
        self.handlers.get(&kind).cloned().unwrap_or_default()
    }

    pub fn is_registered(&self, kind: ActionKind) -> bool {
        self.handlers.get(&kind).is_some_and(|h| !h.is_empty())
    }

    /// Run every handler registered for the action's kind. Returns how many ran.
    pub fn dispatch(ctx: &mut C, registry: impl Fn(&C) -> &Self, action: &Action) -> usize {
        let handlers = registry(&*ctx).handlers(action.kind());
        if handlers.is_empty() {
            log::warn!("no handler registered for {:?}", action.kind());
        }
        for handler in &handlers {
            handler(ctx, action);
        }
        handlers.len()
    }
}
