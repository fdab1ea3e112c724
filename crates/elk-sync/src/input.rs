//! Input abstraction and mouse listeners.
//!
//! Pointer events arrive in page pixels. The listeners translate them into
//! [`Intent`]s: actions for the dispatch pipeline, or hover changes.
//!
//! | Gesture | Result |
//! |---------|--------|
//! | drag on background or element | scroll by `Δpixels / zoom` |
//! | drag starting on a `node:widget` | nothing (the widget owns the pointer) |
//! | wheel | zoom around the cursor |
//! | click | select nearest selectable element, deselect the others |
//! | ctrl/cmd + click | toggle the element |
//! | move | hover feedback |

use crate::action::Action;
use crate::config::SyncConfig;
use crate::viewport::Viewport;
use elk_core::geometry::{Bounds, Point};
use elk_core::id::ElementId;
use elk_core::scene::SceneGraph;
use elk_render::hit_test;
use smallvec::{SmallVec, smallvec};

/// Element type that keeps the pointer to itself.
pub const WIDGET_TYPE: &str = "node:widget";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub ctrl: bool,
    pub shift: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    /// Ctrl on most platforms, cmd on macOS.
    pub fn toggles(&self) -> bool {
        self.ctrl || self.meta
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MouseButton {
    #[default]
    Left,
    Middle,
    Right,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DeltaMode {
    #[default]
    Pixel,
    Line,
}

/// A normalized pointer event, in page pixels.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    PointerDown {
        x: f64,
        y: f64,
        button: MouseButton,
        modifiers: Modifiers,
    },
    PointerMove {
        x: f64,
        y: f64,
        modifiers: Modifiers,
    },
    PointerUp {
        x: f64,
        y: f64,
    },
    /// Pointer left the canvas.
    PointerLeave,
    Wheel {
        x: f64,
        y: f64,
        delta_y: f64,
        mode: DeltaMode,
        modifiers: Modifiers,
    },
}

impl InputEvent {
    /// Extract position if this is a positioned event.
    pub fn position(&self) -> Option<(f64, f64)> {
        match self {
            Self::PointerDown { x, y, .. }
            | Self::PointerMove { x, y, .. }
            | Self::PointerUp { x, y }
            | Self::Wheel { x, y, .. } => Some((*x, *y)),
            Self::PointerLeave => None,
        }
    }
}

/// What an input event asks of the coordinator.
#[derive(Debug, Clone, PartialEq)]
pub enum Intent {
    Dispatch(Action),
    Hover(Option<ElementId>),
}

/// Read-only state the listeners need.
pub struct InputContext<'a> {
    pub scene: &'a SceneGraph,
    pub viewport: Viewport,
    /// Canvas bounds in page pixels.
    pub canvas: Bounds,
    pub selected: &'a [ElementId],
    pub hovered: Option<ElementId>,
    pub config: &'a SyncConfig,
}

impl InputContext<'_> {
    /// Canvas-relative pixel offset of a page position.
    fn offset(&self, x: f64, y: f64) -> Point {
        Point::new(x - self.canvas.x, y - self.canvas.y)
    }

    fn element_at(&self, x: f64, y: f64) -> Option<ElementId> {
        let p = self.viewport.to_model(self.offset(x, y));
        hit_test(self.scene, p.x, p.y)
    }
}

/// Mouse listeners with their drag state.
#[derive(Debug, Default)]
pub struct MouseListeners {
    /// Last page position of an ongoing scroll drag.
    last_drag: Option<Point>,
}

impl MouseListeners {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_dragging(&self) -> bool {
        self.last_drag.is_some()
    }

    pub fn handle(&mut self, event: &InputEvent, ctx: &InputContext<'_>) -> SmallVec<[Intent; 2]> {
        match event {
            InputEvent::PointerDown {
                x,
                y,
                button,
                modifiers,
            } => {
                if *button != MouseButton::Left {
                    return SmallVec::new();
                }
                let hit = ctx.element_at(*x, *y);
                let on_widget = hit
                    .and_then(|id| ctx.scene.get_by_id(id))
                    .is_some_and(|el| el.type_name == WIDGET_TYPE);
                self.last_drag = (!on_widget).then_some(Point::new(*x, *y));
                select_intent(hit, *modifiers, ctx).into_iter().collect()
            }
            InputEvent::PointerMove { x, y, .. } => {
                let mut out = SmallVec::new();
                if let Some(last) = self.last_drag {
                    let (dx, dy) = (x - last.x, y - last.y);
                    if dx != 0.0 || dy != 0.0 {
                        self.last_drag = Some(Point::new(*x, *y));
                        out.push(Intent::Dispatch(Action::SetViewport {
                            viewport: ctx.viewport.dragged(dx, dy),
                            animate: false,
                        }));
                    }
                } else if ctx.config.hover_enabled {
                    let hit = ctx.element_at(*x, *y);
                    if hit != ctx.hovered {
                        out.push(Intent::Hover(hit));
                    }
                }
                out
            }
            InputEvent::PointerUp { .. } => {
                self.last_drag = None;
                SmallVec::new()
            }
            InputEvent::PointerLeave => {
                self.last_drag = None;
                if ctx.config.hover_enabled && ctx.hovered.is_some() {
                    smallvec![Intent::Hover(None)]
                } else {
                    SmallVec::new()
                }
            }
            InputEvent::Wheel {
                x, y, delta_y, mode, ..
            } => {
                let factor = wheel_zoom_factor(*delta_y, *mode, ctx.config.wheel_zoom_factor);
                let zoom = ctx.config.clamp_zoom(ctx.viewport.zoom * factor);
                if zoom == ctx.viewport.zoom {
                    return SmallVec::new();
                }
                smallvec![Intent::Dispatch(Action::SetViewport {
                    viewport: ctx.viewport.zoomed_at(zoom, ctx.offset(*x, *y)),
                    animate: false,
                })]
            }
        }
    }
}

/// `exp(-delta_y * sensitivity)`; line-mode deltas count ten times.
pub fn wheel_zoom_factor(delta_y: f64, mode: DeltaMode, sensitivity: f64) -> f64 {
    let delta = match mode {
        DeltaMode::Pixel => delta_y,
        DeltaMode::Line => delta_y * 10.0,
    };
    (-delta * sensitivity).exp()
}

/// Selection change for a click on `hit`.
fn select_intent(hit: Option<ElementId>, modifiers: Modifiers, ctx: &InputContext<'_>) -> Option<Intent> {
    let target = hit
        .and_then(|id| ctx.scene.index_of(id))
        .and_then(|idx| ctx.scene.selectable_ancestor(idx))
        .map(|idx| ctx.scene.graph[idx].id)?;
    let is_selected = ctx.selected.contains(&target);

    let action = if modifiers.toggles() {
        if is_selected {
            Action::Select {
                selected: vec![],
                deselected: vec![target],
            }
        } else {
            Action::Select {
                selected: vec![target],
                deselected: vec![],
            }
        }
    } else {
        let deselected: Vec<ElementId> = ctx
            .selected
            .iter()
            .copied()
            .filter(|id| *id != target)
            .collect();
        if is_selected && deselected.is_empty() {
            return None;
        }
        Action::Select {
            selected: if is_selected { vec![] } else { vec![target] },
            deselected,
        }
    };
    Some(Intent::Dispatch(action))
}
