//! Scene and viewport transitions.
//!
//! A reconcile produces at most one [`CompoundAnimation`] holding every
//! fade and morph of that update. Advancing it writes interpolated state into
//! the live scene; settling jumps to the final state and prunes the clones
//! that were only kept around to fade out.

use crate::viewport::Viewport;
use elk_core::geometry::{Bounds, Point};
use elk_core::id::ElementId;
use elk_core::scene::{ElementKind, SceneGraph};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Easing {
    Linear,
    #[default]
    EaseInOut,
}

impl Easing {
    pub fn apply(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            // cubic in-out
            Easing::EaseInOut => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
                }
            }
        }
    }
}

/// One element-level transition.
#[derive(Debug, Clone, PartialEq)]
pub enum Transition {
    /// Opacity 0 → 1 on a newly added element.
    FadeIn { id: ElementId },
    /// Opacity 1 → 0 on a cloned removed element, pruned at the end.
    FadeOut { id: ElementId },
    /// Parent-relative position and size interpolation.
    Morph { id: ElementId, from: Bounds, to: Bounds },
    /// Edge route interpolation.
    Reroute {
        id: ElementId,
        from: Vec<Point>,
        to: Vec<Point>,
    },
}

impl Transition {
    pub fn id(&self) -> ElementId {
        match self {
            Self::FadeIn { id }
            | Self::FadeOut { id }
            | Self::Morph { id, .. }
            | Self::Reroute { id, .. } => *id,
        }
    }

    fn apply(&self, scene: &mut SceneGraph, t: f64) {
        let Some(element) = scene.get_by_id_mut(self.id()) else {
            return;
        };
        match self {
            Self::FadeIn { .. } => element.view.opacity = t,
            Self::FadeOut { .. } => element.view.opacity = 1.0 - t,
            Self::Morph { from, to, .. } => {
                let b = from.lerp(to, t);
                element.position = b.position();
                element.size = b.size();
            }
            Self::Reroute { from, to, .. } => {
                if let ElementKind::Edge(edge) = &mut element.kind {
                    edge.routing_points = interpolate_route(from, to, t);
                }
            }
        }
    }
}

/// Pairwise interpolation; the shorter route is padded with its last point.
/// The final frame is exactly `to`.
fn interpolate_route(from: &[Point], to: &[Point], t: f64) -> Vec<Point> {
    if t >= 1.0 || from.is_empty() || to.is_empty() {
        return to.to_vec();
    }
    let n = from.len().max(to.len());
    let at = |route: &[Point], i: usize| route[i.min(route.len() - 1)];
    (0..n).map(|i| at(from, i).lerp(at(to, i), t)).collect()
}

/// Every transition of one update, run together.
#[derive(Debug, Clone, PartialEq)]
pub struct CompoundAnimation {
    pub transitions: Vec<Transition>,
    pub duration: Duration,
    pub elapsed: Duration,
    pub easing: Easing,
}

impl CompoundAnimation {
    pub fn new(transitions: Vec<Transition>, duration: Duration) -> Self {
        Self {
            transitions,
            duration,
            elapsed: Duration::ZERO,
            easing: Easing::default(),
        }
    }

    pub fn len(&self) -> usize {
        self.transitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transitions.is_empty()
    }

    pub fn fade_outs(&self) -> impl Iterator<Item = ElementId> + '_ {
        self.transitions.iter().filter_map(|t| match t {
            Transition::FadeOut { id } => Some(*id),
            _ => None,
        })
    }

    pub fn fade_ins(&self) -> impl Iterator<Item = ElementId> + '_ {
        self.transitions.iter().filter_map(|t| match t {
            Transition::FadeIn { id } => Some(*id),
            _ => None,
        })
    }

    /// Linear progress in `[0, 1]`.
    pub fn progress(&self) -> f64 {
        if self.duration.is_zero() {
            return 1.0;
        }
        (self.elapsed.as_secs_f64() / self.duration.as_secs_f64()).min(1.0)
    }

    /// Write the state at the current progress into `scene`.
    pub fn apply(&self, scene: &mut SceneGraph) {
        let t = self.easing.apply(self.progress());
        for transition in &self.transitions {
            transition.apply(scene, t);
        }
    }

    /// Step forward by `dt`. Returns `true` once finished, after settling.
    pub fn advance(&mut self, scene: &mut SceneGraph, dt: Duration) -> bool {
        self.elapsed = (self.elapsed + dt).min(self.duration);
        if self.progress() >= 1.0 {
            self.settle(scene);
            return true;
        }
        self.apply(scene);
        false
    }

    /// Jump to the final state and prune faded-out clones.
    pub fn settle(&self, scene: &mut SceneGraph) {
        for transition in &self.transitions {
            transition.apply(scene, 1.0);
        }
        for id in self.fade_outs() {
            if let Some(idx) = scene.index_of(id) {
                let removed = scene.remove_subtree(idx);
                log::trace!("pruned {removed} faded element(s) at {id}");
            }
        }
    }
}

/// Animated viewport change.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewportAnimation {
    pub from: Viewport,
    pub to: Viewport,
    pub duration: Duration,
    pub elapsed: Duration,
    pub easing: Easing,
}

impl ViewportAnimation {
    pub fn new(from: Viewport, to: Viewport, duration: Duration) -> Self {
        Self {
            from,
            to,
            duration,
            elapsed: Duration::ZERO,
            easing: Easing::default(),
        }
    }

    /// Step forward and return the viewport to show, plus whether it is done.
    pub fn advance(&mut self, dt: Duration) -> (Viewport, bool) {
        self.elapsed = (self.elapsed + dt).min(self.duration);
        if self.duration.is_zero() || self.elapsed >= self.duration {
            return (self.to, true);
        }
        let t = self.elapsed.as_secs_f64() / self.duration.as_secs_f64();
        (self.from.lerp(&self.to, self.easing.apply(t)), false)
    }
}
