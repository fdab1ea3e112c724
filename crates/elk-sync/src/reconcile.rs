//! Scene reconciler: diff the live scene against a freshly transformed one.
//!
//! Elements are matched by id across both trees:
//!
//! - **updated** (in both): transient view state is carried over; changed
//!   geometry morphs from the old to the new value.
//! - **entering** (new only): fadeable elements start transparent and fade in.
//!   Only the topmost entering element of a new subtree fades; its
//!   descendants are drawn inside it.
//! - **exiting** (old only): unless some id of the old subtree still exists
//!   in the new tree (the element moved), the old subtree is cloned under its
//!   former parent in the new tree and fades out. Clones are pruned when the
//!   animation settles.
//!
//! The next scene is always the target state; the animation only describes
//! how to get there.

use crate::animation::{CompoundAnimation, Transition};
use elk_core::NodeIndex;
use elk_core::scene::{ElementKind, SceneGraph};
use std::time::Duration;

/// How to present an update.
#[derive(Debug, Clone, PartialEq)]
pub enum AnimationPlan {
    /// Nothing to animate; show the new scene as is.
    Apply,
    Animate(CompoundAnimation),
}

impl AnimationPlan {
    pub fn animation_count(&self) -> usize {
        match self {
            Self::Apply => 0,
            Self::Animate(anim) => anim.len(),
        }
    }
}

/// Diff `old` against `new`, preparing `new` for presentation.
///
/// With `animate` off, view state is still carried over and nothing is
/// scheduled.
pub fn reconcile(
    old: &SceneGraph,
    new: &mut SceneGraph,
    duration: Duration,
    animate: bool,
) -> AnimationPlan {
    let mut transitions = Vec::new();

    for idx in new.walk() {
        let id = new.graph[idx].id;
        match old.get_by_id(id) {
            Some(previous) => {
                let current = &mut new.graph[idx];
                current.view.selected = previous.view.selected;
                current.view.hover_feedback = previous.view.hover_feedback;
                if !animate {
                    continue;
                }
                if let ElementKind::Edge(after) = &mut current.kind {
                    if let Some(before) = previous.edge()
                        && before.routing_points != after.routing_points
                    {
                        transitions.push(Transition::Reroute {
                            id,
                            from: before.routing_points.clone(),
                            to: after.routing_points.clone(),
                        });
                        after.routing_points = before.routing_points.clone();
                    }
                    continue;
                }
                let (from, to) = (previous.bounds(), current.bounds());
                if from != to {
                    transitions.push(Transition::Morph { id, from, to });
                    current.position = from.position();
                    current.size = from.size();
                }
            }
            None => {
                if animate && is_entering_root(old, new, idx) {
                    let current = &mut new.graph[idx];
                    current.view.opacity = 0.0;
                    transitions.push(Transition::FadeIn { id });
                }
            }
        }
    }

    if animate {
        for idx in exit_roots(old, new) {
            let Some(parent) = old
                .parent(idx)
                .and_then(|p| new.index_of(old.graph[p].id))
            else {
                continue;
            };
            new.graft_subtree(old, idx, parent);
            let id = old.graph[idx].id;
            log::trace!("fading out {id}");
            transitions.push(Transition::FadeOut { id });
        }
    }

    if transitions.is_empty() {
        AnimationPlan::Apply
    } else {
        log::debug!("reconcile scheduled {} transition(s)", transitions.len());
        let animation = CompoundAnimation::new(transitions, duration);
        animation.apply(new);
        AnimationPlan::Animate(animation)
    }
}

fn is_entering_root(old: &SceneGraph, new: &SceneGraph, idx: NodeIndex) -> bool {
    new.graph[idx].kind.is_fadeable()
        && new
            .parent(idx)
            .is_some_and(|p| old.contains(new.graph[p].id))
}

/// Removed child elements whose former parent survives and whose subtree
/// shares no id with the new tree. Collected before any clone is grafted.
fn exit_roots(old: &SceneGraph, new: &SceneGraph) -> Vec<NodeIndex> {
    old.walk()
        .into_iter()
        .filter(|&idx| {
            let element = &old.graph[idx];
            element.kind.is_fadeable()
                && !new.contains(element.id)
                && old
                    .parent(idx)
                    .is_some_and(|p| new.contains(old.graph[p].id))
                && !new.contains_some(old, idx)
        })
        .collect()
}
