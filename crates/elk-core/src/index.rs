//! Id-indexed lookups over a [`SceneGraph`].
//!
//! Parents are found through the graph's incoming edge, never through
//! back-pointers on the elements, and ids resolve in O(1) via `id_index`.
//! Geometry helpers turn parent-relative positions into absolute model
//! coordinates for hit testing and viewport math.

use crate::geometry::{Bounds, Point};
use crate::id::ElementId;
use crate::scene::{ElementKind, SceneElement, SceneGraph};
use petgraph::graph::NodeIndex;

impl SceneGraph {
    /// Look up an element by id.
    pub fn get_by_id(&self, id: ElementId) -> Option<&SceneElement> {
        self.id_index.get(&id).map(|idx| &self.graph[*idx])
    }

    /// Look up an element mutably by id.
    pub fn get_by_id_mut(&mut self, id: ElementId) -> Option<&mut SceneElement> {
        self.id_index
            .get(&id)
            .copied()
            .map(|idx| &mut self.graph[idx])
    }

    /// Get the index for an ElementId.
    pub fn index_of(&self, id: ElementId) -> Option<NodeIndex> {
        self.id_index.get(&id).copied()
    }

    pub fn contains(&self, id: ElementId) -> bool {
        self.id_index.contains_key(&id)
    }

    /// Id of the element's parent, `None` for the root or unknown ids.
    pub fn parent_id(&self, id: ElementId) -> Option<ElementId> {
        let idx = self.index_of(id)?;
        self.parent(idx).map(|p| self.graph[p].id)
    }

    /// Nearest selectable element at or above `idx`.
    pub fn selectable_ancestor(&self, idx: NodeIndex) -> Option<NodeIndex> {
        let mut current = Some(idx);
        while let Some(i) = current {
            if self.graph[i].is_selectable() {
                return Some(i);
            }
            current = self.parent(i);
        }
        None
    }

    /// True if any id of `source`'s subtree at `idx` is present in `self`.
    pub fn contains_some(&self, source: &SceneGraph, idx: NodeIndex) -> bool {
        source
            .walk_from(idx)
            .into_iter()
            .any(|i| self.contains(source.graph[i].id))
    }

    /// Absolute position of an element's origin (sum of ancestor offsets).
    pub fn absolute_position(&self, idx: NodeIndex) -> Point {
        let mut p = self.graph[idx].position;
        let mut current = idx;
        while let Some(parent) = self.parent(current) {
            let offset = self.graph[parent].position;
            p = p.translate(offset.x, offset.y);
            current = parent;
        }
        p
    }

    /// Absolute bounding box of an element.
    ///
    /// Edges use the box around their route, which is expressed relative to
    /// the edge's container. Junctions are points.
    pub fn absolute_bounds(&self, idx: NodeIndex) -> Bounds {
        let element = &self.graph[idx];
        match &element.kind {
            ElementKind::Edge(edge) => {
                let origin = self.absolute_position(idx);
                Bounds::around(&edge.routing_points)
                    .map(|b| Bounds::new(b.x + origin.x, b.y + origin.y, b.width, b.height))
                    .unwrap_or_else(|| Bounds::from_parts(origin, Default::default()))
            }
            _ => Bounds::from_parts(self.absolute_position(idx), element.size),
        }
    }

    /// Union of the absolute bounds of `ids`. An empty slice means every
    /// element except the root; unknown ids are ignored. Yields
    /// [`Bounds::EMPTY`] when nothing contributes.
    pub fn bounds_of(&self, ids: &[ElementId]) -> Bounds {
        let indices: Vec<NodeIndex> = if ids.is_empty() {
            self.walk().into_iter().filter(|&i| i != self.root).collect()
        } else {
            ids.iter().filter_map(|id| self.index_of(*id)).collect()
        };
        indices
            .into_iter()
            .map(|i| self.absolute_bounds(i))
            .reduce(|acc, b| acc.union(&b))
            .unwrap_or(Bounds::EMPTY)
    }
}
