//! Hit testing: point → element lookup.
//!
//! Reverse-walks the scene (front-to-back) to find which element is at a
//! given model-space position. Geometry is taken from the scene itself:
//! shapes use their absolute bounds, edges their absolute route.

use elk_core::NodeIndex;
use elk_core::geometry::Point;
use elk_core::id::ElementId;
use elk_core::scene::{ElementKind, SceneGraph};

/// How far (model units) from an edge's polyline still counts as a hit.
pub const EDGE_HIT_TOLERANCE: f64 = 4.0;

/// Radius of the dot drawn for a junction point.
pub const JUNCTION_RADIUS: f64 = 2.0;

/// Find the topmost element at position (px, py).
/// Returns `None` if nothing is hit (background).
pub fn hit_test(scene: &SceneGraph, px: f64, py: f64) -> Option<ElementId> {
    hit_test_element(scene, scene.root, Point::new(px, py))
}

fn hit_test_element(scene: &SceneGraph, idx: NodeIndex, p: Point) -> Option<ElementId> {
    // Last painted = topmost
    for &child in scene.children(idx).iter().rev() {
        if let Some(hit) = hit_test_element(scene, child, p) {
            return Some(hit);
        }
    }

    let element = &scene.graph[idx];
    // Invisible elements (fully faded) never capture the pointer.
    if element.view.opacity <= 0.0 {
        return None;
    }
    let hit = match &element.kind {
        ElementKind::Graph | ElementKind::Symbol => false,
        ElementKind::Edge(edge) => {
            let origin = scene.absolute_position(idx);
            let route: Vec<Point> = edge
                .routing_points
                .iter()
                .map(|q| q.translate(origin.x, origin.y))
                .collect();
            near_polyline(&route, p, EDGE_HIT_TOLERANCE)
        }
        ElementKind::Junction => {
            let c = scene.absolute_position(idx);
            let (dx, dy) = (p.x - c.x, p.y - c.y);
            dx * dx + dy * dy <= JUNCTION_RADIUS * JUNCTION_RADIUS
        }
        _ => scene.absolute_bounds(idx).contains(p.x, p.y),
    };
    hit.then_some(element.id)
}

fn near_polyline(route: &[Point], p: Point, tolerance: f64) -> bool {
    route
        .windows(2)
        .any(|seg| distance_to_segment(p, seg[0], seg[1]) <= tolerance)
}

fn distance_to_segment(p: Point, a: Point, b: Point) -> f64 {
    let ab = b.sub(a);
    let ap = p.sub(a);
    let len2 = ab.x * ab.x + ab.y * ab.y;
    let t = if len2 == 0.0 {
        0.0
    } else {
        ((ap.x * ab.x + ap.y * ab.y) / len2).clamp(0.0, 1.0)
    };
    let closest = a.lerp(b, t);
    let (dx, dy) = (p.x - closest.x, p.y - closest.y);
    (dx * dx + dy * dy).sqrt()
}
