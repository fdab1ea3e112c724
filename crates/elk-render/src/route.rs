//! Edge route geometry: routing angles, connector placement and the path
//! shortening applied under connector glyphs.
//!
//! Angles follow the local tangent at each end of the route. The start angle
//! points from the second routing point back to the first, the end angle
//! from the second-to-last point to the last, so a connector offset given
//! for a glyph pointing along +x is rotated onto the edge.

use elk_core::geometry::Point;
use elk_core::id::ElementId;
use elk_core::scene::SceneElement;
use elk_core::symbols::{Connector, Symbols};

/// Reason reported for edges rendered as dangling.
pub const DANGLING_REASON: &str = "Cannot compute route";

/// Rotate a connector offset `(ox, oy)` by the routing angle `r`.
pub fn rotate_offset(offset: Point, r: f64) -> Point {
    offset.rotate(r)
}

/// Angle at the source end of a route, `None` for fewer than two points.
pub fn start_angle(route: &[Point]) -> Option<f64> {
    match route {
        [first, second, ..] => Some(second.sub(*first).angle()),
        _ => None,
    }
}

/// Angle at the target end of a route, `None` for fewer than two points.
pub fn end_angle(route: &[Point]) -> Option<f64> {
    match route {
        [.., before, last] => Some(before.sub(*last).angle()),
        _ => None,
    }
}

/// Rotated `symbol_offset` of a connector; zero when there is none.
pub fn anchor_offset(connector: Option<&Connector>, r: f64) -> Point {
    connector
        .and_then(|c| c.symbol_offset)
        .map_or(Point::ORIGIN, |p| rotate_offset(p, r))
}

/// Rotated `path_offset` of a connector; zero when there is none.
pub fn path_offset(connector: Option<&Connector>, r: f64) -> Point {
    connector
        .and_then(|c| c.path_offset)
        .map_or(Point::ORIGIN, |p| rotate_offset(p, r))
}

/// Where to draw a connector glyph.
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectorPlacement {
    /// Library name, also used as a CSS class on the glyph.
    pub name: String,
    /// Namespaced symbol definition the glyph references.
    pub href: ElementId,
    /// Anchor in the edge's coordinate space.
    pub anchor: Point,
    /// Rotation in radians.
    pub angle: f64,
}

impl ConnectorPlacement {
    pub fn angle_degrees(&self) -> f64 {
        self.angle.to_degrees()
    }

    /// SVG transform placing the glyph at its anchor.
    pub fn svg_transform(&self) -> String {
        let (x, y) = (self.anchor.x, self.anchor.y);
        format!(
            "rotate({} {x} {y}) translate({x} {y})",
            self.angle_degrees()
        )
    }
}

/// A routed edge ready for drawing.
#[derive(Debug, Clone, PartialEq)]
pub struct RoutedEdge {
    /// Polyline to stroke; both ends pulled back by the connectors' path offsets.
    pub line: Vec<Point>,
    pub start: Option<ConnectorPlacement>,
    pub end: Option<ConnectorPlacement>,
}

/// Geometry of one edge element.
#[derive(Debug, Clone, PartialEq)]
pub enum EdgeGeometry {
    Routed(RoutedEdge),
    /// The route could not be computed; draw a marker instead.
    Dangling { reason: &'static str },
}

impl EdgeGeometry {
    pub fn is_dangling(&self) -> bool {
        matches!(self, Self::Dangling { .. })
    }
}

/// Compute the drawable geometry of an edge element.
///
/// Non-edge elements and edges with fewer than two routing points are
/// dangling. Connector names come from `properties.shape.start`/`end` and
/// resolve through the scene's symbols; unknown names draw no glyph.
pub fn edge_geometry(element: &SceneElement, symbols: &Symbols) -> EdgeGeometry {
    let Some(edge) = element.edge() else {
        return EdgeGeometry::Dangling {
            reason: DANGLING_REASON,
        };
    };
    let route = &edge.routing_points;
    let (Some(r_start), Some(r_end)) = (start_angle(route), end_angle(route)) else {
        log::debug!("edge {} is dangling: {DANGLING_REASON}", element.id);
        return EdgeGeometry::Dangling {
            reason: DANGLING_REASON,
        };
    };

    let shape = element.properties.as_ref().and_then(|p| p.shape.as_ref());
    let start = symbols.connector(shape.and_then(|s| s.start.as_deref()));
    let end = symbols.connector(shape.and_then(|s| s.end.as_deref()));

    let mut line = route.clone();
    let first = line[0];
    let last_idx = line.len() - 1;
    let last = line[last_idx];
    let s = path_offset(start, r_start);
    let e = path_offset(end, r_end);
    line[0] = first.sub(s);
    line[last_idx] = last.sub(e);

    let place = |connector: Option<&Connector>, at: Point, r: f64| {
        connector.map(|c| ConnectorPlacement {
            name: c.name.clone(),
            href: c.href,
            anchor: at.sub(anchor_offset(Some(c), r)),
            angle: r,
        })
    };

    EdgeGeometry::Routed(RoutedEdge {
        line,
        start: place(start, first, r_start),
        end: place(end, last, r_end),
    })
}
