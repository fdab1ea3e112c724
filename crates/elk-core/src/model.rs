//! Layout-result input model.
//!
//! These types mirror the ELK JSON graph produced by an external layout
//! engine: nodes own children, ports, labels and edges; every element carries
//! an optional id, optional geometry, a free-form `properties` bag and
//! `layoutOptions`. Geometry is relative to the owning container.
//!
//! Edges come in two mutually exclusive shapes (primitive and extended) and
//! are classified once, at deserialization time, into [`EdgeRouting`].

use crate::geometry::Point;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// ELK layout options (`org.eclipse.elk.*` keys).
pub type LayoutOptions = IndexMap<String, Value>;

/// Read a numeric layout option that may be encoded as a string or a number.
pub fn option_f64(options: Option<&LayoutOptions>, key: &str) -> Option<f64> {
    match options?.get(key)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

// ─── Properties ──────────────────────────────────────────────────────────

/// The `shape` descriptor: rendering subtype plus optional symbol references.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ShapeDescriptor {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub shape_type: Option<String>,
    /// Symbol reference used by `use`-style nodes.
    #[serde(rename = "use", default, skip_serializing_if = "Option::is_none")]
    pub use_symbol: Option<String>,
    /// Connector drawn at the source end of an edge.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<String>,
    /// Connector drawn at the target end of an edge.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

/// Free-form element properties.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Properties {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub css_classes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shape: Option<ShapeDescriptor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selectable: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_symbol: Option<bool>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

impl Properties {
    /// The rendering subtype, if a non-empty one was given.
    pub fn shape_type(&self) -> Option<&str> {
        self.shape
            .as_ref()
            .and_then(|s| s.shape_type.as_deref())
            .filter(|t| !t.is_empty())
    }

    /// Trimmed, whitespace-split CSS classes. Never fails; empty when absent.
    pub fn classes(&self) -> Vec<String> {
        self.css_classes
            .as_deref()
            .map(|c| c.split_whitespace().map(str::to_string).collect())
            .unwrap_or_default()
    }
}

// ─── Shapes ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutNode {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<LayoutNode>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ports: Vec<LayoutPort>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub labels: Vec<LayoutLabel>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub edges: Vec<LayoutEdge>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<Properties>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layout_options: Option<LayoutOptions>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutPort {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub labels: Vec<LayoutLabel>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<Properties>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layout_options: Option<LayoutOptions>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutLabel {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    /// Sub-labels composed into this label (e.g. icon + text).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub labels: Vec<LayoutLabel>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<Properties>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layout_options: Option<LayoutOptions>,
}

// ─── Edges ───────────────────────────────────────────────────────────────

/// A routed section of an extended edge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeSection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub start_point: Point,
    pub end_point: Point,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub bend_points: Vec<Point>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub incoming_shape: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outgoing_shape: Option<String>,
}

/// Single source/target edge with optional inline route.
#[derive(Debug, Clone, PartialEq)]
pub struct PrimitiveEdge {
    pub source: String,
    pub source_port: Option<String>,
    pub target: String,
    pub target_port: Option<String>,
    pub source_point: Option<Point>,
    pub target_point: Option<Point>,
    pub bend_points: Vec<Point>,
}

/// Hyperedge form: non-empty source/target lists plus routed sections.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtendedEdge {
    pub sources: Vec<String>,
    pub targets: Vec<String>,
    pub sections: Vec<EdgeSection>,
}

/// The classified shape of an edge.
#[derive(Debug, Clone, PartialEq)]
pub enum EdgeRouting {
    Primitive(PrimitiveEdge),
    Extended(ExtendedEdge),
    /// Neither form matched; the edge renders dangling.
    Unclassified,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawEdge", into = "RawEdge")]
pub struct LayoutEdge {
    pub id: Option<String>,
    pub routing: EdgeRouting,
    pub junction_points: Vec<Point>,
    pub labels: Vec<LayoutLabel>,
    pub properties: Option<Properties>,
    pub layout_options: Option<LayoutOptions>,
}

impl LayoutEdge {
    /// Concatenated route in draw order. Empty when no route was computed.
    pub fn routing_points(&self) -> Vec<Point> {
        let mut points = Vec::new();
        match &self.routing {
            EdgeRouting::Primitive(p) => {
                points.extend(p.source_point);
                points.extend(p.bend_points.iter().copied());
                points.extend(p.target_point);
            }
            EdgeRouting::Extended(e) => {
                for section in &e.sections {
                    points.push(section.start_point);
                    points.extend(section.bend_points.iter().copied());
                    points.push(section.end_point);
                }
            }
            EdgeRouting::Unclassified => {}
        }
        points
    }

    /// `(source, target)` endpoint ids; extended edges report their first pair.
    pub fn endpoints(&self) -> (Option<&str>, Option<&str>) {
        match &self.routing {
            EdgeRouting::Primitive(p) => (Some(p.source.as_str()), Some(p.target.as_str())),
            EdgeRouting::Extended(e) => (
                e.sources.first().map(String::as_str),
                e.targets.first().map(String::as_str),
            ),
            EdgeRouting::Unclassified => (None, None),
        }
    }
}

/// Wire form of an edge, before classification.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawEdge {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    source_port: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    target: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    target_port: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    source_point: Option<Point>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    target_point: Option<Point>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    bend_points: Vec<Point>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    sources: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    targets: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    sections: Vec<EdgeSection>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    junction_points: Vec<Point>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    labels: Vec<LayoutLabel>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    properties: Option<Properties>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    layout_options: Option<LayoutOptions>,
}

impl From<RawEdge> for LayoutEdge {
    fn from(raw: RawEdge) -> Self {
        let routing = match (raw.source, raw.target) {
            (Some(source), Some(target)) => EdgeRouting::Primitive(PrimitiveEdge {
                source,
                source_port: raw.source_port,
                target,
                target_port: raw.target_port,
                source_point: raw.source_point,
                target_point: raw.target_point,
                bend_points: raw.bend_points,
            }),
            _ if !raw.sources.is_empty() && !raw.targets.is_empty() => {
                EdgeRouting::Extended(ExtendedEdge {
                    sources: raw.sources,
                    targets: raw.targets,
                    sections: raw.sections,
                })
            }
            _ => EdgeRouting::Unclassified,
        };
        Self {
            id: raw.id,
            routing,
            junction_points: raw.junction_points,
            labels: raw.labels,
            properties: raw.properties,
            layout_options: raw.layout_options,
        }
    }
}

impl From<LayoutEdge> for RawEdge {
    fn from(edge: LayoutEdge) -> Self {
        let mut raw = RawEdge {
            id: edge.id,
            junction_points: edge.junction_points,
            labels: edge.labels,
            properties: edge.properties,
            layout_options: edge.layout_options,
            ..Default::default()
        };
        match edge.routing {
            EdgeRouting::Primitive(p) => {
                raw.source = Some(p.source);
                raw.source_port = p.source_port;
                raw.target = Some(p.target);
                raw.target_port = p.target_port;
                raw.source_point = p.source_point;
                raw.target_point = p.target_point;
                raw.bend_points = p.bend_points;
            }
            EdgeRouting::Extended(e) => {
                raw.sources = e.sources;
                raw.targets = e.targets;
                raw.sections = e.sections;
            }
            EdgeRouting::Unclassified => {}
        }
        raw
    }
}

// ─── Borrowed element view ───────────────────────────────────────────────

/// A borrowed view of any layout element, for document-order traversal.
#[derive(Debug, Clone, Copy)]
pub enum LayoutElement<'a> {
    Node(&'a LayoutNode),
    Port(&'a LayoutPort),
    Label(&'a LayoutLabel),
    Edge(&'a LayoutEdge),
}

impl<'a> LayoutElement<'a> {
    pub fn id(&self) -> Option<&'a str> {
        match self {
            Self::Node(n) => n.id.as_deref(),
            Self::Port(p) => p.id.as_deref(),
            Self::Label(l) => l.id.as_deref(),
            Self::Edge(e) => e.id.as_deref(),
        }
    }
}

impl LayoutNode {
    /// Parse a layout tree from ELK JSON.
    pub fn from_json(value: Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value)
    }

    /// Every descendant element in transform order, excluding `self`.
    ///
    /// Per node: children (recursively), then ports, then labels, then edges.
    pub fn descendants(&self) -> Vec<LayoutElement<'_>> {
        let mut out = Vec::new();
        collect_node(self, &mut out);
        out
    }
}

fn collect_node<'a>(node: &'a LayoutNode, out: &mut Vec<LayoutElement<'a>>) {
    for child in &node.children {
        out.push(LayoutElement::Node(child));
        collect_node(child, out);
    }
    for port in &node.ports {
        out.push(LayoutElement::Port(port));
        collect_labels(&port.labels, out);
    }
    collect_labels(&node.labels, out);
    for edge in &node.edges {
        out.push(LayoutElement::Edge(edge));
        collect_labels(&edge.labels, out);
    }
}

fn collect_labels<'a>(labels: &'a [LayoutLabel], out: &mut Vec<LayoutElement<'a>>) {
    for label in labels {
        out.push(LayoutElement::Label(label));
        collect_labels(&label.labels, out);
    }
}

/// Visit every label in the tree mutably, sub-labels after their owner.
pub fn for_each_label_mut(node: &mut LayoutNode, f: &mut impl FnMut(&mut LayoutLabel)) {
    for child in &mut node.children {
        for_each_label_mut(child, f);
    }
    for port in &mut node.ports {
        visit_labels_mut(&mut port.labels, f);
    }
    visit_labels_mut(&mut node.labels, f);
    for edge in &mut node.edges {
        visit_labels_mut(&mut edge.labels, f);
    }
}

fn visit_labels_mut(labels: &mut [LayoutLabel], f: &mut impl FnMut(&mut LayoutLabel)) {
    for label in labels {
        f(label);
        visit_labels_mut(&mut label.labels, f);
    }
}

// ─── Symbol library ──────────────────────────────────────────────────────

/// One reusable shape template.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SymbolEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Element tree rendered once and referenced by `use`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub element: Option<LayoutNode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<Properties>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    /// Anchor of the connector glyph relative to the edge endpoint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub symbol_offset: Option<Point>,
    /// How far the edge line is shortened under the connector.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path_offset: Option<Point>,
}

impl SymbolEntry {
    pub fn is_connector(&self) -> bool {
        self.symbol_offset.is_some() || self.path_offset.is_some()
    }
}

/// Named library of shape templates, in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SymbolLibrary {
    #[serde(default)]
    pub library: IndexMap<String, SymbolEntry>,
}

impl SymbolLibrary {
    pub fn from_json(value: Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value)
    }
}
