//! Renderable scene graph.
//!
//! The scene is a tree stored in a `StableDiGraph` where edges go from
//! parent → child. Child order is significant (it is the paint order) and is
//! the order in which children were attached. An `id_index` maps every
//! element id to its graph index so lookups never walk the tree.
//!
//! The symbol library lives beside the tree in [`SceneGraph::symbols`]; its
//! ids are namespaced and never enter `id_index`.

use crate::geometry::{Bounds, Dimension, Point};
use crate::id::ElementId;
use crate::model::{LayoutOptions, Properties};
use crate::symbols::Symbols;
use petgraph::Direction;
use petgraph::graph::NodeIndex;
use petgraph::stable_graph::StableDiGraph;
use serde_json::{Map, Value, json};
use smallvec::SmallVec;
use std::collections::HashMap;

// ─── Elements ────────────────────────────────────────────────────────────

/// Edge-specific scene data.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EdgeData {
    pub source_id: Option<ElementId>,
    pub target_id: Option<ElementId>,
    /// Route in draw order, relative to the edge's container.
    pub routing_points: Vec<Point>,
}

impl EdgeData {
    /// An edge whose route could not be computed.
    pub fn is_dangling(&self) -> bool {
        self.routing_points.len() < 2
    }
}

/// The variant of a scene element.
#[derive(Debug, Clone, PartialEq)]
pub enum ElementKind {
    Graph,
    Node,
    Port,
    Label { text: Option<String> },
    Edge(EdgeData),
    Junction,
    Symbol,
}

impl ElementKind {
    /// Rendering subtype used when the element's shape names none.
    pub fn default_type(&self) -> &'static str {
        match self {
            Self::Graph => "graph",
            Self::Node => "node",
            Self::Port => "port",
            Self::Label { .. } => "label",
            Self::Edge(_) => "edge",
            Self::Junction => "junction",
            Self::Symbol => "symbol",
        }
    }

    /// Whether the element can be faded in/out.
    pub fn is_fadeable(&self) -> bool {
        !matches!(self, Self::Graph | Self::Symbol)
    }

    /// Whether the element can take part in selection.
    pub fn is_selectable(&self) -> bool {
        matches!(
            self,
            Self::Node | Self::Port | Self::Label { .. } | Self::Edge(_)
        )
    }
}

/// Transient, view-only state. Never part of structural comparisons.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewState {
    pub selected: bool,
    pub hover_feedback: bool,
    pub opacity: f64,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            selected: false,
            hover_feedback: false,
            opacity: 1.0,
        }
    }
}

/// A single element in the scene graph.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneElement {
    pub id: ElementId,
    pub kind: ElementKind,
    /// Rendering subtype (e.g. `node`, `node:round`, `edge:dashed`).
    pub type_name: String,
    /// Position relative to the parent element.
    pub position: Point,
    pub size: Dimension,
    pub css_classes: SmallVec<[String; 2]>,
    pub properties: Option<Properties>,
    pub layout_options: Option<LayoutOptions>,
    pub view: ViewState,
}

impl SceneElement {
    pub fn new(id: ElementId, kind: ElementKind) -> Self {
        let type_name = kind.default_type().to_string();
        Self {
            id,
            kind,
            type_name,
            position: Point::ORIGIN,
            size: Dimension::default(),
            css_classes: SmallVec::new(),
            properties: None,
            layout_options: None,
            view: ViewState::default(),
        }
    }

    /// Bounds relative to the parent element.
    pub fn bounds(&self) -> Bounds {
        Bounds::from_parts(self.position, self.size)
    }

    pub fn edge(&self) -> Option<&EdgeData> {
        match &self.kind {
            ElementKind::Edge(data) => Some(data),
            _ => None,
        }
    }

    /// Selectable unless the kind forbids it or `properties.selectable` is false.
    pub fn is_selectable(&self) -> bool {
        self.kind.is_selectable()
            && self
                .properties
                .as_ref()
                .and_then(|p| p.selectable)
                .unwrap_or(true)
    }

    /// Equal in everything but transient view state.
    pub fn same_content(&self, other: &SceneElement) -> bool {
        self.id == other.id
            && self.kind == other.kind
            && self.type_name == other.type_name
            && self.position == other.position
            && self.size == other.size
            && self.css_classes == other.css_classes
            && self.properties == other.properties
            && self.layout_options == other.layout_options
    }

    /// JSON form of this element without its children.
    pub fn to_json(&self) -> Value {
        let mut obj = Map::new();
        obj.insert("id".into(), json!(self.id.as_str()));
        obj.insert("type".into(), json!(self.type_name));
        obj.insert("position".into(), json!(self.position));
        obj.insert("size".into(), json!(self.size));
        obj.insert("cssClasses".into(), json!(self.css_classes.as_slice()));
        match &self.kind {
            ElementKind::Label { text: Some(text) } => {
                obj.insert("text".into(), json!(text));
            }
            ElementKind::Edge(edge) => {
                obj.insert(
                    "sourceId".into(),
                    json!(edge.source_id.map(|id| id.as_str().to_string()).unwrap_or_default()),
                );
                obj.insert(
                    "targetId".into(),
                    json!(edge.target_id.map(|id| id.as_str().to_string()).unwrap_or_default()),
                );
                obj.insert("routingPoints".into(), json!(edge.routing_points));
            }
            _ => {}
        }
        if let Some(props) = &self.properties {
            obj.insert("properties".into(), json!(props));
        }
        if let Some(opts) = &self.layout_options {
            obj.insert("layoutOptions".into(), json!(opts));
        }
        Value::Object(obj)
    }
}

// ─── Scene Graph ─────────────────────────────────────────────────────────

/// A complete scene: element tree, id index and the namespaced symbols.
#[derive(Debug, Clone)]
pub struct SceneGraph {
    /// The underlying directed graph.
    pub graph: StableDiGraph<SceneElement, ()>,

    /// The root (`Graph`) element.
    pub root: NodeIndex,

    /// Index from ElementId → NodeIndex for fast lookup.
    pub id_index: HashMap<ElementId, NodeIndex>,

    /// Symbol definitions, outside the child list.
    pub symbols: Symbols,
}

impl SceneGraph {
    /// Create a scene holding only a root graph element.
    #[must_use]
    pub fn new(root_id: ElementId) -> Self {
        let mut graph = StableDiGraph::new();
        let root = graph.add_node(SceneElement::new(root_id, ElementKind::Graph));
        let mut id_index = HashMap::new();
        id_index.insert(root_id, root);
        Self {
            graph,
            root,
            id_index,
            symbols: Symbols::default(),
        }
    }

    /// The empty scene shown before the first render.
    pub fn empty() -> Self {
        Self::new(ElementId::intern("root"))
    }

    /// Add an element as the last child of `parent`.
    pub fn add_node(&mut self, parent: NodeIndex, element: SceneElement) -> NodeIndex {
        let id = element.id;
        let idx = self.graph.add_node(element);
        self.graph.add_edge(parent, idx, ());
        self.id_index.insert(id, idx);
        idx
    }

    /// Remove an element and all of its descendants, keeping `id_index` in sync.
    pub fn remove_subtree(&mut self, idx: NodeIndex) -> usize {
        let doomed = self.walk_from(idx);
        for &i in &doomed {
            if let Some(removed) = self.graph.remove_node(i)
                && self.id_index.get(&removed.id) == Some(&i)
            {
                self.id_index.remove(&removed.id);
            }
        }
        doomed.len()
    }

    /// Get the parent index of an element.
    pub fn parent(&self, idx: NodeIndex) -> Option<NodeIndex> {
        self.graph
            .neighbors_directed(idx, Direction::Incoming)
            .next()
    }

    /// Children in paint order.
    ///
    /// petgraph lists neighbors most-recent-edge first, so reversing yields
    /// attachment order regardless of index reuse in the stable graph.
    pub fn children(&self, idx: NodeIndex) -> Vec<NodeIndex> {
        let mut children: Vec<NodeIndex> = self
            .graph
            .neighbors_directed(idx, Direction::Outgoing)
            .collect();
        children.reverse();
        children
    }

    pub fn root_element(&self) -> &SceneElement {
        &self.graph[self.root]
    }

    /// Number of elements, root included.
    pub fn len(&self) -> usize {
        self.graph.node_count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() <= 1
    }

    /// Pre-order traversal of the whole tree.
    pub fn walk(&self) -> Vec<NodeIndex> {
        self.walk_from(self.root)
    }

    /// Pre-order traversal starting at `idx`.
    pub fn walk_from(&self, idx: NodeIndex) -> Vec<NodeIndex> {
        let mut out = Vec::new();
        let mut stack = vec![idx];
        while let Some(i) = stack.pop() {
            if !self.graph.contains_node(i) {
                continue;
            }
            out.push(i);
            let mut children = self.children(i);
            children.reverse();
            stack.extend(children);
        }
        out
    }

    /// Element ids in pre-order, root included.
    pub fn ids(&self) -> Vec<ElementId> {
        self.walk().into_iter().map(|i| self.graph[i].id).collect()
    }

    /// Deep-copy the subtree rooted at `source_idx` of `source` under `parent`.
    pub fn graft_subtree(
        &mut self,
        source: &SceneGraph,
        source_idx: NodeIndex,
        parent: NodeIndex,
    ) -> NodeIndex {
        let copy = self.add_node(parent, source.graph[source_idx].clone());
        for child in source.children(source_idx) {
            self.graft_subtree(source, child, copy);
        }
        copy
    }

    /// Nested JSON tree (children inline), excluding view state.
    pub fn to_json(&self) -> Value {
        let mut root = self.subtree_json(self.root);
        if let Value::Object(obj) = &mut root {
            obj.insert("symbols".into(), self.symbols.to_json());
        }
        root
    }

    fn subtree_json(&self, idx: NodeIndex) -> Value {
        let mut value = self.graph[idx].to_json();
        let children: Vec<Value> = self
            .children(idx)
            .into_iter()
            .map(|c| self.subtree_json(c))
            .collect();
        if let Value::Object(obj) = &mut value {
            obj.insert("children".into(), Value::Array(children));
        }
        value
    }

    /// Same tree shape, order and element content (view state ignored).
    pub fn structurally_eq(&self, other: &SceneGraph) -> bool {
        self.subtree_eq(self.root, other, other.root) && self.symbols == other.symbols
    }

    fn subtree_eq(&self, idx: NodeIndex, other: &SceneGraph, other_idx: NodeIndex) -> bool {
        if !self.graph[idx].same_content(&other.graph[other_idx]) {
            return false;
        }
        let ours = self.children(idx);
        let theirs = other.children(other_idx);
        ours.len() == theirs.len()
            && ours
                .iter()
                .zip(&theirs)
                .all(|(&a, &b)| self.subtree_eq(a, other, b))
    }
}

impl Default for SceneGraph {
    fn default() -> Self {
        Self::empty()
    }
}
