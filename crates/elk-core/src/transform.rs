//! Graph transformer: layout-result tree → [`SceneGraph`].
//!
//! A single document-order walk. For every node the output children are, in
//! order, its child nodes, its ports, its labels and its edges. Edges own
//! their junctions followed by their labels; labels own their sub-labels.
//!
//! The only state kept across the walk is the set of ids seen so far. A
//! missing or repeated id aborts the whole transform.

use crate::error::TransformError;
use crate::geometry::{Dimension, Point};
use crate::id::ElementId;
use crate::model::{
    EdgeRouting, LayoutEdge, LayoutLabel, LayoutNode, LayoutOptions, LayoutPort, Properties,
    SymbolLibrary,
};
use crate::scene::{EdgeData, ElementKind, SceneElement, SceneGraph};
use crate::symbols::transform_symbols;
use petgraph::graph::NodeIndex;
use std::collections::HashSet;

/// Id used for the root graph when the layout tree names none.
pub const DEFAULT_ROOT_ID: &str = "root";

/// Transform a layout tree and its symbol library into a scene.
///
/// `prefix` namespaces symbol definition ids for this diagram instance.
pub fn transform(
    root: &LayoutNode,
    library: &SymbolLibrary,
    prefix: &str,
) -> Result<SceneGraph, TransformError> {
    let root_id = root
        .id
        .as_deref()
        .filter(|id| !id.is_empty())
        .unwrap_or(DEFAULT_ROOT_ID);

    let mut transformer = Transformer {
        seen: HashSet::new(),
        scene: SceneGraph::new(ElementId::intern(root_id)),
    };
    transformer.seen.insert(root_id.to_string());

    let root_idx = transformer.scene.root;
    {
        let graph_el = &mut transformer.scene.graph[root_idx];
        apply_common(
            graph_el,
            root.properties.as_ref(),
            root.layout_options.as_ref(),
        );
    }
    transformer.node_contents(root, root_idx)?;

    let mut scene = transformer.scene;
    scene.symbols = transform_symbols(library, prefix);
    log::debug!(
        "transformed layout {root_id}: {} elements, {} symbols",
        scene.len(),
        scene.symbols.children.len()
    );
    Ok(scene)
}

struct Transformer {
    seen: HashSet<String>,
    scene: SceneGraph,
}

impl Transformer {
    fn check_id(&mut self, kind: &'static str, id: Option<&str>) -> Result<ElementId, TransformError> {
        let id = match id {
            Some(id) if !id.is_empty() => id,
            _ => return Err(TransformError::MissingId { kind }),
        };
        if !self.seen.insert(id.to_string()) {
            return Err(TransformError::DuplicateId(id.to_string()));
        }
        Ok(ElementId::intern(id))
    }

    fn node_contents(&mut self, node: &LayoutNode, parent: NodeIndex) -> Result<(), TransformError> {
        for child in &node.children {
            self.node(child, parent)?;
        }
        for port in &node.ports {
            self.port(port, parent)?;
        }
        for label in &node.labels {
            self.label(label, parent)?;
        }
        for edge in &node.edges {
            self.edge(edge, parent)?;
        }
        Ok(())
    }

    fn node(&mut self, node: &LayoutNode, parent: NodeIndex) -> Result<(), TransformError> {
        let id = self.check_id("node", node.id.as_deref())?;
        let mut element = SceneElement::new(id, ElementKind::Node);
        element.position = position(node.x, node.y);
        element.size = size(node.width, node.height);
        apply_common(&mut element, node.properties.as_ref(), node.layout_options.as_ref());
        log::trace!("node {id}");

        let idx = self.scene.add_node(parent, element);
        self.node_contents(node, idx)
    }

    fn port(&mut self, port: &LayoutPort, parent: NodeIndex) -> Result<(), TransformError> {
        let id = self.check_id("port", port.id.as_deref())?;
        let mut element = SceneElement::new(id, ElementKind::Port);
        element.position = position(port.x, port.y);
        element.size = size(port.width, port.height);
        apply_common(&mut element, port.properties.as_ref(), port.layout_options.as_ref());
        log::trace!("port {id}");

        let idx = self.scene.add_node(parent, element);
        for label in &port.labels {
            self.label(label, idx)?;
        }
        Ok(())
    }

    fn label(&mut self, label: &LayoutLabel, parent: NodeIndex) -> Result<(), TransformError> {
        let id = self.check_id("label", label.id.as_deref())?;
        let mut element = SceneElement::new(
            id,
            ElementKind::Label {
                text: label.text.clone(),
            },
        );
        element.position = position(label.x, label.y);
        element.size = size(label.width, label.height);
        apply_common(&mut element, label.properties.as_ref(), label.layout_options.as_ref());
        log::trace!("label {id}");

        let idx = self.scene.add_node(parent, element);
        for sub in &label.labels {
            self.label(sub, idx)?;
        }
        Ok(())
    }

    fn edge(&mut self, edge: &LayoutEdge, parent: NodeIndex) -> Result<(), TransformError> {
        let id = self.check_id("edge", edge.id.as_deref())?;
        if let EdgeRouting::Extended(extended) = &edge.routing {
            for section in &extended.sections {
                self.check_id("edge section", section.id.as_deref())?;
            }
        }

        let (source, target) = edge.endpoints();
        let data = EdgeData {
            source_id: source.map(ElementId::intern),
            target_id: target.map(ElementId::intern),
            routing_points: edge.routing_points(),
        };
        if data.is_dangling() {
            log::debug!("edge {id} has no computed route");
        }
        let mut element = SceneElement::new(id, ElementKind::Edge(data));
        apply_common(&mut element, edge.properties.as_ref(), edge.layout_options.as_ref());
        log::trace!("edge {id}");

        let idx = self.scene.add_node(parent, element);
        for (i, point) in edge.junction_points.iter().enumerate() {
            let junction_id = ElementId::junction(id, i);
            self.check_id("junction", Some(junction_id.as_str()))?;
            let mut junction = SceneElement::new(junction_id, ElementKind::Junction);
            junction.position = *point;
            self.scene.add_node(idx, junction);
        }
        for label in &edge.labels {
            self.label(label, idx)?;
        }
        Ok(())
    }
}

fn position(x: Option<f64>, y: Option<f64>) -> Point {
    Point::new(x.unwrap_or(0.0), y.unwrap_or(0.0))
}

fn size(width: Option<f64>, height: Option<f64>) -> Dimension {
    Dimension::new(width.unwrap_or(0.0), height.unwrap_or(0.0))
}

/// Rendering subtype, css classes and the copied property/option bags.
fn apply_common(
    element: &mut SceneElement,
    properties: Option<&Properties>,
    layout_options: Option<&LayoutOptions>,
) {
    if let Some(props) = properties {
        if let Some(t) = props.shape_type() {
            element.type_name = t.to_string();
        }
        element.css_classes = props.classes().into_iter().collect();
    }
    element.properties = properties.cloned();
    element.layout_options = layout_options.cloned();
}
