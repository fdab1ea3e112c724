//! Symbol library builder.
//!
//! Turns a [`SymbolLibrary`] into scene symbol definitions. Each entry is
//! namespaced as `<instancePrefix>_<symbolId>` so several diagram instances
//! on one page never share definition ids. Entries that expose a
//! `symbol_offset` or `path_offset` are also registered as connectors, used
//! to place glyphs such as arrowheads at edge endpoints.

use crate::geometry::{Dimension, Point};
use crate::id::ElementId;
use crate::model::{LayoutNode, Properties, SymbolEntry, SymbolLibrary};
use crate::scene::{ElementKind, SceneElement};
use indexmap::IndexMap;
use serde_json::{Value, json};

/// A connector registered from the symbol library.
#[derive(Debug, Clone, PartialEq)]
pub struct Connector {
    /// Library key, e.g. `arrow`.
    pub name: String,
    /// Namespaced id of the symbol definition to reference.
    pub href: ElementId,
    pub symbol_offset: Option<Point>,
    pub path_offset: Option<Point>,
}

/// A symbol definition tree (rendered once, referenced by id).
#[derive(Debug, Clone, PartialEq)]
pub struct SymbolNode {
    pub element: SceneElement,
    pub children: Vec<SymbolNode>,
}

impl SymbolNode {
    fn to_json(&self) -> Value {
        let mut value = self.element.to_json();
        if let Value::Object(obj) = &mut value {
            obj.insert(
                "children".into(),
                Value::Array(self.children.iter().map(SymbolNode::to_json).collect()),
            );
        }
        value
    }
}

/// Output of [`transform_symbols`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Symbols {
    pub children: Vec<SymbolNode>,
    /// `symbolId → namespacedId`.
    pub ids: IndexMap<String, ElementId>,
    pub connectors: IndexMap<String, Connector>,
}

impl Symbols {
    /// Namespaced definition id for a library key.
    pub fn href(&self, symbol: &str) -> Option<ElementId> {
        self.ids.get(symbol).copied()
    }

    /// Look up a connector by name; `None` names resolve to nothing.
    pub fn connector(&self, name: Option<&str>) -> Option<&Connector> {
        self.connectors.get(name?)
    }

    pub fn to_json(&self) -> Value {
        json!({
            "type": "symbols",
            "children": self.children.iter().map(SymbolNode::to_json).collect::<Vec<_>>(),
        })
    }
}

/// Build namespaced symbol definitions from a library, in library order.
pub fn transform_symbols(library: &SymbolLibrary, prefix: &str) -> Symbols {
    let mut symbols = Symbols::default();
    for (key, entry) in &library.library {
        let href = ElementId::namespaced(prefix, key);
        symbols.ids.insert(key.clone(), href);
        if entry.is_connector() {
            symbols.connectors.insert(
                key.clone(),
                Connector {
                    name: key.clone(),
                    href,
                    symbol_offset: entry.symbol_offset,
                    path_offset: entry.path_offset,
                },
            );
        }
        symbols.children.push(symbol_definition(href, entry));
        log::trace!("symbol {key} -> {href}");
    }
    symbols
}

fn symbol_definition(href: ElementId, entry: &SymbolEntry) -> SymbolNode {
    let mut element = SceneElement::new(href, ElementKind::Symbol);
    element.position = Point::new(entry.x.unwrap_or(0.0), entry.y.unwrap_or(0.0));
    element.size = Dimension::new(entry.width.unwrap_or(0.0), entry.height.unwrap_or(0.0));
    element.properties = entry.properties.clone();
    let children = entry
        .element
        .as_ref()
        .map(|root| vec![symbol_element(root, href, "0")])
        .unwrap_or_default();
    SymbolNode { element, children }
}

/// Symbol content nodes are flagged `isSymbol` and keep their own ids;
/// anonymous ones are named after their path inside the definition.
fn symbol_element(node: &LayoutNode, href: ElementId, path: &str) -> SymbolNode {
    let id = match node.id.as_deref() {
        Some(id) if !id.is_empty() => ElementId::intern(id),
        _ => ElementId::intern(&format!("{href}_{path}")),
    };
    let mut properties = node.properties.clone().unwrap_or_else(Properties::default);
    properties.is_symbol = Some(true);

    let mut element = SceneElement::new(id, ElementKind::Node);
    if let Some(t) = properties.shape_type() {
        element.type_name = t.to_string();
    }
    element.css_classes = properties.classes().into_iter().collect();
    element.position = Point::new(node.x.unwrap_or(0.0), node.y.unwrap_or(0.0));
    element.size = Dimension::new(node.width.unwrap_or(0.0), node.height.unwrap_or(0.0));
    element.properties = Some(properties);
    element.layout_options = node.layout_options.clone();

    let children = node
        .children
        .iter()
        .enumerate()
        .map(|(i, child)| symbol_element(child, href, &format!("{path}_{i}")))
        .collect();
    SymbolNode { element, children }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn library() -> SymbolLibrary {
        SymbolLibrary::from_json(json!({"library": {
            "arrow": {
                "element": {"id": "arrow_shape", "width": 10, "height": 10,
                            "properties": {"shape": {"type": "path"}},
                            "children": [{"width": 2}]},
                "symbol_offset": {"x": -5, "y": 0},
                "path_offset": {"x": -10, "y": 0}
            },
            "badge": {"width": 4, "height": 4, "properties": {"cssClasses": "b"}}
        }}))
        .unwrap()
    }

    #[test]
    fn symbols_are_namespaced() {
        let symbols = transform_symbols(&library(), "diagram_1");
        assert_eq!(symbols.href("arrow").unwrap().as_str(), "diagram_1_arrow");
        assert_eq!(symbols.href("badge").unwrap().as_str(), "diagram_1_badge");
        assert_eq!(symbols.children[0].element.id.as_str(), "diagram_1_arrow");
        assert_eq!(symbols.children[0].element.type_name, "symbol");
    }

    #[test]
    fn only_offset_entries_become_connectors() {
        let symbols = transform_symbols(&library(), "d");
        assert_eq!(symbols.connectors.len(), 1);
        let arrow = symbols.connector(Some("arrow")).unwrap();
        assert_eq!(arrow.symbol_offset, Some(Point::new(-5.0, 0.0)));
        assert_eq!(arrow.path_offset, Some(Point::new(-10.0, 0.0)));
        assert!(symbols.connector(Some("badge")).is_none());
        assert!(symbols.connector(None).is_none());
    }

    #[test]
    fn symbol_content_is_flagged_and_typed() {
        let symbols = transform_symbols(&library(), "d");
        let shape = &symbols.children[0].children[0];
        assert_eq!(shape.element.id.as_str(), "arrow_shape");
        assert_eq!(shape.element.type_name, "path");
        assert_eq!(
            shape.element.properties.as_ref().unwrap().is_symbol,
            Some(true)
        );
        // anonymous child is named by path
        assert_eq!(shape.children[0].element.id.as_str(), "d_arrow_0_0");
    }

    #[test]
    fn entry_without_element_has_no_children() {
        let symbols = transform_symbols(&library(), "d");
        let badge = &symbols.children[1];
        assert!(badge.children.is_empty());
        assert_eq!(badge.element.size, Dimension::new(4.0, 4.0));
    }
}
