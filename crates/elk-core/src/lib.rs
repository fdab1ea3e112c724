pub mod error;
pub mod geometry;
pub mod id;
pub mod index;
pub mod measure;
pub mod model;
pub mod scene;
pub mod symbols;
pub mod transform;

pub use error::TransformError;
pub use geometry::{Bounds, Dimension, Point};
pub use id::ElementId;
pub use model::{LayoutEdge, LayoutElement, LayoutLabel, LayoutNode, LayoutPort, SymbolLibrary};
pub use scene::{EdgeData, ElementKind, SceneElement, SceneGraph, ViewState};
pub use symbols::{Connector, Symbols, transform_symbols};
pub use transform::transform;

// Re-export petgraph types so downstream crates don't need a direct dependency
pub use petgraph::graph::NodeIndex;
