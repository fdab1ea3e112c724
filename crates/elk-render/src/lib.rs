//! Renderer-side geometry for ELK diagram scenes.
//!
//! Nothing here draws. [`hit`] maps pointer positions to elements and
//! [`route`] computes edge lines and connector glyph placement, which a
//! drawing backend then strokes.

pub mod hit;
pub mod route;

pub use hit::hit_test;
pub use route::{ConnectorPlacement, EdgeGeometry, RoutedEdge, edge_geometry};
