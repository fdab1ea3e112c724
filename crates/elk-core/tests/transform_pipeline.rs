//! Integration tests: layout JSON → scene graph → index lookups.
//!
//! Exercises the full `elk-core` pipeline on a realistic nested layout.

use elk_core::geometry::Bounds;
use elk_core::id::ElementId;
use elk_core::model::{LayoutNode, SymbolLibrary};
use elk_core::scene::ElementKind;
use elk_core::{TransformError, transform};
use pretty_assertions::assert_eq;
use serde_json::Value;
use std::collections::HashSet;

fn workflow() -> LayoutNode {
    let value: Value = serde_json::from_str(include_str!("fixtures/workflow.json")).unwrap();
    LayoutNode::from_json(value).unwrap()
}

fn symbols() -> SymbolLibrary {
    let value: Value = serde_json::from_str(include_str!("fixtures/symbols.json")).unwrap();
    SymbolLibrary::from_json(value).unwrap()
}

// ─── Ids ─────────────────────────────────────────────────────────────────

#[test]
fn every_input_id_appears_once() {
    let tree = workflow();
    let scene = transform(&tree, &symbols(), "wf").unwrap();

    let input: Vec<&str> = tree.descendants().iter().filter_map(|e| e.id()).collect();
    let output: Vec<ElementId> = scene.ids();
    let unique: HashSet<ElementId> = output.iter().copied().collect();
    assert_eq!(unique.len(), output.len(), "scene ids must be unique");

    for id in &input {
        assert!(scene.contains(ElementId::intern(id)), "missing {id}");
    }
    // root + inputs + one junction
    assert_eq!(output.len(), input.len() + 2);
}

#[test]
fn scene_order_matches_document_order() {
    let scene = transform(&workflow(), &symbols(), "wf").unwrap();
    let ids: Vec<String> = scene.ids().iter().map(|id| id.to_string()).collect();
    assert_eq!(
        ids,
        vec![
            "workflow",
            "ingest",
            "ingest_out",
            "ingest_label",
            "pipeline",
            "clean",
            "train",
            "pipeline_label",
            "pipeline_icon",
            "clean_train",
            "ingest_pipeline",
            "ingest_pipeline_j0",
            "ingest_pipeline_label",
        ]
    );
}

#[test]
fn retransform_is_structurally_identical() {
    let a = transform(&workflow(), &symbols(), "wf").unwrap();
    let b = transform(&workflow(), &symbols(), "wf").unwrap();
    assert!(a.structurally_eq(&b));
    assert_eq!(a.to_json(), b.to_json());
}

#[test]
fn duplicate_between_node_and_edge_aborts() {
    let mut tree = workflow();
    tree.edges[0].id = Some("ingest".into());
    assert_eq!(
        transform(&tree, &symbols(), "wf").unwrap_err(),
        TransformError::DuplicateId("ingest".into())
    );
}

// ─── Edges ───────────────────────────────────────────────────────────────

#[test]
fn primitive_and_extended_edges_resolve_endpoints() {
    let scene = transform(&workflow(), &symbols(), "wf").unwrap();

    let primitive = scene.get_by_id(ElementId::intern("ingest_pipeline")).unwrap();
    let data = primitive.edge().unwrap();
    assert_eq!(data.source_id, Some(ElementId::intern("ingest")));
    assert_eq!(data.target_id, Some(ElementId::intern("pipeline")));
    assert_eq!(data.routing_points.len(), 4);

    let extended = scene.get_by_id(ElementId::intern("clean_train")).unwrap();
    assert_eq!(extended.edge().unwrap().routing_points.len(), 2);
    assert_eq!(
        scene.parent_id(ElementId::intern("clean_train")),
        Some(ElementId::intern("pipeline"))
    );
}

#[test]
fn junction_is_a_child_of_its_edge() {
    let scene = transform(&workflow(), &symbols(), "wf").unwrap();
    let junction = ElementId::intern("ingest_pipeline_j0");
    assert_eq!(scene.get_by_id(junction).unwrap().kind, ElementKind::Junction);
    assert_eq!(scene.parent_id(junction), Some(ElementId::intern("ingest_pipeline")));
}

// ─── Geometry ────────────────────────────────────────────────────────────

#[test]
fn nested_bounds_are_absolute() {
    let scene = transform(&workflow(), &symbols(), "wf").unwrap();
    assert_eq!(
        scene.bounds_of(&[ElementId::intern("clean")]),
        Bounds::new(200.0, 42.0, 80.0, 40.0)
    );
    assert_eq!(
        scene.bounds_of(&[ElementId::intern("clean_train")]),
        Bounds::new(280.0, 62.0, 50.0, 0.0)
    );
    assert_eq!(scene.bounds_of(&[]), Bounds::new(12.0, 12.0, 428.0, 140.0));
}

#[test]
fn unselectable_node_defers_to_container() {
    let scene = transform(&workflow(), &symbols(), "wf").unwrap();
    let train = scene.index_of(ElementId::intern("train")).unwrap();
    let target = scene.selectable_ancestor(train).unwrap();
    assert_eq!(scene.graph[target].id, ElementId::intern("pipeline"));
}

// ─── Symbols ─────────────────────────────────────────────────────────────

#[test]
fn symbols_are_namespaced_per_instance() {
    let a = transform(&workflow(), &symbols(), "wf_1").unwrap();
    let b = transform(&workflow(), &symbols(), "wf_2").unwrap();
    assert_eq!(a.symbols.href("arrow"), Some(ElementId::intern("wf_1_arrow")));
    assert_eq!(b.symbols.href("arrow"), Some(ElementId::intern("wf_2_arrow")));
    assert_eq!(a.symbols.connectors.len(), 1);
    assert!(a.symbols.connector(Some("database")).is_none());
}
