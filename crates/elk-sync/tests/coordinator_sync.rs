//! Integration tests: store ↔ coordinator ↔ scene.
//!
//! Drives a coordinator over an in-memory store the way a host would:
//! layout and selection changes on the store side, commands and pointer
//! events on the diagram side.

use async_trait::async_trait;
use elk_core::geometry::{Bounds, Point};
use elk_core::id::ElementId;
use elk_core::model::LayoutNode;
use elk_render::EdgeGeometry;
use elk_sync::input::{InputEvent, Modifiers, MouseButton};
use elk_sync::{
    Action, Coordinator, HostCommand, HostEvent, LayoutEngine, LifecycleState, MemoryStore,
    StoreKey, SyncConfig, SyncError, Viewport,
};
use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::mpsc;

fn pipeline() -> Value {
    serde_json::from_str(include_str!("fixtures/pipeline.json")).unwrap()
}

fn symbols() -> Value {
    json!({
        "library": {
            "arrow": {
                "element": {"id": "arrow_head", "width": 8, "height": 8},
                "symbol_offset": {"x": -4, "y": 0},
                "path_offset": {"x": -8, "y": 0}
            }
        }
    })
}

fn id(s: &str) -> ElementId {
    ElementId::intern(s)
}

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// An active coordinator showing `layout`.
async fn active_with(layout: Value) -> (Arc<MemoryStore>, Coordinator) {
    init_logging();
    let store = Arc::new(MemoryStore::new());
    store.host_set(StoreKey::Layout, layout);
    store.host_set(StoreKey::Symbols, symbols());
    let mut coordinator = Coordinator::new(store.clone(), SyncConfig::default(), "sync");
    coordinator.activate().await.unwrap();
    assert!(coordinator.render().await.unwrap());
    // the published render echoes back as a change
    coordinator.drain_store_changes().await.unwrap();
    store.clear_writes();
    (store, coordinator)
}

/// Layout engine that rejects requests while `down` is set.
#[derive(Default)]
struct FlakyLayout {
    down: AtomicBool,
}

#[async_trait]
impl LayoutEngine for FlakyLayout {
    async fn layout(&self, tree: LayoutNode) -> elk_sync::Result<LayoutNode> {
        if self.down.load(Ordering::SeqCst) {
            return Err(SyncError::Layout("engine unavailable".into()));
        }
        Ok(tree)
    }
}

/// Pipeline without `n1`, with `n2` moved to x=80.
fn pipeline_without_n1() -> Value {
    let mut layout = pipeline();
    layout["children"].as_array_mut().unwrap().remove(0);
    layout["children"][0]["x"] = json!(80);
    layout
}

/// Ids of the top-level elements of the last published render.
fn rendered_ids(store: &MemoryStore) -> Vec<String> {
    let rendered = store.value(StoreKey::Rendered).expect("a published render");
    rendered["children"]
        .as_array()
        .unwrap()
        .iter()
        .map(|child| child["id"].as_str().unwrap().to_string())
        .collect()
}

// ─── Selection ───────────────────────────────────────────────────────────

#[tokio::test]
async fn selection_change_is_written_once() {
    let (store, mut coordinator) = active_with(pipeline()).await;
    store.host_set(StoreKey::Selection, json!(["n1"]));
    coordinator.drain_store_changes().await.unwrap();
    assert_eq!(coordinator.selected_ids(), [id("n1")]);
    // the store already holds the selection: nothing to write back
    assert!(store.writes_to(StoreKey::Selection).is_empty());

    coordinator
        .set_selection(vec![id("n2")], vec![id("n1")])
        .await
        .unwrap();

    assert_eq!(coordinator.selected_ids(), [id("n2")]);
    assert_eq!(store.writes_to(StoreKey::Selection), vec![json!(["n2"])]);
    assert_eq!(store.saves(), 1);
    let scene = coordinator.scene();
    assert!(scene.get_by_id(id("n2")).unwrap().view.selected);
    assert!(!scene.get_by_id(id("n1")).unwrap().view.selected);
}

#[tokio::test]
async fn external_selection_applies_only_the_delta() {
    let (store, mut coordinator) = active_with(pipeline()).await;
    store.host_set(StoreKey::Selection, json!(["n1", "e1"]));
    store.host_set(StoreKey::Selection, json!(["e1", "n2"]));
    assert_eq!(coordinator.drain_store_changes().await.unwrap(), 2);

    assert_eq!(coordinator.selected_ids(), [id("e1"), id("n2")]);
    assert!(!coordinator.scene().get_by_id(id("n1")).unwrap().view.selected);
    assert!(store.writes_to(StoreKey::Selection).is_empty());
}

#[tokio::test]
async fn own_writes_echo_without_looping() {
    let (store, mut coordinator) = active_with(pipeline()).await;
    coordinator.set_selection(vec![id("n1")], vec![]).await.unwrap();
    // the echoed notification of our own write
    coordinator.drain_store_changes().await.unwrap();
    assert_eq!(store.writes_to(StoreKey::Selection), vec![json!(["n1"])]);
    assert_eq!(coordinator.selected_ids(), [id("n1")]);
}

#[tokio::test]
async fn selected_elements_skip_unknown_ids() {
    let (store, mut coordinator) = active_with(pipeline()).await;
    store.host_set(StoreKey::Selection, json!(["n1", "ghost"]));
    coordinator.drain_store_changes().await.unwrap();
    let live: Vec<ElementId> = coordinator.selected_elements().iter().map(|e| e.id).collect();
    assert_eq!(live, vec![id("n1")]);
    assert_eq!(coordinator.selected_ids().len(), 2);
}

#[tokio::test]
async fn select_all_picks_selectable_elements() {
    let (store, mut coordinator) = active_with(pipeline()).await;
    coordinator.select_all(true).await.unwrap();
    let selected = coordinator.selected_ids();
    assert!(selected.contains(&id("n1")));
    assert!(selected.contains(&id("e1")));
    assert!(!selected.contains(&id("n3")));
    assert!(!selected.contains(&id("pipeline")));
    assert_eq!(store.writes_to(StoreKey::Selection).len(), 1);

    coordinator.select_all(false).await.unwrap();
    assert!(coordinator.selected_ids().is_empty());
}

#[tokio::test]
async fn failed_write_is_retried_on_next_change() {
    let (store, mut coordinator) = active_with(pipeline()).await;
    store.fail_writes(true);
    let err = coordinator.set_selection(vec![id("n1")], vec![]).await.unwrap_err();
    assert!(matches!(err, SyncError::Store(_)));
    assert_eq!(coordinator.selected_ids(), [id("n1")]);

    store.fail_writes(false);
    coordinator.set_selection(vec![id("n2")], vec![]).await.unwrap();
    assert_eq!(store.writes_to(StoreKey::Selection), vec![json!(["n1", "n2"])]);
}

#[tokio::test]
async fn failed_write_does_not_swallow_the_others() {
    init_logging();
    let store = Arc::new(MemoryStore::new());
    store.host_set(StoreKey::Layout, pipeline());
    let mut coordinator = Coordinator::new(store.clone(), SyncConfig::default(), "flush");
    coordinator.render().await.unwrap();
    coordinator.set_selection(vec![id("n1")], vec![]).await.unwrap();
    coordinator.set_hover(Some(id("n1"))).await.unwrap();

    // both queued writes fail on activation
    store.fail_writes(true);
    assert!(matches!(coordinator.activate().await, Err(SyncError::Store(_))));
    assert_eq!(coordinator.hovered(), Some(id("n1")));
    store.fail_writes(false);

    coordinator.set_hover(None).await.unwrap();
    coordinator.set_hover(Some(id("n1"))).await.unwrap();
    assert_eq!(store.value(StoreKey::Hover), Some(json!("n1")));
    coordinator.set_selection(vec![], vec![]).await.unwrap();
    assert_eq!(store.value(StoreKey::Selection), Some(json!(["n1"])));
}

// ─── Hover ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn hover_moves_and_writes_on_enter() {
    let (store, mut coordinator) = active_with(pipeline()).await;
    coordinator.set_hover(Some(id("n1"))).await.unwrap();
    coordinator.set_hover(Some(id("n2"))).await.unwrap();

    let scene = coordinator.scene();
    assert!(!scene.get_by_id(id("n1")).unwrap().view.hover_feedback);
    assert!(scene.get_by_id(id("n2")).unwrap().view.hover_feedback);
    assert_eq!(coordinator.hovered(), Some(id("n2")));
    assert_eq!(store.writes_to(StoreKey::Hover), vec![json!("n1"), json!("n2")]);

    coordinator.set_hover(None).await.unwrap();
    assert_eq!(coordinator.hovered(), None);
    assert_eq!(store.writes_to(StoreKey::Hover).len(), 2);
}

#[tokio::test]
async fn external_hover_is_not_written_back() {
    let (store, mut coordinator) = active_with(pipeline()).await;
    store.host_set(StoreKey::Hover, json!("n2"));
    coordinator.drain_store_changes().await.unwrap();
    assert_eq!(coordinator.hovered(), Some(id("n2")));
    assert!(store.writes_to(StoreKey::Hover).is_empty());
}

#[tokio::test]
async fn control_overlay_follows_the_store() {
    let (store, mut coordinator) = active_with(pipeline()).await;
    store.host_set(StoreKey::ControlOverlay, json!({"model_id": "overlay-1"}));
    coordinator.drain_store_changes().await.unwrap();
    assert_eq!(coordinator.control_overlay(), Some(&json!({"model_id": "overlay-1"})));

    store.host_set(StoreKey::ControlOverlay, Value::Null);
    coordinator.drain_store_changes().await.unwrap();
    assert_eq!(coordinator.control_overlay(), None);
}

// ─── Viewport ────────────────────────────────────────────────────────────

#[tokio::test]
async fn fit_fills_the_canvas() {
    let (_store, mut coordinator) =
        active_with(json!({"children": [{"id": "box", "width": 50, "height": 50}]})).await;
    coordinator.resize_to(Bounds::new(0.0, 0.0, 200.0, 100.0)).unwrap();
    coordinator
        .fit(vec![], 0.0, f64::INFINITY, false)
        .await
        .unwrap();
    assert_eq!(coordinator.viewport().zoom, 2.0);
    assert_eq!(coordinator.viewport().scroll, Point::new(-25.0, 0.0));
}

#[tokio::test]
async fn center_on_empty_scene_keeps_zoom() {
    init_logging();
    let store = Arc::new(MemoryStore::new());
    let mut coordinator = Coordinator::new(store, SyncConfig::default(), "empty");
    coordinator.activate().await.unwrap();
    coordinator.resize_to(Bounds::new(0.0, 0.0, 200.0, 100.0)).unwrap();
    coordinator
        .dispatch(Action::SetViewport {
            viewport: Viewport {
                scroll: Point::ORIGIN,
                zoom: 1.5,
            },
            animate: false,
        })
        .unwrap();

    coordinator.center(vec![], true, true).await.unwrap();
    assert!(coordinator.is_animating());
    assert_eq!(coordinator.target_viewport().zoom, 1.5);

    assert!(!coordinator.tick(Duration::from_secs(1)));
    let viewport = coordinator.viewport();
    assert_eq!(viewport.zoom, 1.5);
    assert_eq!(viewport.scroll, Point::new(-100.0 / 1.5, -50.0 / 1.5));
}

#[tokio::test]
async fn host_commands_refresh_canvas_first() {
    init_logging();
    let store = Arc::new(MemoryStore::new());
    store.host_set(StoreKey::Layout, pipeline());
    let mut coordinator = Coordinator::new(store, SyncConfig::default(), "cmd")
        .with_canvas_probe(Box::new(|| Bounds::new(10.0, 10.0, 400.0, 200.0)));
    coordinator.activate().await.unwrap();
    coordinator.render().await.unwrap();

    let command =
        HostCommand::from_json(r#"{"action": "center", "model_id": "n2", "animate": false}"#).unwrap();
    coordinator.handle_command(command).await.unwrap();
    assert_eq!(coordinator.canvas(), Bounds::new(10.0, 10.0, 400.0, 200.0));
    // n2 spans (150,0)-(200,50); its center sits mid-canvas at zoom 1
    assert_eq!(
        coordinator.viewport(),
        Viewport {
            scroll: Point::new(-25.0, -75.0),
            zoom: 1.0,
        }
    );
}

// ─── Rendering ───────────────────────────────────────────────────────────

#[tokio::test]
async fn identical_render_schedules_nothing() {
    let (store, mut coordinator) = active_with(pipeline()).await;
    let before = coordinator.scene().clone();
    coordinator.render().await.unwrap();
    assert!(coordinator.animation().is_none());
    assert!(before.structurally_eq(coordinator.scene()));
    assert_eq!(store.writes_to(StoreKey::Rendered).len(), 1);
}

#[tokio::test]
async fn removed_node_fades_out_once() {
    let (store, mut coordinator) = active_with(pipeline()).await;
    let mut layout = pipeline();
    layout["children"].as_array_mut().unwrap().remove(0);
    store.host_set(StoreKey::Layout, layout);
    coordinator.render().await.unwrap();

    let fades: Vec<ElementId> = coordinator.animation().unwrap().fade_outs().collect();
    assert_eq!(fades, vec![id("n1")]);
    assert!(coordinator.scene().contains(id("n1_label")));

    assert!(!coordinator.tick(Duration::from_secs(1)));
    assert!(!coordinator.scene().contains(id("n1")));
    assert!(!coordinator.scene().contains(id("n1_label")));
}

#[tokio::test]
async fn published_render_is_the_settled_scene() {
    let (store, mut coordinator) = active_with(pipeline()).await;
    store.host_set(StoreKey::Layout, pipeline_without_n1());
    coordinator.render().await.unwrap();

    // the live scene still shows the first frame
    assert!(coordinator.scene().contains(id("n1")));
    assert_eq!(coordinator.scene().get_by_id(id("n2")).unwrap().position.x, 50.0);
    assert_eq!(rendered_ids(&store), vec!["n2", "n3", "e1"]);
    let rendered = store.value(StoreKey::Rendered).unwrap();
    assert_eq!(rendered["children"][0]["position"]["x"], json!(80.0));

    assert!(!coordinator.tick(Duration::from_secs(1)));
    assert_eq!(store.value(StoreKey::Rendered), Some(coordinator.scene().to_json()));
}

#[tokio::test]
async fn new_render_supersedes_running_animation() {
    let (store, mut coordinator) = active_with(pipeline()).await;
    store.host_set(StoreKey::Layout, pipeline_without_n1());
    coordinator.render().await.unwrap();
    assert!(coordinator.is_animating());

    let mut layout = pipeline_without_n1();
    layout["children"].as_array_mut().unwrap().remove(1);
    store.host_set(StoreKey::Layout, layout);
    coordinator.render().await.unwrap();

    // the first animation jumped to its end state
    assert!(!coordinator.scene().contains(id("n1")));
    assert!(!coordinator.scene().contains(id("n1_label")));
    assert_eq!(coordinator.scene().get_by_id(id("n2")).unwrap().position.x, 80.0);
    let fades: Vec<ElementId> = coordinator.animation().unwrap().fade_outs().collect();
    assert_eq!(fades, vec![id("n3")]);

    assert!(!coordinator.tick(Duration::from_secs(1)));
    assert!(!coordinator.scene().contains(id("n3")));
    assert_eq!(rendered_ids(&store), vec!["n2", "e1"]);
}

#[tokio::test]
async fn rejected_layout_is_skipped_until_the_next_trigger() {
    init_logging();
    let store = Arc::new(MemoryStore::new());
    store.host_set(StoreKey::Layout, pipeline());
    let engine = Arc::new(FlakyLayout::default());
    let mut coordinator = Coordinator::new(store.clone(), SyncConfig::default(), "flaky")
        .with_layout_engine(engine.clone());
    coordinator.activate().await.unwrap();
    coordinator.render().await.unwrap();
    store.clear_writes();

    engine.down.store(true, Ordering::SeqCst);
    store.host_set(StoreKey::Layout, pipeline_without_n1());
    let err = coordinator.render().await.unwrap_err();
    assert!(matches!(err, SyncError::Layout(_)));
    assert!(coordinator.scene().contains(id("n1")));
    assert!(coordinator.animation().is_none());
    assert!(store.writes_to(StoreKey::Rendered).is_empty());

    engine.down.store(false, Ordering::SeqCst);
    assert!(coordinator.render().await.unwrap());
    assert!(!coordinator.tick(Duration::from_secs(1)));
    assert!(!coordinator.scene().contains(id("n1")));
    assert_eq!(rendered_ids(&store), vec!["n2", "n3", "e1"]);
}

#[tokio::test]
async fn failed_transform_keeps_last_good_scene() {
    let (store, mut coordinator) = active_with(pipeline()).await;
    let mut layout = pipeline();
    layout["edges"][0]["id"] = json!("n2");
    store.host_set(StoreKey::Layout, layout);

    let err = coordinator.render().await.unwrap_err();
    assert!(matches!(err, SyncError::Transform(_)));
    assert!(coordinator.scene().contains(id("e1")));
    assert_eq!(store.writes_to(StoreKey::Rendered).len(), 0);
}

#[tokio::test]
async fn selection_survives_rerender() {
    let (store, mut coordinator) = active_with(pipeline()).await;
    store.host_set(StoreKey::Selection, json!(["n2"]));
    coordinator.drain_store_changes().await.unwrap();
    let mut layout = pipeline();
    layout["children"][1]["x"] = json!(180);
    store.host_set(StoreKey::Layout, layout);
    coordinator.render().await.unwrap();
    assert!(coordinator.scene().get_by_id(id("n2")).unwrap().view.selected);
}

#[tokio::test]
async fn unmeasured_labels_are_sized_before_layout() {
    let (_store, coordinator) = active_with(json!({
        "children": [{"id": "m", "width": 80, "height": 40,
                      "labels": [{"id": "m_label", "text": "hello"}]}]
    }))
    .await;
    let label = coordinator.scene().get_by_id(id("m_label")).unwrap();
    assert_eq!((label.size.width, label.size.height), (50.0, 10.0));
}

#[tokio::test]
async fn edge_geometry_uses_connectors() {
    let (_store, coordinator) = active_with(pipeline()).await;
    assert!(coordinator.connectors().contains_key("arrow"));
    let Some(EdgeGeometry::Routed(routed)) = coordinator.edge_geometry(id("e1")) else {
        panic!("e1 should be routed");
    };
    let end = routed.end.expect("arrow connector at the target");
    assert_eq!(end.name, "arrow");
    let tip = routed.line[routed.line.len() - 1];
    assert!((tip.x - 138.0).abs() < 1e-9);
}

// ─── Input ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn click_selects_through_the_pipeline() {
    let (store, mut coordinator) = active_with(pipeline()).await;
    coordinator.resize_to(Bounds::new(0.0, 0.0, 400.0, 300.0)).unwrap();
    coordinator
        .handle_input(InputEvent::PointerDown {
            x: 170.0,
            y: 10.0,
            button: MouseButton::Left,
            modifiers: Modifiers::default(),
        })
        .await
        .unwrap();
    assert_eq!(coordinator.selected_ids(), [id("n2")]);
    assert_eq!(store.writes_to(StoreKey::Selection), vec![json!(["n2"])]);
}

// ─── Lifecycle ───────────────────────────────────────────────────────────

#[tokio::test]
async fn operations_queue_until_active() {
    init_logging();
    let store = Arc::new(MemoryStore::new());
    store.host_set(StoreKey::Layout, pipeline());
    let mut coordinator = Coordinator::new(store.clone(), SyncConfig::default(), "queue");
    coordinator.render().await.unwrap();
    store.clear_writes();

    coordinator.set_selection(vec![id("n1")], vec![]).await.unwrap();
    assert!(coordinator.selected_ids().is_empty());
    assert!(store.writes_to(StoreKey::Selection).is_empty());

    coordinator.activate().await.unwrap();
    assert_eq!(coordinator.state(), LifecycleState::Active);
    assert_eq!(coordinator.selected_ids(), [id("n1")]);
    assert_eq!(store.writes_to(StoreKey::Selection), vec![json!(["n1"])]);
}

#[tokio::test(start_paused = true)]
async fn mount_waits_for_visibility() {
    init_logging();
    let store = Arc::new(MemoryStore::new());
    store.host_set(StoreKey::Layout, pipeline());
    store.host_set(StoreKey::Selection, json!(["n2"]));
    let mut coordinator = Coordinator::new(store.clone(), SyncConfig::default(), "mount");
    let ready = coordinator.on_ready();

    let mut polls = 0;
    coordinator
        .mount(|| {
            polls += 1;
            polls >= 3
        })
        .await
        .unwrap();
    assert_eq!(polls, 3);
    assert!(ready.await.is_ok());
    assert_eq!(coordinator.state(), LifecycleState::Active);
    assert!(coordinator.scene().get_by_id(id("n2")).unwrap().view.selected);
    assert!(store.writes_to(StoreKey::Selection).is_empty());
}

#[tokio::test]
async fn disposed_coordinator_rejects_operations() {
    let (_store, mut coordinator) = active_with(pipeline()).await;
    coordinator.dispose();
    assert!(matches!(
        coordinator.set_selection(vec![id("n1")], vec![]).await,
        Err(SyncError::Lifecycle(LifecycleState::Disposed))
    ));
    assert!(coordinator.render().await.is_err());
}

// ─── Event loop ──────────────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn layout_changes_are_debounced() {
    init_logging();
    let store = Arc::new(MemoryStore::new());
    let mut coordinator = Coordinator::new(store.clone(), SyncConfig::default(), "loop");
    let (tx, rx) = mpsc::unbounded_channel();

    let host = async {
        store.host_set(StoreKey::Layout, json!({"children": [{"id": "first"}]}));
        tokio::time::sleep(Duration::from_millis(100)).await;
        store.host_set(StoreKey::Layout, json!({"children": [{"id": "second"}]}));
        tokio::time::sleep(Duration::from_millis(600)).await;
        let _ = tx.send(HostEvent::Dispose);
    };
    let (result, ()) = tokio::join!(coordinator.run(rx), host);
    result.unwrap();

    assert_eq!(store.writes_to(StoreKey::Rendered).len(), 1);
    assert!(coordinator.scene().contains(id("second")));
    assert!(!coordinator.scene().contains(id("first")));
    assert_eq!(coordinator.state(), LifecycleState::Disposed);
}
