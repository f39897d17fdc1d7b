//! Integration tests for graph traversal and the tracking context.

use entimap_core::{
    ConfigurationSource, Context, CoreError, Entity, EntityEntryGraphIterator, EntityRef,
    EntityState, ModelBuilder, NavigationValue, ObjectKey, RelationshipOptions, StateManager,
    ValueType,
};
use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::Arc;

/// A tree node with a `Parent` reference and a `Children` collection.
struct Node {
    label: &'static str,
    parent: Mutex<Option<EntityRef>>,
    children: Mutex<Vec<EntityRef>>,
}

impl Node {
    fn new(label: &'static str) -> Arc<Self> {
        Arc::new(Self {
            label,
            parent: Mutex::new(None),
            children: Mutex::new(Vec::new()),
        })
    }

    fn adopt(parent: &Arc<Node>, child: &Arc<Node>) {
        *child.parent.lock() = Some(parent.clone() as EntityRef);
        parent.children.lock().push(child.clone() as EntityRef);
    }
}

impl Entity for Node {
    fn entity_type_name(&self) -> &str {
        "Node"
    }

    fn navigation(&self, name: &str) -> NavigationValue {
        match name {
            "Parent" => self.parent.lock().clone().into(),
            "Children" => self.children.lock().clone().into(),
            _ => NavigationValue::Null,
        }
    }
}

struct Unmapped;

impl Entity for Unmapped {
    fn navigation(&self, _name: &str) -> NavigationValue {
        NavigationValue::Null
    }
}

fn model_builder() -> ModelBuilder {
    let source = ConfigurationSource::Explicit;
    let mut builder = ModelBuilder::new();
    let node = builder.entity_named("Node", source).unwrap();
    builder
        .property(node, "Id", ValueType::Int32, source)
        .unwrap();
    builder
        .relationship(
            node,
            node,
            RelationshipOptions::new()
                .navigation_to_principal("Parent")
                .navigation_to_dependent("Children"),
            source,
        )
        .unwrap();
    builder
}

fn state_manager() -> StateManager {
    StateManager::new(Arc::new(model_builder().build()))
}

/// root
/// ├── a
/// │   ├── a1
/// │   └── a2
/// └── b
fn tree() -> Vec<Arc<Node>> {
    let nodes: Vec<_> = ["root", "a", "a1", "a2", "b"]
        .into_iter()
        .map(Node::new)
        .collect();
    Node::adopt(&nodes[0], &nodes[1]);
    Node::adopt(&nodes[1], &nodes[2]);
    Node::adopt(&nodes[1], &nodes[3]);
    Node::adopt(&nodes[0], &nodes[4]);
    nodes
}

fn break_cycles(nodes: &[Arc<Node>]) {
    for node in nodes {
        node.parent.lock().take();
        node.children.lock().clear();
    }
}

fn label_of(key: ObjectKey, nodes: &[Arc<Node>]) -> &'static str {
    nodes
        .iter()
        .find(|n| ObjectKey::of(&((*n).clone() as EntityRef)) == key)
        .map_or("?", |n| n.label)
}

fn track_all(manager: &StateManager, root: &EntityRef, state: EntityState) -> Vec<ObjectKey> {
    let mut seen = Vec::new();
    for entry in EntityEntryGraphIterator::new(manager)
        .traverse_graph(root)
        .unwrap()
    {
        let entry = entry.unwrap();
        entry.set_state(state);
        seen.push(entry.key());
    }
    seen
}

#[test]
fn emits_in_depth_first_pre_order() {
    let manager = state_manager();
    let nodes = tree();
    let root: EntityRef = nodes[0].clone();

    let order: Vec<_> = track_all(&manager, &root, EntityState::Added)
        .into_iter()
        .map(|key| label_of(key, &nodes))
        .collect();
    assert_eq!(order, ["root", "a", "a1", "a2", "b"]);
    assert_eq!(manager.entries_in_state(EntityState::Added).len(), 5);

    break_cycles(&nodes);
}

#[test]
fn back_references_do_not_repeat_entries() {
    let manager = state_manager();
    let nodes = tree();
    let root: EntityRef = nodes[0].clone();

    let seen = track_all(&manager, &root, EntityState::Unchanged);
    let unique: HashSet<_> = seen.iter().copied().collect();
    assert_eq!(seen.len(), unique.len());
    assert_eq!(manager.entry_count(), nodes.len());

    break_cycles(&nodes);
}

#[test]
fn already_tracked_subtrees_are_skipped() {
    let manager = state_manager();
    let nodes = tree();
    let a: EntityRef = nodes[1].clone();
    manager
        .get_or_create_entry(&a)
        .unwrap()
        .set_state(EntityState::Modified);

    let root: EntityRef = nodes[0].clone();
    let order: Vec<_> = track_all(&manager, &root, EntityState::Added)
        .into_iter()
        .map(|key| label_of(key, &nodes))
        .collect();
    assert_eq!(order, ["root", "b"]);
    assert_eq!(manager.get_or_create_entry(&a).unwrap().state(), EntityState::Modified);

    break_cycles(&nodes);
}

#[test]
fn entries_left_unknown_are_not_expanded() {
    let manager = state_manager();
    let nodes = tree();
    let root: EntityRef = nodes[0].clone();

    let mut order = Vec::new();
    for entry in EntityEntryGraphIterator::new(&manager)
        .traverse_graph(&root)
        .unwrap()
    {
        let entry = entry.unwrap();
        let label = label_of(entry.key(), &nodes);
        // Leave `a` untracked: its children must not be visited.
        if label != "a" {
            entry.set_state(EntityState::Added);
        }
        order.push(label);
    }
    assert_eq!(order, ["root", "a", "b"]);

    let a1: EntityRef = nodes[2].clone();
    assert!(manager.try_get_entry(&a1).is_none());

    break_cycles(&nodes);
}

#[test]
fn re_traversal_observes_current_state() {
    let manager = state_manager();
    let nodes = tree();
    let root: EntityRef = nodes[0].clone();
    let iterator = EntityEntryGraphIterator::new(&manager);

    assert_eq!(track_all(&manager, &root, EntityState::Added).len(), 5);
    assert_eq!(iterator.traverse_graph(&root).unwrap().count(), 0);

    // Detaching the root makes it visible again; everything below stays tracked.
    manager
        .get_or_create_entry(&root)
        .unwrap()
        .set_state(EntityState::Unknown);
    assert_eq!(track_all(&manager, &root, EntityState::Added).len(), 1);

    // A node attached after the first walk is picked up by the next one.
    let c = Node::new("c");
    Node::adopt(&nodes[4], &c);
    manager
        .get_or_create_entry(&root)
        .unwrap()
        .set_state(EntityState::Unknown);
    let b: EntityRef = nodes[4].clone();
    manager
        .get_or_create_entry(&b)
        .unwrap()
        .set_state(EntityState::Unknown);
    assert_eq!(track_all(&manager, &root, EntityState::Added).len(), 3);

    break_cycles(&nodes);
    break_cycles(&[c]);
}

#[test]
fn deep_chains_do_not_overflow_the_stack() {
    let manager = state_manager();
    let nodes: Vec<_> = (0..20_000).map(|_| Node::new("n")).collect();
    for pair in nodes.windows(2) {
        Node::adopt(&pair[0], &pair[1]);
    }
    let root: EntityRef = nodes[0].clone();

    assert_eq!(track_all(&manager, &root, EntityState::Added).len(), nodes.len());
    break_cycles(&nodes);
}

#[test]
fn unmapped_root_is_rejected() {
    let manager = state_manager();
    let root: EntityRef = Arc::new(Unmapped);
    let err = EntityEntryGraphIterator::new(&manager)
        .traverse_graph(&root)
        .unwrap_err();
    assert!(matches!(err, CoreError::InvalidArgument { .. }));
    assert_eq!(manager.entry_count(), 0);
}

#[test]
fn context_tracks_whole_graph() {
    let context = Context::new(model_builder().build());
    let nodes = tree();
    let root: EntityRef = nodes[0].clone();

    context.attach(&root).unwrap();
    for node in &nodes {
        let node: EntityRef = node.clone();
        assert_eq!(context.entry(&node).unwrap().state(), EntityState::Unchanged);
    }

    // Only the root changes; the rest were already tracked.
    context.update(&root).unwrap();
    let b: EntityRef = nodes[4].clone();
    assert_eq!(context.entry(&root).unwrap().state(), EntityState::Modified);
    assert_eq!(context.entry(&b).unwrap().state(), EntityState::Unchanged);

    context.remove(&b).unwrap();
    assert_eq!(context.entry(&b).unwrap().state(), EntityState::Deleted);

    break_cycles(&nodes);
}

#[test]
fn context_tracks_past_unmapped_objects_and_reports_them() {
    let context = Context::new(model_builder().build());
    let nodes = tree();
    nodes[1].children.lock().insert(0, Arc::new(Unmapped));
    let root: EntityRef = nodes[0].clone();

    assert!(matches!(
        context.attach(&root),
        Err(CoreError::EntityTypeNotFound { .. })
    ));
    for node in &nodes {
        let entity: EntityRef = node.clone();
        let entry = context.state_manager().try_get_entry(&entity).unwrap();
        assert_eq!(entry.state(), EntityState::Unchanged, "{}", node.label);
    }

    break_cycles(&nodes);
}

#[test]
fn context_add_fails_for_unmapped_root() {
    let context = Context::new(model_builder().build());
    let root: EntityRef = Arc::new(Unmapped);
    assert!(matches!(
        context.add(&root),
        Err(CoreError::InvalidArgument { .. })
    ));
}
