//! Benchmark utilities.

use entimap_testkit::{link_child, TestEntity};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Arc;

/// Generate a random `Node` graph.
///
/// Every node after the first is linked as a child of a random earlier
/// node, so the whole graph is reachable from node 0. On top of that,
/// `friends` random `Friend` references add back edges and cycles.
pub fn random_graph(node_count: usize, friends: usize, seed: u64) -> Vec<Arc<TestEntity>> {
    let mut rng = StdRng::seed_from_u64(seed);
    let nodes: Vec<_> = (0..node_count.max(1))
        .map(|i| TestEntity::node(i.to_string()))
        .collect();
    for i in 1..nodes.len() {
        let parent = rng.gen_range(0..i);
        link_child(&nodes[parent], &nodes[i]);
    }
    for _ in 0..friends {
        let from = rng.gen_range(0..nodes.len());
        let to = rng.gen_range(0..nodes.len());
        nodes[from].set_reference("Friend", Some(nodes[to].to_entity_ref()));
    }
    nodes
}

/// Generate a single chain `0 -> 1 -> ... -> n-1` through `Children`.
pub fn chain(node_count: usize) -> Vec<Arc<TestEntity>> {
    let nodes: Vec<_> = (0..node_count.max(1))
        .map(|i| TestEntity::node(i.to_string()))
        .collect();
    for pair in nodes.windows(2) {
        link_child(&pair[0], &pair[1]);
    }
    nodes
}

/// Clear navigations so the graph can be freed.
pub fn release(nodes: &[Arc<TestEntity>]) {
    for node in nodes {
        node.clear_navigations();
    }
}
