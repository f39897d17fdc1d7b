//! Property-based test generators using proptest.
//!
//! Graphs are generated as plain edge lists over node indices and only
//! turned into [`TestEntity`] objects by [`GraphSpec::build`], so a
//! failing case shrinks to a small, printable graph.

use crate::fixtures::{link_child, TestEntity};
use entimap_core::EntityRef;
use proptest::prelude::*;
use std::collections::BTreeSet;
use std::sync::Arc;

/// A directed link between two nodes of a [`GraphSpec`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    /// `child` joins `parent.Children` and its `Parent` is set to `parent`.
    Child {
        /// Index of the parent node.
        parent: usize,
        /// Index of the child node.
        child: usize,
    },
    /// `from.Friend` is set to `to`.
    Friend {
        /// Index of the source node.
        from: usize,
        /// Index of the target node.
        to: usize,
    },
}

/// Outgoing navigations of one node after all edges are applied.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodeLinks {
    /// Target of `Parent`; the last `Child` edge wins.
    pub parent: Option<usize>,
    /// Members of `Children`, in edge order. May repeat.
    pub children: Vec<usize>,
    /// Target of `Friend`; the last `Friend` edge wins.
    pub friend: Option<usize>,
}

/// A graph of `Node` objects, possibly cyclic. Node 0 is the root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphSpec {
    /// Number of nodes.
    pub node_count: usize,
    /// Edges in application order.
    pub edges: Vec<Edge>,
}

impl GraphSpec {
    /// Resolves the edge list into per-node navigations.
    pub fn links(&self) -> Vec<NodeLinks> {
        let mut links = vec![NodeLinks::default(); self.node_count];
        for edge in &self.edges {
            match *edge {
                Edge::Child { parent, child } => {
                    links[parent].children.push(child);
                    links[child].parent = Some(parent);
                }
                Edge::Friend { from, to } => links[from].friend = Some(to),
            }
        }
        links
    }

    /// Returns the indices reachable from `root` through any navigation.
    pub fn reachable_from(&self, root: usize) -> BTreeSet<usize> {
        let links = self.links();
        let mut seen = BTreeSet::new();
        let mut stack = vec![root];
        while let Some(node) = stack.pop() {
            if !seen.insert(node) {
                continue;
            }
            let l = &links[node];
            stack.extend(l.parent);
            stack.extend(l.children.iter().copied());
            stack.extend(l.friend);
        }
        seen
    }

    /// Creates the objects. Labels are the node indices.
    pub fn build(&self) -> TestGraph {
        let nodes: Vec<_> = (0..self.node_count)
            .map(|i| TestEntity::node(i.to_string()))
            .collect();
        for edge in &self.edges {
            match *edge {
                Edge::Child { parent, child } => link_child(&nodes[parent], &nodes[child]),
                Edge::Friend { from, to } => {
                    nodes[from].set_reference("Friend", Some(nodes[to].to_entity_ref()));
                }
            }
        }
        TestGraph { nodes }
    }
}

/// Objects built from a [`GraphSpec`].
///
/// Dropping the graph clears every navigation so cycles are freed.
#[derive(Debug)]
pub struct TestGraph {
    nodes: Vec<Arc<TestEntity>>,
}

impl TestGraph {
    /// Returns the objects, indexed like the [`GraphSpec`] nodes.
    pub fn nodes(&self) -> &[Arc<TestEntity>] {
        &self.nodes
    }

    /// Returns node 0.
    pub fn root(&self) -> EntityRef {
        self.nodes[0].to_entity_ref()
    }

    /// Returns the index of the node with the given identity.
    pub fn index_of(&self, entity: &EntityRef) -> Option<usize> {
        let key = entimap_core::ObjectKey::of(entity);
        self.nodes
            .iter()
            .position(|n| entimap_core::ObjectKey::of(&n.to_entity_ref()) == key)
    }
}

impl Drop for TestGraph {
    fn drop(&mut self) {
        for node in &self.nodes {
            node.clear_navigations();
        }
    }
}

/// Strategy for graphs with up to `max_nodes` nodes and arbitrary cycles.
pub fn graph_spec_strategy(max_nodes: usize) -> impl Strategy<Value = GraphSpec> {
    (1..=max_nodes.max(1)).prop_flat_map(|node_count| {
        let edge = prop_oneof![
            (0..node_count, 0..node_count).prop_map(|(parent, child)| Edge::Child { parent, child }),
            (0..node_count, 0..node_count).prop_map(|(from, to)| Edge::Friend { from, to }),
        ];
        prop::collection::vec(edge, 0..node_count * 3)
            .prop_map(move |edges| GraphSpec { node_count, edges })
    })
}

/// Strategy producing `name` with the case of each ASCII letter flipped at
/// random.
pub fn case_variant_strategy(name: &'static str) -> impl Strategy<Value = String> {
    prop::collection::vec(any::<bool>(), name.len()).prop_map(move |flips| {
        name.chars()
            .zip(flips)
            .map(|(c, flip)| match (flip, c.is_ascii_uppercase()) {
                (false, _) => c,
                (true, true) => c.to_ascii_lowercase(),
                (true, false) => c.to_ascii_uppercase(),
            })
            .collect()
    })
}

/// Strategy for identifiers usable as entity type or member names.
pub fn identifier_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[A-Z][a-zA-Z0-9]{0,15}").expect("Invalid regex")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_links_last_parent_wins() {
        let spec = GraphSpec {
            node_count: 3,
            edges: vec![
                Edge::Child { parent: 0, child: 2 },
                Edge::Child { parent: 1, child: 2 },
            ],
        };
        let links = spec.links();
        assert_eq!(links[2].parent, Some(1));
        assert_eq!(links[0].children, vec![2]);
        assert_eq!(links[1].children, vec![2]);
    }

    #[test]
    fn test_reachable_follows_back_references() {
        let spec = GraphSpec {
            node_count: 3,
            edges: vec![Edge::Child { parent: 1, child: 0 }],
        };
        assert_eq!(spec.reachable_from(0), BTreeSet::from([0, 1]));
    }

    proptest! {
        #[test]
        fn test_case_variant_equal_ignoring_case(variant in case_variant_strategy("BlogId")) {
            prop_assert!(variant.eq_ignore_ascii_case("BlogId"));
        }

        #[test]
        fn test_build_matches_spec(spec in graph_spec_strategy(8)) {
            let graph = spec.build();
            prop_assert_eq!(graph.nodes().len(), spec.node_count);
            prop_assert_eq!(graph.index_of(&graph.root()), Some(0));
        }
    }
}
