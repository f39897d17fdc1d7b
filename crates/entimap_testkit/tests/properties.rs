//! Property tests for graph traversal and foreign key discovery.

use entimap_core::{
    ConfigurationSource, Context, EntityEntryGraphIterator, EntityState, ModelBuilder,
    RelationshipOptions, StateManager, ValueType,
};
use entimap_testkit::prelude::*;
use proptest::prelude::*;
use std::collections::BTreeSet;
use std::sync::Arc;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn tracking_consumer_reaches_each_node_once(spec in graph_spec_strategy(12)) {
        let graph = spec.build();
        let manager = StateManager::new(Arc::new(node_model()));

        let mut emitted = Vec::new();
        for entry in EntityEntryGraphIterator::new(&manager).traverse_graph(&graph.root()).unwrap() {
            let entry = entry.unwrap();
            entry.set_state(EntityState::Added);
            emitted.push(graph.index_of(entry.entity()).unwrap());
        }

        let unique: BTreeSet<_> = emitted.iter().copied().collect();
        prop_assert_eq!(unique.len(), emitted.len());
        prop_assert_eq!(unique, spec.reachable_from(0));
    }

    #[test]
    fn emission_is_pre_order(spec in graph_spec_strategy(12)) {
        let graph = spec.build();
        let links = spec.links();
        let manager = StateManager::new(Arc::new(node_model()));

        let mut emitted: Vec<usize> = Vec::new();
        for entry in EntityEntryGraphIterator::new(&manager).traverse_graph(&graph.root()).unwrap() {
            let entry = entry.unwrap();
            entry.set_state(EntityState::Unchanged);
            let index = graph.index_of(entry.entity()).unwrap();
            if let Some(&first) = emitted.first() {
                prop_assert_eq!(first, 0);
                // Something emitted earlier must point at this node.
                let has_predecessor = emitted.iter().any(|&e| {
                    let l = &links[e];
                    l.parent == Some(index) || l.friend == Some(index) || l.children.contains(&index)
                });
                prop_assert!(has_predecessor, "node {} emitted before any referrer", index);
            }
            emitted.push(index);
        }
    }

    #[test]
    fn passive_consumer_sees_only_root(spec in graph_spec_strategy(12)) {
        let graph = spec.build();
        let manager = StateManager::new(Arc::new(node_model()));

        let count = EntityEntryGraphIterator::new(&manager)
            .traverse_graph(&graph.root())
            .unwrap()
            .count();
        prop_assert_eq!(count, 1);
        prop_assert_eq!(manager.entry_count(), 1);
    }

    #[test]
    fn attach_marks_reachable_nodes(spec in graph_spec_strategy(12)) {
        let graph = spec.build();
        let context = Context::new(node_model());
        context.attach(&graph.root()).unwrap();

        let reachable = spec.reachable_from(0);
        for (index, node) in graph.nodes().iter().enumerate() {
            let tracked = context
                .state_manager()
                .try_get_entry(&node.to_entity_ref())
                .map(|e| e.state());
            if reachable.contains(&index) {
                prop_assert_eq!(tracked, Some(EntityState::Unchanged));
            } else {
                prop_assert_eq!(tracked, None);
            }
        }
    }

    #[test]
    fn foreign_key_names_match_ignoring_case(variant in case_variant_strategy("BlogId")) {
        let source = ConfigurationSource::Explicit;
        let mut builder = ModelBuilder::new();
        let blog = builder.entity_named("Blog", source).unwrap();
        builder.property(blog, "Id", ValueType::Int32, source).unwrap();
        let post = builder.entity_named("Post", source).unwrap();
        builder.property(post, "Id", ValueType::Int32, source).unwrap();
        let candidate = builder.property(post, &variant, ValueType::Int32, source).unwrap();

        let relationship = builder
            .relationship(blog, post, RelationshipOptions::new().navigation_to_principal("Blog"), source)
            .unwrap();
        let model = builder.build();
        prop_assert_eq!(relationship.metadata(&model).unwrap().properties(), &[candidate]);
    }

    #[test]
    fn shadow_foreign_key_names_never_collide(base in identifier_strategy(), taken in 0usize..4) {
        let source = ConfigurationSource::Explicit;
        let mut builder = ModelBuilder::with_config(&entimap_core::Config::without_conventions());
        let principal = builder.entity_named("Principal", source).unwrap();
        let key = builder.property(principal, "Key", ValueType::Int64, source).unwrap();
        builder.primary_key_properties(principal, &[key], source).unwrap();
        let dependent = builder.entity_named("Dependent", source).unwrap();

        // Occupy `<base>Key`, `<base>Key1`, ... as shadow properties.
        let stem = format!("{base}Key");
        for i in 0..taken {
            let name = if i == 0 { stem.clone() } else { format!("{stem}{i}") };
            builder.shadow_property(dependent, &name, ValueType::Int64, source).unwrap();
        }

        let created = entimap_core::builder::create_shadow_foreign_key_properties(
            builder.model_mut(),
            dependent,
            &base,
            &[key],
        )
        .unwrap();
        let expected = if taken == 0 { stem.clone() } else { format!("{stem}{taken}") };
        let model = builder.model();
        let property = model.property(created[0]).unwrap();
        prop_assert_eq!(property.name(), expected.as_str());
        prop_assert!(property.is_shadow());
        prop_assert!(!property.is_required());
    }
}
