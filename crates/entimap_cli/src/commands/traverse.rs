//! Traverse command implementation.

use crate::description::{DescriptionError, GraphDescription, ModelDescription};
use entimap_core::{
    Entity, EntityEntryGraphIterator, EntityRef, EntityState, NavigationValue, ObjectKey,
    StateManager,
};
use parking_lot::RwLock;
use serde::Serialize;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

/// Traversal result.
#[derive(Debug, Serialize)]
pub struct TraverseResult {
    /// State assigned to every emitted object.
    pub state: String,
    /// Labels in emission order.
    pub order: Vec<String>,
    /// Objects that could not be tracked.
    pub errors: Vec<String>,
    /// Objects in the file that were never reached.
    pub unreached: Vec<String>,
}

/// An object read from a graph file.
struct GraphObject {
    label: String,
    type_name: String,
    navigations: RwLock<HashMap<String, NavigationValue>>,
}

impl Entity for GraphObject {
    fn entity_type_name(&self) -> &str {
        &self.type_name
    }

    fn navigation(&self, name: &str) -> NavigationValue {
        self.navigations
            .read()
            .get(name)
            .cloned()
            .unwrap_or_default()
    }
}

/// Objects of a graph file, wired together.
///
/// Navigations are cleared on drop so cyclic graphs are freed.
struct ObjectGraph {
    objects: Vec<Arc<GraphObject>>,
    root: EntityRef,
}

impl ObjectGraph {
    fn build(description: &GraphDescription) -> Result<Self, DescriptionError> {
        let objects: Vec<_> = description
            .objects
            .iter()
            .map(|o| {
                Arc::new(GraphObject {
                    label: o.label.clone(),
                    type_name: o.type_name.clone(),
                    navigations: RwLock::new(HashMap::new()),
                })
            })
            .collect();
        let by_label: HashMap<&str, EntityRef> = objects
            .iter()
            .map(|o| (o.label.as_str(), o.clone() as EntityRef))
            .collect();
        let find = |label: &str| {
            by_label
                .get(label)
                .cloned()
                .ok_or_else(|| DescriptionError::Unknown {
                    kind: "object",
                    name: label.to_string(),
                })
        };

        for (object, spec) in objects.iter().zip(&description.objects) {
            let mut navigations = object.navigations.write();
            for (name, target) in &spec.references {
                navigations.insert(name.clone(), NavigationValue::Reference(find(target)?));
            }
            for (name, targets) in &spec.collections {
                let items = targets
                    .iter()
                    .map(|t| find(t))
                    .collect::<Result<Vec<_>, _>>()?;
                navigations.insert(name.clone(), NavigationValue::Collection(items));
            }
        }

        let root = find(&description.root)?;
        Ok(Self { objects, root })
    }

    fn label_of(&self, entity: &EntityRef) -> String {
        let key = ObjectKey::of(entity);
        self.objects
            .iter()
            .find(|o| ObjectKey::of(&((*o).clone() as EntityRef)) == key)
            .map_or_else(|| "?".to_string(), |o| o.label.clone())
    }
}

impl Drop for ObjectGraph {
    fn drop(&mut self) {
        for object in &self.objects {
            object.navigations.write().clear();
        }
    }
}

/// Parses a state name accepted on the command line.
pub fn parse_state(name: &str) -> Result<EntityState, String> {
    match name.to_ascii_lowercase().as_str() {
        "added" => Ok(EntityState::Added),
        "unchanged" => Ok(EntityState::Unchanged),
        "modified" => Ok(EntityState::Modified),
        "deleted" => Ok(EntityState::Deleted),
        other => Err(format!(
            "unknown state '{other}' (expected added, unchanged, modified or deleted)"
        )),
    }
}

/// Runs the traverse command.
pub fn run(
    model_path: &Path,
    graph_path: &Path,
    state: EntityState,
    format: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let description = ModelDescription::load(model_path)?;
    let model = description.build(&description.config(false))?;
    let graph = ObjectGraph::build(&GraphDescription::load(graph_path)?)?;

    let manager = StateManager::new(Arc::new(model));
    let result = traverse(&manager, &graph, state)?;

    match format {
        "json" => {
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        _ => {
            print_text_output(&result);
        }
    }

    Ok(())
}

fn traverse(
    manager: &StateManager,
    graph: &ObjectGraph,
    state: EntityState,
) -> Result<TraverseResult, Box<dyn std::error::Error>> {
    let mut result = TraverseResult {
        state: state.to_string(),
        order: Vec::new(),
        errors: Vec::new(),
        unreached: Vec::new(),
    };

    for entry in EntityEntryGraphIterator::new(manager).traverse_graph(&graph.root)? {
        match entry {
            Ok(entry) => {
                entry.set_state(state);
                result.order.push(graph.label_of(entry.entity()));
            }
            Err(err) => result.errors.push(err.to_string()),
        }
    }

    result.unreached = graph
        .objects
        .iter()
        .filter(|o| {
            manager
                .try_get_entry(&((*o).clone() as EntityRef))
                .is_none()
        })
        .map(|o| o.label.clone())
        .collect();
    Ok(result)
}

fn print_text_output(result: &TraverseResult) {
    println!("Traversal ({})", result.state);
    println!("=========");
    for (i, label) in result.order.iter().enumerate() {
        println!("  {:>3}. {}", i + 1, label);
    }
    if !result.errors.is_empty() {
        println!();
        println!("Errors:");
        for err in &result.errors {
            println!("  - {err}");
        }
    }
    if !result.unreached.is_empty() {
        println!();
        println!("Unreached: {}", result.unreached.join(", "));
    }
}
