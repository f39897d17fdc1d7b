//! Identity map of tracked objects.

use crate::error::{CoreError, CoreResult};
use crate::metadata::Model;
use crate::tracking::{EntityEntry, EntityRef, EntityState, ObjectKey};
use crate::types::{EntityTypeId, PropertyId};
use crate::value::Value;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::trace;

/// Tracking record for one object.
struct StateEntry {
    entity: EntityRef,
    entity_type: EntityTypeId,
    state: EntityState,
    shadow_values: HashMap<PropertyId, Value>,
}

#[derive(Default)]
struct Entries {
    by_key: HashMap<ObjectKey, StateEntry>,
    /// Keys in the order entries were created.
    order: Vec<ObjectKey>,
}

/// Owns the entry of every object seen by the tracker.
///
/// Objects are identified by allocation, not by key values: two equal
/// objects in different `Arc`s get different entries. An entry is created
/// the first time an object is seen, in state [`EntityState::Unknown`], and
/// lives as long as the manager.
///
/// Entries handed out by the manager are views; their state lives here.
pub struct StateManager {
    model: Arc<Model>,
    entries: Mutex<Entries>,
}

impl StateManager {
    /// Creates a state manager for objects mapped by `model`.
    #[must_use]
    pub fn new(model: Arc<Model>) -> Self {
        Self {
            model,
            entries: Mutex::new(Entries::default()),
        }
    }

    /// Returns the model objects are mapped by.
    #[must_use]
    pub fn model(&self) -> &Model {
        &self.model
    }

    /// Returns the entry for an object, creating it if needed.
    ///
    /// Fails with [`CoreError::EntityTypeNotFound`] if the object's entity
    /// type is not part of the model.
    pub fn get_or_create_entry(&self, entity: &EntityRef) -> CoreResult<EntityEntry<'_>> {
        let key = ObjectKey::of(entity);
        let name = entity.entity_type_name();
        let mut entries = self.entries.lock();

        if let Some(existing) = entries.by_key.get(&key) {
            let entity_type = self.model.entity_type_or_err(existing.entity_type)?;
            return Ok(EntityEntry::new(self, key, existing.entity.clone(), entity_type));
        }

        let entity_type = self
            .model
            .find_entity_type(name)
            .ok_or_else(|| CoreError::entity_type_not_found(name))?;
        entries.by_key.insert(
            key,
            StateEntry {
                entity: entity.clone(),
                entity_type: entity_type.id(),
                state: EntityState::Unknown,
                shadow_values: HashMap::new(),
            },
        );
        entries.order.push(key);
        trace!(entity_type = entity_type.name(), "Created entry");

        Ok(EntityEntry::new(self, key, entity.clone(), entity_type))
    }

    /// Returns the entry for an object if one exists.
    #[must_use]
    pub fn try_get_entry(&self, entity: &EntityRef) -> Option<EntityEntry<'_>> {
        let key = ObjectKey::of(entity);
        let entries = self.entries.lock();
        let existing = entries.by_key.get(&key)?;
        let entity_type = self.model.entity_type(existing.entity_type)?;
        Some(EntityEntry::new(self, key, existing.entity.clone(), entity_type))
    }

    /// Returns the number of entries, tracked or not.
    #[must_use]
    pub fn entry_count(&self) -> usize {
        self.entries.lock().order.len()
    }

    /// Returns every entry in creation order.
    #[must_use]
    pub fn entries(&self) -> Vec<EntityEntry<'_>> {
        self.collect_entries(|_| true)
    }

    /// Returns the entries in the given state, in creation order.
    #[must_use]
    pub fn entries_in_state(&self, state: EntityState) -> Vec<EntityEntry<'_>> {
        self.collect_entries(|entry| entry.state == state)
    }

    fn collect_entries(&self, filter: impl Fn(&StateEntry) -> bool) -> Vec<EntityEntry<'_>> {
        let entries = self.entries.lock();
        entries
            .order
            .iter()
            .filter_map(|key| {
                let entry = entries.by_key.get(key)?;
                if !filter(entry) {
                    return None;
                }
                let entity_type = self.model.entity_type(entry.entity_type)?;
                Some(EntityEntry::new(self, *key, entry.entity.clone(), entity_type))
            })
            .collect()
    }

    pub(crate) fn state(&self, key: ObjectKey) -> EntityState {
        self.entries
            .lock()
            .by_key
            .get(&key)
            .map_or(EntityState::Unknown, |entry| entry.state)
    }

    pub(crate) fn set_state(&self, key: ObjectKey, state: EntityState) {
        if let Some(entry) = self.entries.lock().by_key.get_mut(&key) {
            if entry.state != state {
                trace!(from = %entry.state, to = %state, "Entry state changed");
                entry.state = state;
            }
        }
    }

    pub(crate) fn shadow_value(&self, key: ObjectKey, property: PropertyId) -> Option<Value> {
        self.entries
            .lock()
            .by_key
            .get(&key)
            .and_then(|entry| entry.shadow_values.get(&property).cloned())
    }

    pub(crate) fn set_shadow_value(&self, key: ObjectKey, property: PropertyId, value: Value) {
        if let Some(entry) = self.entries.lock().by_key.get_mut(&key) {
            entry.shadow_values.insert(property, value);
        }
    }
}

impl std::fmt::Debug for StateManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StateManager")
            .field("entries", &self.entry_count())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tracking::{Entity, NavigationValue};
    use crate::types::ConfigurationSource;

    struct Widget;

    impl Entity for Widget {
        fn entity_type_name(&self) -> &str {
            "Widget"
        }

        fn navigation(&self, _name: &str) -> NavigationValue {
            NavigationValue::Null
        }
    }

    struct Stranger;

    impl Entity for Stranger {
        fn navigation(&self, _name: &str) -> NavigationValue {
            NavigationValue::Null
        }
    }

    fn manager() -> StateManager {
        let mut model = Model::new();
        model
            .get_or_add_entity_type("Widget", ConfigurationSource::Explicit)
            .unwrap();
        StateManager::new(Arc::new(model))
    }

    #[test]
    fn entries_are_identity_keyed() {
        let manager = manager();
        let a: EntityRef = Arc::new(Widget);
        let b: EntityRef = Arc::new(Widget);

        let first = manager.get_or_create_entry(&a).unwrap();
        assert_eq!(first.state(), EntityState::Unknown);
        first.set_state(EntityState::Added);

        let again = manager.get_or_create_entry(&a).unwrap();
        assert_eq!(again.state(), EntityState::Added);
        assert_eq!(again.key(), first.key());

        manager.get_or_create_entry(&b).unwrap();
        assert_eq!(manager.entry_count(), 2);
        assert_eq!(manager.entries_in_state(EntityState::Added).len(), 1);
        assert_eq!(manager.entries_in_state(EntityState::Unknown).len(), 1);
    }

    #[test]
    fn unmapped_type_is_rejected() {
        let manager = manager();
        let stranger: EntityRef = Arc::new(Stranger);
        let result = manager.get_or_create_entry(&stranger);
        assert!(matches!(result, Err(CoreError::EntityTypeNotFound { .. })));
        assert!(manager.try_get_entry(&stranger).is_none());
        assert_eq!(manager.entry_count(), 0);
    }

    #[test]
    fn entries_keep_creation_order() {
        let manager = manager();
        let objects: Vec<EntityRef> = (0..5).map(|_| Arc::new(Widget) as EntityRef).collect();
        for object in objects.iter().rev() {
            manager.get_or_create_entry(object).unwrap();
        }

        let keys: Vec<_> = manager.entries().iter().map(EntityEntry::key).collect();
        let expected: Vec<_> = objects.iter().rev().map(ObjectKey::of).collect();
        assert_eq!(keys, expected);
    }
}
