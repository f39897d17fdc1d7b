//! Tracking facade.

use crate::error::CoreResult;
use crate::metadata::Model;
use crate::tracking::{
    Entity, EntityEntry, EntityEntryGraphIterator, EntityRef, EntityState, StateManager,
};
use std::marker::PhantomData;
use std::sync::Arc;
use tracing::{debug, warn};

/// Starts tracking object graphs against a model.
///
/// `add`, `attach` and `update` walk the graph below the root and put
/// every newly reached object into the corresponding state. The root is
/// put into that state even if it was tracked before.
///
/// Objects below the root whose type is not part of the model are skipped
/// and the rest of the graph is still tracked; the first such error is
/// returned once the walk has finished.
///
/// # Example
///
/// ```rust
/// use entimap_core::{ConfigurationSource, Context, Entity, EntityRef, EntityState, ModelBuilder, NavigationValue};
/// use std::sync::Arc;
///
/// struct Tag;
///
/// impl Entity for Tag {
///     fn navigation(&self, _name: &str) -> NavigationValue {
///         NavigationValue::Null
///     }
/// }
///
/// let mut builder = ModelBuilder::new();
/// builder.entity::<Tag>(ConfigurationSource::Explicit)?;
/// let context = Context::new(builder.build());
///
/// let tag: EntityRef = Arc::new(Tag);
/// let entry = context.add(&tag)?;
/// assert_eq!(entry.state(), EntityState::Added);
/// # Ok::<(), entimap_core::CoreError>(())
/// ```
#[derive(Debug)]
pub struct Context {
    state_manager: StateManager,
}

impl Context {
    /// Creates a context over a finished model.
    #[must_use]
    pub fn new(model: Model) -> Self {
        Self::with_model(Arc::new(model))
    }

    /// Creates a context over a shared model.
    #[must_use]
    pub fn with_model(model: Arc<Model>) -> Self {
        Self {
            state_manager: StateManager::new(model),
        }
    }

    /// Returns the model.
    #[must_use]
    pub fn model(&self) -> &Model {
        self.state_manager.model()
    }

    /// Returns the state manager.
    #[must_use]
    pub fn state_manager(&self) -> &StateManager {
        &self.state_manager
    }

    /// Returns the entry of an object, creating an untracked one if needed.
    pub fn entry(&self, entity: &EntityRef) -> CoreResult<EntityEntry<'_>> {
        self.state_manager.get_or_create_entry(entity)
    }

    /// Tracks a graph as new.
    pub fn add(&self, entity: &EntityRef) -> CoreResult<EntityEntry<'_>> {
        self.track_graph(entity, EntityState::Added)
    }

    /// Tracks a graph as existing and unchanged.
    pub fn attach(&self, entity: &EntityRef) -> CoreResult<EntityEntry<'_>> {
        self.track_graph(entity, EntityState::Unchanged)
    }

    /// Tracks a graph as existing and modified.
    pub fn update(&self, entity: &EntityRef) -> CoreResult<EntityEntry<'_>> {
        self.track_graph(entity, EntityState::Modified)
    }

    /// Marks an object for deletion.
    ///
    /// Only the object itself is affected. An object that was added but
    /// never saved is detached instead.
    pub fn remove(&self, entity: &EntityRef) -> CoreResult<EntityEntry<'_>> {
        let entry = self.state_manager.get_or_create_entry(entity)?;
        let state = if entry.state() == EntityState::Added {
            EntityState::Unknown
        } else {
            EntityState::Deleted
        };
        entry.set_state(state);
        Ok(entry)
    }

    /// Calls [`Context::add`] for each object.
    pub fn add_range(&self, entities: &[EntityRef]) -> CoreResult<()> {
        entities.iter().try_for_each(|e| self.add(e).map(drop))
    }

    /// Calls [`Context::attach`] for each object.
    pub fn attach_range(&self, entities: &[EntityRef]) -> CoreResult<()> {
        entities.iter().try_for_each(|e| self.attach(e).map(drop))
    }

    /// Calls [`Context::update`] for each object.
    pub fn update_range(&self, entities: &[EntityRef]) -> CoreResult<()> {
        entities.iter().try_for_each(|e| self.update(e).map(drop))
    }

    /// Calls [`Context::remove`] for each object.
    pub fn remove_range(&self, entities: &[EntityRef]) -> CoreResult<()> {
        entities.iter().try_for_each(|e| self.remove(e).map(drop))
    }

    /// Returns a typed view for objects of type `T`.
    #[must_use]
    pub fn set<T: Entity>(&self) -> Set<'_, T> {
        Set {
            context: self,
            _marker: PhantomData,
        }
    }

    fn track_graph(&self, root: &EntityRef, state: EntityState) -> CoreResult<EntityEntry<'_>> {
        let mut reached = 0usize;
        let mut first_error = None;
        for entry in EntityEntryGraphIterator::new(&self.state_manager).traverse_graph(root)? {
            match entry {
                Ok(entry) => {
                    entry.set_state(state);
                    reached += 1;
                }
                Err(error) => {
                    warn!(%error, "Skipped object outside the model");
                    first_error.get_or_insert(error);
                }
            }
        }

        let root = self.state_manager.get_or_create_entry(root)?;
        root.set_state(state);
        debug!(entity_type = root.entity_type().name(), %state, reached, "Tracked graph");
        match first_error {
            Some(error) => Err(error),
            None => Ok(root),
        }
    }
}

/// Typed pass-through onto a [`Context`].
pub struct Set<'a, T: Entity> {
    context: &'a Context,
    _marker: PhantomData<fn() -> T>,
}

impl<'a, T: Entity> Set<'a, T> {
    /// See [`Context::add`].
    pub fn add(&self, entity: &Arc<T>) -> CoreResult<EntityEntry<'a>> {
        self.context.add(&erase(entity))
    }

    /// See [`Context::attach`].
    pub fn attach(&self, entity: &Arc<T>) -> CoreResult<EntityEntry<'a>> {
        self.context.attach(&erase(entity))
    }

    /// See [`Context::update`].
    pub fn update(&self, entity: &Arc<T>) -> CoreResult<EntityEntry<'a>> {
        self.context.update(&erase(entity))
    }

    /// See [`Context::remove`].
    pub fn remove(&self, entity: &Arc<T>) -> CoreResult<EntityEntry<'a>> {
        self.context.remove(&erase(entity))
    }

    /// See [`Context::add_range`].
    pub fn add_range(&self, entities: &[Arc<T>]) -> CoreResult<()> {
        self.context.add_range(&erase_all(entities))
    }

    /// See [`Context::attach_range`].
    pub fn attach_range(&self, entities: &[Arc<T>]) -> CoreResult<()> {
        self.context.attach_range(&erase_all(entities))
    }

    /// See [`Context::update_range`].
    pub fn update_range(&self, entities: &[Arc<T>]) -> CoreResult<()> {
        self.context.update_range(&erase_all(entities))
    }

    /// See [`Context::remove_range`].
    pub fn remove_range(&self, entities: &[Arc<T>]) -> CoreResult<()> {
        self.context.remove_range(&erase_all(entities))
    }
}

impl<T: Entity> std::fmt::Debug for Set<'_, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Set")
            .field("type", &std::any::type_name::<T>())
            .finish()
    }
}

fn erase<T: Entity>(entity: &Arc<T>) -> EntityRef {
    entity.clone()
}

fn erase_all<T: Entity>(entities: &[Arc<T>]) -> Vec<EntityRef> {
    entities.iter().map(erase).collect()
}
