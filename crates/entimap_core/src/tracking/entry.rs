//! Entry views over tracked objects.

use crate::error::{CoreError, CoreResult};
use crate::metadata::{EntityType, Navigation, Property};
use crate::tracking::{EntityRef, EntityState, NavigationValue, ObjectKey, StateManager};
use crate::value::Value;
use std::fmt;

/// View of one tracked object.
///
/// Cheap to clone; the state is owned by the [`StateManager`] and reads
/// always observe its current value.
#[derive(Clone)]
pub struct EntityEntry<'a> {
    manager: &'a StateManager,
    key: ObjectKey,
    entity: EntityRef,
    entity_type: &'a EntityType,
}

impl<'a> EntityEntry<'a> {
    pub(crate) fn new(
        manager: &'a StateManager,
        key: ObjectKey,
        entity: EntityRef,
        entity_type: &'a EntityType,
    ) -> Self {
        Self {
            manager,
            key,
            entity,
            entity_type,
        }
    }

    /// Returns the identity of the object.
    #[must_use]
    pub fn key(&self) -> ObjectKey {
        self.key
    }

    /// Returns the tracked object.
    #[must_use]
    pub fn entity(&self) -> &EntityRef {
        &self.entity
    }

    /// Returns the entity type the object is mapped by.
    #[must_use]
    pub fn entity_type(&self) -> &'a EntityType {
        self.entity_type
    }

    /// Returns the current tracking state.
    #[must_use]
    pub fn state(&self) -> EntityState {
        self.manager.state(self.key)
    }

    /// Changes the tracking state.
    pub fn set_state(&self, state: EntityState) {
        self.manager.set_state(self.key, state);
    }

    /// Reads a navigation from the object.
    #[must_use]
    pub fn navigation_value(&self, navigation: &Navigation) -> NavigationValue {
        self.entity.navigation(navigation.name())
    }

    /// Reads a property value.
    ///
    /// Shadow values come from the state manager; other values from the
    /// object. Missing values read as [`Value::Null`].
    #[must_use]
    pub fn property_value(&self, property: &Property) -> Value {
        let value = if property.is_shadow() {
            self.manager.shadow_value(self.key, property.id())
        } else {
            self.entity.property(property.name())
        };
        value.unwrap_or(Value::Null)
    }

    /// Stores the value of a shadow property.
    pub fn set_shadow_value(&self, property: &Property, value: Value) -> CoreResult<()> {
        if self.entity_type.property(property.id()).is_none() {
            return Err(CoreError::property_not_found(
                self.entity_type.name(),
                property.name(),
            ));
        }
        if !property.is_shadow() {
            return Err(CoreError::invalid_operation(format!(
                "'{}' has a backing field and is set on the object",
                property.name()
            )));
        }
        match value.value_type() {
            None if property.is_required() => {
                return Err(CoreError::invalid_argument(format!(
                    "'{}' is required and cannot be null",
                    property.name()
                )));
            }
            Some(actual) if actual != property.value_type() => {
                return Err(CoreError::ValueTypeMismatch {
                    property: property.name().to_string(),
                    expected: property.value_type().to_string(),
                    actual: actual.to_string(),
                });
            }
            _ => {}
        }

        self.manager.set_shadow_value(self.key, property.id(), value);
        Ok(())
    }

    /// Returns a view of the named property.
    pub fn property(&self, name: &str) -> CoreResult<PropertyEntry<'a>> {
        let property = self
            .entity_type
            .find_property(name)
            .ok_or_else(|| CoreError::property_not_found(self.entity_type.name(), name))?;
        Ok(PropertyEntry {
            entry: self.clone(),
            property,
        })
    }
}

impl fmt::Debug for EntityEntry<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityEntry")
            .field("entity_type", &self.entity_type.name())
            .field("key", &self.key)
            .field("state", &self.state())
            .finish()
    }
}

/// View of one property of a tracked object.
#[derive(Debug, Clone)]
pub struct PropertyEntry<'a> {
    entry: EntityEntry<'a>,
    property: &'a Property,
}

impl<'a> PropertyEntry<'a> {
    /// Returns the property metadata.
    #[must_use]
    pub fn metadata(&self) -> &'a Property {
        self.property
    }

    /// Returns the property name.
    #[must_use]
    pub fn name(&self) -> &'a str {
        self.property.name()
    }

    /// Returns the entry the property belongs to.
    #[must_use]
    pub fn entry(&self) -> &EntityEntry<'a> {
        &self.entry
    }

    /// Returns the current value.
    #[must_use]
    pub fn current_value(&self) -> Value {
        self.entry.property_value(self.property)
    }

    /// Sets the current value of a shadow property.
    pub fn set_current_value(&self, value: impl Into<Value>) -> CoreResult<()> {
        self.entry.set_shadow_value(self.property, value.into())
    }
}
