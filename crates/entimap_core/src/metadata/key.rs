//! Key metadata.

use crate::types::{ConfigurationSource, PropertyId};

/// An ordered, non-empty set of properties that identifies an entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Key {
    properties: Vec<PropertyId>,
    source: ConfigurationSource,
}

impl Key {
    pub(crate) fn new(properties: Vec<PropertyId>, source: ConfigurationSource) -> Self {
        debug_assert!(!properties.is_empty());
        Self { properties, source }
    }

    /// Returns the key properties in order.
    #[must_use]
    pub fn properties(&self) -> &[PropertyId] {
        &self.properties
    }

    /// Returns true if the key includes the property.
    #[must_use]
    pub fn contains(&self, property: PropertyId) -> bool {
        self.properties.contains(&property)
    }

    /// Returns how the key was configured.
    #[must_use]
    pub fn configuration_source(&self) -> ConfigurationSource {
        self.source
    }
}
