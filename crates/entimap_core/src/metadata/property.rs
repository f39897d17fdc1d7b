//! Property metadata.

use crate::types::{ConfigurationSource, PropertyId};
use crate::value::ValueType;

/// A scalar property of an entity type.
///
/// Whether a property is *required* is tracked separately from whether its
/// type is nullable: a nullable column can still be required by
/// configuration, and a non-nullable one can be marked optional (which is
/// what shadow foreign key properties are by default).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Property {
    id: PropertyId,
    name: String,
    value_type: ValueType,
    nullable: bool,
    /// Explicitly configured required flag, if any.
    required: Option<bool>,
    required_source: Option<ConfigurationSource>,
    nullable_source: Option<ConfigurationSource>,
    shadow: bool,
    source: ConfigurationSource,
}

impl Property {
    pub(crate) fn new(
        id: PropertyId,
        name: String,
        value_type: ValueType,
        shadow: bool,
        source: ConfigurationSource,
    ) -> Self {
        Self {
            id,
            name,
            value_type,
            nullable: value_type.is_nullable_by_default(),
            required: None,
            required_source: None,
            nullable_source: None,
            shadow,
            source,
        }
    }

    /// Returns the property ID.
    #[must_use]
    pub fn id(&self) -> PropertyId {
        self.id
    }

    /// Returns the property name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the value type.
    #[must_use]
    pub fn value_type(&self) -> ValueType {
        self.value_type
    }

    /// Returns true if the property accepts null values.
    #[must_use]
    pub fn is_nullable(&self) -> bool {
        self.nullable
    }

    /// Returns true if a value must be present.
    ///
    /// Defaults to the inverse of nullability unless configured.
    #[must_use]
    pub fn is_required(&self) -> bool {
        self.required.unwrap_or(!self.nullable)
    }

    /// Returns true if the property has no backing field on the object.
    #[must_use]
    pub fn is_shadow(&self) -> bool {
        self.shadow
    }

    /// Returns how the property itself was configured.
    #[must_use]
    pub fn configuration_source(&self) -> ConfigurationSource {
        self.source
    }

    /// Returns how the required flag was configured, if it was.
    #[must_use]
    pub fn required_configuration_source(&self) -> Option<ConfigurationSource> {
        self.required_source
    }

    pub(crate) fn set_required(&mut self, required: bool, source: ConfigurationSource) -> bool {
        if self.required_source.is_some_and(|current| !source.overrides(current)) {
            return false;
        }
        self.required = Some(required);
        self.required_source = Some(source);
        true
    }

    pub(crate) fn set_nullable(&mut self, nullable: bool, source: ConfigurationSource) -> bool {
        if self.nullable_source.is_some_and(|current| !source.overrides(current)) {
            return false;
        }
        self.nullable = nullable;
        self.nullable_source = Some(source);
        true
    }

    pub(crate) fn set_value_type(&mut self, value_type: ValueType) {
        self.value_type = value_type;
        if self.nullable_source.is_none() {
            self.nullable = value_type.is_nullable_by_default();
        }
    }

    /// Links a shadow property to a backing field.
    pub(crate) fn promote(&mut self, source: ConfigurationSource) {
        self.shadow = false;
        self.source = self.source.max(source);
    }

    pub(crate) fn update_source(&mut self, source: ConfigurationSource) {
        self.source = self.source.max(source);
    }
}
