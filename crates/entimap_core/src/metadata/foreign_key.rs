//! Foreign key metadata.

use crate::error::{CoreError, CoreResult};
use crate::metadata::EntityType;
use crate::types::{ConfigurationSource, EntityTypeId, ForeignKeyId, PropertyId};

/// A relationship between a dependent and a principal entity type.
///
/// `properties[i]` on the dependent refers to `referenced_properties[i]`
/// on the principal; both sequences always have the same non-zero length.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForeignKey {
    id: ForeignKeyId,
    dependent: EntityTypeId,
    principal: EntityTypeId,
    properties: Vec<PropertyId>,
    referenced_properties: Vec<PropertyId>,
    is_unique: bool,
    /// How the relationship itself was configured.
    source: ConfigurationSource,
    /// How the dependent-side properties were chosen.
    properties_source: ConfigurationSource,
    relational_name: Option<String>,
}

impl ForeignKey {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        id: ForeignKeyId,
        dependent: EntityTypeId,
        principal: EntityTypeId,
        properties: Vec<PropertyId>,
        referenced_properties: Vec<PropertyId>,
        is_unique: bool,
        source: ConfigurationSource,
        properties_source: ConfigurationSource,
    ) -> CoreResult<Self> {
        if properties.is_empty() {
            return Err(CoreError::invalid_argument(
                "foreign key requires at least one property",
            ));
        }
        if properties.len() != referenced_properties.len() {
            return Err(CoreError::ForeignKeyArityMismatch {
                expected: referenced_properties.len(),
                actual: properties.len(),
            });
        }

        Ok(Self {
            id,
            dependent,
            principal,
            properties,
            referenced_properties,
            is_unique,
            source,
            properties_source,
            relational_name: None,
        })
    }

    /// Returns the foreign key ID.
    #[must_use]
    pub fn id(&self) -> ForeignKeyId {
        self.id
    }

    /// Returns the entity type holding the foreign key properties.
    #[must_use]
    pub fn dependent(&self) -> EntityTypeId {
        self.dependent
    }

    /// Returns the referenced entity type.
    #[must_use]
    pub fn principal(&self) -> EntityTypeId {
        self.principal
    }

    /// Returns the dependent-side properties in order.
    #[must_use]
    pub fn properties(&self) -> &[PropertyId] {
        &self.properties
    }

    /// Returns the principal-side properties, paired by position.
    #[must_use]
    pub fn referenced_properties(&self) -> &[PropertyId] {
        &self.referenced_properties
    }

    /// Returns true if each principal has at most one dependent.
    #[must_use]
    pub fn is_unique(&self) -> bool {
        self.is_unique
    }

    /// Returns true if every foreign key property is required.
    ///
    /// Properties that cannot be resolved on `dependent` count as optional.
    #[must_use]
    pub fn is_required(&self, dependent: &EntityType) -> bool {
        self.properties.iter().all(|id| {
            dependent
                .property(*id)
                .is_some_and(|property| property.is_required())
        })
    }

    /// Returns how the relationship was configured.
    #[must_use]
    pub fn configuration_source(&self) -> ConfigurationSource {
        self.source
    }

    /// Returns how the foreign key properties were chosen.
    #[must_use]
    pub fn properties_configuration_source(&self) -> ConfigurationSource {
        self.properties_source
    }

    /// Returns the explicitly configured constraint name.
    #[must_use]
    pub fn relational_name(&self) -> Option<&str> {
        self.relational_name.as_deref()
    }

    pub(crate) fn set_relational_name(&mut self, name: Option<String>) {
        self.relational_name = name;
    }

    pub(crate) fn set_unique(&mut self, unique: bool) {
        self.is_unique = unique;
    }

    pub(crate) fn set_referenced_properties(&mut self, properties: Vec<PropertyId>) {
        debug_assert_eq!(properties.len(), self.properties.len());
        self.referenced_properties = properties;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(raw: &[u32]) -> Vec<PropertyId> {
        raw.iter().copied().map(PropertyId::new).collect()
    }

    #[test]
    fn rejects_empty_properties() {
        let result = ForeignKey::new(
            ForeignKeyId::new(0),
            EntityTypeId::new(1),
            EntityTypeId::new(0),
            Vec::new(),
            Vec::new(),
            false,
            ConfigurationSource::Convention,
            ConfigurationSource::Convention,
        );
        assert!(matches!(result, Err(CoreError::InvalidArgument { .. })));
    }

    #[test]
    fn rejects_arity_mismatch() {
        let result = ForeignKey::new(
            ForeignKeyId::new(0),
            EntityTypeId::new(1),
            EntityTypeId::new(0),
            ids(&[3]),
            ids(&[1, 2]),
            false,
            ConfigurationSource::Convention,
            ConfigurationSource::Convention,
        );
        assert!(matches!(
            result,
            Err(CoreError::ForeignKeyArityMismatch {
                expected: 2,
                actual: 1
            })
        ));
    }

    #[test]
    fn pairs_properties_by_position() {
        let fk = ForeignKey::new(
            ForeignKeyId::new(4),
            EntityTypeId::new(1),
            EntityTypeId::new(0),
            ids(&[10, 11]),
            ids(&[1, 2]),
            true,
            ConfigurationSource::Explicit,
            ConfigurationSource::Convention,
        )
        .unwrap();

        assert_eq!(fk.properties(), ids(&[10, 11]).as_slice());
        assert_eq!(fk.referenced_properties(), ids(&[1, 2]).as_slice());
        assert!(fk.is_unique());
        assert_eq!(fk.configuration_source(), ConfigurationSource::Explicit);
        assert_eq!(
            fk.properties_configuration_source(),
            ConfigurationSource::Convention
        );
    }
}
