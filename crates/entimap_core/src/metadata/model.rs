//! The mutable metadata model.

use crate::error::{CoreError, CoreResult};
use crate::metadata::{EntityType, ForeignKey, Key, Navigation, Property};
use crate::types::{ConfigurationSource, EntityTypeId, ForeignKeyId, PropertyId};
use crate::value::ValueType;
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// Graph of entity types, properties, keys, foreign keys and navigations.
///
/// Every mutation takes the [`ConfigurationSource`] it is made under and
/// refuses to replace configuration made under a stronger source. The
/// mutation methods return `Ok(false)` when they were outranked, and an
/// error only when the request is malformed.
#[derive(Debug, Clone, Default)]
pub struct Model {
    entity_types: Vec<EntityType>,
    by_name: HashMap<String, EntityTypeId>,
    property_owners: HashMap<PropertyId, EntityTypeId>,
    foreign_key_owners: HashMap<ForeignKeyId, EntityTypeId>,
    next_property_id: u32,
    next_foreign_key_id: u32,
}

impl Model {
    /// Creates an empty model.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns all entity types in creation order.
    #[must_use]
    pub fn entity_types(&self) -> &[EntityType] {
        &self.entity_types
    }

    /// Looks up an entity type by ID.
    #[must_use]
    pub fn entity_type(&self, id: EntityTypeId) -> Option<&EntityType> {
        self.entity_types.get(id.index())
    }

    /// Looks up an entity type by its full name.
    #[must_use]
    pub fn find_entity_type(&self, name: &str) -> Option<&EntityType> {
        self.by_name
            .get(name)
            .and_then(|id| self.entity_types.get(id.index()))
    }

    /// Looks up a property anywhere in the model.
    #[must_use]
    pub fn property(&self, id: PropertyId) -> Option<&Property> {
        self.property_owner(id)
            .and_then(|owner| self.entity_type(owner))
            .and_then(|et| et.property(id))
    }

    /// Returns the entity type declaring the property.
    #[must_use]
    pub fn property_owner(&self, id: PropertyId) -> Option<EntityTypeId> {
        self.property_owners.get(&id).copied()
    }

    /// Looks up a foreign key anywhere in the model.
    #[must_use]
    pub fn foreign_key(&self, id: ForeignKeyId) -> Option<&ForeignKey> {
        self.foreign_key_owners
            .get(&id)
            .and_then(|owner| self.entity_type(*owner))
            .and_then(|et| et.foreign_key(id))
    }

    /// Returns every foreign key in the model.
    pub fn foreign_keys(&self) -> impl Iterator<Item = &ForeignKey> {
        self.entity_types
            .iter()
            .flat_map(|et| et.foreign_keys().iter())
    }

    /// Returns the foreign keys whose principal is the given type.
    pub fn referencing_foreign_keys(
        &self,
        principal: EntityTypeId,
    ) -> impl Iterator<Item = &ForeignKey> {
        self.foreign_keys()
            .filter(move |fk| fk.principal() == principal)
    }

    /// Returns true if every property of the foreign key is required.
    #[must_use]
    pub fn is_required(&self, foreign_key: &ForeignKey) -> bool {
        self.entity_type(foreign_key.dependent())
            .is_some_and(|dependent| foreign_key.is_required(dependent))
    }

    pub(crate) fn entity_type_or_err(&self, id: EntityTypeId) -> CoreResult<&EntityType> {
        self.entity_type(id)
            .ok_or_else(|| CoreError::entity_type_not_found(id.to_string()))
    }

    fn entity_type_mut(&mut self, id: EntityTypeId) -> CoreResult<&mut EntityType> {
        self.entity_types
            .get_mut(id.index())
            .ok_or_else(|| CoreError::entity_type_not_found(id.to_string()))
    }

    pub(crate) fn foreign_key_or_err(&self, id: ForeignKeyId) -> CoreResult<&ForeignKey> {
        self.foreign_key(id)
            .ok_or(CoreError::ForeignKeyNotFound { id: id.as_u32() })
    }

    fn foreign_key_mut(&mut self, id: ForeignKeyId) -> CoreResult<&mut ForeignKey> {
        let owner = self
            .foreign_key_owners
            .get(&id)
            .copied()
            .ok_or(CoreError::ForeignKeyNotFound { id: id.as_u32() })?;
        self.entity_type_mut(owner)?
            .foreign_key_mut(id)
            .ok_or(CoreError::ForeignKeyNotFound { id: id.as_u32() })
    }

    fn property_mut(&mut self, id: PropertyId) -> CoreResult<&mut Property> {
        let owner = self
            .property_owner(id)
            .ok_or_else(|| CoreError::property_not_found("<unknown>", id.to_string()))?;
        let et = self.entity_type_mut(owner)?;
        let name = et.name().to_string();
        et.property_mut(id)
            .ok_or_else(|| CoreError::property_not_found(name, id.to_string()))
    }

    /// Returns the entity type with the given name, creating it if needed.
    ///
    /// The returned flag is true if the entity type was created.
    pub fn get_or_add_entity_type(
        &mut self,
        name: &str,
        source: ConfigurationSource,
    ) -> CoreResult<(EntityTypeId, bool)> {
        if name.is_empty() {
            return Err(CoreError::invalid_argument("entity type name is empty"));
        }

        if let Some(id) = self.by_name.get(name).copied() {
            self.entity_type_mut(id)?.update_source(source);
            return Ok((id, false));
        }

        let id = EntityTypeId::new(self.entity_types.len() as u32);
        self.entity_types
            .push(EntityType::new(id, name.to_string(), source));
        self.by_name.insert(name.to_string(), id);
        debug!(entity_type = name, %source, "Added entity type");
        Ok((id, true))
    }

    /// Returns the named property, creating it if needed.
    ///
    /// Re-declaring a shadow property with `shadow == false` links it to a
    /// backing field. Re-declaring with a different value type is accepted
    /// only from a source at least as strong as the original one.
    pub fn get_or_add_property(
        &mut self,
        entity_type: EntityTypeId,
        name: &str,
        value_type: ValueType,
        shadow: bool,
        source: ConfigurationSource,
    ) -> CoreResult<(PropertyId, bool)> {
        if name.is_empty() {
            return Err(CoreError::invalid_argument("property name is empty"));
        }

        let et = self.entity_type_mut(entity_type)?;
        if let Some(existing) = et.properties.iter_mut().find(|p| p.name() == name) {
            if existing.value_type() != value_type {
                if !source.overrides(existing.configuration_source()) {
                    return Err(CoreError::invalid_operation(format!(
                        "property '{name}' is already configured as {}",
                        existing.value_type()
                    )));
                }
                existing.set_value_type(value_type);
            }
            if existing.is_shadow() && !shadow {
                existing.promote(source);
            } else {
                existing.update_source(source);
            }
            return Ok((existing.id(), false));
        }

        if et.find_navigation(name).is_some() {
            return Err(CoreError::invalid_operation(format!(
                "'{name}' is already a navigation on {}",
                et.name()
            )));
        }

        let id = PropertyId::new(self.next_property_id);
        self.next_property_id += 1;
        let et = self.entity_type_mut(entity_type)?;
        et.properties.push(Property::new(
            id,
            name.to_string(),
            value_type,
            shadow,
            source,
        ));
        debug!(entity_type = et.name(), property = name, shadow, "Added property");
        self.property_owners.insert(id, entity_type);
        Ok((id, true))
    }

    /// Returns `base` if no member of the entity type uses it, otherwise the
    /// first of `base1`, `base2`, ... that is free.
    pub fn unique_member_name(&self, entity_type: EntityTypeId, base: &str) -> CoreResult<String> {
        let et = self.entity_type_or_err(entity_type)?;
        let taken = |name: &str| et.find_property(name).is_some() || et.find_navigation(name).is_some();

        if !taken(base) {
            return Ok(base.to_string());
        }
        let mut suffix = 1u32;
        loop {
            let candidate = format!("{base}{suffix}");
            if !taken(&candidate) {
                return Ok(candidate);
            }
            suffix += 1;
        }
    }

    /// Configures whether a property is required.
    pub fn set_property_required(
        &mut self,
        property: PropertyId,
        required: bool,
        source: ConfigurationSource,
    ) -> CoreResult<bool> {
        Ok(self.property_mut(property)?.set_required(required, source))
    }

    /// Configures whether a property accepts null.
    pub fn set_property_nullable(
        &mut self,
        property: PropertyId,
        nullable: bool,
        source: ConfigurationSource,
    ) -> CoreResult<bool> {
        Ok(self.property_mut(property)?.set_nullable(nullable, source))
    }

    /// Removes a property that no key or foreign key uses.
    pub fn remove_property(&mut self, property: PropertyId) -> CoreResult<Property> {
        let owner = self
            .property_owner(property)
            .ok_or_else(|| CoreError::property_not_found("<unknown>", property.to_string()))?;
        let et = self.entity_type_mut(owner)?;
        if et.is_key_property(property) || et.foreign_keys_containing(property).next().is_some() {
            return Err(CoreError::invalid_operation(format!(
                "{property} on {} is in use by a key or foreign key",
                et.name()
            )));
        }

        let index = et
            .properties
            .iter()
            .position(|p| p.id() == property)
            .ok_or_else(|| CoreError::property_not_found(et.name(), property.to_string()))?;
        let removed = et.properties.remove(index);
        debug!(entity_type = et.name(), property = removed.name(), "Removed property");
        self.property_owners.remove(&property);
        Ok(removed)
    }

    fn check_properties_on(
        &self,
        entity_type: EntityTypeId,
        properties: &[PropertyId],
    ) -> CoreResult<()> {
        if properties.is_empty() {
            return Err(CoreError::invalid_argument("property list is empty"));
        }
        let et = self.entity_type_or_err(entity_type)?;
        let mut seen = HashSet::with_capacity(properties.len());
        for id in properties {
            if et.property(*id).is_none() {
                return Err(CoreError::property_not_found(et.name(), id.to_string()));
            }
            if !seen.insert(*id) {
                return Err(CoreError::invalid_argument(format!(
                    "{id} appears more than once"
                )));
            }
        }
        Ok(())
    }

    /// Sets the primary key of an entity type.
    ///
    /// Foreign keys referencing the previous primary key are re-pointed at
    /// the new one when the arity matches; otherwise the change is refused.
    pub fn set_primary_key(
        &mut self,
        entity_type: EntityTypeId,
        properties: &[PropertyId],
        source: ConfigurationSource,
    ) -> CoreResult<bool> {
        self.check_properties_on(entity_type, properties)?;

        let old = self.entity_type_or_err(entity_type)?.primary_key().cloned();
        if let Some(current) = &old {
            if current.properties() == properties {
                let merged = Key::new(properties.to_vec(), current.configuration_source().max(source));
                self.entity_type_mut(entity_type)?.primary_key = Some(merged);
                return Ok(true);
            }
            if !source.overrides(current.configuration_source()) {
                return Ok(false);
            }
        }

        let mut repointed = Vec::new();
        if let Some(current) = &old {
            for fk in self.referencing_foreign_keys(entity_type) {
                if fk.referenced_properties() != current.properties() {
                    continue;
                }
                if fk.properties().len() != properties.len() {
                    return Err(CoreError::invalid_operation(format!(
                        "primary key of {} is referenced by {} and cannot change arity",
                        self.entity_type_or_err(entity_type)?.name(),
                        fk.id()
                    )));
                }
                repointed.push(fk.id());
            }
        }
        for id in repointed {
            self.foreign_key_mut(id)?
                .set_referenced_properties(properties.to_vec());
        }

        let et = self.entity_type_mut(entity_type)?;
        et.primary_key = Some(Key::new(properties.to_vec(), source));
        debug!(entity_type = et.name(), %source, "Set primary key");
        Ok(true)
    }

    /// Adds an alternate key. Returns false if an identical key exists.
    pub fn add_alternate_key(
        &mut self,
        entity_type: EntityTypeId,
        properties: &[PropertyId],
        source: ConfigurationSource,
    ) -> CoreResult<bool> {
        self.check_properties_on(entity_type, properties)?;
        let et = self.entity_type_mut(entity_type)?;
        if et.keys().any(|key| key.properties() == properties) {
            return Ok(false);
        }
        et.alternate_keys
            .push(Key::new(properties.to_vec(), source));
        Ok(true)
    }

    /// Adds a foreign key on `dependent` referencing `principal`.
    #[allow(clippy::too_many_arguments)]
    pub fn add_foreign_key(
        &mut self,
        dependent: EntityTypeId,
        principal: EntityTypeId,
        properties: &[PropertyId],
        referenced_properties: &[PropertyId],
        unique: bool,
        source: ConfigurationSource,
        properties_source: ConfigurationSource,
    ) -> CoreResult<ForeignKeyId> {
        self.check_properties_on(dependent, properties)?;
        self.check_properties_on(principal, referenced_properties)?;

        let id = ForeignKeyId::new(self.next_foreign_key_id);
        let fk = ForeignKey::new(
            id,
            dependent,
            principal,
            properties.to_vec(),
            referenced_properties.to_vec(),
            unique,
            source,
            properties_source,
        )?;
        self.next_foreign_key_id += 1;

        let et = self.entity_type_mut(dependent)?;
        et.foreign_keys.push(fk);
        debug!(entity_type = et.name(), foreign_key = %id, unique, "Added foreign key");
        self.foreign_key_owners.insert(id, dependent);
        Ok(id)
    }

    /// Removes a foreign key together with the navigations defined over it.
    pub fn remove_foreign_key(&mut self, id: ForeignKeyId) -> CoreResult<ForeignKey> {
        let fk = self.foreign_key_or_err(id)?.clone();

        let dependent = self.entity_type_mut(fk.dependent())?;
        dependent.foreign_keys.retain(|f| f.id() != id);
        dependent.navigations.retain(|n| n.foreign_key() != id);
        let principal = self.entity_type_mut(fk.principal())?;
        principal.navigations.retain(|n| n.foreign_key() != id);

        self.foreign_key_owners.remove(&id);
        debug!(foreign_key = %id, "Removed foreign key");
        Ok(fk)
    }

    /// Adds a navigation over a foreign key.
    ///
    /// With `points_to_principal` the navigation is declared on the
    /// dependent type, otherwise on the principal type.
    pub fn add_navigation(
        &mut self,
        name: &str,
        foreign_key: ForeignKeyId,
        points_to_principal: bool,
    ) -> CoreResult<()> {
        if name.is_empty() {
            return Err(CoreError::invalid_argument("navigation name is empty"));
        }
        let fk = self.foreign_key_or_err(foreign_key)?;
        let (declaring, target) = if points_to_principal {
            (fk.dependent(), fk.principal())
        } else {
            (fk.principal(), fk.dependent())
        };
        let unique = fk.is_unique();

        let et = self.entity_type_mut(declaring)?;
        if et.find_navigation(name).is_some() || et.find_property(name).is_some() {
            return Err(CoreError::invalid_operation(format!(
                "'{name}' is already a member of {}",
                et.name()
            )));
        }
        et.navigations.push(Navigation::new(
            name.to_string(),
            declaring,
            target,
            foreign_key,
            points_to_principal,
            unique,
        ));
        Ok(())
    }

    /// Moves every navigation defined over `from` onto `to`.
    pub(crate) fn retarget_navigations(&mut self, from: ForeignKeyId, to: ForeignKeyId, unique: bool) {
        for et in &mut self.entity_types {
            for navigation in et.navigations.iter_mut().filter(|n| n.foreign_key() == from) {
                navigation.retarget(to, unique);
            }
        }
    }

    /// Configures whether a foreign key is unique (one-to-one).
    pub fn set_foreign_key_unique(
        &mut self,
        id: ForeignKeyId,
        unique: bool,
        source: ConfigurationSource,
    ) -> CoreResult<bool> {
        let fk = self.foreign_key_or_err(id)?;
        if fk.is_unique() == unique {
            return Ok(true);
        }
        if !source.overrides(fk.configuration_source()) {
            return Ok(false);
        }
        self.foreign_key_mut(id)?.set_unique(unique);
        self.retarget_navigations(id, id, unique);
        Ok(true)
    }

    /// Sets or clears the constraint name of a foreign key.
    ///
    /// An empty name is rejected; `None` restores the generated default.
    pub fn set_foreign_key_name(&mut self, id: ForeignKeyId, name: Option<&str>) -> CoreResult<()> {
        if name.is_some_and(str::is_empty) {
            return Err(CoreError::invalid_argument(
                "foreign key name must be None or non-empty",
            ));
        }
        self.foreign_key_mut(id)?
            .set_relational_name(name.map(str::to_string));
        Ok(())
    }
}
