//! Foreign key property discovery.
//!
//! Given a relationship whose foreign key properties were not configured
//! explicitly, pick the dependent properties that most likely hold the
//! reference. With `k` principal key properties, the candidates are tried
//! in order and the first complete one wins:
//!
//! 1. `<navigation><key name>` for every key property
//! 2. `<principal type name><key name>`
//! 3. `<key name>`
//! 4. the dependent's own primary key, for one-to-one relationships whose
//!    dependent key also has `k` properties
//!
//! Name matching ignores ASCII case and only considers properties with a
//! backing field. A composite candidate must match every key property in
//! order, with the same value type at each position. Naming candidates are
//! disqualified if a property is part of a key of the dependent or is
//! shared with a different foreign key.
//!
//! Without a candidate the relationship keeps (or gets) optional shadow
//! properties named `<navigation or principal type name><key name>`.
//! Existing shadow properties are kept only while their names and value
//! types still follow the referenced key, so a principal key change
//! replaces them.

use crate::builder::{create_shadow_foreign_key_properties, RelationshipBuilder};
use crate::conventions::{EntityTypeConvention, PropertyConvention, RelationshipConvention};
use crate::error::{CoreError, CoreResult};
use crate::metadata::{EntityType, ForeignKey, Model};
use crate::types::{ConfigurationSource, EntityTypeId, ForeignKeyId, PropertyId};
use crate::value::ValueType;
use tracing::{debug, trace};

/// Infers foreign key properties from naming and key shape.
#[derive(Debug, Clone, Copy, Default)]
pub struct ForeignKeyPropertyDiscoveryConvention;

impl ForeignKeyPropertyDiscoveryConvention {
    /// Runs discovery for one relationship.
    ///
    /// Returns the same handle when nothing changed, and a new handle when
    /// the foreign key was re-created over different properties.
    pub fn discover(
        &self,
        model: &mut Model,
        relationship: RelationshipBuilder,
    ) -> CoreResult<RelationshipBuilder> {
        let fk = model.foreign_key_or_err(relationship.foreign_key_id())?;
        if fk.properties_configuration_source() > ConfigurationSource::Convention {
            trace!(foreign_key = %fk.id(), "Foreign key properties configured explicitly");
            return Ok(relationship);
        }
        let fk = fk.clone();
        let dependent = model.entity_type_or_err(fk.dependent())?;
        let principal = model.entity_type_or_err(fk.principal())?;

        let key = fk
            .referenced_properties()
            .iter()
            .map(|id| {
                principal
                    .property(*id)
                    .map(|p| (p.name().to_string(), p.value_type()))
                    .ok_or_else(|| CoreError::property_not_found(principal.name(), id.to_string()))
            })
            .collect::<CoreResult<Vec<_>>>()?;
        let navigation = dependent
            .navigation_to_principal(fk.id())
            .map(|n| n.name().to_string());
        let prefix = navigation
            .clone()
            .unwrap_or_else(|| principal.simple_name().to_string());

        match find_candidate(dependent, &fk, navigation.as_deref(), principal.simple_name(), &key) {
            Some(candidate) => {
                if candidate == fk.properties() {
                    return Ok(relationship);
                }
                if let Some(other) = dependent
                    .foreign_keys()
                    .iter()
                    .find(|other| other.id() != fk.id() && other.properties() == candidate)
                {
                    debug!(
                        foreign_key = %fk.id(),
                        existing = %other.id(),
                        "Best candidate already used by another foreign key"
                    );
                    return Ok(relationship);
                }

                debug!(
                    entity_type = dependent.name(),
                    foreign_key = %fk.id(),
                    properties = ?candidate,
                    "Discovered foreign key properties"
                );
                relationship.foreign_key(model, &candidate, ConfigurationSource::Convention)
            }
            None => {
                if is_convention_shadow_key(dependent, &fk, &prefix, &key) {
                    return Ok(relationship);
                }
                let dependent_id = fk.dependent();
                let shadow = create_shadow_foreign_key_properties(
                    model,
                    dependent_id,
                    &prefix,
                    fk.referenced_properties(),
                )?;
                debug!(foreign_key = %fk.id(), properties = ?shadow, "Created shadow foreign key properties");
                relationship.foreign_key(model, &shadow, ConfigurationSource::Convention)
            }
        }
    }
}

/// Name and value type of each principal key property, in key order.
type KeyShape = [(String, ValueType)];

fn find_candidate(
    dependent: &EntityType,
    fk: &ForeignKey,
    navigation: Option<&str>,
    principal_name: &str,
    key: &KeyShape,
) -> Option<Vec<PropertyId>> {
    let prefixes = navigation
        .into_iter()
        .chain([principal_name, ""]);

    for prefix in prefixes {
        let matched = match_prefixed(dependent, prefix, key);
        if let Some(properties) = matched {
            if is_usable_naming_candidate(dependent, fk, &properties) {
                return Some(properties);
            }
            trace!(entity_type = dependent.name(), prefix, "Naming candidate disqualified");
        }
    }

    if fk.is_unique() {
        if let Some(pk) = dependent.primary_key() {
            let types_match = pk.properties().len() == key.len()
                && pk.properties().iter().zip(key).all(|(id, (_, value_type))| {
                    dependent
                        .property(*id)
                        .is_some_and(|p| p.value_type() == *value_type)
                });
            if types_match {
                return Some(pk.properties().to_vec());
            }
        }
    }
    None
}

fn match_prefixed(dependent: &EntityType, prefix: &str, key: &KeyShape) -> Option<Vec<PropertyId>> {
    key.iter()
        .map(|(name, value_type)| {
            dependent
                .find_clr_property_ignore_case(&format!("{prefix}{name}"))
                .filter(|p| p.value_type() == *value_type)
                .map(|p| p.id())
        })
        .collect()
}

fn is_usable_naming_candidate(dependent: &EntityType, fk: &ForeignKey, properties: &[PropertyId]) -> bool {
    if properties.iter().any(|p| dependent.is_key_property(*p)) {
        return false;
    }
    // An identical property set is handled by the caller; only partial
    // sharing disqualifies.
    !dependent.foreign_keys().iter().any(|other| {
        other.id() != fk.id()
            && other.properties() != properties
            && other.properties().iter().any(|p| properties.contains(p))
    })
}

fn is_convention_shadow_key(
    dependent: &EntityType,
    fk: &ForeignKey,
    prefix: &str,
    key: &KeyShape,
) -> bool {
    fk.properties_configuration_source() == ConfigurationSource::Convention
        && fk.properties().len() == key.len()
        && fk.properties().iter().zip(key).all(|(id, (name, value_type))| {
            dependent.property(*id).is_some_and(|p| {
                p.is_shadow()
                    && p.configuration_source() == ConfigurationSource::Convention
                    && p.value_type() == *value_type
                    && is_shadow_name_for(p.name(), &format!("{prefix}{name}"))
            })
        })
}

/// Returns true for `base` itself or `base` followed by a collision suffix.
fn is_shadow_name_for(name: &str, base: &str) -> bool {
    name.strip_prefix(base)
        .is_some_and(|suffix| suffix.bytes().all(|b| b.is_ascii_digit()))
}

/// Re-runs discovery for each foreign key in `pending`, skipping ids an
/// earlier rediscovery in the same pass replaced.
fn rediscover(model: &mut Model, pending: Vec<ForeignKeyId>) -> CoreResult<()> {
    for id in pending {
        if model.foreign_key(id).is_some() {
            ForeignKeyPropertyDiscoveryConvention.discover(model, RelationshipBuilder::new(id))?;
        }
    }
    Ok(())
}

fn convention_configured<'a>(
    foreign_keys: impl Iterator<Item = &'a ForeignKey>,
) -> Vec<ForeignKeyId> {
    foreign_keys
        .filter(|fk| fk.properties_configuration_source() == ConfigurationSource::Convention)
        .map(|fk| fk.id())
        .collect()
}

impl RelationshipConvention for ForeignKeyPropertyDiscoveryConvention {
    fn name(&self) -> &'static str {
        "foreign_key_discovery"
    }

    fn apply(
        &self,
        model: &mut Model,
        relationship: RelationshipBuilder,
    ) -> CoreResult<RelationshipBuilder> {
        self.discover(model, relationship)
    }
}

impl PropertyConvention for ForeignKeyPropertyDiscoveryConvention {
    fn name(&self) -> &'static str {
        "foreign_key_discovery"
    }

    fn apply(&self, model: &mut Model, property: PropertyId) -> CoreResult<()> {
        let owner = model
            .property_owner(property)
            .ok_or_else(|| CoreError::property_not_found("<unknown>", property.to_string()))?;
        // The new property may be a candidate on the dependent side, or it
        // may have changed the primary key that other foreign keys reference.
        let mut pending = convention_configured(model.entity_type_or_err(owner)?.foreign_keys().iter());
        for id in convention_configured(model.referencing_foreign_keys(owner)) {
            if !pending.contains(&id) {
                pending.push(id);
            }
        }
        rediscover(model, pending)
    }
}

/// Fired after a primary key was set: foreign keys referencing the entity
/// type may need properties of a different name or value type.
impl EntityTypeConvention for ForeignKeyPropertyDiscoveryConvention {
    fn name(&self) -> &'static str {
        "foreign_key_discovery"
    }

    fn apply(&self, model: &mut Model, entity_type: EntityTypeId) -> CoreResult<()> {
        let pending = convention_configured(model.referencing_foreign_keys(entity_type));
        rediscover(model, pending)
    }
}
