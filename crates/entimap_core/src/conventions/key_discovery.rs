//! Primary key discovery by naming.

use crate::conventions::{EntityTypeConvention, PropertyConvention};
use crate::error::{CoreError, CoreResult};
use crate::metadata::Model;
use crate::types::{ConfigurationSource, EntityTypeId, PropertyId};
use tracing::debug;

/// Makes a property named `Id` or `<TypeName>Id` the primary key.
///
/// Names are compared ignoring ASCII case, `Id` first. Runs when an entity
/// type is added and again for every property added to it, but never
/// replaces a key configured under a stronger source than convention.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeyDiscoveryConvention;

impl KeyDiscoveryConvention {
    /// Discovers the primary key of one entity type.
    pub fn discover(&self, model: &mut Model, entity_type: EntityTypeId) -> CoreResult<()> {
        let et = model.entity_type_or_err(entity_type)?;
        if et
            .primary_key()
            .is_some_and(|pk| pk.configuration_source() > ConfigurationSource::Convention)
        {
            return Ok(());
        }

        let type_id_name = format!("{}Id", et.simple_name());
        let Some(candidate) = et
            .find_clr_property_ignore_case("Id")
            .or_else(|| et.find_clr_property_ignore_case(&type_id_name))
            .map(|p| p.id())
        else {
            return Ok(());
        };
        if et.primary_key().is_some_and(|pk| pk.properties() == [candidate]) {
            return Ok(());
        }

        let name = et.name().to_string();
        if model.set_primary_key(entity_type, &[candidate], ConfigurationSource::Convention)? {
            debug!(entity_type = %name, property = %candidate, "Discovered primary key");
        }
        Ok(())
    }
}

impl EntityTypeConvention for KeyDiscoveryConvention {
    fn name(&self) -> &'static str {
        "key_discovery"
    }

    fn apply(&self, model: &mut Model, entity_type: EntityTypeId) -> CoreResult<()> {
        self.discover(model, entity_type)
    }
}

impl PropertyConvention for KeyDiscoveryConvention {
    fn name(&self) -> &'static str {
        "key_discovery"
    }

    fn apply(&self, model: &mut Model, property: PropertyId) -> CoreResult<()> {
        let owner = model
            .property_owner(property)
            .ok_or_else(|| CoreError::property_not_found("<unknown>", property.to_string()))?;
        self.discover(model, owner)
    }
}
