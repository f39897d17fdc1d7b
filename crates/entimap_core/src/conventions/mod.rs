//! Model building conventions.
//!
//! A convention is a rule applied automatically while the model is built,
//! inferring metadata that was not configured explicitly. Conventions only
//! ever configure under [`ConfigurationSource::Convention`], so anything
//! configured explicitly wins.
//!
//! Conventions receive the [`Model`] directly; changes they make do not
//! fire further conventions.
//!
//! [`ConfigurationSource::Convention`]: crate::types::ConfigurationSource::Convention

mod foreign_key_discovery;
mod key_discovery;

pub use foreign_key_discovery::ForeignKeyPropertyDiscoveryConvention;
pub use key_discovery::KeyDiscoveryConvention;

use crate::builder::RelationshipBuilder;
use crate::config::Config;
use crate::error::CoreResult;
use crate::metadata::Model;
use crate::types::{EntityTypeId, PropertyId};
use std::fmt;
use std::sync::Arc;

/// Runs when an entity type is added to the model.
pub trait EntityTypeConvention: Send + Sync {
    /// Returns the convention name, for logging.
    fn name(&self) -> &'static str;

    /// Applies the convention to a newly added entity type.
    fn apply(&self, model: &mut Model, entity_type: EntityTypeId) -> CoreResult<()>;
}

/// Runs when a property is added to an entity type.
pub trait PropertyConvention: Send + Sync {
    /// Returns the convention name, for logging.
    fn name(&self) -> &'static str;

    /// Applies the convention to a newly added property.
    fn apply(&self, model: &mut Model, property: PropertyId) -> CoreResult<()>;
}

/// Runs when a relationship is declared.
pub trait RelationshipConvention: Send + Sync {
    /// Returns the convention name, for logging.
    fn name(&self) -> &'static str;

    /// Applies the convention and returns the handle to continue with.
    fn apply(
        &self,
        model: &mut Model,
        relationship: RelationshipBuilder,
    ) -> CoreResult<RelationshipBuilder>;
}

/// Ordered lists of conventions, one per model event.
#[derive(Clone)]
pub struct ConventionSet {
    /// Conventions run when an entity type is added.
    pub entity_type_added: Vec<Arc<dyn EntityTypeConvention>>,
    /// Conventions run when a property is added.
    pub property_added: Vec<Arc<dyn PropertyConvention>>,
    /// Conventions run when a relationship is declared.
    pub relationship_added: Vec<Arc<dyn RelationshipConvention>>,
    /// Conventions run after a primary key was set through the builder.
    pub primary_key_changed: Vec<Arc<dyn EntityTypeConvention>>,
}

impl ConventionSet {
    /// Creates a set with no conventions.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            entity_type_added: Vec::new(),
            property_added: Vec::new(),
            relationship_added: Vec::new(),
            primary_key_changed: Vec::new(),
        }
    }

    /// Creates the built-in conventions enabled by `config`.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        let mut set = Self::empty();

        if config.key_discovery {
            let keys = Arc::new(KeyDiscoveryConvention);
            set.entity_type_added.push(keys.clone());
            set.property_added.push(keys);
        }

        if config.foreign_key_discovery {
            let foreign_keys = Arc::new(ForeignKeyPropertyDiscoveryConvention);
            set.relationship_added.push(foreign_keys.clone());
            set.primary_key_changed.push(foreign_keys.clone());
            if config.rediscover_on_property_added {
                set.property_added.push(foreign_keys);
            }
        }

        set
    }

    /// Returns true if no convention is installed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entity_type_added.is_empty()
            && self.property_added.is_empty()
            && self.relationship_added.is_empty()
            && self.primary_key_changed.is_empty()
    }
}

impl Default for ConventionSet {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

impl fmt::Debug for ConventionSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConventionSet")
            .field(
                "entity_type_added",
                &self.entity_type_added.iter().map(|c| c.name()).collect::<Vec<_>>(),
            )
            .field(
                "property_added",
                &self.property_added.iter().map(|c| c.name()).collect::<Vec<_>>(),
            )
            .field(
                "relationship_added",
                &self.relationship_added.iter().map(|c| c.name()).collect::<Vec<_>>(),
            )
            .field(
                "primary_key_changed",
                &self.primary_key_changed.iter().map(|c| c.name()).collect::<Vec<_>>(),
            )
            .finish()
    }
}
