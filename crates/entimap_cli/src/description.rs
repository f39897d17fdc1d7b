//! JSON model and object graph descriptions.
//!
//! A model file lists entity types and relationships:
//!
//! ```json
//! {
//!   "entities": [
//!     { "name": "Blog", "properties": [{ "name": "Id", "type": "int32" }] },
//!     { "name": "Post", "properties": [
//!         { "name": "Id", "type": "int32" },
//!         { "name": "BlogId", "type": "int32" }
//!     ] }
//!   ],
//!   "relationships": [
//!     { "principal": "Blog", "dependent": "Post",
//!       "navigation_to_principal": "Blog", "navigation_to_dependent": "Posts" }
//!   ]
//! }
//! ```
//!
//! Everything declared in the file is applied with explicit configuration
//! source; whatever is left unspecified is filled in by conventions.

use entimap_core::{
    Config, ConfigurationSource, CoreError, EntityTypeId, Model, ModelBuilder, PropertyId,
    RelationshipOptions, ValueType,
};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Errors raised while loading a description.
#[derive(Debug, Error)]
pub enum DescriptionError {
    /// The file could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        /// File path.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },

    /// The file is not valid JSON for the expected shape.
    #[error("failed to parse {path}: {source}")]
    Parse {
        /// File path.
        path: PathBuf,
        /// Underlying error.
        source: serde_json::Error,
    },

    /// The description refers to something it never declares.
    #[error("unknown {kind} '{name}'")]
    Unknown {
        /// What was looked up.
        kind: &'static str,
        /// The name that was not found.
        name: String,
    },

    /// The model rejected a declaration.
    #[error(transparent)]
    Model(#[from] CoreError),
}

/// Convention switches; absent fields keep their defaults.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConventionsDescription {
    /// See [`Config::key_discovery`].
    pub key_discovery: Option<bool>,
    /// See [`Config::foreign_key_discovery`].
    pub foreign_key_discovery: Option<bool>,
    /// See [`Config::rediscover_on_property_added`].
    pub rediscover_on_property_added: Option<bool>,
}

/// A property declaration.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PropertyDescription {
    /// Property name.
    pub name: String,
    /// Value type name, e.g. `int32` or `string`.
    #[serde(rename = "type")]
    pub value_type: String,
    /// Whether the property has no backing field.
    #[serde(default)]
    pub shadow: bool,
    /// Explicit nullability.
    pub nullable: Option<bool>,
    /// Explicit required flag.
    pub required: Option<bool>,
}

/// An entity type declaration.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EntityDescription {
    /// Entity type name.
    pub name: String,
    /// Properties in declaration order.
    #[serde(default)]
    pub properties: Vec<PropertyDescription>,
    /// Primary key property names; discovered by convention when absent.
    pub key: Option<Vec<String>>,
    /// Alternate keys.
    #[serde(default)]
    pub alternate_keys: Vec<Vec<String>>,
}

/// A relationship declaration.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RelationshipDescription {
    /// Principal entity type name.
    pub principal: String,
    /// Dependent entity type name.
    pub dependent: String,
    /// Navigation on the dependent pointing at the principal.
    pub navigation_to_principal: Option<String>,
    /// Navigation on the principal pointing at its dependents.
    pub navigation_to_dependent: Option<String>,
    /// Foreign key property names; discovered by convention when absent.
    pub foreign_key: Option<Vec<String>>,
    /// Whether each principal has at most one dependent.
    #[serde(default)]
    pub unique: bool,
    /// Relational constraint name.
    pub constraint_name: Option<String>,
}

/// A complete model file.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModelDescription {
    /// Convention switches.
    #[serde(default)]
    pub conventions: ConventionsDescription,
    /// Entity types.
    #[serde(default)]
    pub entities: Vec<EntityDescription>,
    /// Relationships, declared after every entity type.
    #[serde(default)]
    pub relationships: Vec<RelationshipDescription>,
}

impl ModelDescription {
    /// Reads a model file.
    pub fn load(path: &Path) -> Result<Self, DescriptionError> {
        read_json(path)
    }

    /// Returns the configuration the conventions should honor.
    ///
    /// `disable_conventions` overrides every switch in the file.
    pub fn config(&self, disable_conventions: bool) -> Config {
        if disable_conventions {
            return Config::without_conventions();
        }
        let defaults = Config::default();
        let c = &self.conventions;
        Config::new()
            .key_discovery(c.key_discovery.unwrap_or(defaults.key_discovery))
            .foreign_key_discovery(c.foreign_key_discovery.unwrap_or(defaults.foreign_key_discovery))
            .rediscover_on_property_added(
                c.rediscover_on_property_added
                    .unwrap_or(defaults.rediscover_on_property_added),
            )
    }

    /// Builds the model, running conventions as declarations are applied.
    pub fn build(&self, config: &Config) -> Result<Model, DescriptionError> {
        let source = ConfigurationSource::Explicit;
        let mut builder = ModelBuilder::with_config(config);
        let mut types = HashMap::new();

        for entity in &self.entities {
            let id = builder.entity_named(&entity.name, source)?;
            types.insert(entity.name.as_str(), id);

            for property in &entity.properties {
                let value_type: ValueType = property.value_type.parse()?;
                let pid = if property.shadow {
                    builder.shadow_property(id, &property.name, value_type, source)?
                } else {
                    builder.property(id, &property.name, value_type, source)?
                };
                if let Some(nullable) = property.nullable {
                    builder.nullable(pid, nullable, source)?;
                }
                if let Some(required) = property.required {
                    builder.required(pid, required, source)?;
                }
            }

            if let Some(key) = &entity.key {
                builder.primary_key(id, &as_strs(key), source)?;
            }
            for key in &entity.alternate_keys {
                builder.alternate_key(id, &as_strs(key), source)?;
            }
        }

        for relationship in &self.relationships {
            let principal = lookup(&types, &relationship.principal)?;
            let dependent = lookup(&types, &relationship.dependent)?;

            let mut options = RelationshipOptions::new().unique(relationship.unique);
            if let Some(name) = &relationship.navigation_to_principal {
                options = options.navigation_to_principal(name.as_str());
            }
            if let Some(name) = &relationship.navigation_to_dependent {
                options = options.navigation_to_dependent(name.as_str());
            }
            if let Some(names) = &relationship.foreign_key {
                let properties = resolve_properties(builder.model(), dependent, names)?;
                options = options.foreign_key(&properties);
            }

            let handle = builder.relationship(principal, dependent, options, source)?;
            if let Some(name) = &relationship.constraint_name {
                builder.foreign_key_name(handle, Some(name.as_str()))?;
            }
            debug!(
                principal = %relationship.principal,
                dependent = %relationship.dependent,
                foreign_key = %handle.foreign_key_id(),
                "Declared relationship"
            );
        }

        Ok(builder.build())
    }
}

/// One object of a graph file.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ObjectDescription {
    /// Unique label used to refer to the object.
    pub label: String,
    /// Entity type name.
    #[serde(rename = "type")]
    pub type_name: String,
    /// Reference navigations: navigation name to target label.
    #[serde(default)]
    pub references: HashMap<String, String>,
    /// Collection navigations: navigation name to target labels.
    #[serde(default)]
    pub collections: HashMap<String, Vec<String>>,
}

/// An object graph file.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GraphDescription {
    /// Label of the object traversal starts at.
    pub root: String,
    /// Objects in any order.
    pub objects: Vec<ObjectDescription>,
}

impl GraphDescription {
    /// Reads a graph file.
    pub fn load(path: &Path) -> Result<Self, DescriptionError> {
        read_json(path)
    }
}

fn read_json<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<T, DescriptionError> {
    let text = std::fs::read_to_string(path).map_err(|source| DescriptionError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| DescriptionError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

fn as_strs(names: &[String]) -> Vec<&str> {
    names.iter().map(String::as_str).collect()
}

fn lookup(types: &HashMap<&str, EntityTypeId>, name: &str) -> Result<EntityTypeId, DescriptionError> {
    types.get(name).copied().ok_or_else(|| DescriptionError::Unknown {
        kind: "entity type",
        name: name.to_string(),
    })
}

fn resolve_properties(
    model: &Model,
    entity_type: EntityTypeId,
    names: &[String],
) -> Result<Vec<PropertyId>, DescriptionError> {
    let et = model
        .entity_type(entity_type)
        .ok_or_else(|| CoreError::entity_type_not_found(entity_type.to_string()))?;
    names
        .iter()
        .map(|name| {
            et.find_property(name)
                .map(|p| p.id())
                .ok_or_else(|| DescriptionError::Unknown {
                    kind: "property",
                    name: format!("{}.{name}", et.name()),
                })
        })
        .collect()
}
