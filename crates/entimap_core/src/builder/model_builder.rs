//! Convention-aware model building.

use crate::builder::relationship::{create_relationship, RelationshipBuilder, RelationshipOptions};
use crate::config::Config;
use crate::conventions::ConventionSet;
use crate::error::{CoreError, CoreResult};
use crate::metadata::Model;
use crate::types::{ConfigurationSource, EntityTypeId, PropertyId};
use crate::value::ValueType;
use tracing::trace;

/// Builds a [`Model`], firing conventions as metadata is added.
///
/// Every operation takes the [`ConfigurationSource`] it is made under.
/// Operations re-fetch existing metadata by identity, so declaring the same
/// entity type or property twice is harmless.
///
/// # Example
///
/// ```rust
/// use entimap_core::{ConfigurationSource, ModelBuilder, RelationshipOptions, ValueType};
///
/// let source = ConfigurationSource::Explicit;
/// let mut builder = ModelBuilder::new();
/// let blog = builder.entity_named("Blog", source)?;
/// builder.property(blog, "Id", ValueType::Int32, source)?;
/// let post = builder.entity_named("Post", source)?;
/// builder.property(post, "Id", ValueType::Int32, source)?;
/// builder.property(post, "BlogId", ValueType::Int32, source)?;
///
/// let rel = builder.relationship(
///     blog,
///     post,
///     RelationshipOptions::new()
///         .navigation_to_principal("Blog")
///         .navigation_to_dependent("Posts"),
///     source,
/// )?;
///
/// let model = builder.build();
/// let fk = rel.metadata(&model).unwrap();
/// assert_eq!(model.property(fk.properties()[0]).unwrap().name(), "BlogId");
/// # Ok::<(), entimap_core::CoreError>(())
/// ```
#[derive(Debug, Default)]
pub struct ModelBuilder {
    model: Model,
    conventions: ConventionSet,
}

impl ModelBuilder {
    /// Creates a builder with the default convention set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a builder with the conventions enabled by `config`.
    #[must_use]
    pub fn with_config(config: &Config) -> Self {
        Self::with_conventions(ConventionSet::from_config(config))
    }

    /// Creates a builder with a custom convention set.
    #[must_use]
    pub fn with_conventions(conventions: ConventionSet) -> Self {
        Self {
            model: Model::new(),
            conventions,
        }
    }

    /// Returns the model built so far.
    #[must_use]
    pub fn model(&self) -> &Model {
        &self.model
    }

    /// Returns the model for direct mutation. Conventions do not fire.
    pub fn model_mut(&mut self) -> &mut Model {
        &mut self.model
    }

    /// Returns the installed conventions.
    #[must_use]
    pub fn conventions(&self) -> &ConventionSet {
        &self.conventions
    }

    /// Finishes building and returns the model.
    #[must_use]
    pub fn build(self) -> Model {
        self.model
    }

    /// Declares the entity type for a Rust type.
    pub fn entity<T: ?Sized + 'static>(
        &mut self,
        source: ConfigurationSource,
    ) -> CoreResult<EntityTypeId> {
        self.entity_named(std::any::type_name::<T>(), source)
    }

    /// Declares an entity type by name.
    pub fn entity_named(
        &mut self,
        name: &str,
        source: ConfigurationSource,
    ) -> CoreResult<EntityTypeId> {
        let (id, added) = self.model.get_or_add_entity_type(name, source)?;
        if added {
            for convention in &self.conventions.entity_type_added {
                trace!(convention = convention.name(), entity_type = name, "Applying convention");
                convention.apply(&mut self.model, id)?;
            }
        }
        Ok(id)
    }

    /// Declares a property backed by a field of the object.
    pub fn property(
        &mut self,
        entity_type: EntityTypeId,
        name: &str,
        value_type: ValueType,
        source: ConfigurationSource,
    ) -> CoreResult<PropertyId> {
        self.add_property(entity_type, name, value_type, false, source)
    }

    /// Declares a shadow property.
    pub fn shadow_property(
        &mut self,
        entity_type: EntityTypeId,
        name: &str,
        value_type: ValueType,
        source: ConfigurationSource,
    ) -> CoreResult<PropertyId> {
        self.add_property(entity_type, name, value_type, true, source)
    }

    fn add_property(
        &mut self,
        entity_type: EntityTypeId,
        name: &str,
        value_type: ValueType,
        shadow: bool,
        source: ConfigurationSource,
    ) -> CoreResult<PropertyId> {
        let (id, added) = self
            .model
            .get_or_add_property(entity_type, name, value_type, shadow, source)?;
        if added {
            for convention in &self.conventions.property_added {
                trace!(convention = convention.name(), property = name, "Applying convention");
                convention.apply(&mut self.model, id)?;
            }
        }
        Ok(id)
    }

    /// Configures whether a property is required.
    pub fn required(
        &mut self,
        property: PropertyId,
        required: bool,
        source: ConfigurationSource,
    ) -> CoreResult<bool> {
        self.model.set_property_required(property, required, source)
    }

    /// Configures whether a property accepts null.
    pub fn nullable(
        &mut self,
        property: PropertyId,
        nullable: bool,
        source: ConfigurationSource,
    ) -> CoreResult<bool> {
        self.model.set_property_nullable(property, nullable, source)
    }

    /// Sets the primary key from property names.
    pub fn primary_key(
        &mut self,
        entity_type: EntityTypeId,
        names: &[&str],
        source: ConfigurationSource,
    ) -> CoreResult<bool> {
        let properties = self.resolve(entity_type, names)?;
        self.primary_key_properties(entity_type, &properties, source)
    }

    /// Sets the primary key from property IDs.
    ///
    /// Referencing foreign keys follow the new key; conventions then get a
    /// chance to pick dependent properties that match it.
    pub fn primary_key_properties(
        &mut self,
        entity_type: EntityTypeId,
        properties: &[PropertyId],
        source: ConfigurationSource,
    ) -> CoreResult<bool> {
        if !self.model.set_primary_key(entity_type, properties, source)? {
            return Ok(false);
        }
        for convention in &self.conventions.primary_key_changed {
            trace!(convention = convention.name(), entity_type = %entity_type, "Applying convention");
            convention.apply(&mut self.model, entity_type)?;
        }
        Ok(true)
    }

    /// Adds an alternate key from property names.
    pub fn alternate_key(
        &mut self,
        entity_type: EntityTypeId,
        names: &[&str],
        source: ConfigurationSource,
    ) -> CoreResult<bool> {
        let properties = self.resolve(entity_type, names)?;
        self.model.add_alternate_key(entity_type, &properties, source)
    }

    /// Declares a relationship and runs the relationship conventions on it.
    ///
    /// The returned handle may differ from the one the relationship was
    /// created with if a convention re-created its foreign key.
    pub fn relationship(
        &mut self,
        principal: EntityTypeId,
        dependent: EntityTypeId,
        options: RelationshipOptions,
        source: ConfigurationSource,
    ) -> CoreResult<RelationshipBuilder> {
        let mut relationship =
            create_relationship(&mut self.model, principal, dependent, &options, source)?;
        for convention in &self.conventions.relationship_added {
            trace!(
                convention = convention.name(),
                foreign_key = %relationship.foreign_key_id(),
                "Applying convention"
            );
            relationship = convention.apply(&mut self.model, relationship)?;
        }
        Ok(relationship)
    }

    /// Assigns the foreign key properties of a relationship.
    pub fn foreign_key(
        &mut self,
        relationship: RelationshipBuilder,
        properties: &[PropertyId],
        source: ConfigurationSource,
    ) -> CoreResult<RelationshipBuilder> {
        relationship.foreign_key(&mut self.model, properties, source)
    }

    /// Configures whether a relationship is one-to-one.
    pub fn unique(
        &mut self,
        relationship: RelationshipBuilder,
        unique: bool,
        source: ConfigurationSource,
    ) -> CoreResult<RelationshipBuilder> {
        relationship.unique(&mut self.model, unique, source)
    }

    /// Sets or clears the relational constraint name of a relationship.
    pub fn foreign_key_name(
        &mut self,
        relationship: RelationshipBuilder,
        name: Option<&str>,
    ) -> CoreResult<()> {
        self.model
            .set_foreign_key_name(relationship.foreign_key_id(), name)
    }

    fn resolve(&self, entity_type: EntityTypeId, names: &[&str]) -> CoreResult<Vec<PropertyId>> {
        let et = self.model.entity_type_or_err(entity_type)?;
        names
            .iter()
            .map(|name| {
                et.find_property(name)
                    .map(|p| p.id())
                    .ok_or_else(|| CoreError::property_not_found(et.name(), *name))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Blog;

    #[test]
    fn entity_uses_rust_type_name() {
        let mut builder = ModelBuilder::with_config(&Config::without_conventions());
        let id = builder.entity::<Blog>(ConfigurationSource::Explicit).unwrap();
        let et = builder.model().entity_type(id).unwrap();
        assert!(et.name().ends_with("::Blog"));
        assert_eq!(et.simple_name(), "Blog");

        let again = builder.entity::<Blog>(ConfigurationSource::Convention).unwrap();
        assert_eq!(id, again);
    }

    #[test]
    fn key_discovery_runs_when_id_property_is_added() {
        let mut builder = ModelBuilder::new();
        let source = ConfigurationSource::Explicit;
        let blog = builder.entity_named("Blog", source).unwrap();
        let id = builder.property(blog, "BlogId", ValueType::Int32, source).unwrap();

        let pk = builder.model().entity_type(blog).unwrap().primary_key().unwrap();
        assert_eq!(pk.properties(), &[id]);
        assert_eq!(pk.configuration_source(), ConfigurationSource::Convention);
    }

    #[test]
    fn primary_key_by_unknown_name_fails() {
        let mut builder = ModelBuilder::with_config(&Config::without_conventions());
        let blog = builder
            .entity_named("Blog", ConfigurationSource::Explicit)
            .unwrap();
        let result = builder.primary_key(blog, &["Missing"], ConfigurationSource::Explicit);
        assert!(matches!(result, Err(CoreError::PropertyNotFound { .. })));
    }

    #[test]
    fn relationship_discovers_foreign_key_by_navigation_name() {
        let mut builder = ModelBuilder::new();
        let source = ConfigurationSource::Explicit;
        let author = builder.entity_named("Author", source).unwrap();
        builder.property(author, "Id", ValueType::Int64, source).unwrap();
        let book = builder.entity_named("Book", source).unwrap();
        builder.property(book, "Id", ValueType::Int64, source).unwrap();
        let writer_id = builder.property(book, "WriterId", ValueType::Int64, source).unwrap();

        let rel = builder
            .relationship(
                author,
                book,
                RelationshipOptions::new().navigation_to_principal("Writer"),
                ConfigurationSource::Convention,
            )
            .unwrap();

        let model = builder.build();
        let fk = rel.metadata(&model).unwrap();
        assert_eq!(fk.properties(), &[writer_id]);
        assert!(model.is_required(fk));
        assert_eq!(model.entity_type(book).unwrap().foreign_keys().len(), 1);
    }

    #[test]
    fn late_property_rediscovers_convention_foreign_key() {
        let mut builder = ModelBuilder::new();
        let source = ConfigurationSource::Explicit;
        let blog = builder.entity_named("Blog", source).unwrap();
        builder.property(blog, "Id", ValueType::Int32, source).unwrap();
        let post = builder.entity_named("Post", source).unwrap();
        builder.property(post, "Id", ValueType::Int32, source).unwrap();

        let rel = builder
            .relationship(blog, post, RelationshipOptions::new(), source)
            .unwrap();
        let shadow = rel.metadata(builder.model()).unwrap().properties()[0];
        assert!(builder.model().property(shadow).unwrap().is_shadow());

        let blog_id = builder.property(post, "blogid", ValueType::Int32, source).unwrap();
        let model = builder.build();
        let fks = model.entity_type(post).unwrap().foreign_keys();
        assert_eq!(fks.len(), 1);
        assert_eq!(fks[0].properties(), &[blog_id]);
        assert!(model.property(shadow).is_none());
    }
}
