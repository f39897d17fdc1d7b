//! Relationship declaration and foreign key re-assignment.

use crate::error::{CoreError, CoreResult};
use crate::metadata::{ForeignKey, Model};
use crate::types::{ConfigurationSource, EntityTypeId, ForeignKeyId, PropertyId};
use tracing::debug;

/// Options for declaring a relationship.
///
/// Everything is optional: without foreign key properties the relationship
/// is created over shadow properties, and without referenced properties it
/// targets the principal's primary key.
#[derive(Debug, Clone, Default)]
pub struct RelationshipOptions {
    /// Navigation declared on the dependent, pointing at the principal.
    pub navigation_to_principal: Option<String>,
    /// Navigation declared on the principal, pointing at the dependents.
    pub navigation_to_dependent: Option<String>,
    /// Dependent-side foreign key properties.
    pub foreign_key_properties: Option<Vec<PropertyId>>,
    /// Principal-side referenced properties.
    pub referenced_properties: Option<Vec<PropertyId>>,
    /// Whether the relationship is one-to-one.
    pub unique: bool,
}

impl RelationshipOptions {
    /// Creates empty options (one-to-many, no navigations).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the navigation from dependent to principal.
    #[must_use]
    pub fn navigation_to_principal(mut self, name: impl Into<String>) -> Self {
        self.navigation_to_principal = Some(name.into());
        self
    }

    /// Sets the navigation from principal to dependents.
    #[must_use]
    pub fn navigation_to_dependent(mut self, name: impl Into<String>) -> Self {
        self.navigation_to_dependent = Some(name.into());
        self
    }

    /// Sets the foreign key properties.
    #[must_use]
    pub fn foreign_key(mut self, properties: &[PropertyId]) -> Self {
        self.foreign_key_properties = Some(properties.to_vec());
        self
    }

    /// Sets the referenced principal properties.
    #[must_use]
    pub fn referenced_key(mut self, properties: &[PropertyId]) -> Self {
        self.referenced_properties = Some(properties.to_vec());
        self
    }

    /// Sets whether the relationship is one-to-one.
    #[must_use]
    pub fn unique(mut self, unique: bool) -> Self {
        self.unique = unique;
        self
    }
}

/// Handle to a relationship, identified by its foreign key.
///
/// Operations that have to re-create the foreign key return a new handle;
/// callers must continue with the returned value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RelationshipBuilder {
    foreign_key: ForeignKeyId,
}

impl RelationshipBuilder {
    /// Wraps an existing foreign key.
    #[must_use]
    pub fn new(foreign_key: ForeignKeyId) -> Self {
        Self { foreign_key }
    }

    /// Returns the foreign key this handle refers to.
    #[must_use]
    pub fn foreign_key_id(self) -> ForeignKeyId {
        self.foreign_key
    }

    /// Resolves the foreign key metadata.
    #[must_use]
    pub fn metadata(self, model: &Model) -> Option<&ForeignKey> {
        model.foreign_key(self.foreign_key)
    }

    /// Assigns the foreign key properties.
    ///
    /// The foreign key is re-created over `properties` unless its current
    /// properties were chosen under a stronger source. Navigations move to
    /// the new foreign key and convention-created shadow properties that
    /// nothing uses any more are removed.
    pub fn foreign_key(
        self,
        model: &mut Model,
        properties: &[PropertyId],
        source: ConfigurationSource,
    ) -> CoreResult<Self> {
        let old = model.foreign_key_or_err(self.foreign_key)?.clone();
        if !source.overrides(old.properties_configuration_source()) {
            return Ok(self);
        }
        if old.properties() == properties {
            return Ok(self);
        }

        let new_id = model.add_foreign_key(
            old.dependent(),
            old.principal(),
            properties,
            old.referenced_properties(),
            old.is_unique(),
            old.configuration_source(),
            source,
        )?;
        if let Some(name) = old.relational_name() {
            model.set_foreign_key_name(new_id, Some(name))?;
        }
        model.retarget_navigations(old.id(), new_id, old.is_unique());
        model.remove_foreign_key(old.id())?;

        for property in old.properties() {
            if !properties.contains(property) {
                remove_if_orphaned_shadow(model, old.dependent(), *property)?;
            }
        }

        debug!(from = %old.id(), to = %new_id, %source, "Reassigned foreign key properties");
        Ok(Self::new(new_id))
    }

    /// Configures whether the relationship is one-to-one.
    pub fn unique(
        self,
        model: &mut Model,
        unique: bool,
        source: ConfigurationSource,
    ) -> CoreResult<Self> {
        model.set_foreign_key_unique(self.foreign_key, unique, source)?;
        Ok(self)
    }
}

fn remove_if_orphaned_shadow(
    model: &mut Model,
    entity_type: EntityTypeId,
    property: PropertyId,
) -> CoreResult<()> {
    let et = model.entity_type_or_err(entity_type)?;
    let removable = et.property(property).is_some_and(|p| {
        p.is_shadow() && p.configuration_source() == ConfigurationSource::Convention
    }) && !et.is_key_property(property)
        && et.foreign_keys_containing(property).next().is_none();

    if removable {
        model.remove_property(property)?;
    }
    Ok(())
}

/// Creates `referenced.len()` shadow properties on `dependent` named
/// `<base><referenced name>`, suffixed with the first free number on
/// collision. The new properties copy the referenced value types and are
/// marked optional.
pub fn create_shadow_foreign_key_properties(
    model: &mut Model,
    dependent: EntityTypeId,
    base: &str,
    referenced: &[PropertyId],
) -> CoreResult<Vec<PropertyId>> {
    let mut created = Vec::with_capacity(referenced.len());
    for id in referenced {
        let (referenced_name, value_type) = {
            let property = model
                .property(*id)
                .ok_or_else(|| CoreError::property_not_found("<principal>", id.to_string()))?;
            (property.name().to_string(), property.value_type())
        };

        let name = model.unique_member_name(dependent, &format!("{base}{referenced_name}"))?;
        let (property, _) = model.get_or_add_property(
            dependent,
            &name,
            value_type,
            true,
            ConfigurationSource::Convention,
        )?;
        model.set_property_required(property, false, ConfigurationSource::Convention)?;
        created.push(property);
    }
    Ok(created)
}

/// Declares a relationship directly on the model, without running conventions.
pub(crate) fn create_relationship(
    model: &mut Model,
    principal: EntityTypeId,
    dependent: EntityTypeId,
    options: &RelationshipOptions,
    source: ConfigurationSource,
) -> CoreResult<RelationshipBuilder> {
    let principal_type = model.entity_type_or_err(principal)?;
    let referenced = match &options.referenced_properties {
        Some(properties) => properties.clone(),
        None => principal_type
            .primary_key()
            .ok_or_else(|| {
                CoreError::invalid_operation(format!(
                    "principal {} has no primary key",
                    principal_type.name()
                ))
            })?
            .properties()
            .to_vec(),
    };
    let principal_name = principal_type.simple_name().to_string();

    check_member_free(model, dependent, options.navigation_to_principal.as_deref())?;
    check_member_free(model, principal, options.navigation_to_dependent.as_deref())?;
    if principal == dependent
        && options.navigation_to_principal.is_some()
        && options.navigation_to_principal == options.navigation_to_dependent
    {
        return Err(CoreError::invalid_argument(
            "both navigations of a self-referencing relationship have the same name",
        ));
    }

    let (properties, properties_source) = match &options.foreign_key_properties {
        Some(properties) => (properties.clone(), source),
        None => {
            let base = options
                .navigation_to_principal
                .as_deref()
                .unwrap_or(&principal_name);
            (
                create_shadow_foreign_key_properties(model, dependent, base, &referenced)?,
                ConfigurationSource::Convention,
            )
        }
    };

    let fk = model.add_foreign_key(
        dependent,
        principal,
        &properties,
        &referenced,
        options.unique,
        source,
        properties_source,
    )?;
    if let Some(name) = &options.navigation_to_principal {
        model.add_navigation(name, fk, true)?;
    }
    if let Some(name) = &options.navigation_to_dependent {
        model.add_navigation(name, fk, false)?;
    }

    Ok(RelationshipBuilder::new(fk))
}

fn check_member_free(model: &Model, entity_type: EntityTypeId, name: Option<&str>) -> CoreResult<()> {
    let Some(name) = name else {
        return Ok(());
    };
    let et = model.entity_type_or_err(entity_type)?;
    if et.find_navigation(name).is_some() || et.find_property(name).is_some() {
        return Err(CoreError::invalid_operation(format!(
            "'{name}' is already a member of {}",
            et.name()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::ValueType;

    fn blog_model() -> (Model, EntityTypeId, EntityTypeId) {
        let mut model = Model::new();
        let source = ConfigurationSource::Explicit;
        let (blog, _) = model.get_or_add_entity_type("Blog", source).unwrap();
        let (post, _) = model.get_or_add_entity_type("Post", source).unwrap();
        let (id, _) = model
            .get_or_add_property(blog, "Id", ValueType::Int32, false, source)
            .unwrap();
        model.set_primary_key(blog, &[id], source).unwrap();
        (model, blog, post)
    }

    #[test]
    fn relationship_without_properties_uses_optional_shadow_properties() {
        let (mut model, blog, post) = blog_model();
        let options = RelationshipOptions::new()
            .navigation_to_principal("Blog")
            .navigation_to_dependent("Posts");
        let rel = create_relationship(&mut model, blog, post, &options, ConfigurationSource::Explicit)
            .unwrap();

        let fk = rel.metadata(&model).unwrap();
        let property = model.property(fk.properties()[0]).unwrap();
        assert_eq!(property.name(), "BlogId");
        assert!(property.is_shadow());
        assert!(!model.is_required(fk));
        assert_eq!(
            fk.properties_configuration_source(),
            ConfigurationSource::Convention
        );
    }

    #[test]
    fn relationship_requires_principal_key() {
        let mut model = Model::new();
        let source = ConfigurationSource::Explicit;
        let (a, _) = model.get_or_add_entity_type("A", source).unwrap();
        let (b, _) = model.get_or_add_entity_type("B", source).unwrap();

        let result = create_relationship(&mut model, a, b, &RelationshipOptions::new(), source);
        assert!(matches!(result, Err(CoreError::InvalidOperation { .. })));
    }

    #[test]
    fn reassigning_properties_returns_new_handle_and_drops_orphans() {
        let (mut model, blog, post) = blog_model();
        let options = RelationshipOptions::new()
            .navigation_to_principal("Blog")
            .navigation_to_dependent("Posts");
        let rel = create_relationship(&mut model, blog, post, &options, ConfigurationSource::Explicit)
            .unwrap();
        let shadow = rel.metadata(&model).unwrap().properties()[0];
        let (owner_id, _) = model
            .get_or_add_property(post, "OwnerBlogId", ValueType::Int32, false, ConfigurationSource::Explicit)
            .unwrap();

        let new_rel = rel
            .foreign_key(&mut model, &[owner_id], ConfigurationSource::Explicit)
            .unwrap();
        assert_ne!(rel, new_rel);
        assert!(rel.metadata(&model).is_none());
        assert!(model.property(shadow).is_none());

        let post_type = model.entity_type(post).unwrap();
        assert_eq!(post_type.foreign_keys().len(), 1);
        assert_eq!(
            post_type.find_navigation("Blog").unwrap().foreign_key(),
            new_rel.foreign_key_id()
        );
        assert_eq!(
            model
                .entity_type(blog)
                .unwrap()
                .find_navigation("Posts")
                .unwrap()
                .foreign_key(),
            new_rel.foreign_key_id()
        );
    }

    #[test]
    fn weaker_source_keeps_existing_properties() {
        let (mut model, blog, post) = blog_model();
        let (blog_id, _) = model
            .get_or_add_property(post, "BlogId", ValueType::Int32, false, ConfigurationSource::Explicit)
            .unwrap();
        let (other, _) = model
            .get_or_add_property(post, "Other", ValueType::Int32, false, ConfigurationSource::Explicit)
            .unwrap();
        let options = RelationshipOptions::new().foreign_key(&[blog_id]);
        let rel = create_relationship(&mut model, blog, post, &options, ConfigurationSource::Explicit)
            .unwrap();

        let same = rel
            .foreign_key(&mut model, &[other], ConfigurationSource::Convention)
            .unwrap();
        assert_eq!(rel, same);
        assert_eq!(same.metadata(&model).unwrap().properties(), &[blog_id]);
    }
}
