//! Entity type metadata.

use crate::metadata::{ForeignKey, Key, Navigation, Property};
use crate::types::{ConfigurationSource, EntityTypeId, ForeignKeyId, PropertyId};

/// Metadata for one mapped object type.
///
/// Properties, foreign keys and navigations keep their declaration order;
/// that order is what graph traversal and foreign key matching observe.
#[derive(Debug, Clone)]
pub struct EntityType {
    id: EntityTypeId,
    name: String,
    simple_name: String,
    source: ConfigurationSource,
    pub(crate) properties: Vec<Property>,
    pub(crate) primary_key: Option<Key>,
    pub(crate) alternate_keys: Vec<Key>,
    pub(crate) foreign_keys: Vec<ForeignKey>,
    pub(crate) navigations: Vec<Navigation>,
}

impl EntityType {
    pub(crate) fn new(id: EntityTypeId, name: String, source: ConfigurationSource) -> Self {
        let simple_name = simple_name_of(&name).to_string();
        Self {
            id,
            name,
            simple_name,
            source,
            properties: Vec::new(),
            primary_key: None,
            alternate_keys: Vec::new(),
            foreign_keys: Vec::new(),
            navigations: Vec::new(),
        }
    }

    /// Returns the entity type ID.
    #[must_use]
    pub fn id(&self) -> EntityTypeId {
        self.id
    }

    /// Returns the full type name, the identity of the entity type.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the unqualified type name (`Blog` for `app::model::Blog`).
    #[must_use]
    pub fn simple_name(&self) -> &str {
        &self.simple_name
    }

    /// Returns how the entity type was configured.
    #[must_use]
    pub fn configuration_source(&self) -> ConfigurationSource {
        self.source
    }

    /// Returns the properties in declaration order.
    #[must_use]
    pub fn properties(&self) -> &[Property] {
        &self.properties
    }

    /// Looks up a property by ID.
    #[must_use]
    pub fn property(&self, id: PropertyId) -> Option<&Property> {
        self.properties.iter().find(|p| p.id() == id)
    }

    /// Looks up a property by exact name.
    #[must_use]
    pub fn find_property(&self, name: &str) -> Option<&Property> {
        self.properties.iter().find(|p| p.name() == name)
    }

    /// Looks up a property with a backing field by name, ignoring ASCII case.
    ///
    /// An exact match is preferred over a case-insensitive one.
    #[must_use]
    pub fn find_clr_property_ignore_case(&self, name: &str) -> Option<&Property> {
        let mut clr = self.properties.iter().filter(|p| !p.is_shadow());
        clr.clone()
            .find(|p| p.name() == name)
            .or_else(|| clr.find(|p| p.name().eq_ignore_ascii_case(name)))
    }

    /// Returns the primary key, if one is configured.
    #[must_use]
    pub fn primary_key(&self) -> Option<&Key> {
        self.primary_key.as_ref()
    }

    /// Returns the alternate keys.
    #[must_use]
    pub fn alternate_keys(&self) -> &[Key] {
        &self.alternate_keys
    }

    /// Returns every key, primary first.
    pub fn keys(&self) -> impl Iterator<Item = &Key> {
        self.primary_key.iter().chain(self.alternate_keys.iter())
    }

    /// Returns true if the property takes part in any key.
    #[must_use]
    pub fn is_key_property(&self, property: PropertyId) -> bool {
        self.keys().any(|key| key.contains(property))
    }

    /// Returns the foreign keys declared on this (dependent) type.
    #[must_use]
    pub fn foreign_keys(&self) -> &[ForeignKey] {
        &self.foreign_keys
    }

    /// Looks up a foreign key by ID.
    #[must_use]
    pub fn foreign_key(&self, id: ForeignKeyId) -> Option<&ForeignKey> {
        self.foreign_keys.iter().find(|fk| fk.id() == id)
    }

    /// Returns the foreign keys that use the property.
    pub fn foreign_keys_containing(
        &self,
        property: PropertyId,
    ) -> impl Iterator<Item = &ForeignKey> {
        self.foreign_keys
            .iter()
            .filter(move |fk| fk.properties().contains(&property))
    }

    /// Returns the navigations in declaration order.
    #[must_use]
    pub fn navigations(&self) -> &[Navigation] {
        &self.navigations
    }

    /// Looks up a navigation by name.
    #[must_use]
    pub fn find_navigation(&self, name: &str) -> Option<&Navigation> {
        self.navigations.iter().find(|n| n.name() == name)
    }

    /// Returns the navigation on this type that points to the principal of
    /// the given foreign key.
    #[must_use]
    pub fn navigation_to_principal(&self, foreign_key: ForeignKeyId) -> Option<&Navigation> {
        self.navigations
            .iter()
            .find(|n| n.foreign_key() == foreign_key && n.points_to_principal())
    }

    pub(crate) fn property_mut(&mut self, id: PropertyId) -> Option<&mut Property> {
        self.properties.iter_mut().find(|p| p.id() == id)
    }

    pub(crate) fn foreign_key_mut(&mut self, id: ForeignKeyId) -> Option<&mut ForeignKey> {
        self.foreign_keys.iter_mut().find(|fk| fk.id() == id)
    }

    pub(crate) fn update_source(&mut self, source: ConfigurationSource) {
        self.source = self.source.max(source);
    }
}

/// Strips module path and generic arguments from a type name.
pub(crate) fn simple_name_of(name: &str) -> &str {
    let base = name.split('<').next().unwrap_or(name);
    base.rsplit("::").next().unwrap_or(base)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::ValueType;

    #[test]
    fn simple_name_strips_path_and_generics() {
        assert_eq!(simple_name_of("app::model::Blog"), "Blog");
        assert_eq!(simple_name_of("Blog"), "Blog");
        assert_eq!(simple_name_of("app::Wrapper<app::Inner>"), "Wrapper");
    }

    #[test]
    fn case_insensitive_lookup_prefers_exact_and_skips_shadow() {
        let mut et = EntityType::new(
            EntityTypeId::new(0),
            "Post".into(),
            ConfigurationSource::Explicit,
        );
        et.properties.push(Property::new(
            PropertyId::new(0),
            "blogid".into(),
            ValueType::Int32,
            false,
            ConfigurationSource::Convention,
        ));
        et.properties.push(Property::new(
            PropertyId::new(1),
            "BlogId".into(),
            ValueType::Int32,
            false,
            ConfigurationSource::Convention,
        ));
        et.properties.push(Property::new(
            PropertyId::new(2),
            "AuthorId".into(),
            ValueType::Int32,
            true,
            ConfigurationSource::Convention,
        ));

        let found = et.find_clr_property_ignore_case("BlogId").unwrap();
        assert_eq!(found.id(), PropertyId::new(1));
        let found = et.find_clr_property_ignore_case("BLOGID").unwrap();
        assert_eq!(found.id(), PropertyId::new(0));
        assert!(et.find_clr_property_ignore_case("AuthorId").is_none());
        assert!(et.find_property("AuthorId").is_some());
    }
}
