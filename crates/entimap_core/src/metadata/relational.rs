//! Relational naming for foreign keys.

use crate::metadata::{EntityType, ForeignKey, Model};

/// Relational view of a foreign key.
///
/// Exposes the constraint name a relational store would use: the name
/// configured through [`Model::set_foreign_key_name`], or a generated
/// `FK_<Dependent>_<Principal>_<Property>...` default.
#[derive(Debug, Clone, Copy)]
pub struct RelationalForeignKey<'a> {
    model: &'a Model,
    foreign_key: &'a ForeignKey,
}

impl<'a> RelationalForeignKey<'a> {
    /// Creates a relational view over a foreign key of `model`.
    #[must_use]
    pub fn new(model: &'a Model, foreign_key: &'a ForeignKey) -> Self {
        Self { model, foreign_key }
    }

    /// Returns the constraint name.
    #[must_use]
    pub fn name(&self) -> String {
        match self.foreign_key.relational_name() {
            Some(name) => name.to_string(),
            None => self.default_name(),
        }
    }

    /// Returns the generated constraint name, ignoring any configured one.
    #[must_use]
    pub fn default_name(&self) -> String {
        let dependent = self
            .model
            .entity_type(self.foreign_key.dependent())
            .map_or("?", EntityType::simple_name);
        let principal = self
            .model
            .entity_type(self.foreign_key.principal())
            .map_or("?", EntityType::simple_name);

        let mut name = format!("FK_{dependent}_{principal}");
        for id in self.foreign_key.properties() {
            name.push('_');
            name.push_str(self.model.property(*id).map_or("?", |p| p.name()));
        }
        name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ConfigurationSource;
    use crate::value::ValueType;

    #[test]
    fn default_and_configured_names() {
        let mut model = Model::new();
        let source = ConfigurationSource::Explicit;
        let (blog, _) = model.get_or_add_entity_type("app::Blog", source).unwrap();
        let (post, _) = model.get_or_add_entity_type("app::Post", source).unwrap();
        let (blog_id, _) = model
            .get_or_add_property(blog, "Id", ValueType::Int32, false, source)
            .unwrap();
        model.set_primary_key(blog, &[blog_id], source).unwrap();
        let (post_blog_id, _) = model
            .get_or_add_property(post, "BlogId", ValueType::Int32, false, source)
            .unwrap();
        let fk = model
            .add_foreign_key(post, blog, &[post_blog_id], &[blog_id], false, source, source)
            .unwrap();

        let view = RelationalForeignKey::new(&model, model.foreign_key(fk).unwrap());
        assert_eq!(view.name(), "FK_Post_Blog_BlogId");

        model.set_foreign_key_name(fk, Some("FK_Posts_Blogs")).unwrap();
        let view = RelationalForeignKey::new(&model, model.foreign_key(fk).unwrap());
        assert_eq!(view.name(), "FK_Posts_Blogs");
        assert_eq!(view.default_name(), "FK_Post_Blog_BlogId");
    }
}
