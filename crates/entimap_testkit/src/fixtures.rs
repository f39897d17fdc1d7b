//! Test fixtures and tracking helpers.
//!
//! Provides a dynamic entity type and small models that tests can track
//! graphs against without declaring their own Rust types.

use entimap_core::{
    ConfigurationSource, Context, Entity, EntityRef, EntityState, Model, ModelBuilder,
    NavigationValue, RelationshipOptions, StateManager, Value, ValueType,
};
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Entity type name used by [`node_model`].
pub const NODE: &str = "Node";

/// An object whose navigations and property values are set at runtime.
///
/// Reference navigations take precedence over collections of the same
/// name. Call [`TestEntity::clear_navigations`] when a test is done with
/// a cyclic graph, otherwise the cycle keeps the objects alive.
pub struct TestEntity {
    type_name: String,
    label: String,
    references: RwLock<BTreeMap<String, EntityRef>>,
    collections: RwLock<BTreeMap<String, Vec<EntityRef>>>,
    properties: RwLock<BTreeMap<String, Value>>,
}

impl TestEntity {
    /// Creates an object of the given entity type.
    pub fn new(type_name: impl Into<String>, label: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            type_name: type_name.into(),
            label: label.into(),
            references: RwLock::new(BTreeMap::new()),
            collections: RwLock::new(BTreeMap::new()),
            properties: RwLock::new(BTreeMap::new()),
        })
    }

    /// Creates an object of type [`NODE`].
    pub fn node(label: impl Into<String>) -> Arc<Self> {
        Self::new(NODE, label)
    }

    /// Returns the label given at construction.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Returns a type-erased handle to this object.
    pub fn to_entity_ref(self: &Arc<Self>) -> EntityRef {
        self.clone()
    }

    /// Sets or clears a reference navigation.
    pub fn set_reference(&self, navigation: &str, target: Option<EntityRef>) {
        let mut references = self.references.write();
        match target {
            Some(target) => {
                references.insert(navigation.to_string(), target);
            }
            None => {
                references.remove(navigation);
            }
        }
    }

    /// Appends an object to a collection navigation.
    pub fn push(&self, navigation: &str, target: EntityRef) {
        self.collections
            .write()
            .entry(navigation.to_string())
            .or_default()
            .push(target);
    }

    /// Sets the value returned for a property with a backing field.
    pub fn set_property(&self, name: &str, value: impl Into<Value>) {
        self.properties.write().insert(name.to_string(), value.into());
    }

    /// Drops every outgoing navigation.
    pub fn clear_navigations(&self) {
        self.references.write().clear();
        self.collections.write().clear();
    }
}

impl Entity for TestEntity {
    fn entity_type_name(&self) -> &str {
        &self.type_name
    }

    fn navigation(&self, name: &str) -> NavigationValue {
        if let Some(target) = self.references.read().get(name) {
            return NavigationValue::Reference(target.clone());
        }
        self.collections
            .read()
            .get(name)
            .map_or(NavigationValue::Null, |items| {
                NavigationValue::Collection(items.clone())
            })
    }

    fn property(&self, name: &str) -> Option<Value> {
        self.properties.read().get(name).cloned()
    }
}

impl std::fmt::Debug for TestEntity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TestEntity")
            .field("type_name", &self.type_name)
            .field("label", &self.label)
            .finish_non_exhaustive()
    }
}

/// Makes `child` a member of `parent.Children` and points `child.Parent`
/// back at `parent`.
pub fn link_child(parent: &Arc<TestEntity>, child: &Arc<TestEntity>) {
    child.set_reference("Parent", Some(parent.to_entity_ref()));
    parent.push("Children", child.to_entity_ref());
}

/// Builds a model with a single self-referencing `Node` type.
///
/// `Node` has an `Id` key, a `Parent`/`Children` relationship and a
/// `Friend` reference without an inverse.
pub fn node_model() -> Model {
    let source = ConfigurationSource::Explicit;
    let mut builder = ModelBuilder::new();
    let node = builder
        .entity_named(NODE, source)
        .expect("Failed to add Node");
    builder
        .property(node, "Id", ValueType::Int32, source)
        .expect("Failed to add Node.Id");
    builder
        .relationship(
            node,
            node,
            RelationshipOptions::new()
                .navigation_to_principal("Parent")
                .navigation_to_dependent("Children"),
            source,
        )
        .expect("Failed to add Parent/Children");
    builder
        .relationship(
            node,
            node,
            RelationshipOptions::new().navigation_to_principal("Friend"),
            source,
        )
        .expect("Failed to add Friend");
    builder.build()
}

/// Builds a `Blog`/`Post` model where `Post.BlogId` is found by convention.
pub fn blog_model() -> Model {
    let source = ConfigurationSource::Explicit;
    let mut builder = ModelBuilder::new();
    let blog = builder
        .entity_named("Blog", source)
        .expect("Failed to add Blog");
    builder
        .property(blog, "Id", ValueType::Int32, source)
        .expect("Failed to add Blog.Id");
    builder
        .property(blog, "Title", ValueType::String, source)
        .expect("Failed to add Blog.Title");
    let post = builder
        .entity_named("Post", source)
        .expect("Failed to add Post");
    builder
        .property(post, "Id", ValueType::Int32, source)
        .expect("Failed to add Post.Id");
    builder
        .property(post, "BlogId", ValueType::Int32, source)
        .expect("Failed to add Post.BlogId");
    builder
        .relationship(
            blog,
            post,
            RelationshipOptions::new()
                .navigation_to_principal("Blog")
                .navigation_to_dependent("Posts"),
            source,
        )
        .expect("Failed to add Blog/Posts");
    builder.build()
}

/// Runs a test with a fresh context over [`node_model`].
pub fn with_node_context<F, R>(f: F) -> R
where
    F: FnOnce(&Context) -> R,
{
    let context = Context::new(node_model());
    f(&context)
}

/// Runs a test with a fresh state manager over `model`.
pub fn with_state_manager<F, R>(model: Model, f: F) -> R
where
    F: FnOnce(&StateManager) -> R,
{
    let manager = StateManager::new(Arc::new(model));
    f(&manager)
}

/// Asserts that every object is tracked in `state`.
///
/// # Panics
///
/// Panics with the offending label if an object is in another state.
pub fn assert_all_in_state(context: &Context, objects: &[Arc<TestEntity>], state: EntityState) {
    for object in objects {
        let actual = context
            .entry(&object.to_entity_ref())
            .expect("Object type is not part of the model")
            .state();
        assert_eq!(actual, state, "unexpected state for '{}'", object.label());
    }
}

/// Test scenario helpers.
pub mod scenarios {
    use super::*;

    /// A blog with `post_count` posts, each pointing back at the blog.
    pub fn blog_with_posts(post_count: usize) -> (Arc<TestEntity>, Vec<Arc<TestEntity>>) {
        let blog = TestEntity::new("Blog", "blog");
        blog.set_property("Id", 1);
        let posts: Vec<_> = (0..post_count)
            .map(|i| {
                let post = TestEntity::new("Post", format!("post-{i}"));
                post.set_property("Id", i as i32 + 1);
                post.set_property("BlogId", 1);
                post.set_reference("Blog", Some(blog.to_entity_ref()));
                blog.push("Posts", post.to_entity_ref());
                post
            })
            .collect();
        (blog, posts)
    }

    /// A balanced tree of `Node`s with the given fan-out and depth.
    ///
    /// The root is the first element; the rest follow in pre-order.
    pub fn node_tree(fan_out: usize, depth: usize) -> Vec<Arc<TestEntity>> {
        fn grow(parent: &Arc<TestEntity>, fan_out: usize, depth: usize, out: &mut Vec<Arc<TestEntity>>) {
            if depth == 0 {
                return;
            }
            for i in 0..fan_out {
                let child = TestEntity::node(format!("{}.{i}", parent.label()));
                link_child(parent, &child);
                out.push(child.clone());
                grow(&child, fan_out, depth - 1, out);
            }
        }

        let root = TestEntity::node("0");
        let mut nodes = vec![root.clone()];
        grow(&root, fan_out, depth, &mut nodes);
        nodes
    }

    /// Drops the navigations of every object so cycles can be freed.
    pub fn release(objects: &[Arc<TestEntity>]) {
        for object in objects {
            object.clear_navigations();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_overrides_collection() {
        let a = TestEntity::node("a");
        let b = TestEntity::node("b");
        a.push("Parent", b.to_entity_ref());
        a.set_reference("Parent", Some(b.to_entity_ref()));
        assert!(matches!(a.navigation("Parent"), NavigationValue::Reference(_)));

        a.set_reference("Parent", None);
        assert!(matches!(a.navigation("Parent"), NavigationValue::Collection(_)));
        assert!(a.navigation("Unknown").is_null());
    }

    #[test]
    fn test_node_model_shape() {
        let model = node_model();
        let node = model.find_entity_type(NODE).unwrap();
        assert!(node.primary_key().is_some());
        assert_eq!(node.navigations().len(), 3);
        assert_eq!(node.foreign_keys().len(), 2);
    }

    #[test]
    fn test_blog_model_discovers_blog_id() {
        let model = blog_model();
        let post = model.find_entity_type("Post").unwrap();
        let blog_id = post.find_property("BlogId").unwrap().id();
        assert_eq!(post.foreign_keys()[0].properties(), &[blog_id]);
    }

    #[test]
    fn test_attach_blog_scenario() {
        let context = Context::new(blog_model());
        let (blog, posts) = scenarios::blog_with_posts(3);
        context.attach(&blog.to_entity_ref()).unwrap();
        assert_all_in_state(&context, &posts, EntityState::Unchanged);
        scenarios::release(&posts);
        scenarios::release(&[blog]);
    }

    #[test]
    fn test_node_tree_size() {
        let nodes = scenarios::node_tree(2, 3);
        assert_eq!(nodes.len(), 1 + 2 + 4 + 8);
        scenarios::release(&nodes);
    }
}
