//! # EntiMap Core
//!
//! Metadata model, model-building conventions and change tracking for
//! EntiMap.
//!
//! This crate provides:
//! - A mutable metadata model of entity types, properties, keys, foreign
//!   keys and navigations, with configuration-source precedence
//! - Conventions that discover primary keys and foreign key properties
//! - A state manager that tracks objects by identity
//! - A graph iterator that walks object graphs through navigations
//! - A thin context facade (`add`, `attach`, `update`, `remove`)
//!
//! ## Usage
//!
//! ```rust
//! use entimap_core::{
//!     ConfigurationSource, Context, Entity, EntityRef, EntityState, ModelBuilder,
//!     NavigationValue, RelationshipOptions, ValueType,
//! };
//! use std::sync::Arc;
//!
//! struct Blog {
//!     posts: Vec<EntityRef>,
//! }
//! struct Post;
//!
//! impl Entity for Blog {
//!     fn entity_type_name(&self) -> &str {
//!         "Blog"
//!     }
//!     fn navigation(&self, name: &str) -> NavigationValue {
//!         match name {
//!             "Posts" => NavigationValue::Collection(self.posts.clone()),
//!             _ => NavigationValue::Null,
//!         }
//!     }
//! }
//!
//! impl Entity for Post {
//!     fn entity_type_name(&self) -> &str {
//!         "Post"
//!     }
//!     fn navigation(&self, _name: &str) -> NavigationValue {
//!         NavigationValue::Null
//!     }
//! }
//!
//! let source = ConfigurationSource::Explicit;
//! let mut builder = ModelBuilder::new();
//! let blog = builder.entity_named("Blog", source)?;
//! builder.property(blog, "Id", ValueType::Int32, source)?;
//! let post = builder.entity_named("Post", source)?;
//! builder.property(post, "Id", ValueType::Int32, source)?;
//! builder.relationship(
//!     blog,
//!     post,
//!     RelationshipOptions::new().navigation_to_dependent("Posts"),
//!     source,
//! )?;
//!
//! let context = Context::new(builder.build());
//! let post: EntityRef = Arc::new(Post);
//! let blog: EntityRef = Arc::new(Blog { posts: vec![post.clone()] });
//! context.add(&blog)?;
//! assert_eq!(context.entry(&post)?.state(), EntityState::Added);
//! # Ok::<(), entimap_core::CoreError>(())
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod builder;
mod config;
mod context;
pub mod conventions;
mod error;
pub mod metadata;
pub mod tracking;
mod types;
mod value;

pub use builder::{ModelBuilder, RelationshipBuilder, RelationshipOptions};
pub use config::Config;
pub use context::{Context, Set};
pub use conventions::{
    ConventionSet, EntityTypeConvention, ForeignKeyPropertyDiscoveryConvention,
    KeyDiscoveryConvention, PropertyConvention, RelationshipConvention,
};
pub use error::{CoreError, CoreResult};
pub use metadata::{
    EntityType, ForeignKey, Key, Model, Navigation, NavigationKind, Property, RelationalForeignKey,
};
pub use tracking::{
    Entity, EntityEntry, EntityEntryGraphIterator, EntityRef, EntityState, GraphTraversal,
    NavigationValue, ObjectKey, PropertyEntry, StateManager,
};
pub use types::{ConfigurationSource, EntityTypeId, ForeignKeyId, PropertyId};
pub use value::{Value, ValueType};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
