//! Model building.
//!
//! [`ModelBuilder`] is the entry point: it mutates a [`Model`] and fires the
//! installed conventions. [`RelationshipBuilder`] is a handle that
//! conventions receive and return.
//!
//! [`Model`]: crate::metadata::Model

mod model_builder;
mod relationship;

pub use model_builder::ModelBuilder;
pub use relationship::{create_shadow_foreign_key_properties, RelationshipBuilder, RelationshipOptions};
