//! # EntiMap Testkit
//!
//! Test utilities for EntiMap.
//!
//! This crate provides:
//! - A dynamic [`TestEntity`] whose navigations can be rewired at runtime
//! - Ready-made models and contexts for tracking tests
//! - Property-based generators for cyclic object graphs and name variants
//!
//! ## Usage
//!
//! ```rust
//! use entimap_testkit::prelude::*;
//! use entimap_core::EntityState;
//!
//! with_node_context(|context| {
//!     let root = TestEntity::node("root");
//!     let child = TestEntity::node("child");
//!     link_child(&root, &child);
//!
//!     context.add(&root.to_entity_ref()).unwrap();
//!     assert_eq!(
//!         context.entry(&child.to_entity_ref()).unwrap().state(),
//!         EntityState::Added
//!     );
//!     root.clear_navigations();
//!     child.clear_navigations();
//! });
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod fixtures;
pub mod generators;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::fixtures::*;
    pub use crate::generators::*;
}

pub use fixtures::*;
pub use generators::*;
