//! Change tracking.
//!
//! The [`StateManager`] owns one entry per object it has seen, keyed by
//! object identity. [`EntityEntry`] and [`PropertyEntry`] are views into
//! it, and [`EntityEntryGraphIterator`] walks object graphs to register
//! every reachable object.

mod entity;
mod entry;
mod graph;
mod manager;
mod state;

pub use entity::{Entity, EntityRef, NavigationValue, ObjectKey};
pub use entry::{EntityEntry, PropertyEntry};
pub use graph::{EntityEntryGraphIterator, GraphTraversal};
pub use manager::StateManager;
pub use state::EntityState;
