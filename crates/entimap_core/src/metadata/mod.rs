//! Relational metadata.
//!
//! The model is a mutable graph of:
//! - **Entity types**, identified by type name
//! - **Properties**, ordered, possibly shadow
//! - **Keys**, one primary and any number of alternate keys per type
//! - **Foreign keys**, declared on the dependent type
//! - **Navigations**, riding on foreign keys

mod entity_type;
mod foreign_key;
mod key;
mod model;
mod navigation;
mod property;
mod relational;

pub use entity_type::EntityType;
pub use foreign_key::ForeignKey;
pub use key::Key;
pub use model::Model;
pub use navigation::{Navigation, NavigationKind};
pub use property::Property;
pub use relational::RelationalForeignKey;
