//! Object access for tracked entities.

use crate::value::Value;
use std::fmt;
use std::sync::Arc;

/// Shared reference to a tracked object.
pub type EntityRef = Arc<dyn Entity>;

/// Accessor capability that tracked objects implement.
///
/// The tracker never inspects objects directly: it asks them for their
/// entity type name, for the current value of a navigation, and for the
/// current value of a property with a backing field.
///
/// # Example
///
/// ```rust
/// use entimap_core::{Entity, NavigationValue, Value};
///
/// struct Tag {
///     label: String,
/// }
///
/// impl Entity for Tag {
///     fn entity_type_name(&self) -> &str {
///         "Tag"
///     }
///
///     fn navigation(&self, _name: &str) -> NavigationValue {
///         NavigationValue::Null
///     }
///
///     fn property(&self, name: &str) -> Option<Value> {
///         (name == "Label").then(|| Value::from(self.label.as_str()))
///     }
/// }
/// ```
pub trait Entity: Send + Sync + 'static {
    /// Returns the name of the entity type this object maps to.
    ///
    /// Defaults to the Rust type name, matching
    /// [`ModelBuilder::entity`](crate::ModelBuilder::entity).
    fn entity_type_name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// Returns the current value of a navigation.
    fn navigation(&self, name: &str) -> NavigationValue;

    /// Returns the current value of a property, or `None` if the object
    /// has no such field.
    fn property(&self, name: &str) -> Option<Value> {
        let _ = name;
        None
    }
}

/// Current value of a navigation on an object.
#[derive(Clone, Default)]
pub enum NavigationValue {
    /// No related object.
    #[default]
    Null,
    /// A single related object.
    Reference(EntityRef),
    /// Related objects in enumeration order.
    Collection(Vec<EntityRef>),
}

impl NavigationValue {
    /// Returns true if there is no related object.
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns the related objects in enumeration order.
    #[must_use]
    pub fn into_vec(self) -> Vec<EntityRef> {
        match self {
            Self::Null => Vec::new(),
            Self::Reference(entity) => vec![entity],
            Self::Collection(entities) => entities,
        }
    }
}

impl fmt::Debug for NavigationValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("Null"),
            Self::Reference(entity) => write!(f, "Reference({})", entity.entity_type_name()),
            Self::Collection(entities) => write!(f, "Collection(len={})", entities.len()),
        }
    }
}

impl From<EntityRef> for NavigationValue {
    fn from(entity: EntityRef) -> Self {
        Self::Reference(entity)
    }
}

impl From<Option<EntityRef>> for NavigationValue {
    fn from(entity: Option<EntityRef>) -> Self {
        entity.map_or(Self::Null, Self::Reference)
    }
}

impl From<Vec<EntityRef>> for NavigationValue {
    fn from(entities: Vec<EntityRef>) -> Self {
        Self::Collection(entities)
    }
}

/// Identity of a tracked object: the address of its shared allocation.
///
/// Entries hold a strong reference to their object, so the address cannot
/// be reused while the object is tracked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObjectKey(usize);

impl ObjectKey {
    /// Returns the identity of the referenced object.
    #[must_use]
    pub fn of(entity: &EntityRef) -> Self {
        Self(Arc::as_ptr(entity).cast::<()>() as usize)
    }
}
