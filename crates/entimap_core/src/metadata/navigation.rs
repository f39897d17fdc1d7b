//! Navigation metadata.

use crate::types::{EntityTypeId, ForeignKeyId};

/// Whether a navigation holds one related entity or many.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NavigationKind {
    /// Single-valued reference.
    Reference,
    /// Collection of related entities.
    Collection,
}

/// A named reference from one entity type to a related entity type.
///
/// Navigations ride on a foreign key. The one declared on the dependent
/// points at the principal and is always a reference; the one declared on
/// the principal is a collection unless the foreign key is unique.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Navigation {
    name: String,
    declaring_type: EntityTypeId,
    target_type: EntityTypeId,
    foreign_key: ForeignKeyId,
    points_to_principal: bool,
    kind: NavigationKind,
}

impl Navigation {
    pub(crate) fn new(
        name: String,
        declaring_type: EntityTypeId,
        target_type: EntityTypeId,
        foreign_key: ForeignKeyId,
        points_to_principal: bool,
        unique: bool,
    ) -> Self {
        Self {
            name,
            declaring_type,
            target_type,
            foreign_key,
            points_to_principal,
            kind: Self::kind_for(points_to_principal, unique),
        }
    }

    fn kind_for(points_to_principal: bool, unique: bool) -> NavigationKind {
        if points_to_principal || unique {
            NavigationKind::Reference
        } else {
            NavigationKind::Collection
        }
    }

    /// Returns the navigation name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the entity type declaring this navigation.
    #[must_use]
    pub fn declaring_type(&self) -> EntityTypeId {
        self.declaring_type
    }

    /// Returns the entity type on the other end.
    #[must_use]
    pub fn target_type(&self) -> EntityTypeId {
        self.target_type
    }

    /// Returns the foreign key the navigation is defined over.
    #[must_use]
    pub fn foreign_key(&self) -> ForeignKeyId {
        self.foreign_key
    }

    /// Returns true if the navigation goes from dependent to principal.
    #[must_use]
    pub fn points_to_principal(&self) -> bool {
        self.points_to_principal
    }

    /// Returns whether the navigation is single- or collection-valued.
    #[must_use]
    pub fn kind(&self) -> NavigationKind {
        self.kind
    }

    /// Returns true if the navigation is collection-valued.
    #[must_use]
    pub fn is_collection(&self) -> bool {
        self.kind == NavigationKind::Collection
    }

    pub(crate) fn retarget(&mut self, foreign_key: ForeignKeyId, unique: bool) {
        self.foreign_key = foreign_key;
        self.kind = Self::kind_for(self.points_to_principal, unique);
    }
}
