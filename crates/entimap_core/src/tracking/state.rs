//! Entity tracking states.

use std::fmt;

/// Tracking state of an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum EntityState {
    /// Known to the state manager but not yet tracked.
    #[default]
    Unknown,
    /// New; will be inserted.
    Added,
    /// Tracked with changes; will be updated.
    Modified,
    /// Tracked without changes.
    Unchanged,
    /// Will be deleted.
    Deleted,
}

impl EntityState {
    /// Returns true for any state other than [`EntityState::Unknown`].
    #[must_use]
    pub const fn is_tracked(self) -> bool {
        !matches!(self, Self::Unknown)
    }

    /// Returns the state name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::Added => "added",
            Self::Modified => "modified",
            Self::Unchanged => "unchanged",
            Self::Deleted => "deleted",
        }
    }
}

impl fmt::Display for EntityState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
