//! Core type definitions for EntiMap.

use std::fmt;

/// Identifier for an entity type within a model.
///
/// Entity types are never removed, so an id stays valid for the lifetime
/// of the model that issued it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EntityTypeId(pub u32);

impl EntityTypeId {
    /// Creates a new entity type ID.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Returns the raw ID value.
    #[must_use]
    pub const fn as_u32(self) -> u32 {
        self.0
    }

    pub(crate) const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for EntityTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "type:{}", self.0)
    }
}

/// Identifier for a property.
///
/// Property ids are unique across the whole model and never reused, even
/// after the property they named has been removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PropertyId(pub u32);

impl PropertyId {
    /// Creates a new property ID.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Returns the raw ID value.
    #[must_use]
    pub const fn as_u32(self) -> u32 {
        self.0
    }
}

impl fmt::Display for PropertyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "prop:{}", self.0)
    }
}

/// Identifier for a foreign key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ForeignKeyId(pub u32);

impl ForeignKeyId {
    /// Creates a new foreign key ID.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Returns the raw ID value.
    #[must_use]
    pub const fn as_u32(self) -> u32 {
        self.0
    }
}

impl fmt::Display for ForeignKeyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "fk:{}", self.0)
    }
}

/// How authoritatively a piece of metadata was configured.
///
/// Sources are totally ordered: `Convention < DataAnnotation < Explicit`.
/// A configuration may only be replaced by one of equal or higher rank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ConfigurationSource {
    /// Inferred by a convention.
    Convention,
    /// Declared by an attribute-like annotation on the type.
    DataAnnotation,
    /// Configured directly by the user.
    Explicit,
}

impl ConfigurationSource {
    /// Returns true if a configuration from `self` may replace one from `other`.
    #[must_use]
    pub fn overrides(self, other: Self) -> bool {
        self >= other
    }

    /// Returns the stronger of two sources.
    #[must_use]
    pub fn max(self, other: Self) -> Self {
        Ord::max(self, other)
    }

    /// Returns the lowercase name of the source.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Convention => "convention",
            Self::DataAnnotation => "data-annotation",
            Self::Explicit => "explicit",
        }
    }
}

impl fmt::Display for ConfigurationSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configuration_source_ordering() {
        assert!(ConfigurationSource::Explicit > ConfigurationSource::DataAnnotation);
        assert!(ConfigurationSource::DataAnnotation > ConfigurationSource::Convention);
    }

    #[test]
    fn overrides_is_reflexive() {
        assert!(ConfigurationSource::Convention.overrides(ConfigurationSource::Convention));
        assert!(ConfigurationSource::Explicit.overrides(ConfigurationSource::Convention));
        assert!(!ConfigurationSource::Convention.overrides(ConfigurationSource::Explicit));
    }

    #[test]
    fn max_picks_stronger() {
        assert_eq!(
            ConfigurationSource::Convention.max(ConfigurationSource::DataAnnotation),
            ConfigurationSource::DataAnnotation
        );
    }

    #[test]
    fn id_display() {
        assert_eq!(format!("{}", EntityTypeId::new(3)), "type:3");
        assert_eq!(format!("{}", PropertyId::new(7)), "prop:7");
        assert_eq!(format!("{}", ForeignKeyId::new(1)), "fk:1");
    }
}
