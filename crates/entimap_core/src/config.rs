//! Model building configuration.

/// Configuration for building a model.
///
/// Controls which conventions the default [`ConventionSet`] installs.
///
/// [`ConventionSet`]: crate::conventions::ConventionSet
#[derive(Debug, Clone)]
pub struct Config {
    /// Whether entity types without a primary key get one from a property
    /// named `Id` or `<TypeName>Id`.
    pub key_discovery: bool,

    /// Whether relationships declared without foreign key properties get
    /// them inferred from naming conventions.
    pub foreign_key_discovery: bool,

    /// Whether foreign key discovery re-runs for convention-configured
    /// relationships when a property is added to their dependent type.
    pub rediscover_on_property_added: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            key_discovery: true,
            foreign_key_discovery: true,
            rediscover_on_property_added: true,
        }
    }
}

impl Config {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a configuration with every convention disabled.
    #[must_use]
    pub const fn without_conventions() -> Self {
        Self {
            key_discovery: false,
            foreign_key_discovery: false,
            rediscover_on_property_added: false,
        }
    }

    /// Sets whether primary keys are discovered by convention.
    #[must_use]
    pub const fn key_discovery(mut self, value: bool) -> Self {
        self.key_discovery = value;
        self
    }

    /// Sets whether foreign key properties are discovered by convention.
    #[must_use]
    pub const fn foreign_key_discovery(mut self, value: bool) -> Self {
        self.foreign_key_discovery = value;
        self
    }

    /// Sets whether foreign key discovery re-runs when properties are added.
    #[must_use]
    pub const fn rediscover_on_property_added(mut self, value: bool) -> Self {
        self.rediscover_on_property_added = value;
        self
    }
}
