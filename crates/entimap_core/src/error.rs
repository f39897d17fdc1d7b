//! Error types for EntiMap core.

use thiserror::Error;

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur in EntiMap core operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A caller-supplied argument violates a precondition.
    #[error("invalid argument: {message}")]
    InvalidArgument {
        /// Description of the violated precondition.
        message: String,
    },

    /// Operation not permitted in the current metadata or tracking state.
    #[error("invalid operation: {message}")]
    InvalidOperation {
        /// Description of why the operation is invalid.
        message: String,
    },

    /// Entity type is not part of the model.
    #[error("entity type not found: {name}")]
    EntityTypeNotFound {
        /// Name of the entity type.
        name: String,
    },

    /// Property does not exist on the entity type.
    #[error("property '{property}' not found on entity type {entity_type}")]
    PropertyNotFound {
        /// Name of the entity type searched.
        entity_type: String,
        /// Name (or id) of the missing property.
        property: String,
    },

    /// Foreign key does not exist in the model.
    #[error("foreign key not found: {id}")]
    ForeignKeyNotFound {
        /// Raw foreign key id.
        id: u32,
    },

    /// Foreign key and referenced property sequences differ in length.
    #[error("foreign key has {actual} properties but references {expected}")]
    ForeignKeyArityMismatch {
        /// Number of referenced properties.
        expected: usize,
        /// Number of foreign key properties.
        actual: usize,
    },

    /// Value does not match the property's declared type.
    #[error("value of type {actual} cannot be stored in property '{property}' of type {expected}")]
    ValueTypeMismatch {
        /// Property name.
        property: String,
        /// Declared type.
        expected: String,
        /// Type of the supplied value.
        actual: String,
    },
}

impl CoreError {
    /// Creates an invalid argument error.
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Creates an invalid operation error.
    pub fn invalid_operation(message: impl Into<String>) -> Self {
        Self::InvalidOperation {
            message: message.into(),
        }
    }

    /// Creates an entity type not found error.
    pub fn entity_type_not_found(name: impl Into<String>) -> Self {
        Self::EntityTypeNotFound { name: name.into() }
    }

    /// Creates a property not found error.
    pub fn property_not_found(entity_type: impl Into<String>, property: impl Into<String>) -> Self {
        Self::PropertyNotFound {
            entity_type: entity_type.into(),
            property: property.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_context() {
        let err = CoreError::property_not_found("Blog", "Url");
        assert_eq!(
            err.to_string(),
            "property 'Url' not found on entity type Blog"
        );

        let err = CoreError::ForeignKeyArityMismatch {
            expected: 2,
            actual: 1,
        };
        assert_eq!(
            err.to_string(),
            "foreign key has 1 properties but references 2"
        );
    }

    #[test]
    fn helper_constructors() {
        assert!(matches!(
            CoreError::invalid_argument("root"),
            CoreError::InvalidArgument { .. }
        ));
        assert!(matches!(
            CoreError::entity_type_not_found("Post"),
            CoreError::EntityTypeNotFound { name } if name == "Post"
        ));
    }
}
