//! Error types for query composition
//!
//! Every failure here is a caller configuration error: it is surfaced
//! synchronously at the call that triggered it and is never retried.

use thiserror::Error;

/// Result type alias for query composition operations
pub type QueryResult<T> = Result<T, QueryError>;

/// Errors raised while composing a query
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    /// Entity type or property is absent from the metadata cache
    #[error("not mapped: {0}")]
    NotMapped(String),

    /// An explicitly requested table alias is already taken
    #[error("alias collision: '{0}' is already in use")]
    AliasCollision(String),

    /// A capability intentionally not implemented by this builder family
    #[error("unsupported operation: {0}")]
    UnsupportedOperation(String),
}

impl QueryError {
    /// Shorthand for a missing property on a known entity
    pub fn unmapped_property(entity: &str, property: &str) -> Self {
        QueryError::NotMapped(format!(
            "entity '{}' has no column mapped for property '{}'",
            entity, property
        ))
    }

    /// Shorthand for an entity type the cache has never seen
    pub fn unmapped_entity(entity: &str) -> Self {
        QueryError::NotMapped(format!(
            "entity '{}' is not registered in the metadata cache",
            entity
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_messages_name_the_failure() {
        let err = QueryError::unmapped_property("User", "dept_id");
        assert!(err.to_string().contains("User"));
        assert!(err.to_string().contains("dept_id"));

        let err = QueryError::AliasCollision("su".to_string());
        assert_eq!(err.to_string(), "alias collision: 'su' is already in use");

        let err = QueryError::UnsupportedOperation("first_sql".to_string());
        assert!(err.to_string().starts_with("unsupported operation"));
    }
}
