use std::fmt;
use thiserror::Error;

/// Error produced by an external collaborator (connection factory or executor).
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Persistence operation that produced an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Save,
    Insert,
    InsertBatch,
    Update,
    Delete,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Save => "save",
            Self::Insert => "insert",
            Self::InsertBatch => "insert_batch",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug)]
pub enum PersistError {
    #[error("Configuration error for '{entity}': {message}")]
    Configuration { entity: String, message: String },

    #[error("Missing primary key: {operation} on '{entity}' requires a primary key value")]
    MissingPrimaryKey {
        entity: String,
        operation: Operation,
    },

    #[error("Transformation error: {operation} on '{entity}.{property}': {message}")]
    Transformation {
        entity: String,
        operation: Operation,
        property: String,
        message: String,
    },

    #[error("Validation failed: {operation} on '{entity}': {}", .violations.join("; "))]
    Validation {
        entity: String,
        operation: Operation,
        violations: Vec<String>,
    },

    #[error("Execution error: {operation} on '{entity}' failed: {source}")]
    Execution {
        entity: String,
        operation: Operation,
        #[source]
        source: BoxError,
    },

    #[error("Lock error: {0}")]
    Lock(String),
}

impl PersistError {
    pub fn configuration(entity: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Configuration {
            entity: entity.into(),
            message: message.into(),
        }
    }

    pub fn execution(entity: impl Into<String>, operation: Operation, source: anyhow::Error) -> Self {
        Self::Execution {
            entity: entity.into(),
            operation,
            source: source.into(),
        }
    }

    /// Name of the entity type the error refers to, if any.
    pub fn entity(&self) -> Option<&str> {
        match self {
            Self::Configuration { entity, .. }
            | Self::MissingPrimaryKey { entity, .. }
            | Self::Transformation { entity, .. }
            | Self::Validation { entity, .. }
            | Self::Execution { entity, .. } => Some(entity),
            Self::Lock(_) => None,
        }
    }

    pub fn operation(&self) -> Option<Operation> {
        match self {
            Self::MissingPrimaryKey { operation, .. }
            | Self::Transformation { operation, .. }
            | Self::Validation { operation, .. }
            | Self::Execution { operation, .. } => Some(*operation),
            Self::Configuration { .. } | Self::Lock(_) => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, PersistError>;

impl<T> From<std::sync::PoisonError<T>> for PersistError {
    fn from(err: std::sync::PoisonError<T>) -> Self {
        Self::Lock(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_execution_error_keeps_source() {
        let err = PersistError::execution(
            "Order",
            Operation::Update,
            anyhow::anyhow!("unique constraint violated"),
        );

        assert_eq!(err.entity(), Some("Order"));
        assert!(err.to_string().contains("update on 'Order'"));
        let source = std::error::Error::source(&err).unwrap();
        assert_eq!(source.to_string(), "unique constraint violated");
    }

    #[test]
    fn test_validation_message_lists_violations() {
        let err = PersistError::Validation {
            entity: "Order".into(),
            operation: Operation::InsertBatch,
            violations: vec!["total must be positive".into(), "customer required".into()],
        };
        assert_eq!(
            err.to_string(),
            "Validation failed: insert_batch on 'Order': total must be positive; customer required"
        );
    }

    #[test]
    fn test_transformation_message_names_operation() {
        let err = PersistError::Transformation {
            entity: "Order".into(),
            operation: Operation::Update,
            property: "total".into(),
            message: "negative total".into(),
        };
        assert_eq!(
            err.to_string(),
            "Transformation error: update on 'Order.total': negative total"
        );
    }
}
