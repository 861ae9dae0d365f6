use thiserror::Error;

use super::user::{Field, FieldError, Reason, ValidationErrors};

/// Core domain errors
#[derive(Debug, Error)]
pub enum DomainError {
    /// One or more user-supplied fields violate their constraints
    #[error("Validation failed: {0}")]
    Validation(ValidationErrors),

    /// A structurally disallowed action, such as following oneself
    #[error("Invalid operation: {message}")]
    InvalidOperation { message: String },

    #[error("Not found: {message}")]
    NotFound { message: String },

    /// Persistence-layer fault: connectivity, unexpected constraint failures
    #[error("Storage error: {message}")]
    Storage { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl DomainError {
    pub fn validation(errors: ValidationErrors) -> Self {
        Self::Validation(errors)
    }

    /// Single-field validation failure
    pub fn invalid_field(field: Field, reason: Reason) -> Self {
        Self::Validation(ValidationErrors::from(vec![FieldError::new(field, reason)]))
    }

    pub fn invalid_operation(message: impl Into<String>) -> Self {
        Self::InvalidOperation {
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Validation errors carried by this error, if any
    pub fn validation_errors(&self) -> Option<&ValidationErrors> {
        match self {
            Self::Validation(errors) => Some(errors),
            _ => None,
        }
    }

    /// Whether the caller can recover by changing its input
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::Validation(_) | Self::InvalidOperation { .. } | Self::NotFound { .. }
        )
    }
}
