//! # Workflow Error Types
//!
//! Crate-wide error taxonomy. Handler and sweep boundaries catch these and log
//! them; nothing here ever reaches the business request that emitted the event.

use thiserror::Error;

/// Errors produced by the workflow automation core
#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("Database error: {operation}: {message}")]
    Database { operation: String, message: String },

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("No template '{name}' for role {role} on channel {channel}")]
    TemplateNotFound {
        name: String,
        role: String,
        channel: String,
    },

    #[error("Queue error: {operation}: {message}")]
    Queue { operation: String, message: String },

    #[error("Delivery error: {channel}: {message}")]
    Delivery { channel: String, message: String },

    #[error("Entity not found: {entity} {id}")]
    EntityNotFound { entity: String, id: String },

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl WorkflowError {
    pub fn database(operation: impl Into<String>, message: impl std::fmt::Display) -> Self {
        Self::Database {
            operation: operation.into(),
            message: message.to_string(),
        }
    }

    pub fn queue(operation: impl Into<String>, message: impl std::fmt::Display) -> Self {
        Self::Queue {
            operation: operation.into(),
            message: message.to_string(),
        }
    }

    pub fn delivery(channel: impl Into<String>, message: impl std::fmt::Display) -> Self {
        Self::Delivery {
            channel: channel.into(),
            message: message.to_string(),
        }
    }

    pub fn entity_not_found(entity: impl Into<String>, id: impl std::fmt::Display) -> Self {
        Self::EntityNotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }

    /// Missing templates and bad configuration are not worth retrying
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::Configuration(_) | Self::TemplateNotFound { .. }
        )
    }
}

impl From<sqlx::Error> for WorkflowError {
    fn from(err: sqlx::Error) -> Self {
        Self::database("query", err)
    }
}

impl From<crate::config::ConfigurationError> for WorkflowError {
    fn from(err: crate::config::ConfigurationError) -> Self {
        Self::Configuration(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, WorkflowError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configuration_classification() {
        let missing = WorkflowError::TemplateNotFound {
            name: "orderShipped".to_string(),
            role: "LAB_ADMIN".to_string(),
            channel: "EMAIL".to_string(),
        };
        assert!(missing.is_configuration());
        assert!(!WorkflowError::queue("enqueue", "closed").is_configuration());
    }

    #[test]
    fn test_error_display() {
        let err = WorkflowError::entity_not_found("inquiry", "abc");
        assert_eq!(err.to_string(), "Entity not found: inquiry abc");
    }
}
