//! Error types for the Teflu system.

use thiserror::Error;

use crate::models::permission::Capability;
use crate::shift::Shift;

#[derive(Debug, Error)]
pub enum TefluError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("Entity already exists: {entity}")]
    AlreadyExists { entity: String },

    /// No valid session. Callers redirect to login instead of showing
    /// a permission error.
    #[error("Authentication required")]
    Unauthenticated,

    #[error("Not allowed to {capability} on module {module}")]
    Unauthorized {
        module: String,
        capability: Capability,
    },

    #[error("Tool not found or inactive: {code}")]
    ToolNotFound { code: String },

    #[error("Tool {tool_name} already registered in shift {shift} by {scanned_by}")]
    DuplicateScan {
        tool_name: String,
        shift: Shift,
        scanned_by: String,
    },

    #[error("Operation refused: {reason}")]
    BusinessRule { reason: String },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type TefluResult<T> = Result<T, TefluError>;

impl TefluError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn business_rule(reason: impl Into<String>) -> Self {
        Self::BusinessRule {
            reason: reason.into(),
        }
    }

    /// True for errors that signal a store or programming fault rather
    /// than a routine outcome of the operator's input.
    pub fn is_alarm(&self) -> bool {
        matches!(self, Self::Database(_) | Self::Internal(_))
    }
}
