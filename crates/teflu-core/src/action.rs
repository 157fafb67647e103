//! Structured results handed to the UI/action layer.
//!
//! Every [`TefluError`] is recovered here and turned into an
//! [`ActionError`] carrying a stable code, so no error crosses the UI
//! boundary uncaught.

use serde::{Deserialize, Serialize};
use tracing::error;

use crate::error::TefluError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Redirect to login.
    Unauthenticated,
    Unauthorized,
    ToolNotFound,
    /// Routine flow; the operator keeps scanning.
    DuplicateScan,
    BusinessRuleViolation,
    Validation,
    NotFound,
    Conflict,
    /// Alarm condition.
    PersistenceFailure,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionError {
    pub code: ErrorCode,
    pub message: String,
}

pub type ActionResult<T> = Result<T, ActionError>;

impl From<TefluError> for ActionError {
    fn from(err: TefluError) -> Self {
        let code = match &err {
            TefluError::Unauthenticated => ErrorCode::Unauthenticated,
            TefluError::Unauthorized { .. } => ErrorCode::Unauthorized,
            TefluError::ToolNotFound { .. } => ErrorCode::ToolNotFound,
            TefluError::DuplicateScan { .. } => ErrorCode::DuplicateScan,
            TefluError::BusinessRule { .. } => ErrorCode::BusinessRuleViolation,
            TefluError::Validation { .. } => ErrorCode::Validation,
            TefluError::NotFound { .. } => ErrorCode::NotFound,
            TefluError::AlreadyExists { .. } => ErrorCode::Conflict,
            TefluError::Database(_) | TefluError::Internal(_) => ErrorCode::PersistenceFailure,
        };

        let message = if err.is_alarm() {
            error!(error = %err, "Action failed with an internal error");
            "internal error".to_string()
        } else {
            err.to_string()
        };

        Self { code, message }
    }
}

/// Run a fallible operation and convert its error at the action boundary.
pub async fn run_action<T, F>(op: F) -> ActionResult<T>
where
    F: Future<Output = Result<T, TefluError>>,
{
    op.await.map_err(ActionError::from)
}
