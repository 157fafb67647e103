//! Database-specific error types and conversions.

use teflu_core::error::TefluError;

/// Database-layer error type.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("SurrealDB error: {0}")]
    Surreal(#[from] surrealdb::Error),

    #[error("Migration failed: {0}")]
    Migration(String),

    #[error("Query failed: {0}")]
    Query(String),

    /// A unique index or record id rejected the write.
    #[error("Conflict on {entity}: {detail}")]
    Conflict { entity: String, detail: String },

    #[error("Stored value is malformed: {0}")]
    Decode(String),

    #[error("Record not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },
}

impl DbError {
    /// Classify an error returned by `Response::check()`.
    ///
    /// SurrealDB reports unique-index and duplicate-id violations only
    /// through the error text. Two concurrent writers racing for the same
    /// index key can also surface as a transaction write conflict, which
    /// is classified the same way.
    pub(crate) fn classify(entity: &str, err: surrealdb::Error) -> Self {
        let detail = err.to_string();
        if is_conflict_message(&detail) {
            DbError::Conflict {
                entity: entity.into(),
                detail,
            }
        } else {
            DbError::Query(detail)
        }
    }
}

fn is_conflict_message(detail: &str) -> bool {
    detail.contains("already contains")
        || detail.contains("already exists")
        || detail.to_lowercase().contains("conflict")
}

impl From<DbError> for TefluError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => TefluError::NotFound { entity, id },
            DbError::Conflict { entity, .. } => TefluError::AlreadyExists { entity },
            other => TefluError::Database(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_maps_to_core_not_found() {
        let err: TefluError = DbError::NotFound {
            entity: "tool".into(),
            id: "x".into(),
        }
        .into();
        assert!(matches!(err, TefluError::NotFound { .. }));
    }

    #[test]
    fn conflict_maps_to_already_exists() {
        let err: TefluError = DbError::Conflict {
            entity: "scan_record".into(),
            detail: "index already contains".into(),
        }
        .into();
        match err {
            TefluError::AlreadyExists { entity } => assert_eq!(entity, "scan_record"),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn conflict_messages_are_recognised() {
        assert!(is_conflict_message(
            "Database index `idx_tool_code` already contains 'T-1'"
        ));
        assert!(is_conflict_message(
            "Failed to commit transaction due to a read or write conflict"
        ));
        assert!(!is_conflict_message("Parse error"));
    }

    #[test]
    fn decode_maps_to_database_failure() {
        let err: TefluError = DbError::Decode("bad uuid".into()).into();
        assert!(err.is_alarm());
    }
}
