//! SurrealDB repository implementations.

mod actor;
mod module;
mod permission;
mod role;
mod scan;
mod tool;

pub use actor::SurrealActorRepository;
pub use module::SurrealModuleRepository;
pub use permission::SurrealPermissionRepository;
pub use role::SurrealRoleRepository;
pub use scan::SurrealScanRepository;
pub use tool::SurrealToolRepository;

use surrealdb_types::SurrealValue;
use teflu_core::models::status::RecordStatus;
use uuid::Uuid;

use crate::error::DbError;

/// Row struct for `count() ... GROUP ALL` queries.
#[derive(Debug, SurrealValue)]
struct CountRow {
    total: u64,
}

fn parse_uuid(raw: &str, what: &str) -> Result<Uuid, DbError> {
    Uuid::parse_str(raw).map_err(|e| DbError::Decode(format!("invalid {what} UUID: {e}")))
}

fn parse_status(raw: &str) -> Result<RecordStatus, DbError> {
    match raw {
        "Active" => Ok(RecordStatus::Active),
        "Inactive" => Ok(RecordStatus::Inactive),
        other => Err(DbError::Decode(format!("unknown record status: {other}"))),
    }
}

fn status_str(status: RecordStatus) -> &'static str {
    match status {
        RecordStatus::Active => "Active",
        RecordStatus::Inactive => "Inactive",
    }
}
