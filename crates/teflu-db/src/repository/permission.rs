//! SurrealDB implementation of [`PermissionRepository`].
//!
//! Matrix rows are keyed by a deterministic record id built from the
//! (role, module) pair, so an upsert can never produce a second row for
//! the same pair. The unique index on `role_id, module_id` backs that up.

use chrono::{DateTime, Utc};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use teflu_core::error::TefluResult;
use teflu_core::models::permission::{CapabilitySet, ModuleGrant, Permission};
use teflu_core::repository::PermissionRepository;
use tracing::debug;
use uuid::Uuid;

use super::parse_uuid;
use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct PermissionRow {
    record_id: String,
    role_id: String,
    module_id: String,
    can_read: bool,
    can_write: bool,
    can_update: bool,
    can_delete: bool,
    updated_at: DateTime<Utc>,
}

impl PermissionRow {
    fn try_into_permission(self) -> Result<Permission, DbError> {
        Ok(Permission {
            id: self.record_id,
            role_id: parse_uuid(&self.role_id, "role")?,
            module_id: parse_uuid(&self.module_id, "module")?,
            capabilities: CapabilitySet {
                can_read: self.can_read,
                can_write: self.can_write,
                can_update: self.can_update,
                can_delete: self.can_delete,
            },
            updated_at: self.updated_at,
        })
    }
}

fn matrix_key(role_id: Uuid, module_id: Uuid) -> String {
    format!("{role_id}_{module_id}")
}

/// SurrealDB implementation of the Permission repository.
#[derive(Clone)]
pub struct SurrealPermissionRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealPermissionRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> PermissionRepository for SurrealPermissionRepository<C> {
    async fn find(&self, role_id: Uuid, module_id: Uuid) -> TefluResult<Option<Permission>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM permission \
                 WHERE role_id = $role_id AND module_id = $module_id LIMIT 1",
            )
            .bind(("role_id", role_id.to_string()))
            .bind(("module_id", module_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<PermissionRow> = result.take(0).map_err(DbError::from)?;
        Ok(rows
            .into_iter()
            .next()
            .map(PermissionRow::try_into_permission)
            .transpose()?)
    }

    async fn list_for_role(&self, role_id: Uuid) -> TefluResult<Vec<Permission>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM permission \
                 WHERE role_id = $role_id",
            )
            .bind(("role_id", role_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<PermissionRow> = result.take(0).map_err(DbError::from)?;

        let permissions = rows
            .into_iter()
            .map(PermissionRow::try_into_permission)
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(permissions)
    }

    async fn apply_matrix(&self, role_id: Uuid, grants: Vec<ModuleGrant>) -> TefluResult<()> {
        if grants.is_empty() {
            return Ok(());
        }

        let mut query = String::from("BEGIN TRANSACTION;\n");
        for i in 0..grants.len() {
            query.push_str(&format!(
                "UPSERT type::record('permission', $key{i}) SET \
                 role_id = $role_id, module_id = $module{i}, \
                 can_read = $read{i}, can_write = $write{i}, \
                 can_update = $update{i}, can_delete = $delete{i}, \
                 updated_at = time::now();\n"
            ));
        }
        query.push_str("COMMIT TRANSACTION;");

        let mut builder = self
            .db
            .query(query)
            .bind(("role_id", role_id.to_string()));

        let rows = grants.len();
        for (i, grant) in grants.into_iter().enumerate() {
            let caps = grant.capabilities;
            builder = builder
                .bind((format!("key{i}"), matrix_key(role_id, grant.module_id)))
                .bind((format!("module{i}"), grant.module_id.to_string()))
                .bind((format!("read{i}"), caps.can_read))
                .bind((format!("write{i}"), caps.can_write))
                .bind((format!("update{i}"), caps.can_update))
                .bind((format!("delete{i}"), caps.can_delete));
        }

        builder
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| DbError::classify("permission", e))?;

        debug!(%role_id, rows, "Permission matrix applied");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matrix_key_is_stable_per_pair() {
        let role = Uuid::new_v4();
        let module = Uuid::new_v4();
        assert_eq!(matrix_key(role, module), matrix_key(role, module));
        assert_ne!(matrix_key(role, module), matrix_key(module, role));
    }
}
