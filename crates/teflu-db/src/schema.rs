//! Schema definitions and migration runner for SurrealDB.
//!
//! Tables are SCHEMAFULL. UUIDs and shift dates (`YYYY-MM-DD`) are
//! stored as strings; enums as strings guarded by ASSERT. Uniqueness
//! rules the application relies on live here as UNIQUE indexes.

use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tracing::info;

use crate::error::DbError;

// -----------------------------------------------------------------------
// Migration tracking
// -----------------------------------------------------------------------

const MIGRATION_TABLE_DDL: &str = "\
DEFINE TABLE IF NOT EXISTS _migration SCHEMAFULL;
DEFINE FIELD IF NOT EXISTS version ON TABLE _migration TYPE int;
DEFINE FIELD IF NOT EXISTS name ON TABLE _migration TYPE string;
DEFINE FIELD IF NOT EXISTS applied_at ON TABLE _migration TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX IF NOT EXISTS idx_migration_version ON TABLE _migration \
    COLUMNS version UNIQUE;
";

#[derive(Debug, SurrealValue)]
struct MigrationRecord {
    version: u32,
}

struct Migration {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

static MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    name: "rbac_and_inventory",
    sql: SCHEMA_V1,
}];

// -----------------------------------------------------------------------
// Schema v1 — initial table definitions
// -----------------------------------------------------------------------

const SCHEMA_V1: &str = "\
-- =======================================================================
-- Roles
-- =======================================================================
DEFINE TABLE role SCHEMAFULL;
DEFINE FIELD name ON TABLE role TYPE string;
DEFINE FIELD description ON TABLE role TYPE string DEFAULT '';
DEFINE FIELD status ON TABLE role TYPE string \
    ASSERT $value IN ['Active', 'Inactive'];
DEFINE FIELD created_at ON TABLE role TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE role TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_role_name ON TABLE role COLUMNS name UNIQUE;

-- =======================================================================
-- Modules (protected sections, optional parent for navigation)
-- =======================================================================
DEFINE TABLE module SCHEMAFULL;
DEFINE FIELD name ON TABLE module TYPE string;
DEFINE FIELD slug ON TABLE module TYPE string;
DEFINE FIELD icon ON TABLE module TYPE option<string>;
DEFINE FIELD position ON TABLE module TYPE int DEFAULT 0;
DEFINE FIELD parent_id ON TABLE module TYPE option<string>;
DEFINE FIELD status ON TABLE module TYPE string \
    ASSERT $value IN ['Active', 'Inactive'];
DEFINE INDEX idx_module_slug ON TABLE module COLUMNS slug UNIQUE;

-- =======================================================================
-- Permissions (role x module capability matrix)
-- =======================================================================
DEFINE TABLE permission SCHEMAFULL;
DEFINE FIELD role_id ON TABLE permission TYPE string;
DEFINE FIELD module_id ON TABLE permission TYPE string;
DEFINE FIELD can_read ON TABLE permission TYPE bool DEFAULT false;
DEFINE FIELD can_write ON TABLE permission TYPE bool DEFAULT false;
DEFINE FIELD can_update ON TABLE permission TYPE bool DEFAULT false;
DEFINE FIELD can_delete ON TABLE permission TYPE bool DEFAULT false;
DEFINE FIELD updated_at ON TABLE permission TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_permission_role_module ON TABLE permission \
    COLUMNS role_id, module_id UNIQUE;

-- =======================================================================
-- Actors (personnel)
-- =======================================================================
DEFINE TABLE actor SCHEMAFULL;
DEFINE FIELD payroll_number ON TABLE actor TYPE string;
DEFINE FIELD first_name ON TABLE actor TYPE string;
DEFINE FIELD last_name ON TABLE actor TYPE string;
DEFINE FIELD second_last_name ON TABLE actor TYPE option<string>;
DEFINE FIELD email ON TABLE actor TYPE string;
DEFINE FIELD position ON TABLE actor TYPE string;
DEFINE FIELD phone ON TABLE actor TYPE option<string>;
DEFINE FIELD address ON TABLE actor TYPE option<string>;
DEFINE FIELD image_url ON TABLE actor TYPE option<string>;
DEFINE FIELD role_id ON TABLE actor TYPE string;
DEFINE FIELD password_hash ON TABLE actor TYPE string;
DEFINE FIELD status ON TABLE actor TYPE string \
    ASSERT $value IN ['Active', 'Inactive'];
DEFINE FIELD created_at ON TABLE actor TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD deleted_at ON TABLE actor TYPE option<datetime>;
DEFINE INDEX idx_actor_email ON TABLE actor COLUMNS email UNIQUE;
DEFINE INDEX idx_actor_payroll ON TABLE actor \
    COLUMNS payroll_number UNIQUE;
DEFINE INDEX idx_actor_role ON TABLE actor COLUMNS role_id, status;

-- =======================================================================
-- Tools (herramentales)
-- =======================================================================
DEFINE TABLE tool SCHEMAFULL;
DEFINE FIELD code ON TABLE tool TYPE string;
DEFINE FIELD name ON TABLE tool TYPE string;
DEFINE FIELD description ON TABLE tool TYPE string DEFAULT '';
DEFINE FIELD brand ON TABLE tool TYPE string DEFAULT '';
DEFINE FIELD image_url ON TABLE tool TYPE option<string>;
DEFINE FIELD status ON TABLE tool TYPE string \
    ASSERT $value IN ['Active', 'Inactive'];
DEFINE FIELD created_at ON TABLE tool TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE tool TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_tool_code ON TABLE tool COLUMNS code UNIQUE;

-- =======================================================================
-- Scan records (append-only)
-- =======================================================================
DEFINE TABLE scan_record SCHEMAFULL
    PERMISSIONS
        FOR create FULL
        FOR select FULL
        FOR update NONE
        FOR delete NONE;
DEFINE FIELD tool_id ON TABLE scan_record TYPE string;
DEFINE FIELD actor_id ON TABLE scan_record TYPE string;
DEFINE FIELD shift ON TABLE scan_record TYPE string \
    ASSERT $value IN ['Day', 'Afternoon', 'Night'];
DEFINE FIELD shift_date ON TABLE scan_record TYPE string;
DEFINE FIELD status ON TABLE scan_record TYPE string \
    ASSERT $value IN ['Ok', 'Discrepancy'];
DEFINE FIELD created_at ON TABLE scan_record TYPE datetime \
    DEFAULT time::now();
-- One registration per tool per shift occurrence. This index is the
-- authoritative duplicate-scan guard.
DEFINE INDEX idx_scan_occurrence ON TABLE scan_record \
    COLUMNS tool_id, shift, shift_date UNIQUE;
DEFINE INDEX idx_scan_shift ON TABLE scan_record \
    COLUMNS shift, shift_date;
";

// -----------------------------------------------------------------------
// Public API
// -----------------------------------------------------------------------

/// Bring the schema up to date.
///
/// Creates the `_migration` tracking table on first run, then applies
/// every migration whose version is above the recorded maximum, each
/// followed by its tracking row. Calling this on an up-to-date database
/// is a no-op.
pub async fn run_migrations<C: Connection>(db: &Surreal<C>) -> Result<(), DbError> {
    // Tracking table first; its DDL is idempotent.
    db.query(MIGRATION_TABLE_DDL)
        .await?
        .check()
        .map_err(|e| DbError::Migration(e.to_string()))?;

    let mut result = db
        .query("SELECT version FROM _migration ORDER BY version DESC LIMIT 1")
        .await?;
    let records: Vec<MigrationRecord> = result.take(0)?;
    let current_version = records.first().map(|m| m.version).unwrap_or(0);

    let pending = MIGRATIONS
        .iter()
        .filter(|m| m.version > current_version);
    for migration in pending {
        apply(db, migration).await?;
    }

    Ok(())
}

async fn apply<C: Connection>(db: &Surreal<C>, migration: &Migration) -> Result<(), DbError> {
    info!(
        version = migration.version,
        name = migration.name,
        "Applying migration"
    );

    db.query(migration.sql).await?.check().map_err(|e| {
        DbError::Migration(format!(
            "v{} '{}' failed: {e}",
            migration.version, migration.name
        ))
    })?;

    db.query("CREATE _migration SET version = $version, name = $name")
        .bind(("version", migration.version))
        .bind(("name", migration.name))
        .await?
        .check()
        .map_err(|e| {
            DbError::Migration(format!(
                "could not record v{}: {e}",
                migration.version
            ))
        })?;

    info!(version = migration.version, "Migration applied");
    Ok(())
}

/// Raw DDL of the first schema version.
pub fn schema_v1() -> &'static str {
    SCHEMA_V1
}
