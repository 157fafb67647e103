//! Integration tests for schema initialization and default data using
//! in-memory SurrealDB.

use surrealdb::Surreal;
use surrealdb::engine::local::Mem;
use teflu_core::models::module::slugs;
use teflu_core::models::permission::Capability;
use teflu_core::models::status::RecordStatus;
use teflu_core::repository::{ModuleRepository, PermissionRepository, RoleRepository};
use teflu_db::repository::{
    SurrealModuleRepository, SurrealPermissionRepository, SurrealRoleRepository,
};

async fn migrated_db() -> Surreal<surrealdb::engine::local::Db> {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    teflu_db::run_migrations(&db).await.unwrap();
    db
}

#[tokio::test]
async fn schema_migration_applies_successfully() {
    let db = migrated_db().await;

    let mut result = db.query("INFO FOR DB").await.unwrap();
    let info: Option<surrealdb_types::Value> = result.take(0).unwrap();
    let info = info.expect("INFO FOR DB should return a value");
    let info_str = format!("{:?}", info);

    for table in [
        "role",
        "module",
        "permission",
        "actor",
        "tool",
        "scan_record",
        "_migration",
    ] {
        assert!(info_str.contains(table), "missing {table} table");
    }
}

#[tokio::test]
async fn migration_is_idempotent() {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();

    teflu_db::run_migrations(&db).await.unwrap();
    teflu_db::run_migrations(&db).await.unwrap();

    let mut result = db.query("SELECT * FROM _migration").await.unwrap();
    let records: Vec<surrealdb_types::Value> = result.take(0).unwrap();
    assert_eq!(records.len(), 1, "expected exactly one migration record");
}

#[tokio::test]
async fn scan_occurrence_index_rejects_second_row() {
    let db = migrated_db().await;

    let insert = "CREATE scan_record SET \
                  tool_id = 't-1', actor_id = 'a-1', \
                  shift = 'Day', shift_date = '2025-03-10', status = 'Ok'";

    db.query(insert).await.unwrap().check().unwrap();

    let again = db.query(insert).await.unwrap().check();
    assert!(again.is_err(), "same tool, shift and date must be rejected");

    // Same tool, other shift is fine.
    db.query(
        "CREATE scan_record SET \
         tool_id = 't-1', actor_id = 'a-1', \
         shift = 'Afternoon', shift_date = '2025-03-10', status = 'Ok'",
    )
    .await
    .unwrap()
    .check()
    .unwrap();
}

#[tokio::test]
async fn shift_field_rejects_unknown_values() {
    let db = migrated_db().await;

    let result = db
        .query(
            "CREATE scan_record SET \
             tool_id = 't-1', actor_id = 'a-1', \
             shift = 'Evening', shift_date = '2025-03-10', status = 'Ok'",
        )
        .await
        .unwrap()
        .check();

    assert!(result.is_err(), "unknown shift should be rejected");
}

#[tokio::test]
async fn ensure_defaults_seeds_admin_and_modules() {
    let db = migrated_db().await;

    let report = teflu_db::ensure_defaults(&db, "Administrator").await.unwrap();
    assert!(report.admin_role_created);
    assert_eq!(report.modules_created, 4);

    let roles = SurrealRoleRepository::new(db.clone());
    let admin = roles.get_by_name("Administrator").await.unwrap();
    assert_eq!(admin.id, report.admin_role_id);

    let modules = SurrealModuleRepository::new(db.clone());
    let inventory = modules
        .find_active_by_slug(slugs::INVENTORY)
        .await
        .unwrap()
        .unwrap();
    let tools = modules
        .find_active_by_slug(slugs::TOOLS)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(tools.parent_id, Some(inventory.id));

    let permissions = SurrealPermissionRepository::new(db.clone());
    let grants = permissions.list_for_role(admin.id).await.unwrap();
    assert_eq!(grants.len(), 4);
    for grant in grants {
        for cap in [
            Capability::Read,
            Capability::Write,
            Capability::Update,
            Capability::Delete,
        ] {
            assert!(grant.capabilities.allows(cap));
        }
    }
}

#[tokio::test]
async fn ensure_defaults_is_idempotent() {
    let db = migrated_db().await;

    let first = teflu_db::ensure_defaults(&db, "Administrator").await.unwrap();
    let second = teflu_db::ensure_defaults(&db, "Administrator").await.unwrap();

    assert_eq!(first.admin_role_id, second.admin_role_id);
    assert!(!second.admin_role_created);
    assert_eq!(second.modules_created, 0);

    let modules = SurrealModuleRepository::new(db.clone());
    assert_eq!(modules.list_active().await.unwrap().len(), 4);

    let permissions = SurrealPermissionRepository::new(db.clone());
    assert_eq!(
        permissions
            .list_for_role(first.admin_role_id)
            .await
            .unwrap()
            .len(),
        4
    );
}

#[tokio::test]
async fn ensure_defaults_leaves_a_deactivated_module_alone() {
    let db = migrated_db().await;
    teflu_db::ensure_defaults(&db, "Administrator").await.unwrap();

    db.query("UPDATE module SET status = 'Inactive' WHERE slug = $slug")
        .bind(("slug", slugs::TOOLS))
        .await
        .unwrap()
        .check()
        .unwrap();

    let again = teflu_db::ensure_defaults(&db, "Administrator").await.unwrap();
    assert_eq!(again.modules_created, 0);

    let modules = SurrealModuleRepository::new(db.clone());
    assert!(modules.find_active_by_slug(slugs::TOOLS).await.unwrap().is_none());
    let tools = modules.find_by_slug(slugs::TOOLS).await.unwrap().unwrap();
    assert_eq!(tools.status, RecordStatus::Inactive);
    assert_eq!(modules.list_active().await.unwrap().len(), 3);
}
