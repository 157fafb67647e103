//! Integration tests for personnel management.

use std::sync::Arc;

use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem};
use teflu_admin::{NewPersonnel, PersonnelService};
use teflu_auth::{AuthConfig, AuthorizationGate, AuthzConfig, PermissionResolver, SessionService};
use teflu_core::error::TefluError;
use teflu_core::identity::Identity;
use teflu_core::models::actor::{CreateActor, UpdateActor};
use teflu_core::models::role::{CreateRole, UpdateRole};
use teflu_core::models::status::RecordStatus;
use teflu_core::repository::{ActorRepository, Pagination, RoleRepository};
use teflu_db::repository::{
    SurrealActorRepository, SurrealModuleRepository, SurrealPermissionRepository,
    SurrealRoleRepository,
};
use uuid::Uuid;

type Gate = AuthorizationGate<
    SurrealActorRepository<Db>,
    SurrealRoleRepository<Db>,
    SurrealModuleRepository<Db>,
    SurrealPermissionRepository<Db>,
>;

type Personnel =
    PersonnelService<SurrealActorRepository<Db>, SurrealRoleRepository<Db>, Arc<Gate>>;

struct Fixture {
    db: Surreal<Db>,
    personnel: Personnel,
    sessions: SessionService<SurrealActorRepository<Db>, SurrealRoleRepository<Db>>,
    admin_role: Uuid,
    admin: Identity,
}

fn auth_config() -> AuthConfig {
    AuthConfig {
        session_secret: "test-secret".into(),
        pepper: Some("pepper".into()),
        ..AuthConfig::default()
    }
}

fn hire(payroll: &str, role_id: Uuid, password: &str) -> NewPersonnel {
    NewPersonnel {
        payroll_number: payroll.into(),
        first_name: "Ana".into(),
        last_name: "Lopez".into(),
        second_last_name: None,
        email: format!("{payroll}@example.com"),
        position: "Operator".into(),
        phone: None,
        address: None,
        image_url: None,
        role_id,
        password: password.into(),
    }
}

/// Seeds one administrator directly through the repository.
async fn setup() -> Fixture {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    teflu_db::run_migrations(&db).await.unwrap();
    let report = teflu_db::ensure_defaults(&db, "Administrator").await.unwrap();

    let admin_actor = SurrealActorRepository::new(db.clone())
        .create(CreateActor {
            payroll_number: "0001".into(),
            first_name: "Root".into(),
            last_name: "Admin".into(),
            second_last_name: None,
            email: "root@example.com".into(),
            position: "IT".into(),
            phone: None,
            address: None,
            image_url: None,
            role_id: report.admin_role_id,
            password_hash: "$argon2id$stub".into(),
        })
        .await
        .unwrap();

    let gate = Arc::new(AuthorizationGate::new(
        SurrealActorRepository::new(db.clone()),
        SurrealRoleRepository::new(db.clone()),
        PermissionResolver::new(
            SurrealModuleRepository::new(db.clone()),
            SurrealPermissionRepository::new(db.clone()),
        ),
        AuthzConfig::default(),
    ));

    let personnel = PersonnelService::new(
        SurrealActorRepository::new(db.clone()),
        SurrealRoleRepository::new(db.clone()),
        gate,
        auth_config(),
    );
    let sessions = SessionService::new(
        SurrealActorRepository::new(db.clone()),
        SurrealRoleRepository::new(db.clone()),
        auth_config(),
    );

    Fixture {
        db,
        personnel,
        sessions,
        admin_role: report.admin_role_id,
        admin: Identity::new(admin_actor.id, "Administrator"),
    }
}

#[tokio::test]
async fn created_actor_can_log_in() {
    let f = setup().await;

    let actor = f
        .personnel
        .create(Some(&f.admin), hire("1001", f.admin_role, "secret1"))
        .await
        .unwrap();
    assert_ne!(actor.password_hash, "secret1");
    assert!(actor.password_hash.starts_with("$argon2id$"));

    let output = f.sessions.login("1001@example.com", "secret1").await.unwrap();
    assert_eq!(output.identity.actor_id, actor.id);
}

#[tokio::test]
async fn short_password_is_rejected() {
    let f = setup().await;

    let result = f
        .personnel
        .create(Some(&f.admin), hire("1002", f.admin_role, "12345"))
        .await;
    assert!(matches!(result, Err(TefluError::Validation { .. })));
}

#[tokio::test]
async fn required_fields_are_checked() {
    let f = setup().await;

    let blank_name = f
        .personnel
        .create(
            Some(&f.admin),
            NewPersonnel {
                first_name: "  ".into(),
                ..hire("1003", f.admin_role, "secret1")
            },
        )
        .await;
    assert!(matches!(blank_name, Err(TefluError::Validation { .. })));

    let bad_email = f
        .personnel
        .create(
            Some(&f.admin),
            NewPersonnel {
                email: "not-an-email".into(),
                ..hire("1004", f.admin_role, "secret1")
            },
        )
        .await;
    assert!(matches!(bad_email, Err(TefluError::Validation { .. })));
}

#[tokio::test]
async fn duplicate_email_is_a_conflict() {
    let f = setup().await;

    f.personnel
        .create(Some(&f.admin), hire("1005", f.admin_role, "secret1"))
        .await
        .unwrap();
    let dup = f
        .personnel
        .create(
            Some(&f.admin),
            NewPersonnel {
                payroll_number: "1006".into(),
                ..hire("1005", f.admin_role, "secret1")
            },
        )
        .await;
    assert!(matches!(dup, Err(TefluError::AlreadyExists { .. })));
}

#[tokio::test]
async fn inactive_role_cannot_be_assigned() {
    let f = setup().await;
    let roles = SurrealRoleRepository::new(f.db.clone());
    let retired = roles
        .create(CreateRole {
            name: "Retirado".into(),
            description: String::new(),
        })
        .await
        .unwrap();
    roles
        .update(
            retired.id,
            UpdateRole {
                status: Some(RecordStatus::Inactive),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let result = f
        .personnel
        .create(Some(&f.admin), hire("1007", retired.id, "secret1"))
        .await;
    assert!(matches!(result, Err(TefluError::Validation { .. })));
}

#[tokio::test]
async fn password_change_replaces_the_hash() {
    let f = setup().await;
    let actor = f
        .personnel
        .create(Some(&f.admin), hire("1008", f.admin_role, "secret1"))
        .await
        .unwrap();

    let updated = f
        .personnel
        .update(
            Some(&f.admin),
            actor.id,
            UpdateActor {
                position: Some(" Lead ".into()),
                ..Default::default()
            },
            Some("secret2"),
        )
        .await
        .unwrap();
    assert_eq!(updated.position, "Lead");

    let old = f.sessions.login("1008@example.com", "secret1").await;
    assert!(matches!(old, Err(TefluError::Unauthenticated)));
    f.sessions.login("1008@example.com", "secret2").await.unwrap();
}

#[tokio::test]
async fn update_without_password_keeps_the_hash() {
    let f = setup().await;
    let actor = f
        .personnel
        .create(Some(&f.admin), hire("1009", f.admin_role, "secret1"))
        .await
        .unwrap();

    let updated = f
        .personnel
        .update(
            Some(&f.admin),
            actor.id,
            UpdateActor {
                password_hash: Some("smuggled".into()),
                ..Default::default()
            },
            None,
        )
        .await
        .unwrap();
    assert_eq!(updated.password_hash, actor.password_hash);
}

#[tokio::test]
async fn actors_cannot_delete_themselves() {
    let f = setup().await;

    let result = f.personnel.delete(Some(&f.admin), f.admin.actor_id).await;
    assert!(matches!(result, Err(TefluError::BusinessRule { .. })));

    let me = SurrealActorRepository::new(f.db.clone())
        .get_by_id(f.admin.actor_id)
        .await
        .unwrap();
    assert_eq!(me.status, RecordStatus::Active);
}

#[tokio::test]
async fn delete_is_a_soft_delete() {
    let f = setup().await;
    let actor = f
        .personnel
        .create(Some(&f.admin), hire("1010", f.admin_role, "secret1"))
        .await
        .unwrap();

    f.personnel.delete(Some(&f.admin), actor.id).await.unwrap();

    let stored = SurrealActorRepository::new(f.db.clone())
        .get_by_id(actor.id)
        .await
        .unwrap();
    assert_eq!(stored.status, RecordStatus::Inactive);
    assert!(stored.deleted_at.is_some());

    let listed = f
        .personnel
        .list(Some(&f.admin), Pagination::default())
        .await
        .unwrap();
    assert!(listed.items.iter().all(|a| a.id != actor.id));
}

#[tokio::test]
async fn anonymous_calls_are_unauthenticated() {
    let f = setup().await;

    let list = f.personnel.list(None, Pagination::default()).await;
    assert!(matches!(list, Err(TefluError::Unauthenticated)));

    let delete = f.personnel.delete(None, f.admin.actor_id).await;
    assert!(matches!(delete, Err(TefluError::Unauthenticated)));
}
