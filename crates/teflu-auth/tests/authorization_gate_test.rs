//! Integration tests for permission resolution and the authorization
//! gate.

use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem};
use teflu_auth::{AuthorizationGate, AuthzConfig, Gatekeeper, PermissionResolver};
use teflu_core::error::TefluError;
use teflu_core::identity::Identity;
use teflu_core::models::actor::CreateActor;
use teflu_core::models::module::slugs;
use teflu_core::models::permission::{Capability, CapabilitySet, ModuleGrant};
use teflu_core::models::role::{CreateRole, Role, UpdateRole};
use teflu_core::models::status::RecordStatus;
use teflu_core::repository::{
    ActorRepository, ModuleRepository, PermissionRepository, RoleRepository,
};
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

struct Fixture {
    db: Surreal<Db>,
    gate: Gate,
    admin_role: Uuid,
    admin: Identity,
    supervisor_role: Uuid,
    supervisor: Identity,
}

async fn create_role(db: &Surreal<Db>, name: &str) -> Role {
    SurrealRoleRepository::new(db.clone())
        .create(CreateRole {
            name: name.into(),
            description: String::new(),
        })
        .await
        .unwrap()
}

async fn create_actor(db: &Surreal<Db>, payroll: &str, role: &Role) -> Identity {
    let actor = SurrealActorRepository::new(db.clone())
        .create(CreateActor {
            payroll_number: payroll.into(),
            first_name: payroll.into(),
            last_name: "Test".into(),
            second_last_name: None,
            email: format!("{payroll}@example.com"),
            position: "Staff".into(),
            phone: None,
            address: None,
            image_url: None,
            role_id: role.id,
            password_hash: "$argon2id$stub".into(),
        })
        .await
        .unwrap();
    Identity::new(actor.id, role.name.clone())
}

async fn grant(db: &Surreal<Db>, role_id: Uuid, slug: &str, capabilities: CapabilitySet) {
    let module = SurrealModuleRepository::new(db.clone())
        .find_active_by_slug(slug)
        .await
        .unwrap()
        .unwrap();
    SurrealPermissionRepository::new(db.clone())
        .apply_matrix(
            role_id,
            vec![ModuleGrant {
                module_id: module.id,
                capabilities,
            }],
        )
        .await
        .unwrap();
}

fn read_only() -> CapabilitySet {
    CapabilitySet {
        can_read: true,
        ..CapabilitySet::none()
    }
}

/// Seeded defaults, an administrator and a supervisor who can only read
/// `personas`.
async fn setup() -> Fixture {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    teflu_db::run_migrations(&db).await.unwrap();
    let report = teflu_db::ensure_defaults(&db, "Administrator").await.unwrap();

    let admin_role = SurrealRoleRepository::new(db.clone())
        .get_by_id(report.admin_role_id)
        .await
        .unwrap();
    let admin = create_actor(&db, "admin", &admin_role).await;

    let supervisor_role = create_role(&db, "Supervisor").await;
    grant(&db, supervisor_role.id, slugs::PERSONNEL, read_only()).await;
    let supervisor = create_actor(&db, "super", &supervisor_role).await;

    let gate = AuthorizationGate::new(
        SurrealActorRepository::new(db.clone()),
        SurrealRoleRepository::new(db.clone()),
        PermissionResolver::new(
            SurrealModuleRepository::new(db.clone()),
            SurrealPermissionRepository::new(db.clone()),
        ),
        AuthzConfig::default(),
    );

    Fixture {
        db,
        gate,
        admin_role: admin_role.id,
        admin,
        supervisor_role: supervisor_role.id,
        supervisor,
    }
}

// -----------------------------------------------------------------------
// Permission resolver
// -----------------------------------------------------------------------

#[tokio::test]
async fn resolve_returns_stored_booleans() {
    let f = setup().await;
    let caps = f
        .gate
        .resolver()
        .resolve(f.supervisor_role, slugs::PERSONNEL)
        .await
        .unwrap();
    assert_eq!(caps, read_only());
}

#[tokio::test]
async fn resolve_without_record_is_deny_all() {
    let f = setup().await;
    let resolver = f.gate.resolver();

    let caps = resolver
        .resolve(f.supervisor_role, slugs::TOOLS)
        .await
        .unwrap();
    assert_eq!(caps, CapabilitySet::none());

    let unknown_module = resolver
        .resolve(f.admin_role, "no-such-module")
        .await
        .unwrap();
    assert_eq!(unknown_module, CapabilitySet::none());

    let unknown_role = resolver
        .resolve(Uuid::new_v4(), slugs::PERSONNEL)
        .await
        .unwrap();
    assert_eq!(unknown_role, CapabilitySet::none());
}

#[tokio::test]
async fn scope_memoizes_within_request_only() {
    let f = setup().await;
    let resolver = f.gate.resolver();

    let scope = resolver.scope();
    assert_eq!(
        scope
            .resolve(f.supervisor_role, slugs::PERSONNEL)
            .await
            .unwrap(),
        read_only()
    );

    grant(&f.db, f.supervisor_role, slugs::PERSONNEL, CapabilitySet::all()).await;

    // Same scope keeps its answer; a fresh scope sees the change.
    assert_eq!(
        scope
            .resolve(f.supervisor_role, slugs::PERSONNEL)
            .await
            .unwrap(),
        read_only()
    );
    assert_eq!(
        resolver
            .scope()
            .resolve(f.supervisor_role, slugs::PERSONNEL)
            .await
            .unwrap(),
        CapabilitySet::all()
    );
}

#[tokio::test]
async fn readable_modules_follow_read_grants() {
    let f = setup().await;
    let resolver = f.gate.resolver();

    let admin_modules = resolver.readable_modules(f.admin_role).await.unwrap();
    let slugs_seen: Vec<_> = admin_modules.iter().map(|m| m.slug.as_str()).collect();
    assert_eq!(
        slugs_seen,
        [slugs::PERSONNEL, slugs::ROLES, slugs::INVENTORY, slugs::TOOLS]
    );

    let supervisor_modules = resolver
        .readable_modules(f.supervisor_role)
        .await
        .unwrap();
    assert_eq!(supervisor_modules.len(), 1);
    assert_eq!(supervisor_modules[0].slug, slugs::PERSONNEL);
}

#[tokio::test]
async fn matrix_lists_every_module() {
    let f = setup().await;
    let matrix = f
        .gate
        .resolver()
        .matrix(f.supervisor_role)
        .await
        .unwrap();

    assert_eq!(matrix.len(), 4);
    for entry in matrix {
        if entry.module_slug == slugs::PERSONNEL {
            assert_eq!(entry.capabilities, read_only());
        } else {
            assert_eq!(entry.capabilities, CapabilitySet::none());
        }
    }
}

// -----------------------------------------------------------------------
// Gate
// -----------------------------------------------------------------------

#[tokio::test]
async fn missing_session_is_unauthenticated_for_every_capability() {
    let f = setup().await;
    for cap in [
        Capability::Read,
        Capability::Write,
        Capability::Update,
        Capability::Delete,
    ] {
        let result = f.gate.require_capability(None, slugs::PERSONNEL, cap).await;
        assert!(matches!(result, Err(TefluError::Unauthenticated)));
    }
}

#[tokio::test]
async fn read_only_supervisor_can_list_but_not_create() {
    let f = setup().await;

    let list = f
        .gate
        .require_capability(Some(&f.supervisor), slugs::PERSONNEL, Capability::Read)
        .await
        .unwrap();
    assert_eq!(list.role_name, "Supervisor");

    let create = f
        .gate
        .require_capability(Some(&f.supervisor), slugs::PERSONNEL, Capability::Write)
        .await;
    match create {
        Err(TefluError::Unauthorized { module, capability }) => {
            assert_eq!(module, slugs::PERSONNEL);
            assert_eq!(capability, Capability::Write);
        }
        other => panic!("expected Unauthorized, got {other:?}"),
    }
}

#[tokio::test]
async fn unknown_actor_is_denied_not_unauthenticated() {
    let f = setup().await;
    let ghost = Identity::new(Uuid::new_v4(), "Administrator");

    let result = f
        .gate
        .require_capability(Some(&ghost), slugs::PERSONNEL, Capability::Read)
        .await;
    assert!(matches!(result, Err(TefluError::Unauthorized { .. })));
}

#[tokio::test]
async fn inactive_actor_or_role_is_denied() {
    let f = setup().await;

    SurrealRoleRepository::new(f.db.clone())
        .update(
            f.supervisor_role,
            UpdateRole {
                status: Some(RecordStatus::Inactive),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    let result = f
        .gate
        .require_capability(Some(&f.supervisor), slugs::PERSONNEL, Capability::Read)
        .await;
    assert!(matches!(result, Err(TefluError::Unauthorized { .. })));

    SurrealActorRepository::new(f.db.clone())
        .deactivate(f.admin.actor_id)
        .await
        .unwrap();
    let result = f
        .gate
        .require_capability(Some(&f.admin), slugs::PERSONNEL, Capability::Read)
        .await;
    assert!(matches!(result, Err(TefluError::Unauthorized { .. })));
}

#[tokio::test]
async fn administrator_role_can_never_be_deleted() {
    let f = setup().await;

    let result = f
        .gate
        .require_role_deletion(Some(&f.admin), f.admin_role)
        .await;
    assert!(matches!(result, Err(TefluError::BusinessRule { .. })));
}

#[tokio::test]
async fn role_with_active_members_cannot_be_deleted() {
    let f = setup().await;
    let tecnico = create_role(&f.db, "Tecnico").await;

    f.gate
        .require_role_deletion(Some(&f.admin), tecnico.id)
        .await
        .unwrap();

    let member = create_actor(&f.db, "tec1", &tecnico).await;
    let result = f
        .gate
        .require_role_deletion(Some(&f.admin), tecnico.id)
        .await;
    assert!(matches!(result, Err(TefluError::BusinessRule { .. })));

    // Only active members count.
    SurrealActorRepository::new(f.db.clone())
        .deactivate(member.actor_id)
        .await
        .unwrap();
    f.gate
        .require_role_deletion(Some(&f.admin), tecnico.id)
        .await
        .unwrap();
}

#[tokio::test]
async fn role_deletion_checks_permission_before_business_rules() {
    let f = setup().await;

    let result = f
        .gate
        .require_role_deletion(Some(&f.supervisor), f.admin_role)
        .await;
    assert!(matches!(result, Err(TefluError::Unauthorized { .. })));
}

#[tokio::test]
async fn actors_cannot_delete_themselves() {
    let f = setup().await;

    let result = f
        .gate
        .require_actor_deletion(Some(&f.admin), f.admin.actor_id)
        .await;
    assert!(matches!(result, Err(TefluError::BusinessRule { .. })));

    f.gate
        .require_actor_deletion(Some(&f.admin), f.supervisor.actor_id)
        .await
        .unwrap();
}
