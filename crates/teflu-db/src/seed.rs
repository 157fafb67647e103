//! Default data every installation needs: the administrator role, the
//! built-in modules and the administrator's full grants on them.
//!
//! [`ensure_defaults`] is safe to run on every start. Existing rows are
//! looked up by name or slug and left alone; the admin grants are
//! re-applied through the same upsert the matrix editor uses.

use surrealdb::{Connection, Surreal};
use teflu_core::error::{TefluError, TefluResult};
use teflu_core::models::module::{CreateModule, Module, slugs};
use teflu_core::models::permission::{CapabilitySet, ModuleGrant};
use teflu_core::models::role::{CreateRole, Role};
use teflu_core::repository::{ModuleRepository, PermissionRepository, RoleRepository};
use tracing::info;
use uuid::Uuid;

use crate::repository::{
    SurrealModuleRepository, SurrealPermissionRepository, SurrealRoleRepository,
};

struct DefaultModule {
    name: &'static str,
    slug: &'static str,
    icon: &'static str,
    position: u32,
    parent: Option<&'static str>,
}

// Parents precede their children.
static DEFAULT_MODULES: &[DefaultModule] = &[
    DefaultModule {
        name: "Personas",
        slug: slugs::PERSONNEL,
        icon: "users",
        position: 1,
        parent: None,
    },
    DefaultModule {
        name: "Roles",
        slug: slugs::ROLES,
        icon: "shield",
        position: 2,
        parent: None,
    },
    DefaultModule {
        name: "Inventarios",
        slug: slugs::INVENTORY,
        icon: "boxes",
        position: 3,
        parent: None,
    },
    DefaultModule {
        name: "Herramentales",
        slug: slugs::TOOLS,
        icon: "wrench",
        position: 4,
        parent: Some(slugs::INVENTORY),
    },
];

/// What [`ensure_defaults`] found or created.
#[derive(Debug, Clone)]
pub struct DefaultsReport {
    pub admin_role_id: Uuid,
    pub admin_role_created: bool,
    pub modules_created: usize,
}

/// Create whatever default rows are missing and grant the administrator
/// role every capability on every active module.
pub async fn ensure_defaults<C: Connection>(
    db: &Surreal<C>,
    admin_role_name: &str,
) -> TefluResult<DefaultsReport> {
    let roles = SurrealRoleRepository::new(db.clone());
    let modules = SurrealModuleRepository::new(db.clone());
    let permissions = SurrealPermissionRepository::new(db.clone());

    let (admin, admin_role_created) = ensure_admin_role(&roles, admin_role_name).await?;

    let mut modules_created = 0;
    for default in DEFAULT_MODULES {
        // A deactivated default stays deactivated; its slug is still taken.
        if modules.find_by_slug(default.slug).await?.is_some() {
            continue;
        }
        let parent_id = match default.parent {
            Some(parent_slug) => Some(require_module(&modules, parent_slug).await?.id),
            None => None,
        };
        modules
            .create(CreateModule {
                name: default.name.into(),
                slug: default.slug.into(),
                icon: Some(default.icon.into()),
                position: default.position,
                parent_id,
            })
            .await?;
        modules_created += 1;
    }

    let grants = modules
        .list_active()
        .await?
        .into_iter()
        .map(|module| ModuleGrant {
            module_id: module.id,
            capabilities: CapabilitySet::all(),
        })
        .collect();
    permissions.apply_matrix(admin.id, grants).await?;

    info!(
        admin_role = %admin.id,
        admin_role_created,
        modules_created,
        "Default roles and modules in place"
    );

    Ok(DefaultsReport {
        admin_role_id: admin.id,
        admin_role_created,
        modules_created,
    })
}

async fn ensure_admin_role<R: RoleRepository>(
    roles: &R,
    name: &str,
) -> TefluResult<(Role, bool)> {
    match roles.get_by_name(name).await {
        Ok(role) => Ok((role, false)),
        Err(TefluError::NotFound { .. }) => {
            let role = roles
                .create(CreateRole {
                    name: name.to_string(),
                    description: "Full access to every module".into(),
                })
                .await?;
            Ok((role, true))
        }
        Err(e) => Err(e),
    }
}

async fn require_module<M: ModuleRepository>(modules: &M, slug: &str) -> TefluResult<Module> {
    modules
        .find_by_slug(slug)
        .await?
        .ok_or_else(|| TefluError::NotFound {
            entity: "module".into(),
            id: slug.to_string(),
        })
}
