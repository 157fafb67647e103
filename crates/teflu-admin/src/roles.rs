//! Role management (module `roles`), including the permission matrix
//! editor and actor role reassignment.

use std::collections::HashSet;

use teflu_auth::{Gatekeeper, PermissionResolver};
use teflu_core::error::{TefluError, TefluResult};
use teflu_core::identity::Identity;
use teflu_core::models::actor::{Actor, UpdateActor};
use teflu_core::models::module::{Module, slugs};
use teflu_core::models::permission::{Capability, MatrixEntry, ModuleGrant};
use teflu_core::models::role::{CreateRole, Role, UpdateRole};
use teflu_core::repository::{
    ActorRepository, ModuleRepository, PaginatedResult, Pagination, PermissionRepository,
    RoleRepository,
};
use tracing::{info, warn};
use uuid::Uuid;

const MIN_ROLE_NAME_LEN: usize = 3;

fn validate_name(name: &str) -> TefluResult<String> {
    let name = name.trim();
    if name.chars().count() < MIN_ROLE_NAME_LEN {
        return Err(TefluError::validation(format!(
            "role name must be at least {MIN_ROLE_NAME_LEN} characters"
        )));
    }
    Ok(name.to_string())
}

pub struct RoleService<R, A, M, P, G>
where
    R: RoleRepository,
    A: ActorRepository,
    M: ModuleRepository,
    P: PermissionRepository,
    G: Gatekeeper,
{
    role_repo: R,
    actor_repo: A,
    module_repo: M,
    permission_repo: P,
    resolver: PermissionResolver<M, P>,
    gate: G,
}

impl<R, A, M, P, G> RoleService<R, A, M, P, G>
where
    R: RoleRepository,
    A: ActorRepository,
    M: ModuleRepository + Clone,
    P: PermissionRepository + Clone,
    G: Gatekeeper,
{
    pub fn new(role_repo: R, actor_repo: A, module_repo: M, permission_repo: P, gate: G) -> Self {
        let resolver = PermissionResolver::new(module_repo.clone(), permission_repo.clone());
        Self {
            role_repo,
            actor_repo,
            module_repo,
            permission_repo,
            resolver,
            gate,
        }
    }

    pub async fn list(
        &self,
        session: Option<&Identity>,
        pagination: Pagination,
    ) -> TefluResult<PaginatedResult<Role>> {
        self.gate
            .require_capability(session, slugs::ROLES, Capability::Read)
            .await?;
        self.role_repo.list_active(pagination).await
    }

    pub async fn create(&self, session: Option<&Identity>, input: CreateRole) -> TefluResult<Role> {
        let authorized = self
            .gate
            .require_capability(session, slugs::ROLES, Capability::Write)
            .await?;

        let name = validate_name(&input.name)?;
        let role = self
            .role_repo
            .create(CreateRole {
                name,
                description: input.description.trim().to_string(),
            })
            .await?;

        info!(role_id = %role.id, role = %role.name, actor_id = %authorized.actor_id, "Role created");
        Ok(role)
    }

    /// The administrator role keeps its name and stays active: the gate
    /// recognises it by name.
    pub async fn update(
        &self,
        session: Option<&Identity>,
        id: Uuid,
        input: UpdateRole,
    ) -> TefluResult<Role> {
        let authorized = self
            .gate
            .require_capability(session, slugs::ROLES, Capability::Update)
            .await?;

        let name = input.name.as_deref().map(validate_name).transpose()?;

        let current = self.role_repo.get_by_id(id).await?;
        if self.gate.is_admin_role(&current) {
            let renamed = name.as_ref().is_some_and(|n| *n != current.name);
            let deactivated = input.status.is_some_and(|s| !s.is_active());
            if renamed || deactivated {
                warn!(actor_id = %authorized.actor_id, "Refused: alter administrator role");
                return Err(TefluError::business_rule(format!(
                    "the {} role cannot be renamed or deactivated",
                    current.name
                )));
            }
        }

        let role = self
            .role_repo
            .update(
                id,
                UpdateRole {
                    name,
                    description: input.description.map(|d| d.trim().to_string()),
                    status: input.status,
                },
            )
            .await?;

        info!(role_id = %id, actor_id = %authorized.actor_id, "Role updated");
        Ok(role)
    }

    /// Hard delete, subject to the gate's role-deletion rules.
    pub async fn delete(&self, session: Option<&Identity>, id: Uuid) -> TefluResult<()> {
        let authorized = self.gate.require_role_deletion(session, id).await?;

        self.role_repo.delete(id).await?;

        info!(role_id = %id, actor_id = %authorized.actor_id, "Role deleted");
        Ok(())
    }

    /// Active modules, for building the matrix editor.
    pub async fn modules(&self, session: Option<&Identity>) -> TefluResult<Vec<Module>> {
        self.gate
            .require_capability(session, slugs::ROLES, Capability::Read)
            .await?;
        self.module_repo.list_active().await
    }

    pub async fn matrix(
        &self,
        session: Option<&Identity>,
        role_id: Uuid,
    ) -> TefluResult<Vec<MatrixEntry>> {
        self.gate
            .require_capability(session, slugs::ROLES, Capability::Read)
            .await?;
        self.role_repo.get_by_id(role_id).await?;
        self.resolver.matrix(role_id).await
    }

    /// Replace the role's grants for every module named in `grants`.
    ///
    /// All rows are validated first and then written in one transaction,
    /// so a rejected matrix leaves the stored one untouched.
    pub async fn apply_matrix(
        &self,
        session: Option<&Identity>,
        role_id: Uuid,
        grants: Vec<ModuleGrant>,
    ) -> TefluResult<()> {
        let authorized = self
            .gate
            .require_capability(session, slugs::ROLES, Capability::Update)
            .await?;

        let role = self.role_repo.get_by_id(role_id).await?;
        if self.gate.is_admin_role(&role) {
            warn!(actor_id = %authorized.actor_id, "Refused: edit administrator grants");
            return Err(TefluError::business_rule(format!(
                "the permissions of the {} role cannot be changed",
                role.name
            )));
        }

        let known: HashSet<Uuid> = self
            .module_repo
            .list_active()
            .await?
            .into_iter()
            .map(|m| m.id)
            .collect();
        let mut seen = HashSet::with_capacity(grants.len());
        for grant in &grants {
            if !known.contains(&grant.module_id) {
                return Err(TefluError::validation(format!(
                    "unknown or inactive module {}",
                    grant.module_id
                )));
            }
            if !seen.insert(grant.module_id) {
                return Err(TefluError::validation(format!(
                    "module {} appears more than once",
                    grant.module_id
                )));
            }
        }

        let rows = grants.len();
        self.permission_repo.apply_matrix(role_id, grants).await?;

        info!(
            role_id = %role_id,
            rows,
            actor_id = %authorized.actor_id,
            "Permission matrix applied"
        );
        Ok(())
    }

    /// Move an actor to another active role.
    pub async fn reassign(
        &self,
        session: Option<&Identity>,
        actor_id: Uuid,
        role_id: Uuid,
    ) -> TefluResult<Actor> {
        let authorized = self
            .gate
            .require_capability(session, slugs::ROLES, Capability::Update)
            .await?;

        let role = self.role_repo.get_by_id(role_id).await?;
        if !role.status.is_active() {
            return Err(TefluError::validation(format!("role {} is inactive", role.name)));
        }

        let actor = self
            .actor_repo
            .update(
                actor_id,
                UpdateActor {
                    role_id: Some(role_id),
                    ..Default::default()
                },
            )
            .await?;

        info!(
            %actor_id,
            role = %role.name,
            by = %authorized.actor_id,
            "Actor reassigned"
        );
        Ok(actor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_names_are_rejected() {
        assert!(validate_name("ab").is_err());
        assert!(validate_name("  ab  ").is_err());
    }

    #[test]
    fn names_are_trimmed() {
        assert_eq!(validate_name("  Tecnico ").unwrap(), "Tecnico");
    }

    #[test]
    fn length_counts_characters() {
        assert_eq!(validate_name("Jefé").unwrap(), "Jefé");
        assert!(validate_name("é").is_err());
    }
}
