//! The authorization gate.
//!
//! Every protected operation calls [`Gatekeeper::require_capability`]
//! (or one of the deletion checks built on it) before touching the store.
//! A missing session is `Unauthenticated`; anything that prevents the
//! caller's role from being resolved is treated as an empty grant and
//! denied as `Unauthorized`.

use std::sync::Arc;

use teflu_core::error::{TefluError, TefluResult};
use teflu_core::identity::Identity;
use teflu_core::models::module::slugs;
use teflu_core::models::permission::{Capability, CapabilitySet};
use teflu_core::models::role::Role;
use teflu_core::repository::{
    ActorRepository, ModuleRepository, PermissionRepository, RoleRepository,
};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::config::AuthzConfig;
use crate::permissions::PermissionResolver;

/// Proof that the gate allowed an operation, carrying the caller's
/// resolved role.
#[derive(Debug, Clone)]
pub struct Authorized {
    pub actor_id: Uuid,
    pub role_id: Uuid,
    pub role_name: String,
    pub capabilities: CapabilitySet,
}

/// The enforcement point consulted before any protected side effect.
pub trait Gatekeeper: Send + Sync {
    /// True when `role` is the distinguished administrator role.
    fn is_admin_role(&self, role: &Role) -> bool;

    /// Allow the call only if the session's actor holds `capability` on
    /// `module_slug`.
    fn require_capability(
        &self,
        session: Option<&Identity>,
        module_slug: &str,
        capability: Capability,
    ) -> impl Future<Output = TefluResult<Authorized>> + Send;

    /// Delete permission on `roles`, plus the rules no grant overrides:
    /// the administrator role and roles with active members stay.
    fn require_role_deletion(
        &self,
        session: Option<&Identity>,
        role_id: Uuid,
    ) -> impl Future<Output = TefluResult<Authorized>> + Send;

    /// Delete permission on `personas`, except on the caller's own record.
    fn require_actor_deletion(
        &self,
        session: Option<&Identity>,
        actor_id: Uuid,
    ) -> impl Future<Output = TefluResult<Authorized>> + Send;
}

impl<G: Gatekeeper + ?Sized> Gatekeeper for Arc<G> {
    fn is_admin_role(&self, role: &Role) -> bool {
        (**self).is_admin_role(role)
    }

    fn require_capability(
        &self,
        session: Option<&Identity>,
        module_slug: &str,
        capability: Capability,
    ) -> impl Future<Output = TefluResult<Authorized>> + Send {
        (**self).require_capability(session, module_slug, capability)
    }

    fn require_role_deletion(
        &self,
        session: Option<&Identity>,
        role_id: Uuid,
    ) -> impl Future<Output = TefluResult<Authorized>> + Send {
        (**self).require_role_deletion(session, role_id)
    }

    fn require_actor_deletion(
        &self,
        session: Option<&Identity>,
        actor_id: Uuid,
    ) -> impl Future<Output = TefluResult<Authorized>> + Send {
        (**self).require_actor_deletion(session, actor_id)
    }
}

pub struct AuthorizationGate<A, R, M, P>
where
    A: ActorRepository,
    R: RoleRepository,
    M: ModuleRepository,
    P: PermissionRepository,
{
    actor_repo: A,
    role_repo: R,
    resolver: PermissionResolver<M, P>,
    config: AuthzConfig,
}

impl<A, R, M, P> AuthorizationGate<A, R, M, P>
where
    A: ActorRepository,
    R: RoleRepository,
    M: ModuleRepository,
    P: PermissionRepository,
{
    pub fn new(
        actor_repo: A,
        role_repo: R,
        resolver: PermissionResolver<M, P>,
        config: AuthzConfig,
    ) -> Self {
        Self {
            actor_repo,
            role_repo,
            resolver,
            config,
        }
    }

    pub fn resolver(&self) -> &PermissionResolver<M, P> {
        &self.resolver
    }

    /// The session actor's current role, or `None` when the actor or the
    /// role is missing or inactive.
    async fn current_role(&self, identity: &Identity) -> TefluResult<Option<Role>> {
        let actor = match self.actor_repo.get_by_id(identity.actor_id).await {
            Ok(actor) => actor,
            Err(TefluError::NotFound { .. }) => return Ok(None),
            Err(e) => return Err(e),
        };
        if !actor.status.is_active() {
            return Ok(None);
        }

        match self.role_repo.get_by_id(actor.role_id).await {
            Ok(role) if role.status.is_active() => Ok(Some(role)),
            Ok(_) | Err(TefluError::NotFound { .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }
}

impl<A, R, M, P> Gatekeeper for AuthorizationGate<A, R, M, P>
where
    A: ActorRepository,
    R: RoleRepository,
    M: ModuleRepository,
    P: PermissionRepository,
{
    fn is_admin_role(&self, role: &Role) -> bool {
        role.name == self.config.admin_role_name
    }

    async fn require_capability(
        &self,
        session: Option<&Identity>,
        module_slug: &str,
        capability: Capability,
    ) -> TefluResult<Authorized> {
        let Some(identity) = session else {
            debug!(module = module_slug, %capability, "Denied: no session");
            return Err(TefluError::Unauthenticated);
        };

        let denied = || TefluError::Unauthorized {
            module: module_slug.to_string(),
            capability,
        };

        let Some(role) = self.current_role(identity).await? else {
            warn!(
                actor_id = %identity.actor_id,
                module = module_slug,
                %capability,
                "Denied: actor or role unavailable"
            );
            return Err(denied());
        };

        let capabilities = self.resolver.resolve(role.id, module_slug).await?;
        if !capabilities.allows(capability) {
            warn!(
                actor_id = %identity.actor_id,
                role = %role.name,
                module = module_slug,
                %capability,
                "Denied: capability not granted"
            );
            return Err(denied());
        }

        Ok(Authorized {
            actor_id: identity.actor_id,
            role_id: role.id,
            role_name: role.name,
            capabilities,
        })
    }

    async fn require_role_deletion(
        &self,
        session: Option<&Identity>,
        role_id: Uuid,
    ) -> TefluResult<Authorized> {
        let authorized = self
            .require_capability(session, slugs::ROLES, Capability::Delete)
            .await?;

        let role = self.role_repo.get_by_id(role_id).await?;
        if self.is_admin_role(&role) {
            warn!(actor_id = %authorized.actor_id, "Refused: delete administrator role");
            return Err(TefluError::business_rule(format!(
                "the {} role cannot be deleted",
                role.name
            )));
        }

        let members = self.actor_repo.count_active_by_role(role_id).await?;
        if members > 0 {
            warn!(
                actor_id = %authorized.actor_id,
                role = %role.name,
                members,
                "Refused: role still assigned"
            );
            return Err(TefluError::business_rule(format!(
                "role {} is assigned to {members} active actor(s)",
                role.name
            )));
        }

        Ok(authorized)
    }

    async fn require_actor_deletion(
        &self,
        session: Option<&Identity>,
        actor_id: Uuid,
    ) -> TefluResult<Authorized> {
        let authorized = self
            .require_capability(session, slugs::PERSONNEL, Capability::Delete)
            .await?;

        if authorized.actor_id == actor_id {
            warn!(%actor_id, "Refused: self-deletion");
            return Err(TefluError::business_rule("you cannot delete your own record"));
        }

        Ok(authorized)
    }
}
