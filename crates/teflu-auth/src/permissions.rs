//! Permission resolution: (role, module slug) to capability set.
//!
//! No record means no access. An unknown or inactive module slug resolves
//! to the same all-false set; neither is an error.

use std::collections::HashMap;

use dashmap::DashMap;
use teflu_core::error::TefluResult;
use teflu_core::models::module::Module;
use teflu_core::models::permission::{CapabilitySet, MatrixEntry};
use teflu_core::repository::{ModuleRepository, PermissionRepository};
use tracing::debug;
use uuid::Uuid;

#[derive(Clone)]
pub struct PermissionResolver<M: ModuleRepository, P: PermissionRepository> {
    module_repo: M,
    permission_repo: P,
}

impl<M: ModuleRepository, P: PermissionRepository> PermissionResolver<M, P> {
    pub fn new(module_repo: M, permission_repo: P) -> Self {
        Self {
            module_repo,
            permission_repo,
        }
    }

    /// Capabilities `role_id` holds on the module addressed by `module_slug`.
    pub async fn resolve(&self, role_id: Uuid, module_slug: &str) -> TefluResult<CapabilitySet> {
        let Some(module) = self.module_repo.find_active_by_slug(module_slug).await? else {
            debug!(%role_id, module = module_slug, "No active module for slug");
            return Ok(CapabilitySet::none());
        };

        let capabilities = self
            .permission_repo
            .find(role_id, module.id)
            .await?
            .map(|p| p.capabilities)
            .unwrap_or_default();

        debug!(%role_id, module = module_slug, ?capabilities, "Permissions resolved");
        Ok(capabilities)
    }

    /// The full matrix for a role: one entry per active module, in
    /// position order, with all-false for modules that have no record.
    pub async fn matrix(&self, role_id: Uuid) -> TefluResult<Vec<MatrixEntry>> {
        let modules = self.module_repo.list_active().await?;
        let mut granted: HashMap<Uuid, CapabilitySet> = self
            .permission_repo
            .list_for_role(role_id)
            .await?
            .into_iter()
            .map(|p| (p.module_id, p.capabilities))
            .collect();

        Ok(modules
            .into_iter()
            .map(|module| MatrixEntry {
                capabilities: granted.remove(&module.id).unwrap_or_default(),
                module_id: module.id,
                module_name: module.name,
                module_slug: module.slug,
            })
            .collect())
    }

    /// Active modules the role may read, ordered by position. Feeds the
    /// navigation menu.
    pub async fn readable_modules(&self, role_id: Uuid) -> TefluResult<Vec<Module>> {
        let readable: Vec<Uuid> = self
            .permission_repo
            .list_for_role(role_id)
            .await?
            .into_iter()
            .filter(|p| p.capabilities.can_read)
            .map(|p| p.module_id)
            .collect();

        Ok(self
            .module_repo
            .list_active()
            .await?
            .into_iter()
            .filter(|m| readable.contains(&m.id))
            .collect())
    }

    /// A memoizing view for the lifetime of one request.
    pub fn scope(&self) -> PermissionScope<'_, M, P> {
        PermissionScope {
            resolver: self,
            memo: DashMap::new(),
        }
    }
}

/// Request-scoped resolver. Each (role, slug) pair hits the store once;
/// dropping the scope discards everything it learned, so grant changes
/// are seen by the next request.
pub struct PermissionScope<'a, M: ModuleRepository, P: PermissionRepository> {
    resolver: &'a PermissionResolver<M, P>,
    memo: DashMap<(Uuid, String), CapabilitySet>,
}

impl<M: ModuleRepository, P: PermissionRepository> PermissionScope<'_, M, P> {
    pub async fn resolve(&self, role_id: Uuid, module_slug: &str) -> TefluResult<CapabilitySet> {
        let key = (role_id, module_slug.to_string());
        if let Some(capabilities) = self.memo.get(&key).map(|entry| *entry) {
            return Ok(capabilities);
        }

        let capabilities = self.resolver.resolve(role_id, module_slug).await?;
        self.memo.insert(key, capabilities);
        Ok(capabilities)
    }
}
