//! Repository trait definitions for data access abstraction.
//!
//! All repository operations are async. Methods named `*_active` only
//! ever see records whose status is `Active`; that filter is part of
//! their contract, not an incidental query detail.

use uuid::Uuid;

use crate::error::TefluResult;
use crate::models::{
    actor::{Actor, CreateActor, UpdateActor},
    module::{CreateModule, Module},
    permission::{ModuleGrant, Permission},
    role::{CreateRole, Role, UpdateRole},
    scan::{CreateScanRecord, ScanRecord},
    tool::{CreateTool, Tool, UpdateTool},
};
use crate::shift::ShiftOccurrence;

/// Pagination parameters for list queries.
#[derive(Debug, Clone)]
pub struct Pagination {
    pub offset: u64,
    pub limit: u64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            offset: 0,
            limit: 50,
        }
    }
}

/// A paginated result set.
#[derive(Debug, Clone)]
pub struct PaginatedResult<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub offset: u64,
    pub limit: u64,
}

// ---------------------------------------------------------------------------
// RBAC
// ---------------------------------------------------------------------------

pub trait RoleRepository: Send + Sync {
    fn create(&self, input: CreateRole) -> impl Future<Output = TefluResult<Role>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = TefluResult<Role>> + Send;
    fn get_by_name(&self, name: &str) -> impl Future<Output = TefluResult<Role>> + Send;
    fn update(
        &self,
        id: Uuid,
        input: UpdateRole,
    ) -> impl Future<Output = TefluResult<Role>> + Send;
    /// Hard delete. Removes the role's permission records with it.
    /// Refused with `BusinessRule` while any active actor holds the role;
    /// that check runs in the same transaction as the delete.
    fn delete(&self, id: Uuid) -> impl Future<Output = TefluResult<()>> + Send;
    fn list_active(
        &self,
        pagination: Pagination,
    ) -> impl Future<Output = TefluResult<PaginatedResult<Role>>> + Send;
}

pub trait ModuleRepository: Send + Sync {
    fn create(&self, input: CreateModule) -> impl Future<Output = TefluResult<Module>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = TefluResult<Module>> + Send;
    /// The module carrying the slug, active or not.
    fn find_by_slug(&self, slug: &str)
    -> impl Future<Output = TefluResult<Option<Module>>> + Send;
    /// `None` when no active module carries the slug.
    fn find_active_by_slug(
        &self,
        slug: &str,
    ) -> impl Future<Output = TefluResult<Option<Module>>> + Send;
    /// Active modules ordered by `position`.
    fn list_active(&self) -> impl Future<Output = TefluResult<Vec<Module>>> + Send;
}

pub trait PermissionRepository: Send + Sync {
    /// The unique record for the pair, if any.
    fn find(
        &self,
        role_id: Uuid,
        module_id: Uuid,
    ) -> impl Future<Output = TefluResult<Option<Permission>>> + Send;
    fn list_for_role(
        &self,
        role_id: Uuid,
    ) -> impl Future<Output = TefluResult<Vec<Permission>>> + Send;
    /// Upsert every row of the matrix in a single transaction. Either all
    /// rows are written or none are.
    fn apply_matrix(
        &self,
        role_id: Uuid,
        grants: Vec<ModuleGrant>,
    ) -> impl Future<Output = TefluResult<()>> + Send;
}

// ---------------------------------------------------------------------------
// Personnel
// ---------------------------------------------------------------------------

pub trait ActorRepository: Send + Sync {
    fn create(&self, input: CreateActor) -> impl Future<Output = TefluResult<Actor>> + Send;
    /// Returns the actor regardless of status.
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = TefluResult<Actor>> + Send;
    fn find_active_by_email(
        &self,
        email: &str,
    ) -> impl Future<Output = TefluResult<Option<Actor>>> + Send;
    fn update(
        &self,
        id: Uuid,
        input: UpdateActor,
    ) -> impl Future<Output = TefluResult<Actor>> + Send;
    /// Soft-delete: sets status to Inactive and stamps `deleted_at`.
    fn deactivate(&self, id: Uuid) -> impl Future<Output = TefluResult<()>> + Send;
    fn list_active(
        &self,
        pagination: Pagination,
    ) -> impl Future<Output = TefluResult<PaginatedResult<Actor>>> + Send;
    fn count_active_by_role(&self, role_id: Uuid)
    -> impl Future<Output = TefluResult<u64>> + Send;
}

// ---------------------------------------------------------------------------
// Inventory
// ---------------------------------------------------------------------------

pub trait ToolRepository: Send + Sync {
    fn create(&self, input: CreateTool) -> impl Future<Output = TefluResult<Tool>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = TefluResult<Tool>> + Send;
    fn find_active_by_code(
        &self,
        code: &str,
    ) -> impl Future<Output = TefluResult<Option<Tool>>> + Send;
    fn update(
        &self,
        id: Uuid,
        input: UpdateTool,
    ) -> impl Future<Output = TefluResult<Tool>> + Send;
    /// Soft-delete: tools referenced by scan history are never removed.
    fn deactivate(&self, id: Uuid) -> impl Future<Output = TefluResult<()>> + Send;
    fn list_active(
        &self,
        pagination: Pagination,
    ) -> impl Future<Output = TefluResult<PaginatedResult<Tool>>> + Send;
    fn count_active(&self) -> impl Future<Output = TefluResult<u64>> + Send;
}

pub trait ScanRepository: Send + Sync {
    /// Insert a scan record. Fails with `AlreadyExists` when the store's
    /// uniqueness constraint on (tool, shift, shift date) rejects it.
    fn create(
        &self,
        input: CreateScanRecord,
    ) -> impl Future<Output = TefluResult<ScanRecord>> + Send;
    fn find_in_occurrence(
        &self,
        tool_id: Uuid,
        occurrence: ShiftOccurrence,
    ) -> impl Future<Output = TefluResult<Option<ScanRecord>>> + Send;
    /// Number of distinct tools with a record in the occurrence.
    fn count_distinct_tools(
        &self,
        occurrence: ShiftOccurrence,
    ) -> impl Future<Output = TefluResult<u64>> + Send;
}
