//! Module domain model: a slug-addressed protected section of the
//! application and the unit of RBAC granularity.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::status::RecordStatus;

/// Slugs of the modules the application ships with.
pub mod slugs {
    pub const PERSONNEL: &str = "personas";
    pub const ROLES: &str = "roles";
    pub const INVENTORY: &str = "inventarios";
    pub const TOOLS: &str = "herramentales";
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Module {
    pub id: Uuid,
    pub name: String,
    /// Stable lookup key used by authorization.
    pub slug: String,
    pub icon: Option<String>,
    /// Display ordering among siblings.
    pub position: u32,
    /// Navigation grouping only; authorization looks at the module's own
    /// slug and ignores the hierarchy.
    pub parent_id: Option<Uuid>,
    pub status: RecordStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateModule {
    pub name: String,
    pub slug: String,
    pub icon: Option<String>,
    pub position: u32,
    pub parent_id: Option<Uuid>,
}
