//! Permission domain model: the (role × module) capability matrix.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One of the four independent capabilities granted per (role, module).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Capability {
    Read,
    /// Create new records.
    Write,
    Update,
    Delete,
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Capability::Read => "read",
            Capability::Write => "write",
            Capability::Update => "update",
            Capability::Delete => "delete",
        })
    }
}

/// Capabilities a role holds on a module. The default is all-false:
/// no record means no access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CapabilitySet {
    pub can_read: bool,
    pub can_write: bool,
    pub can_update: bool,
    pub can_delete: bool,
}

impl CapabilitySet {
    pub const fn none() -> Self {
        Self {
            can_read: false,
            can_write: false,
            can_update: false,
            can_delete: false,
        }
    }

    pub const fn all() -> Self {
        Self {
            can_read: true,
            can_write: true,
            can_update: true,
            can_delete: true,
        }
    }

    pub fn allows(&self, capability: Capability) -> bool {
        match capability {
            Capability::Read => self.can_read,
            Capability::Write => self.can_write,
            Capability::Update => self.can_update,
            Capability::Delete => self.can_delete,
        }
    }
}

/// A stored grant. At most one exists per (role, module) pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Permission {
    pub id: String,
    pub role_id: Uuid,
    pub module_id: Uuid,
    pub capabilities: CapabilitySet,
    pub updated_at: DateTime<Utc>,
}

/// One row of a permission-matrix bulk update.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModuleGrant {
    pub module_id: Uuid,
    pub capabilities: CapabilitySet,
}

/// A matrix row joined with the module it refers to, for display.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatrixEntry {
    pub module_id: Uuid,
    pub module_name: String,
    pub module_slug: String,
    pub capabilities: CapabilitySet,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_deny_all() {
        let set = CapabilitySet::default();
        assert_eq!(set, CapabilitySet::none());
        for cap in [
            Capability::Read,
            Capability::Write,
            Capability::Update,
            Capability::Delete,
        ] {
            assert!(!set.allows(cap));
        }
    }

    #[test]
    fn capabilities_are_independent() {
        let set = CapabilitySet {
            can_read: true,
            can_write: false,
            can_update: true,
            can_delete: false,
        };
        assert!(set.allows(Capability::Read));
        assert!(!set.allows(Capability::Write));
        assert!(set.allows(Capability::Update));
        assert!(!set.allows(Capability::Delete));
    }

    #[test]
    fn serializes_with_field_names() {
        let json = serde_json::to_value(CapabilitySet::all()).unwrap();
        assert_eq!(json["can_delete"], serde_json::Value::Bool(true));
    }
}
