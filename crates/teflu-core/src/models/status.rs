//! Record lifecycle shared by soft-deletable entities.

use serde::{Deserialize, Serialize};

/// `Inactive` records are retained for history but excluded from every
/// query that asks for live data.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub enum RecordStatus {
    #[default]
    Active,
    Inactive,
}

impl RecordStatus {
    pub fn is_active(self) -> bool {
        self == RecordStatus::Active
    }
}
