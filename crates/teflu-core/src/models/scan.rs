//! Scan record (registro de inventario) domain model.
//!
//! Scan records are append-only facts: a tool was confirmed present by
//! an actor during a shift occurrence.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::shift::ShiftOccurrence;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum ScanStatus {
    #[default]
    Ok,
    Discrepancy,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanRecord {
    pub id: Uuid,
    pub tool_id: Uuid,
    pub actor_id: Uuid,
    pub occurrence: ShiftOccurrence,
    pub status: ScanStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateScanRecord {
    pub tool_id: Uuid,
    pub actor_id: Uuid,
    pub occurrence: ShiftOccurrence,
    pub status: ScanStatus,
}
