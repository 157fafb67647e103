//! Actor (personnel record) domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::status::RecordStatus;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Actor {
    pub id: Uuid,
    pub payroll_number: String,
    pub first_name: String,
    pub last_name: String,
    pub second_last_name: Option<String>,
    pub email: String,
    pub position: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    /// URL returned by the external image store.
    pub image_url: Option<String>,
    pub role_id: Uuid,
    pub password_hash: String,
    pub status: RecordStatus,
    pub created_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Actor {
    /// Name shown to operators, e.g. in duplicate-scan messages.
    pub fn display_name(&self) -> &str {
        &self.first_name
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateActor {
    pub payroll_number: String,
    pub first_name: String,
    pub last_name: String,
    pub second_last_name: Option<String>,
    pub email: String,
    pub position: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub image_url: Option<String>,
    pub role_id: Uuid,
    /// Already hashed; repositories never see raw passwords.
    pub password_hash: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdateActor {
    pub payroll_number: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    /// `Some(Some(val))` = set, `Some(None)` = clear, `None` = no change.
    pub second_last_name: Option<Option<String>>,
    pub email: Option<String>,
    pub position: Option<String>,
    pub phone: Option<Option<String>>,
    pub address: Option<Option<String>>,
    pub image_url: Option<String>,
    pub role_id: Option<Uuid>,
    pub password_hash: Option<String>,
}
