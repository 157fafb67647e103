//! Tool (herramental) domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::status::RecordStatus;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tool {
    pub id: Uuid,
    /// Unique scan code printed on the tool.
    pub code: String,
    pub name: String,
    pub description: String,
    pub brand: String,
    pub image_url: Option<String>,
    pub status: RecordStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTool {
    pub code: String,
    pub name: String,
    pub description: String,
    pub brand: String,
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdateTool {
    pub code: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub brand: Option<String>,
    /// Only replaced when a new image was uploaded.
    pub image_url: Option<String>,
}
