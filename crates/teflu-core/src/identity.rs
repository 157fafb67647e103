//! The authenticated caller, extracted once per request by the web layer
//! and passed explicitly into every gated operation.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub actor_id: Uuid,
    /// Role name at the time the session was issued. Informational only;
    /// authorization always re-reads the actor's current role.
    pub role_name: String,
}

impl Identity {
    pub fn new(actor_id: Uuid, role_name: impl Into<String>) -> Self {
        Self {
            actor_id,
            role_name: role_name.into(),
        }
    }
}
