//! Gated CRUD for the tool catalog (module `herramentales`).

use teflu_auth::Gatekeeper;
use teflu_core::error::{TefluError, TefluResult};
use teflu_core::identity::Identity;
use teflu_core::models::module::slugs;
use teflu_core::models::permission::Capability;
use teflu_core::models::tool::{CreateTool, Tool, UpdateTool};
use teflu_core::repository::{PaginatedResult, Pagination, ToolRepository};
use tracing::info;
use uuid::Uuid;

pub struct ToolCatalog<T: ToolRepository, G: Gatekeeper> {
    tool_repo: T,
    gate: G,
}

fn require_text(field: &str, value: &str) -> TefluResult<()> {
    if value.trim().is_empty() {
        return Err(TefluError::validation(format!("{field} is required")));
    }
    Ok(())
}

impl<T: ToolRepository, G: Gatekeeper> ToolCatalog<T, G> {
    pub fn new(tool_repo: T, gate: G) -> Self {
        Self { tool_repo, gate }
    }

    pub async fn list(
        &self,
        session: Option<&Identity>,
        pagination: Pagination,
    ) -> TefluResult<PaginatedResult<Tool>> {
        self.gate
            .require_capability(session, slugs::TOOLS, Capability::Read)
            .await?;
        self.tool_repo.list_active(pagination).await
    }

    pub async fn create(&self, session: Option<&Identity>, input: CreateTool) -> TefluResult<Tool> {
        let authorized = self
            .gate
            .require_capability(session, slugs::TOOLS, Capability::Write)
            .await?;

        require_text("code", &input.code)?;
        require_text("name", &input.name)?;

        let tool = self
            .tool_repo
            .create(CreateTool {
                code: input.code.trim().to_string(),
                ..input
            })
            .await?;

        info!(tool_id = %tool.id, code = %tool.code, actor_id = %authorized.actor_id, "Tool created");
        Ok(tool)
    }

    pub async fn update(
        &self,
        session: Option<&Identity>,
        id: Uuid,
        input: UpdateTool,
    ) -> TefluResult<Tool> {
        let authorized = self
            .gate
            .require_capability(session, slugs::TOOLS, Capability::Update)
            .await?;

        if let Some(code) = &input.code {
            require_text("code", code)?;
        }
        if let Some(name) = &input.name {
            require_text("name", name)?;
        }

        let tool = self
            .tool_repo
            .update(
                id,
                UpdateTool {
                    code: input.code.map(|c| c.trim().to_string()),
                    ..input
                },
            )
            .await?;

        info!(tool_id = %id, actor_id = %authorized.actor_id, "Tool updated");
        Ok(tool)
    }

    /// Soft delete; scan history keeps pointing at the tool.
    pub async fn delete(&self, session: Option<&Identity>, id: Uuid) -> TefluResult<()> {
        let authorized = self
            .gate
            .require_capability(session, slugs::TOOLS, Capability::Delete)
            .await?;

        self.tool_repo.deactivate(id).await?;

        info!(tool_id = %id, actor_id = %authorized.actor_id, "Tool deactivated");
        Ok(())
    }
}
