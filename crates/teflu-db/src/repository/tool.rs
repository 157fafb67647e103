//! SurrealDB implementation of [`ToolRepository`].

use chrono::{DateTime, Utc};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use teflu_core::error::TefluResult;
use teflu_core::models::status::RecordStatus;
use teflu_core::models::tool::{CreateTool, Tool, UpdateTool};
use teflu_core::repository::{PaginatedResult, Pagination, ToolRepository};
use uuid::Uuid;

use super::{CountRow, parse_status, parse_uuid, status_str};
use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct ToolRow {
    code: String,
    name: String,
    description: String,
    brand: String,
    image_url: Option<String>,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, SurrealValue)]
struct ToolRowWithId {
    record_id: String,
    code: String,
    name: String,
    description: String,
    brand: String,
    image_url: Option<String>,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ToolRow {
    fn into_tool(self, id: Uuid) -> Result<Tool, DbError> {
        Ok(Tool {
            id,
            code: self.code,
            name: self.name,
            description: self.description,
            brand: self.brand,
            image_url: self.image_url,
            status: parse_status(&self.status)?,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

impl ToolRowWithId {
    fn try_into_tool(self) -> Result<Tool, DbError> {
        let id = parse_uuid(&self.record_id, "tool")?;
        ToolRow {
            code: self.code,
            name: self.name,
            description: self.description,
            brand: self.brand,
            image_url: self.image_url,
            status: self.status,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
        .into_tool(id)
    }
}

/// SurrealDB implementation of the Tool repository.
#[derive(Clone)]
pub struct SurrealToolRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealToolRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> ToolRepository for SurrealToolRepository<C> {
    async fn create(&self, input: CreateTool) -> TefluResult<Tool> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "CREATE type::record('tool', $id) SET \
                 code = $code, name = $name, \
                 description = $description, brand = $brand, \
                 image_url = $image_url, status = $status",
            )
            .bind(("id", id_str.clone()))
            .bind(("code", input.code))
            .bind(("name", input.name))
            .bind(("description", input.description))
            .bind(("brand", input.brand))
            .bind(("image_url", input.image_url))
            .bind(("status", status_str(RecordStatus::Active)))
            .await
            .map_err(DbError::from)?;

        let mut result = result.check().map_err(|e| DbError::classify("tool", e))?;

        let rows: Vec<ToolRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "tool".into(),
            id: id_str,
        })?;

        Ok(row.into_tool(id)?)
    }

    async fn get_by_id(&self, id: Uuid) -> TefluResult<Tool> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query("SELECT * FROM type::record('tool', $id)")
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<ToolRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "tool".into(),
            id: id_str,
        })?;

        Ok(row.into_tool(id)?)
    }

    async fn find_active_by_code(&self, code: &str) -> TefluResult<Option<Tool>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM tool \
                 WHERE code = $code AND status = 'Active' LIMIT 1",
            )
            .bind(("code", code.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<ToolRowWithId> = result.take(0).map_err(DbError::from)?;
        Ok(rows
            .into_iter()
            .next()
            .map(ToolRowWithId::try_into_tool)
            .transpose()?)
    }

    async fn update(&self, id: Uuid, input: UpdateTool) -> TefluResult<Tool> {
        let id_str = id.to_string();

        let mut sets = Vec::new();
        if input.code.is_some() {
            sets.push("code = $code");
        }
        if input.name.is_some() {
            sets.push("name = $name");
        }
        if input.description.is_some() {
            sets.push("description = $description");
        }
        if input.brand.is_some() {
            sets.push("brand = $brand");
        }
        if input.image_url.is_some() {
            sets.push("image_url = $image_url");
        }
        sets.push("updated_at = time::now()");

        let query = format!(
            "UPDATE type::record('tool', $id) SET {}",
            sets.join(", ")
        );

        let mut builder = self.db.query(&query).bind(("id", id_str.clone()));

        if let Some(code) = input.code {
            builder = builder.bind(("code", code));
        }
        if let Some(name) = input.name {
            builder = builder.bind(("name", name));
        }
        if let Some(description) = input.description {
            builder = builder.bind(("description", description));
        }
        if let Some(brand) = input.brand {
            builder = builder.bind(("brand", brand));
        }
        if let Some(image_url) = input.image_url {
            builder = builder.bind(("image_url", image_url));
        }

        let result = builder.await.map_err(DbError::from)?;
        let mut result = result.check().map_err(|e| DbError::classify("tool", e))?;

        let rows: Vec<ToolRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "tool".into(),
            id: id_str,
        })?;

        Ok(row.into_tool(id)?)
    }

    async fn deactivate(&self, id: Uuid) -> TefluResult<()> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query(
                "UPDATE type::record('tool', $id) SET \
                 status = 'Inactive', updated_at = time::now()",
            )
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| DbError::classify("tool", e))?;

        let rows: Vec<ToolRow> = result.take(0).map_err(DbError::from)?;
        if rows.is_empty() {
            return Err(DbError::NotFound {
                entity: "tool".into(),
                id: id_str,
            }
            .into());
        }

        Ok(())
    }

    async fn list_active(&self, pagination: Pagination) -> TefluResult<PaginatedResult<Tool>> {
        let total = self.count_active().await?;

        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM tool \
                 WHERE status = 'Active' \
                 ORDER BY code ASC \
                 LIMIT $limit START $offset",
            )
            .bind(("limit", pagination.limit))
            .bind(("offset", pagination.offset))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<ToolRowWithId> = result.take(0).map_err(DbError::from)?;

        let items = rows
            .into_iter()
            .map(|row| row.try_into_tool())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(PaginatedResult {
            items,
            total,
            offset: pagination.offset,
            limit: pagination.limit,
        })
    }

    async fn count_active(&self) -> TefluResult<u64> {
        let mut result = self
            .db
            .query("SELECT count() AS total FROM tool WHERE status = 'Active' GROUP ALL")
            .await
            .map_err(DbError::from)?;

        let rows: Vec<CountRow> = result.take(0).map_err(DbError::from)?;
        Ok(rows.first().map(|r| r.total).unwrap_or(0))
    }
}
