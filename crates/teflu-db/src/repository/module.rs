//! SurrealDB implementation of [`ModuleRepository`].

use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use teflu_core::error::TefluResult;
use teflu_core::models::module::{CreateModule, Module};
use teflu_core::models::status::RecordStatus;
use teflu_core::repository::ModuleRepository;
use uuid::Uuid;

use super::{parse_status, parse_uuid, status_str};
use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct ModuleRow {
    record_id: String,
    name: String,
    slug: String,
    icon: Option<String>,
    position: u32,
    parent_id: Option<String>,
    status: String,
}

impl ModuleRow {
    fn try_into_module(self) -> Result<Module, DbError> {
        let parent_id = self
            .parent_id
            .as_deref()
            .map(|p| parse_uuid(p, "parent module"))
            .transpose()?;
        Ok(Module {
            id: parse_uuid(&self.record_id, "module")?,
            name: self.name,
            slug: self.slug,
            icon: self.icon,
            position: self.position,
            parent_id,
            status: parse_status(&self.status)?,
        })
    }
}

/// SurrealDB implementation of the Module repository.
#[derive(Clone)]
pub struct SurrealModuleRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealModuleRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> ModuleRepository for SurrealModuleRepository<C> {
    async fn create(&self, input: CreateModule) -> TefluResult<Module> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        self.db
            .query(
                "CREATE type::record('module', $id) SET \
                 name = $name, slug = $slug, icon = $icon, \
                 position = $position, parent_id = $parent_id, \
                 status = $status",
            )
            .bind(("id", id_str))
            .bind(("name", input.name.clone()))
            .bind(("slug", input.slug.clone()))
            .bind(("icon", input.icon.clone()))
            .bind(("position", input.position))
            .bind(("parent_id", input.parent_id.map(|p| p.to_string())))
            .bind(("status", status_str(RecordStatus::Active)))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| DbError::classify("module", e))?;

        Ok(Module {
            id,
            name: input.name,
            slug: input.slug,
            icon: input.icon,
            position: input.position,
            parent_id: input.parent_id,
            status: RecordStatus::Active,
        })
    }

    async fn get_by_id(&self, id: Uuid) -> TefluResult<Module> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query("SELECT meta::id(id) AS record_id, * FROM type::record('module', $id)")
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<ModuleRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "module".into(),
            id: id_str,
        })?;

        Ok(row.try_into_module()?)
    }

    async fn find_by_slug(&self, slug: &str) -> TefluResult<Option<Module>> {
        let mut result = self
            .db
            .query("SELECT meta::id(id) AS record_id, * FROM module WHERE slug = $slug LIMIT 1")
            .bind(("slug", slug.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<ModuleRow> = result.take(0).map_err(DbError::from)?;
        Ok(rows
            .into_iter()
            .next()
            .map(ModuleRow::try_into_module)
            .transpose()?)
    }

    async fn find_active_by_slug(&self, slug: &str) -> TefluResult<Option<Module>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM module \
                 WHERE slug = $slug AND status = 'Active' LIMIT 1",
            )
            .bind(("slug", slug.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<ModuleRow> = result.take(0).map_err(DbError::from)?;
        Ok(rows
            .into_iter()
            .next()
            .map(ModuleRow::try_into_module)
            .transpose()?)
    }

    async fn list_active(&self) -> TefluResult<Vec<Module>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM module \
                 WHERE status = 'Active' ORDER BY position ASC",
            )
            .await
            .map_err(DbError::from)?;

        let rows: Vec<ModuleRow> = result.take(0).map_err(DbError::from)?;

        let modules = rows
            .into_iter()
            .map(ModuleRow::try_into_module)
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(modules)
    }
}
