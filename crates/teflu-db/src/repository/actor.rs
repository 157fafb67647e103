//! SurrealDB implementation of [`ActorRepository`].
//!
//! Passwords arrive already hashed; this layer only stores them.

use chrono::{DateTime, Utc};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use teflu_core::error::TefluResult;
use teflu_core::models::actor::{Actor, CreateActor, UpdateActor};
use teflu_core::models::status::RecordStatus;
use teflu_core::repository::{ActorRepository, PaginatedResult, Pagination};
use uuid::Uuid;

use super::{CountRow, parse_status, parse_uuid, status_str};
use crate::error::DbError;

/// DB-side row struct for queries where the UUID is already known.
#[derive(Debug, SurrealValue)]
struct ActorRow {
    payroll_number: String,
    first_name: String,
    last_name: String,
    second_last_name: Option<String>,
    email: String,
    position: String,
    phone: Option<String>,
    address: Option<String>,
    image_url: Option<String>,
    role_id: String,
    password_hash: String,
    status: String,
    created_at: DateTime<Utc>,
    deleted_at: Option<DateTime<Utc>>,
}

/// DB-side row struct that includes the record ID via `meta::id(id)`.
#[derive(Debug, SurrealValue)]
struct ActorRowWithId {
    record_id: String,
    payroll_number: String,
    first_name: String,
    last_name: String,
    second_last_name: Option<String>,
    email: String,
    position: String,
    phone: Option<String>,
    address: Option<String>,
    image_url: Option<String>,
    role_id: String,
    password_hash: String,
    status: String,
    created_at: DateTime<Utc>,
    deleted_at: Option<DateTime<Utc>>,
}

impl ActorRow {
    fn into_actor(self, id: Uuid) -> Result<Actor, DbError> {
        Ok(Actor {
            id,
            payroll_number: self.payroll_number,
            first_name: self.first_name,
            last_name: self.last_name,
            second_last_name: self.second_last_name,
            email: self.email,
            position: self.position,
            phone: self.phone,
            address: self.address,
            image_url: self.image_url,
            role_id: parse_uuid(&self.role_id, "role")?,
            password_hash: self.password_hash,
            status: parse_status(&self.status)?,
            created_at: self.created_at,
            deleted_at: self.deleted_at,
        })
    }
}

impl ActorRowWithId {
    fn try_into_actor(self) -> Result<Actor, DbError> {
        let id = parse_uuid(&self.record_id, "actor")?;
        ActorRow {
            payroll_number: self.payroll_number,
            first_name: self.first_name,
            last_name: self.last_name,
            second_last_name: self.second_last_name,
            email: self.email,
            position: self.position,
            phone: self.phone,
            address: self.address,
            image_url: self.image_url,
            role_id: self.role_id,
            password_hash: self.password_hash,
            status: self.status,
            created_at: self.created_at,
            deleted_at: self.deleted_at,
        }
        .into_actor(id)
    }
}

/// SurrealDB implementation of the Actor repository.
#[derive(Clone)]
pub struct SurrealActorRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealActorRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> ActorRepository for SurrealActorRepository<C> {
    async fn create(&self, input: CreateActor) -> TefluResult<Actor> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "CREATE type::record('actor', $id) SET \
                 payroll_number = $payroll_number, \
                 first_name = $first_name, last_name = $last_name, \
                 second_last_name = $second_last_name, \
                 email = $email, position = $position, \
                 phone = $phone, address = $address, \
                 image_url = $image_url, role_id = $role_id, \
                 password_hash = $password_hash, status = $status, \
                 deleted_at = NONE",
            )
            .bind(("id", id_str.clone()))
            .bind(("payroll_number", input.payroll_number))
            .bind(("first_name", input.first_name))
            .bind(("last_name", input.last_name))
            .bind(("second_last_name", input.second_last_name))
            .bind(("email", input.email))
            .bind(("position", input.position))
            .bind(("phone", input.phone))
            .bind(("address", input.address))
            .bind(("image_url", input.image_url))
            .bind(("role_id", input.role_id.to_string()))
            .bind(("password_hash", input.password_hash))
            .bind(("status", status_str(RecordStatus::Active)))
            .await
            .map_err(DbError::from)?;

        let mut result = result.check().map_err(|e| DbError::classify("actor", e))?;

        let rows: Vec<ActorRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "actor".into(),
            id: id_str,
        })?;

        Ok(row.into_actor(id)?)
    }

    async fn get_by_id(&self, id: Uuid) -> TefluResult<Actor> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query("SELECT * FROM type::record('actor', $id)")
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<ActorRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "actor".into(),
            id: id_str,
        })?;

        Ok(row.into_actor(id)?)
    }

    async fn find_active_by_email(&self, email: &str) -> TefluResult<Option<Actor>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM actor \
                 WHERE email = $email AND status = 'Active' LIMIT 1",
            )
            .bind(("email", email.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<ActorRowWithId> = result.take(0).map_err(DbError::from)?;
        Ok(rows
            .into_iter()
            .next()
            .map(ActorRowWithId::try_into_actor)
            .transpose()?)
    }

    async fn update(&self, id: Uuid, input: UpdateActor) -> TefluResult<Actor> {
        let id_str = id.to_string();

        let mut sets = Vec::new();
        if input.payroll_number.is_some() {
            sets.push("payroll_number = $payroll_number");
        }
        if input.first_name.is_some() {
            sets.push("first_name = $first_name");
        }
        if input.last_name.is_some() {
            sets.push("last_name = $last_name");
        }
        if input.second_last_name.is_some() {
            sets.push("second_last_name = $second_last_name");
        }
        if input.email.is_some() {
            sets.push("email = $email");
        }
        if input.position.is_some() {
            sets.push("position = $position");
        }
        if input.phone.is_some() {
            sets.push("phone = $phone");
        }
        if input.address.is_some() {
            sets.push("address = $address");
        }
        if input.image_url.is_some() {
            sets.push("image_url = $image_url");
        }
        if input.role_id.is_some() {
            sets.push("role_id = $role_id");
        }
        if input.password_hash.is_some() {
            sets.push("password_hash = $password_hash");
        }

        let query = if sets.is_empty() {
            "SELECT * FROM type::record('actor', $id)".to_string()
        } else {
            format!("UPDATE type::record('actor', $id) SET {}", sets.join(", "))
        };

        let mut builder = self.db.query(&query).bind(("id", id_str.clone()));

        if let Some(payroll_number) = input.payroll_number {
            builder = builder.bind(("payroll_number", payroll_number));
        }
        if let Some(first_name) = input.first_name {
            builder = builder.bind(("first_name", first_name));
        }
        if let Some(last_name) = input.last_name {
            builder = builder.bind(("last_name", last_name));
        }
        if let Some(second_last_name) = input.second_last_name {
            // Some(None) clears the field.
            builder = builder.bind(("second_last_name", second_last_name));
        }
        if let Some(email) = input.email {
            builder = builder.bind(("email", email));
        }
        if let Some(position) = input.position {
            builder = builder.bind(("position", position));
        }
        if let Some(phone) = input.phone {
            builder = builder.bind(("phone", phone));
        }
        if let Some(address) = input.address {
            builder = builder.bind(("address", address));
        }
        if let Some(image_url) = input.image_url {
            builder = builder.bind(("image_url", image_url));
        }
        if let Some(role_id) = input.role_id {
            builder = builder.bind(("role_id", role_id.to_string()));
        }
        if let Some(password_hash) = input.password_hash {
            builder = builder.bind(("password_hash", password_hash));
        }

        let result = builder.await.map_err(DbError::from)?;
        let mut result = result.check().map_err(|e| DbError::classify("actor", e))?;

        let rows: Vec<ActorRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "actor".into(),
            id: id_str,
        })?;

        Ok(row.into_actor(id)?)
    }

    async fn deactivate(&self, id: Uuid) -> TefluResult<()> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query(
                "UPDATE type::record('actor', $id) SET \
                 status = 'Inactive', deleted_at = time::now()",
            )
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| DbError::classify("actor", e))?;

        let rows: Vec<ActorRow> = result.take(0).map_err(DbError::from)?;
        if rows.is_empty() {
            return Err(DbError::NotFound {
                entity: "actor".into(),
                id: id_str,
            }
            .into());
        }

        Ok(())
    }

    async fn list_active(&self, pagination: Pagination) -> TefluResult<PaginatedResult<Actor>> {
        let mut count_result = self
            .db
            .query("SELECT count() AS total FROM actor WHERE status = 'Active' GROUP ALL")
            .await
            .map_err(DbError::from)?;
        let count_rows: Vec<CountRow> = count_result.take(0).map_err(DbError::from)?;
        let total = count_rows.first().map(|r| r.total).unwrap_or(0);

        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM actor \
                 WHERE status = 'Active' \
                 ORDER BY created_at ASC \
                 LIMIT $limit START $offset",
            )
            .bind(("limit", pagination.limit))
            .bind(("offset", pagination.offset))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<ActorRowWithId> = result.take(0).map_err(DbError::from)?;

        let items = rows
            .into_iter()
            .map(|row| row.try_into_actor())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(PaginatedResult {
            items,
            total,
            offset: pagination.offset,
            limit: pagination.limit,
        })
    }

    async fn count_active_by_role(&self, role_id: Uuid) -> TefluResult<u64> {
        let mut result = self
            .db
            .query(
                "SELECT count() AS total FROM actor \
                 WHERE role_id = $role_id AND status = 'Active' GROUP ALL",
            )
            .bind(("role_id", role_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<CountRow> = result.take(0).map_err(DbError::from)?;
        Ok(rows.first().map(|r| r.total).unwrap_or(0))
    }
}
