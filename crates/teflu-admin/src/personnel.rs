//! Personnel management (module `personas`).

use serde::Deserialize;
use teflu_auth::{AuthConfig, Gatekeeper, password};
use teflu_core::error::{TefluError, TefluResult};
use teflu_core::identity::Identity;
use teflu_core::models::actor::{Actor, CreateActor, UpdateActor};
use teflu_core::models::module::slugs;
use teflu_core::models::permission::Capability;
use teflu_core::repository::{ActorRepository, PaginatedResult, Pagination, RoleRepository};
use tracing::info;
use uuid::Uuid;

/// A personnel record as entered on the form, with a plaintext password.
#[derive(Debug, Clone, Deserialize)]
pub struct NewPersonnel {
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
    pub password: String,
}

fn require_text(field: &str, value: &str) -> TefluResult<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(TefluError::validation(format!("{field} is required")));
    }
    Ok(value.to_string())
}

fn validate_email(email: &str) -> TefluResult<String> {
    let email = require_text("email", email)?;
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && domain.contains('.') => {
            Ok(email.to_lowercase())
        }
        _ => Err(TefluError::validation(format!("invalid email address: {email}"))),
    }
}

pub struct PersonnelService<A, R, G>
where
    A: ActorRepository,
    R: RoleRepository,
    G: Gatekeeper,
{
    actor_repo: A,
    role_repo: R,
    gate: G,
    config: AuthConfig,
}

impl<A, R, G> PersonnelService<A, R, G>
where
    A: ActorRepository,
    R: RoleRepository,
    G: Gatekeeper,
{
    pub fn new(actor_repo: A, role_repo: R, gate: G, config: AuthConfig) -> Self {
        Self {
            actor_repo,
            role_repo,
            gate,
            config,
        }
    }

    fn hash(&self, password: &str) -> TefluResult<String> {
        if password.chars().count() < self.config.min_password_length {
            return Err(TefluError::validation(format!(
                "password must be at least {} characters",
                self.config.min_password_length
            )));
        }
        Ok(password::hash_password(
            password,
            self.config.pepper.as_deref(),
        )?)
    }

    async fn require_active_role(&self, role_id: Uuid) -> TefluResult<()> {
        let role = self.role_repo.get_by_id(role_id).await?;
        if !role.status.is_active() {
            return Err(TefluError::validation(format!("role {} is inactive", role.name)));
        }
        Ok(())
    }

    pub async fn list(
        &self,
        session: Option<&Identity>,
        pagination: Pagination,
    ) -> TefluResult<PaginatedResult<Actor>> {
        self.gate
            .require_capability(session, slugs::PERSONNEL, Capability::Read)
            .await?;
        self.actor_repo.list_active(pagination).await
    }

    pub async fn create(&self, session: Option<&Identity>, input: NewPersonnel) -> TefluResult<Actor> {
        let authorized = self
            .gate
            .require_capability(session, slugs::PERSONNEL, Capability::Write)
            .await?;

        let payroll_number = require_text("payroll number", &input.payroll_number)?;
        let first_name = require_text("first name", &input.first_name)?;
        let last_name = require_text("last name", &input.last_name)?;
        let position = require_text("position", &input.position)?;
        let email = validate_email(&input.email)?;
        self.require_active_role(input.role_id).await?;
        let password_hash = self.hash(&input.password)?;

        let actor = self
            .actor_repo
            .create(CreateActor {
                payroll_number,
                first_name,
                last_name,
                second_last_name: input.second_last_name,
                email,
                position,
                phone: input.phone,
                address: input.address,
                image_url: input.image_url,
                role_id: input.role_id,
                password_hash,
            })
            .await?;

        info!(actor_id = %actor.id, by = %authorized.actor_id, "Actor created");
        Ok(actor)
    }

    /// Apply `changes`; a `new_password` replaces the stored hash. Any
    /// hash supplied in `changes` itself is ignored.
    pub async fn update(
        &self,
        session: Option<&Identity>,
        id: Uuid,
        changes: UpdateActor,
        new_password: Option<&str>,
    ) -> TefluResult<Actor> {
        let authorized = self
            .gate
            .require_capability(session, slugs::PERSONNEL, Capability::Update)
            .await?;

        let changes = UpdateActor {
            payroll_number: changes
                .payroll_number
                .map(|v| require_text("payroll number", &v))
                .transpose()?,
            first_name: changes
                .first_name
                .map(|v| require_text("first name", &v))
                .transpose()?,
            last_name: changes
                .last_name
                .map(|v| require_text("last name", &v))
                .transpose()?,
            position: changes
                .position
                .map(|v| require_text("position", &v))
                .transpose()?,
            email: changes.email.map(|v| validate_email(&v)).transpose()?,
            password_hash: new_password.map(|p| self.hash(p)).transpose()?,
            ..changes
        };
        if let Some(role_id) = changes.role_id {
            self.require_active_role(role_id).await?;
        }

        let password_changed = changes.password_hash.is_some();
        let actor = self.actor_repo.update(id, changes).await?;

        info!(actor_id = %id, by = %authorized.actor_id, password_changed, "Actor updated");
        Ok(actor)
    }

    /// Soft delete. The caller's own record is refused by the gate.
    pub async fn delete(&self, session: Option<&Identity>, id: Uuid) -> TefluResult<()> {
        let authorized = self.gate.require_actor_deletion(session, id).await?;

        self.actor_repo.deactivate(id).await?;

        info!(actor_id = %id, by = %authorized.actor_id, "Actor deactivated");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_is_normalised() {
        assert_eq!(
            validate_email(" Ana.Lopez@Example.com ").unwrap(),
            "ana.lopez@example.com"
        );
    }

    #[test]
    fn malformed_emails_are_rejected() {
        for bad in ["", "ana", "@example.com", "ana@localhost"] {
            assert!(validate_email(bad).is_err(), "{bad} accepted");
        }
    }

    #[test]
    fn blank_text_is_rejected() {
        assert!(require_text("position", "   ").is_err());
        assert_eq!(require_text("position", " Operator ").unwrap(), "Operator");
    }
}
