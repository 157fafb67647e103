//! Session service — login and per-request identity extraction.

use teflu_core::error::{TefluError, TefluResult};
use teflu_core::identity::Identity;
use teflu_core::repository::{ActorRepository, RoleRepository};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::AuthConfig;
use crate::error::AuthError;
use crate::password;
use crate::token;

/// Successful login result.
#[derive(Debug)]
pub struct LoginOutput {
    /// Signed session token.
    pub token: String,
    /// Token lifetime in seconds.
    pub expires_in: u64,
    pub identity: Identity,
}

/// Issues session tokens and turns them back into an [`Identity`].
///
/// Generic over repository implementations so that the auth layer
/// has no dependency on the database crate.
pub struct SessionService<A: ActorRepository, R: RoleRepository> {
    actor_repo: A,
    role_repo: R,
    config: AuthConfig,
}

impl<A: ActorRepository, R: RoleRepository> SessionService<A, R> {
    pub fn new(actor_repo: A, role_repo: R, config: AuthConfig) -> Self {
        Self {
            actor_repo,
            role_repo,
            config,
        }
    }

    /// Authenticate an actor by email and password and issue a session
    /// token.
    ///
    /// Unknown email, wrong password, and an inactive actor or role all
    /// fail the same way, as `Unauthenticated`.
    pub async fn login(&self, email: &str, password: &str) -> TefluResult<LoginOutput> {
        let actor = self
            .actor_repo
            .find_active_by_email(&email.trim().to_lowercase())
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        let valid = password::verify_password(
            password,
            &actor.password_hash,
            self.config.pepper.as_deref(),
        )?;
        if !valid {
            warn!(actor_id = %actor.id, "Login rejected: wrong password");
            return Err(AuthError::InvalidCredentials.into());
        }

        let role = match self.role_repo.get_by_id(actor.role_id).await {
            Ok(role) => role,
            Err(TefluError::NotFound { .. }) => return Err(AuthError::AccountInactive.into()),
            Err(e) => return Err(e),
        };
        if !role.status.is_active() {
            warn!(actor_id = %actor.id, role = %role.name, "Login rejected: role inactive");
            return Err(AuthError::AccountInactive.into());
        }

        let token = token::issue_session_token(actor.id, &role.name, &self.config)?;

        info!(actor_id = %actor.id, role = %role.name, "Session issued");

        Ok(LoginOutput {
            token,
            expires_in: self.config.session_lifetime_secs,
            identity: Identity::new(actor.id, role.name),
        })
    }

    /// Resolve the identity carried by a session token.
    ///
    /// Missing, malformed, forged and expired tokens all yield `None`.
    /// No database lookup is performed; the authorization gate re-checks
    /// the actor's current state.
    pub fn identify(&self, token: Option<&str>) -> Option<Identity> {
        let token = token?;
        let claims = match token::decode_session_token(token, &self.config) {
            Ok(claims) => claims,
            Err(e) => {
                debug!(error = %e, "Session token rejected");
                return None;
            }
        };
        let actor_id = Uuid::parse_str(&claims.sub).ok()?;
        Some(Identity::new(actor_id, claims.role))
    }
}
