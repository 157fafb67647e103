//! Authentication and authorization configuration.

use serde::Deserialize;

/// Configuration for session issuance and password handling.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// HMAC secret for HS256 session tokens.
    pub session_secret: String,
    /// Session lifetime in seconds (default: 28_800 = 8 hours).
    pub session_lifetime_secs: u64,
    /// JWT issuer (`iss` claim).
    pub issuer: String,
    /// Optional pepper prepended to passwords before Argon2id hashing
    /// and verification.
    pub pepper: Option<String>,
    /// Minimum password length accepted when creating or changing a
    /// password.
    pub min_password_length: usize,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            session_secret: String::new(),
            session_lifetime_secs: 28_800,
            issuer: "teflu".into(),
            pepper: None,
            min_password_length: 6,
        }
    }
}

/// Configuration for the authorization gate.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AuthzConfig {
    /// Name of the role that can never be deleted or have its grants
    /// edited.
    pub admin_role_name: String,
}

impl Default for AuthzConfig {
    fn default() -> Self {
        Self {
            admin_role_name: "Administrator".into(),
        }
    }
}
