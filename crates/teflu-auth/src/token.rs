//! HS256 session token issuance and verification.

use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::AuthConfig;
use crate::error::AuthError;

/// JWT claims embedded in every session token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Subject — actor ID (UUID string).
    pub sub: String,
    /// Role name at issuance.
    pub role: String,
    pub iss: String,
    pub iat: i64,
    pub exp: i64,
}

fn encode(claims: &SessionClaims, config: &AuthConfig) -> Result<String, AuthError> {
    if config.session_secret.is_empty() {
        return Err(AuthError::Crypto("session secret is not configured".into()));
    }
    let key = EncodingKey::from_secret(config.session_secret.as_bytes());
    jsonwebtoken::encode(&Header::new(Algorithm::HS256), claims, &key)
        .map_err(|e| AuthError::Crypto(format!("JWT encode: {e}")))
}

/// Issue a signed session token for an actor.
pub fn issue_session_token(
    actor_id: Uuid,
    role_name: &str,
    config: &AuthConfig,
) -> Result<String, AuthError> {
    let now = Utc::now().timestamp();
    let claims = SessionClaims {
        sub: actor_id.to_string(),
        role: role_name.to_string(),
        iss: config.issuer.clone(),
        iat: now,
        exp: now + config.session_lifetime_secs as i64,
    };
    encode(&claims, config)
}

/// Decode and verify a session token (signature, expiry, issuer).
pub fn decode_session_token(token: &str, config: &AuthConfig) -> Result<SessionClaims, AuthError> {
    let key = DecodingKey::from_secret(config.session_secret.as_bytes());

    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[&config.issuer]);
    validation.set_required_spec_claims(&["sub", "exp", "iat", "iss"]);

    jsonwebtoken::decode::<SessionClaims>(token, &key, &validation)
        .map(|data| data.claims)
        .map_err(|e| match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
            _ => AuthError::TokenInvalid(e.to_string()),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> AuthConfig {
        AuthConfig {
            session_secret: "test-secret-with-enough-entropy".into(),
            issuer: "teflu-test".into(),
            ..AuthConfig::default()
        }
    }

    #[test]
    fn jwt_roundtrip() {
        let config = test_config();
        let actor_id = Uuid::new_v4();

        let token = issue_session_token(actor_id, "Supervisor", &config).unwrap();
        let claims = decode_session_token(&token, &config).unwrap();

        assert_eq!(claims.sub, actor_id.to_string());
        assert_eq!(claims.role, "Supervisor");
        assert_eq!(claims.iss, "teflu-test");
        assert_eq!(claims.exp - claims.iat, 28_800);
    }

    #[test]
    fn expired_token_is_rejected() {
        let config = test_config();
        let now = Utc::now().timestamp();
        let claims = SessionClaims {
            sub: Uuid::new_v4().to_string(),
            role: "Supervisor".into(),
            iss: config.issuer.clone(),
            iat: now - 40_000,
            exp: now - 3_600,
        };
        let token = encode(&claims, &config).unwrap();

        assert!(matches!(
            decode_session_token(&token, &config),
            Err(AuthError::TokenExpired)
        ));
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let config = test_config();
        let token = issue_session_token(Uuid::new_v4(), "Tecnico", &config).unwrap();

        let other = AuthConfig {
            session_secret: "another-secret".into(),
            ..test_config()
        };
        assert!(matches!(
            decode_session_token(&token, &other),
            Err(AuthError::TokenInvalid(_))
        ));
    }

    #[test]
    fn wrong_issuer_is_rejected() {
        let config = test_config();
        let token = issue_session_token(Uuid::new_v4(), "Tecnico", &config).unwrap();

        let other = AuthConfig {
            issuer: "someone-else".into(),
            ..test_config()
        };
        assert!(decode_session_token(&token, &other).is_err());
    }

    #[test]
    fn missing_secret_refuses_to_issue() {
        let config = AuthConfig::default();
        assert!(matches!(
            issue_session_token(Uuid::new_v4(), "Tecnico", &config),
            Err(AuthError::Crypto(_))
        ));
    }
}
