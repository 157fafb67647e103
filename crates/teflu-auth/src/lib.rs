//! Teflu Auth — password hashing, session tokens, permission resolution
//! and the authorization gate every protected operation goes through.

pub mod config;
pub mod error;
pub mod gate;
pub mod password;
pub mod permissions;
pub mod service;
pub mod token;

pub use config::{AuthConfig, AuthzConfig};
pub use error::AuthError;
pub use gate::{AuthorizationGate, Authorized, Gatekeeper};
pub use permissions::{PermissionResolver, PermissionScope};
pub use service::{LoginOutput, SessionService};
pub use token::SessionClaims;
