//! Teflu Database — SurrealDB connection management, schema migrations,
//! default data and repository implementations.
//!
//! This crate provides:
//! - Connection management ([`DbManager`], [`DbConfig`])
//! - Schema initialization and migrations ([`run_migrations`])
//! - Default roles, modules and grants ([`ensure_defaults`])
//! - Implementations of the `teflu-core` repository traits
//!   ([`repository`])

mod connection;
mod error;
pub mod repository;
mod schema;
mod seed;

pub use connection::{DbConfig, DbManager};
pub use error::DbError;
pub use schema::{run_migrations, schema_v1};
pub use seed::{DefaultsReport, ensure_defaults};
