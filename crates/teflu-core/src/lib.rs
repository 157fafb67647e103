//! Teflu Core — shared domain types for the personnel, RBAC and tool
//! inventory system.
//!
//! Everything in this crate is persistence-agnostic: entities, the error
//! taxonomy, repository traits implemented by `teflu-db`, and the shift
//! clock used to group inventory scans.

pub mod action;
pub mod error;
pub mod identity;
pub mod models;
pub mod repository;
pub mod shift;

pub use error::{TefluError, TefluResult};
pub use identity::Identity;
