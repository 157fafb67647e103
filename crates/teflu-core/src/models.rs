//! Domain models for Teflu.
//!
//! These are the typed entities shared across all crates. Rows coming out
//! of the store are converted into these at the persistence boundary.

pub mod actor;
pub mod module;
pub mod permission;
pub mod role;
pub mod scan;
pub mod status;
pub mod tool;
