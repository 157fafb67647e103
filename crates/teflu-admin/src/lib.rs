//! Teflu Admin — the gated management surface for roles, their
//! permission matrix, and personnel records.

pub mod personnel;
pub mod roles;

pub use personnel::{NewPersonnel, PersonnelService};
pub use roles::RoleService;
