//! Teflu Inventory — shift-scoped tool scans and their dashboard.
//!
//! - [`ScanLedger`] registers at most one scan per tool per shift
//!   occurrence.
//! - [`DashboardAggregator`] reports how many active tools the current
//!   shift has confirmed.
//! - [`ToolCatalog`] is the gated CRUD surface for tools.

pub mod catalog;
pub mod dashboard;
pub mod ledger;

pub use catalog::ToolCatalog;
pub use dashboard::{DashboardAggregator, ShiftStats};
pub use ledger::{ScanConfirmation, ScanLedger};
