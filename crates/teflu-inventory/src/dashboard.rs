//! Per-shift completion statistics.

use chrono::NaiveDate;
use serde::Serialize;
use teflu_core::error::TefluResult;
use teflu_core::repository::{ScanRepository, ToolRepository};
use teflu_core::shift::{Clock, Shift};
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ShiftStats {
    /// Active tools.
    pub total: u64,
    /// Distinct tools scanned in the current occurrence.
    pub registered: u64,
    /// Never negative.
    pub missing: u64,
    pub current_shift: Shift,
    pub shift_date: NaiveDate,
}

impl ShiftStats {
    fn compute(total: u64, registered: u64, current_shift: Shift, shift_date: NaiveDate) -> Self {
        if registered > total {
            // A tool scanned this shift and deactivated afterwards.
            warn!(
                total,
                registered,
                shift = %current_shift,
                %shift_date,
                "More tools registered than active; clamping missing to zero"
            );
        }
        Self {
            total,
            registered,
            missing: total.saturating_sub(registered),
            current_shift,
            shift_date,
        }
    }
}

pub struct DashboardAggregator<T: ToolRepository, S: ScanRepository, K: Clock> {
    tool_repo: T,
    scan_repo: S,
    clock: K,
}

impl<T: ToolRepository, S: ScanRepository, K: Clock> DashboardAggregator<T, S, K> {
    pub fn new(tool_repo: T, scan_repo: S, clock: K) -> Self {
        Self {
            tool_repo,
            scan_repo,
            clock,
        }
    }

    /// Statistics for the shift occurrence that is open right now.
    pub async fn shift_stats(&self) -> TefluResult<ShiftStats> {
        let occurrence = self.clock.current_occurrence();
        let total = self.tool_repo.count_active().await?;
        let registered = self.scan_repo.count_distinct_tools(occurrence).await?;
        Ok(ShiftStats::compute(
            total,
            registered,
            occurrence.shift,
            occurrence.date,
        ))
    }
}
