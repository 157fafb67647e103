//! The scan ledger: one registration per tool per shift occurrence.
//!
//! The existence check before insert only exists to produce a friendly
//! message early. The store's unique index on (tool, shift, shift date)
//! decides races; a rejected insert is reported as the same
//! `DuplicateScan` the fast path would have produced.

use serde::Serialize;
use teflu_auth::Gatekeeper;
use teflu_core::action::{ActionResult, run_action};
use teflu_core::error::{TefluError, TefluResult};
use teflu_core::identity::Identity;
use teflu_core::models::module::slugs;
use teflu_core::models::permission::Capability;
use teflu_core::models::scan::{CreateScanRecord, ScanRecord, ScanStatus};
use teflu_core::models::tool::Tool;
use teflu_core::repository::{ActorRepository, ScanRepository, ToolRepository};
use teflu_core::shift::{Clock, Shift, ShiftOccurrence};
use tracing::{info, warn};
use uuid::Uuid;

const UNKNOWN_ACTOR: &str = "unknown";

/// What the operator sees after a successful scan.
#[derive(Debug, Clone, Serialize)]
pub struct ScanConfirmation {
    pub tool_name: String,
    pub shift: Shift,
    pub record: ScanRecord,
}

pub struct ScanLedger<T, S, A, K>
where
    T: ToolRepository,
    S: ScanRepository,
    A: ActorRepository,
    K: Clock,
{
    tool_repo: T,
    scan_repo: S,
    actor_repo: A,
    clock: K,
}

impl<T, S, A, K> ScanLedger<T, S, A, K>
where
    T: ToolRepository,
    S: ScanRepository,
    A: ActorRepository,
    K: Clock,
{
    pub fn new(tool_repo: T, scan_repo: S, actor_repo: A, clock: K) -> Self {
        Self {
            tool_repo,
            scan_repo,
            actor_repo,
            clock,
        }
    }

    /// Record that `actor_id` confirmed the tool with `tool_code` during
    /// the current shift occurrence.
    pub async fn register_scan(
        &self,
        tool_code: &str,
        actor_id: Uuid,
    ) -> TefluResult<ScanConfirmation> {
        let occurrence = self.clock.current_occurrence();
        let code = tool_code.trim();

        let tool = self
            .tool_repo
            .find_active_by_code(code)
            .await?
            .ok_or_else(|| TefluError::ToolNotFound {
                code: code.to_string(),
            })?;

        if let Some(existing) = self
            .scan_repo
            .find_in_occurrence(tool.id, occurrence)
            .await?
        {
            return Err(self.duplicate(&tool, occurrence, Some(existing.actor_id)).await);
        }

        let created = self
            .scan_repo
            .create(CreateScanRecord {
                tool_id: tool.id,
                actor_id,
                occurrence,
                status: ScanStatus::Ok,
            })
            .await;

        match created {
            Ok(record) => {
                info!(
                    tool = %tool.code,
                    %actor_id,
                    shift = %occurrence.shift,
                    shift_date = %occurrence.date,
                    "Tool scan registered"
                );
                Ok(ScanConfirmation {
                    tool_name: tool.name,
                    shift: occurrence.shift,
                    record,
                })
            }
            Err(TefluError::AlreadyExists { .. }) => {
                // Lost the race to a concurrent scan of the same tool.
                let winner = match self.scan_repo.find_in_occurrence(tool.id, occurrence).await {
                    Ok(record) => record.map(|r| r.actor_id),
                    Err(e) => {
                        warn!(tool = %tool.code, error = %e, "Could not read the winning scan");
                        None
                    }
                };
                Err(self.duplicate(&tool, occurrence, winner).await)
            }
            Err(e) => Err(e),
        }
    }

    /// Gated entry point for the scan screen: requires a session with
    /// `write` on the tools module, then registers the scan as the
    /// session's actor.
    pub async fn submit_scan<G: Gatekeeper>(
        &self,
        gate: &G,
        session: Option<&Identity>,
        tool_code: &str,
    ) -> ActionResult<ScanConfirmation> {
        run_action(async {
            let authorized = gate
                .require_capability(session, slugs::TOOLS, Capability::Write)
                .await?;
            self.register_scan(tool_code, authorized.actor_id).await
        })
        .await
    }

    async fn duplicate(
        &self,
        tool: &Tool,
        occurrence: ShiftOccurrence,
        first_actor: Option<Uuid>,
    ) -> TefluError {
        let scanned_by = match first_actor {
            Some(id) => match self.actor_repo.get_by_id(id).await {
                Ok(actor) => actor.display_name().to_string(),
                Err(e) => {
                    warn!(actor_id = %id, error = %e, "Could not read the first scanner");
                    UNKNOWN_ACTOR.to_string()
                }
            },
            None => UNKNOWN_ACTOR.to_string(),
        };

        warn!(
            tool = %tool.code,
            shift = %occurrence.shift,
            shift_date = %occurrence.date,
            scanned_by = %scanned_by,
            "Duplicate scan rejected"
        );

        TefluError::DuplicateScan {
            tool_name: tool.name.clone(),
            shift: occurrence.shift,
            scanned_by,
        }
    }
}
