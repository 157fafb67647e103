//! SurrealDB implementation of [`ScanRepository`].
//!
//! The `idx_scan_occurrence` unique index is what actually serializes
//! concurrent scans of the same tool; `create` reports its rejection as
//! `AlreadyExists`.

use chrono::{DateTime, NaiveDate, Utc};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use teflu_core::error::TefluResult;
use teflu_core::models::scan::{CreateScanRecord, ScanRecord, ScanStatus};
use teflu_core::repository::ScanRepository;
use teflu_core::shift::{Shift, ShiftOccurrence};
use uuid::Uuid;

use super::parse_uuid;
use crate::error::DbError;

const SHIFT_DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, SurrealValue)]
struct ScanRow {
    tool_id: String,
    actor_id: String,
    shift: String,
    shift_date: String,
    status: String,
    created_at: DateTime<Utc>,
}

#[derive(Debug, SurrealValue)]
struct ScanRowWithId {
    record_id: String,
    tool_id: String,
    actor_id: String,
    shift: String,
    shift_date: String,
    status: String,
    created_at: DateTime<Utc>,
}

#[derive(Debug, SurrealValue)]
struct ToolIdRow {
    #[allow(dead_code)]
    tool_id: String,
}

fn shift_str(shift: Shift) -> &'static str {
    match shift {
        Shift::Day => "Day",
        Shift::Afternoon => "Afternoon",
        Shift::Night => "Night",
    }
}

fn parse_shift(raw: &str) -> Result<Shift, DbError> {
    match raw {
        "Day" => Ok(Shift::Day),
        "Afternoon" => Ok(Shift::Afternoon),
        "Night" => Ok(Shift::Night),
        other => Err(DbError::Decode(format!("unknown shift: {other}"))),
    }
}

fn scan_status_str(status: ScanStatus) -> &'static str {
    match status {
        ScanStatus::Ok => "Ok",
        ScanStatus::Discrepancy => "Discrepancy",
    }
}

fn parse_scan_status(raw: &str) -> Result<ScanStatus, DbError> {
    match raw {
        "Ok" => Ok(ScanStatus::Ok),
        "Discrepancy" => Ok(ScanStatus::Discrepancy),
        other => Err(DbError::Decode(format!("unknown scan status: {other}"))),
    }
}

fn date_str(date: NaiveDate) -> String {
    date.format(SHIFT_DATE_FORMAT).to_string()
}

impl ScanRow {
    fn into_record(self, id: Uuid) -> Result<ScanRecord, DbError> {
        let date = NaiveDate::parse_from_str(&self.shift_date, SHIFT_DATE_FORMAT)
            .map_err(|e| DbError::Decode(format!("invalid shift date: {e}")))?;
        Ok(ScanRecord {
            id,
            tool_id: parse_uuid(&self.tool_id, "tool")?,
            actor_id: parse_uuid(&self.actor_id, "actor")?,
            occurrence: ShiftOccurrence {
                shift: parse_shift(&self.shift)?,
                date,
            },
            status: parse_scan_status(&self.status)?,
            created_at: self.created_at,
        })
    }
}

impl ScanRowWithId {
    fn try_into_record(self) -> Result<ScanRecord, DbError> {
        let id = parse_uuid(&self.record_id, "scan record")?;
        ScanRow {
            tool_id: self.tool_id,
            actor_id: self.actor_id,
            shift: self.shift,
            shift_date: self.shift_date,
            status: self.status,
            created_at: self.created_at,
        }
        .into_record(id)
    }
}

/// SurrealDB implementation of the scan record repository.
#[derive(Clone)]
pub struct SurrealScanRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealScanRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> ScanRepository for SurrealScanRepository<C> {
    async fn create(&self, input: CreateScanRecord) -> TefluResult<ScanRecord> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "CREATE type::record('scan_record', $id) SET \
                 tool_id = $tool_id, actor_id = $actor_id, \
                 shift = $shift, shift_date = $shift_date, \
                 status = $status",
            )
            .bind(("id", id_str.clone()))
            .bind(("tool_id", input.tool_id.to_string()))
            .bind(("actor_id", input.actor_id.to_string()))
            .bind(("shift", shift_str(input.occurrence.shift)))
            .bind(("shift_date", date_str(input.occurrence.date)))
            .bind(("status", scan_status_str(input.status)))
            .await
            .map_err(|e| DbError::classify("scan_record", e))?;

        let mut result = result
            .check()
            .map_err(|e| DbError::classify("scan_record", e))?;

        let rows: Vec<ScanRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "scan_record".into(),
            id: id_str,
        })?;

        Ok(row.into_record(id)?)
    }

    async fn find_in_occurrence(
        &self,
        tool_id: Uuid,
        occurrence: ShiftOccurrence,
    ) -> TefluResult<Option<ScanRecord>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM scan_record \
                 WHERE tool_id = $tool_id AND shift = $shift \
                 AND shift_date = $shift_date LIMIT 1",
            )
            .bind(("tool_id", tool_id.to_string()))
            .bind(("shift", shift_str(occurrence.shift)))
            .bind(("shift_date", date_str(occurrence.date)))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<ScanRowWithId> = result.take(0).map_err(DbError::from)?;
        Ok(rows
            .into_iter()
            .next()
            .map(ScanRowWithId::try_into_record)
            .transpose()?)
    }

    async fn count_distinct_tools(&self, occurrence: ShiftOccurrence) -> TefluResult<u64> {
        let mut result = self
            .db
            .query(
                "SELECT tool_id FROM scan_record \
                 WHERE shift = $shift AND shift_date = $shift_date \
                 GROUP BY tool_id",
            )
            .bind(("shift", shift_str(occurrence.shift)))
            .bind(("shift_date", date_str(occurrence.date)))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<ToolIdRow> = result.take(0).map_err(DbError::from)?;
        Ok(rows.len() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shift_names_round_trip_through_storage_form() {
        for shift in [Shift::Day, Shift::Afternoon, Shift::Night] {
            assert_eq!(parse_shift(shift_str(shift)).unwrap(), shift);
        }
        assert!(parse_shift("Evening").is_err());
    }

    #[test]
    fn shift_date_is_iso() {
        let date = NaiveDate::from_ymd_opt(2025, 1, 9).unwrap();
        assert_eq!(date_str(date), "2025-01-09");
    }
}
