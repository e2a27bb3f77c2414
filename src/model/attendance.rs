use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::model::employee::Employee;

/// One employee's time-clock card for one calendar day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
#[schema(example = json!({
    "id": 1,
    "employeeId": 7,
    "date": "2024-03-05",
    "entry": "2024-03-05T09:00:00Z",
    "exit": "2024-03-05T18:00:00Z",
    "gateOpen": null,
    "falta": false
}))]
pub struct AttendanceRecord {
    pub id: u64,
    pub employee_id: u64,

    #[sqlx(rename = "point_date")]
    #[schema(value_type = String, format = "date")]
    pub date: NaiveDate,

    #[sqlx(rename = "entry_at")]
    #[schema(value_type = Option<String>, format = "date-time")]
    pub entry: Option<DateTime<Utc>>,

    #[sqlx(rename = "exit_at")]
    #[schema(value_type = Option<String>, format = "date-time")]
    pub exit: Option<DateTime<Utc>>,

    #[sqlx(rename = "gate_open_at")]
    #[schema(value_type = Option<String>, format = "date-time")]
    pub gate_open: Option<DateTime<Utc>>,

    pub falta: bool,
}

/// A record with its employee embedded, as the listing screens expect.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct PointWithEmployee {
    #[serde(flatten)]
    pub point: AttendanceRecord,
    /// `null` only when the employee row is gone.
    pub employee: Option<Employee>,
}

/// The mutable part of a record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AttendanceTimes {
    pub entry: Option<DateTime<Utc>>,
    pub exit: Option<DateTime<Utc>>,
    pub gate_open: Option<DateTime<Utc>>,
    pub falta: bool,
}

impl AttendanceTimes {
    /// No times, absence flagged.
    pub fn absent() -> Self {
        Self {
            falta: true,
            ..Self::default()
        }
    }

    /// Submitted times win, missing ones keep what is stored. The absence
    /// flag is never touched by a merge.
    pub fn merged_onto(self, existing: &AttendanceRecord) -> Self {
        Self {
            entry: self.entry.or(existing.entry),
            exit: self.exit.or(existing.exit),
            gate_open: self.gate_open.or(existing.gate_open),
            falta: existing.falta,
        }
    }
}

/// Fields for a row that does not exist yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewAttendance {
    pub employee_id: u64,
    pub date: NaiveDate,
    pub times: AttendanceTimes,
}

/// Body shared by the create, update and absence endpoints.
#[derive(Debug, Default, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PointPayload {
    #[schema(example = 7)]
    pub employee_id: Option<u64>,

    /// `YYYY-MM-DD`; defaults to today (UTC)
    #[schema(example = "2024-03-05")]
    pub date: Option<String>,

    #[schema(example = "09:00")]
    pub entry: Option<String>,

    #[schema(example = "18:00")]
    pub exit: Option<String>,

    #[schema(example = "08:45")]
    pub gate_open: Option<String>,
}
