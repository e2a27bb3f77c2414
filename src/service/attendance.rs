//! Daily time-clock reconciliation.
//!
//! Every write resolves "the" record of an employee for one calendar day:
//! the first row inside the day window. A missing row is created, an existing
//! one is patched in place, so one submission never produces a second card
//! for the same day.

use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{error, info, warn};

use crate::error::AppError;
use crate::model::attendance::{AttendanceRecord, AttendanceTimes, NewAttendance, PointPayload};
use crate::store::{AttendanceFilter, AttendanceStore, StoreError};
use crate::utils::clock::Clock;
use crate::utils::date_window::{
    DateWindow, combine, parse_day, parse_time_of_day, parse_year_month, resolve_day,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Created,
    Updated,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Reconciled {
    pub outcome: Outcome,
    pub record: AttendanceRecord,
}

/// What a submission does to the day's card.
#[derive(Debug, Clone, Copy)]
enum DayPatch {
    /// Submitted times replace stored ones, missing times are kept.
    Merge(AttendanceTimes),
    /// Clear every time and flag the day as an absence.
    Absent,
}

impl DayPatch {
    fn initial(self) -> AttendanceTimes {
        match self {
            DayPatch::Merge(times) => AttendanceTimes {
                falta: false,
                ..times
            },
            DayPatch::Absent => AttendanceTimes::absent(),
        }
    }

    fn apply(self, existing: &AttendanceRecord) -> AttendanceTimes {
        match self {
            DayPatch::Merge(times) => times.merged_onto(existing),
            DayPatch::Absent => AttendanceTimes::absent(),
        }
    }
}

fn submitted_times(date: NaiveDate, payload: &PointPayload) -> Result<AttendanceTimes, AppError> {
    let at = |raw: &Option<String>| -> Result<_, AppError> {
        Ok(parse_time_of_day(raw.as_deref())?.map(|time| combine(date, time)))
    };

    Ok(AttendanceTimes {
        entry: at(&payload.entry)?,
        exit: at(&payload.exit)?,
        gate_open: at(&payload.gate_open)?,
        falta: false,
    })
}

pub struct AttendanceReconciler {
    store: Arc<dyn AttendanceStore>,
    clock: Arc<dyn Clock>,
}

impl AttendanceReconciler {
    pub fn new(store: Arc<dyn AttendanceStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Find-or-create the employee's card for the payload date and merge the
    /// submitted times into it.
    pub async fn upsert_times(
        &self,
        employee_id: u64,
        payload: &PointPayload,
    ) -> Result<Reconciled, AppError> {
        let date = resolve_day(payload.date.as_deref(), self.clock.as_ref())?;
        let times = submitted_times(date, payload)?;

        self.write_day(employee_id, date, DayPatch::Merge(times)).await
    }

    /// Patch a card addressed by its own id. Times are anchored on the payload
    /// date when given, otherwise on the card's date. An unknown id falls back
    /// to [`Self::upsert_times`] when the payload names the employee.
    pub async fn update_by_id(
        &self,
        record_id: u64,
        payload: &PointPayload,
    ) -> Result<Reconciled, AppError> {
        let existing = self.store.find_by_id(record_id).await.map_err(|e| {
            error!(error = %e, record_id, "Failed to fetch daily point");
            AppError::from_store("Failed to fetch daily point", e)
        })?;

        match existing {
            Some(existing) => {
                let date = match payload.date.as_deref().map(str::trim) {
                    Some(raw) if !raw.is_empty() => parse_day(raw)?,
                    _ => existing.date,
                };
                let times = submitted_times(date, payload)?;
                self.apply_patch(&existing, DayPatch::Merge(times)).await
            }
            None => match payload.employee_id {
                Some(employee_id) => self.upsert_times(employee_id, payload).await,
                None => Err(AppError::not_found(format!(
                    "Daily point {record_id} not found"
                ))),
            },
        }
    }

    /// Flag the day as an absence, wiping any recorded times. Idempotent.
    pub async fn mark_absent(
        &self,
        employee_id: u64,
        date: Option<&str>,
    ) -> Result<Reconciled, AppError> {
        let date = resolve_day(date, self.clock.as_ref())?;
        self.write_day(employee_id, date, DayPatch::Absent).await
    }

    pub async fn find_for_day(
        &self,
        employee_id: u64,
        date: Option<&str>,
    ) -> Result<Option<AttendanceRecord>, AppError> {
        let date = resolve_day(date, self.clock.as_ref())?;
        self.find_day(employee_id, date).await
    }

    /// Records of one employee and/or one `YYYY-MM` month; no filter lists all.
    pub async fn list_by_employee_and_month(
        &self,
        employee_id: Option<u64>,
        year_month: Option<&str>,
    ) -> Result<Vec<AttendanceRecord>, AppError> {
        let window = year_month
            .map(str::trim)
            .filter(|raw| !raw.is_empty())
            .map(parse_year_month)
            .transpose()?;
        let filter = AttendanceFilter {
            employee_id,
            window,
        };

        self.store.find_many(&filter).await.map_err(|e| {
            error!(error = %e, ?filter, "Failed to list daily points");
            AppError::from_store("Failed to list daily points", e)
        })
    }

    pub async fn delete_by_id(&self, record_id: u64) -> Result<(), AppError> {
        let deleted = self.store.delete(record_id).await.map_err(|e| {
            error!(error = %e, record_id, "Failed to delete daily point");
            AppError::from_store("Failed to delete daily point", e)
        })?;

        if !deleted {
            return Err(AppError::not_found(format!(
                "Daily point {record_id} not found"
            )));
        }

        info!(record_id, "Daily point deleted");
        Ok(())
    }

    /// Removes every card of the employee, or only the one of `date`.
    pub async fn delete_by_employee(
        &self,
        employee_id: u64,
        date: Option<&str>,
    ) -> Result<u64, AppError> {
        let window = date
            .map(str::trim)
            .filter(|raw| !raw.is_empty())
            .map(|raw| parse_day(raw).map(DateWindow::day))
            .transpose()?;
        let filter = AttendanceFilter {
            employee_id: Some(employee_id),
            window,
        };

        let count = self.store.delete_many(&filter).await.map_err(|e| {
            error!(error = %e, employee_id, "Failed to delete daily points");
            AppError::from_store("Failed to delete daily points", e)
        })?;

        info!(employee_id, count, "Daily points deleted");
        Ok(count)
    }

    async fn find_day(
        &self,
        employee_id: u64,
        date: NaiveDate,
    ) -> Result<Option<AttendanceRecord>, AppError> {
        self.store
            .find_first(employee_id, DateWindow::day(date))
            .await
            .map_err(|e| {
                error!(error = %e, employee_id, %date, "Failed to look up daily point");
                AppError::from_store("Failed to look up daily point", e)
            })
    }

    async fn write_day(
        &self,
        employee_id: u64,
        date: NaiveDate,
        patch: DayPatch,
    ) -> Result<Reconciled, AppError> {
        if let Some(existing) = self.find_day(employee_id, date).await? {
            return self.apply_patch(&existing, patch).await;
        }

        let fields = NewAttendance {
            employee_id,
            date,
            times: patch.initial(),
        };

        match self.store.create(&fields).await {
            Ok(record) => {
                info!(record_id = record.id, employee_id, %date, falta = record.falta, "Daily point created");
                Ok(Reconciled {
                    outcome: Outcome::Created,
                    record,
                })
            }
            Err(StoreError::Duplicate(message)) => {
                // another request created the day between our lookup and insert
                warn!(employee_id, %date, "Concurrent create for the same day, merging");
                let existing = self.find_day(employee_id, date).await?.ok_or_else(|| {
                    AppError::internal("Failed to create daily point", message)
                })?;
                self.apply_patch(&existing, patch).await
            }
            Err(e) => {
                error!(error = %e, employee_id, %date, "Failed to create daily point");
                Err(AppError::from_store("Failed to create daily point", e))
            }
        }
    }

    async fn apply_patch(
        &self,
        existing: &AttendanceRecord,
        patch: DayPatch,
    ) -> Result<Reconciled, AppError> {
        let times = patch.apply(existing);
        let record_id = existing.id;

        let record = self
            .store
            .update(record_id, &times)
            .await
            .map_err(|e| {
                error!(error = %e, record_id, "Failed to update daily point");
                AppError::from_store("Failed to update daily point", e)
            })?
            .ok_or_else(|| AppError::not_found(format!("Daily point {record_id} not found")))?;

        info!(record_id, employee_id = record.employee_id, falta = record.falta, "Daily point updated");
        Ok(Reconciled {
            outcome: Outcome::Updated,
            record,
        })
    }
}
