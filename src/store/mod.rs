//! Persistence ports for daily attendance records and employees.
//!
//! Services only talk to [`AttendanceStore`] and [`EmployeeStore`]; `mysql`
//! holds the production adapters and `memory` backs the unit and handler tests.

use async_trait::async_trait;
use derive_more::Display;

use crate::model::attendance::{AttendanceRecord, AttendanceTimes, NewAttendance};
use crate::model::employee::{Employee, NewEmployee};
use crate::utils::date_window::DateWindow;

#[cfg(test)]
pub mod memory;
pub mod mysql;

#[derive(Debug, Display)]
pub enum StoreError {
    /// A row for the same (employee, day) already exists.
    #[display(fmt = "duplicate daily point: {}", _0)]
    Duplicate(String),

    /// The referenced employee does not exist.
    #[display(fmt = "{}", _0)]
    Reference(String),

    #[display(fmt = "{}", _0)]
    Query(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.is_unique_violation() {
                return StoreError::Duplicate(db_err.message().to_string());
            }
            if db_err.is_foreign_key_violation() {
                return StoreError::Reference("Employee does not exist".to_string());
            }
        }

        StoreError::Query(err.to_string())
    }
}

/// Optional filters, combined with AND. An empty filter matches everything.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AttendanceFilter {
    pub employee_id: Option<u64>,
    pub window: Option<DateWindow>,
}

#[async_trait]
pub trait AttendanceStore: Send + Sync {
    async fn find_by_id(&self, id: u64) -> Result<Option<AttendanceRecord>, StoreError>;

    /// First record (lowest id) of `employee_id` inside `window`.
    async fn find_first(
        &self,
        employee_id: u64,
        window: DateWindow,
    ) -> Result<Option<AttendanceRecord>, StoreError>;

    /// Matching records in insertion order.
    async fn find_many(&self, filter: &AttendanceFilter)
    -> Result<Vec<AttendanceRecord>, StoreError>;

    /// Fails with [`StoreError::Duplicate`] when the employee already has a
    /// record for that day.
    async fn create(&self, fields: &NewAttendance) -> Result<AttendanceRecord, StoreError>;

    /// Overwrites the mutable fields. `None` when the id no longer exists.
    async fn update(
        &self,
        id: u64,
        times: &AttendanceTimes,
    ) -> Result<Option<AttendanceRecord>, StoreError>;

    /// `false` when there was nothing to delete.
    async fn delete(&self, id: u64) -> Result<bool, StoreError>;

    /// Number of rows removed.
    async fn delete_many(&self, filter: &AttendanceFilter) -> Result<u64, StoreError>;
}

#[async_trait]
pub trait EmployeeStore: Send + Sync {
    /// Every employee, ordered by id.
    async fn list(&self) -> Result<Vec<Employee>, StoreError>;

    async fn find_by_id(&self, id: u64) -> Result<Option<Employee>, StoreError>;

    /// Employees among `ids`; unknown ids are skipped.
    async fn find_by_ids(&self, ids: &[u64]) -> Result<Vec<Employee>, StoreError>;

    async fn create(&self, fields: &NewEmployee) -> Result<Employee, StoreError>;

    /// Overwrites name, position and carga of `employee.id`.
    async fn update(&self, employee: &Employee) -> Result<(), StoreError>;

    /// `false` when there was nothing to delete.
    async fn delete(&self, id: u64) -> Result<bool, StoreError>;
}
