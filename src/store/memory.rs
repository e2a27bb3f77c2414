use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use super::{AttendanceFilter, AttendanceStore, EmployeeStore, StoreError};
use crate::model::attendance::{AttendanceRecord, AttendanceTimes, NewAttendance};
use crate::model::employee::{Employee, NewEmployee};
use crate::utils::date_window::DateWindow;

#[derive(Default)]
struct State {
    next_id: u64,
    records: Vec<AttendanceRecord>,
}

/// Vec-backed store with the same (employee, day) uniqueness as the schema.
#[derive(Default)]
pub struct MemoryAttendanceStore {
    state: Mutex<State>,
}

impl MemoryAttendanceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a row as-is, bypassing the uniqueness check.
    pub fn seed(&self, fields: NewAttendance) -> AttendanceRecord {
        let mut state = self.state.lock().unwrap();
        insert(&mut state, &fields)
    }

    pub fn all(&self) -> Vec<AttendanceRecord> {
        self.state.lock().unwrap().records.clone()
    }

    fn lock(&self) -> Result<MutexGuard<'_, State>, StoreError> {
        self.state.lock().map_err(|_| poisoned())
    }
}

fn poisoned() -> StoreError {
    StoreError::Query("memory store lock poisoned".to_string())
}

fn matches(filter: &AttendanceFilter, record: &AttendanceRecord) -> bool {
    filter.employee_id.is_none_or(|id| record.employee_id == id)
        && filter
            .window
            .is_none_or(|w| w.start <= record.date && record.date < w.end)
}

fn insert(state: &mut State, fields: &NewAttendance) -> AttendanceRecord {
    state.next_id += 1;
    let record = AttendanceRecord {
        id: state.next_id,
        employee_id: fields.employee_id,
        date: fields.date,
        entry: fields.times.entry,
        exit: fields.times.exit,
        gate_open: fields.times.gate_open,
        falta: fields.times.falta,
    };
    state.records.push(record.clone());
    record
}

#[async_trait]
impl AttendanceStore for MemoryAttendanceStore {
    async fn find_by_id(&self, id: u64) -> Result<Option<AttendanceRecord>, StoreError> {
        Ok(self.lock()?.records.iter().find(|r| r.id == id).cloned())
    }

    async fn find_first(
        &self,
        employee_id: u64,
        window: DateWindow,
    ) -> Result<Option<AttendanceRecord>, StoreError> {
        let filter = AttendanceFilter {
            employee_id: Some(employee_id),
            window: Some(window),
        };
        Ok(self.lock()?.records.iter().find(|r| matches(&filter, r)).cloned())
    }

    async fn find_many(
        &self,
        filter: &AttendanceFilter,
    ) -> Result<Vec<AttendanceRecord>, StoreError> {
        Ok(self
            .lock()?
            .records
            .iter()
            .filter(|r| matches(filter, r))
            .cloned()
            .collect())
    }

    async fn create(&self, fields: &NewAttendance) -> Result<AttendanceRecord, StoreError> {
        let mut state = self.lock()?;
        let taken = state
            .records
            .iter()
            .any(|r| r.employee_id == fields.employee_id && r.date == fields.date);
        if taken {
            return Err(StoreError::Duplicate(format!(
                "employee {} already has a point on {}",
                fields.employee_id, fields.date
            )));
        }

        Ok(insert(&mut state, fields))
    }

    async fn update(
        &self,
        id: u64,
        times: &AttendanceTimes,
    ) -> Result<Option<AttendanceRecord>, StoreError> {
        let mut state = self.lock()?;
        let Some(record) = state.records.iter_mut().find(|r| r.id == id) else {
            return Ok(None);
        };

        record.entry = times.entry;
        record.exit = times.exit;
        record.gate_open = times.gate_open;
        record.falta = times.falta;
        Ok(Some(record.clone()))
    }

    async fn delete(&self, id: u64) -> Result<bool, StoreError> {
        let mut state = self.lock()?;
        let before = state.records.len();
        state.records.retain(|r| r.id != id);
        Ok(state.records.len() < before)
    }

    async fn delete_many(&self, filter: &AttendanceFilter) -> Result<u64, StoreError> {
        let mut state = self.lock()?;
        let before = state.records.len();
        state.records.retain(|r| !matches(filter, r));
        Ok((before - state.records.len()) as u64)
    }
}

#[derive(Default)]
struct Roster {
    next_id: u64,
    employees: Vec<Employee>,
}

/// Vec-backed employee table. Unlike MySQL it does not cascade deletes into
/// a points store.
#[derive(Default)]
pub struct MemoryEmployeeStore {
    roster: Mutex<Roster>,
}

impl MemoryEmployeeStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Roster>, StoreError> {
        self.roster.lock().map_err(|_| poisoned())
    }
}

#[async_trait]
impl EmployeeStore for MemoryEmployeeStore {
    async fn list(&self) -> Result<Vec<Employee>, StoreError> {
        Ok(self.lock()?.employees.clone())
    }

    async fn find_by_id(&self, id: u64) -> Result<Option<Employee>, StoreError> {
        Ok(self.lock()?.employees.iter().find(|e| e.id == id).cloned())
    }

    async fn find_by_ids(&self, ids: &[u64]) -> Result<Vec<Employee>, StoreError> {
        Ok(self
            .lock()?
            .employees
            .iter()
            .filter(|e| ids.contains(&e.id))
            .cloned()
            .collect())
    }

    async fn create(&self, fields: &NewEmployee) -> Result<Employee, StoreError> {
        let mut roster = self.lock()?;
        roster.next_id += 1;
        let employee = Employee {
            id: roster.next_id,
            name: fields.name.clone(),
            position: fields.position.clone(),
            carga: fields.carga,
        };
        roster.employees.push(employee.clone());
        Ok(employee)
    }

    async fn update(&self, employee: &Employee) -> Result<(), StoreError> {
        let mut roster = self.lock()?;
        if let Some(stored) = roster.employees.iter_mut().find(|e| e.id == employee.id) {
            *stored = employee.clone();
        }
        Ok(())
    }

    async fn delete(&self, id: u64) -> Result<bool, StoreError> {
        let mut roster = self.lock()?;
        let before = roster.employees.len();
        roster.employees.retain(|e| e.id != id);
        Ok(roster.employees.len() < before)
    }
}
