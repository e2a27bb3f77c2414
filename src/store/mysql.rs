use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::MySqlPool;
use tracing::debug;

use super::{AttendanceFilter, AttendanceStore, EmployeeStore, StoreError};
use crate::model::attendance::{AttendanceRecord, AttendanceTimes, NewAttendance};
use crate::model::employee::{Employee, NewEmployee};
use crate::utils::date_window::DateWindow;

const SELECT_POINTS: &str = r#"
    SELECT id, employee_id, point_date, entry_at, exit_at, gate_open_at, falta
    FROM daily_points
"#;

const SELECT_EMPLOYEES: &str = "SELECT id, name, position, carga FROM employees";

// Helper enum for typed SQLx binding
enum FilterValue {
    U64(u64),
    Date(NaiveDate),
}

fn where_clause(filter: &AttendanceFilter) -> (String, Vec<FilterValue>) {
    let mut where_sql = String::from(" WHERE 1=1");
    let mut args = Vec::new();

    if let Some(employee_id) = filter.employee_id {
        where_sql.push_str(" AND employee_id = ?");
        args.push(FilterValue::U64(employee_id));
    }

    if let Some(window) = filter.window {
        where_sql.push_str(" AND point_date >= ? AND point_date < ?");
        args.push(FilterValue::Date(window.start));
        args.push(FilterValue::Date(window.end));
    }

    (where_sql, args)
}

pub struct MySqlAttendanceStore {
    pool: MySqlPool,
}

impl MySqlAttendanceStore {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AttendanceStore for MySqlAttendanceStore {
    async fn find_by_id(&self, id: u64) -> Result<Option<AttendanceRecord>, StoreError> {
        let sql = format!("{SELECT_POINTS} WHERE id = ?");

        let record = sqlx::query_as::<_, AttendanceRecord>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(record)
    }

    async fn find_first(
        &self,
        employee_id: u64,
        window: DateWindow,
    ) -> Result<Option<AttendanceRecord>, StoreError> {
        let sql = format!(
            "{SELECT_POINTS} WHERE employee_id = ? AND point_date >= ? AND point_date < ? ORDER BY id ASC LIMIT 1"
        );

        let record = sqlx::query_as::<_, AttendanceRecord>(&sql)
            .bind(employee_id)
            .bind(window.start)
            .bind(window.end)
            .fetch_optional(&self.pool)
            .await?;

        Ok(record)
    }

    async fn find_many(
        &self,
        filter: &AttendanceFilter,
    ) -> Result<Vec<AttendanceRecord>, StoreError> {
        let (where_sql, args) = where_clause(filter);
        let sql = format!("{SELECT_POINTS}{where_sql} ORDER BY id ASC");
        debug!(sql = %sql, ?filter, "Fetching daily points");

        let mut query = sqlx::query_as::<_, AttendanceRecord>(&sql);
        for arg in args {
            query = match arg {
                FilterValue::U64(v) => query.bind(v),
                FilterValue::Date(d) => query.bind(d),
            };
        }

        Ok(query.fetch_all(&self.pool).await?)
    }

    async fn create(&self, fields: &NewAttendance) -> Result<AttendanceRecord, StoreError> {
        let result = sqlx::query(
            r#"
            INSERT INTO daily_points
                (employee_id, point_date, entry_at, exit_at, gate_open_at, falta)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(fields.employee_id)
        .bind(fields.date)
        .bind(fields.times.entry)
        .bind(fields.times.exit)
        .bind(fields.times.gate_open)
        .bind(fields.times.falta)
        .execute(&self.pool)
        .await?;

        let id = result.last_insert_id();
        self.find_by_id(id).await?.ok_or_else(|| {
            StoreError::Query(format!("Daily point {id} disappeared right after insert"))
        })
    }

    async fn update(
        &self,
        id: u64,
        times: &AttendanceTimes,
    ) -> Result<Option<AttendanceRecord>, StoreError> {
        // rows_affected is 0 for a no-op update on MySQL, so re-read instead
        sqlx::query(
            r#"
            UPDATE daily_points
            SET entry_at = ?, exit_at = ?, gate_open_at = ?, falta = ?
            WHERE id = ?
            "#,
        )
        .bind(times.entry)
        .bind(times.exit)
        .bind(times.gate_open)
        .bind(times.falta)
        .bind(id)
        .execute(&self.pool)
        .await?;

        self.find_by_id(id).await
    }

    async fn delete(&self, id: u64) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM daily_points WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_many(&self, filter: &AttendanceFilter) -> Result<u64, StoreError> {
        let (where_sql, args) = where_clause(filter);
        let sql = format!("DELETE FROM daily_points{where_sql}");
        debug!(sql = %sql, ?filter, "Deleting daily points");

        let mut query = sqlx::query(&sql);
        for arg in args {
            query = match arg {
                FilterValue::U64(v) => query.bind(v),
                FilterValue::Date(d) => query.bind(d),
            };
        }

        let result = query.execute(&self.pool).await?;
        Ok(result.rows_affected())
    }
}

fn id_list(len: usize) -> String {
    vec!["?"; len].join(", ")
}

pub struct MySqlEmployeeStore {
    pool: MySqlPool,
}

impl MySqlEmployeeStore {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EmployeeStore for MySqlEmployeeStore {
    async fn list(&self) -> Result<Vec<Employee>, StoreError> {
        let employees = sqlx::query_as::<_, Employee>(&format!("{SELECT_EMPLOYEES} ORDER BY id"))
            .fetch_all(&self.pool)
            .await?;

        Ok(employees)
    }

    async fn find_by_id(&self, id: u64) -> Result<Option<Employee>, StoreError> {
        let employee = sqlx::query_as::<_, Employee>(&format!("{SELECT_EMPLOYEES} WHERE id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(employee)
    }

    async fn find_by_ids(&self, ids: &[u64]) -> Result<Vec<Employee>, StoreError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let sql = format!("{SELECT_EMPLOYEES} WHERE id IN ({}) ORDER BY id", id_list(ids.len()));
        debug!(sql = %sql, count = ids.len(), "Fetching employees");

        let mut query = sqlx::query_as::<_, Employee>(&sql);
        for id in ids {
            query = query.bind(*id);
        }

        Ok(query.fetch_all(&self.pool).await?)
    }

    async fn create(&self, fields: &NewEmployee) -> Result<Employee, StoreError> {
        let result = sqlx::query("INSERT INTO employees (name, position, carga) VALUES (?, ?, ?)")
            .bind(&fields.name)
            .bind(fields.position.as_deref())
            .bind(fields.carga)
            .execute(&self.pool)
            .await?;

        Ok(Employee {
            id: result.last_insert_id(),
            name: fields.name.clone(),
            position: fields.position.clone(),
            carga: fields.carga,
        })
    }

    async fn update(&self, employee: &Employee) -> Result<(), StoreError> {
        sqlx::query("UPDATE employees SET name = ?, position = ?, carga = ? WHERE id = ?")
            .bind(&employee.name)
            .bind(employee.position.as_deref())
            .bind(employee.carga)
            .bind(employee.id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn delete(&self, id: u64) -> Result<bool, StoreError> {
        // daily_points rows go with it (ON DELETE CASCADE)
        let result = sqlx::query("DELETE FROM employees WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
