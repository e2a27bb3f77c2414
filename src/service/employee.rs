use std::collections::HashMap;
use std::sync::Arc;

use tracing::{error, info};

use crate::error::AppError;
use crate::model::attendance::{AttendanceRecord, PointWithEmployee};
use crate::model::employee::{
    CreateEmployee, DEFAULT_CARGA, Employee, EmployeeWithPoints, NewEmployee, UpdateEmployee,
};
use crate::store::{AttendanceFilter, AttendanceStore, EmployeeStore, StoreError};

fn validate_employee(name: &str, carga: u32) -> Result<(), AppError> {
    if name.trim().is_empty() {
        return Err(AppError::validation("name must not be empty"));
    }
    if !(1..=24).contains(&carga) {
        return Err(AppError::validation("carga must be between 1 and 24 hours"));
    }
    Ok(())
}

fn clean_position(position: Option<&str>) -> Option<String> {
    position
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_string)
}

fn store_error(context: &'static str) -> impl Fn(StoreError) -> AppError {
    move |e| {
        error!(error = %e, "{}", context);
        AppError::from_store(context, e)
    }
}

/// Employee CRUD plus the joins between employees and their daily points.
pub struct EmployeeRegistry {
    employees: Arc<dyn EmployeeStore>,
    points: Arc<dyn AttendanceStore>,
}

impl EmployeeRegistry {
    pub fn new(employees: Arc<dyn EmployeeStore>, points: Arc<dyn AttendanceStore>) -> Self {
        Self { employees, points }
    }

    pub async fn list(&self) -> Result<Vec<EmployeeWithPoints>, AppError> {
        let employees = self
            .employees
            .list()
            .await
            .map_err(store_error("Failed to fetch employees"))?;
        let points = self
            .points
            .find_many(&AttendanceFilter::default())
            .await
            .map_err(store_error("Failed to fetch daily points"))?;

        let mut by_employee: HashMap<u64, Vec<AttendanceRecord>> = HashMap::new();
        for point in points {
            by_employee.entry(point.employee_id).or_default().push(point);
        }

        Ok(employees
            .into_iter()
            .map(|employee| EmployeeWithPoints {
                points: by_employee.remove(&employee.id).unwrap_or_default(),
                employee,
            })
            .collect())
    }

    pub async fn get(&self, employee_id: u64) -> Result<EmployeeWithPoints, AppError> {
        let employee = self.fetch(employee_id).await?;
        let filter = AttendanceFilter {
            employee_id: Some(employee_id),
            window: None,
        };
        let points = self
            .points
            .find_many(&filter)
            .await
            .map_err(store_error("Failed to fetch daily points"))?;

        Ok(EmployeeWithPoints { employee, points })
    }

    pub async fn create(&self, payload: &CreateEmployee) -> Result<Employee, AppError> {
        let fields = NewEmployee {
            name: payload.name.trim().to_string(),
            position: clean_position(payload.position.as_deref()),
            carga: payload.carga.unwrap_or(DEFAULT_CARGA),
        };
        validate_employee(&fields.name, fields.carga)?;

        let employee = self
            .employees
            .create(&fields)
            .await
            .map_err(store_error("Failed to create employee"))?;

        info!(employee_id = employee.id, "Employee created");
        Ok(employee)
    }

    /// Merges the supplied fields onto the stored employee.
    pub async fn update(
        &self,
        employee_id: u64,
        changes: &UpdateEmployee,
    ) -> Result<Employee, AppError> {
        let current = self.fetch(employee_id).await?;

        let updated = Employee {
            id: current.id,
            name: changes
                .name
                .as_deref()
                .map(str::trim)
                .map(str::to_string)
                .unwrap_or(current.name),
            position: match &changes.position {
                Some(position) => clean_position(position.as_deref()),
                None => current.position,
            },
            carga: changes.carga.unwrap_or(current.carga),
        };
        validate_employee(&updated.name, updated.carga)?;

        self.employees
            .update(&updated)
            .await
            .map_err(store_error("Failed to update employee"))?;

        info!(employee_id, "Employee updated");
        Ok(updated)
    }

    /// Removes the employee and every daily point recorded for them.
    pub async fn delete(&self, employee_id: u64) -> Result<(), AppError> {
        let deleted = self
            .employees
            .delete(employee_id)
            .await
            .map_err(store_error("Failed to delete employee"))?;
        if !deleted {
            return Err(AppError::not_found("Employee not found"));
        }

        // no-op on MySQL where the foreign key already cascaded
        let filter = AttendanceFilter {
            employee_id: Some(employee_id),
            window: None,
        };
        let points = self
            .points
            .delete_many(&filter)
            .await
            .map_err(store_error("Failed to delete daily points"))?;

        info!(employee_id, points, "Employee deleted");
        Ok(())
    }

    /// Embeds each point's employee, looking every employee up once.
    pub async fn with_employees(
        &self,
        points: Vec<AttendanceRecord>,
    ) -> Result<Vec<PointWithEmployee>, AppError> {
        let mut ids: Vec<u64> = points.iter().map(|p| p.employee_id).collect();
        ids.sort_unstable();
        ids.dedup();

        let employees: HashMap<u64, Employee> = self
            .employees
            .find_by_ids(&ids)
            .await
            .map_err(store_error("Failed to fetch employees"))?
            .into_iter()
            .map(|e| (e.id, e))
            .collect();

        Ok(points
            .into_iter()
            .map(|point| PointWithEmployee {
                employee: employees.get(&point.employee_id).cloned(),
                point,
            })
            .collect())
    }

    async fn fetch(&self, employee_id: u64) -> Result<Employee, AppError> {
        self.employees
            .find_by_id(employee_id)
            .await
            .map_err(store_error("Failed to fetch employee"))?
            .ok_or_else(|| AppError::not_found("Employee not found"))
    }
}
