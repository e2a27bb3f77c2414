use crate::api::attendance::{DeletedPoints, PointEnvelope};
use crate::model::attendance::{AttendanceRecord, PointPayload, PointWithEmployee};
use crate::model::employee::{CreateEmployee, Employee, EmployeeWithPoints, UpdateEmployee};
use utoipa::openapi::PathItem;
use utoipa::{Modify, OpenApi};

const CANONICAL: &str = "/api/attendance";
const LEGACY: &str = "/api/daily-points";

/// Mirrors every `/attendance` path under `/daily-points`, plus the
/// `falta` and `falta-manual` spellings of the absence route.
struct LegacyRoutes;

fn aliased(item: &PathItem, suffix: &str) -> PathItem {
    let mut item = item.clone();
    for operation in item.operations.values_mut() {
        operation.operation_id = operation
            .operation_id
            .take()
            .map(|id| format!("{id}_{suffix}"));
    }
    item
}

impl Modify for LegacyRoutes {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let mut aliases = Vec::new();

        for (path, item) in openapi.paths.paths.iter() {
            let Some(rest) = path.strip_prefix(CANONICAL) else {
                continue;
            };
            aliases.push((format!("{LEGACY}{rest}"), aliased(item, "daily_points")));

            if let Some(tail) = rest.strip_prefix("/absence") {
                for (segment, suffix) in [("falta", "falta"), ("falta-manual", "falta_manual")] {
                    aliases.push((format!("{LEGACY}/{segment}{tail}"), aliased(item, suffix)));
                }
            }
        }

        openapi.paths.paths.extend(aliases);
    }
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Back Office API",
        version = "0.1.0",
        description = r#"
## Back office: time clock

Daily attendance cards for the shop's employees.

### Key Features
- **Time clock**
  - Entry, exit and gate-open times, one card per employee per day
  - Absence (falta) marking, which clears the day's times
  - Monthly listing and bulk deletion per employee
- **Employees**
  - Create, update, list, view and delete employees

### Conventions
- Dates are `YYYY-MM-DD`, months `YYYY-MM`, times `HH:MM`, all UTC
- A request without a date applies to today
- `/daily-points` is an alias of `/attendance`

---
Built with **Rust**, **Actix Web**, **SQLx**, and **Utoipa**.
"#,
    ),
    modifiers(&LegacyRoutes),
    paths(
        crate::api::attendance::list_points,
        crate::api::attendance::get_point_for_day,
        crate::api::attendance::create_point,
        crate::api::attendance::update_point,
        crate::api::attendance::mark_absence,
        crate::api::attendance::delete_point,
        crate::api::attendance::delete_points,

        crate::api::employee::list_employees,
        crate::api::employee::get_employee,
        crate::api::employee::create_employee,
        crate::api::employee::update_employee,
        crate::api::employee::delete_employee
    ),
    components(
        schemas(
            AttendanceRecord,
            PointWithEmployee,
            PointPayload,
            PointEnvelope,
            DeletedPoints,
            Employee,
            EmployeeWithPoints,
            CreateEmployee,
            UpdateEmployee
        )
    ),
    tags(
        (name = "Attendance", description = "Daily time-clock APIs"),
        (name = "Employee", description = "Employee management APIs"),
    )
)]
pub struct ApiDoc;
