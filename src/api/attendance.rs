use actix_web::{HttpResponse, http::StatusCode, web};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::api::{invalid_body, parse_id};
use crate::error::AppError;
use crate::model::attendance::{AttendanceRecord, PointPayload, PointWithEmployee};
use crate::service::attendance::{AttendanceReconciler, Outcome, Reconciled};
use crate::service::employee::EmployeeRegistry;

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct PointListQuery {
    /// Only this employee's cards
    pub employee_id: Option<String>,
    /// Month filter, `YYYY-MM`
    pub date: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct DayQuery {
    /// `YYYY-MM-DD`, defaults to today (UTC)
    pub date: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct DeletePointsQuery {
    /// Required
    pub employee_id: Option<String>,
    /// Optional single day, `YYYY-MM-DD`
    pub date: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PointEnvelope {
    #[schema(example = "Record updated successfully.")]
    pub message: String,
    pub point: AttendanceRecord,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DeletedPoints {
    #[schema(example = "Daily points deleted successfully.")]
    pub message: String,
    #[schema(example = 3)]
    pub count: u64,
}

fn status_for(outcome: Outcome) -> StatusCode {
    match outcome {
        Outcome::Created => StatusCode::CREATED,
        Outcome::Updated => StatusCode::OK,
    }
}

fn envelope(result: Reconciled) -> HttpResponse {
    let message = match result.outcome {
        Outcome::Created => "Record created for the given day.",
        Outcome::Updated => "Record updated successfully.",
    };

    HttpResponse::build(status_for(result.outcome)).json(PointEnvelope {
        message: message.to_string(),
        point: result.record,
    })
}

fn optional_id(name: &str, raw: Option<&str>) -> Result<Option<u64>, AppError> {
    raw.map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| parse_id(name, s))
        .transpose()
}

/// List daily points by employee and/or month
#[utoipa::path(
    get,
    path = "/api/attendance",
    params(PointListQuery),
    responses(
        (status = 200, description = "Matching daily points with their employee", body = [PointWithEmployee]),
        (status = 400, description = "Malformed employeeId or month", body = Object, example = json!({
            "error": "Invalid month '03/2024', expected YYYY-MM"
        })),
        (status = 500, description = "Internal server error")
    ),
    tag = "Attendance"
)]
pub async fn list_points(
    reconciler: web::Data<AttendanceReconciler>,
    registry: web::Data<EmployeeRegistry>,
    query: web::Query<PointListQuery>,
) -> Result<HttpResponse, AppError> {
    let employee_id = optional_id("employeeId", query.employee_id.as_deref())?;

    let points = reconciler
        .list_by_employee_and_month(employee_id, query.date.as_deref())
        .await?;

    Ok(HttpResponse::Ok().json(registry.with_employees(points).await?))
}

/// Fetch one employee's card for a day
#[utoipa::path(
    get,
    path = "/api/attendance/{id}",
    params(
        ("id" = u64, Path, description = "Employee ID; reads are keyed by employee"),
        DayQuery
    ),
    responses(
        (status = 200, description = "The day's card with its employee, or null when nothing was recorded", body = PointWithEmployee),
        (status = 400, description = "Malformed employee id or date"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Attendance"
)]
pub async fn get_point_for_day(
    reconciler: web::Data<AttendanceReconciler>,
    registry: web::Data<EmployeeRegistry>,
    path: web::Path<String>,
    query: web::Query<DayQuery>,
) -> Result<HttpResponse, AppError> {
    let employee_id = parse_id("employee id", &path.into_inner())?;

    let Some(point) = reconciler
        .find_for_day(employee_id, query.date.as_deref())
        .await?
    else {
        return Ok(HttpResponse::Ok().json(serde_json::Value::Null));
    };

    let embedded = registry.with_employees(vec![point]).await?;
    Ok(HttpResponse::Ok().json(embedded.first()))
}

/// Record entry / exit / gate-open times for a day
#[utoipa::path(
    post,
    path = "/api/attendance",
    request_body = PointPayload,
    responses(
        (status = 201, description = "Card created for the day", body = AttendanceRecord),
        (status = 200, description = "Times merged into the existing card", body = AttendanceRecord),
        (status = 400, description = "Missing employeeId or malformed date/time", body = Object, example = json!({
            "error": "employeeId is required"
        })),
        (status = 500, description = "Internal server error", body = Object, example = json!({
            "error": "Failed to create daily point",
            "details": "pool timed out while waiting for an open connection"
        }))
    ),
    tag = "Attendance"
)]
pub async fn create_point(
    reconciler: web::Data<AttendanceReconciler>,
    payload: web::Json<PointPayload>,
) -> Result<HttpResponse, AppError> {
    let employee_id = payload
        .employee_id
        .ok_or_else(|| AppError::validation("employeeId is required"))?;

    let result = reconciler.upsert_times(employee_id, &payload).await?;

    Ok(HttpResponse::build(status_for(result.outcome)).json(result.record))
}

/// Update a card by its id
#[utoipa::path(
    put,
    path = "/api/attendance/{id}",
    params(
        ("id" = u64, Path, description = "Daily point ID")
    ),
    request_body = PointPayload,
    responses(
        (status = 200, description = "Card updated", body = PointEnvelope),
        (status = 201, description = "No such card, created one for payload employeeId", body = PointEnvelope),
        (status = 400, description = "Malformed id, date or time"),
        (status = 404, description = "No such card and no employeeId given", body = Object, example = json!({
            "error": "Daily point 12 not found"
        })),
        (status = 500, description = "Internal server error")
    ),
    tag = "Attendance"
)]
pub async fn update_point(
    reconciler: web::Data<AttendanceReconciler>,
    path: web::Path<String>,
    payload: web::Json<PointPayload>,
) -> Result<HttpResponse, AppError> {
    let record_id = parse_id("id", &path.into_inner())?;

    let result = reconciler.update_by_id(record_id, &payload).await?;

    Ok(envelope(result))
}

/// Mark an employee absent for a day
#[utoipa::path(
    put,
    path = "/api/attendance/absence/{employee_id}",
    params(
        ("employee_id" = u64, Path, description = "Employee ID")
    ),
    request_body(content = PointPayload, description = "Optional. Only `date` is used; times are ignored"),
    responses(
        (status = 201, description = "Absence card created", body = PointEnvelope),
        (status = 200, description = "Existing card cleared and flagged", body = PointEnvelope),
        (status = 400, description = "Malformed employee id, body or date"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Attendance"
)]
pub async fn mark_absence(
    reconciler: web::Data<AttendanceReconciler>,
    path: web::Path<String>,
    body: web::Bytes,
) -> Result<HttpResponse, AppError> {
    let employee_id = parse_id("employee id", &path.into_inner())?;

    // the body is optional, but one that is sent must parse
    let payload = if body.trim_ascii().is_empty() {
        PointPayload::default()
    } else {
        serde_json::from_slice::<PointPayload>(&body).map_err(invalid_body)?
    };

    let result = reconciler
        .mark_absent(employee_id, payload.date.as_deref())
        .await?;

    Ok(envelope(result))
}

/// Delete one card
#[utoipa::path(
    delete,
    path = "/api/attendance/{id}",
    params(
        ("id" = u64, Path, description = "Daily point ID")
    ),
    responses(
        (status = 200, description = "Deleted", body = Object, example = json!({
            "message": "Daily point deleted successfully."
        })),
        (status = 400, description = "Malformed id", body = Object, example = json!({
            "error": "Invalid id 'abc'"
        })),
        (status = 404, description = "No such card"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Attendance"
)]
pub async fn delete_point(
    reconciler: web::Data<AttendanceReconciler>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let record_id = parse_id("id", &path.into_inner())?;

    reconciler.delete_by_id(record_id).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Daily point deleted successfully."
    })))
}

/// Delete an employee's cards, optionally for a single day
#[utoipa::path(
    delete,
    path = "/api/attendance",
    params(DeletePointsQuery),
    responses(
        (status = 200, description = "Cards deleted", body = DeletedPoints),
        (status = 400, description = "Missing or malformed employeeId", body = Object, example = json!({
            "error": "employeeId is required"
        })),
        (status = 500, description = "Internal server error")
    ),
    tag = "Attendance"
)]
pub async fn delete_points(
    reconciler: web::Data<AttendanceReconciler>,
    query: web::Query<DeletePointsQuery>,
) -> Result<HttpResponse, AppError> {
    let employee_id = optional_id("employeeId", query.employee_id.as_deref())?
        .ok_or_else(|| AppError::validation("employeeId is required"))?;

    let count = reconciler
        .delete_by_employee(employee_id, query.date.as_deref())
        .await?;

    Ok(HttpResponse::Ok().json(DeletedPoints {
        message: "Daily points deleted successfully.".to_string(),
        count,
    }))
}
