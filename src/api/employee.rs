use crate::{
    api::parse_id,
    error::AppError,
    model::employee::{CreateEmployee, Employee, EmployeeWithPoints, UpdateEmployee},
    service::employee::EmployeeRegistry,
};
use actix_web::{HttpResponse, web};
use serde_json::json;

/// List employees with their daily points
#[utoipa::path(
    get,
    path = "/api/employees",
    responses(
        (status = 200, description = "All employees", body = [EmployeeWithPoints]),
        (status = 500, description = "Internal server error")
    ),
    tag = "Employee"
)]
pub async fn list_employees(
    registry: web::Data<EmployeeRegistry>,
) -> Result<HttpResponse, AppError> {
    Ok(HttpResponse::Ok().json(registry.list().await?))
}

/// Get Employee by ID
#[utoipa::path(
    get,
    path = "/api/employees/{employee_id}",
    params(
        ("employee_id" = u64, Path, description = "Employee ID")
    ),
    responses(
        (status = 200, description = "Employee found", body = EmployeeWithPoints),
        (status = 404, description = "Employee not found", body = Object, example = json!({
            "error": "Employee not found"
        })),
        (status = 500, description = "Internal server error")
    ),
    tag = "Employee"
)]
pub async fn get_employee(
    registry: web::Data<EmployeeRegistry>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let employee_id = parse_id("employee id", &path.into_inner())?;

    Ok(HttpResponse::Ok().json(registry.get(employee_id).await?))
}

/// Create Employee
#[utoipa::path(
    post,
    path = "/api/employees",
    request_body = CreateEmployee,
    responses(
        (status = 201, description = "Employee created", body = Employee),
        (status = 400, description = "Invalid name or carga"),
        (status = 500, description = "Internal server error", body = Object, example = json!({
            "error": "Failed to create employee",
            "details": "..."
        }))
    ),
    tag = "Employee"
)]
pub async fn create_employee(
    registry: web::Data<EmployeeRegistry>,
    payload: web::Json<CreateEmployee>,
) -> Result<HttpResponse, AppError> {
    let employee = registry.create(&payload).await?;

    Ok(HttpResponse::Created().json(employee))
}

/// Update Employee
#[utoipa::path(
    put,
    path = "/api/employees/{employee_id}",
    params(
        ("employee_id" = u64, Path, description = "Employee ID")
    ),
    request_body = UpdateEmployee,
    responses(
        (status = 200, description = "Employee updated", body = Employee),
        (status = 400, description = "Invalid name or carga"),
        (status = 404, description = "Employee not found"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Employee"
)]
pub async fn update_employee(
    registry: web::Data<EmployeeRegistry>,
    path: web::Path<String>,
    body: web::Json<UpdateEmployee>,
) -> Result<HttpResponse, AppError> {
    let employee_id = parse_id("employee id", &path.into_inner())?;

    let updated = registry.update(employee_id, &body).await?;

    Ok(HttpResponse::Ok().json(updated))
}

/// Delete Employee along with their daily points
#[utoipa::path(
    delete,
    path = "/api/employees/{employee_id}",
    params(
        ("employee_id" = u64, Path, description = "Employee ID")
    ),
    responses(
        (status = 200, description = "Successfully deleted", body = Object, example = json!({
            "message": "Employee deleted successfully"
        })),
        (status = 404, description = "Employee not found"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Employee"
)]
pub async fn delete_employee(
    registry: web::Data<EmployeeRegistry>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let employee_id = parse_id("employee id", &path.into_inner())?;

    registry.delete(employee_id).await?;

    Ok(HttpResponse::Ok().json(json!({
        "message": "Employee deleted successfully"
    })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::extractor_errors;
    use crate::model::attendance::{AttendanceTimes, NewAttendance};
    use crate::routes;
    use crate::store::memory::{MemoryAttendanceStore, MemoryEmployeeStore};
    use actix_web::{App, http::StatusCode, test as actix_test};
    use chrono::NaiveDate;
    use rstest::rstest;
    use serde_json::Value;
    use std::sync::Arc;

    fn test_app(
        points: Arc<MemoryAttendanceStore>,
    ) -> App<
        impl actix_web::dev::ServiceFactory<
            actix_web::dev::ServiceRequest,
            Config = (),
            Response = actix_web::dev::ServiceResponse,
            Error = actix_web::Error,
            InitError = (),
        >,
    > {
        let registry = EmployeeRegistry::new(Arc::new(MemoryEmployeeStore::new()), points);

        App::new()
            .configure(extractor_errors)
            .app_data(web::Data::new(registry))
            .service(web::scope("/api").configure(routes::employee_scope))
    }

    fn point(employee_id: u64, day: u32) -> NewAttendance {
        NewAttendance {
            employee_id,
            date: NaiveDate::from_ymd_opt(2024, 3, day).unwrap(),
            times: AttendanceTimes::default(),
        }
    }

    #[actix_web::test]
    async fn create_defaults_carga_to_eight() {
        let app = actix_test::init_service(test_app(Arc::default())).await;

        let req = actix_test::TestRequest::post()
            .uri("/api/employees")
            .set_json(json!({ "name": "Ana", "position": "Cashier" }))
            .to_request();
        let res = actix_test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::CREATED);
        let body: Value = actix_test::read_body_json(res).await;
        assert_eq!(
            body,
            json!({ "id": 1, "name": "Ana", "position": "Cashier", "carga": 8 })
        );
    }

    #[actix_web::test]
    async fn create_rejects_blank_name() {
        let app = actix_test::init_service(test_app(Arc::default())).await;

        let req = actix_test::TestRequest::post()
            .uri("/api/employees")
            .set_json(json!({ "name": " ", "carga": 8 }))
            .to_request();
        let res = actix_test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let body: Value = actix_test::read_body_json(res).await;
        assert_eq!(body["error"], "name must not be empty");
    }

    #[rstest]
    #[case(actix_test::TestRequest::get())]
    #[case(actix_test::TestRequest::put().set_json(json!({ "carga": 6 })))]
    #[case(actix_test::TestRequest::delete())]
    #[actix_web::test]
    async fn unknown_employee_is_not_found(#[case] req: actix_test::TestRequest) {
        let app = actix_test::init_service(test_app(Arc::default())).await;

        let res = actix_test::call_service(&app, req.uri("/api/employees/41").to_request()).await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
        let body: Value = actix_test::read_body_json(res).await;
        assert_eq!(body, json!({ "error": "Employee not found" }));
    }

    #[actix_web::test]
    async fn update_merges_supplied_fields() {
        let app = actix_test::init_service(test_app(Arc::default())).await;

        let req = actix_test::TestRequest::post()
            .uri("/api/employees")
            .set_json(json!({ "name": "Ana", "position": "Cashier", "carga": 6 }))
            .to_request();
        actix_test::call_service(&app, req).await;

        let req = actix_test::TestRequest::put()
            .uri("/api/employees/1")
            .set_json(json!({ "carga": 4 }))
            .to_request();
        let body: Value = actix_test::call_and_read_body_json(&app, req).await;
        assert_eq!(
            body,
            json!({ "id": 1, "name": "Ana", "position": "Cashier", "carga": 4 })
        );

        let req = actix_test::TestRequest::put()
            .uri("/api/employees/1")
            .set_json(json!({ "position": null }))
            .to_request();
        let body: Value = actix_test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["position"], Value::Null);
        assert_eq!(body["carga"], 4);

        let req = actix_test::TestRequest::put()
            .uri("/api/employees/1")
            .set_json(json!({ "carga": 30 }))
            .to_request();
        let res = actix_test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn reads_embed_points_and_delete_cascades() {
        let points = Arc::new(MemoryAttendanceStore::new());
        let app = actix_test::init_service(test_app(points.clone())).await;

        for name in ["Ana", "Bia"] {
            let req = actix_test::TestRequest::post()
                .uri("/api/employees")
                .set_json(json!({ "name": name }))
                .to_request();
            actix_test::call_service(&app, req).await;
        }
        points.seed(point(1, 1));
        points.seed(point(1, 2));
        points.seed(point(2, 1));

        let req = actix_test::TestRequest::get()
            .uri("/api/employees/1")
            .to_request();
        let body: Value = actix_test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["name"], "Ana");
        assert_eq!(body["points"].as_array().unwrap().len(), 2);
        assert_eq!(body["points"][0]["date"], "2024-03-01");

        let req = actix_test::TestRequest::get()
            .uri("/api/employees")
            .to_request();
        let body: Value = actix_test::call_and_read_body_json(&app, req).await;
        assert_eq!(body[1]["points"].as_array().unwrap().len(), 1);

        let req = actix_test::TestRequest::delete()
            .uri("/api/employees/1")
            .to_request();
        let res = actix_test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::OK);

        let left = points.all();
        assert_eq!(left.len(), 1);
        assert_eq!(left[0].employee_id, 2);

        let req = actix_test::TestRequest::get()
            .uri("/api/employees/1")
            .to_request();
        let res = actix_test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn wrong_field_type_answers_with_error_body() {
        let app = actix_test::init_service(test_app(Arc::default())).await;

        let req = actix_test::TestRequest::post()
            .uri("/api/employees")
            .set_json(json!({ "name": "Ana", "carga": "eight" }))
            .to_request();
        let res = actix_test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let body: Value = actix_test::read_body_json(res).await;
        assert!(
            body["error"]
                .as_str()
                .unwrap()
                .starts_with("Invalid request body:")
        );
    }
}
