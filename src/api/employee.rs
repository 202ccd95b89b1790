use crate::{auth::auth::AuthUser, store::EmployeeDirectory};
use actix_web::{HttpResponse, Responder, error::ErrorInternalServerError, web};
use tracing::error;

/// List employees
#[utoipa::path(
    get,
    path = "/api/employees",
    responses(
        (status = 200, description = "Every employee, ordered by name", body = [EmployeeSummary]),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Employee",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn list_employees(
    auth: AuthUser,
    directory: web::Data<dyn EmployeeDirectory>,
) -> actix_web::Result<impl Responder> {
    auth.require_staff_or_kiosk()?;

    let employees = directory.list_employees().await.map_err(|e| {
        error!(error = %e, "Failed to fetch employees");
        ErrorInternalServerError("Database error")
    })?;

    Ok(HttpResponse::Ok().json(employees))
}
