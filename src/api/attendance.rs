use crate::auth::auth::AuthUser;
use crate::error::RejectionBody;
use crate::model::attendance::{AttendanceRecord, Direction};
use crate::model::employee::EmployeeSummary;
use crate::service::attendance::AttendanceService;
use crate::service::reasons::{ReasonItem, ReasonService};
use crate::service::roster::RosterService;
use crate::service::work_day::WorkClock;
use actix_web::{HttpResponse, Responder, error::ErrorInternalServerError, http::StatusCode, web};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

#[derive(Deserialize, ToSchema)]
pub struct ScanRequest {
    /// Content of the scanned code
    #[schema(example = "QR-7-IN-5f2c")]
    pub code: String,
}

#[derive(Serialize, ToSchema)]
pub struct ScanAccepted {
    #[schema(example = "accepted")]
    pub status: String,
    #[schema(value_type = String, example = "0f8fad5b-d9cb-469f-a165-70867728950e")]
    pub scan_id: String,
    pub employee: EmployeeSummary,
    pub direction: Direction,
    pub record: AttendanceRecord,
}

#[derive(Deserialize, ToSchema)]
pub struct ReasonBatchRequest {
    pub reasons: Vec<ReasonItem>,
}

#[derive(Deserialize, IntoParams)]
pub struct RosterQuery {
    /// Day to report, defaults to today (YYYY-MM-DD)
    #[param(value_type = Option<String>, format = "date")]
    pub date: Option<NaiveDate>,
}

/// Record one scanned code
#[utoipa::path(
    post,
    path = "/api/attendance/scan",
    request_body = ScanRequest,
    responses(
        (status = 200, description = "Scan accepted", body = ScanAccepted),
        (status = 404, description = "Code not recognized", body = RejectionBody),
        (status = 409, description = "Scan breaks the daily attendance rules", body = RejectionBody, example = json!({
            "status": "rejected",
            "kind": "already_arrived",
            "message": "You already started your workday today"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Storage failure", body = RejectionBody)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
#[instrument(
    name = "scan",
    skip_all,
    fields(scan_id = tracing::field::Empty, user_id = auth.user_id, username = %auth.username)
)]
pub async fn scan(
    auth: AuthUser,
    service: web::Data<AttendanceService>,
    clock: web::Data<WorkClock>,
    payload: web::Json<ScanRequest>,
) -> actix_web::Result<HttpResponse> {
    let scan_id = Uuid::new_v4().to_string();
    tracing::Span::current().record("scan_id", scan_id.as_str());

    let scope = auth.scan_scope()?;
    let instant = clock.now();

    match service.scan(&payload.code, scope, instant).await {
        Ok(receipt) => {
            let outcome = receipt.outcome;
            info!(
                employee_id = outcome.employee_id,
                badge_no = receipt.employee.badge_no,
                direction = %outcome.direction,
                at = %instant.at,
                "Scan accepted"
            );
            Ok(HttpResponse::Ok().json(ScanAccepted {
                status: "accepted".to_string(),
                scan_id,
                employee: receipt.employee,
                direction: outcome.direction,
                record: outcome.record,
            }))
        }
        Err(e) => {
            if e.is_rule_violation() {
                info!(kind = ?e.kind(), "Scan rejected by attendance rules");
            } else {
                info!(kind = ?e.kind(), "Scan rejected");
            }
            let mut body = serde_json::to_value(RejectionBody::from(&e))
                .map_err(ErrorInternalServerError)?;
            body["scan_id"] = scan_id.into();
            Ok(HttpResponse::build(actix_web::ResponseError::status_code(&e)).json(body))
        }
    }
}

/// Save today's absence or lateness reasons
#[utoipa::path(
    post,
    path = "/api/attendance/reasons",
    request_body = ReasonBatchRequest,
    responses(
        (status = 200, description = "Every reason saved", body = ReasonBatchReport),
        (status = 207, description = "Some reasons failed, see per-item results", body = ReasonBatchReport),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn save_reasons(
    auth: AuthUser,
    service: web::Data<ReasonService>,
    clock: web::Data<WorkClock>,
    payload: web::Json<ReasonBatchRequest>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;

    let report = service.submit_batch(clock.today(), &payload.reasons).await;
    let status = if report.all_saved() {
        StatusCode::OK
    } else {
        StatusCode::MULTI_STATUS
    };

    Ok(HttpResponse::build(status).json(report))
}

/// Daily roster with punctuality flags
#[utoipa::path(
    get,
    path = "/api/attendance/roster",
    params(RosterQuery),
    responses(
        (status = 200, description = "Roster for the day", body = DailyRoster),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn roster(
    auth: AuthUser,
    service: web::Data<RosterService>,
    clock: web::Data<WorkClock>,
    query: web::Query<RosterQuery>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;

    let day = query.date.unwrap_or_else(|| clock.today());
    let roster = service.daily(day).await.map_err(|e| {
        error!(error = %e, %day, "Failed to build roster");
        ErrorInternalServerError("Internal Server Error")
    })?;

    Ok(HttpResponse::Ok().json(roster))
}

/// Attendance history of one employee
#[utoipa::path(
    get,
    path = "/api/attendance/employee/{employee_id}",
    params(
        ("employee_id", Path, description = "Employee ID")
    ),
    responses(
        (status = 200, description = "Records, newest day first", body = [AttendanceRecord]),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn employee_history(
    auth: AuthUser,
    service: web::Data<AttendanceService>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    let employee_id = path.into_inner();
    auth.require_self_or_hr(employee_id)?;

    let records = service.history(employee_id).await.map_err(|e| {
        error!(error = %e, employee_id, "Failed to fetch attendance history");
        ErrorInternalServerError("Internal Server Error")
    })?;

    Ok(HttpResponse::Ok().json(records))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::jwt::generate_access_token;
    use crate::config::Config;
    use crate::model::role::Role;
    use crate::routes::{self, Limiters};
    use crate::store::EmployeeDirectory;
    use crate::store::memory::{MemoryStore, employee};
    use crate::utils::scan_lock::ScanLocks;
    use actix_web::{App, test, web::Data};
    use serde_json::{Value, json};
    use std::net::SocketAddr;
    use std::sync::Arc;
    use std::time::Duration;

    macro_rules! test_app {
        ($store:expr) => {{
            let store: Arc<MemoryStore> = $store;
            let config = Config::for_tests();
            let limiters = Limiters::from_config(&config).unwrap();
            let directory: Data<dyn EmployeeDirectory> =
                Data::from(store.clone() as Arc<dyn EmployeeDirectory>);
            test::init_service(
                App::new()
                    .app_data(Data::new(AttendanceService::new(
                        store.clone(),
                        store.clone(),
                        ScanLocks::new(Duration::from_secs(60)),
                    )))
                    .app_data(Data::new(ReasonService::new(store.clone())))
                    .app_data(Data::new(RosterService::new(
                        store.clone(),
                        config.arrival_window,
                        config.departure_window,
                    )))
                    .app_data(directory)
                    .app_data(Data::new(WorkClock::new(config.timezone)))
                    .app_data(Data::new(config.clone()))
                    .configure(|cfg| routes::configure(cfg, &config, limiters)),
            )
            .await
        }};
    }

    fn store() -> Arc<MemoryStore> {
        Arc::new(MemoryStore::with_employees(vec![
            employee(1, "Aziz", "A1", "B1"),
            employee(2, "Dilnoza", "A2", "B2"),
        ]))
    }

    fn peer() -> SocketAddr {
        "127.0.0.1:40000".parse().unwrap()
    }

    fn bearer(role: Role, employee_id: Option<u64>) -> (&'static str, String) {
        let token = generate_access_token(1, role, employee_id, &Config::for_tests().jwt_secret);
        ("Authorization", format!("Bearer {token}"))
    }

    fn scan_request(role: Role, employee_id: Option<u64>, code: &str) -> test::TestRequest {
        test::TestRequest::post()
            .uri("/api/attendance/scan")
            .peer_addr(peer())
            .insert_header(bearer(role, employee_id))
            .set_json(json!({ "code": code }))
    }

    fn get(uri: &str, role: Role, employee_id: Option<u64>) -> test::TestRequest {
        test::TestRequest::get()
            .uri(uri)
            .peer_addr(peer())
            .insert_header(bearer(role, employee_id))
    }

    #[actix_web::test]
    async fn requests_without_token_are_unauthorized() {
        let app = test_app!(store());
        let req = test::TestRequest::post()
            .uri("/api/attendance/scan")
            .peer_addr(peer())
            .set_json(json!({ "code": "A1" }))
            .to_request();

        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn kiosk_arrival_then_duplicate() {
        let store = store();
        let app = test_app!(store.clone());

        let resp = test::call_service(&app, scan_request(Role::System, None, "A1").to_request()).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["status"], "accepted");
        assert_eq!(body["employee"]["id"], 1);
        assert_eq!(body["employee"]["name"], "Aziz");
        assert_eq!(body["direction"], "arrival");
        assert!(body["record"]["departed_at"].is_null());

        let resp = test::call_service(&app, scan_request(Role::System, None, "A1").to_request()).await;
        assert_eq!(resp.status(), StatusCode::CONFLICT);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["status"], "rejected");
        assert_eq!(body["kind"], "already_arrived");
        assert!(body["scan_id"].is_string());

        assert_eq!(store.records().len(), 1);
    }

    #[actix_web::test]
    async fn departure_flow_over_http() {
        let store = store();
        let now = WorkClock::new(Config::for_tests().timezone).now();
        store.insert_record(AttendanceRecord {
            id: 1,
            employee_id: 2,
            work_date: now.day,
            arrived_at: now.at - chrono::Duration::minutes(5),
            departed_at: None,
        });
        let app = test_app!(store.clone());

        let resp = test::call_service(&app, scan_request(Role::System, None, "B2").to_request()).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["direction"], "departure");
        assert!(body["record"]["departed_at"].is_string());

        let resp = test::call_service(&app, scan_request(Role::System, None, "B2").to_request()).await;
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["kind"], "already_departed");
    }

    #[actix_web::test]
    async fn departure_without_arrival_is_a_conflict() {
        let app = test_app!(store());

        let resp = test::call_service(&app, scan_request(Role::System, None, "B1").to_request()).await;
        assert_eq!(resp.status(), StatusCode::CONFLICT);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["kind"], "arrival_missing");
        assert_eq!(body["message"], "You have not logged an arrival today");
    }

    #[actix_web::test]
    async fn unknown_code_is_not_found() {
        let app = test_app!(store());

        let resp = test::call_service(&app, scan_request(Role::System, None, "Z9").to_request()).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["kind"], "unrecognized_code");
    }

    #[actix_web::test]
    async fn employees_scan_only_their_own_codes() {
        let store = store();
        let app = test_app!(store.clone());

        let resp = test::call_service(&app, scan_request(Role::Employee, Some(1), "A2").to_request()).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        assert!(store.records().is_empty());

        let resp = test::call_service(&app, scan_request(Role::Employee, Some(1), "A1").to_request()).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let resp = test::call_service(&app, scan_request(Role::Employee, None, "A1").to_request()).await;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    }

    #[actix_web::test]
    async fn reason_batch_reports_per_item() {
        let app = test_app!(store());
        let req = test::TestRequest::post()
            .uri("/api/attendance/reasons")
            .peer_addr(peer())
            .insert_header(bearer(Role::Hr, None))
            .set_json(json!({
                "reasons": [
                    { "employee_id": 1, "reason": "Sick" },
                    { "employee_id": 99, "reason": "Unknown" }
                ]
            }))
            .to_request();

        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::MULTI_STATUS);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["results"][0]["status"], "saved");
        assert_eq!(body["results"][1]["status"], "failed");
        assert_eq!(body["results"][1]["employee_id"], 99);
    }

    #[actix_web::test]
    async fn reason_batch_requires_hr() {
        let app = test_app!(store());
        let req = test::TestRequest::post()
            .uri("/api/attendance/reasons")
            .peer_addr(peer())
            .insert_header(bearer(Role::Employee, Some(1)))
            .set_json(json!({ "reasons": [{ "employee_id": 1, "reason": "Sick" }] }))
            .to_request();

        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    }

    #[actix_web::test]
    async fn roster_for_explicit_date() {
        let app = test_app!(store());

        let resp = test::call_service(
            &app,
            get("/api/attendance/roster?date=2026-01-05", Role::Admin, None).to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["work_date"], "2026-01-05");
        assert_eq!(body["entries"].as_array().unwrap().len(), 2);
        assert_eq!(body["entries"][0]["name"], "Aziz");
        assert_eq!(body["entries"][0]["arrival"], "missing");

        let resp = test::call_service(
            &app,
            get("/api/attendance/roster", Role::Employee, Some(1)).to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    }

    #[actix_web::test]
    async fn history_is_limited_to_self_for_employees() {
        let app = test_app!(store());
        test::call_service(&app, scan_request(Role::System, None, "A1").to_request()).await;

        let resp = test::call_service(
            &app,
            get("/api/attendance/employee/1", Role::Employee, Some(1)).to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body.as_array().unwrap().len(), 1);

        let resp = test::call_service(
            &app,
            get("/api/attendance/employee/1", Role::Employee, Some(2)).to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    }

    #[actix_web::test]
    async fn employee_listing_for_kiosks() {
        let app = test_app!(store());

        let resp = test::call_service(&app, get("/api/employees", Role::System, None).to_request()).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body, json!([
                { "id": 1, "name": "Aziz", "badge_no": 1001 },
                { "id": 2, "name": "Dilnoza", "badge_no": 1002 }
            ]));

        let resp = test::call_service(&app, get("/api/employees", Role::Employee, Some(1)).to_request()).await;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    }
}
