use crate::api::attendance::{ReasonBatchRequest, ScanAccepted, ScanRequest};
use crate::error::{RejectionBody, RejectionKind};
use crate::model::attendance::{AttendanceRecord, Direction};
use crate::model::employee::EmployeeSummary;
use crate::service::reasons::{ReasonBatchReport, ReasonItem, ReasonItemResult};
use crate::service::roster::{DailyRoster, Punctuality, RosterEntry};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi, openapi};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Davomat API",
        version = "1.0.0",
        description = r#"
## Scan-code attendance

Employees present a personal check-in code when they arrive and a distinct
check-out code when they leave. Every scan is timestamped in the deployment
timezone and checked against the day's record:

- the first arrival of the day opens the record
- one departure closes it
- duplicates and out-of-order scans are rejected with a reason

### Reporting
- Daily roster with on-time flags for arrival and departure windows
- Per-employee history
- Absence and lateness reasons, one per employee per day

### Security
Every endpoint requires a **JWT Bearer** access token. Kiosks use the
`System` role, employees may only record their own codes.
"#,
    ),
    paths(
        crate::api::attendance::scan,
        crate::api::attendance::save_reasons,
        crate::api::attendance::roster,
        crate::api::attendance::employee_history,

        crate::api::employee::list_employees
    ),
    components(
        schemas(
            ScanRequest,
            ScanAccepted,
            RejectionBody,
            RejectionKind,
            Direction,
            AttendanceRecord,
            ReasonBatchRequest,
            ReasonItem,
            ReasonItemResult,
            ReasonBatchReport,
            DailyRoster,
            RosterEntry,
            Punctuality,
            EmployeeSummary
        )
    ),
    modifiers(&BearerAuth),
    tags(
        (name = "Attendance", description = "Scan recording, reasons and reports"),
        (name = "Employee", description = "Employee directory"),
    )
)]
pub struct ApiDoc;

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}
