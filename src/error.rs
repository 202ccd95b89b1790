use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

/// MySQL error numbers surfaced by the attendance tables.
const ER_DUP_ENTRY: u16 = 1062;
const ER_NO_REFERENCED_ROW: u16 = 1452;

#[derive(Debug, Error)]
pub enum StorageError {
    /// A unique key or guarded update refused the write.
    #[error("conflicting write")]
    Conflict,

    #[error("employee {0} does not exist")]
    UnknownEmployee(u64),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl StorageError {
    /// Classifies a failed write against `employee_id`.
    pub fn from_write(err: sqlx::Error, employee_id: u64) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if let Some(mysql) = db_err.try_downcast_ref::<sqlx::mysql::MySqlDatabaseError>() {
                match mysql.number() {
                    ER_DUP_ENTRY => return StorageError::Conflict,
                    ER_NO_REFERENCED_ROW => return StorageError::UnknownEmployee(employee_id),
                    _ => {}
                }
            }
        }
        StorageError::Database(err)
    }
}

/// Machine-readable rejection kind, serialized in responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum RejectionKind {
    UnrecognizedCode,
    ArrivalMissing,
    AlreadyArrived,
    AlreadyDeparted,
    DepartureNotAfterArrival,
    StorageFailure,
}

/// Why a scan was not recorded.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("Scanned code is not recognized")]
    UnrecognizedCode,

    #[error("You have not logged an arrival today")]
    ArrivalMissing,

    #[error("You already started your workday today")]
    AlreadyArrived,

    #[error("You already logged your departure today")]
    AlreadyDeparted,

    #[error("Departure must be later than arrival")]
    DepartureNotAfterArrival,

    #[error("Attendance storage is unavailable")]
    Storage(#[from] StorageError),
}

impl ScanError {
    pub fn kind(&self) -> RejectionKind {
        match self {
            ScanError::UnrecognizedCode => RejectionKind::UnrecognizedCode,
            ScanError::ArrivalMissing => RejectionKind::ArrivalMissing,
            ScanError::AlreadyArrived => RejectionKind::AlreadyArrived,
            ScanError::AlreadyDeparted => RejectionKind::AlreadyDeparted,
            ScanError::DepartureNotAfterArrival => RejectionKind::DepartureNotAfterArrival,
            ScanError::Storage(_) => RejectionKind::StorageFailure,
        }
    }

    /// True for state machine rule violations, as opposed to lookup or storage failures.
    pub fn is_rule_violation(&self) -> bool {
        matches!(
            self,
            ScanError::ArrivalMissing
                | ScanError::AlreadyArrived
                | ScanError::AlreadyDeparted
                | ScanError::DepartureNotAfterArrival
        )
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RejectionBody {
    #[schema(example = "rejected")]
    pub status: String,
    pub kind: RejectionKind,
    #[schema(example = "You already started your workday today")]
    pub message: String,
}

impl From<&ScanError> for RejectionBody {
    fn from(err: &ScanError) -> Self {
        Self {
            status: "rejected".to_string(),
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}

impl ResponseError for ScanError {
    fn status_code(&self) -> StatusCode {
        match self {
            ScanError::UnrecognizedCode => StatusCode::NOT_FOUND,
            ScanError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::CONFLICT,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(RejectionBody::from(self))
    }
}
