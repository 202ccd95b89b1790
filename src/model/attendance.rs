use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use utoipa::ToSchema;

/// One employee's one working day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[schema(example = json!({
    "id": 1,
    "employee_id": 7,
    "work_date": "2026-01-05",
    "arrived_at": "2026-01-05T08:00:00",
    "departed_at": null
}))]
pub struct AttendanceRecord {
    pub id: u64,
    pub employee_id: u64,
    #[schema(value_type = String, format = "date")]
    pub work_date: NaiveDate,
    #[schema(value_type = String, format = "date-time")]
    pub arrived_at: NaiveDateTime,
    #[schema(value_type = Option<String>, format = "date-time", nullable = true)]
    pub departed_at: Option<NaiveDateTime>,
}

/// The meaning of a scanned code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, ToSchema)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Direction {
    Arrival,
    Departure,
}

/// Where an employee stands for a given day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DayState {
    NoRecord,
    ArrivedOnly(AttendanceRecord),
    Completed(AttendanceRecord),
}

impl DayState {
    pub fn from_record(record: Option<AttendanceRecord>) -> Self {
        match record {
            None => DayState::NoRecord,
            Some(r) if r.departed_at.is_some() => DayState::Completed(r),
            Some(r) => DayState::ArrivedOnly(r),
        }
    }
}
