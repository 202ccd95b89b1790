//! Storage contracts for the attendance core.
//!
//! Services hold these as trait objects so the same state machine runs
//! against MySQL in production and against [`memory::MemoryStore`] in tests.

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};

use crate::error::StorageError;
use crate::model::attendance::AttendanceRecord;
use crate::model::employee::{Employee, EmployeeSummary};

pub mod mysql;

#[cfg(test)]
pub mod memory;

/// Read-only view of the employee directory.
#[async_trait]
pub trait EmployeeDirectory: Send + Sync {
    /// Employees whose check-in or check-out code equals `code`, ordered by id.
    async fn employees_with_code(&self, code: &str) -> Result<Vec<Employee>, StorageError>;

    async fn list_employees(&self) -> Result<Vec<EmployeeSummary>, StorageError>;
}

#[async_trait]
pub trait AttendanceLedger: Send + Sync {
    async fn find_day_record(
        &self,
        employee_id: u64,
        day: NaiveDate,
    ) -> Result<Option<AttendanceRecord>, StorageError>;

    /// Fails with [`StorageError::Conflict`] when the day already has a record.
    async fn create_arrival(
        &self,
        employee_id: u64,
        day: NaiveDate,
        at: NaiveDateTime,
    ) -> Result<AttendanceRecord, StorageError>;

    /// Only fills an empty departure; fails with [`StorageError::Conflict`] otherwise.
    async fn set_departure(&self, record_id: u64, at: NaiveDateTime) -> Result<(), StorageError>;

    /// Newest day first.
    async fn records_for_employee(
        &self,
        employee_id: u64,
    ) -> Result<Vec<AttendanceRecord>, StorageError>;
}

#[async_trait]
pub trait ReasonLog: Send + Sync {
    async fn upsert_reason(
        &self,
        employee_id: u64,
        day: NaiveDate,
        text: &str,
    ) -> Result<(), StorageError>;
}

/// One directory row joined with that day's record and reason.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct RosterRow {
    pub employee_id: u64,
    pub name: String,
    pub arrived_at: Option<NaiveDateTime>,
    pub departed_at: Option<NaiveDateTime>,
    pub reason: Option<String>,
}

#[async_trait]
pub trait RosterSource: Send + Sync {
    /// Every employee ordered by name, with the day's attendance if any.
    async fn day_roster(&self, day: NaiveDate) -> Result<Vec<RosterRow>, StorageError>;
}
