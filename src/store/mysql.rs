use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use sqlx::MySqlPool;
use tracing::debug;

use super::{AttendanceLedger, EmployeeDirectory, ReasonLog, RosterRow, RosterSource};
use crate::error::StorageError;
use crate::model::attendance::AttendanceRecord;
use crate::model::employee::{Employee, EmployeeSummary};

/// MySQL-backed implementation of every storage contract.
///
/// Holds only the pool; each call checks a connection out and returns it
/// when the query completes.
#[derive(Clone)]
pub struct MySqlStore {
    pool: MySqlPool,
}

impl MySqlStore {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EmployeeDirectory for MySqlStore {
    async fn employees_with_code(&self, code: &str) -> Result<Vec<Employee>, StorageError> {
        let employees = sqlx::query_as::<_, Employee>(
            r#"
            SELECT id, name, badge_no, check_in_code, check_out_code
            FROM employees
            WHERE check_in_code = ? OR check_out_code = ?
            ORDER BY id ASC
            "#,
        )
        .bind(code)
        .bind(code)
        .fetch_all(&self.pool)
        .await?;

        Ok(employees)
    }

    async fn list_employees(&self) -> Result<Vec<EmployeeSummary>, StorageError> {
        let employees = sqlx::query_as::<_, EmployeeSummary>(
            "SELECT id, name, badge_no FROM employees ORDER BY name ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(employees)
    }
}

#[async_trait]
impl AttendanceLedger for MySqlStore {
    async fn find_day_record(
        &self,
        employee_id: u64,
        day: NaiveDate,
    ) -> Result<Option<AttendanceRecord>, StorageError> {
        let record = sqlx::query_as::<_, AttendanceRecord>(
            r#"
            SELECT id, employee_id, work_date, arrived_at, departed_at
            FROM attendance
            WHERE employee_id = ? AND work_date = ?
            "#,
        )
        .bind(employee_id)
        .bind(day)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    async fn create_arrival(
        &self,
        employee_id: u64,
        day: NaiveDate,
        at: NaiveDateTime,
    ) -> Result<AttendanceRecord, StorageError> {
        // uq_attendance_employee_day turns a racing second arrival into ER_DUP_ENTRY
        let result = sqlx::query(
            r#"
            INSERT INTO attendance (employee_id, work_date, arrived_at)
            VALUES (?, ?, ?)
            "#,
        )
        .bind(employee_id)
        .bind(day)
        .bind(at)
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::from_write(e, employee_id))?;

        debug!(employee_id, record_id = result.last_insert_id(), "Arrival stored");

        Ok(AttendanceRecord {
            id: result.last_insert_id(),
            employee_id,
            work_date: day,
            arrived_at: at,
            departed_at: None,
        })
    }

    async fn set_departure(&self, record_id: u64, at: NaiveDateTime) -> Result<(), StorageError> {
        let result = sqlx::query(
            r#"
            UPDATE attendance
            SET departed_at = ?
            WHERE id = ?
            AND departed_at IS NULL
            "#,
        )
        .bind(at)
        .bind(record_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StorageError::Conflict);
        }

        Ok(())
    }

    async fn records_for_employee(
        &self,
        employee_id: u64,
    ) -> Result<Vec<AttendanceRecord>, StorageError> {
        let records = sqlx::query_as::<_, AttendanceRecord>(
            r#"
            SELECT id, employee_id, work_date, arrived_at, departed_at
            FROM attendance
            WHERE employee_id = ?
            ORDER BY work_date DESC
            "#,
        )
        .bind(employee_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }
}

#[async_trait]
impl ReasonLog for MySqlStore {
    async fn upsert_reason(
        &self,
        employee_id: u64,
        day: NaiveDate,
        text: &str,
    ) -> Result<(), StorageError> {
        sqlx::query(
            r#"
            INSERT INTO absence_reasons (employee_id, work_date, reason, updated_at)
            VALUES (?, ?, ?, NOW())
            ON DUPLICATE KEY UPDATE reason = VALUES(reason), updated_at = NOW()
            "#,
        )
        .bind(employee_id)
        .bind(day)
        .bind(text)
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::from_write(e, employee_id))?;

        Ok(())
    }
}

#[async_trait]
impl RosterSource for MySqlStore {
    async fn day_roster(&self, day: NaiveDate) -> Result<Vec<RosterRow>, StorageError> {
        let rows = sqlx::query_as::<_, RosterRow>(
            r#"
            SELECT
                e.id AS employee_id,
                e.name,
                a.arrived_at,
                a.departed_at,
                r.reason
            FROM employees e
            LEFT JOIN attendance a ON a.employee_id = e.id AND a.work_date = ?
            LEFT JOIN absence_reasons r ON r.employee_id = e.id AND r.work_date = ?
            ORDER BY e.name ASC
            "#,
        )
        .bind(day)
        .bind(day)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}
