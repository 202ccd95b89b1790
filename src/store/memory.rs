//! In-process store used by unit and HTTP tests.
//!
//! Deliberately plain: it does not enforce the (employee, day) unique key,
//! so tests observe the serialization done by the scan lock registry.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use actix_web::rt::task::yield_now;
use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};

use super::{AttendanceLedger, EmployeeDirectory, ReasonLog, RosterRow, RosterSource};
use crate::error::StorageError;
use crate::model::attendance::AttendanceRecord;
use crate::model::employee::{Employee, EmployeeSummary};

#[derive(Default)]
pub struct MemoryStore {
    employees: Vec<Employee>,
    records: Mutex<Vec<AttendanceRecord>>,
    reasons: Mutex<HashMap<(u64, NaiveDate), String>>,
    failing_reason_writes: HashSet<u64>,
}

impl MemoryStore {
    pub fn with_employees(employees: Vec<Employee>) -> Self {
        Self {
            employees,
            ..Self::default()
        }
    }

    /// Makes every reason write for `employee_id` fail with a database error.
    pub fn fail_reason_writes_for(mut self, employee_id: u64) -> Self {
        self.failing_reason_writes.insert(employee_id);
        self
    }

    pub fn records(&self) -> Vec<AttendanceRecord> {
        self.records.lock().unwrap().clone()
    }

    pub fn insert_record(&self, record: AttendanceRecord) {
        self.records.lock().unwrap().push(record);
    }

    pub fn reason(&self, employee_id: u64, day: NaiveDate) -> Option<String> {
        self.reasons.lock().unwrap().get(&(employee_id, day)).cloned()
    }
}

pub fn employee(id: u64, name: &str, check_in: &str, check_out: &str) -> Employee {
    Employee {
        id,
        name: name.to_string(),
        badge_no: 1000 + id,
        check_in_code: check_in.to_string(),
        check_out_code: check_out.to_string(),
    }
}

#[async_trait]
impl EmployeeDirectory for MemoryStore {
    async fn employees_with_code(&self, code: &str) -> Result<Vec<Employee>, StorageError> {
        let mut matches: Vec<Employee> = self
            .employees
            .iter()
            .filter(|e| e.check_in_code == code || e.check_out_code == code)
            .cloned()
            .collect();
        matches.sort_by_key(|e| e.id);
        Ok(matches)
    }

    async fn list_employees(&self) -> Result<Vec<EmployeeSummary>, StorageError> {
        let mut list: Vec<EmployeeSummary> = self.employees.iter().map(Into::into).collect();
        list.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(list)
    }
}

#[async_trait]
impl AttendanceLedger for MemoryStore {
    async fn find_day_record(
        &self,
        employee_id: u64,
        day: NaiveDate,
    ) -> Result<Option<AttendanceRecord>, StorageError> {
        yield_now().await;
        Ok(self
            .records
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.employee_id == employee_id && r.work_date == day)
            .cloned())
    }

    async fn create_arrival(
        &self,
        employee_id: u64,
        day: NaiveDate,
        at: NaiveDateTime,
    ) -> Result<AttendanceRecord, StorageError> {
        yield_now().await;
        let mut records = self.records.lock().unwrap();
        let record = AttendanceRecord {
            id: records.len() as u64 + 1,
            employee_id,
            work_date: day,
            arrived_at: at,
            departed_at: None,
        };
        records.push(record.clone());
        Ok(record)
    }

    async fn set_departure(&self, record_id: u64, at: NaiveDateTime) -> Result<(), StorageError> {
        yield_now().await;
        let mut records = self.records.lock().unwrap();
        match records
            .iter_mut()
            .find(|r| r.id == record_id && r.departed_at.is_none())
        {
            Some(record) => {
                record.departed_at = Some(at);
                Ok(())
            }
            None => Err(StorageError::Conflict),
        }
    }

    async fn records_for_employee(
        &self,
        employee_id: u64,
    ) -> Result<Vec<AttendanceRecord>, StorageError> {
        let mut records: Vec<AttendanceRecord> = self
            .records
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.employee_id == employee_id)
            .cloned()
            .collect();
        records.sort_by(|a, b| b.work_date.cmp(&a.work_date));
        Ok(records)
    }
}

#[async_trait]
impl ReasonLog for MemoryStore {
    async fn upsert_reason(
        &self,
        employee_id: u64,
        day: NaiveDate,
        text: &str,
    ) -> Result<(), StorageError> {
        if self.failing_reason_writes.contains(&employee_id) {
            return Err(StorageError::Database(sqlx::Error::PoolTimedOut));
        }
        if !self.employees.iter().any(|e| e.id == employee_id) {
            return Err(StorageError::UnknownEmployee(employee_id));
        }
        self.reasons
            .lock()
            .unwrap()
            .insert((employee_id, day), text.to_string());
        Ok(())
    }
}

#[async_trait]
impl RosterSource for MemoryStore {
    async fn day_roster(&self, day: NaiveDate) -> Result<Vec<RosterRow>, StorageError> {
        let records = self.records.lock().unwrap();
        let reasons = self.reasons.lock().unwrap();
        let mut rows: Vec<RosterRow> = self
            .employees
            .iter()
            .map(|e| {
                let record = records
                    .iter()
                    .find(|r| r.employee_id == e.id && r.work_date == day);
                RosterRow {
                    employee_id: e.id,
                    name: e.name.clone(),
                    arrived_at: record.map(|r| r.arrived_at),
                    departed_at: record.and_then(|r| r.departed_at),
                    reason: reasons.get(&(e.id, day)).cloned(),
                }
            })
            .collect();
        rows.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(rows)
    }
}
