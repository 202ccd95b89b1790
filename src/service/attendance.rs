//! The attendance state machine.
//!
//! Per (employee, day) the states are `NoRecord -> ArrivedOnly -> Completed`.
//! An arrival opens the day, one departure closes it, and `Completed` is
//! terminal until the day key changes.

use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime};
use tracing::{debug, error, info};

use crate::error::{ScanError, StorageError};
use crate::model::attendance::{AttendanceRecord, DayState, Direction};
use crate::model::employee::EmployeeSummary;
use crate::service::scan_resolver::{self, ResolvedScan};
use crate::service::work_day::ScanInstant;
use crate::store::{AttendanceLedger, EmployeeDirectory};
use crate::utils::scan_lock::ScanLocks;

/// Write the ledger must perform for an accepted scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    CreateArrival,
    SetDeparture { record: AttendanceRecord },
}

/// Decides the transition for `direction` at `at`, or the rule it breaks.
pub fn decide(
    state: &DayState,
    direction: Direction,
    at: NaiveDateTime,
) -> Result<Transition, ScanError> {
    match (state, direction) {
        (DayState::NoRecord, Direction::Arrival) => Ok(Transition::CreateArrival),
        (DayState::NoRecord, Direction::Departure) => Err(ScanError::ArrivalMissing),
        (DayState::ArrivedOnly(_) | DayState::Completed(_), Direction::Arrival) => {
            Err(ScanError::AlreadyArrived)
        }
        (DayState::ArrivedOnly(record), Direction::Departure) => {
            if at <= record.arrived_at {
                return Err(ScanError::DepartureNotAfterArrival);
            }
            Ok(Transition::SetDeparture {
                record: record.clone(),
            })
        }
        (DayState::Completed(_), Direction::Departure) => Err(ScanError::AlreadyDeparted),
    }
}

/// Which employees a caller may record scans for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanScope {
    AnyEmployee,
    OnlyEmployee(u64),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanOutcome {
    pub employee_id: u64,
    pub direction: Direction,
    pub record: AttendanceRecord,
}

/// An accepted scan together with who was scanned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanReceipt {
    pub employee: EmployeeSummary,
    pub outcome: ScanOutcome,
}

pub struct AttendanceService {
    directory: Arc<dyn EmployeeDirectory>,
    ledger: Arc<dyn AttendanceLedger>,
    locks: ScanLocks,
}

impl AttendanceService {
    pub fn new(
        directory: Arc<dyn EmployeeDirectory>,
        ledger: Arc<dyn AttendanceLedger>,
        locks: ScanLocks,
    ) -> Self {
        Self {
            directory,
            ledger,
            locks,
        }
    }

    /// Resolves `code` and records it as of `instant`.
    pub async fn scan(
        &self,
        code: &str,
        scope: ScanScope,
        instant: ScanInstant,
    ) -> Result<ScanReceipt, ScanError> {
        let candidates = self.directory.employees_with_code(code.trim()).await?;
        let ResolvedScan {
            employee,
            direction,
        } = scan_resolver::resolve(code, &candidates)?;

        if let ScanScope::OnlyEmployee(own_id) = scope {
            if own_id != employee.id {
                info!(own_id, "Scanned code belongs to another employee");
                return Err(ScanError::UnrecognizedCode);
            }
        }

        let outcome = self
            .record_scan(employee.id, direction, instant.at, instant.day)
            .await?;

        Ok(ScanReceipt {
            employee: employee.into(),
            outcome,
        })
    }

    /// Applies one resolved event to the employee's record for `today`.
    pub async fn record_scan(
        &self,
        employee_id: u64,
        direction: Direction,
        at: NaiveDateTime,
        today: NaiveDate,
    ) -> Result<ScanOutcome, ScanError> {
        let _guard = self.locks.acquire(employee_id, today).await;

        let state = DayState::from_record(self.ledger.find_day_record(employee_id, today).await?);
        let transition = decide(&state, direction, at)?;
        debug!(employee_id, %direction, ?transition, "Applying transition");

        let record = match transition {
            Transition::CreateArrival => self
                .ledger
                .create_arrival(employee_id, today, at)
                .await
                .map_err(|e| conflict_as(e, ScanError::AlreadyArrived))?,
            Transition::SetDeparture { mut record } => {
                self.ledger
                    .set_departure(record.id, at)
                    .await
                    .map_err(|e| conflict_as(e, ScanError::AlreadyDeparted))?;
                record.departed_at = Some(at);
                record
            }
        };

        Ok(ScanOutcome {
            employee_id,
            direction,
            record,
        })
    }

    pub async fn history(&self, employee_id: u64) -> Result<Vec<AttendanceRecord>, StorageError> {
        self.ledger.records_for_employee(employee_id).await
    }
}

/// A storage conflict means another writer won the race for this day.
fn conflict_as(err: StorageError, rule: ScanError) -> ScanError {
    match err {
        StorageError::Conflict => rule,
        other => {
            error!(error = %other, "Attendance write failed");
            ScanError::Storage(other)
        }
    }
}
