use tracing::warn;

use crate::error::ScanError;
use crate::model::attendance::Direction;
use crate::model::employee::Employee;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedScan<'a> {
    pub employee: &'a Employee,
    pub direction: Direction,
}

/// Maps a scanned code onto an employee and a direction.
///
/// Candidates are considered in ascending id order; for one employee the
/// check-in code is tried before the check-out code. Further matches mean the
/// directory holds a duplicate code and are only logged.
pub fn resolve<'a>(
    scanned_code: &str,
    employees: &'a [Employee],
) -> Result<ResolvedScan<'a>, ScanError> {
    let code = scanned_code.trim();
    if code.is_empty() {
        return Err(ScanError::UnrecognizedCode);
    }

    let mut ordered: Vec<&Employee> = employees.iter().collect();
    ordered.sort_by_key(|e| e.id);

    let mut matches = ordered.into_iter().flat_map(|e| {
        let arrival = (e.check_in_code == code).then_some(ResolvedScan {
            employee: e,
            direction: Direction::Arrival,
        });
        let departure = (e.check_out_code == code).then_some(ResolvedScan {
            employee: e,
            direction: Direction::Departure,
        });
        arrival.into_iter().chain(departure)
    });

    let first = matches.next().ok_or(ScanError::UnrecognizedCode)?;

    let duplicates: Vec<u64> = matches.map(|m| m.employee.id).collect();
    if !duplicates.is_empty() {
        warn!(
            employee_id = first.employee.id,
            direction = %first.direction,
            ?duplicates,
            "Scan code is assigned more than once in the directory"
        );
    }

    Ok(first)
}
