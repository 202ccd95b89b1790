use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::Serialize;
use utoipa::ToSchema;

use crate::error::StorageError;
use crate::store::{RosterRow, RosterSource};

/// Inclusive local-time window, e.g. `06:00-09:00`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl TimeWindow {
    pub fn contains(&self, t: NaiveTime) -> bool {
        t >= self.start && t <= self.end
    }
}

impl FromStr for TimeWindow {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (start, end) = s
            .split_once('-')
            .ok_or_else(|| format!("expected HH:MM-HH:MM, got {s:?}"))?;
        let parse = |v: &str| {
            NaiveTime::parse_from_str(v.trim(), "%H:%M").map_err(|e| format!("{v:?}: {e}"))
        };
        let window = TimeWindow {
            start: parse(start)?,
            end: parse(end)?,
        };
        if window.start > window.end {
            return Err(format!("window {s:?} ends before it starts"));
        }
        Ok(window)
    }
}

impl fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start.format("%H:%M"), self.end.format("%H:%M"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Punctuality {
    OnTime,
    OutsideWindow,
    Missing,
}

impl Punctuality {
    fn classify(at: Option<NaiveDateTime>, window: &TimeWindow) -> Self {
        match at {
            None => Punctuality::Missing,
            Some(t) if window.contains(t.time()) => Punctuality::OnTime,
            Some(_) => Punctuality::OutsideWindow,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RosterEntry {
    pub employee_id: u64,
    pub name: String,
    #[schema(value_type = Option<String>, format = "date-time")]
    pub arrived_at: Option<NaiveDateTime>,
    #[schema(value_type = Option<String>, format = "date-time")]
    pub departed_at: Option<NaiveDateTime>,
    pub arrival: Punctuality,
    pub departure: Punctuality,
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DailyRoster {
    #[schema(value_type = String, format = "date")]
    pub work_date: NaiveDate,
    #[schema(example = "06:00-09:00")]
    pub arrival_window: String,
    #[schema(example = "18:00-23:59")]
    pub departure_window: String,
    pub entries: Vec<RosterEntry>,
}

pub struct RosterService {
    source: Arc<dyn RosterSource>,
    arrival_window: TimeWindow,
    departure_window: TimeWindow,
}

impl RosterService {
    pub fn new(
        source: Arc<dyn RosterSource>,
        arrival_window: TimeWindow,
        departure_window: TimeWindow,
    ) -> Self {
        Self {
            source,
            arrival_window,
            departure_window,
        }
    }

    pub async fn daily(&self, day: NaiveDate) -> Result<DailyRoster, StorageError> {
        let rows = self.source.day_roster(day).await?;
        Ok(DailyRoster {
            work_date: day,
            arrival_window: self.arrival_window.to_string(),
            departure_window: self.departure_window.to_string(),
            entries: rows.into_iter().map(|row| self.entry(row)).collect(),
        })
    }

    fn entry(&self, row: RosterRow) -> RosterEntry {
        RosterEntry {
            arrival: Punctuality::classify(row.arrived_at, &self.arrival_window),
            departure: Punctuality::classify(row.departed_at, &self.departure_window),
            employee_id: row.employee_id,
            name: row.name,
            arrived_at: row.arrived_at,
            departed_at: row.departed_at,
            reason: row.reason,
        }
    }
}
