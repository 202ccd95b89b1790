use chrono::{DateTime, NaiveDate, NaiveDateTime, SubsecRound, Utc};
use chrono_tz::Tz;

/// The wall-clock moment of a request, pinned to the deployment timezone.
///
/// Whole seconds only, matching what the ledger stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanInstant {
    pub day: NaiveDate,
    pub at: NaiveDateTime,
}

impl ScanInstant {
    pub fn from_utc(now: DateTime<Utc>, tz: Tz) -> Self {
        let local = now.with_timezone(&tz).naive_local().trunc_subsecs(0);
        Self {
            day: local.date(),
            at: local,
        }
    }
}

/// Derives "today" once per request so the whole scan sees a single day key.
#[derive(Debug, Clone, Copy)]
pub struct WorkClock {
    tz: Tz,
}

impl WorkClock {
    pub fn new(tz: Tz) -> Self {
        Self { tz }
    }

    pub fn now(&self) -> ScanInstant {
        ScanInstant::from_utc(Utc::now(), self.tz)
    }

    pub fn today(&self) -> NaiveDate {
        self.now().day
    }
}
