use std::sync::Arc;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{error, info};
use utoipa::ToSchema;

use crate::error::StorageError;
use crate::store::ReasonLog;

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ReasonItem {
    #[schema(example = 7)]
    pub employee_id: u64,
    #[schema(example = "Doctor appointment")]
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ReasonItemResult {
    Saved {
        employee_id: u64,
    },
    Failed {
        employee_id: u64,
        message: String,
    },
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ReasonBatchReport {
    #[schema(value_type = String, format = "date")]
    pub work_date: NaiveDate,
    pub results: Vec<ReasonItemResult>,
}

impl ReasonBatchReport {
    pub fn all_saved(&self) -> bool {
        self.results
            .iter()
            .all(|r| matches!(r, ReasonItemResult::Saved { .. }))
    }
}

pub struct ReasonService {
    log: Arc<dyn ReasonLog>,
}

impl ReasonService {
    pub fn new(log: Arc<dyn ReasonLog>) -> Self {
        Self { log }
    }

    /// Upserts every item for `day`, in submission order.
    ///
    /// A failing item is reported and the rest of the batch still runs, so a
    /// later submission for the same employee still overwrites an earlier one.
    pub async fn submit_batch(&self, day: NaiveDate, items: &[ReasonItem]) -> ReasonBatchReport {
        let mut results = Vec::with_capacity(items.len());

        for item in items {
            let employee_id = item.employee_id;
            let text = item.reason.trim();

            if text.is_empty() {
                results.push(ReasonItemResult::Failed {
                    employee_id,
                    message: "Reason must not be empty".to_string(),
                });
                continue;
            }

            match self.log.upsert_reason(employee_id, day, text).await {
                Ok(()) => results.push(ReasonItemResult::Saved { employee_id }),
                Err(e) => {
                    let message = match &e {
                        StorageError::UnknownEmployee(_) => e.to_string(),
                        _ => {
                            error!(error = %e, employee_id, "Failed to save absence reason");
                            "Failed to save reason".to_string()
                        }
                    };
                    results.push(ReasonItemResult::Failed {
                        employee_id,
                        message,
                    });
                }
            }
        }

        let saved = results
            .iter()
            .filter(|r| matches!(r, ReasonItemResult::Saved { .. }))
            .count();
        info!(%day, saved, failed = results.len() - saved, "Reason batch processed");

        ReasonBatchReport {
            work_date: day,
            results,
        }
    }
}
