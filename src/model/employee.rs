use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A directory entry with both personal scan codes.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct Employee {
    pub id: u64,
    pub name: String,
    /// Legacy numeric badge ("son"). Kept for display only, scans resolve by `id`.
    pub badge_no: u64,
    pub check_in_code: String,
    pub check_out_code: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[schema(example = json!({ "id": 1, "name": "Aziz Karimov", "badge_no": 1001 }))]
pub struct EmployeeSummary {
    #[schema(example = 1)]
    pub id: u64,
    #[schema(example = "Aziz Karimov")]
    pub name: String,
    #[schema(example = 1001)]
    pub badge_no: u64,
}

impl From<&Employee> for EmployeeSummary {
    fn from(employee: &Employee) -> Self {
        Self {
            id: employee.id,
            name: employee.name.clone(),
            badge_no: employee.badge_no,
        }
    }
}
