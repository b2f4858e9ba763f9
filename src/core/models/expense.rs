use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    pub id: String,
    pub group_id: String,
    pub payer: String,
    pub amount: f64,
    pub description: String,
    pub category: Option<String>,
    #[schema(value_type = String, example = "2024-06-01T12:34:56Z")]
    pub timestamp: DateTime<Utc>,
    /// Addresses sharing this expense. `None` or empty means the whole group.
    pub involved_members: Option<Vec<String>>,
}

impl Expense {
    /// The addresses this expense is divided between.
    pub fn involved<'a>(&'a self, participants: &'a [String]) -> &'a [String] {
        match &self.involved_members {
            Some(involved) if !involved.is_empty() => involved,
            _ => participants,
        }
    }
}
