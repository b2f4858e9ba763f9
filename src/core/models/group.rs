use super::member::Member;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub members: Vec<Member>,
    #[schema(value_type = String, example = "2024-06-01T12:34:56Z")]
    pub created_at: DateTime<Utc>,
    pub created_by: Option<String>,
}

impl Group {
    pub fn is_member(&self, address: &str) -> bool {
        self.members.iter().any(|m| m.address == address)
    }

    pub fn member_addresses(&self) -> Vec<String> {
        self.members.iter().map(|m| m.address.clone()).collect()
    }
}
