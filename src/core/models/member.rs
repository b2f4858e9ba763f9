use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A group participant, identified by their wallet address.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    pub address: String,
    pub name: String,
    #[schema(value_type = String, example = "2024-06-01T12:34:56Z")]
    pub joined_at: DateTime<Utc>,
}

impl Member {
    pub fn new(address: impl Into<String>, name: impl Into<String>) -> Self {
        Member {
            address: address.into(),
            name: name.into(),
            joined_at: Utc::now(),
        }
    }
}
