use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// `from` must pay `amount` to `to`.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct Transfer {
    pub from: String,
    pub to: String,
    pub amount: f64,
}
