pub mod in_memory;

use crate::core::errors::BundleflowError;
use crate::core::models::AppLog;
use async_trait::async_trait;

/// One action to be written to the application log.
#[derive(Clone, Debug)]
pub struct LogRecord<'a> {
    pub group_id: Option<&'a str>,
    pub action: &'a str,
    pub actor: Option<&'a str>,
    /// Must be a JSON object. A `tx_hash` key is lifted onto the entry.
    pub details: serde_json::Value,
}

#[async_trait]
pub trait LoggingService: Send + Sync {
    async fn record(&self, record: LogRecord<'_>) -> Result<(), BundleflowError>;

    /// Entries oldest first, restricted to one group when `group_id` is given.
    async fn entries(&self, group_id: Option<&str>) -> Result<Vec<AppLog>, BundleflowError>;
}
