use crate::constants::MAX_APP_LOG_ENTRIES;
use crate::core::errors::BundleflowError;
use crate::core::models::AppLog;
use crate::infrastructure::logging::{LogRecord, LoggingService};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Bounded action log; the oldest entry is evicted once `capacity` is reached.
#[derive(Clone)]
pub struct InMemoryLogging {
    entries: Arc<RwLock<VecDeque<AppLog>>>,
    capacity: usize,
}

impl InMemoryLogging {
    pub fn new() -> Self {
        Self::with_capacity(MAX_APP_LOG_ENTRIES)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        InMemoryLogging {
            entries: Arc::new(RwLock::new(VecDeque::new())),
            capacity: capacity.max(1),
        }
    }
}

impl Default for InMemoryLogging {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LoggingService for InMemoryLogging {
    async fn record(&self, record: LogRecord<'_>) -> Result<(), BundleflowError> {
        let details: HashMap<String, serde_json::Value> = serde_json::from_value(record.details).map_err(|e| {
            BundleflowError::LoggingError(format!("{} details must be a JSON object: {}", record.action, e))
        })?;
        let tx_hash = details.get("tx_hash").and_then(|v| v.as_str()).map(String::from);

        let mut entries = self.entries.write().await;
        if entries.len() == self.capacity {
            entries.pop_front();
        }
        entries.push_back(AppLog {
            id: Uuid::new_v4().to_string(),
            group_id: record.group_id.map(String::from),
            action: record.action.to_string(),
            actor: record.actor.map(String::from),
            tx_hash,
            details,
            timestamp: Utc::now(),
        });
        Ok(())
    }

    async fn entries(&self, group_id: Option<&str>) -> Result<Vec<AppLog>, BundleflowError> {
        let entries = self.entries.read().await;
        Ok(entries
            .iter()
            .filter(|entry| group_id.is_none() || entry.group_id.as_deref() == group_id)
            .cloned()
            .collect())
    }
}
