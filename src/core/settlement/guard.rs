//! Per-group exclusion for in-flight settlement attempts.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::debug;

#[derive(Clone, Default)]
pub struct InFlightRegistry {
    groups: Arc<Mutex<HashSet<String>>>,
}

impl InFlightRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim the group, or `None` if an attempt already holds it.
    pub fn try_acquire(&self, group_id: &str) -> Option<InFlightGuard> {
        let mut groups = self.groups.lock().unwrap_or_else(PoisonError::into_inner);
        if !groups.insert(group_id.to_string()) {
            return None;
        }
        debug!("Settlement lock acquired for group {}", group_id);
        Some(InFlightGuard {
            group_id: group_id.to_string(),
            groups: Arc::clone(&self.groups),
        })
    }

    pub fn is_in_flight(&self, group_id: &str) -> bool {
        self.groups
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(group_id)
    }
}

/// Releases the group on drop, including when the attempt future is abandoned.
pub struct InFlightGuard {
    group_id: String,
    groups: Arc<Mutex<HashSet<String>>>,
}

impl InFlightGuard {
    pub fn group_id(&self) -> &str {
        &self.group_id
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.groups
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.group_id);
        debug!("Settlement lock released for group {}", self.group_id);
    }
}
