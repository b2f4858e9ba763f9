//! Lifecycle event delivery for settlement attempts.
//!
//! Each subscriber owns an unbounded channel. An attempt snapshots the
//! subscriber set when it begins, so a subscriber only ever observes attempts
//! that started after it subscribed. Dropping a [`Subscription`] unsubscribes.

use chrono::{DateTime, Utc};
use futures::Stream;
use serde::Serialize;
use std::collections::HashMap;
use std::pin::Pin;
use std::sync::{Arc, Mutex, PoisonError, Weak};
use std::task::{Context, Poll};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::warn;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SettlementEventKind {
    Initiated,
    Signed,
    Submitted,
    Confirmed,
    Failed,
}

impl SettlementEventKind {
    /// Whether this event may be emitted after `previous` within one attempt.
    pub fn may_follow(self, previous: Option<SettlementEventKind>) -> bool {
        use SettlementEventKind::*;
        match (previous, self) {
            (None, Initiated) => true,
            (Some(Initiated), Signed) | (Some(Signed), Submitted) | (Some(Submitted), Confirmed) => true,
            (Some(Initiated | Signed | Submitted), Failed) => true,
            _ => false,
        }
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct SettlementEvent {
    pub attempt_id: String,
    pub group_id: String,
    pub kind: SettlementEventKind,
    pub tx_hash: Option<String>,
    pub error: Option<String>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Default)]
struct Subscribers {
    next_id: u64,
    senders: HashMap<u64, UnboundedSender<SettlementEvent>>,
}

#[derive(Clone, Default)]
pub struct SettlementEvents {
    inner: Arc<Mutex<Subscribers>>,
}

impl SettlementEvents {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self) -> Subscription {
        let (sender, receiver) = mpsc::unbounded_channel();
        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        let id = inner.next_id;
        inner.next_id += 1;
        inner.senders.insert(id, sender);
        Subscription {
            id,
            receiver,
            hub: Arc::downgrade(&self.inner),
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .senders
            .len()
    }

    pub(crate) fn begin_attempt(&self, attempt_id: &str, group_id: &str) -> AttemptEvents {
        let recipients = self
            .inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .senders
            .values()
            .cloned()
            .collect();
        AttemptEvents {
            attempt_id: attempt_id.to_string(),
            group_id: group_id.to_string(),
            recipients,
            last: None,
        }
    }
}

/// Ordered event sink for one attempt.
pub(crate) struct AttemptEvents {
    attempt_id: String,
    group_id: String,
    recipients: Vec<UnboundedSender<SettlementEvent>>,
    last: Option<SettlementEventKind>,
}

impl AttemptEvents {
    pub(crate) fn emit(&mut self, kind: SettlementEventKind, tx_hash: Option<String>, error: Option<String>) -> bool {
        if !kind.may_follow(self.last) {
            warn!(
                "Dropping out-of-order {:?} event after {:?} for attempt {}",
                kind, self.last, self.attempt_id
            );
            return false;
        }

        let event = SettlementEvent {
            attempt_id: self.attempt_id.clone(),
            group_id: self.group_id.clone(),
            kind,
            tx_hash,
            error,
            timestamp: Utc::now(),
        };
        // Closed receivers belong to subscribers that left mid-attempt.
        self.recipients.retain(|sender| sender.send(event.clone()).is_ok());
        self.last = Some(kind);
        true
    }
}

pub struct Subscription {
    id: u64,
    receiver: UnboundedReceiver<SettlementEvent>,
    hub: Weak<Mutex<Subscribers>>,
}

impl Subscription {
    pub async fn recv(&mut self) -> Option<SettlementEvent> {
        self.receiver.recv().await
    }

    pub fn try_recv(&mut self) -> Option<SettlementEvent> {
        self.receiver.try_recv().ok()
    }

    /// Drain everything delivered so far.
    pub fn drain(&mut self) -> Vec<SettlementEvent> {
        std::iter::from_fn(|| self.try_recv()).collect()
    }

    /// Stop receiving events. Dropping the subscription has the same effect.
    pub fn unsubscribe(self) {
        drop(self);
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(hub) = self.hub.upgrade() {
            hub.lock()
                .unwrap_or_else(PoisonError::into_inner)
                .senders
                .remove(&self.id);
        }
    }
}

impl Stream for Subscription {
    type Item = SettlementEvent;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.get_mut().receiver.poll_recv(cx)
    }
}
