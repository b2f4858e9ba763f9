mod amount_tests;
mod group_tests;
mod ledger_tests;

use crate::config::SettlementConfig;
use crate::core::amount::BaseUnits;
use crate::core::errors::BundleflowError;
use crate::core::models::{AppLog, Expense, Group, GroupAudit, Member, SettlementBatch};
use crate::core::services::BundleflowService;
use crate::core::settlement::SettlementOrchestrator;
use crate::infrastructure::logging::in_memory::InMemoryLogging;
use crate::infrastructure::logging::{LogRecord, LoggingService};
use crate::infrastructure::relay::mock::MockRelay;
use crate::infrastructure::signer::local::LocalSigner;
use crate::infrastructure::signer::{SignedMessage, SignerError, WalletSigner};
use crate::infrastructure::storage::Storage;
use crate::infrastructure::storage::in_memory::InMemoryStorage;
use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::Notify;
use uuid::Uuid;

pub const ALICE: &str = "0xa11ce";
pub const BOB: &str = "0xb0b";
pub const CAROL: &str = "0xca201";

pub type TestService = BundleflowService<InMemoryLogging, InMemoryStorage, MockRelay, TestSigner>;

pub fn usdc(amount: &str) -> BaseUnits {
    BaseUnits::from_decimal(amount, 6).unwrap()
}

pub fn member(address: &str) -> Member {
    Member::new(address, format!("member {}", address))
}

pub fn expense(payer: &str, amount: f64, involved: Option<&[&str]>) -> Expense {
    Expense {
        id: Uuid::new_v4().to_string(),
        group_id: "group".to_string(),
        payer: payer.to_string(),
        amount,
        description: "dinner".to_string(),
        category: None,
        timestamp: Utc::now(),
        involved_members: involved.map(|list| list.iter().map(|a| a.to_string()).collect()),
    }
}

/// Wallet double: signs with a real key, can be told to refuse, and can be
/// held at the signing step until released.
#[derive(Clone)]
pub struct TestSigner {
    inner: Arc<LocalSigner>,
    reject: bool,
    gate: Option<Arc<Notify>>,
    calls: Arc<AtomicUsize>,
}

impl TestSigner {
    pub fn new() -> Self {
        TestSigner {
            inner: Arc::new(LocalSigner::generate()),
            reject: false,
            gate: None,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn rejecting() -> Self {
        TestSigner {
            reject: true,
            ..Self::new()
        }
    }

    pub fn gated(gate: Arc<Notify>) -> Self {
        TestSigner {
            gate: Some(gate),
            ..Self::new()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl WalletSigner for TestSigner {
    async fn sign(&self, message: &[u8]) -> Result<SignedMessage, SignerError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        if self.reject {
            return Err(SignerError::Rejected("user declined".to_string()));
        }
        self.inner.sign(message).await
    }
}

pub fn create_test_orchestrator(relay: MockRelay, signer: TestSigner) -> SettlementOrchestrator<MockRelay, TestSigner> {
    SettlementOrchestrator::new(relay, signer, SettlementConfig::default())
}

pub fn create_test_service(relay: MockRelay) -> TestService {
    let storage = InMemoryStorage::new();
    let logging = InMemoryLogging::new();
    BundleflowService::new(storage, logging, create_test_orchestrator(relay, TestSigner::new()))
}

/// Storage that accepts everything except settlement batches.
#[derive(Clone, Default)]
pub struct SettlementWriteFailure {
    inner: InMemoryStorage,
}

#[async_trait]
impl Storage for SettlementWriteFailure {
    async fn save_group(&self, group: Group) -> Result<(), BundleflowError> {
        self.inner.save_group(group).await
    }
    async fn get_group(&self, group_id: &str) -> Result<Option<Group>, BundleflowError> {
        self.inner.get_group(group_id).await
    }
    async fn list_groups(&self) -> Result<Vec<Group>, BundleflowError> {
        self.inner.list_groups().await
    }
    async fn save_expense(&self, expense: Expense) -> Result<(), BundleflowError> {
        self.inner.save_expense(expense).await
    }
    async fn get_expenses(&self, group_id: &str) -> Result<Vec<Expense>, BundleflowError> {
        self.inner.get_expenses(group_id).await
    }
    async fn save_settlement(&self, _settlement: SettlementBatch) -> Result<(), BundleflowError> {
        Err(BundleflowError::StorageError("disk full".to_string()))
    }
    async fn get_settlements(&self, group_id: &str) -> Result<Vec<SettlementBatch>, BundleflowError> {
        self.inner.get_settlements(group_id).await
    }
    async fn save_group_audit(&self, audit: GroupAudit) -> Result<(), BundleflowError> {
        self.inner.save_group_audit(audit).await
    }
    async fn get_group_audits(&self, group_id: &str) -> Result<Vec<GroupAudit>, BundleflowError> {
        self.inner.get_group_audits(group_id).await
    }
}

/// Logging that refuses one action and records the rest.
#[derive(Clone)]
pub struct RefusingLogging {
    inner: InMemoryLogging,
    refused: &'static str,
}

impl RefusingLogging {
    pub fn new(refused: &'static str) -> Self {
        RefusingLogging {
            inner: InMemoryLogging::new(),
            refused,
        }
    }
}

#[async_trait]
impl LoggingService for RefusingLogging {
    async fn record(&self, record: LogRecord<'_>) -> Result<(), BundleflowError> {
        if record.action == self.refused {
            return Err(BundleflowError::LoggingError("log sink unavailable".to_string()));
        }
        self.inner.record(record).await
    }

    async fn entries(&self, group_id: Option<&str>) -> Result<Vec<AppLog>, BundleflowError> {
        self.inner.entries(group_id).await
    }
}
