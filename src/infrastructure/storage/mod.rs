use crate::core::errors::BundleflowError;
use crate::core::models::{Expense, Group, GroupAudit, SettlementBatch};
use async_trait::async_trait;

/// Durable ledger of groups, expenses and settlement history.
///
/// Expenses and settlement batches are append-only and returned in insertion
/// order.
#[async_trait]
pub trait Storage: Send + Sync {
    async fn save_group(&self, group: Group) -> Result<(), BundleflowError>;
    async fn get_group(&self, group_id: &str) -> Result<Option<Group>, BundleflowError>;
    async fn list_groups(&self) -> Result<Vec<Group>, BundleflowError>;
    async fn save_expense(&self, expense: Expense) -> Result<(), BundleflowError>;
    async fn get_expenses(&self, group_id: &str) -> Result<Vec<Expense>, BundleflowError>;
    async fn save_settlement(&self, settlement: SettlementBatch) -> Result<(), BundleflowError>;
    async fn get_settlements(&self, group_id: &str) -> Result<Vec<SettlementBatch>, BundleflowError>;
    async fn save_group_audit(&self, audit: GroupAudit) -> Result<(), BundleflowError>;
    async fn get_group_audits(&self, group_id: &str) -> Result<Vec<GroupAudit>, BundleflowError>;
}

pub mod in_memory;
