use crate::core::errors::BundleflowError;
use crate::core::models::{Expense, Group, GroupAudit, SettlementBatch};
use crate::infrastructure::storage::Storage;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Clone, Default)]
pub struct InMemoryStorage {
    groups: Arc<RwLock<HashMap<String, Group>>>,
    expenses: Arc<RwLock<HashMap<String, Vec<Expense>>>>,
    settlements: Arc<RwLock<HashMap<String, Vec<SettlementBatch>>>>,
    group_audits: Arc<RwLock<HashMap<String, Vec<GroupAudit>>>>,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Storage for InMemoryStorage {
    async fn save_group(&self, group: Group) -> Result<(), BundleflowError> {
        let mut groups = self.groups.write().await;
        groups.insert(group.id.clone(), group);
        Ok(())
    }

    async fn get_group(&self, group_id: &str) -> Result<Option<Group>, BundleflowError> {
        let groups = self.groups.read().await;
        Ok(groups.get(group_id).cloned())
    }

    async fn list_groups(&self) -> Result<Vec<Group>, BundleflowError> {
        let groups = self.groups.read().await;
        let mut all: Vec<Group> = groups.values().cloned().collect();
        all.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(all)
    }

    async fn save_expense(&self, expense: Expense) -> Result<(), BundleflowError> {
        let mut expenses = self.expenses.write().await;
        expenses.entry(expense.group_id.clone()).or_default().push(expense);
        Ok(())
    }

    async fn get_expenses(&self, group_id: &str) -> Result<Vec<Expense>, BundleflowError> {
        let expenses = self.expenses.read().await;
        Ok(expenses.get(group_id).cloned().unwrap_or_default())
    }

    async fn save_settlement(&self, settlement: SettlementBatch) -> Result<(), BundleflowError> {
        let mut settlements = self.settlements.write().await;
        settlements
            .entry(settlement.group_id.clone())
            .or_default()
            .push(settlement);
        Ok(())
    }

    async fn get_settlements(&self, group_id: &str) -> Result<Vec<SettlementBatch>, BundleflowError> {
        let settlements = self.settlements.read().await;
        Ok(settlements.get(group_id).cloned().unwrap_or_default())
    }

    async fn save_group_audit(&self, audit: GroupAudit) -> Result<(), BundleflowError> {
        let mut group_audits = self.group_audits.write().await;
        group_audits.entry(audit.group_id.clone()).or_default().push(audit);
        Ok(())
    }

    async fn get_group_audits(&self, group_id: &str) -> Result<Vec<GroupAudit>, BundleflowError> {
        let group_audits = self.group_audits.read().await;
        Ok(group_audits.get(group_id).cloned().unwrap_or_default())
    }
}
