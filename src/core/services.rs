use crate::constants::{
    EXPENSE_ADDED, GROUP_CREATED, INVITE_ISSUED, MAX_DESCRIPTION_LENGTH, MAX_NAME_LENGTH, MEMBER_ADDED, MEMBER_JOINED,
    SETTLEMENT_CONFIRMED, SETTLEMENT_FAILED,
};
use crate::core::errors::{BundleflowError, FieldError, SettlementError};
use crate::core::invite::InvitePayload;
use crate::core::ledger::{BalanceMap, apply_settlements, compute_balances};
use crate::core::models::{AppLog, Expense, Group, GroupAudit, Member, SettlementBatch, Transfer};
use crate::core::reconciler::minimal_transfers;
use crate::core::settlement::{
    SettlementOrchestrator, SettlementOutcome, SettlementRequest, Subscription, TransferRequest,
};
use crate::infrastructure::logging::{LogRecord, LoggingService};
use crate::infrastructure::relay::RelayClient;
use crate::infrastructure::signer::WalletSigner;
use crate::infrastructure::storage::Storage;
use chrono::Utc;
use serde_json::json;
use tracing::{error, info};
use uuid::Uuid;

/// Longest address accepted, in hex digits, excluding the `0x` prefix.
const MAX_ADDRESS_DIGITS: usize = 64;

/// Fields of a new expense as submitted by a group member.
#[derive(Clone, Debug)]
pub struct NewExpense {
    pub payer: String,
    pub amount: f64,
    pub description: String,
    pub category: Option<String>,
    pub involved_members: Option<Vec<String>>,
}

pub struct BundleflowService<L: LoggingService, S: Storage, R: RelayClient, W: WalletSigner> {
    storage: S,
    logging: L,
    orchestrator: SettlementOrchestrator<R, W>,
}

impl<L: LoggingService, S: Storage, R: RelayClient, W: WalletSigner> BundleflowService<L, S, R, W> {
    pub fn new(storage: S, logging: L, orchestrator: SettlementOrchestrator<R, W>) -> Self {
        BundleflowService {
            storage,
            logging,
            orchestrator,
        }
    }

    pub fn orchestrator(&self) -> &SettlementOrchestrator<R, W> {
        &self.orchestrator
    }

    /// Observe settlement attempts that begin after this call.
    pub fn subscribe(&self) -> Subscription {
        self.orchestrator.subscribe()
    }

    async fn load_group(&self, group_id: &str) -> Result<Group, BundleflowError> {
        self.storage
            .get_group(group_id)
            .await?
            .ok_or_else(|| BundleflowError::GroupNotFound(group_id.to_string()))
    }

    async fn validate_group_membership(&self, group_id: &str, address: &str) -> Result<Group, BundleflowError> {
        let group = self.load_group(group_id).await?;
        if !group.is_member(address) {
            return Err(BundleflowError::NotGroupMember(address.to_string()));
        }
        Ok(group)
    }

    async fn log_and_audit(
        &self,
        group_id: Option<&str>,
        action: &str,
        log_details: serde_json::Value,
        actor: Option<&str>,
    ) -> Result<(), BundleflowError> {
        self.logging
            .record(LogRecord {
                group_id,
                action,
                actor,
                details: log_details.clone(),
            })
            .await?;
        if let Some(gid) = group_id {
            self.storage
                .save_group_audit(GroupAudit {
                    id: Uuid::new_v4().to_string(),
                    group_id: gid.to_string(),
                    action: action.to_string(),
                    actor: actor.map(String::from),
                    details: serde_json::from_value(log_details).unwrap_or_default(),
                    timestamp: Utc::now(),
                })
                .await?;
        }
        Ok(())
    }

    fn validate_string_input(&self, field: &str, value: &str, max_length: usize) -> Result<(), BundleflowError> {
        if value.trim().is_empty() {
            return Err(invalid_input(field, format!("Invalid {}", field), format!("{} cannot be empty", field)));
        }
        if value.chars().count() > max_length {
            return Err(invalid_input(
                field,
                format!("{} Too Long", field),
                format!("{} cannot exceed {} characters", field, max_length),
            ));
        }
        if value.chars().any(|c| c.is_control() || "<>{}[]".contains(c)) {
            return Err(invalid_input(
                field,
                format!("Invalid {}", field),
                format!("{} contains invalid characters", field),
            ));
        }
        Ok(())
    }

    fn validate_amount_input(&self, field: &str, amount: f64) -> Result<(), BundleflowError> {
        if !amount.is_finite() {
            return Err(invalid_input(
                field,
                "Invalid Amount".to_string(),
                "Amount must be a finite number".to_string(),
            ));
        }
        if amount <= 0.0 {
            return Err(invalid_input(
                field,
                "Invalid Amount".to_string(),
                "Amount must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }

    /// Create a group. The creator, when given, becomes its first member.
    pub async fn create_group(
        &self,
        name: String,
        description: Option<String>,
        creator: Option<Member>,
    ) -> Result<Group, BundleflowError> {
        self.validate_string_input("name", &name, MAX_NAME_LENGTH)?;
        let description = description.filter(|d| !d.trim().is_empty());
        if let Some(description) = &description {
            self.validate_string_input("description", description, MAX_DESCRIPTION_LENGTH)?;
        }
        if let Some(creator) = &creator {
            validate_address(&creator.address)?;
            self.validate_string_input("member_name", &creator.name, MAX_NAME_LENGTH)?;
        }

        let group = Group {
            id: Uuid::new_v4().to_string(),
            name,
            description,
            created_by: creator.as_ref().map(|c| c.address.clone()),
            members: creator.into_iter().collect(),
            created_at: Utc::now(),
        };
        self.storage.save_group(group.clone()).await?;

        self.log_and_audit(
            Some(&group.id),
            GROUP_CREATED,
            json!({
                "group_id": group.id,
                "name": group.name,
                "member_addresses": group.member_addresses(),
            }),
            group.created_by.as_deref(),
        )
        .await?;
        info!("Group {} created with {} members", group.id, group.members.len());
        Ok(group)
    }

    pub async fn get_group(&self, group_id: &str) -> Result<Group, BundleflowError> {
        self.load_group(group_id).await
    }

    pub async fn list_groups(&self) -> Result<Vec<Group>, BundleflowError> {
        self.storage.list_groups().await
    }

    /// Add `member` to the group. Adding an existing address is a no-op.
    pub async fn add_member(
        &self,
        group_id: &str,
        member: Member,
        added_by: Option<&str>,
    ) -> Result<Group, BundleflowError> {
        validate_address(&member.address)?;
        self.validate_string_input("member_name", &member.name, MAX_NAME_LENGTH)?;
        let mut group = self.load_group(group_id).await?;
        if group.is_member(&member.address) {
            return Ok(group);
        }

        let details = json!({ "group_id": group_id, "address": member.address, "name": member.name });
        group.members.push(member);
        self.storage.save_group(group.clone()).await?;
        self.log_and_audit(Some(group_id), MEMBER_ADDED, details, added_by).await?;
        Ok(group)
    }

    /// Issue an encoded invite for the group on behalf of `inviter`.
    pub async fn invite_payload(&self, group_id: &str, inviter: &str) -> Result<String, BundleflowError> {
        let group = self.validate_group_membership(group_id, inviter).await?;
        let encoded = InvitePayload::new(&group.id, &group.name, inviter).encode()?;
        self.log_and_audit(
            Some(group_id),
            INVITE_ISSUED,
            json!({ "group_id": group_id, "inviter": inviter }),
            Some(inviter),
        )
        .await?;
        Ok(encoded)
    }

    /// Join the group named by an encoded invite. Joining twice is a no-op.
    pub async fn join_by_invite(&self, encoded: &str, address: &str, name: &str) -> Result<Group, BundleflowError> {
        let invite = InvitePayload::decode(encoded)?;
        validate_address(address)?;
        self.validate_string_input("member_name", name, MAX_NAME_LENGTH)?;

        let mut group = self
            .storage
            .get_group(&invite.group_id)
            .await?
            .ok_or(BundleflowError::InvalidInvite)?;
        if group.is_member(address) {
            return Ok(group);
        }

        group.members.push(Member::new(address, name));
        self.storage.save_group(group.clone()).await?;
        self.log_and_audit(
            Some(&group.id),
            MEMBER_JOINED,
            json!({ "group_id": group.id, "address": address, "name": name, "inviter": invite.inviter }),
            Some(address),
        )
        .await?;
        Ok(group)
    }

    pub async fn add_expense(&self, group_id: &str, new: NewExpense) -> Result<Expense, BundleflowError> {
        let group = self.validate_group_membership(group_id, &new.payer).await?;
        self.validate_string_input("description", &new.description, MAX_DESCRIPTION_LENGTH)?;
        self.validate_amount_input("amount", new.amount)?;
        if let Some(category) = &new.category {
            self.validate_string_input("category", category, MAX_NAME_LENGTH)?;
        }

        let involved_members = match new.involved_members {
            Some(involved) if !involved.is_empty() => {
                let mut unique: Vec<String> = Vec::with_capacity(involved.len());
                for address in involved {
                    if !group.is_member(&address) {
                        return Err(BundleflowError::InvalidSplitUser(address));
                    }
                    if !unique.contains(&address) {
                        unique.push(address);
                    }
                }
                Some(unique)
            }
            _ => None,
        };

        let expense = Expense {
            id: Uuid::new_v4().to_string(),
            group_id: group_id.to_string(),
            payer: new.payer,
            amount: new.amount,
            description: new.description,
            category: new.category,
            timestamp: Utc::now(),
            involved_members,
        };

        let mut expenses = self.storage.get_expenses(group_id).await?;
        expenses.push(expense.clone());
        if compute_balances(&group.members, &expenses).values().any(|bal| !bal.is_finite()) {
            return Err(invalid_input(
                "amount",
                "Invalid Amount".to_string(),
                "Amount would overflow the group's balances".to_string(),
            ));
        }
        self.storage.save_expense(expense.clone()).await?;

        self.log_and_audit(
            Some(group_id),
            EXPENSE_ADDED,
            json!({
                "expense_id": expense.id,
                "group_id": group_id,
                "description": expense.description,
                "amount": expense.amount,
                "payer": expense.payer,
            }),
            Some(expense.payer.as_str()),
        )
        .await?;
        Ok(expense)
    }

    pub async fn list_expenses(&self, group_id: &str) -> Result<Vec<Expense>, BundleflowError> {
        self.load_group(group_id).await?;
        self.storage.get_expenses(group_id).await
    }

    /// Outstanding net balances: expenses minus confirmed settlements.
    pub async fn get_balances(&self, group_id: &str) -> Result<BalanceMap, BundleflowError> {
        let group = self.load_group(group_id).await?;
        let expenses = self.storage.get_expenses(group_id).await?;
        let settlements = self.storage.get_settlements(group_id).await?;
        Ok(apply_settlements(compute_balances(&group.members, &expenses), &settlements))
    }

    pub async fn get_transfers(&self, group_id: &str) -> Result<Vec<Transfer>, BundleflowError> {
        let balances = self.get_balances(group_id).await?;
        Ok(minimal_transfers(&balances))
    }

    /// Submit a batch for the group. Sender and recipients must be members.
    pub async fn settle(
        &self,
        group_id: &str,
        request: SettlementRequest,
    ) -> Result<SettlementOutcome, BundleflowError> {
        let group = self.validate_group_membership(group_id, &request.sender).await?;
        if let Some(outsider) = request.transfers.iter().find(|t| !group.is_member(&t.recipient)) {
            return Err(BundleflowError::NotGroupMember(outsider.recipient.clone()));
        }

        match self.orchestrator.settle(group_id, &request, &self.storage).await {
            Ok(outcome) => {
                // Already executed and persisted; audit errors are only logged.
                let audit = self
                    .log_and_audit(
                        Some(group_id),
                        SETTLEMENT_CONFIRMED,
                        json!({
                            "group_id": group_id,
                            "batch_id": outcome.batch.id,
                            "tx_hash": outcome.tx_hash,
                            "currency": outcome.batch.currency,
                            "transfers": outcome.batch.transfers.len(),
                        }),
                        Some(request.sender.as_str()),
                    )
                    .await;
                if let Err(audit_err) = audit {
                    error!(
                        "Failed to record settlement {} for group {}: {}",
                        outcome.tx_hash, group_id, audit_err
                    );
                }
                Ok(outcome)
            }
            Err(err) => {
                let audit = self
                    .log_and_audit(
                        Some(group_id),
                        SETTLEMENT_FAILED,
                        json!({ "group_id": group_id, "error": err.to_string() }),
                        Some(request.sender.as_str()),
                    )
                    .await;
                if let Err(audit_err) = audit {
                    error!("Failed to record settlement failure for group {}: {}", group_id, audit_err);
                }
                Err(err.into())
            }
        }
    }

    /// Pay every outstanding transfer owed by `sender` in one batch.
    pub async fn settle_group(
        &self,
        group_id: &str,
        sender: &str,
        currency: &str,
    ) -> Result<SettlementOutcome, BundleflowError> {
        let transfers: Vec<TransferRequest> = self
            .get_transfers(group_id)
            .await?
            .into_iter()
            .filter(|t| t.from == sender)
            .map(|t| TransferRequest::new(t.to, t.amount, currency))
            .collect();
        if transfers.is_empty() {
            return Err(SettlementError::InvalidRequest(format!("{} has nothing to settle", sender)).into());
        }

        self.settle(
            group_id,
            SettlementRequest {
                sender: sender.to_string(),
                transfers,
            },
        )
        .await
    }

    pub async fn list_settlements(&self, group_id: &str) -> Result<Vec<SettlementBatch>, BundleflowError> {
        self.load_group(group_id).await?;
        self.storage.get_settlements(group_id).await
    }

    pub async fn get_group_audits(&self, group_id: &str) -> Result<Vec<GroupAudit>, BundleflowError> {
        self.load_group(group_id).await?;
        self.storage.get_group_audits(group_id).await
    }

    /// Application log, optionally narrowed to one group.
    pub async fn get_app_logs(&self, group_id: Option<&str>) -> Result<Vec<AppLog>, BundleflowError> {
        self.logging.entries(group_id).await
    }
}

fn invalid_input(field: &str, title: String, description: String) -> BundleflowError {
    BundleflowError::InvalidInput(
        field.to_string(),
        FieldError {
            field: field.to_string(),
            title,
            description,
        },
    )
}

/// Hex account address with an optional `0x` prefix.
fn validate_address(address: &str) -> Result<(), BundleflowError> {
    let digits = address.strip_prefix("0x").unwrap_or(address);
    if digits.is_empty() || digits.len() > MAX_ADDRESS_DIGITS || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(BundleflowError::InvalidAddress(address.to_string()));
    }
    Ok(())
}
