//! Drives one settlement batch from a transfer set to a confirmed on-chain result.
//!
//! The five relay/wallet round-trips (quote, balance, prepare, sign, execute) are
//! strictly sequential. Failures at any step are mapped into [`SettlementError`],
//! reported as a `failed` event, and nothing is persisted.

use crate::config::SettlementConfig;
use crate::core::amount::{BaseUnits, decimals_for_currency};
use crate::core::errors::SettlementError;
use crate::core::models::{SettlementBatch, SettlementStatus, Transfer};
use crate::core::settlement::events::{AttemptEvents, SettlementEventKind, SettlementEvents, Subscription};
use crate::core::settlement::guard::InFlightRegistry;
use crate::core::settlement::payload::{BatchPayload, PayloadEntry};
use crate::core::settlement::request::{SettlementOutcome, SettlementRequest};
use crate::core::settlement::state::AttemptState;
use crate::infrastructure::relay::{QuoteRequest, RelayClient, RelayError, SignedTransfer};
use crate::infrastructure::signer::WalletSigner;
use crate::infrastructure::storage::Storage;
use chrono::Utc;
use tracing::{debug, info, warn};
use uuid::Uuid;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum RelayStep {
    Quote,
    Balance,
    Prepare,
    Execute,
}

/// Validated, base-unit form of a settlement request.
struct BatchPlan {
    currency: String,
    decimals: u32,
    entries: Vec<PayloadEntry>,
    total: BaseUnits,
}

impl BatchPlan {
    fn display(&self, amount: BaseUnits) -> String {
        format!("{} {}", amount.to_decimal(self.decimals), self.currency)
    }
}

struct Attempt {
    id: String,
    group_id: String,
    state: AttemptState,
    events: AttemptEvents,
}

impl Attempt {
    fn advance(&mut self, next: AttemptState) {
        debug_assert!(
            self.state.can_advance_to(&next),
            "illegal settlement transition {} -> {}",
            self.state,
            next
        );
        debug!("Attempt {} for group {}: {} -> {}", self.id, self.group_id, self.state, next);
        self.state = next;
    }

    fn fail(mut self, err: SettlementError) -> SettlementError {
        warn!(
            "Settlement attempt {} for group {} failed in state {}: {}",
            self.id, self.group_id, self.state, err
        );
        self.advance(AttemptState::Failed(err.to_string()));
        let tx_hash = match &err {
            SettlementError::PersistFailed { tx_hash, .. } => Some(tx_hash.clone()),
            _ => None,
        };
        self.events.emit(SettlementEventKind::Failed, tx_hash, Some(err.to_string()));
        err
    }
}

pub struct SettlementOrchestrator<R: RelayClient, W: WalletSigner> {
    relay: R,
    signer: W,
    config: SettlementConfig,
    in_flight: InFlightRegistry,
    events: SettlementEvents,
}

impl<R: RelayClient, W: WalletSigner> SettlementOrchestrator<R, W> {
    pub fn new(relay: R, signer: W, config: SettlementConfig) -> Self {
        SettlementOrchestrator {
            relay,
            signer,
            config,
            in_flight: InFlightRegistry::new(),
            events: SettlementEvents::new(),
        }
    }

    pub fn config(&self) -> &SettlementConfig {
        &self.config
    }

    pub fn relay(&self) -> &R {
        &self.relay
    }

    pub fn signer(&self) -> &W {
        &self.signer
    }

    pub fn events(&self) -> &SettlementEvents {
        &self.events
    }

    pub fn subscribe(&self) -> Subscription {
        self.events.subscribe()
    }

    pub fn is_in_flight(&self, group_id: &str) -> bool {
        self.in_flight.is_in_flight(group_id)
    }

    /// Run one settlement attempt for `group_id`.
    ///
    /// The batch is written to `store` only once the relay reports execution.
    /// Dropping the returned future abandons the attempt and releases the group.
    pub async fn settle<S: Storage + ?Sized>(
        &self,
        group_id: &str,
        request: &SettlementRequest,
        store: &S,
    ) -> Result<SettlementOutcome, SettlementError> {
        let plan = self.plan(request)?;
        let _guard = self.in_flight.try_acquire(group_id).ok_or_else(|| {
            warn!("Rejecting settlement for group {}: attempt already in flight", group_id);
            SettlementError::AttemptInFlight(group_id.to_string())
        })?;

        let attempt_id = Uuid::new_v4().to_string();
        let mut attempt = Attempt {
            events: self.events.begin_attempt(&attempt_id, group_id),
            id: attempt_id,
            group_id: group_id.to_string(),
            state: AttemptState::Idle,
        };
        info!(
            "Settlement attempt {} for group {}: {} transfers totalling {}",
            attempt.id,
            group_id,
            plan.entries.len(),
            plan.display(plan.total)
        );
        attempt.events.emit(SettlementEventKind::Initiated, None, None);

        match self.run(&mut attempt, request, plan, store).await {
            Ok(outcome) => Ok(outcome),
            Err(err) => Err(attempt.fail(err)),
        }
    }

    async fn run<S: Storage + ?Sized>(
        &self,
        attempt: &mut Attempt,
        request: &SettlementRequest,
        plan: BatchPlan,
        store: &S,
    ) -> Result<SettlementOutcome, SettlementError> {
        let chain_id = self.config.chain_id.as_str();

        attempt.advance(AttemptState::QuoteRequested);
        let quote = self
            .relay
            .get_quote(&QuoteRequest {
                sender: request.sender.clone(),
                recipient_contract: self.config.contract_address.clone(),
                currency: plan.currency.clone(),
                amount: plan.total,
                chain_id: chain_id.to_string(),
            })
            .await
            .map_err(|e| self.map_relay_error(RelayStep::Quote, e, &plan, None))?;
        attempt.advance(AttemptState::Quoted);
        debug!("Quote received: relayer fee {}", plan.display(quote.relayer_fee()));

        let required = plan
            .total
            .checked_add(quote.relayer_fee())
            .map_err(|e| SettlementError::MalformedPayload(e.to_string()))?;
        let balance = self
            .relay
            .get_balance(chain_id, &request.sender, &plan.currency)
            .await
            .map_err(|e| self.map_relay_error(RelayStep::Balance, e, &plan, Some(required)))?;
        if balance < required {
            return Err(SettlementError::InsufficientBalance {
                required: plan.display(required),
                available: plan.display(balance),
            });
        }
        attempt.advance(AttemptState::BalanceVerified);

        if quote.is_expired_at(Utc::now()) {
            return Err(SettlementError::PrepareFailed(
                "quote expired before the transfer was prepared".to_string(),
            ));
        }
        let payload = BatchPayload::build(self.config.function_id(), plan.entries.clone())?;
        let prepared = self
            .relay
            .prepare_transfer(&payload, &quote)
            .await
            .map_err(|e| self.map_relay_error(RelayStep::Prepare, e, &plan, Some(required)))?;
        attempt.advance(AttemptState::Prepared);

        let signed = self
            .signer
            .sign(&prepared.message)
            .await
            .map_err(|e| SettlementError::SignatureRejected(e.to_string()))?;
        attempt.advance(AttemptState::Signed);
        attempt.events.emit(SettlementEventKind::Signed, None, None);

        attempt.advance(AttemptState::Submitted);
        attempt.events.emit(SettlementEventKind::Submitted, None, None);
        let receipt = self
            .relay
            .execute_transfer(
                &SignedTransfer {
                    signed,
                    function_name: self.config.function_name.clone(),
                },
                chain_id,
            )
            .await
            .map_err(|e| self.map_relay_error(RelayStep::Execute, e, &plan, Some(required)))?;

        let batch = SettlementBatch {
            id: Uuid::new_v4().to_string(),
            group_id: attempt.group_id.clone(),
            transfers: plan
                .entries
                .iter()
                .map(|entry| Transfer {
                    from: request.sender.clone(),
                    to: entry.recipient.clone(),
                    amount: entry.amount.to_f64(plan.decimals),
                })
                .collect(),
            currency: plan.currency.clone(),
            tx_hash: receipt.tx_hash.clone(),
            timestamp: Utc::now(),
            status: SettlementStatus::Confirmed,
        };
        store
            .save_settlement(batch.clone())
            .await
            .map_err(|e| SettlementError::PersistFailed {
                tx_hash: receipt.tx_hash.clone(),
                reason: e.to_string(),
            })?;

        attempt.advance(AttemptState::Confirmed);
        attempt
            .events
            .emit(SettlementEventKind::Confirmed, Some(receipt.tx_hash.clone()), None);
        info!(
            "Settlement attempt {} confirmed for group {} in {}",
            attempt.id, attempt.group_id, receipt.tx_hash
        );

        Ok(SettlementOutcome {
            attempt_id: attempt.id.clone(),
            tx_hash: receipt.tx_hash,
            relayer_fee: quote.relayer_fee().to_decimal(plan.decimals),
            batch,
        })
    }

    fn plan(&self, request: &SettlementRequest) -> Result<BatchPlan, SettlementError> {
        if request.sender.trim().is_empty() {
            return Err(SettlementError::InvalidRequest("sender is required".to_string()));
        }
        let first = request
            .transfers
            .first()
            .ok_or_else(|| SettlementError::InvalidRequest("no transfers to settle".to_string()))?;
        let currency = first.currency.clone();
        let decimals = decimals_for_currency(&currency);

        let mut entries = Vec::with_capacity(request.transfers.len());
        let mut total = BaseUnits::ZERO;
        for transfer in &request.transfers {
            if transfer.currency != currency {
                return Err(SettlementError::InvalidRequest(format!(
                    "batch mixes {} and {}",
                    currency, transfer.currency
                )));
            }
            if transfer.recipient.trim().is_empty() || transfer.recipient == request.sender {
                return Err(SettlementError::InvalidRequest(format!(
                    "invalid recipient {:?}",
                    transfer.recipient
                )));
            }
            let amount = BaseUnits::from_decimal(&transfer.amount, decimals)
                .map_err(|e| SettlementError::InvalidRequest(e.to_string()))?;
            if amount.is_zero() {
                return Err(SettlementError::InvalidRequest(format!(
                    "transfer to {} has no amount at {} decimals",
                    transfer.recipient, decimals
                )));
            }
            total = total
                .checked_add(amount)
                .map_err(|e| SettlementError::InvalidRequest(e.to_string()))?;
            entries.push(PayloadEntry {
                recipient: transfer.recipient.clone(),
                amount,
            });
        }

        Ok(BatchPlan {
            currency,
            decimals,
            entries,
            total,
        })
    }

    fn map_relay_error(
        &self,
        step: RelayStep,
        err: RelayError,
        plan: &BatchPlan,
        required: Option<BaseUnits>,
    ) -> SettlementError {
        warn!("Relay error during {:?}: {} ({})", step, err.message, err.code);
        match err.code.as_str() {
            RelayError::INSUFFICIENT_BALANCE => SettlementError::InsufficientBalance {
                required: required.map_or_else(|| plan.display(plan.total), |r| plan.display(r)),
                available: "unknown".to_string(),
            },
            RelayError::SIGNATURE_REJECTED => SettlementError::SignatureRejected(err.message),
            _ => match step {
                RelayStep::Quote | RelayStep::Balance => SettlementError::QuoteFailed(err.message),
                RelayStep::Prepare => SettlementError::PrepareFailed(err.message),
                RelayStep::Execute => SettlementError::SubmitFailed(err.message),
            },
        }
    }
}
