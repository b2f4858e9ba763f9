//! In-memory relay for development and tests.
//!
//! Quotes a fixed relayer fee, tracks balances per (address, currency), debits
//! the sender on execution, and can be scripted to fail any call.

use crate::core::amount::BaseUnits;
use crate::core::settlement::payload::BatchPayload;
use crate::infrastructure::relay::{
    ExecutionReceipt, PreparedMessage, Quote, QuoteRequest, QuoteToken, RelayClient, RelayError, SignedTransfer,
};
use async_trait::async_trait;
use chrono::{Duration, Utc};
use serde_json::json;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::debug;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RelayCall {
    Quote,
    Balance,
    Prepare,
    Execute,
}

struct PendingDebit {
    sender: String,
    currency: String,
    total: BaseUnits,
}

#[derive(Default)]
struct MockState {
    balances: HashMap<(String, String), BaseUnits>,
    calls: Vec<RelayCall>,
    failures: HashMap<RelayCall, RelayError>,
    prepared: HashMap<Vec<u8>, PendingDebit>,
    executed: Vec<String>,
    next_quote: u64,
}

#[derive(Clone)]
pub struct MockRelay {
    state: Arc<Mutex<MockState>>,
    relayer_fee: BaseUnits,
    default_balance: BaseUnits,
    quote_ttl: Duration,
}

impl Default for MockRelay {
    fn default() -> Self {
        MockRelay {
            state: Arc::new(Mutex::new(MockState::default())),
            relayer_fee: BaseUnits::ZERO,
            default_balance: BaseUnits::ZERO,
            quote_ttl: Duration::minutes(5),
        }
    }
}

impl MockRelay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_relayer_fee(mut self, fee: BaseUnits) -> Self {
        self.relayer_fee = fee;
        self
    }

    /// Balance reported for accounts that were never funded explicitly.
    pub fn with_default_balance(mut self, balance: BaseUnits) -> Self {
        self.default_balance = balance;
        self
    }

    pub fn with_quote_ttl(mut self, ttl: Duration) -> Self {
        self.quote_ttl = ttl;
        self
    }

    pub fn set_balance(&self, address: &str, currency: &str, balance: BaseUnits) {
        self.lock()
            .balances
            .insert((address.to_string(), currency.to_string()), balance);
    }

    pub fn balance_of(&self, address: &str, currency: &str) -> BaseUnits {
        let state = self.lock();
        self.lookup_balance(&state, address, currency)
    }

    /// Make every subsequent `call` fail with `error` until cleared.
    pub fn fail_on(&self, call: RelayCall, error: RelayError) {
        self.lock().failures.insert(call, error);
    }

    pub fn clear_failures(&self) {
        self.lock().failures.clear();
    }

    pub fn calls(&self) -> Vec<RelayCall> {
        self.lock().calls.clone()
    }

    pub fn executed(&self) -> Vec<String> {
        self.lock().executed.clone()
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lookup_balance(&self, state: &MockState, address: &str, currency: &str) -> BaseUnits {
        state
            .balances
            .get(&(address.to_string(), currency.to_string()))
            .copied()
            .unwrap_or(self.default_balance)
    }

    fn record(&self, call: RelayCall) -> Result<MutexGuard<'_, MockState>, RelayError> {
        let mut state = self.lock();
        state.calls.push(call);
        match state.failures.get(&call) {
            Some(error) => Err(error.clone()),
            None => Ok(state),
        }
    }
}

#[async_trait]
impl RelayClient for MockRelay {
    async fn get_quote(&self, request: &QuoteRequest) -> Result<Quote, RelayError> {
        let mut state = self.record(RelayCall::Quote)?;
        state.next_quote += 1;
        let token = json!({
            "quoteId": format!("quote-{}", state.next_quote),
            "from": request.sender,
            "to": request.recipient_contract,
            "token": request.currency,
            "amount": request.amount.to_string(),
            "relayerFee": self.relayer_fee.to_string(),
        });
        debug!("Mock relay quoted {} for {}", request.amount, request.sender);
        Ok(Quote::new(
            request.amount,
            self.relayer_fee,
            request.chain_id.clone(),
            Utc::now() + self.quote_ttl,
            QuoteToken::new(token),
        ))
    }

    async fn get_balance(&self, _chain_id: &str, address: &str, currency: &str) -> Result<BaseUnits, RelayError> {
        let state = self.record(RelayCall::Balance)?;
        Ok(self.lookup_balance(&state, address, currency))
    }

    async fn prepare_transfer(&self, payload: &BatchPayload, quote: &Quote) -> Result<PreparedMessage, RelayError> {
        let mut state = self.record(RelayCall::Prepare)?;
        let raw = quote.token().as_raw();
        let field = |name: &str| raw.get(name).and_then(|v| v.as_str()).map(str::to_string);
        let (Some(sender), Some(currency)) = (field("from"), field("token")) else {
            return Err(RelayError::new("INVALID_QUOTE", "quote was not issued by this relay"));
        };

        let total = payload
            .entries
            .iter()
            .try_fold(quote.relayer_fee(), |acc, entry| acc.checked_add(entry.amount))
            .map_err(|e| RelayError::new("INVALID_PAYLOAD", e.to_string()))?;

        let message = serde_json::to_vec(&json!({
            "quote": raw,
            "function": payload.function,
            "arguments": format!("0x{}", hex::encode(&payload.arguments)),
        }))
        .map_err(|e| RelayError::new("INVALID_PAYLOAD", e.to_string()))?;

        state.prepared.insert(
            message.clone(),
            PendingDebit {
                sender,
                currency,
                total,
            },
        );
        Ok(PreparedMessage { message })
    }

    async fn execute_transfer(&self, signed: &SignedTransfer, _chain_id: &str) -> Result<ExecutionReceipt, RelayError> {
        let mut state = self.record(RelayCall::Execute)?;
        if signed.signed.signature.is_empty() {
            return Err(RelayError::new(RelayError::SIGNATURE_REJECTED, "missing signature"));
        }
        let message = signed.signed.transaction_bytes.clone().unwrap_or_default();
        let Some(pending) = state.prepared.remove(&message) else {
            return Err(RelayError::new("UNKNOWN_TRANSACTION", "transaction was not prepared by this relay"));
        };

        let balance = self.lookup_balance(&state, &pending.sender, &pending.currency);
        let Some(remaining) = balance.value().checked_sub(pending.total.value()) else {
            return Err(RelayError::new(
                RelayError::INSUFFICIENT_BALANCE,
                "balance does not cover amount and fee",
            ));
        };
        state
            .balances
            .insert((pending.sender, pending.currency), BaseUnits::new(remaining));

        let tx_hash = format!("0x{}", hex::encode(rand::random::<[u8; 32]>()));
        state.executed.push(tx_hash.clone());
        debug!("Mock relay executed {}", tx_hash);
        Ok(ExecutionReceipt { tx_hash })
    }
}
