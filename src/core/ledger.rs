//! Net balance derivation from a group's expense history.
//!
//! Balances are bookkeeping quantities kept as `f64`: equal shares are not
//! generally exact in any fixed-point base. Exactness is reimposed when money
//! actually moves (see [`crate::core::reconciler`] and [`crate::core::amount`]).

use crate::core::models::{Expense, Member, SettlementBatch};
use std::collections::BTreeMap;
use tracing::debug;

/// Address -> net position. Positive means the participant is owed money.
pub type BalanceMap = BTreeMap<String, f64>;

/// Compute every participant's net balance from the full expense list.
///
/// Each payer is credited the full amount and every involved participant is
/// debited an equal share. Addresses referenced by an expense but missing from
/// `participants` are admitted on demand.
pub fn compute_balances(participants: &[Member], expenses: &[Expense]) -> BalanceMap {
    let addresses: Vec<String> = participants.iter().map(|m| m.address.clone()).collect();
    let mut balances: BalanceMap = addresses.iter().map(|a| (a.clone(), 0.0)).collect();

    for expense in expenses {
        let involved = expense.involved(&addresses);
        if involved.is_empty() {
            // No one to divide between; the expense cannot move any balance.
            debug!("Skipping expense {} with no involved participants", expense.id);
            continue;
        }

        let share = expense.amount / involved.len() as f64;
        *balances.entry(expense.payer.clone()).or_insert(0.0) += expense.amount;
        for address in involved {
            *balances.entry(address.clone()).or_insert(0.0) -= share;
        }
    }

    debug!("Balances computed for {} participants", balances.len());
    balances
}

/// Fold confirmed settlement transfers into a balance map.
///
/// A transfer's payer has reduced their debt and its recipient has been paid,
/// so the payer moves up and the recipient moves down by the transfer amount.
pub fn apply_settlements(mut balances: BalanceMap, batches: &[SettlementBatch]) -> BalanceMap {
    for batch in batches.iter().filter(|b| b.is_confirmed()) {
        for transfer in &batch.transfers {
            *balances.entry(transfer.from.clone()).or_insert(0.0) += transfer.amount;
            *balances.entry(transfer.to.clone()).or_insert(0.0) -= transfer.amount;
        }
    }
    balances
}

pub fn balance_total(balances: &BalanceMap) -> f64 {
    balances.values().sum()
}
