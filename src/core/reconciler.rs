use crate::constants::{BALANCE_EPSILON, TRANSFER_DECIMALS};
use crate::core::ledger::BalanceMap;
use crate::core::models::Transfer;
use std::cmp::Ordering;
use tracing::{debug, warn};

/// Reduce a balance map to a small set of directed payments.
///
/// Greedy largest-debtor / largest-creditor matching. Each emitted amount is
/// rounded to cents while the running remainders keep full precision.
/// Participants within [`BALANCE_EPSILON`] of zero are already settled.
/// Non-finite balances cannot be paid out and are left out of the matching.
pub fn minimal_transfers(balances: &BalanceMap) -> Vec<Transfer> {
    for (address, bal) in balances.iter().filter(|&(_, bal)| !bal.is_finite()) {
        warn!("Skipping non-finite balance {} for {}", bal, address);
    }

    let mut debtors: Vec<(&str, f64)> = balances
        .iter()
        .filter(|&(_, &bal)| bal.is_finite() && bal < -BALANCE_EPSILON)
        .map(|(address, &bal)| (address.as_str(), -bal))
        .collect();
    let mut creditors: Vec<(&str, f64)> = balances
        .iter()
        .filter(|&(_, &bal)| bal.is_finite() && bal > BALANCE_EPSILON)
        .map(|(address, &bal)| (address.as_str(), bal))
        .collect();

    debtors.sort_by(largest_first);
    creditors.sort_by(largest_first);

    let mut transfers = Vec::new();
    let mut i = 0;
    let mut j = 0;

    while i < debtors.len() && j < creditors.len() {
        let (debtor, debt) = debtors[i];
        let (creditor, credit) = creditors[j];

        let settled = debt.min(credit);
        let amount = round_to_cents(settled);
        if amount > 0.0 {
            transfers.push(Transfer {
                from: debtor.to_string(),
                to: creditor.to_string(),
                amount,
            });
        }

        debtors[i].1 = debt - settled;
        creditors[j].1 = credit - settled;

        if debtors[i].1 < BALANCE_EPSILON {
            i += 1;
        }
        if creditors[j].1 < BALANCE_EPSILON {
            j += 1;
        }
    }

    debug!("Reconciled {} balances into {} transfers", balances.len(), transfers.len());
    transfers
}

// Descending by amount, then ascending by address so equal amounts order stably.
fn largest_first(a: &(&str, f64), b: &(&str, f64)) -> Ordering {
    b.1.total_cmp(&a.1).then_with(|| a.0.cmp(b.0))
}

fn round_to_cents(amount: f64) -> f64 {
    let scale = 10f64.powi(TRANSFER_DECIMALS);
    let scaled = amount * scale;
    // Amounts this large carry no fractional digits to round away.
    if !scaled.is_finite() {
        return amount;
    }
    scaled.round() / scale
}
