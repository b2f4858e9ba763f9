use super::{ALICE, BOB, CAROL, expense, member};
use crate::core::ledger::{apply_settlements, balance_total, compute_balances};
use crate::core::models::{SettlementBatch, SettlementStatus, Transfer};
use chrono::Utc;

fn batch(status: SettlementStatus, transfers: Vec<Transfer>) -> SettlementBatch {
    SettlementBatch {
        id: "batch".to_string(),
        group_id: "group".to_string(),
        transfers,
        currency: "USDC".to_string(),
        tx_hash: "0xabc".to_string(),
        timestamp: Utc::now(),
        status,
    }
}

#[test]
fn test_equal_split_among_all_members() {
    let members = vec![member(ALICE), member(BOB), member(CAROL)];
    let balances = compute_balances(&members, &[expense(ALICE, 30.0, None)]);

    assert!((balances[ALICE] - 20.0).abs() < 1e-9);
    assert!((balances[BOB] + 10.0).abs() < 1e-9);
    assert!((balances[CAROL] + 10.0).abs() < 1e-9);
}

#[test]
fn test_balances_sum_to_zero() {
    let members = vec![member(ALICE), member(BOB), member(CAROL)];
    let expenses = vec![
        expense(ALICE, 100.0, None),
        expense(BOB, 33.33, Some(&[ALICE, CAROL])),
        expense(CAROL, 7.01, None),
        expense(ALICE, 0.1, Some(&[BOB])),
    ];
    let balances = compute_balances(&members, &expenses);
    assert!(balance_total(&balances).abs() < 1e-6);
}

#[test]
fn test_involved_subset_only_shares_expense() {
    let members = vec![member(ALICE), member(BOB), member(CAROL)];
    let balances = compute_balances(&members, &[expense(ALICE, 20.0, Some(&[ALICE, BOB]))]);

    assert!((balances[ALICE] - 10.0).abs() < 1e-9);
    assert!((balances[BOB] + 10.0).abs() < 1e-9);
    assert_eq!(balances[CAROL], 0.0);
}

#[test]
fn test_empty_involved_list_means_whole_group() {
    let members = vec![member(ALICE), member(BOB)];
    let balances = compute_balances(&members, &[expense(BOB, 10.0, Some(&[]))]);

    assert!((balances[ALICE] + 5.0).abs() < 1e-9);
    assert!((balances[BOB] - 5.0).abs() < 1e-9);
}

#[test]
fn test_unknown_addresses_are_admitted() {
    let members = vec![member(ALICE)];
    let balances = compute_balances(&members, &[expense("0xdead", 10.0, Some(&[ALICE, "0xbeef"]))]);

    assert_eq!(balances.len(), 3);
    assert!((balances["0xdead"] - 10.0).abs() < 1e-9);
    assert!((balances["0xbeef"] + 5.0).abs() < 1e-9);
}

#[test]
fn test_no_members_and_no_expenses() {
    assert!(compute_balances(&[], &[]).is_empty());
    // Nobody to divide between, so the expense is skipped entirely.
    assert!(compute_balances(&[], &[expense(ALICE, 10.0, None)]).is_empty());
}

#[test]
fn test_inputs_are_not_mutated() {
    let members = vec![member(ALICE), member(BOB)];
    let expenses = vec![expense(ALICE, 12.0, None)];
    let first = compute_balances(&members, &expenses);
    let second = compute_balances(&members, &expenses);
    assert_eq!(first, second);
    assert_eq!(expenses[0].amount, 12.0);
}

#[test]
fn test_confirmed_settlements_reduce_outstanding_balances() {
    let members = vec![member(ALICE), member(BOB), member(CAROL)];
    let balances = compute_balances(&members, &[expense(ALICE, 30.0, None)]);
    let paid = batch(
        SettlementStatus::Confirmed,
        vec![Transfer {
            from: BOB.to_string(),
            to: ALICE.to_string(),
            amount: 10.0,
        }],
    );
    let failed = batch(
        SettlementStatus::Failed,
        vec![Transfer {
            from: CAROL.to_string(),
            to: ALICE.to_string(),
            amount: 10.0,
        }],
    );

    let outstanding = apply_settlements(balances, &[paid, failed]);
    assert!((outstanding[ALICE] - 10.0).abs() < 1e-9);
    assert!(outstanding[BOB].abs() < 1e-9);
    assert!((outstanding[CAROL] + 10.0).abs() < 1e-9);
    assert!(balance_total(&outstanding).abs() < 1e-6);
}
