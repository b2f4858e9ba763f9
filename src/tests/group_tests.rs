use super::{
    ALICE, BOB, CAROL, RefusingLogging, TestSigner, create_test_orchestrator, create_test_service, member, usdc,
};
use crate::constants::{EXPENSE_ADDED, GROUP_CREATED, MEMBER_JOINED, SETTLEMENT_CONFIRMED, SETTLEMENT_FAILED};
use crate::core::errors::{BundleflowError, SettlementError};
use crate::core::models::Group;
use crate::core::services::{BundleflowService, NewExpense};
use crate::core::settlement::{SettlementEventKind, SettlementRequest, TransferRequest};
use crate::infrastructure::logging::LoggingService;
use crate::infrastructure::relay::RelayClient;
use crate::infrastructure::relay::mock::MockRelay;
use crate::infrastructure::signer::WalletSigner;
use crate::infrastructure::storage::Storage;
use crate::infrastructure::storage::in_memory::InMemoryStorage;
use base64::{Engine as _, engine::general_purpose::STANDARD};

fn new_expense(payer: &str, amount: f64, involved: Option<Vec<&str>>) -> NewExpense {
    NewExpense {
        payer: payer.to_string(),
        amount,
        description: "Groceries".to_string(),
        category: Some("food".to_string()),
        involved_members: involved.map(|list| list.into_iter().map(String::from).collect()),
    }
}

fn funded_relay() -> MockRelay {
    MockRelay::new()
        .with_default_balance(usdc("1000"))
        .with_relayer_fee(usdc("0.01"))
}

async fn group_of_three<L, S, R, W>(service: &BundleflowService<L, S, R, W>) -> Group
where
    L: LoggingService,
    S: Storage,
    R: RelayClient,
    W: WalletSigner,
{
    let group = service
        .create_group("Trip".to_string(), Some("Lisbon".to_string()), Some(member(ALICE)))
        .await
        .unwrap();
    service.add_member(&group.id, member(BOB), Some(ALICE)).await.unwrap();
    service.add_member(&group.id, member(CAROL), Some(ALICE)).await.unwrap()
}

#[tokio::test]
async fn test_create_group_adds_creator() {
    let service = create_test_service(MockRelay::new());
    let group = service
        .create_group("Trip".to_string(), None, Some(member(ALICE)))
        .await
        .unwrap();

    assert_eq!(group.name, "Trip");
    assert_eq!(group.created_by.as_deref(), Some(ALICE));
    assert_eq!(group.member_addresses(), vec![ALICE.to_string()]);
    assert_eq!(service.get_group(&group.id).await.unwrap().id, group.id);
    assert_eq!(service.list_groups().await.unwrap().len(), 1);

    let audits = service.get_group_audits(&group.id).await.unwrap();
    assert_eq!(audits.len(), 1);
    assert_eq!(audits[0].action, GROUP_CREATED);
    let logs = service.get_app_logs(None).await.unwrap();
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0].group_id.as_deref(), Some(group.id.as_str()));
    assert!(service.get_app_logs(Some("other")).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_create_group_validates_input() {
    let service = create_test_service(MockRelay::new());
    assert!(matches!(
        service.create_group("  ".to_string(), None, None).await,
        Err(BundleflowError::InvalidInput(..))
    ));
    assert!(matches!(
        service.create_group("a".repeat(101), None, None).await,
        Err(BundleflowError::InvalidInput(..))
    ));
    assert!(matches!(
        service.create_group("<script>".to_string(), None, None).await,
        Err(BundleflowError::InvalidInput(..))
    ));
    assert!(matches!(
        service
            .create_group("Trip".to_string(), None, Some(member("alice")))
            .await,
        Err(BundleflowError::InvalidAddress(_))
    ));
}

#[tokio::test]
async fn test_add_member_is_idempotent() {
    let service = create_test_service(MockRelay::new());
    let group = group_of_three(&service).await;
    let again = service.add_member(&group.id, member(BOB), None).await.unwrap();

    assert_eq!(again.members.len(), 3);
    assert!(matches!(
        service.add_member("missing", member(BOB), None).await,
        Err(BundleflowError::GroupNotFound(_))
    ));
}

#[tokio::test]
async fn test_join_by_invite() {
    let service = create_test_service(MockRelay::new());
    let group = service
        .create_group("Trip".to_string(), None, Some(member(ALICE)))
        .await
        .unwrap();
    let invite = service.invite_payload(&group.id, ALICE).await.unwrap();

    let joined = service.join_by_invite(&invite, BOB, "Bob").await.unwrap();
    assert!(joined.is_member(BOB));
    let again = service.join_by_invite(&invite, BOB, "Bob").await.unwrap();
    assert_eq!(again.members.len(), 2);

    let audits = service.get_group_audits(&group.id).await.unwrap();
    assert_eq!(audits.iter().filter(|a| a.action == MEMBER_JOINED).count(), 1);
}

#[tokio::test]
async fn test_join_rejects_bad_invites_without_side_effects() {
    let service = create_test_service(MockRelay::new());
    let group = service
        .create_group("Trip".to_string(), None, Some(member(ALICE)))
        .await
        .unwrap();

    let foreign = STANDARD.encode(format!(
        r#"{{"type":"other","groupId":"{}","groupName":"Trip","inviter":"{}","ts":1}}"#,
        group.id, ALICE
    ));
    let unknown_group = STANDARD.encode(
        r#"{"type":"bundleflow_group","groupId":"nope","groupName":"Trip","inviter":"0x1","ts":1}"#,
    );

    assert!(matches!(
        service.join_by_invite(&foreign, BOB, "Bob").await,
        Err(BundleflowError::InvalidInvite)
    ));
    assert!(matches!(
        service.join_by_invite(&unknown_group, BOB, "Bob").await,
        Err(BundleflowError::InvalidInvite)
    ));
    assert!(matches!(
        service.join_by_invite("%%%", BOB, "Bob").await,
        Err(BundleflowError::MalformedPayload(_))
    ));
    assert_eq!(service.get_group(&group.id).await.unwrap().members.len(), 1);
}

#[tokio::test]
async fn test_only_members_issue_invites() {
    let service = create_test_service(MockRelay::new());
    let group = service
        .create_group("Trip".to_string(), None, Some(member(ALICE)))
        .await
        .unwrap();
    assert!(matches!(
        service.invite_payload(&group.id, BOB).await,
        Err(BundleflowError::NotGroupMember(_))
    ));
}

#[tokio::test]
async fn test_add_expense_and_balances() {
    let service = create_test_service(MockRelay::new());
    let group = group_of_three(&service).await;

    let expense = service
        .add_expense(&group.id, new_expense(ALICE, 30.0, None))
        .await
        .unwrap();
    assert_eq!(expense.involved_members, None);
    service
        .add_expense(&group.id, new_expense(BOB, 10.0, Some(vec![BOB, CAROL, CAROL])))
        .await
        .unwrap();

    let expenses = service.list_expenses(&group.id).await.unwrap();
    assert_eq!(expenses.len(), 2);
    assert_eq!(
        expenses[1].involved_members,
        Some(vec![BOB.to_string(), CAROL.to_string()])
    );

    let balances = service.get_balances(&group.id).await.unwrap();
    assert!((balances[ALICE] - 20.0).abs() < 1e-9);
    assert!((balances[BOB] + 5.0).abs() < 1e-9);
    assert!((balances[CAROL] + 15.0).abs() < 1e-9);

    let transfers = service.get_transfers(&group.id).await.unwrap();
    assert_eq!(transfers.len(), 2);
    assert_eq!(transfers[0].from, CAROL);
    assert_eq!(transfers[0].amount, 15.0);

    let audits = service.get_group_audits(&group.id).await.unwrap();
    assert_eq!(audits.iter().filter(|a| a.action == EXPENSE_ADDED).count(), 2);
}

#[tokio::test]
async fn test_add_expense_validation() {
    let service = create_test_service(MockRelay::new());
    let group = group_of_three(&service).await;

    for amount in [0.0, -5.0, f64::NAN, f64::INFINITY] {
        assert!(matches!(
            service.add_expense(&group.id, new_expense(ALICE, amount, None)).await,
            Err(BundleflowError::InvalidInput(..))
        ));
    }
    assert!(matches!(
        service.add_expense(&group.id, new_expense("0xdead", 10.0, None)).await,
        Err(BundleflowError::NotGroupMember(_))
    ));
    assert!(matches!(
        service
            .add_expense(&group.id, new_expense(ALICE, 10.0, Some(vec![ALICE, "0xdead"])))
            .await,
        Err(BundleflowError::InvalidSplitUser(_))
    ));
    let mut blank = new_expense(ALICE, 10.0, None);
    blank.description = String::new();
    assert!(matches!(
        service.add_expense(&group.id, blank).await,
        Err(BundleflowError::InvalidInput(..))
    ));
    assert!(service.list_expenses(&group.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_settle_group_pays_outstanding_debts() {
    let relay = funded_relay();
    let service = create_test_service(relay.clone());
    let group = group_of_three(&service).await;
    service
        .add_expense(&group.id, new_expense(ALICE, 30.0, None))
        .await
        .unwrap();
    let mut events = service.subscribe();

    let outcome = service.settle_group(&group.id, BOB, "USDC").await.unwrap();
    assert_eq!(outcome.batch.transfers.len(), 1);
    assert_eq!(outcome.batch.transfers[0].to, ALICE);
    assert_eq!(outcome.batch.transfers[0].amount, 10.0);
    assert_eq!(relay.balance_of(BOB, "USDC"), usdc("989.99"));
    assert_eq!(events.drain().last().map(|e| e.kind), Some(SettlementEventKind::Confirmed));

    let balances = service.get_balances(&group.id).await.unwrap();
    assert!(balances[BOB].abs() < 1e-9);
    assert!((balances[ALICE] - 10.0).abs() < 1e-9);
    let transfers = service.get_transfers(&group.id).await.unwrap();
    assert_eq!(transfers.len(), 1);
    assert_eq!(transfers[0].from, CAROL);

    assert_eq!(service.list_settlements(&group.id).await.unwrap().len(), 1);
    let audits = service.get_group_audits(&group.id).await.unwrap();
    assert!(audits.iter().any(|a| a.action == SETTLEMENT_CONFIRMED));

    assert!(matches!(
        service.settle_group(&group.id, BOB, "USDC").await,
        Err(BundleflowError::Settlement(SettlementError::InvalidRequest(_)))
    ));
}

#[tokio::test]
async fn test_failed_settlement_is_audited_not_recorded() {
    let relay = MockRelay::new().with_relayer_fee(usdc("0.01"));
    let service = create_test_service(relay);
    let group = group_of_three(&service).await;
    service
        .add_expense(&group.id, new_expense(ALICE, 30.0, None))
        .await
        .unwrap();

    let result = service.settle_group(&group.id, BOB, "USDC").await;
    assert!(matches!(
        result,
        Err(BundleflowError::Settlement(SettlementError::InsufficientBalance { .. }))
    ));
    assert!(service.list_settlements(&group.id).await.unwrap().is_empty());
    let audits = service.get_group_audits(&group.id).await.unwrap();
    assert!(audits.iter().any(|a| a.action == SETTLEMENT_FAILED));
    assert!((service.get_balances(&group.id).await.unwrap()[BOB] + 10.0).abs() < 1e-9);
}

#[tokio::test]
async fn test_settle_requires_members() {
    let service = create_test_service(funded_relay());
    let group = group_of_three(&service).await;

    let outsider_sender = SettlementRequest {
        sender: "0xdead".to_string(),
        transfers: vec![TransferRequest::new(ALICE, "1", "USDC")],
    };
    assert!(matches!(
        service.settle(&group.id, outsider_sender).await,
        Err(BundleflowError::NotGroupMember(_))
    ));

    let outsider_recipient = SettlementRequest {
        sender: ALICE.to_string(),
        transfers: vec![TransferRequest::new("0xdead", "1", "USDC")],
    };
    assert!(matches!(
        service.settle(&group.id, outsider_recipient).await,
        Err(BundleflowError::NotGroupMember(_))
    ));
    assert!(service.list_settlements(&group.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_unknown_group_queries_fail() {
    let service = create_test_service(MockRelay::new());
    assert!(matches!(
        service.get_balances("missing").await,
        Err(BundleflowError::GroupNotFound(_))
    ));
    assert!(matches!(
        service.list_settlements("missing").await,
        Err(BundleflowError::GroupNotFound(_))
    ));
    assert!(matches!(
        service.get_group_audits("missing").await,
        Err(BundleflowError::GroupNotFound(_))
    ));
}

#[tokio::test]
async fn test_add_expense_rejects_balance_overflow() {
    let service = create_test_service(MockRelay::new());
    let group = group_of_three(&service).await;

    service
        .add_expense(&group.id, new_expense(ALICE, 1.7e308, Some(vec![BOB])))
        .await
        .unwrap();
    assert!(matches!(
        service
            .add_expense(&group.id, new_expense(ALICE, 1.7e308, Some(vec![BOB])))
            .await,
        Err(BundleflowError::InvalidInput(..))
    ));

    assert_eq!(service.list_expenses(&group.id).await.unwrap().len(), 1);
    let balances = service.get_balances(&group.id).await.unwrap();
    assert!(balances.values().all(|b| b.is_finite()));
    let transfers = service.get_transfers(&group.id).await.unwrap();
    assert_eq!(transfers.len(), 1);
    assert_eq!(transfers[0].from, BOB);
    assert_eq!(transfers[0].amount, 1.7e308);
}

#[tokio::test]
async fn test_confirmed_settlement_survives_audit_failure() {
    let relay = funded_relay();
    let service = BundleflowService::new(
        InMemoryStorage::new(),
        RefusingLogging::new(SETTLEMENT_CONFIRMED),
        create_test_orchestrator(relay.clone(), TestSigner::new()),
    );
    let group = group_of_three(&service).await;
    service
        .add_expense(&group.id, new_expense(ALICE, 30.0, None))
        .await
        .unwrap();

    let outcome = service.settle_group(&group.id, BOB, "USDC").await.unwrap();
    assert_eq!(relay.executed(), vec![outcome.tx_hash.clone()]);
    assert_eq!(service.list_settlements(&group.id).await.unwrap().len(), 1);
    let audits = service.get_group_audits(&group.id).await.unwrap();
    assert!(!audits.iter().any(|a| a.action == SETTLEMENT_CONFIRMED));
}
