use utoipa::OpenApi;

use crate::{
    api::models::{
        AddExpenseRequest, AddMemberRequest, BalancesResponse, CreateGroupRequest, ErrorResponse, InviteResponse,
        JoinGroupRequest, MemberRequest, SettleGroupRequest, TransfersResponse,
    },
    core::{
        models::{AppLog, Expense, Group, GroupAudit, Member, SettlementBatch, SettlementStatus, Transfer},
        settlement::{SettlementOutcome, SettlementRequest, TransferRequest},
    },
};

#[derive(OpenApi)]
#[openapi(
    paths(
        super::handlers::create_group,
        super::handlers::list_groups,
        super::handlers::get_group,
        super::handlers::add_member,
        super::handlers::get_invite,
        super::handlers::join_group,
        super::handlers::add_expense,
        super::handlers::list_expenses,
        super::handlers::get_balances,
        super::handlers::get_transfers,
        super::handlers::settle_group,
        super::handlers::submit_settlement,
        super::handlers::list_settlements,
        super::handlers::get_app_logs,
        super::handlers::get_group_audits
    ),
    components(schemas(
        MemberRequest,
        CreateGroupRequest,
        AddMemberRequest,
        JoinGroupRequest,
        InviteResponse,
        AddExpenseRequest,
        SettleGroupRequest,
        BalancesResponse,
        TransfersResponse,
        ErrorResponse,
        Member,
        Group,
        Expense,
        Transfer,
        TransferRequest,
        SettlementRequest,
        SettlementOutcome,
        SettlementBatch,
        SettlementStatus,
        AppLog,
        GroupAudit
    )),
    info(
        title = "BundleFlow API",
        description = "API for shared-expense groups and gasless batch settlement",
        version = "0.1.0"
    )
)]
pub struct ApiDoc;
