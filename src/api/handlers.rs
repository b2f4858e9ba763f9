use crate::{
    api::models::*,
    config::CONFIG,
    core::{
        models::{AppLog, Expense, Group, GroupAudit, Member, SettlementBatch},
        services::{BundleflowService, NewExpense},
        settlement::{SettlementOutcome, SettlementRequest},
    },
    infrastructure::{
        logging::in_memory::InMemoryLogging, relay::mock::MockRelay, signer::local::LocalSigner,
        storage::in_memory::InMemoryStorage,
    },
};
use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, post},
};
use std::sync::Arc;

pub type AppService = BundleflowService<InMemoryLogging, InMemoryStorage, MockRelay, LocalSigner>;

// Define API routes
pub fn api_routes(service: Arc<AppService>) -> Router {
    Router::new()
        .route("/groups", post(create_group).get(list_groups))
        .route("/groups/join", post(join_group))
        .route("/groups/{group_id}", get(get_group))
        .route("/groups/{group_id}/members", post(add_member))
        .route("/groups/{group_id}/invite", get(get_invite))
        .route("/groups/{group_id}/expenses", post(add_expense).get(list_expenses))
        .route("/groups/{group_id}/balances", get(get_balances))
        .route("/groups/{group_id}/transfers", get(get_transfers))
        .route("/groups/{group_id}/settle", post(settle_group))
        .route("/groups/{group_id}/settlements", post(submit_settlement).get(list_settlements))
        .route("/groups/{group_id}/audits", get(get_group_audits))
        .route("/logs", get(get_app_logs))
        .with_state(service)
}

#[utoipa::path(
    post,
    path = "/api/groups",
    request_body = CreateGroupRequest,
    responses(
        (status = 200, description = "Group created successfully", body = Group),
        (status = 400, description = "Bad request", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
pub async fn create_group(
    State(service): State<Arc<AppService>>,
    Json(req): Json<CreateGroupRequest>,
) -> Result<Json<Group>, ApiError> {
    let creator = req.creator.map(|c| Member::new(c.address, c.name));
    let group = service.create_group(req.name, req.description, creator).await?;
    Ok(Json(group))
}

#[utoipa::path(
    get,
    path = "/api/groups",
    responses(
        (status = 200, description = "Groups retrieved successfully", body = Vec<Group>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
pub async fn list_groups(State(service): State<Arc<AppService>>) -> Result<Json<Vec<Group>>, ApiError> {
    Ok(Json(service.list_groups().await?))
}

#[utoipa::path(
    get,
    path = "/api/groups/{group_id}",
    params(
        ("group_id" = String, Path, description = "ID of the group")
    ),
    responses(
        (status = 200, description = "Group retrieved successfully", body = Group),
        (status = 404, description = "Group not found", body = ErrorResponse)
    )
)]
pub async fn get_group(
    State(service): State<Arc<AppService>>,
    Path(group_id): Path<String>,
) -> Result<Json<Group>, ApiError> {
    Ok(Json(service.get_group(&group_id).await?))
}

#[utoipa::path(
    post,
    path = "/api/groups/{group_id}/members",
    request_body = AddMemberRequest,
    params(
        ("group_id" = String, Path, description = "ID of the group")
    ),
    responses(
        (status = 200, description = "Member added, or already present", body = Group),
        (status = 400, description = "Invalid address or name", body = ErrorResponse),
        (status = 404, description = "Group not found", body = ErrorResponse)
    )
)]
pub async fn add_member(
    State(service): State<Arc<AppService>>,
    Path(group_id): Path<String>,
    Json(req): Json<AddMemberRequest>,
) -> Result<Json<Group>, ApiError> {
    let group = service
        .add_member(&group_id, Member::new(req.address, req.name), req.added_by.as_deref())
        .await?;
    Ok(Json(group))
}

#[utoipa::path(
    get,
    path = "/api/groups/{group_id}/invite",
    params(
        ("group_id" = String, Path, description = "ID of the group"),
        ("inviter" = String, Query, description = "Address of the inviting member")
    ),
    responses(
        (status = 200, description = "Invite issued", body = InviteResponse),
        (status = 403, description = "Inviter is not a member", body = ErrorResponse),
        (status = 404, description = "Group not found", body = ErrorResponse)
    )
)]
pub async fn get_invite(
    State(service): State<Arc<AppService>>,
    Path(group_id): Path<String>,
    Query(query): Query<InviteQuery>,
) -> Result<Json<InviteResponse>, ApiError> {
    let invite = service.invite_payload(&group_id, &query.inviter).await?;
    Ok(Json(InviteResponse { group_id, invite }))
}

#[utoipa::path(
    post,
    path = "/api/groups/join",
    request_body = JoinGroupRequest,
    responses(
        (status = 200, description = "Joined the group", body = Group),
        (status = 400, description = "Invalid or malformed invite", body = ErrorResponse)
    )
)]
pub async fn join_group(
    State(service): State<Arc<AppService>>,
    Json(req): Json<JoinGroupRequest>,
) -> Result<Json<Group>, ApiError> {
    let group = service.join_by_invite(&req.invite, &req.address, &req.name).await?;
    Ok(Json(group))
}

#[utoipa::path(
    post,
    path = "/api/groups/{group_id}/expenses",
    request_body = AddExpenseRequest,
    params(
        ("group_id" = String, Path, description = "ID of the group")
    ),
    responses(
        (status = 200, description = "Expense recorded", body = Expense),
        (status = 400, description = "Bad request", body = ErrorResponse),
        (status = 403, description = "Payer is not a member", body = ErrorResponse),
        (status = 404, description = "Group not found", body = ErrorResponse)
    )
)]
pub async fn add_expense(
    State(service): State<Arc<AppService>>,
    Path(group_id): Path<String>,
    Json(req): Json<AddExpenseRequest>,
) -> Result<Json<Expense>, ApiError> {
    let expense = service
        .add_expense(
            &group_id,
            NewExpense {
                payer: req.payer,
                amount: req.amount,
                description: req.description,
                category: req.category,
                involved_members: req.involved_members,
            },
        )
        .await?;
    Ok(Json(expense))
}

#[utoipa::path(
    get,
    path = "/api/groups/{group_id}/expenses",
    params(
        ("group_id" = String, Path, description = "ID of the group")
    ),
    responses(
        (status = 200, description = "Expenses in insertion order", body = Vec<Expense>),
        (status = 404, description = "Group not found", body = ErrorResponse)
    )
)]
pub async fn list_expenses(
    State(service): State<Arc<AppService>>,
    Path(group_id): Path<String>,
) -> Result<Json<Vec<Expense>>, ApiError> {
    Ok(Json(service.list_expenses(&group_id).await?))
}

#[utoipa::path(
    get,
    path = "/api/groups/{group_id}/balances",
    params(
        ("group_id" = String, Path, description = "ID of the group")
    ),
    responses(
        (status = 200, description = "Outstanding net balances", body = BalancesResponse),
        (status = 404, description = "Group not found", body = ErrorResponse)
    )
)]
pub async fn get_balances(
    State(service): State<Arc<AppService>>,
    Path(group_id): Path<String>,
) -> Result<Json<BalancesResponse>, ApiError> {
    let balances = service.get_balances(&group_id).await?;
    Ok(Json(BalancesResponse { balances }))
}

#[utoipa::path(
    get,
    path = "/api/groups/{group_id}/transfers",
    params(
        ("group_id" = String, Path, description = "ID of the group")
    ),
    responses(
        (status = 200, description = "Suggested transfers", body = TransfersResponse),
        (status = 404, description = "Group not found", body = ErrorResponse)
    )
)]
pub async fn get_transfers(
    State(service): State<Arc<AppService>>,
    Path(group_id): Path<String>,
) -> Result<Json<TransfersResponse>, ApiError> {
    let transfers = service.get_transfers(&group_id).await?;
    Ok(Json(TransfersResponse { transfers }))
}

#[utoipa::path(
    post,
    path = "/api/groups/{group_id}/settle",
    request_body = SettleGroupRequest,
    params(
        ("group_id" = String, Path, description = "ID of the group")
    ),
    responses(
        (status = 200, description = "Batch confirmed", body = SettlementOutcome),
        (status = 400, description = "Nothing to settle or invalid request", body = ErrorResponse),
        (status = 402, description = "Insufficient balance", body = ErrorResponse),
        (status = 409, description = "Settlement already in flight", body = ErrorResponse),
        (status = 502, description = "Relay failure", body = ErrorResponse)
    )
)]
pub async fn settle_group(
    State(service): State<Arc<AppService>>,
    Path(group_id): Path<String>,
    Json(req): Json<SettleGroupRequest>,
) -> Result<Json<SettlementOutcome>, ApiError> {
    let currency = req.currency.unwrap_or_else(|| CONFIG.settlement.currency.clone());
    let outcome = service.settle_group(&group_id, &req.sender, &currency).await?;
    Ok(Json(outcome))
}

#[utoipa::path(
    post,
    path = "/api/groups/{group_id}/settlements",
    request_body = SettlementRequest,
    params(
        ("group_id" = String, Path, description = "ID of the group")
    ),
    responses(
        (status = 200, description = "Batch confirmed", body = SettlementOutcome),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 402, description = "Insufficient balance", body = ErrorResponse),
        (status = 409, description = "Settlement already in flight", body = ErrorResponse),
        (status = 502, description = "Relay failure", body = ErrorResponse)
    )
)]
pub async fn submit_settlement(
    State(service): State<Arc<AppService>>,
    Path(group_id): Path<String>,
    Json(req): Json<SettlementRequest>,
) -> Result<Json<SettlementOutcome>, ApiError> {
    Ok(Json(service.settle(&group_id, req).await?))
}

#[utoipa::path(
    get,
    path = "/api/groups/{group_id}/settlements",
    params(
        ("group_id" = String, Path, description = "ID of the group")
    ),
    responses(
        (status = 200, description = "Confirmed settlement batches", body = Vec<SettlementBatch>),
        (status = 404, description = "Group not found", body = ErrorResponse)
    )
)]
pub async fn list_settlements(
    State(service): State<Arc<AppService>>,
    Path(group_id): Path<String>,
) -> Result<Json<Vec<SettlementBatch>>, ApiError> {
    Ok(Json(service.list_settlements(&group_id).await?))
}

#[utoipa::path(
    get,
    path = "/api/logs",
    params(
        ("groupId" = Option<String>, Query, description = "Only entries for this group")
    ),
    responses(
        (status = 200, description = "Application logs retrieved successfully", body = Vec<AppLog>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
pub async fn get_app_logs(
    State(service): State<Arc<AppService>>,
    Query(query): Query<LogsQuery>,
) -> Result<Json<Vec<AppLog>>, ApiError> {
    let logs = service.get_app_logs(query.group_id.as_deref()).await?;
    Ok(Json(logs))
}

#[utoipa::path(
    get,
    path = "/api/groups/{group_id}/audits",
    params(
        ("group_id" = String, Path, description = "ID of the group")
    ),
    responses(
        (status = 200, description = "Group audits retrieved successfully", body = Vec<GroupAudit>),
        (status = 404, description = "Group not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
pub async fn get_group_audits(
    State(service): State<Arc<AppService>>,
    Path(group_id): Path<String>,
) -> Result<Json<Vec<GroupAudit>>, ApiError> {
    let audits = service.get_group_audits(&group_id).await?;
    Ok(Json(audits))
}
