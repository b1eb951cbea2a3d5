//! Asset transfer endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{
        analytics::{DateRangeQuery, TransferAnalytics},
        enums::Capability,
        transfer::{
            CompleteTransfer, CreateTransfer, DispatchTransfer, RejectTransfer, TransferDecision,
            TransferQuery, TransferRequest, TransferView,
        },
    },
    AppState,
};

use super::{AuthenticatedUser, PaginatedResponse};

const ANALYTICS_DAYS: i64 = 30;

#[derive(Serialize, ToSchema)]
pub struct TransferResponse {
    pub message: String,
    pub transfer: TransferView,
}

impl TransferResponse {
    fn new(message: &str, transfer: TransferRequest) -> Json<Self> {
        Json(Self {
            message: message.to_string(),
            transfer: transfer.into(),
        })
    }
}

/// List transfers visible to the caller
#[utoipa::path(
    get,
    path = "/transfers",
    tag = "transfers",
    security(("bearer_auth" = [])),
    params(TransferQuery),
    responses(
        (status = 200, description = "List of transfers", body = TransferPage),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn list_transfers(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(query): Query<TransferQuery>,
) -> AppResult<Json<PaginatedResponse<TransferView>>> {
    let page = state.services.transfers.search(&claims, &query).await?;
    Ok(Json(PaginatedResponse::from_page(page)))
}

/// Get a transfer
#[utoipa::path(
    get,
    path = "/transfers/{id}",
    tag = "transfers",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Transfer ID")),
    responses(
        (status = 200, description = "Transfer details", body = TransferView),
        (status = 403, description = "Not a participant"),
        (status = 404, description = "Transfer not found")
    )
)]
pub async fn get_transfer(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<TransferView>> {
    Ok(Json(state.services.transfers.get(&claims, id).await?))
}

/// Request a transfer
#[utoipa::path(
    post,
    path = "/transfers",
    tag = "transfers",
    security(("bearer_auth" = [])),
    request_body = CreateTransfer,
    responses(
        (status = 201, description = "Transfer requested", body = TransferResponse),
        (status = 400, description = "Invalid input"),
        (status = 404, description = "Asset or user not found")
    )
)]
pub async fn create_transfer(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(data): Json<CreateTransfer>,
) -> AppResult<(StatusCode, Json<TransferResponse>)> {
    claims.require(Capability::RequestTransfers)?;
    let transfer = state.services.transfers.create(&claims, data).await?;
    Ok((
        StatusCode::CREATED,
        TransferResponse::new("Transfer request created successfully", transfer),
    ))
}

/// Approve a pending transfer
#[utoipa::path(
    put,
    path = "/transfers/{id}/approve",
    tag = "transfers",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Transfer ID")),
    request_body = TransferDecision,
    responses(
        (status = 200, description = "Transfer approved", body = TransferResponse),
        (status = 400, description = "Transfer is not pending")
    )
)]
pub async fn approve_transfer(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(data): Json<TransferDecision>,
) -> AppResult<Json<TransferResponse>> {
    let transfer = state.services.transfers.approve(&claims, id, data).await?;
    Ok(TransferResponse::new("Transfer approved successfully", transfer))
}

/// Reject a pending transfer
#[utoipa::path(
    put,
    path = "/transfers/{id}/reject",
    tag = "transfers",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Transfer ID")),
    request_body = RejectTransfer,
    responses(
        (status = 200, description = "Transfer rejected", body = TransferResponse),
        (status = 400, description = "Missing reason or transfer is not pending")
    )
)]
pub async fn reject_transfer(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(data): Json<RejectTransfer>,
) -> AppResult<Json<TransferResponse>> {
    let transfer = state.services.transfers.reject(&claims, id, data).await?;
    Ok(TransferResponse::new("Transfer rejected", transfer))
}

/// Mark an approved transfer as in transit
#[utoipa::path(
    put,
    path = "/transfers/{id}/dispatch",
    tag = "transfers",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Transfer ID")),
    request_body = DispatchTransfer,
    responses(
        (status = 200, description = "Transfer dispatched", body = TransferResponse),
        (status = 400, description = "Transfer is not approved")
    )
)]
pub async fn dispatch_transfer(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(data): Json<DispatchTransfer>,
) -> AppResult<Json<TransferResponse>> {
    let transfer = state.services.transfers.dispatch(&claims, id, data).await?;
    Ok(TransferResponse::new("Transfer dispatched", transfer))
}

/// Complete a transfer and move the asset
#[utoipa::path(
    put,
    path = "/transfers/{id}/complete",
    tag = "transfers",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Transfer ID")),
    request_body = CompleteTransfer,
    responses(
        (status = 200, description = "Transfer completed", body = TransferResponse),
        (status = 400, description = "Transfer cannot be completed from its status"),
        (status = 403, description = "Only approvers or the receiving user")
    )
)]
pub async fn complete_transfer(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(data): Json<CompleteTransfer>,
) -> AppResult<Json<TransferResponse>> {
    let transfer = state.services.transfers.complete(&claims, id, data).await?;
    Ok(TransferResponse::new("Transfer completed successfully", transfer))
}

/// Transfer statistics over a date range
#[utoipa::path(
    get,
    path = "/transfers/analytics",
    tag = "transfers",
    security(("bearer_auth" = [])),
    params(DateRangeQuery),
    responses(
        (status = 200, description = "Transfer analytics", body = TransferAnalytics),
        (status = 403, description = "view_analytics required")
    )
)]
pub async fn analytics(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(query): Query<DateRangeQuery>,
) -> AppResult<Json<TransferAnalytics>> {
    claims.require(Capability::ViewAnalytics)?;
    let range = query.resolve(Utc::now(), ANALYTICS_DAYS);
    Ok(Json(state.services.transfers.analytics(range).await?))
}
