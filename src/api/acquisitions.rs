//! Acquisition request endpoints

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
        acquisition::{
            AcquisitionDecision, AcquisitionQuery, AcquisitionRequest, AddVendorQuote, BudgetQuery,
            BudgetSummary, CreateAcquisition, DeliverAcquisition, RejectAcquisition, SelectVendor,
            UpdateAcquisition,
        },
        analytics::{AcquisitionAnalytics, DateRangeQuery},
        enums::{Capability, Department},
    },
    AppState,
};

use super::{AuthenticatedUser, PaginatedResponse};

const ANALYTICS_DAYS: i64 = 90;

#[derive(Serialize, ToSchema)]
pub struct AcquisitionResponse {
    pub message: String,
    pub request: AcquisitionRequest,
}

impl AcquisitionResponse {
    fn new(message: &str, request: AcquisitionRequest) -> Json<Self> {
        Json(Self {
            message: message.to_string(),
            request,
        })
    }
}

/// List acquisition requests visible to the caller
#[utoipa::path(
    get,
    path = "/acquisition/requests",
    tag = "acquisition",
    security(("bearer_auth" = [])),
    params(AcquisitionQuery),
    responses(
        (status = 200, description = "List of requests", body = AcquisitionPage),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn list_requests(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(query): Query<AcquisitionQuery>,
) -> AppResult<Json<PaginatedResponse<AcquisitionRequest>>> {
    let page = state.services.acquisitions.search(&claims, &query).await?;
    Ok(Json(PaginatedResponse::from_page(page)))
}

/// Get an acquisition request
#[utoipa::path(
    get,
    path = "/acquisition/requests/{id}",
    tag = "acquisition",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Request ID")),
    responses(
        (status = 200, description = "Request details", body = AcquisitionRequest),
        (status = 403, description = "Outside the caller's department"),
        (status = 404, description = "Request not found")
    )
)]
pub async fn get_request(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<AcquisitionRequest>> {
    Ok(Json(state.services.acquisitions.get(&claims, id).await?))
}

/// Draft an acquisition request
#[utoipa::path(
    post,
    path = "/acquisition/requests",
    tag = "acquisition",
    security(("bearer_auth" = [])),
    request_body = CreateAcquisition,
    responses(
        (status = 201, description = "Request created", body = AcquisitionResponse),
        (status = 400, description = "Invalid input")
    )
)]
pub async fn create_request(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(data): Json<CreateAcquisition>,
) -> AppResult<(StatusCode, Json<AcquisitionResponse>)> {
    claims.require(Capability::RequestAcquisitions)?;
    let request = state.services.acquisitions.create(&claims, data).await?;
    Ok((
        StatusCode::CREATED,
        AcquisitionResponse::new("Acquisition request created successfully", request),
    ))
}

/// Edit a draft or pending request
#[utoipa::path(
    put,
    path = "/acquisition/requests/{id}",
    tag = "acquisition",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Request ID")),
    request_body = UpdateAcquisition,
    responses(
        (status = 200, description = "Request updated", body = AcquisitionResponse),
        (status = 403, description = "Not the requester"),
        (status = 422, description = "Request can no longer be edited")
    )
)]
pub async fn update_request(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(data): Json<UpdateAcquisition>,
) -> AppResult<Json<AcquisitionResponse>> {
    let request = state.services.acquisitions.update(&claims, id, data).await?;
    Ok(AcquisitionResponse::new("Acquisition request updated successfully", request))
}

/// Submit a draft for approval
#[utoipa::path(
    put,
    path = "/acquisition/requests/{id}/submit",
    tag = "acquisition",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Request ID")),
    responses(
        (status = 200, description = "Request submitted", body = AcquisitionResponse),
        (status = 400, description = "Request is not a draft")
    )
)]
pub async fn submit_request(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<AcquisitionResponse>> {
    let request = state.services.acquisitions.submit(&claims, id).await?;
    Ok(AcquisitionResponse::new("Acquisition request submitted", request))
}

/// Move a submitted request under review
#[utoipa::path(
    put,
    path = "/acquisition/requests/{id}/review",
    tag = "acquisition",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Request ID")),
    request_body = AcquisitionDecision,
    responses(
        (status = 200, description = "Review started", body = AcquisitionResponse),
        (status = 400, description = "Request is not submitted")
    )
)]
pub async fn start_review(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(data): Json<AcquisitionDecision>,
) -> AppResult<Json<AcquisitionResponse>> {
    let request = state.services.acquisitions.start_review(&claims, id, data).await?;
    Ok(AcquisitionResponse::new("Acquisition request under review", request))
}

/// Approve a request
#[utoipa::path(
    put,
    path = "/acquisition/requests/{id}/approve",
    tag = "acquisition",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Request ID")),
    request_body = AcquisitionDecision,
    responses(
        (status = 200, description = "Request approved", body = AcquisitionResponse),
        (status = 400, description = "Request is not awaiting a decision")
    )
)]
pub async fn approve_request(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(data): Json<AcquisitionDecision>,
) -> AppResult<Json<AcquisitionResponse>> {
    let request = state.services.acquisitions.approve(&claims, id, data).await?;
    Ok(AcquisitionResponse::new("Acquisition request approved", request))
}

/// Reject a request with a reason
#[utoipa::path(
    put,
    path = "/acquisition/requests/{id}/reject",
    tag = "acquisition",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Request ID")),
    request_body = RejectAcquisition,
    responses(
        (status = 200, description = "Request rejected", body = AcquisitionResponse),
        (status = 400, description = "Missing reason or request is not awaiting a decision")
    )
)]
pub async fn reject_request(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(data): Json<RejectAcquisition>,
) -> AppResult<Json<AcquisitionResponse>> {
    let request = state.services.acquisitions.reject(&claims, id, data).await?;
    Ok(AcquisitionResponse::new("Acquisition request rejected", request))
}

/// Attach a vendor quote
#[utoipa::path(
    post,
    path = "/acquisition/requests/{id}/quotes",
    tag = "acquisition",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Request ID")),
    request_body = AddVendorQuote,
    responses(
        (status = 200, description = "Quote added", body = AcquisitionResponse),
        (status = 404, description = "Request or vendor not found"),
        (status = 422, description = "Request does not accept quotes")
    )
)]
pub async fn add_quote(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(data): Json<AddVendorQuote>,
) -> AppResult<Json<AcquisitionResponse>> {
    let request = state.services.acquisitions.add_quote(&claims, id, data).await?;
    Ok(AcquisitionResponse::new("Vendor quote added", request))
}

/// Select a vendor and issue a purchase order
#[utoipa::path(
    put,
    path = "/acquisition/requests/{id}/select-vendor",
    tag = "acquisition",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Request ID")),
    request_body = SelectVendor,
    responses(
        (status = 200, description = "Vendor selected", body = AcquisitionResponse),
        (status = 400, description = "Request is not approved")
    )
)]
pub async fn select_vendor(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(data): Json<SelectVendor>,
) -> AppResult<Json<AcquisitionResponse>> {
    let request = state.services.acquisitions.select_vendor(&claims, id, data).await?;
    Ok(AcquisitionResponse::new("Vendor selected and order placed", request))
}

/// Record delivery of an ordered request
#[utoipa::path(
    put,
    path = "/acquisition/requests/{id}/deliver",
    tag = "acquisition",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Request ID")),
    request_body = DeliverAcquisition,
    responses(
        (status = 200, description = "Delivery recorded", body = AcquisitionResponse),
        (status = 400, description = "Request is not ordered")
    )
)]
pub async fn deliver_request(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(data): Json<DeliverAcquisition>,
) -> AppResult<Json<AcquisitionResponse>> {
    let request = state.services.acquisitions.deliver(&claims, id, data).await?;
    Ok(AcquisitionResponse::new("Delivery recorded", request))
}

/// Close a delivered request
#[utoipa::path(
    put,
    path = "/acquisition/requests/{id}/complete",
    tag = "acquisition",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Request ID")),
    request_body = AcquisitionDecision,
    responses(
        (status = 200, description = "Request completed", body = AcquisitionResponse),
        (status = 400, description = "Request is not delivered")
    )
)]
pub async fn complete_request(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(data): Json<AcquisitionDecision>,
) -> AppResult<Json<AcquisitionResponse>> {
    let request = state.services.acquisitions.complete(&claims, id, data).await?;
    Ok(AcquisitionResponse::new("Acquisition request completed", request))
}

/// Budget utilisation of a department for one year
#[utoipa::path(
    get,
    path = "/acquisition/budget/{department}",
    tag = "acquisition",
    security(("bearer_auth" = [])),
    params(
        ("department" = Department, Path, description = "Department name"),
        BudgetQuery
    ),
    responses(
        (status = 200, description = "Budget summary", body = BudgetSummary),
        (status = 403, description = "Another department's budget")
    )
)]
pub async fn budget(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(department): Path<Department>,
    Query(query): Query<BudgetQuery>,
) -> AppResult<Json<BudgetSummary>> {
    let summary = state
        .services
        .acquisitions
        .budget(&claims, department, query.year)
        .await?;
    Ok(Json(summary))
}

/// Acquisition statistics over a date range
#[utoipa::path(
    get,
    path = "/acquisition/analytics",
    tag = "acquisition",
    security(("bearer_auth" = [])),
    params(DateRangeQuery),
    responses(
        (status = 200, description = "Acquisition analytics", body = AcquisitionAnalytics),
        (status = 403, description = "view_analytics required")
    )
)]
pub async fn analytics(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(query): Query<DateRangeQuery>,
) -> AppResult<Json<AcquisitionAnalytics>> {
    claims.require(Capability::ViewAnalytics)?;
    let range = query.resolve(Utc::now(), ANALYTICS_DAYS);
    Ok(Json(state.services.acquisitions.analytics(range).await?))
}
