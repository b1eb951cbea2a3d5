//! Maintenance request endpoints

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
        analytics::{DateRangeQuery, MaintenanceAnalytics},
        enums::Capability,
        maintenance::{
            AssignMaintenance, CreateMaintenance, MaintenanceQuery, MaintenanceRequest, MaintenanceView,
            SubmitFeedback, UpdateMaintenance,
        },
    },
    AppState,
};

use super::{AuthenticatedUser, PaginatedResponse};

/// Default analytics lookback
const ANALYTICS_DAYS: i64 = 30;

#[derive(Serialize, ToSchema)]
pub struct MaintenanceResponse {
    pub message: String,
    pub request: MaintenanceView,
}

impl MaintenanceResponse {
    fn new(message: &str, request: MaintenanceRequest) -> Json<Self> {
        Json(Self {
            message: message.to_string(),
            request: request.into(),
        })
    }
}

/// List maintenance requests visible to the caller
#[utoipa::path(
    get,
    path = "/maintenance/requests",
    tag = "maintenance",
    security(("bearer_auth" = [])),
    params(MaintenanceQuery),
    responses(
        (status = 200, description = "List of requests", body = MaintenancePage),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn list_requests(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(query): Query<MaintenanceQuery>,
) -> AppResult<Json<PaginatedResponse<MaintenanceView>>> {
    claims.require(Capability::ViewMaintenance)?;
    let page = state.services.maintenance.search(&claims, &query).await?;
    Ok(Json(PaginatedResponse::from_page(page)))
}

/// Get a maintenance request
#[utoipa::path(
    get,
    path = "/maintenance/requests/{id}",
    tag = "maintenance",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Request ID")),
    responses(
        (status = 200, description = "Request details", body = MaintenanceView),
        (status = 403, description = "Not a participant"),
        (status = 404, description = "Request not found")
    )
)]
pub async fn get_request(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<MaintenanceView>> {
    Ok(Json(state.services.maintenance.get(&claims, id).await?))
}

/// Open a maintenance request
#[utoipa::path(
    post,
    path = "/maintenance/requests",
    tag = "maintenance",
    security(("bearer_auth" = [])),
    request_body = CreateMaintenance,
    responses(
        (status = 201, description = "Request created", body = MaintenanceResponse),
        (status = 400, description = "Invalid input"),
        (status = 404, description = "Asset or vendor not found")
    )
)]
pub async fn create_request(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(data): Json<CreateMaintenance>,
) -> AppResult<(StatusCode, Json<MaintenanceResponse>)> {
    claims.require(Capability::CreateMaintenance)?;
    let request = state.services.maintenance.create(&claims, data).await?;
    Ok((
        StatusCode::CREATED,
        MaintenanceResponse::new("Maintenance request created successfully", request),
    ))
}

/// Update a maintenance request
#[utoipa::path(
    put,
    path = "/maintenance/requests/{id}",
    tag = "maintenance",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Request ID")),
    request_body = UpdateMaintenance,
    responses(
        (status = 200, description = "Request updated", body = MaintenanceResponse),
        (status = 400, description = "Invalid input or illegal status change"),
        (status = 403, description = "Not allowed"),
        (status = 404, description = "Request not found")
    )
)]
pub async fn update_request(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(data): Json<UpdateMaintenance>,
) -> AppResult<Json<MaintenanceResponse>> {
    let request = state.services.maintenance.update(&claims, id, data).await?;
    Ok(MaintenanceResponse::new("Maintenance request updated successfully", request))
}

/// Assign a technician
#[utoipa::path(
    post,
    path = "/maintenance/requests/{id}/assign",
    tag = "maintenance",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Request ID")),
    request_body = AssignMaintenance,
    responses(
        (status = 200, description = "Request assigned", body = MaintenanceResponse),
        (status = 404, description = "Request or user not found")
    )
)]
pub async fn assign_request(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(data): Json<AssignMaintenance>,
) -> AppResult<Json<MaintenanceResponse>> {
    let request = state.services.maintenance.assign(&claims, id, data).await?;
    Ok(MaintenanceResponse::new("Maintenance request assigned successfully", request))
}

/// Rate a completed request
#[utoipa::path(
    post,
    path = "/maintenance/requests/{id}/feedback",
    tag = "maintenance",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Request ID")),
    request_body = SubmitFeedback,
    responses(
        (status = 200, description = "Feedback recorded", body = MaintenanceResponse),
        (status = 403, description = "Only the requester can leave feedback"),
        (status = 422, description = "Request is not completed")
    )
)]
pub async fn submit_feedback(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(data): Json<SubmitFeedback>,
) -> AppResult<Json<MaintenanceResponse>> {
    let request = state.services.maintenance.feedback(&claims, id, data).await?;
    Ok(MaintenanceResponse::new("Feedback submitted successfully", request))
}

/// Maintenance statistics over a date range
#[utoipa::path(
    get,
    path = "/maintenance/analytics",
    tag = "maintenance",
    security(("bearer_auth" = [])),
    params(DateRangeQuery),
    responses(
        (status = 200, description = "Maintenance analytics", body = MaintenanceAnalytics),
        (status = 403, description = "view_analytics required")
    )
)]
pub async fn analytics(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(query): Query<DateRangeQuery>,
) -> AppResult<Json<MaintenanceAnalytics>> {
    claims.require(Capability::ViewAnalytics)?;
    let range = query.resolve(Utc::now(), ANALYTICS_DAYS);
    Ok(Json(state.services.maintenance.analytics(range).await?))
}
