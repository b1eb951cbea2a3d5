//! Dashboard endpoints

use axum::{
    extract::{Query, State},
    Json,
};

use crate::{
    error::AppResult,
    models::analytics::{ActivityItem, ActivityQuery, DashboardAlert, DashboardMetrics, MetricsQuery},
    AppState,
};

use super::AuthenticatedUser;

/// Headline counters for a time window
#[utoipa::path(
    get,
    path = "/dashboard/metrics",
    tag = "dashboard",
    security(("bearer_auth" = [])),
    params(MetricsQuery),
    responses((status = 200, description = "Dashboard metrics", body = DashboardMetrics))
)]
pub async fn metrics(
    State(state): State<AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Query(query): Query<MetricsQuery>,
) -> AppResult<Json<DashboardMetrics>> {
    Ok(Json(state.services.dashboard.metrics(&query).await?))
}

/// Open warnings
#[utoipa::path(
    get,
    path = "/dashboard/alerts",
    tag = "dashboard",
    security(("bearer_auth" = [])),
    responses((status = 200, description = "Active alerts", body = Vec<DashboardAlert>))
)]
pub async fn alerts(
    State(state): State<AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
) -> AppResult<Json<Vec<DashboardAlert>>> {
    Ok(Json(state.services.dashboard.alerts().await?))
}

/// Latest activity across assets, maintenance, transfers and acquisitions
#[utoipa::path(
    get,
    path = "/dashboard/activity",
    tag = "dashboard",
    security(("bearer_auth" = [])),
    params(ActivityQuery),
    responses((status = 200, description = "Recent activity, newest first", body = Vec<ActivityItem>))
)]
pub async fn activity(
    State(state): State<AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Query(query): Query<ActivityQuery>,
) -> AppResult<Json<Vec<ActivityItem>>> {
    Ok(Json(state.services.dashboard.activity(query.limit).await?))
}
