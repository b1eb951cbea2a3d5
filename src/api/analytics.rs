//! Portfolio analytics endpoints

use axum::{
    extract::{Query, State},
    Json,
};

use crate::{
    error::AppResult,
    models::{
        analytics::{
            AnalyticsDashboard, AssetAnalyticsQuery, DepreciationAnalytics, MaintenanceCostAnalytics,
            MaintenanceCostQuery,
        },
        enums::Capability,
    },
    AppState,
};

use super::AuthenticatedUser;

/// Lifecycle and distribution overview
#[utoipa::path(
    get,
    path = "/analytics/dashboard",
    tag = "analytics",
    security(("bearer_auth" = [])),
    params(AssetAnalyticsQuery),
    responses(
        (status = 200, description = "Asset analytics", body = AnalyticsDashboard),
        (status = 403, description = "view_analytics required")
    )
)]
pub async fn dashboard(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(query): Query<AssetAnalyticsQuery>,
) -> AppResult<Json<AnalyticsDashboard>> {
    claims.require(Capability::ViewAnalytics)?;
    Ok(Json(state.services.dashboard.analytics_dashboard(&query).await?))
}

/// Depreciation of every asset still in service
#[utoipa::path(
    get,
    path = "/analytics/depreciation",
    tag = "analytics",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Depreciation analytics", body = DepreciationAnalytics),
        (status = 403, description = "view_analytics required")
    )
)]
pub async fn depreciation(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<DepreciationAnalytics>> {
    claims.require(Capability::ViewAnalytics)?;
    Ok(Json(state.services.assets.depreciation_analytics().await?))
}

#[utoipa::path(
    get,
    path = "/analytics/maintenance-costs",
    tag = "analytics",
    security(("bearer_auth" = [])),
    params(MaintenanceCostQuery),
    responses(
        (status = 200, description = "Maintenance cost breakdown", body = MaintenanceCostAnalytics),
        (status = 403, description = "view_analytics required")
    )
)]
pub async fn maintenance_costs(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(query): Query<MaintenanceCostQuery>,
) -> AppResult<Json<MaintenanceCostAnalytics>> {
    claims.require(Capability::ViewAnalytics)?;
    Ok(Json(state.services.dashboard.maintenance_costs(&query).await?))
}
