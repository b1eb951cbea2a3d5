//! Settings endpoints

use axum::{
    extract::{Query, State},
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    depreciation::{DepreciationConfig, DepreciationResult},
    error::AppResult,
    models::{
        enums::Capability,
        settings::{
            AuditSettings, BudgetSettings, DepreciationCalculateQuery, MaintenanceSettings,
            SystemPreferences, SystemSettings,
        },
    },
    AppState,
};

use super::AuthenticatedUser;

/// Updated settings section
#[derive(Serialize, ToSchema)]
#[aliases(
    DepreciationSettingsResponse = SettingsResponse<DepreciationConfig>,
    MaintenanceSettingsResponse = SettingsResponse<MaintenanceSettings>,
    AuditSettingsResponse = SettingsResponse<AuditSettings>,
    SystemPreferencesResponse = SettingsResponse<SystemPreferences>,
    BudgetSettingsResponse = SettingsResponse<BudgetSettings>,
)]
pub struct SettingsResponse<T>
where
    T: for<'a> ToSchema<'a>,
{
    pub message: String,
    pub settings: T,
}

impl<T> SettingsResponse<T>
where
    T: for<'a> ToSchema<'a>,
{
    fn new(message: &str, settings: T) -> Json<Self> {
        Json(Self {
            message: message.to_string(),
            settings,
        })
    }
}

/// Get all settings sections
#[utoipa::path(
    get,
    path = "/settings",
    tag = "settings",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Current settings", body = SystemSettings),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn get_settings(
    State(state): State<AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
) -> AppResult<Json<SystemSettings>> {
    Ok(Json(state.services.settings.get_all().await?))
}

/// Replace the depreciation settings
#[utoipa::path(
    put,
    path = "/settings/depreciation",
    tag = "settings",
    security(("bearer_auth" = [])),
    request_body = DepreciationConfig,
    responses(
        (status = 200, description = "Depreciation settings updated", body = DepreciationSettingsResponse),
        (status = 400, description = "Rates or lifespans out of range"),
        (status = 403, description = "system_settings required")
    )
)]
pub async fn update_depreciation(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(data): Json<DepreciationConfig>,
) -> AppResult<Json<SettingsResponse<DepreciationConfig>>> {
    claims.require(Capability::SystemSettings)?;
    let settings = state
        .services
        .settings
        .update_depreciation(data, claims.user_id)
        .await?;
    Ok(SettingsResponse::new("Depreciation settings updated successfully", settings))
}

/// Run the depreciation calculator without touching any asset
#[utoipa::path(
    get,
    path = "/settings/depreciation/calculate",
    tag = "settings",
    security(("bearer_auth" = [])),
    params(DepreciationCalculateQuery),
    responses(
        (status = 200, description = "Calculator output", body = DepreciationResult),
        (status = 400, description = "Invalid input")
    )
)]
pub async fn calculate_depreciation(
    State(state): State<AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Query(query): Query<DepreciationCalculateQuery>,
) -> AppResult<Json<DepreciationResult>> {
    Ok(Json(state.services.settings.calculate(&query).await?))
}

#[utoipa::path(
    put,
    path = "/settings/maintenance",
    tag = "settings",
    security(("bearer_auth" = [])),
    request_body = MaintenanceSettings,
    responses(
        (status = 200, description = "Maintenance settings updated", body = MaintenanceSettingsResponse),
        (status = 403, description = "system_settings required")
    )
)]
pub async fn update_maintenance(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(data): Json<MaintenanceSettings>,
) -> AppResult<Json<SettingsResponse<MaintenanceSettings>>> {
    claims.require(Capability::SystemSettings)?;
    let settings = state
        .services
        .settings
        .update_maintenance(data, claims.user_id)
        .await?;
    Ok(SettingsResponse::new("Maintenance settings updated successfully", settings))
}

#[utoipa::path(
    put,
    path = "/settings/audit",
    tag = "settings",
    security(("bearer_auth" = [])),
    request_body = AuditSettings,
    responses(
        (status = 200, description = "Audit settings updated", body = AuditSettingsResponse),
        (status = 403, description = "system_settings required")
    )
)]
pub async fn update_audit(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(data): Json<AuditSettings>,
) -> AppResult<Json<SettingsResponse<AuditSettings>>> {
    claims.require(Capability::SystemSettings)?;
    let settings = state.services.settings.update_audit(data, claims.user_id).await?;
    Ok(SettingsResponse::new("Audit settings updated successfully", settings))
}

/// Display preferences (theme, locale, currency)
#[utoipa::path(
    put,
    path = "/settings/system",
    tag = "settings",
    security(("bearer_auth" = [])),
    request_body = SystemPreferences,
    responses(
        (status = 200, description = "System preferences updated", body = SystemPreferencesResponse),
        (status = 403, description = "system_settings required")
    )
)]
pub async fn update_system(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(data): Json<SystemPreferences>,
) -> AppResult<Json<SettingsResponse<SystemPreferences>>> {
    claims.require(Capability::SystemSettings)?;
    let settings = state.services.settings.update_system(data, claims.user_id).await?;
    Ok(SettingsResponse::new("System preferences updated successfully", settings))
}

#[utoipa::path(
    put,
    path = "/settings/budget",
    tag = "settings",
    security(("bearer_auth" = [])),
    request_body = BudgetSettings,
    responses(
        (status = 200, description = "Budget settings updated", body = BudgetSettingsResponse),
        (status = 400, description = "Negative amounts"),
        (status = 403, description = "system_settings required")
    )
)]
pub async fn update_budget(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(data): Json<BudgetSettings>,
) -> AppResult<Json<SettingsResponse<BudgetSettings>>> {
    claims.require(Capability::SystemSettings)?;
    let settings = state.services.settings.update_budget(data, claims.user_id).await?;
    Ok(SettingsResponse::new("Budget settings updated successfully", settings))
}
