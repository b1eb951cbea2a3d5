//! Asset inventory endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{
        asset::{Asset, AssetQrCode, AssetQuery, AssetView, CreateAsset, RecordAudit, UpdateAsset},
        enums::{AssetStatus, Capability},
    },
    workflow::TimelineEntry,
    AppState,
};

use super::{AuthenticatedUser, MessageResponse, PaginatedResponse};

#[derive(Serialize, ToSchema)]
pub struct AssetResponse {
    pub message: String,
    pub asset: Asset,
}

impl AssetResponse {
    fn new(message: &str, asset: Asset) -> Json<Self> {
        Json(Self {
            message: message.to_string(),
            asset,
        })
    }
}

/// List assets with their computed depreciation
#[utoipa::path(
    get,
    path = "/assets",
    tag = "assets",
    security(("bearer_auth" = [])),
    params(AssetQuery),
    responses(
        (status = 200, description = "List of assets", body = AssetPage),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn list_assets(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(query): Query<AssetQuery>,
) -> AppResult<Json<PaginatedResponse<AssetView>>> {
    claims.require(Capability::ViewAssets)?;
    let page = state.services.assets.search(&query).await?;
    Ok(Json(PaginatedResponse::from_page(page)))
}

/// Get an asset with its depreciation projection
#[utoipa::path(
    get,
    path = "/assets/{id}",
    tag = "assets",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Asset ID")),
    responses(
        (status = 200, description = "Asset details", body = AssetView),
        (status = 404, description = "Asset not found")
    )
)]
pub async fn get_asset(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<AssetView>> {
    claims.require(Capability::ViewAssets)?;
    Ok(Json(state.services.assets.get(id).await?))
}

/// Register a new asset
#[utoipa::path(
    post,
    path = "/assets",
    tag = "assets",
    security(("bearer_auth" = [])),
    request_body = CreateAsset,
    responses(
        (status = 201, description = "Asset created", body = AssetResponse),
        (status = 400, description = "Invalid input"),
        (status = 409, description = "Serial number already exists")
    )
)]
pub async fn create_asset(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(data): Json<CreateAsset>,
) -> AppResult<(StatusCode, Json<AssetResponse>)> {
    claims.require(Capability::CreateAssets)?;
    let asset = state.services.assets.create(&claims, data).await?;
    Ok((StatusCode::CREATED, AssetResponse::new("Asset created successfully", asset)))
}

/// Update an asset
#[utoipa::path(
    put,
    path = "/assets/{id}",
    tag = "assets",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Asset ID")),
    request_body = UpdateAsset,
    responses(
        (status = 200, description = "Asset updated", body = AssetResponse),
        (status = 400, description = "Invalid input or illegal status change"),
        (status = 404, description = "Asset not found")
    )
)]
pub async fn update_asset(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(data): Json<UpdateAsset>,
) -> AppResult<Json<AssetResponse>> {
    claims.require(Capability::EditAssets)?;
    let asset = state.services.assets.update(&claims, id, data).await?;
    Ok(AssetResponse::new("Asset updated successfully", asset))
}

/// Delete an asset
#[utoipa::path(
    delete,
    path = "/assets/{id}",
    tag = "assets",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Asset ID")),
    responses(
        (status = 200, description = "Asset deleted", body = MessageResponse),
        (status = 404, description = "Asset not found")
    )
)]
pub async fn delete_asset(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<MessageResponse>> {
    claims.require(Capability::DeleteAssets)?;
    state.services.assets.delete(id).await?;
    Ok(Json(MessageResponse::new("Asset deleted successfully")))
}

/// QR identifier of an asset
#[utoipa::path(
    get,
    path = "/assets/{id}/qr",
    tag = "assets",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Asset ID")),
    responses(
        (status = 200, description = "QR identifier", body = AssetQrCode),
        (status = 404, description = "Asset not found")
    )
)]
pub async fn get_qr_code(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<AssetQrCode>> {
    claims.require(Capability::ViewAssets)?;
    Ok(Json(state.services.assets.qr_code(id).await?))
}

/// Timeline of an asset
#[utoipa::path(
    get,
    path = "/assets/{id}/timeline",
    tag = "assets",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Asset ID")),
    responses(
        (status = 200, description = "Timeline entries, oldest first", body = Vec<AssetTimelineEntry>),
        (status = 404, description = "Asset not found")
    )
)]
pub async fn get_timeline(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Vec<TimelineEntry<AssetStatus>>>> {
    claims.require(Capability::ViewAssets)?;
    Ok(Json(state.services.assets.timeline(id).await?))
}

/// Record an audit and schedule the next one
#[utoipa::path(
    post,
    path = "/assets/{id}/audit",
    tag = "assets",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Asset ID")),
    request_body = RecordAudit,
    responses(
        (status = 200, description = "Audit recorded", body = AssetResponse),
        (status = 404, description = "Asset not found")
    )
)]
pub async fn record_audit(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(data): Json<RecordAudit>,
) -> AppResult<Json<AssetResponse>> {
    claims.require(Capability::EditAssets)?;
    let asset = state.services.assets.record_audit(&claims, id, data).await?;
    Ok(AssetResponse::new("Audit recorded successfully", asset))
}
