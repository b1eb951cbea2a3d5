//! Vendor directory endpoints

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
        enums::Specialization,
        vendor::{CreateVendor, UpdateVendor, Vendor, VendorQuery},
    },
    AppState,
};

use super::{AuthenticatedUser, MessageResponse, PaginatedResponse};

#[derive(Serialize, ToSchema)]
pub struct VendorResponse {
    pub message: String,
    pub vendor: Vendor,
}

/// List active vendors
#[utoipa::path(
    get,
    path = "/vendors",
    tag = "vendors",
    security(("bearer_auth" = [])),
    params(VendorQuery),
    responses((status = 200, description = "List of vendors", body = VendorPage))
)]
pub async fn list_vendors(
    State(state): State<AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Query(query): Query<VendorQuery>,
) -> AppResult<Json<PaginatedResponse<Vendor>>> {
    let page = state.services.vendors.search(&query).await?;
    Ok(Json(PaginatedResponse::from_page(page)))
}

#[utoipa::path(
    get,
    path = "/vendors/{id}",
    tag = "vendors",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Vendor ID")),
    responses(
        (status = 200, description = "Vendor details", body = Vendor),
        (status = 404, description = "Vendor not found")
    )
)]
pub async fn get_vendor(
    State(state): State<AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Vendor>> {
    Ok(Json(state.services.vendors.get(id).await?))
}

#[utoipa::path(
    post,
    path = "/vendors",
    tag = "vendors",
    security(("bearer_auth" = [])),
    request_body = CreateVendor,
    responses(
        (status = 201, description = "Vendor created", body = VendorResponse),
        (status = 400, description = "Invalid input"),
        (status = 403, description = "manage_vendors required")
    )
)]
pub async fn create_vendor(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(data): Json<CreateVendor>,
) -> AppResult<(StatusCode, Json<VendorResponse>)> {
    let vendor = state.services.vendors.create(&claims, data).await?;
    Ok((
        StatusCode::CREATED,
        Json(VendorResponse {
            message: "Vendor created successfully".to_string(),
            vendor,
        }),
    ))
}

#[utoipa::path(
    put,
    path = "/vendors/{id}",
    tag = "vendors",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Vendor ID")),
    request_body = UpdateVendor,
    responses(
        (status = 200, description = "Vendor updated", body = VendorResponse),
        (status = 404, description = "Vendor not found")
    )
)]
pub async fn update_vendor(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(data): Json<UpdateVendor>,
) -> AppResult<Json<VendorResponse>> {
    let vendor = state.services.vendors.update(&claims, id, data).await?;
    Ok(Json(VendorResponse {
        message: "Vendor updated successfully".to_string(),
        vendor,
    }))
}

/// Soft-delete a vendor
#[utoipa::path(
    delete,
    path = "/vendors/{id}",
    tag = "vendors",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Vendor ID")),
    responses(
        (status = 200, description = "Vendor deactivated", body = MessageResponse),
        (status = 404, description = "Vendor not found")
    )
)]
pub async fn deactivate_vendor(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<MessageResponse>> {
    state.services.vendors.deactivate(&claims, id).await?;
    Ok(Json(MessageResponse::new("Vendor deactivated successfully")))
}

/// Known vendor specializations
#[utoipa::path(
    get,
    path = "/vendors/specializations",
    tag = "vendors",
    security(("bearer_auth" = [])),
    responses((status = 200, description = "Specializations", body = Vec<Specialization>))
)]
pub async fn list_specializations(
    State(state): State<AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
) -> Json<Vec<Specialization>> {
    Json(state.services.vendors.specializations().to_vec())
}
