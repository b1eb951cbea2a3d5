//! Report generation endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::report::{GenerateReport, Report, ReportOutput, ReportQuery},
    AppState,
};

use super::{AuthenticatedUser, PaginatedResponse};

/// List generated reports
#[utoipa::path(
    get,
    path = "/reports",
    tag = "reports",
    security(("bearer_auth" = [])),
    params(ReportQuery),
    responses((status = 200, description = "List of reports", body = ReportPage))
)]
pub async fn list_reports(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(query): Query<ReportQuery>,
) -> AppResult<Json<PaginatedResponse<Report>>> {
    let page = state.services.reports.search(&claims, &query).await?;
    Ok(Json(PaginatedResponse::from_page(page)))
}

#[utoipa::path(
    get,
    path = "/reports/{id}",
    tag = "reports",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Report ID")),
    responses(
        (status = 200, description = "Report record", body = Report),
        (status = 403, description = "Report of another user"),
        (status = 404, description = "Report not found")
    )
)]
pub async fn get_report(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Report>> {
    Ok(Json(state.services.reports.get(&claims, id).await?))
}

/// Generate a report and return its rows
#[utoipa::path(
    post,
    path = "/reports/generate",
    tag = "reports",
    security(("bearer_auth" = [])),
    request_body = GenerateReport,
    responses(
        (status = 201, description = "Report generated", body = ReportOutput),
        (status = 400, description = "Invalid configuration or unsupported type")
    )
)]
pub async fn generate_report(
    State(state): State<AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(data): Json<GenerateReport>,
) -> AppResult<(StatusCode, Json<ReportOutput>)> {
    let output = state.services.reports.generate(&claims, data).await?;
    Ok((StatusCode::CREATED, Json(output)))
}
