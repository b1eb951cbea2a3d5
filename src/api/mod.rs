//! API handlers for AssetFlow REST endpoints

pub mod acquisitions;
pub mod analytics;
pub mod assets;
pub mod auth;
pub mod dashboard;
pub mod health;
pub mod maintenance;
pub mod openapi;
pub mod reports;
pub mod settings;
pub mod transfers;
pub mod users;
pub mod vendors;

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
    routing::{get, post, put},
    Router,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{error::AppError, models::user::UserClaims, AppState};

/// Extractor for authenticated user from JWT token
pub struct AuthenticatedUser(pub UserClaims);

#[async_trait]
impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| AppError::Authentication("Missing authorization header".to_string()))?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or_else(|| AppError::Authentication("Invalid authorization header format".to_string()))?;

        let claims = UserClaims::from_token(token, &state.config.auth.jwt_secret)
            .map_err(|e| AppError::Authentication(e.to_string()))?;

        Ok(AuthenticatedUser(claims))
    }
}

/// Paginated response wrapper
#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
#[aliases(
    AssetPage = PaginatedResponse<crate::models::asset::AssetView>,
    MaintenancePage = PaginatedResponse<crate::models::maintenance::MaintenanceView>,
    TransferPage = PaginatedResponse<crate::models::transfer::TransferView>,
    AcquisitionPage = PaginatedResponse<crate::models::acquisition::AcquisitionRequest>,
    VendorPage = PaginatedResponse<crate::models::vendor::Vendor>,
    UserPage = PaginatedResponse<crate::models::user::User>,
    ReportPage = PaginatedResponse<crate::models::report::Report>,
)]
pub struct PaginatedResponse<T>
where
    T: for<'a> ToSchema<'a>,
{
    pub items: Vec<T>,
    pub total_pages: i64,
    pub current_page: i64,
    pub total: i64,
}

impl<T> PaginatedResponse<T>
where
    T: for<'a> ToSchema<'a>,
{
    /// Build from a service page `(rows, total, page, limit)`
    pub fn from_page<R: Into<T>>((rows, total, page, limit): (Vec<R>, i64, i64, i64)) -> Self {
        let total_pages = if limit > 0 { (total + limit - 1) / limit } else { 0 };
        Self {
            items: rows.into_iter().map(Into::into).collect(),
            total_pages,
            current_page: page,
            total,
        }
    }
}

/// Body of a successful mutation without an entity
#[derive(Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// All `/api/v1` routes
pub fn router(state: AppState) -> Router {
    Router::new()
        // Health
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        // Authentication
        .route("/auth/login", post(auth::login))
        .route("/auth/me", get(auth::me))
        .route("/auth/profile", put(auth::update_profile))
        // Users
        .route("/users", get(users::list_users).post(users::create_user))
        .route("/users/departments", get(users::list_departments))
        .route("/users/branches", get(users::list_branches))
        .route(
            "/users/:id",
            get(users::get_user).put(users::update_user).delete(users::deactivate_user),
        )
        // Assets
        .route("/assets", get(assets::list_assets).post(assets::create_asset))
        .route(
            "/assets/:id",
            get(assets::get_asset).put(assets::update_asset).delete(assets::delete_asset),
        )
        .route("/assets/:id/qr", get(assets::get_qr_code))
        .route("/assets/:id/timeline", get(assets::get_timeline))
        .route("/assets/:id/audit", post(assets::record_audit))
        // Maintenance
        .route(
            "/maintenance/requests",
            get(maintenance::list_requests).post(maintenance::create_request),
        )
        .route("/maintenance/analytics", get(maintenance::analytics))
        .route(
            "/maintenance/requests/:id",
            get(maintenance::get_request).put(maintenance::update_request),
        )
        .route("/maintenance/requests/:id/assign", post(maintenance::assign_request))
        .route("/maintenance/requests/:id/feedback", post(maintenance::submit_feedback))
        // Transfers
        .route("/transfers", get(transfers::list_transfers).post(transfers::create_transfer))
        .route("/transfers/analytics", get(transfers::analytics))
        .route("/transfers/:id", get(transfers::get_transfer))
        .route("/transfers/:id/approve", put(transfers::approve_transfer))
        .route("/transfers/:id/reject", put(transfers::reject_transfer))
        .route("/transfers/:id/dispatch", put(transfers::dispatch_transfer))
        .route("/transfers/:id/complete", put(transfers::complete_transfer))
        // Acquisitions
        .route(
            "/acquisition/requests",
            get(acquisitions::list_requests).post(acquisitions::create_request),
        )
        .route("/acquisition/analytics", get(acquisitions::analytics))
        .route("/acquisition/budget/:department", get(acquisitions::budget))
        .route(
            "/acquisition/requests/:id",
            get(acquisitions::get_request).put(acquisitions::update_request),
        )
        .route("/acquisition/requests/:id/submit", put(acquisitions::submit_request))
        .route("/acquisition/requests/:id/review", put(acquisitions::start_review))
        .route("/acquisition/requests/:id/approve", put(acquisitions::approve_request))
        .route("/acquisition/requests/:id/reject", put(acquisitions::reject_request))
        .route("/acquisition/requests/:id/quotes", post(acquisitions::add_quote))
        .route("/acquisition/requests/:id/select-vendor", put(acquisitions::select_vendor))
        .route("/acquisition/requests/:id/deliver", put(acquisitions::deliver_request))
        .route("/acquisition/requests/:id/complete", put(acquisitions::complete_request))
        // Vendors
        .route("/vendors", get(vendors::list_vendors).post(vendors::create_vendor))
        .route("/vendors/specializations", get(vendors::list_specializations))
        .route(
            "/vendors/:id",
            get(vendors::get_vendor).put(vendors::update_vendor).delete(vendors::deactivate_vendor),
        )
        // Reports
        .route("/reports", get(reports::list_reports))
        .route("/reports/generate", post(reports::generate_report))
        .route("/reports/:id", get(reports::get_report))
        // Dashboard & analytics
        .route("/dashboard/metrics", get(dashboard::metrics))
        .route("/dashboard/alerts", get(dashboard::alerts))
        .route("/dashboard/activity", get(dashboard::activity))
        .route("/analytics/dashboard", get(analytics::dashboard))
        .route("/analytics/depreciation", get(analytics::depreciation))
        .route("/analytics/maintenance-costs", get(analytics::maintenance_costs))
        // Settings
        .route("/settings", get(settings::get_settings))
        .route("/settings/depreciation", put(settings::update_depreciation))
        .route("/settings/depreciation/calculate", get(settings::calculate_depreciation))
        .route("/settings/maintenance", put(settings::update_maintenance))
        .route("/settings/audit", put(settings::update_audit))
        .route("/settings/system", put(settings::update_system))
        .route("/settings/budget", put(settings::update_budget))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::vendor::Vendor;

    #[test]
    fn test_total_pages_rounds_up() {
        let page: PaginatedResponse<Vendor> = PaginatedResponse::from_page((Vec::<Vendor>::new(), 41, 2, 20));
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.current_page, 2);
        assert_eq!(page.total, 41);

        let empty: PaginatedResponse<Vendor> = PaginatedResponse::from_page((Vec::<Vendor>::new(), 0, 1, 20));
        assert_eq!(empty.total_pages, 0);
    }
}
