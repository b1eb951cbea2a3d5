//! OpenAPI documentation

use axum::Router;
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{
    acquisitions, analytics, assets, auth, dashboard, health, maintenance, reports, settings, transfers,
    users, vendors,
};

/// Registers the `bearer_auth` scheme referenced by protected paths
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "AssetFlow API",
        version = "1.0.0",
        description = "IT asset management REST API"
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    modifiers(&SecurityAddon),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Auth
        auth::login,
        auth::me,
        auth::update_profile,
        // Users
        users::list_users,
        users::get_user,
        users::create_user,
        users::update_user,
        users::deactivate_user,
        users::list_departments,
        users::list_branches,
        // Assets
        assets::list_assets,
        assets::get_asset,
        assets::create_asset,
        assets::update_asset,
        assets::delete_asset,
        assets::get_qr_code,
        assets::get_timeline,
        assets::record_audit,
        // Maintenance
        maintenance::list_requests,
        maintenance::get_request,
        maintenance::create_request,
        maintenance::update_request,
        maintenance::assign_request,
        maintenance::submit_feedback,
        maintenance::analytics,
        // Transfers
        transfers::list_transfers,
        transfers::get_transfer,
        transfers::create_transfer,
        transfers::approve_transfer,
        transfers::reject_transfer,
        transfers::dispatch_transfer,
        transfers::complete_transfer,
        transfers::analytics,
        // Acquisitions
        acquisitions::list_requests,
        acquisitions::get_request,
        acquisitions::create_request,
        acquisitions::update_request,
        acquisitions::submit_request,
        acquisitions::start_review,
        acquisitions::approve_request,
        acquisitions::reject_request,
        acquisitions::add_quote,
        acquisitions::select_vendor,
        acquisitions::deliver_request,
        acquisitions::complete_request,
        acquisitions::budget,
        acquisitions::analytics,
        // Vendors
        vendors::list_vendors,
        vendors::get_vendor,
        vendors::create_vendor,
        vendors::update_vendor,
        vendors::deactivate_vendor,
        vendors::list_specializations,
        // Reports
        reports::list_reports,
        reports::get_report,
        reports::generate_report,
        // Dashboard
        dashboard::metrics,
        dashboard::alerts,
        dashboard::activity,
        // Analytics
        analytics::dashboard,
        analytics::depreciation,
        analytics::maintenance_costs,
        // Settings
        settings::get_settings,
        settings::update_depreciation,
        settings::calculate_depreciation,
        settings::update_maintenance,
        settings::update_audit,
        settings::update_system,
        settings::update_budget,
    ),
    components(
        schemas(
            // Shared
            crate::api::MessageResponse,
            crate::api::AssetPage,
            crate::api::MaintenancePage,
            crate::api::TransferPage,
            crate::api::AcquisitionPage,
            crate::api::VendorPage,
            crate::api::UserPage,
            crate::api::ReportPage,
            crate::workflow::AssetTimelineEntry,
            crate::workflow::MaintenanceLogEntry,
            crate::workflow::TransferTimelineEntry,
            crate::workflow::AcquisitionTimelineEntry,
            // Enums
            crate::models::enums::Role,
            crate::models::enums::Capability,
            crate::models::enums::AssetCategory,
            crate::models::enums::AssetStatus,
            crate::models::enums::AssetCondition,
            crate::models::enums::Priority,
            crate::models::enums::MaintenanceCategory,
            crate::models::enums::MaintenanceStatus,
            crate::models::enums::TransferType,
            crate::models::enums::TransferStatus,
            crate::models::enums::Department,
            crate::models::enums::AcquisitionStatus,
            crate::models::enums::ItemCategory,
            crate::models::enums::Urgency,
            crate::models::enums::Specialization,
            crate::models::enums::Availability,
            crate::models::enums::ReportType,
            crate::models::enums::ReportFormat,
            crate::models::enums::ReportDateRange,
            crate::models::enums::ReportStatus,
            // Auth
            auth::LoginRequest,
            auth::LoginResponse,
            auth::ProfileResponse,
            // Users
            users::UserResponse,
            crate::models::user::User,
            crate::models::user::UserPreferences,
            crate::models::user::NotificationPreferences,
            crate::models::user::CreateUser,
            crate::models::user::UpdateUser,
            crate::models::user::UpdateProfile,
            // Assets
            assets::AssetResponse,
            crate::models::asset::Asset,
            crate::models::asset::AssetView,
            crate::models::asset::CreateAsset,
            crate::models::asset::UpdateAsset,
            crate::models::asset::RecordAudit,
            crate::models::asset::AssetQrCode,
            // Maintenance
            maintenance::MaintenanceResponse,
            crate::models::maintenance::MaintenanceRequest,
            crate::models::maintenance::MaintenanceView,
            crate::models::maintenance::Feedback,
            crate::models::maintenance::CreateMaintenance,
            crate::models::maintenance::UpdateMaintenance,
            crate::models::maintenance::AssignMaintenance,
            crate::models::maintenance::SubmitFeedback,
            // Transfers
            transfers::TransferResponse,
            crate::models::transfer::TransferRequest,
            crate::models::transfer::TransferView,
            crate::models::transfer::CreateTransfer,
            crate::models::transfer::TransferDecision,
            crate::models::transfer::RejectTransfer,
            crate::models::transfer::DispatchTransfer,
            crate::models::transfer::CompleteTransfer,
            // Acquisitions
            acquisitions::AcquisitionResponse,
            crate::models::acquisition::AcquisitionRequest,
            crate::models::acquisition::LineItem,
            crate::models::acquisition::VendorQuote,
            crate::models::acquisition::CreateLineItem,
            crate::models::acquisition::CreateAcquisition,
            crate::models::acquisition::UpdateAcquisition,
            crate::models::acquisition::AcquisitionDecision,
            crate::models::acquisition::RejectAcquisition,
            crate::models::acquisition::AddVendorQuote,
            crate::models::acquisition::SelectVendor,
            crate::models::acquisition::DeliverAcquisition,
            crate::models::acquisition::BudgetSummary,
            // Vendors
            vendors::VendorResponse,
            crate::models::vendor::Vendor,
            crate::models::vendor::Address,
            crate::models::vendor::ContractDetails,
            crate::models::vendor::VendorPerformance,
            crate::models::vendor::CreateVendor,
            crate::models::vendor::UpdateVendor,
            // Reports
            crate::models::report::Report,
            crate::models::report::ReportConfig,
            crate::models::report::ReportFilters,
            crate::models::report::ReportMetadata,
            crate::models::report::GenerateReport,
            crate::models::report::ReportOutput,
            // Dashboard & analytics
            crate::models::analytics::GroupCount,
            crate::models::analytics::GroupTotals,
            crate::models::analytics::MonthlyCost,
            crate::models::analytics::MaintenanceCostTotals,
            crate::models::analytics::ItemCategoryTotals,
            crate::models::analytics::VendorOrders,
            crate::models::analytics::ValuePoint,
            crate::models::analytics::DateRange,
            crate::models::analytics::DashboardMetrics,
            crate::models::analytics::AlertKind,
            crate::models::analytics::DashboardAlert,
            crate::models::analytics::ActivityItem,
            crate::models::analytics::LifecycleShares,
            crate::models::analytics::CategoryDepreciation,
            crate::models::analytics::AnalyticsDashboard,
            crate::models::analytics::AssetDepreciation,
            crate::models::analytics::CategoryDepreciationSummary,
            crate::models::analytics::DepreciationSummary,
            crate::models::analytics::DepreciationAnalytics,
            crate::models::analytics::MaintenanceCostAnalytics,
            crate::models::analytics::MaintenanceAnalytics,
            crate::models::analytics::TransferAnalytics,
            crate::models::analytics::AcquisitionAnalytics,
            // Settings
            settings::DepreciationSettingsResponse,
            settings::MaintenanceSettingsResponse,
            settings::AuditSettingsResponse,
            settings::SystemPreferencesResponse,
            settings::BudgetSettingsResponse,
            crate::models::settings::SystemSettings,
            crate::models::settings::MaintenanceSettings,
            crate::models::settings::AuditFrequency,
            crate::models::settings::AuditSettings,
            crate::models::settings::SystemPreferences,
            crate::models::settings::BudgetSettings,
            crate::depreciation::DepreciationMethod,
            crate::depreciation::DepreciationConfig,
            crate::depreciation::DepreciationResult,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::FieldError,
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "auth", description = "Authentication endpoints"),
        (name = "users", description = "User management"),
        (name = "assets", description = "Asset inventory"),
        (name = "maintenance", description = "Maintenance requests"),
        (name = "transfers", description = "Asset transfers"),
        (name = "acquisition", description = "Acquisition requests and budgets"),
        (name = "vendors", description = "Vendor directory"),
        (name = "reports", description = "Report generation"),
        (name = "dashboard", description = "Dashboard metrics and alerts"),
        (name = "analytics", description = "Portfolio analytics"),
        (name = "settings", description = "System settings")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use utoipa::openapi::PathItemType;

    #[test]
    fn test_bearer_scheme_registered() {
        let doc = ApiDoc::openapi();
        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("bearer_auth"));
    }

    #[test]
    fn test_paths_are_relative_to_server_prefix() {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/assets/{id}"));
        assert!(doc.paths.paths.contains_key("/acquisition/budget/{department}"));
    }

    #[test]
    fn test_maintenance_assign_is_post() {
        let doc = ApiDoc::openapi();
        let item = &doc.paths.paths["/maintenance/requests/{id}/assign"];
        assert!(item.operations.contains_key(&PathItemType::Post));
        assert!(!item.operations.contains_key(&PathItemType::Put));
    }
}
