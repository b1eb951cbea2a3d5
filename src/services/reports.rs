//! Report generation service
//!
//! Reports are JSON projections over the live collections. The run itself is
//! recorded so that clients can list past reports with their totals.

use std::{str::FromStr, time::Instant};

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde_json::{json, Value};
use uuid::Uuid;
use validator::Validate;

use crate::{
    depreciation::DepreciationConfig,
    error::{AppError, AppResult},
    models::{
        acquisition::AcquisitionRequest,
        asset::Asset,
        enums::{
            AcquisitionStatus, AssetCategory, AssetStatus, Department, MaintenanceStatus,
            ReportDateRange, ReportStatus, ReportType, TransferStatus,
        },
        maintenance::MaintenanceRequest,
        page_bounds,
        report::{GenerateReport, Report, ReportConfig, ReportMetadata, ReportOutput, ReportQuery},
        transfer::TransferRequest,
        user::UserClaims,
    },
    repository::Repository,
    services::{assets, settings::SettingsService},
    workflow,
};

type Window = Option<(DateTime<Utc>, DateTime<Utc>)>;

/// Rows of one report and the money they add up to
#[derive(Debug, Default)]
struct Projection {
    rows: Vec<Value>,
    total_value: Decimal,
}

/// Parse an optional free-text filter into its typed form
fn parse_filter<T: FromStr<Err = String>>(value: Option<&str>) -> AppResult<Option<T>> {
    value
        .filter(|v| !v.is_empty())
        .map(|v| v.parse::<T>().map_err(AppError::Validation))
        .transpose()
}

fn asset_inventory(assets: Vec<Asset>) -> Projection {
    let total_value = assets.iter().map(|a| a.current_value).sum();
    let rows = assets
        .into_iter()
        .map(|a| {
            json!({
                "id": a.id,
                "serialNumber": a.serial_number,
                "name": a.name,
                "category": a.category,
                "status": a.status,
                "condition": a.condition,
                "branch": a.branch,
                "location": a.location,
                "assignedTo": a.assigned_to,
                "vendor": a.vendor,
                "purchaseDate": a.purchase_date,
                "purchasePrice": a.purchase_price,
                "currentValue": a.current_value,
            })
        })
        .collect();
    Projection { rows, total_value }
}

fn maintenance_summary(requests: Vec<MaintenanceRequest>) -> Projection {
    let total_value = requests.iter().filter_map(|r| r.actual_cost).sum();
    let rows = requests
        .into_iter()
        .map(|r| {
            json!({
                "id": r.id,
                "title": r.title,
                "assetId": r.asset_id,
                "category": r.category,
                "priority": r.priority,
                "status": r.status,
                "submittedDate": r.created_at,
                "completedDate": r.actual_completion,
                "cost": r.actual_cost.unwrap_or_default(),
                "requestedBy": r.requested_by,
                "assignedTo": r.assigned_to,
            })
        })
        .collect();
    Projection { rows, total_value }
}

fn transfer_summary(transfers: Vec<TransferRequest>) -> Projection {
    let total_value = transfers.iter().map(|t| t.transfer_cost).sum();
    let rows = transfers
        .into_iter()
        .map(|t| {
            json!({
                "id": t.id,
                "transferNumber": t.transfer_number,
                "assetId": t.asset_id,
                "transferType": t.transfer_type,
                "status": t.status,
                "priority": t.priority,
                "fromUser": t.from_user,
                "toUser": t.to_user,
                "fromBranch": t.from_branch,
                "toBranch": t.to_branch,
                "requestedBy": t.requested_by,
                "createdAt": t.created_at,
                "completedDate": t.completed_date,
                "transferCost": t.transfer_cost,
            })
        })
        .collect();
    Projection { rows, total_value }
}

fn acquisition_summary(requests: Vec<AcquisitionRequest>) -> Projection {
    let total_value = requests.iter().map(|r| r.total_cost).sum();
    let rows = requests
        .into_iter()
        .map(|r| {
            json!({
                "id": r.id,
                "requestNumber": r.request_number,
                "department": r.department,
                "branch": r.branch,
                "status": r.status,
                "priority": r.priority,
                "itemCount": r.items.len(),
                "totalCost": r.total_cost,
                "selectedVendor": r.selected_vendor,
                "requestedBy": r.requested_by,
                "approvedBy": r.approved_by,
                "createdAt": r.created_at,
            })
        })
        .collect();
    Projection { rows, total_value }
}

fn depreciation_analysis(in_service: Vec<Asset>, config: &DepreciationConfig, now: DateTime<Utc>) -> Projection {
    let mut projection = Projection::default();
    for asset in in_service {
        let view = assets::view(asset, config, now);
        projection.total_value += Decimal::from_f64_retain(view.depreciation.current_value)
            .unwrap_or_default()
            .round_dp(2);
        projection.rows.push(json!({
            "id": view.asset.id,
            "name": view.asset.name,
            "serialNumber": view.asset.serial_number,
            "category": view.asset.category,
            "purchaseDate": view.asset.purchase_date,
            "purchasePrice": view.asset.purchase_price,
            "recordedValue": view.asset.current_value,
            "depreciation": view.depreciation,
        }));
    }
    projection
}

#[derive(Clone)]
pub struct ReportsService {
    repository: Repository,
    settings: SettingsService,
}

impl ReportsService {
    pub fn new(repository: Repository, settings: SettingsService) -> Self {
        Self { repository, settings }
    }

    pub async fn search(&self, claims: &UserClaims, query: &ReportQuery) -> AppResult<(Vec<Report>, i64, i64, i64)> {
        let (page, limit, offset) = page_bounds(query.page, query.limit);
        let owner = claims.scoped_to_self().then_some(claims.user_id);
        let (reports, total) = self.repository.reports.search(query, owner, limit, offset).await?;
        Ok((reports, total, page, limit))
    }

    pub async fn get(&self, claims: &UserClaims, id: Uuid) -> AppResult<Report> {
        let report = self.repository.reports.get_by_id(id).await?;
        if claims.scoped_to_self() && !claims.is_self(report.generated_by) {
            return Err(AppError::Authorization("Access denied".to_string()));
        }
        Ok(report)
    }

    /// Record a run, compute its rows and store the outcome
    pub async fn generate(&self, claims: &UserClaims, data: GenerateReport) -> AppResult<ReportOutput> {
        data.validate()?;
        if data.config.date_range == ReportDateRange::Custom
            && (data.config.custom_start_date.is_none() || data.config.custom_end_date.is_none())
        {
            return Err(AppError::Validation(
                "A custom date range needs customStartDate and customEndDate".to_string(),
            ));
        }

        let now = Utc::now();
        let report = Report {
            id: Uuid::new_v4(),
            report_number: workflow::reference_number("RPT"),
            title: data.title,
            description: data.description,
            generated_by: claims.user_id,
            config: data.config,
            status: ReportStatus::Generating,
            metadata: ReportMetadata::default(),
            created_at: now,
            updated_at: now,
        };
        let report = self.repository.reports.create(&report).await?;

        let started = Instant::now();
        let outcome = self.project(&report.config, now).await;
        let processing_time = started.elapsed().as_millis() as i64;

        match outcome {
            Ok(projection) => {
                let metadata = ReportMetadata {
                    record_count: projection.rows.len() as i64,
                    total_value: projection.total_value,
                    processing_time,
                    date_generated: Some(Utc::now()),
                    error: None,
                };
                let report = self
                    .repository
                    .reports
                    .finish(report.id, ReportStatus::Completed, &metadata)
                    .await?;
                tracing::info!(
                    report_id = %report.id,
                    kind = %report.config.report_type,
                    records = metadata.record_count,
                    elapsed_ms = processing_time,
                    "report generated"
                );
                Ok(ReportOutput {
                    report,
                    rows: projection.rows,
                })
            }
            Err(e) => {
                let metadata = ReportMetadata {
                    processing_time,
                    error: Some(e.to_string()),
                    ..Default::default()
                };
                self.repository
                    .reports
                    .finish(report.id, ReportStatus::Failed, &metadata)
                    .await?;
                tracing::warn!(report_id = %report.id, error = %e, "report generation failed");
                Err(e)
            }
        }
    }

    async fn project(&self, config: &ReportConfig, now: DateTime<Utc>) -> AppResult<Projection> {
        let filters = &config.filters;
        let window: Window = config.window(now);
        let (from, to) = (window.map(|w| w.0), window.map(|w| w.1));

        match config.report_type {
            ReportType::AssetInventory => {
                let assets = self.filtered_assets(config).await?;
                Ok(asset_inventory(assets))
            }
            ReportType::DepreciationAnalysis => {
                let depreciation = self.settings.depreciation().await?;
                let assets = self
                    .filtered_assets(config)
                    .await?
                    .into_iter()
                    .filter(|a| a.status != AssetStatus::Retired)
                    .collect();
                Ok(depreciation_analysis(assets, &depreciation, now))
            }
            ReportType::MaintenanceSummary => {
                let status = parse_filter::<MaintenanceStatus>(filters.status.as_deref())?;
                let requests = self
                    .repository
                    .maintenance
                    .list_created_between(from, to)
                    .await?
                    .into_iter()
                    .filter(|r| status.map_or(true, |s| r.status == s))
                    .collect();
                Ok(maintenance_summary(requests))
            }
            ReportType::TransferSummary => {
                let status = parse_filter::<TransferStatus>(filters.status.as_deref())?;
                let transfers = self
                    .repository
                    .transfers
                    .list_created_between(from, to)
                    .await?
                    .into_iter()
                    .filter(|t| status.map_or(true, |s| t.status == s))
                    .filter(|t| {
                        filters.branch.as_deref().map_or(true, |b| {
                            t.from_branch.as_deref() == Some(b) || t.to_branch.as_deref() == Some(b)
                        })
                    })
                    .collect();
                Ok(transfer_summary(transfers))
            }
            ReportType::AcquisitionSummary => {
                let status = parse_filter::<AcquisitionStatus>(filters.status.as_deref())?;
                let department = parse_filter::<Department>(filters.department.as_deref())?;
                let requests = self
                    .repository
                    .acquisitions
                    .list_created_between(from, to)
                    .await?
                    .into_iter()
                    .filter(|r| status.map_or(true, |s| r.status == s))
                    .filter(|r| department.map_or(true, |d| r.department == d))
                    .collect();
                Ok(acquisition_summary(requests))
            }
            other => Err(AppError::BadRequest(format!(
                "Report type '{}' is not supported",
                other
            ))),
        }
    }

    async fn filtered_assets(&self, config: &ReportConfig) -> AppResult<Vec<Asset>> {
        let filters = &config.filters;
        let category = parse_filter::<AssetCategory>(filters.category.as_deref())?;
        let status = parse_filter::<AssetStatus>(filters.status.as_deref())?;
        self.repository
            .assets
            .list_all(filters.branch.as_deref(), category, status)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::acquisition::tests::{line, sample_request};

    #[test]
    fn test_parse_filter() {
        let parsed = parse_filter::<AssetCategory>(Some("Laptop")).unwrap();
        assert_eq!(parsed, Some(AssetCategory::Laptop));
        assert_eq!(parse_filter::<AssetCategory>(None).unwrap(), None);
        assert_eq!(parse_filter::<AssetCategory>(Some("")).unwrap(), None);
        assert!(matches!(
            parse_filter::<AssetCategory>(Some("Spaceship")),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_acquisition_summary_totals() {
        let requests = vec![
            sample_request(vec![line(2, 500), line(1, 300)]),
            sample_request(vec![line(1, 200)]),
        ];
        let projection = acquisition_summary(requests);
        assert_eq!(projection.rows.len(), 2);
        assert_eq!(projection.total_value, Decimal::from(1500));
        assert_eq!(projection.rows[0]["itemCount"], 2);
        assert_eq!(projection.rows[0]["department"], "IT");
    }

    #[test]
    fn test_empty_projection() {
        let projection = maintenance_summary(Vec::new());
        assert!(projection.rows.is_empty());
        assert_eq!(projection.total_value, Decimal::ZERO);
    }
}
