//! Read-only projections for dashboards, analytics and reports

use chrono::{DateTime, Duration, Months, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::collections::BTreeMap;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use super::enums::{AssetCategory, AssetStatus};
use crate::depreciation::DepreciationResult;

/// Count of rows sharing one value
#[derive(Debug, Clone, PartialEq, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GroupCount {
    pub key: String,
    pub count: i64,
}

/// Count, sum and average of a money column per group
#[derive(Debug, Clone, PartialEq, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GroupTotals {
    pub key: String,
    pub count: i64,
    pub total: Decimal,
    pub average: Option<Decimal>,
}

#[derive(Debug, Clone, PartialEq, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyCost {
    /// `YYYY-MM`
    pub month: String,
    pub request_count: i64,
    pub total_cost: Decimal,
    pub labor_cost: Decimal,
    pub parts_cost: Decimal,
    pub avg_cost: Option<Decimal>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MaintenanceCostTotals {
    pub total_cost: Decimal,
    pub total_labor_cost: Decimal,
    pub total_parts_cost: Decimal,
    pub total_requests: i64,
    pub avg_cost: Option<Decimal>,
    pub avg_time_spent: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ItemCategoryTotals {
    pub category: String,
    pub total_quantity: i64,
    pub total_value: Decimal,
    pub avg_unit_price: Option<Decimal>,
}

#[derive(Debug, Clone, PartialEq, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VendorOrders {
    pub vendor: String,
    pub order_count: i64,
    pub total_value: Decimal,
    /// Days between expected and actual delivery, positive when late
    pub avg_delivery_delay_days: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ValuePoint {
    /// `YYYY-MM` of purchase
    pub month: String,
    pub total_value: Decimal,
    pub count: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct DateRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// Optional window; analytics fall back to a default lookback
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DateRangeQuery {
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
}

impl DateRangeQuery {
    pub fn resolve(&self, now: DateTime<Utc>, default_days: i64) -> DateRange {
        let end = self.end_date.unwrap_or(now);
        let start = self
            .start_date
            .unwrap_or_else(|| end - Duration::days(default_days));
        DateRange { start, end }
    }
}

// Dashboard

#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MetricsQuery {
    /// `7d`, `30d`, `90d` or `1y`
    pub time_range: Option<String>,
}

impl MetricsQuery {
    /// Unknown values fall back to 30 days
    pub fn resolve(&self, now: DateTime<Utc>) -> (String, DateRange) {
        let label = self.time_range.as_deref().unwrap_or("30d");
        let (label, start) = match label {
            "7d" => ("7d", now - Duration::days(7)),
            "90d" => ("90d", now - Duration::days(90)),
            "1y" => ("1y", now.checked_sub_months(Months::new(12)).unwrap_or(now)),
            _ => ("30d", now - Duration::days(30)),
        };
        (label.to_string(), DateRange { start, end: now })
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardMetrics {
    pub total_assets: i64,
    pub active_assets: i64,
    pub total_value: Decimal,
    pub pending_maintenance: i64,
    pub overdue_maintenance: i64,
    pub maintenance_required: i64,
    /// Active share of all assets, whole percent
    pub utilization_rate: i64,
    pub total_maintenance_cost: Decimal,
    pub avg_maintenance_cost: Decimal,
    pub pending_transfers: i64,
    pub completed_transfers: i64,
    pub pending_acquisitions: i64,
    pub approved_acquisitions: i64,
    pub time_range: String,
    pub date_range: DateRange,
}

/// Raw counters behind [`DashboardMetrics`]
#[derive(Debug, Clone, Default, FromRow)]
pub struct DashboardCounters {
    pub total_assets: i64,
    pub active_assets: i64,
    pub under_maintenance_assets: i64,
    pub total_value: Decimal,
    pub pending_maintenance: i64,
    pub overdue_maintenance: i64,
    pub completed_maintenance_cost: Decimal,
    pub avg_maintenance_cost: Option<Decimal>,
    pub pending_transfers: i64,
    pub completed_transfers: i64,
    pub pending_acquisitions: i64,
    pub approved_acquisitions: i64,
}

impl DashboardCounters {
    pub fn into_metrics(self, time_range: String, date_range: DateRange) -> DashboardMetrics {
        let utilization_rate = if self.total_assets > 0 {
            (self.active_assets as f64 / self.total_assets as f64 * 100.0).round() as i64
        } else {
            0
        };

        DashboardMetrics {
            total_assets: self.total_assets,
            active_assets: self.active_assets,
            total_value: self.total_value,
            pending_maintenance: self.pending_maintenance,
            overdue_maintenance: self.overdue_maintenance,
            maintenance_required: self.under_maintenance_assets,
            utilization_rate,
            total_maintenance_cost: self.completed_maintenance_cost,
            avg_maintenance_cost: self.avg_maintenance_cost.unwrap_or_default().round_dp(2),
            pending_transfers: self.pending_transfers,
            completed_transfers: self.completed_transfers,
            pending_acquisitions: self.pending_acquisitions,
            approved_acquisitions: self.approved_acquisitions,
            time_range,
            date_range,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum AlertKind {
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardAlert {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: AlertKind,
    pub title: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub action_required: bool,
    pub priority: String,
}

/// Counters behind the dashboard alerts
#[derive(Debug, Clone, Default, FromRow)]
pub struct AlertCounters {
    pub expiring_warranties: i64,
    pub overdue_maintenance: i64,
    pub pending_approvals: i64,
    pub high_value_acquisitions: i64,
}

impl AlertCounters {
    pub fn into_alerts(self, now: DateTime<Utc>) -> Vec<DashboardAlert> {
        let alert = |id: &str, kind, title: &str, message: String, priority: &str| DashboardAlert {
            id: id.to_string(),
            kind,
            title: title.to_string(),
            message,
            timestamp: now,
            action_required: true,
            priority: priority.to_string(),
        };

        let mut alerts = Vec::new();
        if self.expiring_warranties > 0 {
            alerts.push(alert(
                "warranty-expiring",
                AlertKind::Warning,
                "Warranties Expiring Soon",
                format!("{} assets have warranties expiring within 30 days", self.expiring_warranties),
                "medium",
            ));
        }
        if self.overdue_maintenance > 0 {
            alerts.push(alert(
                "maintenance-overdue",
                AlertKind::Error,
                "Overdue Maintenance",
                format!("{} maintenance requests are overdue", self.overdue_maintenance),
                "high",
            ));
        }
        if self.pending_approvals > 0 {
            alerts.push(alert(
                "pending-approvals",
                AlertKind::Info,
                "Pending Approvals",
                format!("{} requests are waiting for approval", self.pending_approvals),
                "medium",
            ));
        }
        if self.high_value_acquisitions > 0 {
            alerts.push(alert(
                "high-value-acquisitions",
                AlertKind::Warning,
                "High-Value Acquisitions",
                format!(
                    "{} high-value acquisition requests need review",
                    self.high_value_acquisitions
                ),
                "high",
            ));
        }
        alerts
    }
}

#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
pub struct ActivityQuery {
    pub limit: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ActivityItem {
    pub id: String,
    /// asset, maintenance, transfer or acquisition
    #[serde(rename = "type")]
    pub kind: String,
    pub title: String,
    pub description: String,
    pub timestamp: DateTime<Utc>,
}

/// Row shared by the per-table "recent" queries
#[derive(Debug, Clone, FromRow)]
pub struct RecentRow {
    pub id: Uuid,
    pub label: String,
    pub detail: String,
    pub created_at: DateTime<Utc>,
}

// Analytics

#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AssetAnalyticsQuery {
    pub category: Option<AssetCategory>,
    pub branch: Option<String>,
    pub status: Option<AssetStatus>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LifecycleShares {
    pub in_use: i64,
    pub under_maintenance: i64,
    pub retired: i64,
    /// Mean configured lifespan across the assets in scope
    pub avg_lifespan_years: f64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CategoryDepreciation {
    pub category: AssetCategory,
    pub count: i64,
    pub total_purchase: f64,
    /// Stored book value
    pub total_current: f64,
    /// Calculator value as of today
    pub total_depreciated_value: f64,
    pub depreciation_rate: f64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsDashboard {
    pub lifecycle: LifecycleShares,
    pub asset_status: Vec<GroupCount>,
    pub ownership_changes: Vec<GroupCount>,
    pub asset_value_trend: Vec<ValuePoint>,
    pub category_distribution: Vec<GroupCount>,
    pub depreciation_data: Vec<CategoryDepreciation>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AssetDepreciation {
    pub id: Uuid,
    pub name: String,
    pub category: AssetCategory,
    pub current_value: Decimal,
    pub depreciation: DepreciationResult,
    /// Calculator amount divided by age, 0 for assets younger than a day
    pub annual_depreciation: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CategoryDepreciationSummary {
    pub total_assets: i64,
    pub total_purchase_value: f64,
    pub total_current_value: f64,
    /// Percent of purchase value lost
    pub avg_depreciation: f64,
    pub avg_annual_depreciation: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DepreciationSummary {
    pub total_assets: i64,
    pub total_purchase_value: f64,
    pub total_current_value: f64,
    pub total_depreciation_amount: f64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DepreciationAnalytics {
    pub assets: Vec<AssetDepreciation>,
    pub category_analytics: BTreeMap<AssetCategory, CategoryDepreciationSummary>,
    pub summary: DepreciationSummary,
}

impl DepreciationAnalytics {
    /// Group per-asset calculator output by category and total it
    pub fn from_assets(assets: Vec<AssetDepreciation>) -> Self {
        let mut categories: BTreeMap<AssetCategory, CategoryDepreciationSummary> = BTreeMap::new();
        let mut annual: BTreeMap<AssetCategory, f64> = BTreeMap::new();
        let mut summary = DepreciationSummary::default();

        for asset in &assets {
            let d = &asset.depreciation;
            let entry = categories.entry(asset.category).or_default();
            entry.total_assets += 1;
            entry.total_purchase_value += d.purchase_price;
            entry.total_current_value += d.current_value;
            *annual.entry(asset.category).or_default() += asset.annual_depreciation;

            summary.total_assets += 1;
            summary.total_purchase_value += d.purchase_price;
            summary.total_current_value += d.current_value;
            summary.total_depreciation_amount += d.depreciation_amount;
        }

        for (category, entry) in categories.iter_mut() {
            if entry.total_purchase_value > 0.0 {
                entry.avg_depreciation = crate::depreciation::round2(
                    (entry.total_purchase_value - entry.total_current_value)
                        / entry.total_purchase_value
                        * 100.0,
                );
            }
            let sum = annual.get(category).copied().unwrap_or_default();
            entry.avg_annual_depreciation =
                crate::depreciation::round2(sum / entry.total_assets as f64);
        }

        Self {
            assets,
            category_analytics: categories,
            summary,
        }
    }
}

#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
pub struct MaintenanceCostQuery {
    /// `3months`, `6months`, `12months` or `24months`
    pub timeframe: Option<String>,
}

impl MaintenanceCostQuery {
    pub fn resolve(&self, now: DateTime<Utc>) -> (String, DateRange) {
        let (label, months) = match self.timeframe.as_deref() {
            Some("3months") => ("3months", 3),
            Some("6months") => ("6months", 6),
            Some("24months") => ("24months", 24),
            _ => ("12months", 12),
        };
        let start = now.checked_sub_months(Months::new(months)).unwrap_or(now);
        (label.to_string(), DateRange { start, end: now })
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MaintenanceCostAnalytics {
    pub monthly_costs: Vec<MonthlyCost>,
    pub category_costs: Vec<GroupTotals>,
    pub total_metrics: MaintenanceCostTotals,
    pub timeframe: String,
    pub date_range: DateRange,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MaintenanceAnalytics {
    /// All-time per-status counts and actual cost
    pub stats: Vec<GroupTotals>,
    pub cost_analytics: Vec<MonthlyCost>,
    pub avg_resolution_days: f64,
    pub category_stats: Vec<GroupTotals>,
    pub date_range: DateRange,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TransferAnalytics {
    pub stats: Vec<GroupTotals>,
    /// Keyed by `YYYY-MM`
    pub trends: Vec<GroupTotals>,
    pub type_distribution: Vec<GroupCount>,
    pub date_range: DateRange,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AcquisitionAnalytics {
    pub request_stats: Vec<GroupTotals>,
    pub department_spending: Vec<GroupTotals>,
    pub category_analysis: Vec<ItemCategoryTotals>,
    pub vendor_performance: Vec<VendorOrders>,
    pub date_range: DateRange,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_alerts_only_for_nonzero_counters() {
        let now = Utc::now();
        assert!(AlertCounters::default().into_alerts(now).is_empty());

        let alerts = AlertCounters {
            overdue_maintenance: 2,
            high_value_acquisitions: 1,
            ..Default::default()
        }
        .into_alerts(now);
        let ids: Vec<_> = alerts.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["maintenance-overdue", "high-value-acquisitions"]);
        assert_eq!(alerts[0].kind, AlertKind::Error);
    }

    #[test]
    fn test_time_ranges() {
        let now = Utc.with_ymd_and_hms(2024, 6, 30, 0, 0, 0).unwrap();
        let (label, range) = MetricsQuery { time_range: Some("bogus".into()) }.resolve(now);
        assert_eq!(label, "30d");
        assert_eq!(range.start, now - Duration::days(30));

        let (_, range) = MetricsQuery { time_range: Some("1y".into()) }.resolve(now);
        assert_eq!(range.start, Utc.with_ymd_and_hms(2023, 6, 30, 0, 0, 0).unwrap());

        let (label, range) = MaintenanceCostQuery { timeframe: Some("3months".into()) }.resolve(now);
        assert_eq!(label, "3months");
        assert_eq!(range.start, Utc.with_ymd_and_hms(2024, 3, 30, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_utilization_rate_rounds_and_handles_empty_inventory() {
        let now = Utc::now();
        let range = DateRange { start: now, end: now };
        let metrics = DashboardCounters {
            total_assets: 3,
            active_assets: 2,
            ..Default::default()
        }
        .into_metrics("30d".into(), range);
        assert_eq!(metrics.utilization_rate, 67);

        let empty = DashboardCounters::default().into_metrics("30d".into(), range);
        assert_eq!(empty.utilization_rate, 0);
        assert_eq!(empty.avg_maintenance_cost, Decimal::ZERO);
    }

    #[test]
    fn test_date_range_default_lookback() {
        let now = Utc::now();
        let range = DateRangeQuery::default().resolve(now, 90);
        assert_eq!(range.end, now);
        assert_eq!(range.start, now - Duration::days(90));
    }
}
