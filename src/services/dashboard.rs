//! Dashboard and analytics service

use std::collections::BTreeMap;

use chrono::Utc;
use rust_decimal::Decimal;

use crate::{
    depreciation::{self, round2, DepreciationConfig},
    error::AppResult,
    models::{
        analytics::{
            ActivityItem, AlertCounters, AnalyticsDashboard, AssetAnalyticsQuery, CategoryDepreciation,
            DashboardAlert, DashboardMetrics, GroupCount, LifecycleShares, MaintenanceCostAnalytics,
            MaintenanceCostQuery, MetricsQuery, RecentRow,
        },
        asset::Asset,
        enums::{AssetCategory, AssetStatus},
    },
    repository::{
        analytics::{AssetDimension, RecentSource},
        Repository,
    },
    services::{assets::money, settings::SettingsService},
};

const DEFAULT_ACTIVITY: usize = 10;
const MAX_ACTIVITY: usize = 50;

fn percent(part: i64, total: i64) -> i64 {
    if total > 0 {
        (part as f64 / total as f64 * 100.0).round() as i64
    } else {
        0
    }
}

fn count_of(rows: &[GroupCount], key: &str) -> i64 {
    rows.iter().find(|r| r.key == key).map_or(0, |r| r.count)
}

/// Status shares plus the configured lifespan averaged over the assets in scope
fn lifecycle_shares(
    by_status: &[GroupCount],
    by_category: &[GroupCount],
    config: &DepreciationConfig,
) -> LifecycleShares {
    let total: i64 = by_status.iter().map(|r| r.count).sum();

    let (weighted, counted) = by_category
        .iter()
        .filter_map(|r| r.key.parse::<AssetCategory>().ok().map(|c| (c, r.count)))
        .fold((0.0, 0i64), |(sum, n), (category, count)| {
            (sum + config.lifespan(category) * count as f64, n + count)
        });

    LifecycleShares {
        in_use: percent(count_of(by_status, AssetStatus::Active.as_str()), total),
        under_maintenance: percent(count_of(by_status, AssetStatus::UnderMaintenance.as_str()), total),
        retired: percent(count_of(by_status, AssetStatus::Retired.as_str()), total),
        avg_lifespan_years: if counted > 0 {
            round2(weighted / counted as f64)
        } else {
            0.0
        },
    }
}

/// Calculator value per category next to the stored book value
fn category_depreciation(
    assets: &[Asset],
    config: &DepreciationConfig,
    now: chrono::DateTime<Utc>,
) -> Vec<CategoryDepreciation> {
    let mut groups: BTreeMap<AssetCategory, CategoryDepreciation> = BTreeMap::new();
    for asset in assets {
        let price = money(asset.purchase_price);
        let result = depreciation::depreciate(price, asset.purchase_date, asset.category, now, config);
        let entry = groups.entry(asset.category).or_insert_with(|| CategoryDepreciation {
            category: asset.category,
            count: 0,
            total_purchase: 0.0,
            total_current: 0.0,
            total_depreciated_value: 0.0,
            depreciation_rate: 0.0,
        });
        entry.count += 1;
        entry.total_purchase += price;
        entry.total_current += money(asset.current_value);
        entry.total_depreciated_value += result.current_value;
    }

    groups
        .into_values()
        .map(|mut entry| {
            entry.total_purchase = round2(entry.total_purchase);
            entry.total_current = round2(entry.total_current);
            entry.total_depreciated_value = round2(entry.total_depreciated_value);
            if entry.total_purchase > 0.0 {
                entry.depreciation_rate = round2(
                    (entry.total_purchase - entry.total_depreciated_value) / entry.total_purchase * 100.0,
                );
            }
            entry
        })
        .collect()
}

fn activity_item(source: RecentSource, row: RecentRow) -> ActivityItem {
    let (kind, title, description) = match source {
        RecentSource::Assets => (
            "asset",
            "Asset registered",
            format!("{} ({})", row.label, row.detail),
        ),
        RecentSource::Maintenance => (
            "maintenance",
            "Maintenance requested",
            format!("{}, status {}", row.label, row.detail),
        ),
        RecentSource::Transfers => (
            "transfer",
            "Transfer requested",
            if row.detail.is_empty() {
                row.label.clone()
            } else {
                format!("{} for {}", row.label, row.detail)
            },
        ),
        RecentSource::Acquisitions => (
            "acquisition",
            "Acquisition requested",
            format!("{} from {}", row.label, row.detail),
        ),
    };
    ActivityItem {
        id: format!("{}-{}", kind, row.id),
        kind: kind.to_string(),
        title: title.to_string(),
        description,
        timestamp: row.created_at,
    }
}

/// Newest first across every source, at most `limit` entries
fn merge_activity(mut items: Vec<ActivityItem>, limit: usize) -> Vec<ActivityItem> {
    items.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    items.truncate(limit);
    items
}

#[derive(Clone)]
pub struct DashboardService {
    repository: Repository,
    settings: SettingsService,
}

impl DashboardService {
    pub fn new(repository: Repository, settings: SettingsService) -> Self {
        Self { repository, settings }
    }

    pub async fn metrics(&self, query: &MetricsQuery) -> AppResult<DashboardMetrics> {
        let (label, range) = query.resolve(Utc::now());
        let counters = self.repository.analytics.dashboard_counters(range).await?;
        Ok(counters.into_metrics(label, range))
    }

    pub async fn alerts(&self) -> AppResult<Vec<DashboardAlert>> {
        let budget = self.settings.budget().await?;
        let threshold = Decimal::from_f64_retain(budget.high_value_threshold)
            .unwrap_or_default()
            .round_dp(2);
        let counters: AlertCounters = self.repository.analytics.alert_counters(threshold).await?;
        Ok(counters.into_alerts(Utc::now()))
    }

    pub async fn activity(&self, limit: Option<usize>) -> AppResult<Vec<ActivityItem>> {
        let limit = limit.unwrap_or(DEFAULT_ACTIVITY).clamp(1, MAX_ACTIVITY);
        let mut items = Vec::new();
        for source in [
            RecentSource::Assets,
            RecentSource::Maintenance,
            RecentSource::Transfers,
            RecentSource::Acquisitions,
        ] {
            let rows = self.repository.analytics.recent(source, limit as i64).await?;
            items.extend(rows.into_iter().map(|row| activity_item(source, row)));
        }
        Ok(merge_activity(items, limit))
    }

    pub async fn analytics_dashboard(&self, query: &AssetAnalyticsQuery) -> AppResult<AnalyticsDashboard> {
        let analytics = &self.repository.analytics;
        let config = self.settings.depreciation().await?;

        let asset_status = analytics.asset_counts(query, AssetDimension::Status).await?;
        let category_distribution = analytics.asset_counts(query, AssetDimension::Category).await?;
        let ownership_changes = analytics.asset_counts(query, AssetDimension::Branch).await?;
        let asset_value_trend = analytics.asset_value_trend(query).await?;

        let assets = self
            .repository
            .assets
            .list_all(query.branch.as_deref(), query.category, query.status)
            .await?;

        Ok(AnalyticsDashboard {
            lifecycle: lifecycle_shares(&asset_status, &category_distribution, &config),
            depreciation_data: category_depreciation(&assets, &config, Utc::now()),
            asset_status,
            ownership_changes,
            asset_value_trend,
            category_distribution,
        })
    }

    pub async fn maintenance_costs(&self, query: &MaintenanceCostQuery) -> AppResult<MaintenanceCostAnalytics> {
        let (timeframe, range) = query.resolve(Utc::now());
        let analytics = &self.repository.analytics;
        Ok(MaintenanceCostAnalytics {
            monthly_costs: analytics.maintenance_monthly_costs(range).await?,
            category_costs: analytics.maintenance_category_stats(range, true).await?,
            total_metrics: analytics.maintenance_cost_totals(range).await?,
            timeframe,
            date_range: range,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use uuid::Uuid;

    fn group(key: &str, count: i64) -> GroupCount {
        GroupCount {
            key: key.into(),
            count,
        }
    }

    #[test]
    fn test_lifecycle_shares() {
        let by_status = vec![group("Active", 6), group("Under Maintenance", 1), group("Retired", 3)];
        let by_category = vec![group("Laptop", 5), group("Furniture", 5)];
        let config = DepreciationConfig::default();
        let shares = lifecycle_shares(&by_status, &by_category, &config);

        assert_eq!(shares.in_use, 60);
        assert_eq!(shares.under_maintenance, 10);
        assert_eq!(shares.retired, 30);
        let expected = round2(
            (config.lifespan(AssetCategory::Laptop) + config.lifespan(AssetCategory::Furniture)) / 2.0,
        );
        assert_eq!(shares.avg_lifespan_years, expected);
    }

    #[test]
    fn test_lifecycle_empty_inventory() {
        let shares = lifecycle_shares(&[], &[], &DepreciationConfig::default());
        assert_eq!(shares.in_use, 0);
        assert_eq!(shares.avg_lifespan_years, 0.0);
    }

    #[test]
    fn test_merge_activity_sorts_and_truncates() {
        let base = Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap();
        let row = |minutes: i64| RecentRow {
            id: Uuid::new_v4(),
            label: "Laptop".into(),
            detail: "Active".into(),
            created_at: base + Duration::minutes(minutes),
        };
        let items = vec![
            activity_item(RecentSource::Assets, row(1)),
            activity_item(RecentSource::Maintenance, row(5)),
            activity_item(RecentSource::Transfers, row(3)),
        ];
        let merged = merge_activity(items, 2);

        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].kind, "maintenance");
        assert_eq!(merged[1].kind, "transfer");
        assert!(merged[0].id.starts_with("maintenance-"));
    }

    #[test]
    fn test_percent_rounds() {
        assert_eq!(percent(1, 3), 33);
        assert_eq!(percent(2, 3), 67);
        assert_eq!(percent(5, 0), 0);
    }
}
