//! Aggregate queries behind the dashboard and analytics endpoints

use rust_decimal::Decimal;
use sqlx::{Pool, Postgres};

use super::Filters;
use crate::{
    error::AppResult,
    models::analytics::{
        AlertCounters, AssetAnalyticsQuery, DashboardCounters, DateRange, GroupCount, GroupTotals,
        ItemCategoryTotals, MaintenanceCostTotals, MonthlyCost, RecentRow, ValuePoint, VendorOrders,
    },
};

/// Source table for the recent activity feed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecentSource {
    Assets,
    Maintenance,
    Transfers,
    Acquisitions,
}

impl RecentSource {
    fn query(&self) -> &'static str {
        match self {
            RecentSource::Assets => {
                "SELECT id, name AS label, status AS detail, created_at FROM assets \
                 ORDER BY created_at DESC LIMIT $1"
            }
            RecentSource::Maintenance => {
                "SELECT id, title AS label, status AS detail, created_at FROM maintenance_requests \
                 ORDER BY created_at DESC LIMIT $1"
            }
            RecentSource::Transfers => {
                "SELECT t.id, t.transfer_number AS label, COALESCE(a.name, '') AS detail, t.created_at \
                 FROM transfer_requests t LEFT JOIN assets a ON a.id = t.asset_id \
                 ORDER BY t.created_at DESC LIMIT $1"
            }
            RecentSource::Acquisitions => {
                "SELECT id, request_number AS label, department AS detail, created_at \
                 FROM acquisition_requests ORDER BY created_at DESC LIMIT $1"
            }
        }
    }
}

/// Asset column that can be grouped on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetDimension {
    Status,
    Branch,
    Category,
}

impl AssetDimension {
    fn column(&self) -> &'static str {
        match self {
            AssetDimension::Status => "status",
            AssetDimension::Branch => "branch",
            AssetDimension::Category => "category",
        }
    }
}

#[derive(Clone)]
pub struct AnalyticsRepository {
    pool: Pool<Postgres>,
}

impl AnalyticsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    // =========================================================================
    // DASHBOARD
    // =========================================================================

    /// Inventory counters plus request activity inside `range`
    pub async fn dashboard_counters(&self, range: DateRange) -> AppResult<DashboardCounters> {
        let row = sqlx::query_as::<_, DashboardCounters>(
            r#"
            SELECT
                (SELECT COUNT(*) FROM assets) AS total_assets,
                (SELECT COUNT(*) FROM assets WHERE status = 'Active') AS active_assets,
                (SELECT COUNT(*) FROM assets WHERE status = 'Under Maintenance') AS under_maintenance_assets,
                (SELECT COALESCE(SUM(current_value), 0) FROM assets) AS total_value,
                (SELECT COUNT(*) FROM maintenance_requests WHERE status = 'pending') AS pending_maintenance,
                (SELECT COUNT(*) FROM maintenance_requests
                    WHERE status IN ('pending', 'in-progress') AND estimated_completion < NOW()
                ) AS overdue_maintenance,
                (SELECT COALESCE(SUM(actual_cost), 0) FROM maintenance_requests
                    WHERE status = 'completed' AND created_at BETWEEN $1 AND $2
                ) AS completed_maintenance_cost,
                (SELECT AVG(actual_cost) FROM maintenance_requests
                    WHERE status = 'completed' AND created_at BETWEEN $1 AND $2
                ) AS avg_maintenance_cost,
                (SELECT COUNT(*) FROM transfer_requests WHERE status = 'pending') AS pending_transfers,
                (SELECT COUNT(*) FROM transfer_requests
                    WHERE status = 'completed' AND completed_date BETWEEN $1 AND $2
                ) AS completed_transfers,
                (SELECT COUNT(*) FROM acquisition_requests WHERE status = 'submitted') AS pending_acquisitions,
                (SELECT COUNT(*) FROM acquisition_requests
                    WHERE status = 'approved' AND approved_date BETWEEN $1 AND $2
                ) AS approved_acquisitions
            "#,
        )
        .bind(range.start)
        .bind(range.end)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn alert_counters(&self, high_value_threshold: Decimal) -> AppResult<AlertCounters> {
        let row = sqlx::query_as::<_, AlertCounters>(
            r#"
            SELECT
                (SELECT COUNT(*) FROM assets
                    WHERE status <> 'Retired'
                      AND warranty_expiry BETWEEN NOW() AND NOW() + INTERVAL '30 days'
                ) AS expiring_warranties,
                (SELECT COUNT(*) FROM maintenance_requests
                    WHERE status IN ('pending', 'in-progress') AND estimated_completion < NOW()
                ) AS overdue_maintenance,
                (SELECT COUNT(*) FROM transfer_requests WHERE status = 'pending')
                    + (SELECT COUNT(*) FROM acquisition_requests WHERE status = 'submitted')
                    AS pending_approvals,
                (SELECT COUNT(*) FROM acquisition_requests
                    WHERE status = 'submitted' AND total_cost >= $1
                ) AS high_value_acquisitions
            "#,
        )
        .bind(high_value_threshold)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    pub async fn recent(&self, source: RecentSource, limit: i64) -> AppResult<Vec<RecentRow>> {
        let rows = sqlx::query_as::<_, RecentRow>(source.query())
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    // =========================================================================
    // ASSETS
    // =========================================================================

    fn asset_filters(query: &AssetAnalyticsQuery) -> Filters {
        let mut filters = Filters::default();
        filters
            .eq("category", query.category)
            .eq("branch", query.branch.as_deref())
            .eq("status", query.status);
        filters
    }

    pub async fn asset_counts(
        &self,
        query: &AssetAnalyticsQuery,
        dimension: AssetDimension,
    ) -> AppResult<Vec<GroupCount>> {
        let filters = Self::asset_filters(query);
        let column = dimension.column();
        let sql = format!(
            "SELECT {col} AS key, COUNT(*) AS count FROM assets {w} GROUP BY {col} ORDER BY count DESC, {col}",
            col = column,
            w = filters.where_clause()
        );

        let mut builder = sqlx::query_as::<_, GroupCount>(&sql);
        for param in filters.params() {
            builder = builder.bind(param);
        }
        Ok(builder.fetch_all(&self.pool).await?)
    }

    /// Purchase value per purchase month, the latest twelve months with purchases, oldest first
    pub async fn asset_value_trend(&self, query: &AssetAnalyticsQuery) -> AppResult<Vec<ValuePoint>> {
        let filters = Self::asset_filters(query);
        let sql = format!(
            r#"
            SELECT month, total_value, count FROM (
                SELECT TO_CHAR(DATE_TRUNC('month', purchase_date), 'YYYY-MM') AS month,
                       COALESCE(SUM(purchase_price), 0) AS total_value,
                       COUNT(*) AS count
                FROM assets {}
                GROUP BY 1
                ORDER BY 1 DESC
                LIMIT 12
            ) recent
            ORDER BY month
            "#,
            filters.where_clause()
        );

        let mut builder = sqlx::query_as::<_, ValuePoint>(&sql);
        for param in filters.params() {
            builder = builder.bind(param);
        }
        Ok(builder.fetch_all(&self.pool).await?)
    }

    // =========================================================================
    // MAINTENANCE
    // =========================================================================

    /// All-time counts and actual cost per status
    pub async fn maintenance_status_stats(&self) -> AppResult<Vec<GroupTotals>> {
        let rows = sqlx::query_as::<_, GroupTotals>(
            r#"
            SELECT status AS key, COUNT(*) AS count,
                   COALESCE(SUM(actual_cost), 0) AS total, AVG(actual_cost) AS average
            FROM maintenance_requests
            GROUP BY status
            ORDER BY status
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Completed requests created in `range`, per month
    pub async fn maintenance_monthly_costs(&self, range: DateRange) -> AppResult<Vec<MonthlyCost>> {
        let rows = sqlx::query_as::<_, MonthlyCost>(
            r#"
            SELECT TO_CHAR(DATE_TRUNC('month', created_at), 'YYYY-MM') AS month,
                   COUNT(*) AS request_count,
                   COALESCE(SUM(actual_cost), 0) AS total_cost,
                   COALESCE(SUM(labor_cost), 0) AS labor_cost,
                   COALESCE(SUM(parts_cost), 0) AS parts_cost,
                   AVG(actual_cost) AS avg_cost
            FROM maintenance_requests
            WHERE status = 'completed' AND created_at BETWEEN $1 AND $2
            GROUP BY 1
            ORDER BY 1
            "#,
        )
        .bind(range.start)
        .bind(range.end)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Per-category counts and actual cost for requests created in `range`
    pub async fn maintenance_category_stats(
        &self,
        range: DateRange,
        completed_only: bool,
    ) -> AppResult<Vec<GroupTotals>> {
        let rows = sqlx::query_as::<_, GroupTotals>(
            r#"
            SELECT category AS key, COUNT(*) AS count,
                   COALESCE(SUM(actual_cost), 0) AS total, AVG(actual_cost) AS average
            FROM maintenance_requests
            WHERE created_at BETWEEN $1 AND $2 AND (NOT $3 OR status = 'completed')
            GROUP BY category
            ORDER BY total DESC, category
            "#,
        )
        .bind(range.start)
        .bind(range.end)
        .bind(completed_only)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn maintenance_cost_totals(&self, range: DateRange) -> AppResult<MaintenanceCostTotals> {
        let row = sqlx::query_as::<_, MaintenanceCostTotals>(
            r#"
            SELECT COALESCE(SUM(actual_cost), 0) AS total_cost,
                   COALESCE(SUM(labor_cost), 0) AS total_labor_cost,
                   COALESCE(SUM(parts_cost), 0) AS total_parts_cost,
                   COUNT(*) AS total_requests,
                   AVG(actual_cost) AS avg_cost,
                   AVG(time_spent) AS avg_time_spent
            FROM maintenance_requests
            WHERE status = 'completed' AND created_at BETWEEN $1 AND $2
            "#,
        )
        .bind(range.start)
        .bind(range.end)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    /// Mean days from creation to completion, `None` when nothing completed
    pub async fn maintenance_avg_resolution_days(&self, range: DateRange) -> AppResult<Option<f64>> {
        let days: Option<f64> = sqlx::query_scalar(
            r#"
            SELECT (AVG(EXTRACT(EPOCH FROM actual_completion - created_at)) / 86400)::float8
            FROM maintenance_requests
            WHERE status = 'completed' AND actual_completion IS NOT NULL
              AND created_at BETWEEN $1 AND $2
            "#,
        )
        .bind(range.start)
        .bind(range.end)
        .fetch_one(&self.pool)
        .await?;
        Ok(days)
    }

    // =========================================================================
    // TRANSFERS
    // =========================================================================

    pub async fn transfer_status_stats(&self, range: DateRange) -> AppResult<Vec<GroupTotals>> {
        let rows = sqlx::query_as::<_, GroupTotals>(
            r#"
            SELECT status AS key, COUNT(*) AS count,
                   COALESCE(SUM(transfer_cost), 0) AS total, AVG(transfer_cost) AS average
            FROM transfer_requests
            WHERE created_at BETWEEN $1 AND $2
            GROUP BY status
            ORDER BY status
            "#,
        )
        .bind(range.start)
        .bind(range.end)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Transfers created in `range`, keyed by `YYYY-MM`
    pub async fn transfer_monthly(&self, range: DateRange) -> AppResult<Vec<GroupTotals>> {
        let rows = sqlx::query_as::<_, GroupTotals>(
            r#"
            SELECT TO_CHAR(DATE_TRUNC('month', created_at), 'YYYY-MM') AS key,
                   COUNT(*) AS count,
                   COALESCE(SUM(transfer_cost), 0) AS total, AVG(transfer_cost) AS average
            FROM transfer_requests
            WHERE created_at BETWEEN $1 AND $2
            GROUP BY 1
            ORDER BY 1
            "#,
        )
        .bind(range.start)
        .bind(range.end)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn transfer_types(&self, range: DateRange) -> AppResult<Vec<GroupCount>> {
        let rows = sqlx::query_as::<_, GroupCount>(
            r#"
            SELECT transfer_type AS key, COUNT(*) AS count
            FROM transfer_requests
            WHERE created_at BETWEEN $1 AND $2
            GROUP BY transfer_type
            ORDER BY count DESC, transfer_type
            "#,
        )
        .bind(range.start)
        .bind(range.end)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    // =========================================================================
    // ACQUISITIONS
    // =========================================================================

    pub async fn acquisition_status_stats(&self, range: DateRange) -> AppResult<Vec<GroupTotals>> {
        let rows = sqlx::query_as::<_, GroupTotals>(
            r#"
            SELECT status AS key, COUNT(*) AS count,
                   COALESCE(SUM(total_cost), 0) AS total, AVG(total_cost) AS average
            FROM acquisition_requests
            WHERE created_at BETWEEN $1 AND $2
            GROUP BY status
            ORDER BY status
            "#,
        )
        .bind(range.start)
        .bind(range.end)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Committed spend (approved onwards) per department
    pub async fn department_spending(&self, range: DateRange) -> AppResult<Vec<GroupTotals>> {
        let rows = sqlx::query_as::<_, GroupTotals>(
            r#"
            SELECT department AS key, COUNT(*) AS count,
                   COALESCE(SUM(total_cost), 0) AS total, AVG(total_cost) AS average
            FROM acquisition_requests
            WHERE status IN ('approved', 'ordered', 'delivered', 'completed')
              AND created_at BETWEEN $1 AND $2
            GROUP BY department
            ORDER BY total DESC, department
            "#,
        )
        .bind(range.start)
        .bind(range.end)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Line items across requests created in `range`, per item category
    pub async fn item_categories(&self, range: DateRange) -> AppResult<Vec<ItemCategoryTotals>> {
        let rows = sqlx::query_as::<_, ItemCategoryTotals>(
            r#"
            SELECT item->>'category' AS category,
                   COALESCE(SUM((item->>'quantity')::bigint), 0)::bigint AS total_quantity,
                   COALESCE(SUM((item->>'totalPrice')::numeric), 0) AS total_value,
                   AVG((item->>'unitPrice')::numeric) AS avg_unit_price
            FROM acquisition_requests r
            CROSS JOIN LATERAL jsonb_array_elements(r.items) AS item
            WHERE r.created_at BETWEEN $1 AND $2
            GROUP BY 1
            ORDER BY total_value DESC, 1
            "#,
        )
        .bind(range.start)
        .bind(range.end)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn vendor_performance(&self, range: DateRange) -> AppResult<Vec<VendorOrders>> {
        let rows = sqlx::query_as::<_, VendorOrders>(
            r#"
            SELECT selected_vendor AS vendor,
                   COUNT(*) AS order_count,
                   COALESCE(SUM(total_cost), 0) AS total_value,
                   (AVG(EXTRACT(EPOCH FROM actual_delivery - expected_delivery)) / 86400)::float8
                       AS avg_delivery_delay_days
            FROM acquisition_requests
            WHERE selected_vendor IS NOT NULL AND created_at BETWEEN $1 AND $2
            GROUP BY selected_vendor
            ORDER BY order_count DESC, selected_vendor
            "#,
        )
        .bind(range.start)
        .bind(range.end)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recent_queries_share_columns() {
        for source in [
            RecentSource::Assets,
            RecentSource::Maintenance,
            RecentSource::Transfers,
            RecentSource::Acquisitions,
        ] {
            let sql = source.query();
            assert!(sql.contains("AS label"), "{:?}", source);
            assert!(sql.contains("AS detail"), "{:?}", source);
            assert!(sql.ends_with("LIMIT $1"), "{:?}", source);
        }
    }

    #[test]
    fn test_asset_filters_bind_in_order() {
        let query = AssetAnalyticsQuery {
            category: Some(crate::models::enums::AssetCategory::Laptop),
            branch: Some("HQ".to_string()),
            status: None,
        };
        let filters = AnalyticsRepository::asset_filters(&query);
        assert_eq!(filters.where_clause(), "WHERE category = $1 AND branch = $2");
        assert_eq!(filters.params(), &["Laptop".to_string(), "HQ".to_string()]);
    }
}
