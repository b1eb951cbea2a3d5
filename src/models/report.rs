//! Report model

use chrono::{DateTime, Datelike, TimeZone, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use super::enums::{ReportDateRange, ReportFormat, ReportStatus, ReportType};

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub id: Uuid,
    /// `RPT-XXXXXX`
    pub report_number: String,
    pub title: String,
    pub description: Option<String>,
    pub generated_by: Uuid,
    #[sqlx(json)]
    pub config: ReportConfig,
    pub status: ReportStatus,
    #[sqlx(json)]
    pub metadata: ReportMetadata,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReportConfig {
    #[serde(rename = "type")]
    pub report_type: ReportType,
    /// Recorded for clients; rows are always returned as JSON
    #[serde(default)]
    pub format: ReportFormat,
    #[serde(default)]
    pub date_range: ReportDateRange,
    pub custom_start_date: Option<DateTime<Utc>>,
    pub custom_end_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub filters: ReportFilters,
    #[serde(default)]
    pub include_charts: bool,
    #[serde(default = "default_true")]
    pub include_details: bool,
}

fn default_true() -> bool {
    true
}

impl ReportConfig {
    /// Window of records covered by the report, `None` when unbounded
    pub fn window(&self, now: DateTime<Utc>) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        let month_start = |year: i32, month0: i32| {
            let total = year * 12 + month0;
            let (y, m) = (total.div_euclid(12), total.rem_euclid(12) as u32 + 1);
            Utc.with_ymd_and_hms(y, m, 1, 0, 0, 0).single()
        };
        let this_month0 = now.month0() as i32;
        match self.date_range {
            ReportDateRange::LastMonth => month_start(now.year(), this_month0 - 1).map(|s| (s, now)),
            ReportDateRange::LastQuarter => month_start(now.year(), this_month0 - 3).map(|s| (s, now)),
            ReportDateRange::LastYear => month_start(now.year() - 1, 0).map(|s| (s, now)),
            ReportDateRange::Custom => self.custom_start_date.zip(self.custom_end_date),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct ReportFilters {
    pub branch: Option<String>,
    pub category: Option<String>,
    pub status: Option<String>,
    pub department: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct ReportMetadata {
    pub record_count: i64,
    pub total_value: Decimal,
    /// Milliseconds
    pub processing_time: i64,
    pub date_generated: Option<DateTime<Utc>>,
    pub error: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GenerateReport {
    #[validate(length(min = 1, max = 200, message = "Title is required"))]
    pub title: String,
    pub description: Option<String>,
    pub config: ReportConfig,
}

/// Generated report with its rows
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReportOutput {
    pub report: Report,
    #[schema(value_type = Vec<Object>)]
    pub rows: Vec<serde_json::Value>,
}

#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReportQuery {
    #[serde(rename = "type")]
    pub report_type: Option<ReportType>,
    pub status: Option<ReportStatus>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(date_range: ReportDateRange) -> ReportConfig {
        ReportConfig {
            report_type: ReportType::MaintenanceSummary,
            format: ReportFormat::Csv,
            date_range,
            custom_start_date: None,
            custom_end_date: None,
            filters: ReportFilters::default(),
            include_charts: false,
            include_details: true,
        }
    }

    #[test]
    fn test_windows() {
        let now = Utc.with_ymd_and_hms(2024, 2, 15, 12, 0, 0).unwrap();
        let (start, end) = config(ReportDateRange::LastMonth).window(now).unwrap();
        assert_eq!(start, Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
        assert_eq!(end, now);

        let (start, _) = config(ReportDateRange::LastQuarter).window(now).unwrap();
        assert_eq!(start, Utc.with_ymd_and_hms(2023, 11, 1, 0, 0, 0).unwrap());

        let (start, _) = config(ReportDateRange::LastYear).window(now).unwrap();
        assert_eq!(start, Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap());

        assert!(config(ReportDateRange::Custom).window(now).is_none());
    }

    #[test]
    fn test_config_json_uses_type_key() {
        let parsed: ReportConfig =
            serde_json::from_str(r#"{"type": "asset-inventory", "filters": {"branch": "HQ"}}"#)
                .unwrap();
        assert_eq!(parsed.report_type, ReportType::AssetInventory);
        assert_eq!(parsed.format, ReportFormat::Pdf);
        assert_eq!(parsed.filters.branch.as_deref(), Some("HQ"));
        assert!(parsed.include_details);
    }
}
