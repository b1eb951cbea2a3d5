//! Persisted system settings
//!
//! Each section is stored as one JSONB row in the `settings` table, keyed by
//! [`SettingsSection::key`]. Startup seeds missing rows from configuration.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use super::enums::AssetCategory;
use crate::{
    config::BudgetConfig,
    depreciation::{DepreciationConfig, DepreciationMethod},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsSection {
    Depreciation,
    Maintenance,
    Audit,
    System,
    Budget,
}

impl SettingsSection {
    pub const ALL: [SettingsSection; 5] = [
        SettingsSection::Depreciation,
        SettingsSection::Maintenance,
        SettingsSection::Audit,
        SettingsSection::System,
        SettingsSection::Budget,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            SettingsSection::Depreciation => "depreciation",
            SettingsSection::Maintenance => "maintenance",
            SettingsSection::Audit => "audit",
            SettingsSection::System => "system",
            SettingsSection::Budget => "budget",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct MaintenanceSettings {
    pub auto_assign_requests: bool,
    pub email_notifications: bool,
    pub warranty_alerts: bool,
    pub maintenance_reminders: bool,
    /// Months
    #[validate(range(min = 1, max = 120, message = "Warranty period must be 1 to 120 months"))]
    pub default_warranty_period: i32,
    /// Megabytes
    #[validate(range(min = 1, max = 100, message = "Max file size must be 1 to 100 MB"))]
    pub max_file_size: i32,
    pub allowed_file_types: Vec<String>,
}

impl Default for MaintenanceSettings {
    fn default() -> Self {
        Self {
            auto_assign_requests: false,
            email_notifications: true,
            warranty_alerts: true,
            maintenance_reminders: true,
            default_warranty_period: 12,
            max_file_size: 10,
            allowed_file_types: ["pdf", "jpg", "png", "doc", "docx"]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum AuditFrequency {
    Monthly,
    Quarterly,
    Annually,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct AuditSettings {
    pub frequency: AuditFrequency,
    #[validate(range(min = 1, max = 365, message = "Reminder days must be 1 to 365"))]
    pub reminder_days: i32,
    pub auto_generate_reports: bool,
}

impl Default for AuditSettings {
    fn default() -> Self {
        Self {
            frequency: AuditFrequency::Quarterly,
            reminder_days: 7,
            auto_generate_reports: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct SystemPreferences {
    pub theme: String,
    pub language: String,
    pub timezone: String,
    pub date_format: String,
    pub currency: String,
}

impl Default for SystemPreferences {
    fn default() -> Self {
        Self {
            theme: "light".into(),
            language: "en".into(),
            timezone: "UTC".into(),
            date_format: "MM/DD/YYYY".into(),
            currency: "USD".into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct BudgetSettings {
    #[validate(range(min = 0.0, message = "Budget cannot be negative"))]
    pub department_annual_budget: f64,
    /// Submitted acquisitions at or above this total raise a dashboard alert
    #[validate(range(min = 0.0, message = "Threshold cannot be negative"))]
    pub high_value_threshold: f64,
}

impl Default for BudgetSettings {
    fn default() -> Self {
        BudgetConfig::default().into()
    }
}

impl From<BudgetConfig> for BudgetSettings {
    fn from(config: BudgetConfig) -> Self {
        Self {
            department_annual_budget: config.department_annual_budget,
            high_value_threshold: config.high_value_threshold,
        }
    }
}

/// All settings sections
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SystemSettings {
    pub depreciation: DepreciationConfig,
    pub maintenance: MaintenanceSettings,
    pub audit: AuditSettings,
    pub system: SystemPreferences,
    pub budget: BudgetSettings,
}

/// Query for the standalone depreciation calculator
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DepreciationCalculateQuery {
    pub purchase_price: f64,
    pub purchase_date: DateTime<Utc>,
    pub category: AssetCategory,
    /// Defaults to now
    pub current_date: Option<DateTime<Utc>>,
    /// Defaults to the configured method
    pub method: Option<DepreciationMethod>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_sections_fill_defaults() {
        let maintenance: MaintenanceSettings =
            serde_json::from_str(r#"{"autoAssignRequests": true}"#).unwrap();
        assert!(maintenance.auto_assign_requests);
        assert_eq!(maintenance.default_warranty_period, 12);

        let audit: AuditSettings = serde_json::from_str(r#"{"frequency": "monthly"}"#).unwrap();
        assert_eq!(audit.frequency, AuditFrequency::Monthly);
        assert_eq!(audit.reminder_days, 7);
    }

    #[test]
    fn test_section_ranges() {
        let maintenance = MaintenanceSettings {
            default_warranty_period: 0,
            ..Default::default()
        };
        assert!(maintenance.validate().is_err());

        let audit = AuditSettings {
            reminder_days: 400,
            ..Default::default()
        };
        assert!(audit.validate().is_err());

        let budget = BudgetSettings {
            department_annual_budget: -1.0,
            ..Default::default()
        };
        assert!(budget.validate().is_err());
    }

    #[test]
    fn test_section_keys_are_distinct() {
        let mut keys: Vec<_> = SettingsSection::ALL.iter().map(|s| s.key()).collect();
        keys.dedup();
        assert_eq!(keys.len(), 5);
    }
}
