//! Maintenance request model

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use super::{
    deserialize_some,
    enums::{MaintenanceCategory, MaintenanceStatus, Priority},
};
use crate::workflow::TimelineEntry;

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MaintenanceRequest {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub asset_id: Uuid,
    pub requested_by: Uuid,
    pub assigned_to: Option<Uuid>,
    pub assigned_vendor: Option<Uuid>,
    pub priority: Priority,
    pub category: MaintenanceCategory,
    pub status: MaintenanceStatus,
    pub estimated_cost: Option<Decimal>,
    pub actual_cost: Option<Decimal>,
    pub labor_cost: Decimal,
    pub parts_cost: Decimal,
    /// Hours
    pub time_spent: f64,
    pub estimated_completion: Option<DateTime<Utc>>,
    pub actual_completion: Option<DateTime<Utc>>,
    pub warranty_eligible: bool,
    pub warranty_used: bool,
    pub approved_by: Option<Uuid>,
    pub approved_date: Option<DateTime<Utc>>,
    pub rejection_reason: Option<String>,
    pub notes: Option<String>,
    pub resolution: Option<String>,
    #[sqlx(json)]
    pub feedback: Option<Feedback>,
    #[sqlx(json)]
    #[schema(value_type = Vec<MaintenanceLogEntry>)]
    pub work_log: Vec<TimelineEntry<MaintenanceStatus>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl MaintenanceRequest {
    pub fn total_cost(&self) -> Decimal {
        self.labor_cost + self.parts_cost
    }

    /// Whole days from creation to completion, rounded up
    pub fn duration_days(&self) -> Option<i64> {
        self.actual_completion.map(|done| {
            let elapsed = done - self.created_at;
            let days = elapsed.num_days();
            if elapsed > Duration::days(days) {
                days + 1
            } else {
                days
            }
        })
    }

    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        let open = matches!(
            self.status,
            MaintenanceStatus::Pending | MaintenanceStatus::Approved | MaintenanceStatus::InProgress
        );
        open && self.estimated_completion.map(|due| now > due).unwrap_or(false)
    }

    pub fn participants(&self) -> [Option<Uuid>; 2] {
        [Some(self.requested_by), self.assigned_to]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Feedback {
    pub rating: i32,
    pub comment: Option<String>,
    pub submitted_at: DateTime<Utc>,
}

/// Maintenance request with derived figures
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MaintenanceView {
    #[serde(flatten)]
    pub request: MaintenanceRequest,
    pub total_cost: Decimal,
    pub duration_days: Option<i64>,
    pub is_overdue: bool,
}

impl From<MaintenanceRequest> for MaintenanceView {
    fn from(request: MaintenanceRequest) -> Self {
        let now = Utc::now();
        Self {
            total_cost: request.total_cost(),
            duration_days: request.duration_days(),
            is_overdue: request.is_overdue(now),
            request,
        }
    }
}

#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MaintenanceQuery {
    pub status: Option<MaintenanceStatus>,
    pub priority: Option<Priority>,
    pub category: Option<MaintenanceCategory>,
    pub assigned_to: Option<Uuid>,
    pub asset_id: Option<Uuid>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateMaintenance {
    #[validate(length(min = 1, max = 200, message = "Title is required"))]
    pub title: String,
    #[validate(length(min = 1, max = 2000, message = "Description is required"))]
    pub description: String,
    pub asset_id: Uuid,
    pub priority: Option<Priority>,
    pub category: MaintenanceCategory,
    pub estimated_cost: Option<Decimal>,
    pub estimated_completion: Option<DateTime<Utc>>,
    #[serde(default)]
    pub warranty_eligible: bool,
    pub assigned_vendor: Option<Uuid>,
}

/// Update maintenance request; only these fields can change
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateMaintenance {
    pub status: Option<MaintenanceStatus>,
    pub priority: Option<Priority>,
    pub estimated_cost: Option<Decimal>,
    pub actual_cost: Option<Decimal>,
    pub labor_cost: Option<Decimal>,
    pub parts_cost: Option<Decimal>,
    #[validate(range(min = 0.0, message = "Time spent cannot be negative"))]
    pub time_spent: Option<f64>,
    pub notes: Option<String>,
    pub resolution: Option<String>,
    #[serde(default, deserialize_with = "deserialize_some")]
    #[schema(value_type = Option<Uuid>)]
    pub assigned_to: Option<Option<Uuid>>,
    pub estimated_completion: Option<DateTime<Utc>>,
    pub warranty_used: Option<bool>,
    /// Stored as the rejection reason when rejecting
    pub reason: Option<String>,
}

impl UpdateMaintenance {
    pub fn costs(&self) -> [Option<Decimal>; 4] {
        [self.estimated_cost, self.actual_cost, self.labor_cost, self.parts_cost]
    }
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AssignMaintenance {
    pub assigned_to: Uuid,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmitFeedback {
    #[validate(range(min = 1, max = 5, message = "Rating must be between 1 and 5"))]
    pub rating: i32,
    #[validate(length(max = 1000, message = "Comment is too long"))]
    pub comment: Option<String>,
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub fn sample_request() -> MaintenanceRequest {
        let now = Utc::now();
        MaintenanceRequest {
            id: Uuid::new_v4(),
            title: "Broken screen".into(),
            description: "Cracked panel".into(),
            asset_id: Uuid::new_v4(),
            requested_by: Uuid::new_v4(),
            assigned_to: None,
            assigned_vendor: None,
            priority: Priority::Medium,
            category: MaintenanceCategory::Hardware,
            status: MaintenanceStatus::Pending,
            estimated_cost: None,
            actual_cost: None,
            labor_cost: Decimal::ZERO,
            parts_cost: Decimal::ZERO,
            time_spent: 0.0,
            estimated_completion: None,
            actual_completion: None,
            warranty_eligible: false,
            warranty_used: false,
            approved_by: None,
            approved_date: None,
            rejection_reason: None,
            notes: None,
            resolution: None,
            feedback: None,
            work_log: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_duration_rounds_up() {
        let mut request = sample_request();
        assert_eq!(request.duration_days(), None);
        request.actual_completion = Some(request.created_at + Duration::hours(25));
        assert_eq!(request.duration_days(), Some(2));
        request.actual_completion = Some(request.created_at + Duration::days(3));
        assert_eq!(request.duration_days(), Some(3));
    }

    #[test]
    fn test_overdue_only_while_open() {
        let mut request = sample_request();
        let now = Utc::now();
        request.estimated_completion = Some(now - Duration::days(1));
        assert!(request.is_overdue(now));
        request.status = MaintenanceStatus::Completed;
        assert!(!request.is_overdue(now));
    }

    #[test]
    fn test_total_cost() {
        let mut request = sample_request();
        request.labor_cost = Decimal::new(12050, 2);
        request.parts_cost = Decimal::new(7950, 2);
        assert_eq!(request.total_cost(), Decimal::new(200, 0));
    }
}
