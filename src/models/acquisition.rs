//! Acquisition request model

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use super::enums::{AcquisitionStatus, Department, ItemCategory, Priority, Urgency};
use crate::workflow::TimelineEntry;

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AcquisitionRequest {
    pub id: Uuid,
    /// `ACQ-XXXXXX`
    pub request_number: String,
    pub requested_by: Uuid,
    pub department: Department,
    pub branch: String,
    pub status: AcquisitionStatus,
    pub priority: Priority,
    pub justification: String,
    pub business_case: String,
    #[sqlx(json)]
    pub items: Vec<LineItem>,
    /// Sum of item totals, recomputed on every save
    pub total_cost: Decimal,
    pub budget_code: Option<String>,
    pub approved_by: Option<Uuid>,
    pub approved_date: Option<DateTime<Utc>>,
    pub rejection_reason: Option<String>,
    #[sqlx(json)]
    pub vendor_quotes: Vec<VendorQuote>,
    pub selected_vendor: Option<String>,
    pub po_number: Option<String>,
    pub expected_delivery: Option<DateTime<Utc>>,
    pub actual_delivery: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    #[sqlx(json)]
    #[schema(value_type = Vec<AcquisitionTimelineEntry>)]
    pub timeline: Vec<TimelineEntry<AcquisitionStatus>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl AcquisitionRequest {
    /// Refresh every item's total and the request total
    pub fn recompute_totals(&mut self) {
        for item in &mut self.items {
            item.total_price = item.unit_price * Decimal::from(item.quantity);
        }
        self.total_cost = self.items.iter().map(|item| item.total_price).sum();
    }

    pub fn selected_quote(&self) -> Option<&VendorQuote> {
        self.vendor_quotes.iter().find(|q| q.selected)
    }

    pub fn participants(&self) -> [Option<Uuid>; 2] {
        [Some(self.requested_by), self.approved_by]
    }

    /// Status counts against the department budget
    pub fn is_committed(status: AcquisitionStatus) -> bool {
        matches!(
            status,
            AcquisitionStatus::Approved
                | AcquisitionStatus::Ordered
                | AcquisitionStatus::Delivered
                | AcquisitionStatus::Completed
        )
    }

    pub fn is_awaiting_decision(status: AcquisitionStatus) -> bool {
        matches!(
            status,
            AcquisitionStatus::Submitted | AcquisitionStatus::UnderReview
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    pub name: String,
    pub category: ItemCategory,
    pub description: Option<String>,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub total_price: Decimal,
    pub specifications: Option<String>,
    pub urgency: Urgency,
    pub vendor: Option<String>,
    pub model: Option<String>,
    pub warranty: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VendorQuote {
    pub id: Uuid,
    pub vendor_name: String,
    pub vendor_email: Option<String>,
    pub quoted_price: Decimal,
    pub delivery_time: Option<String>,
    pub warranty: Option<String>,
    pub notes: Option<String>,
    pub quote_date: DateTime<Utc>,
    pub valid_until: Option<DateTime<Utc>>,
    pub selected: bool,
}

#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AcquisitionQuery {
    pub status: Option<AcquisitionStatus>,
    pub priority: Option<Priority>,
    pub department: Option<Department>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateLineItem {
    #[validate(length(min = 1, max = 200, message = "Item name is required"))]
    pub name: String,
    pub category: ItemCategory,
    pub description: Option<String>,
    #[validate(range(min = 1, message = "Quantity must be at least 1"))]
    pub quantity: i32,
    pub unit_price: Decimal,
    pub specifications: Option<String>,
    pub urgency: Option<Urgency>,
    pub vendor: Option<String>,
    pub model: Option<String>,
    pub warranty: Option<String>,
}

impl From<CreateLineItem> for LineItem {
    fn from(item: CreateLineItem) -> Self {
        LineItem {
            total_price: item.unit_price * Decimal::from(item.quantity),
            name: item.name,
            category: item.category,
            description: item.description,
            quantity: item.quantity,
            unit_price: item.unit_price,
            specifications: item.specifications,
            urgency: item.urgency.unwrap_or_default(),
            vendor: item.vendor,
            model: item.model,
            warranty: item.warranty,
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateAcquisition {
    pub department: Department,
    #[validate(length(min = 1, message = "Branch is required"))]
    pub branch: String,
    #[validate(length(min = 1, max = 2000, message = "Justification is required"))]
    pub justification: String,
    #[validate(length(min = 1, max = 5000, message = "Business case is required"))]
    pub business_case: String,
    #[validate(length(min = 1, message = "At least one item is required"), nested)]
    pub items: Vec<CreateLineItem>,
    pub priority: Option<Priority>,
    pub budget_code: Option<String>,
    pub expected_delivery: Option<DateTime<Utc>>,
    pub notes: Option<String>,
}

/// Editable while the request is a draft or awaiting a decision
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAcquisition {
    #[validate(length(min = 1, max = 2000, message = "Justification cannot be empty"))]
    pub justification: Option<String>,
    #[validate(length(min = 1, max = 5000, message = "Business case cannot be empty"))]
    pub business_case: Option<String>,
    #[validate(length(min = 1, message = "At least one item is required"), nested)]
    pub items: Option<Vec<CreateLineItem>>,
    pub priority: Option<Priority>,
    pub budget_code: Option<String>,
    pub expected_delivery: Option<DateTime<Utc>>,
    pub notes: Option<String>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AcquisitionDecision {
    pub notes: Option<String>,
    pub budget_code: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RejectAcquisition {
    #[validate(length(min = 1, max = 1000, message = "A rejection reason is required"))]
    pub reason: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddVendorQuote {
    #[validate(length(min = 1, max = 200, message = "Vendor name is required"))]
    pub vendor_name: String,
    #[validate(email(message = "Invalid email format"))]
    pub vendor_email: Option<String>,
    pub quoted_price: Decimal,
    pub delivery_time: Option<String>,
    pub warranty: Option<String>,
    pub notes: Option<String>,
    pub valid_until: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SelectVendor {
    pub quote_id: Uuid,
    pub po_number: Option<String>,
    pub expected_delivery: Option<DateTime<Utc>>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeliverAcquisition {
    pub actual_delivery: Option<DateTime<Utc>>,
    pub notes: Option<String>,
}

#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BudgetQuery {
    pub year: Option<i32>,
}

/// Department budget utilisation for one calendar year
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BudgetSummary {
    pub department: Department,
    pub year: i32,
    pub total_budget: Decimal,
    pub used_budget: Decimal,
    pub remaining_budget: Decimal,
    pub pending_requests: i64,
    pub utilization_percentage: f64,
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub fn line(quantity: i32, unit_price: i64) -> CreateLineItem {
        CreateLineItem {
            name: "Item".into(),
            category: ItemCategory::Laptop,
            description: None,
            quantity,
            unit_price: Decimal::from(unit_price),
            specifications: None,
            urgency: None,
            vendor: None,
            model: None,
            warranty: None,
        }
    }

    pub fn sample_request(items: Vec<CreateLineItem>) -> AcquisitionRequest {
        let now = Utc::now();
        let mut request = AcquisitionRequest {
            id: Uuid::new_v4(),
            request_number: "ACQ-TEST01".into(),
            requested_by: Uuid::new_v4(),
            department: Department::It,
            branch: "HQ".into(),
            status: AcquisitionStatus::Draft,
            priority: Priority::Medium,
            justification: "Team growth".into(),
            business_case: "Two new hires".into(),
            items: items.into_iter().map(LineItem::from).collect(),
            total_cost: Decimal::ZERO,
            budget_code: None,
            approved_by: None,
            approved_date: None,
            rejection_reason: None,
            vendor_quotes: Vec::new(),
            selected_vendor: None,
            po_number: None,
            expected_delivery: None,
            actual_delivery: None,
            notes: None,
            timeline: Vec::new(),
            created_at: now,
            updated_at: now,
        };
        request.recompute_totals();
        request
    }

    fn create_with(items: Vec<CreateLineItem>) -> CreateAcquisition {
        CreateAcquisition {
            department: Department::It,
            branch: "HQ".into(),
            justification: "Team growth".into(),
            business_case: "Two new hires".into(),
            items,
            priority: None,
            budget_code: None,
            expected_delivery: None,
            notes: None,
        }
    }

    #[test]
    fn test_create_validates_line_items() {
        assert!(create_with(vec![line(1, 100)]).validate().is_ok());

        let errors = create_with(Vec::new()).validate().unwrap_err();
        assert!(errors.field_errors().contains_key("items"));

        let errors = create_with(vec![line(0, 100)]).validate().unwrap_err();
        assert!(errors.errors().contains_key("items"));
    }

    #[test]
    fn test_line_item_serializes_camel_case() {
        let json = serde_json::to_value(line(2, 50)).unwrap();
        assert_eq!(json["unitPrice"], serde_json::json!(50.0));
        assert_eq!(json["quantity"], 2);
    }

    #[test]
    fn test_total_cost_sums_items() {
        let request = sample_request(vec![line(2, 500), line(1, 300)]);
        assert_eq!(request.items[0].total_price, Decimal::from(1000));
        assert_eq!(request.total_cost, Decimal::from(1300));
    }

    #[test]
    fn test_recompute_after_item_change() {
        let mut request = sample_request(vec![line(2, 500)]);
        request.items[0].quantity = 3;
        request.recompute_totals();
        assert_eq!(request.total_cost, Decimal::from(1500));
    }

    #[test]
    fn test_empty_items_rejected() {
        let data = CreateAcquisition {
            department: Department::Finance,
            branch: "HQ".into(),
            justification: "x".into(),
            business_case: "y".into(),
            items: vec![],
            priority: None,
            budget_code: None,
            expected_delivery: None,
            notes: None,
        };
        assert!(data.validate().is_err());
    }

    #[test]
    fn test_zero_quantity_rejected() {
        let data = CreateAcquisition {
            department: Department::Finance,
            branch: "HQ".into(),
            justification: "x".into(),
            business_case: "y".into(),
            items: vec![line(0, 10)],
            priority: None,
            budget_code: None,
            expected_delivery: None,
            notes: None,
        };
        assert!(data.validate().is_err());
    }
}
