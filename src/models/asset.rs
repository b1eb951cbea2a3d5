//! Asset model

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::collections::BTreeMap;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use super::{
    deserialize_some,
    enums::{AssetCategory, AssetCondition, AssetStatus},
};
use crate::{
    depreciation::DepreciationResult,
    workflow::TimelineEntry,
};

/// Asset record
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Asset {
    pub id: Uuid,
    pub serial_number: String,
    pub name: String,
    pub category: AssetCategory,
    pub status: AssetStatus,
    pub condition: AssetCondition,
    pub branch: String,
    pub location: String,
    pub assigned_to: Option<Uuid>,
    pub purchase_date: DateTime<Utc>,
    pub purchase_price: Decimal,
    /// Book value as last entered; not kept in sync with the depreciation figures
    pub current_value: Decimal,
    pub vendor: String,
    pub warranty: Option<String>,
    pub warranty_expiry: Option<DateTime<Utc>>,
    pub description: Option<String>,
    /// `ASSET-<serial>-<millis>`
    pub qr_code_identifier: String,
    pub last_audit_date: Option<DateTime<Utc>>,
    pub next_audit_date: Option<DateTime<Utc>>,
    #[sqlx(json)]
    pub tags: Vec<String>,
    #[sqlx(json)]
    pub custom_fields: BTreeMap<String, String>,
    #[sqlx(json)]
    #[schema(value_type = Vec<AssetTimelineEntry>)]
    pub timeline: Vec<TimelineEntry<AssetStatus>>,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Asset {
    pub fn qr_identifier(serial_number: &str, now: DateTime<Utc>) -> String {
        format!("ASSET-{}-{}", serial_number, now.timestamp_millis())
    }
}

/// Asset together with its computed depreciation
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AssetView {
    #[serde(flatten)]
    pub asset: Asset,
    pub depreciation: DepreciationResult,
}

/// Asset query parameters
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AssetQuery {
    /// Matches name, serial number or description
    pub search: Option<String>,
    pub category: Option<AssetCategory>,
    pub status: Option<AssetStatus>,
    pub branch: Option<String>,
    pub assigned_to: Option<Uuid>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

/// Create asset request
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateAsset {
    #[validate(length(min = 1, max = 200, message = "Name is required"))]
    pub name: String,
    #[validate(length(min = 1, max = 100, message = "Serial number is required"))]
    pub serial_number: String,
    pub category: AssetCategory,
    pub status: Option<AssetStatus>,
    pub condition: Option<AssetCondition>,
    #[validate(length(min = 1, message = "Branch is required"))]
    pub branch: String,
    #[validate(length(min = 1, message = "Location is required"))]
    pub location: String,
    pub assigned_to: Option<Uuid>,
    pub purchase_date: DateTime<Utc>,
    pub purchase_price: Decimal,
    /// Defaults to the purchase price
    pub current_value: Option<Decimal>,
    #[validate(length(min = 1, message = "Vendor is required"))]
    pub vendor: String,
    pub warranty: Option<String>,
    pub warranty_expiry: Option<DateTime<Utc>>,
    pub description: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub custom_fields: BTreeMap<String, String>,
}

/// Update asset request; only these fields can change after creation
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAsset {
    #[validate(length(min = 1, max = 200, message = "Name cannot be empty"))]
    pub name: Option<String>,
    pub category: Option<AssetCategory>,
    pub status: Option<AssetStatus>,
    pub condition: Option<AssetCondition>,
    #[validate(length(min = 1, message = "Location cannot be empty"))]
    pub location: Option<String>,
    pub current_value: Option<Decimal>,
    /// `null` unassigns the asset
    #[serde(default, deserialize_with = "deserialize_some")]
    #[schema(value_type = Option<Uuid>)]
    pub assigned_to: Option<Option<Uuid>>,
    pub description: Option<String>,
    pub warranty: Option<String>,
    pub warranty_expiry: Option<DateTime<Utc>>,
    pub vendor: Option<String>,
    /// Recorded on the timeline when the status changes
    pub notes: Option<String>,
}

/// Record an audit of the asset
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecordAudit {
    pub condition: Option<AssetCondition>,
    pub notes: Option<String>,
}

/// QR identifier lookup response
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AssetQrCode {
    pub asset_id: Uuid,
    pub serial_number: String,
    pub qr_code_identifier: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_qr_identifier_format() {
        let now = Utc.timestamp_millis_opt(1_700_000_000_123).unwrap();
        assert_eq!(Asset::qr_identifier("SN-42", now), "ASSET-SN-42-1700000000123");
    }

    #[test]
    fn test_update_ignores_fields_outside_allow_list() {
        let update: UpdateAsset = serde_json::from_str(
            r#"{"name": "New", "serialNumber": "HACK", "purchasePrice": 1, "assignedTo": null}"#,
        )
        .unwrap();
        assert_eq!(update.name.as_deref(), Some("New"));
        assert_eq!(update.assigned_to, Some(None));
    }
}
