//! Transfer request model

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use super::enums::{Priority, TransferStatus, TransferType};
use crate::workflow::TimelineEntry;

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TransferRequest {
    pub id: Uuid,
    /// `TRF-XXXXXX`
    pub transfer_number: String,
    pub asset_id: Uuid,
    pub transfer_type: TransferType,
    pub from_user: Option<Uuid>,
    pub to_user: Option<Uuid>,
    pub from_branch: Option<String>,
    pub to_branch: Option<String>,
    pub from_location: Option<String>,
    pub to_location: Option<String>,
    pub reason: String,
    pub requested_by: Uuid,
    pub approved_by: Option<Uuid>,
    pub approved_date: Option<DateTime<Utc>>,
    pub completed_date: Option<DateTime<Utc>>,
    pub status: TransferStatus,
    pub priority: Priority,
    pub notes: Option<String>,
    pub estimated_delivery: Option<DateTime<Utc>>,
    pub actual_delivery: Option<DateTime<Utc>>,
    pub tracking_number: Option<String>,
    pub transfer_cost: Decimal,
    pub requires_approval: bool,
    pub rejection_reason: Option<String>,
    #[sqlx(json)]
    #[schema(value_type = Vec<TransferTimelineEntry>)]
    pub timeline: Vec<TimelineEntry<TransferStatus>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TransferRequest {
    /// Whole days from creation to completion, rounded up
    pub fn duration_days(&self) -> Option<i64> {
        self.completed_date.map(|done| {
            let elapsed = done - self.created_at;
            let days = elapsed.num_days();
            if elapsed > Duration::days(days) {
                days + 1
            } else {
                days
            }
        })
    }

    pub fn participants(&self) -> [Option<Uuid>; 4] {
        [
            Some(self.requested_by),
            self.from_user,
            self.to_user,
            self.approved_by,
        ]
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TransferView {
    #[serde(flatten)]
    pub transfer: TransferRequest,
    pub duration_days: Option<i64>,
}

impl From<TransferRequest> for TransferView {
    fn from(transfer: TransferRequest) -> Self {
        Self {
            duration_days: transfer.duration_days(),
            transfer,
        }
    }
}

#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TransferQuery {
    pub status: Option<TransferStatus>,
    pub priority: Option<Priority>,
    pub transfer_type: Option<TransferType>,
    pub asset_id: Option<Uuid>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

/// Create transfer request
///
/// The "from" side defaults to the asset's current assignment, branch or location.
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateTransfer {
    pub asset_id: Uuid,
    pub transfer_type: TransferType,
    pub from_user: Option<Uuid>,
    pub to_user: Option<Uuid>,
    pub from_branch: Option<String>,
    pub to_branch: Option<String>,
    pub from_location: Option<String>,
    pub to_location: Option<String>,
    #[validate(length(min = 1, max = 1000, message = "Reason is required"))]
    pub reason: String,
    pub priority: Option<Priority>,
    pub notes: Option<String>,
    pub estimated_delivery: Option<DateTime<Utc>>,
    pub transfer_cost: Option<Decimal>,
    pub requires_approval: Option<bool>,
}

impl CreateTransfer {
    /// Type-specific required fields
    pub fn check_destination(&self) -> Result<(), String> {
        let present = |v: &Option<String>| v.as_deref().map(|s| !s.trim().is_empty()).unwrap_or(false);
        match self.transfer_type {
            TransferType::User if self.to_user.is_none() => {
                Err("toUser is required for user transfers".to_string())
            }
            TransferType::Branch if !present(&self.from_branch) || !present(&self.to_branch) => {
                Err("fromBranch and toBranch are required for branch transfers".to_string())
            }
            TransferType::Location
                if !present(&self.from_location) || !present(&self.to_location) =>
            {
                Err("fromLocation and toLocation are required for location transfers".to_string())
            }
            _ => Ok(()),
        }
    }
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TransferDecision {
    pub notes: Option<String>,
    pub estimated_delivery: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RejectTransfer {
    #[validate(length(min = 1, max = 1000, message = "A rejection reason is required"))]
    pub reason: String,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DispatchTransfer {
    pub tracking_number: Option<String>,
    pub estimated_delivery: Option<DateTime<Utc>>,
    pub notes: Option<String>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CompleteTransfer {
    pub actual_delivery: Option<DateTime<Utc>>,
    pub actual_cost: Option<Decimal>,
    pub notes: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create(transfer_type: TransferType) -> CreateTransfer {
        CreateTransfer {
            asset_id: Uuid::new_v4(),
            transfer_type,
            from_user: None,
            to_user: None,
            from_branch: None,
            to_branch: None,
            from_location: None,
            to_location: None,
            reason: "Reorg".into(),
            priority: None,
            notes: None,
            estimated_delivery: None,
            transfer_cost: None,
            requires_approval: None,
        }
    }

    #[test]
    fn test_destination_rules() {
        let mut user = create(TransferType::User);
        assert!(user.check_destination().is_err());
        user.to_user = Some(Uuid::new_v4());
        assert!(user.check_destination().is_ok());

        let mut branch = create(TransferType::Branch);
        branch.to_branch = Some("North".into());
        assert!(branch.check_destination().is_err());
        branch.from_branch = Some("South".into());
        assert!(branch.check_destination().is_ok());

        let mut location = create(TransferType::Location);
        location.from_location = Some("Floor 1".into());
        location.to_location = Some("   ".into());
        assert!(location.check_destination().is_err());
    }
}
