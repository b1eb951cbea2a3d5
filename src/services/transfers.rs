//! Asset transfer service

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::{
        analytics::{DateRange, TransferAnalytics},
        enums::{Capability, Priority, TransferStatus},
        page_bounds,
        transfer::{
            CompleteTransfer, CreateTransfer, DispatchTransfer, RejectTransfer, TransferDecision,
            TransferQuery, TransferRequest, TransferView,
        },
        user::UserClaims,
        Asset,
    },
    repository::Repository,
    workflow::{self, transfer::AssetEffect, Lifecycle, TransitionContext},
};

#[derive(Clone)]
pub struct TransfersService {
    repository: Repository,
}

fn ensure_visible(claims: &UserClaims, transfer: &TransferRequest) -> AppResult<()> {
    if !claims.scoped_to_self() || transfer.participants().contains(&Some(claims.user_id)) {
        Ok(())
    } else {
        Err(AppError::Authorization(
            "You are not involved in this transfer".to_string(),
        ))
    }
}

/// Move the asset to the transfer destination and note it on the asset timeline
fn apply_effect(asset: &mut Asset, effect: AssetEffect, transfer: &TransferRequest, ctx: &TransitionContext) {
    let description = match effect {
        AssetEffect::Assign(user) => {
            asset.assigned_to = Some(user);
            format!("Assigned to user {} by transfer {}", user, transfer.transfer_number)
        }
        AssetEffect::Branch(branch) => {
            let description = format!(
                "Moved from branch {} to {} by transfer {}",
                asset.branch, branch, transfer.transfer_number
            );
            asset.branch = branch;
            description
        }
        AssetEffect::Location(location) => {
            let description = format!(
                "Moved from {} to {} by transfer {}",
                asset.location, location, transfer.transfer_number
            );
            asset.location = location;
            description
        }
    };
    workflow::record(asset, "Asset transferred", description, ctx);
}

/// Overwrite shipping details only with the values the caller supplied
fn apply_schedule(
    transfer: &mut TransferRequest,
    tracking_number: Option<String>,
    estimated_delivery: Option<DateTime<Utc>>,
) {
    if tracking_number.is_some() {
        transfer.tracking_number = tracking_number;
    }
    if estimated_delivery.is_some() {
        transfer.estimated_delivery = estimated_delivery;
    }
}

impl TransfersService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn search(
        &self,
        claims: &UserClaims,
        query: &TransferQuery,
    ) -> AppResult<(Vec<TransferView>, i64, i64, i64)> {
        let (page, limit, offset) = page_bounds(query.page, query.limit);
        let participant = claims.scoped_to_self().then_some(claims.user_id);
        let (transfers, total) = self
            .repository
            .transfers
            .search(query, participant, limit, offset)
            .await?;
        Ok((transfers.into_iter().map(Into::into).collect(), total, page, limit))
    }

    pub async fn get(&self, claims: &UserClaims, id: Uuid) -> AppResult<TransferView> {
        let transfer = self.repository.transfers.get_by_id(id).await?;
        ensure_visible(claims, &transfer)?;
        Ok(transfer.into())
    }

    /// Open a transfer; the origin defaults to where the asset is now
    pub async fn create(&self, claims: &UserClaims, data: CreateTransfer) -> AppResult<TransferRequest> {
        data.validate()?;
        data.check_destination().map_err(AppError::Validation)?;
        if data.transfer_cost.map(|c| c < Decimal::ZERO).unwrap_or(false) {
            return Err(AppError::Validation("transferCost cannot be negative".to_string()));
        }

        let asset = self.repository.assets.get_by_id(data.asset_id).await?;
        if let Some(user) = data.to_user {
            if !self.repository.users.exists(user).await? {
                return Err(AppError::NotFound(format!("User with id {} not found", user)));
            }
        }

        // Only approvers may skip approval
        let requires_approval =
            data.requires_approval.unwrap_or(true) || !claims.has(Capability::ApproveTransfers);

        let now = Utc::now();
        let mut transfer = TransferRequest {
            id: Uuid::new_v4(),
            transfer_number: workflow::reference_number("TRF"),
            asset_id: asset.id,
            transfer_type: data.transfer_type,
            from_user: data.from_user.or(asset.assigned_to),
            to_user: data.to_user,
            from_branch: data.from_branch.or_else(|| Some(asset.branch.clone())),
            to_branch: data.to_branch,
            from_location: data.from_location.or_else(|| Some(asset.location.clone())),
            to_location: data.to_location,
            reason: data.reason,
            requested_by: claims.user_id,
            approved_by: None,
            approved_date: None,
            completed_date: None,
            status: TransferStatus::Pending,
            priority: data.priority.unwrap_or(Priority::Medium),
            notes: data.notes,
            estimated_delivery: data.estimated_delivery,
            actual_delivery: None,
            tracking_number: None,
            transfer_cost: data.transfer_cost.unwrap_or(Decimal::ZERO),
            requires_approval,
            rejection_reason: None,
            timeline: Vec::new(),
            created_at: now,
            updated_at: now,
        };

        let ctx = TransitionContext::by(claims.user_id);
        let description = format!("{} transfer of {} requested", transfer.transfer_type, asset.name);
        workflow::record(&mut transfer, "Transfer requested", description, &ctx);
        if !requires_approval {
            let ctx = ctx.with_action("Approval not required");
            workflow::transition(&mut transfer, TransferStatus::Approved, &ctx)?;
        }

        let created = self.repository.transfers.create(&transfer).await?;
        tracing::info!(
            transfer_id = %created.id,
            number = %created.transfer_number,
            asset_id = %created.asset_id,
            "transfer requested"
        );
        Ok(created)
    }

    async fn advance(
        &self,
        id: Uuid,
        next: TransferStatus,
        ctx: TransitionContext,
        prepare: impl FnOnce(&mut TransferRequest),
    ) -> AppResult<TransferRequest> {
        let mut tx = self.repository.pool.begin().await?;
        let mut transfer = self.repository.transfers.get_for_update(&mut *tx, id).await?;
        transfer.ensure_transition(next)?;
        prepare(&mut transfer);
        workflow::transition(&mut transfer, next, &ctx)?;
        let saved = self.repository.transfers.save(&mut *tx, &transfer).await?;
        tx.commit().await?;
        Ok(saved)
    }

    pub async fn approve(&self, claims: &UserClaims, id: Uuid, data: TransferDecision) -> AppResult<TransferRequest> {
        claims.require(Capability::ApproveTransfers)?;
        let estimated_delivery = data.estimated_delivery;
        let ctx = TransitionContext::by(claims.user_id).with_notes(data.notes);
        self.advance(id, TransferStatus::Approved, ctx, |transfer| {
            apply_schedule(transfer, None, estimated_delivery)
        })
        .await
    }

    pub async fn reject(&self, claims: &UserClaims, id: Uuid, data: RejectTransfer) -> AppResult<TransferRequest> {
        claims.require(Capability::ApproveTransfers)?;
        data.validate()?;
        let ctx = TransitionContext::by(claims.user_id)
            .with_reason(Some(data.reason.clone()))
            .with_notes(Some(data.reason));
        self.advance(id, TransferStatus::Rejected, ctx, |_| {}).await
    }

    pub async fn dispatch(&self, claims: &UserClaims, id: Uuid, data: DispatchTransfer) -> AppResult<TransferRequest> {
        claims.require(Capability::ApproveTransfers)?;
        let ctx = TransitionContext::by(claims.user_id).with_notes(data.notes);
        self.advance(id, TransferStatus::InTransit, ctx, |transfer| {
            apply_schedule(transfer, data.tracking_number, data.estimated_delivery)
        })
        .await
    }

    /// Complete the transfer and update the asset in the same transaction
    pub async fn complete(&self, claims: &UserClaims, id: Uuid, data: CompleteTransfer) -> AppResult<TransferRequest> {
        if data.actual_cost.map(|c| c < Decimal::ZERO).unwrap_or(false) {
            return Err(AppError::Validation("actualCost cannot be negative".to_string()));
        }

        let mut tx = self.repository.pool.begin().await?;
        let mut transfer = self.repository.transfers.get_for_update(&mut *tx, id).await?;
        let receiving = transfer.to_user == Some(claims.user_id);
        if !receiving && !claims.has(Capability::ApproveTransfers) {
            return Err(AppError::Authorization(
                "Only approvers or the receiving user can complete a transfer".to_string(),
            ));
        }

        if let Some(delivered) = data.actual_delivery {
            transfer.actual_delivery = Some(delivered);
        }
        if let Some(cost) = data.actual_cost {
            transfer.transfer_cost = cost;
        }

        let ctx = TransitionContext::by(claims.user_id).with_notes(data.notes);
        let effect = workflow::transition(&mut transfer, TransferStatus::Completed, &ctx)?;

        if let Some(effect) = effect {
            let mut asset = self
                .repository
                .assets
                .get_for_update(&mut *tx, transfer.asset_id)
                .await?;
            apply_effect(&mut asset, effect, &transfer, &ctx);
            self.repository.assets.save(&mut *tx, &asset).await?;
        }

        let saved = self.repository.transfers.save(&mut *tx, &transfer).await?;
        tx.commit().await?;

        tracing::info!(transfer_id = %saved.id, asset_id = %saved.asset_id, "transfer completed");
        Ok(saved)
    }

    pub async fn analytics(&self, range: DateRange) -> AppResult<TransferAnalytics> {
        let analytics = &self.repository.analytics;
        Ok(TransferAnalytics {
            stats: analytics.transfer_status_stats(range).await?,
            trends: analytics.transfer_monthly(range).await?,
            type_distribution: analytics.transfer_types(range).await?,
            date_range: range,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::enums::{AssetCategory, AssetCondition, AssetStatus, TransferType};
    use std::collections::BTreeMap;

    fn asset() -> Asset {
        let now = Utc::now();
        Asset {
            id: Uuid::new_v4(),
            serial_number: "SN-9".into(),
            name: "Monitor".into(),
            category: AssetCategory::Monitor,
            status: AssetStatus::Active,
            condition: AssetCondition::Good,
            branch: "South".into(),
            location: "Floor 1".into(),
            assigned_to: None,
            purchase_date: now,
            purchase_price: Decimal::from(300),
            current_value: Decimal::from(300),
            vendor: "LG".into(),
            warranty: None,
            warranty_expiry: None,
            description: None,
            qr_code_identifier: "ASSET-SN-9-0".into(),
            last_audit_date: None,
            next_audit_date: None,
            tags: Vec::new(),
            custom_fields: BTreeMap::new(),
            timeline: Vec::new(),
            created_by: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn transfer(transfer_type: TransferType) -> TransferRequest {
        let now = Utc::now();
        TransferRequest {
            id: Uuid::new_v4(),
            transfer_number: "TRF-ABC123".into(),
            asset_id: Uuid::new_v4(),
            transfer_type,
            from_user: None,
            to_user: None,
            from_branch: None,
            to_branch: None,
            from_location: None,
            to_location: None,
            reason: "Move".into(),
            requested_by: Uuid::new_v4(),
            approved_by: None,
            approved_date: None,
            completed_date: None,
            status: TransferStatus::Approved,
            priority: Priority::Medium,
            notes: None,
            estimated_delivery: None,
            actual_delivery: None,
            tracking_number: None,
            transfer_cost: Decimal::ZERO,
            requires_approval: true,
            rejection_reason: None,
            timeline: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_user_transfer_assigns_asset() {
        let mut asset = asset();
        let receiver = Uuid::new_v4();
        let mut request = transfer(TransferType::User);
        request.to_user = Some(receiver);
        let ctx = TransitionContext::by(Uuid::new_v4());

        let effect = workflow::transition(&mut request, TransferStatus::Completed, &ctx)
            .unwrap()
            .unwrap();
        apply_effect(&mut asset, effect, &request, &ctx);

        assert_eq!(asset.assigned_to, Some(receiver));
        assert_eq!(asset.timeline.len(), 1);
        assert_eq!(asset.timeline[0].action, "Asset transferred");
        assert_eq!(asset.timeline[0].status, None);
    }

    #[test]
    fn test_schedule_keeps_existing_values_when_absent() {
        let mut request = transfer(TransferType::Branch);
        let eta = Utc::now() + chrono::Duration::days(3);
        apply_schedule(&mut request, None, Some(eta));
        assert_eq!(request.estimated_delivery, Some(eta));
        assert!(request.tracking_number.is_none());

        apply_schedule(&mut request, Some("TRK-1".into()), None);
        assert_eq!(request.estimated_delivery, Some(eta));
        assert_eq!(request.tracking_number.as_deref(), Some("TRK-1"));
    }

    #[test]
    fn test_branch_transfer_moves_asset() {
        let mut asset = asset();
        let mut request = transfer(TransferType::Branch);
        request.to_branch = Some("North".into());
        let ctx = TransitionContext::by(Uuid::new_v4());

        let effect = workflow::transition(&mut request, TransferStatus::Completed, &ctx)
            .unwrap()
            .unwrap();
        apply_effect(&mut asset, effect, &request, &ctx);

        assert_eq!(asset.branch, "North");
        assert!(asset.timeline[0].description.contains("South"));
    }
}
