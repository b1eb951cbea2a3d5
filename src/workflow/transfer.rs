use uuid::Uuid;

use super::{Lifecycle, TimelineEntry, TransitionContext};
use crate::models::{
    enums::{TransferStatus, TransferType},
    TransferRequest,
};

use TransferStatus::*;

/// Change to the transferred asset, applied in the same transaction as the completion
#[derive(Debug, Clone, PartialEq)]
pub enum AssetEffect {
    Assign(Uuid),
    Branch(String),
    Location(String),
}

impl TransferRequest {
    fn destination(&self) -> Option<AssetEffect> {
        match self.transfer_type {
            TransferType::User => self.to_user.map(AssetEffect::Assign),
            TransferType::Branch => self.to_branch.clone().map(AssetEffect::Branch),
            TransferType::Location => self.to_location.clone().map(AssetEffect::Location),
        }
    }
}

impl Lifecycle for TransferRequest {
    type Status = TransferStatus;
    type Effect = AssetEffect;

    const ENTITY: &'static str = "Transfer request";
    const TRANSITIONS: &'static [(TransferStatus, TransferStatus)] = &[
        (Pending, Approved),
        (Pending, Rejected),
        (Approved, InTransit),
        (Approved, Completed),
        (InTransit, Completed),
    ];

    fn id(&self) -> Uuid {
        self.id
    }

    fn status(&self) -> TransferStatus {
        self.status
    }

    fn set_status(&mut self, status: TransferStatus) {
        self.status = status;
    }

    fn timeline(&self) -> &[TimelineEntry<TransferStatus>] {
        &self.timeline
    }

    fn timeline_mut(&mut self) -> &mut Vec<TimelineEntry<TransferStatus>> {
        &mut self.timeline
    }

    fn fallback_actor(&self) -> Option<Uuid> {
        self.approved_by.or(Some(self.requested_by))
    }

    fn on_enter(&mut self, next: TransferStatus, ctx: &TransitionContext) -> Option<AssetEffect> {
        match next {
            Approved => {
                self.approved_by = ctx.actor;
                self.approved_date = Some(ctx.now);
                None
            }
            Rejected => {
                self.rejection_reason = ctx.reason.clone().or_else(|| ctx.notes.clone());
                None
            }
            Completed => {
                self.completed_date = Some(ctx.now);
                if self.actual_delivery.is_none() {
                    self.actual_delivery = Some(ctx.now);
                }
                self.destination()
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflow::transition;
    use chrono::Utc;
    use rust_decimal::Decimal;

    fn sample(transfer_type: TransferType) -> TransferRequest {
        let now = Utc::now();
        TransferRequest {
            id: Uuid::new_v4(),
            transfer_number: "TRF-TEST01".into(),
            asset_id: Uuid::new_v4(),
            transfer_type,
            from_user: None,
            to_user: None,
            from_branch: None,
            to_branch: None,
            from_location: None,
            to_location: None,
            reason: "Reorg".into(),
            requested_by: Uuid::new_v4(),
            approved_by: None,
            approved_date: None,
            completed_date: None,
            status: Pending,
            priority: Default::default(),
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
    fn test_user_transfer_completion_assigns_asset() {
        let target = Uuid::new_v4();
        let mut transfer = sample(TransferType::User);
        transfer.to_user = Some(target);
        let manager = Uuid::new_v4();

        assert_eq!(transition(&mut transfer, Approved, &TransitionContext::by(manager)), Ok(None));
        transition(&mut transfer, InTransit, &TransitionContext::by(manager)).unwrap();
        let effect = transition(&mut transfer, Completed, &TransitionContext::by(manager)).unwrap();

        assert_eq!(effect, Some(AssetEffect::Assign(target)));
        assert!(transfer.completed_date.is_some());
        assert!(transfer.actual_delivery.is_some());
        assert_eq!(transfer.timeline.len(), 3);
    }

    #[test]
    fn test_direct_completion_from_approved() {
        let mut transfer = sample(TransferType::Branch);
        transfer.to_branch = Some("North".into());
        transfer.status = Approved;
        let effect = transition(&mut transfer, Completed, &TransitionContext::by(Uuid::new_v4()))
            .unwrap();
        assert_eq!(effect, Some(AssetEffect::Branch("North".into())));
    }

    #[test]
    fn test_second_completion_fails() {
        let mut transfer = sample(TransferType::Location);
        transfer.to_location = Some("Floor 3".into());
        transfer.status = Approved;
        let actor = TransitionContext::by(Uuid::new_v4());
        transition(&mut transfer, Completed, &actor).unwrap();
        assert!(transition(&mut transfer, Completed, &actor).is_err());
        assert_eq!(transfer.timeline.len(), 1);
    }

    #[test]
    fn test_reject_only_while_pending() {
        let mut transfer = sample(TransferType::User);
        transfer.status = InTransit;
        let ctx = TransitionContext::by(Uuid::new_v4()).with_reason(Some("No".into()));
        assert!(transition(&mut transfer, Rejected, &ctx).is_err());
        assert!(transfer.rejection_reason.is_none());

        transfer.status = Pending;
        transition(&mut transfer, Rejected, &ctx).unwrap();
        assert_eq!(transfer.rejection_reason.as_deref(), Some("No"));
    }

    #[test]
    fn test_fallback_actor_prefers_approver() {
        let mut transfer = sample(TransferType::User);
        transfer.to_user = Some(Uuid::new_v4());
        transition(&mut transfer, Approved, &TransitionContext::system()).unwrap();
        assert_eq!(transfer.timeline[0].performed_by, Some(transfer.requested_by));

        let approver = Uuid::new_v4();
        transfer.approved_by = Some(approver);
        transition(&mut transfer, Completed, &TransitionContext::system()).unwrap();
        assert_eq!(transfer.timeline[1].performed_by, Some(approver));
    }
}
