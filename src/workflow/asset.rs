use uuid::Uuid;

use super::{Lifecycle, TimelineEntry, TransitionContext};
use crate::models::{enums::AssetStatus, Asset};

use AssetStatus::*;

impl Lifecycle for Asset {
    type Status = AssetStatus;
    type Effect = ();

    const ENTITY: &'static str = "Asset";
    const TRANSITIONS: &'static [(AssetStatus, AssetStatus)] = &[
        (Active, Inactive),
        (Active, UnderMaintenance),
        (Active, Retired),
        (Inactive, Active),
        (Inactive, UnderMaintenance),
        (Inactive, Retired),
        (UnderMaintenance, Active),
        (UnderMaintenance, Inactive),
        (UnderMaintenance, Retired),
    ];

    fn id(&self) -> Uuid {
        self.id
    }

    fn status(&self) -> AssetStatus {
        self.status
    }

    fn set_status(&mut self, status: AssetStatus) {
        self.status = status;
    }

    fn timeline(&self) -> &[TimelineEntry<AssetStatus>] {
        &self.timeline
    }

    fn timeline_mut(&mut self) -> &mut Vec<TimelineEntry<AssetStatus>> {
        &mut self.timeline
    }

    fn fallback_actor(&self) -> Option<Uuid> {
        self.assigned_to
    }

    fn on_enter(&mut self, _next: AssetStatus, _ctx: &TransitionContext) -> Option<()> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        models::enums::{AssetCategory, AssetCondition},
        workflow::{record, transition},
    };
    use chrono::Utc;
    use rust_decimal::Decimal;
    use std::collections::BTreeMap;

    fn sample() -> Asset {
        let now = Utc::now();
        Asset {
            id: Uuid::new_v4(),
            serial_number: "SN-1".into(),
            name: "ThinkPad".into(),
            category: AssetCategory::Laptop,
            status: Active,
            condition: AssetCondition::Good,
            branch: "HQ".into(),
            location: "Floor 2".into(),
            assigned_to: None,
            purchase_date: now,
            purchase_price: Decimal::from(1000),
            current_value: Decimal::from(1000),
            vendor: "Lenovo".into(),
            warranty: None,
            warranty_expiry: None,
            description: None,
            qr_code_identifier: Asset::qr_identifier("SN-1", now),
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

    #[test]
    fn test_retired_is_terminal() {
        let mut asset = sample();
        transition(&mut asset, Retired, &TransitionContext::by(Uuid::new_v4())).unwrap();
        for next in AssetStatus::ALL.iter().copied() {
            assert!(!asset.can_transition(next));
        }
    }

    #[test]
    fn test_every_status_can_retire() {
        for status in [Active, Inactive, UnderMaintenance] {
            let mut asset = sample();
            asset.status = status;
            assert!(asset.can_transition(Retired));
        }
    }

    #[test]
    fn test_same_status_is_not_a_transition() {
        let asset = sample();
        assert!(!asset.can_transition(Active));
    }

    #[test]
    fn test_fallback_actor_is_assignee() {
        let mut asset = sample();
        let holder = Uuid::new_v4();
        asset.assigned_to = Some(holder);
        transition(&mut asset, UnderMaintenance, &TransitionContext::system()).unwrap();
        assert_eq!(asset.timeline[0].performed_by, Some(holder));
        assert_eq!(asset.timeline[0].description, "Asset moved from Active to Under Maintenance");
    }

    #[test]
    fn test_record_keeps_status() {
        let mut asset = sample();
        record(&mut asset, "Audited", "Condition Good", &TransitionContext::system());
        assert_eq!(asset.status, Active);
        assert_eq!(asset.timeline.len(), 1);
        assert_eq!(asset.timeline[0].status, None);
    }
}
