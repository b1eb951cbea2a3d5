use uuid::Uuid;

use super::{Lifecycle, TimelineEntry, TransitionContext};
use crate::models::{enums::MaintenanceStatus, MaintenanceRequest};

use MaintenanceStatus::*;

impl Lifecycle for MaintenanceRequest {
    type Status = MaintenanceStatus;
    type Effect = ();

    const ENTITY: &'static str = "Maintenance request";
    const TRANSITIONS: &'static [(MaintenanceStatus, MaintenanceStatus)] = &[
        (Pending, Approved),
        (Pending, Cancelled),
        (Pending, Rejected),
        (Approved, InProgress),
        (Approved, Cancelled),
        (Approved, Rejected),
        (InProgress, Completed),
    ];

    fn id(&self) -> Uuid {
        self.id
    }

    fn status(&self) -> MaintenanceStatus {
        self.status
    }

    fn set_status(&mut self, status: MaintenanceStatus) {
        self.status = status;
    }

    fn timeline(&self) -> &[TimelineEntry<MaintenanceStatus>] {
        &self.work_log
    }

    fn timeline_mut(&mut self) -> &mut Vec<TimelineEntry<MaintenanceStatus>> {
        &mut self.work_log
    }

    fn fallback_actor(&self) -> Option<Uuid> {
        self.assigned_to.or(Some(self.requested_by))
    }

    fn on_enter(&mut self, next: MaintenanceStatus, ctx: &TransitionContext) -> Option<()> {
        match next {
            Approved => {
                self.approved_by = ctx.actor;
                self.approved_date = Some(ctx.now);
            }
            Completed => {
                self.actual_cost = Some(self.total_cost());
                self.actual_completion = Some(ctx.now);
            }
            Rejected => {
                self.rejection_reason = ctx.reason.clone().or_else(|| ctx.notes.clone());
            }
            _ => {}
        }
        if let Some(hours) = ctx.time_spent {
            self.time_spent += hours;
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::maintenance::tests::sample_request;
    use crate::workflow::{transition, TransitionError};
    use chrono::Duration;
    use rust_decimal::Decimal;

    #[test]
    fn test_happy_path() {
        let mut request = sample_request();
        let manager = Uuid::new_v4();
        let technician = Uuid::new_v4();

        transition(&mut request, Approved, &TransitionContext::by(manager)).unwrap();
        assert_eq!(request.approved_by, Some(manager));
        assert!(request.approved_date.is_some());

        transition(&mut request, InProgress, &TransitionContext::by(technician)).unwrap();

        request.labor_cost = Decimal::new(150, 0);
        request.parts_cost = Decimal::new(4999, 2);
        let done = TransitionContext::by(technician).with_time_spent(Some(2.5));
        transition(&mut request, Completed, &done).unwrap();

        assert_eq!(request.status, Completed);
        assert_eq!(request.actual_cost, Some(Decimal::new(19999, 2)));
        assert_eq!(request.actual_completion, Some(done.now));
        assert_eq!(request.time_spent, 2.5);
        assert_eq!(request.work_log.len(), 3);
        assert_eq!(request.work_log[2].status, Some(Completed));
        assert_eq!(request.work_log[2].performed_by, Some(technician));
        assert_eq!(request.work_log[2].time_spent, Some(2.5));
    }

    #[test]
    fn test_cannot_skip_approval() {
        let mut request = sample_request();
        let err = transition(&mut request, Completed, &TransitionContext::by(Uuid::new_v4()))
            .unwrap_err();
        assert!(matches!(err, TransitionError::Illegal { .. }));
        assert_eq!(request.status, Pending);
        assert!(request.work_log.is_empty());
        assert!(request.actual_cost.is_none());
    }

    #[test]
    fn test_completed_is_terminal() {
        let mut request = sample_request();
        request.status = Completed;
        for next in MaintenanceStatus::ALL.iter().copied() {
            assert!(!request.can_transition(next));
        }
    }

    #[test]
    fn test_rejection_keeps_reason() {
        let mut request = sample_request();
        let ctx = TransitionContext::by(Uuid::new_v4()).with_reason(Some("Out of warranty".into()));
        transition(&mut request, Rejected, &ctx).unwrap();
        assert_eq!(request.rejection_reason.as_deref(), Some("Out of warranty"));
    }

    #[test]
    fn test_system_transition_falls_back_to_assignee_then_requester() {
        let mut request = sample_request();
        transition(&mut request, Cancelled, &TransitionContext::system()).unwrap();
        assert_eq!(request.work_log[0].performed_by, Some(request.requested_by));

        let mut assigned = sample_request();
        let technician = Uuid::new_v4();
        assigned.assigned_to = Some(technician);
        transition(&mut assigned, Approved, &TransitionContext::system()).unwrap();
        assert_eq!(assigned.work_log[0].performed_by, Some(technician));
    }

    #[test]
    fn test_timestamps_never_decrease() {
        let mut request = sample_request();
        let actor = Uuid::new_v4();
        transition(&mut request, Approved, &TransitionContext::by(actor)).unwrap();

        let mut stale = TransitionContext::by(actor);
        stale.now = stale.now - Duration::hours(1);
        transition(&mut request, InProgress, &stale).unwrap();

        assert!(request.work_log[1].timestamp >= request.work_log[0].timestamp);
    }
}
