use uuid::Uuid;

use super::{record, transition, Lifecycle, TimelineEntry, TransitionContext, TransitionError};
use crate::models::{enums::AcquisitionStatus, AcquisitionRequest};

use AcquisitionStatus::*;

impl Lifecycle for AcquisitionRequest {
    type Status = AcquisitionStatus;
    type Effect = ();

    const ENTITY: &'static str = "Acquisition request";
    const TRANSITIONS: &'static [(AcquisitionStatus, AcquisitionStatus)] = &[
        (Draft, Submitted),
        (Draft, Rejected),
        (Submitted, UnderReview),
        (Submitted, Approved),
        (Submitted, Rejected),
        (UnderReview, Approved),
        (UnderReview, Rejected),
        (Approved, Ordered),
        (Ordered, Delivered),
        (Delivered, Completed),
    ];

    fn id(&self) -> Uuid {
        self.id
    }

    fn status(&self) -> AcquisitionStatus {
        self.status
    }

    fn set_status(&mut self, status: AcquisitionStatus) {
        self.status = status;
    }

    fn timeline(&self) -> &[TimelineEntry<AcquisitionStatus>] {
        &self.timeline
    }

    fn timeline_mut(&mut self) -> &mut Vec<TimelineEntry<AcquisitionStatus>> {
        &mut self.timeline
    }

    fn fallback_actor(&self) -> Option<Uuid> {
        self.approved_by.or(Some(self.requested_by))
    }

    fn on_enter(&mut self, next: AcquisitionStatus, ctx: &TransitionContext) -> Option<()> {
        match next {
            Approved => {
                self.approved_by = ctx.actor;
                self.approved_date = Some(ctx.now);
            }
            Rejected => {
                self.rejection_reason = ctx.reason.clone().or_else(|| ctx.notes.clone());
            }
            Delivered => {
                if self.actual_delivery.is_none() {
                    self.actual_delivery = Some(ctx.now);
                }
            }
            _ => {}
        }
        None
    }
}

/// Mark one quote as the chosen vendor.
///
/// An approved request moves to `ordered`. An ordered request may switch to
/// another quote, which is logged without a status change. Legality and the
/// quote id are both checked before anything changes.
pub fn select_vendor(
    request: &mut AcquisitionRequest,
    quote_id: Uuid,
    po_number: Option<String>,
    ctx: &TransitionContext,
) -> Result<(), TransitionError> {
    let reselect = request.status == Ordered;
    if !reselect {
        request.ensure_transition(Ordered)?;
    }
    let vendor_name = request
        .vendor_quotes
        .iter()
        .find(|q| q.id == quote_id)
        .map(|q| q.vendor_name.clone())
        .ok_or_else(|| TransitionError::Precondition {
            entity: AcquisitionRequest::ENTITY,
            reason: format!("Vendor quote {} not found", quote_id),
        })?;

    for quote in &mut request.vendor_quotes {
        quote.selected = quote.id == quote_id;
    }
    let previous = request.selected_vendor.replace(vendor_name.clone());
    if po_number.is_some() {
        request.po_number = po_number;
    }

    if reselect {
        let description = match previous {
            Some(previous) => format!("Vendor changed from {} to {}", previous, vendor_name),
            None => format!("Vendor set to {}", vendor_name),
        };
        record(request, format!("Vendor changed: {}", vendor_name), description, ctx);
        return Ok(());
    }

    let ctx = ctx
        .clone()
        .with_action(format!("Vendor selected: {}", vendor_name));
    transition(request, Ordered, &ctx)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::acquisition::{
        tests::{line, sample_request},
        VendorQuote,
    };
    use chrono::Utc;
    use rust_decimal::Decimal;

    fn quote(name: &str) -> VendorQuote {
        VendorQuote {
            id: Uuid::new_v4(),
            vendor_name: name.into(),
            vendor_email: None,
            quoted_price: Decimal::from(1200),
            delivery_time: Some("2 weeks".into()),
            warranty: None,
            notes: None,
            quote_date: Utc::now(),
            valid_until: None,
            selected: false,
        }
    }

    #[test]
    fn test_select_vendor_keeps_one_selected() {
        let mut request = sample_request(vec![line(2, 500)]);
        let (a, b) = (quote("Acme"), quote("Globex"));
        let (a_id, b_id) = (a.id, b.id);
        request.vendor_quotes = vec![a, b];
        request.status = Approved;
        let ctx = TransitionContext::by(Uuid::new_v4());

        select_vendor(&mut request, a_id, None, &ctx).unwrap();
        assert_eq!(request.status, Ordered);
        select_vendor(&mut request, b_id, Some("PO-77".into()), &ctx).unwrap();

        let selected: Vec<_> = request.vendor_quotes.iter().filter(|q| q.selected).collect();
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].id, b_id);
        assert_eq!(request.selected_vendor.as_deref(), Some("Globex"));
        assert_eq!(request.po_number.as_deref(), Some("PO-77"));
        assert_eq!(request.status, Ordered);

        let last = request.timeline.last().unwrap();
        assert_eq!(last.action, "Vendor changed: Globex");
        assert_eq!(last.description, "Vendor changed from Acme to Globex");
        assert!(last.status.is_none());
        assert_eq!(request.timeline.len(), 2);
    }

    #[test]
    fn test_reselect_unknown_quote_keeps_previous_choice() {
        let mut request = sample_request(vec![line(1, 100)]);
        let a = quote("Acme");
        let a_id = a.id;
        request.vendor_quotes = vec![a];
        request.status = Approved;
        let ctx = TransitionContext::system();
        select_vendor(&mut request, a_id, Some("PO-1".into()), &ctx).unwrap();

        assert!(select_vendor(&mut request, Uuid::new_v4(), Some("PO-2".into()), &ctx).is_err());
        assert!(request.vendor_quotes[0].selected);
        assert_eq!(request.selected_vendor.as_deref(), Some("Acme"));
        assert_eq!(request.po_number.as_deref(), Some("PO-1"));
        assert_eq!(request.timeline.len(), 1);
    }

    #[test]
    fn test_select_vendor_after_delivery_is_rejected() {
        let mut request = sample_request(vec![line(1, 100)]);
        let q = quote("Acme");
        let id = q.id;
        request.vendor_quotes = vec![q];
        request.status = Delivered;
        assert!(select_vendor(&mut request, id, None, &TransitionContext::system()).is_err());
        assert!(!request.vendor_quotes[0].selected);
    }

    #[test]
    fn test_select_unknown_quote_changes_nothing() {
        let mut request = sample_request(vec![line(1, 100)]);
        request.vendor_quotes = vec![quote("Acme")];
        request.status = Approved;
        let before = request.vendor_quotes.clone();

        let err = select_vendor(&mut request, Uuid::new_v4(), None, &TransitionContext::system())
            .unwrap_err();
        assert!(matches!(err, TransitionError::Precondition { .. }));
        assert_eq!(request.vendor_quotes, before);
        assert_eq!(request.status, Approved);
        assert!(request.timeline.is_empty());
    }

    #[test]
    fn test_select_vendor_requires_approval() {
        let mut request = sample_request(vec![line(1, 100)]);
        let q = quote("Acme");
        let id = q.id;
        request.vendor_quotes = vec![q];
        request.status = UnderReview;
        assert!(select_vendor(&mut request, id, None, &TransitionContext::system()).is_err());
        assert!(!request.vendor_quotes[0].selected);
    }

    #[test]
    fn test_approve_outside_review_is_rejected() {
        let approver = TransitionContext::by(Uuid::new_v4());
        for status in [Draft, Approved, Rejected, Ordered, Delivered, Completed] {
            let mut request = sample_request(vec![line(1, 100)]);
            request.status = status;
            assert!(transition(&mut request, Approved, &approver).is_err());
            assert_eq!(request.status, status);
            assert!(request.timeline.is_empty());
            assert!(request.approved_by.is_none());
        }
    }

    #[test]
    fn test_full_lifecycle() {
        let mut request = sample_request(vec![line(1, 100)]);
        let requester = TransitionContext::by(request.requested_by);
        let manager_id = Uuid::new_v4();
        let manager = TransitionContext::by(manager_id);

        transition(&mut request, Submitted, &requester).unwrap();
        transition(&mut request, UnderReview, &manager).unwrap();
        transition(&mut request, Approved, &manager).unwrap();
        assert_eq!(request.approved_by, Some(manager_id));

        let q = quote("Acme");
        let id = q.id;
        request.vendor_quotes.push(q);
        select_vendor(&mut request, id, None, &manager).unwrap();
        transition(&mut request, Delivered, &manager).unwrap();
        assert!(request.actual_delivery.is_some());
        transition(&mut request, Completed, &manager).unwrap();

        assert_eq!(request.timeline.len(), 6);
        let statuses: Vec<_> = request.timeline.iter().filter_map(|e| e.status).collect();
        assert_eq!(
            statuses,
            vec![Submitted, UnderReview, Approved, Ordered, Delivered, Completed]
        );
    }
}
