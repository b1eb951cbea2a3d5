//! Acquisition request service

use chrono::{Datelike, Utc};
use rust_decimal::{prelude::ToPrimitive, Decimal};
use uuid::Uuid;
use validator::Validate;

use crate::{
    depreciation::round2,
    error::{AppError, AppResult},
    models::{
        acquisition::{
            AcquisitionDecision, AcquisitionQuery, AcquisitionRequest, AddVendorQuote, BudgetSummary,
            CreateAcquisition, DeliverAcquisition, LineItem, RejectAcquisition, SelectVendor,
            UpdateAcquisition, VendorQuote,
        },
        analytics::{AcquisitionAnalytics, DateRange},
        enums::{AcquisitionStatus, Capability, Department, Priority},
        page_bounds,
        user::UserClaims,
    },
    repository::{acquisitions::AcquisitionScope, Repository},
    services::settings::SettingsService,
    workflow::{self, acquisition::select_vendor, TransitionContext},
};

fn is_own_or_department(claims: &UserClaims, request: &AcquisitionRequest) -> bool {
    claims.is_self(request.requested_by)
        || claims.department.as_deref() == Some(request.department.as_str())
}

fn ensure_visible(claims: &UserClaims, request: &AcquisitionRequest) -> AppResult<()> {
    if !claims.scoped_to_self() || is_own_or_department(claims, request) {
        Ok(())
    } else {
        Err(AppError::Authorization(
            "This request belongs to another department".to_string(),
        ))
    }
}

fn ensure_owner(claims: &UserClaims, request: &AcquisitionRequest) -> AppResult<()> {
    if claims.is_self(request.requested_by) || claims.has(Capability::ApproveAcquisitions) {
        Ok(())
    } else {
        Err(AppError::Authorization(
            "Only the requester can change this request".to_string(),
        ))
    }
}

fn check_items(items: &[crate::models::acquisition::CreateLineItem]) -> AppResult<()> {
    if items.iter().any(|item| item.unit_price < Decimal::ZERO) {
        return Err(AppError::Validation("unitPrice cannot be negative".to_string()));
    }
    Ok(())
}

/// Share of `total` already used, in percent
fn utilization(used: Decimal, total: Decimal) -> f64 {
    if total <= Decimal::ZERO {
        return 0.0;
    }
    round2((used / total * Decimal::from(100)).to_f64().unwrap_or_default())
}

#[derive(Clone)]
pub struct AcquisitionsService {
    repository: Repository,
    settings: SettingsService,
}

impl AcquisitionsService {
    pub fn new(repository: Repository, settings: SettingsService) -> Self {
        Self { repository, settings }
    }

    pub async fn search(
        &self,
        claims: &UserClaims,
        query: &AcquisitionQuery,
    ) -> AppResult<(Vec<AcquisitionRequest>, i64, i64, i64)> {
        let (page, limit, offset) = page_bounds(query.page, query.limit);
        let scope = claims.scoped_to_self().then(|| AcquisitionScope {
            user: claims.user_id,
            department: claims.department.clone(),
        });
        let (requests, total) = self
            .repository
            .acquisitions
            .search(query, scope.as_ref(), limit, offset)
            .await?;
        Ok((requests, total, page, limit))
    }

    pub async fn get(&self, claims: &UserClaims, id: Uuid) -> AppResult<AcquisitionRequest> {
        let request = self.repository.acquisitions.get_by_id(id).await?;
        ensure_visible(claims, &request)?;
        Ok(request)
    }

    pub async fn create(&self, claims: &UserClaims, data: CreateAcquisition) -> AppResult<AcquisitionRequest> {
        data.validate()?;
        check_items(&data.items)?;

        let now = Utc::now();
        let mut request = AcquisitionRequest {
            id: Uuid::new_v4(),
            request_number: workflow::reference_number("ACQ"),
            requested_by: claims.user_id,
            department: data.department,
            branch: data.branch,
            status: AcquisitionStatus::Draft,
            priority: data.priority.unwrap_or(Priority::Medium),
            justification: data.justification,
            business_case: data.business_case,
            items: data.items.into_iter().map(LineItem::from).collect(),
            total_cost: Decimal::ZERO,
            budget_code: data.budget_code,
            approved_by: None,
            approved_date: None,
            rejection_reason: None,
            vendor_quotes: Vec::new(),
            selected_vendor: None,
            po_number: None,
            expected_delivery: data.expected_delivery,
            actual_delivery: None,
            notes: data.notes,
            timeline: Vec::new(),
            created_at: now,
            updated_at: now,
        };
        request.recompute_totals();

        let ctx = TransitionContext::by(claims.user_id);
        let description = format!("{} items, total {}", request.items.len(), request.total_cost);
        workflow::record(&mut request, "Request created", description, &ctx);

        let created = self.repository.acquisitions.create(&request).await?;
        tracing::info!(
            request_id = %created.id,
            number = %created.request_number,
            total = %created.total_cost,
            "acquisition request created"
        );
        Ok(created)
    }

    /// Lock the request, let `change` mutate it, then save with fresh totals
    async fn mutate<F>(&self, id: Uuid, change: F) -> AppResult<AcquisitionRequest>
    where
        F: FnOnce(&mut AcquisitionRequest) -> AppResult<()>,
    {
        let mut tx = self.repository.pool.begin().await?;
        let mut request = self.repository.acquisitions.get_for_update(&mut *tx, id).await?;
        change(&mut request)?;
        let saved = self.repository.acquisitions.save(&mut *tx, &mut request).await?;
        tx.commit().await?;
        Ok(saved)
    }

    pub async fn update(
        &self,
        claims: &UserClaims,
        id: Uuid,
        data: UpdateAcquisition,
    ) -> AppResult<AcquisitionRequest> {
        data.validate()?;
        if let Some(ref items) = data.items {
            check_items(items)?;
        }

        self.mutate(id, |request| {
            ensure_owner(claims, request)?;
            if !matches!(request.status, AcquisitionStatus::Draft)
                && !AcquisitionRequest::is_awaiting_decision(request.status)
            {
                return Err(AppError::BusinessRule(format!(
                    "A request in status '{}' can no longer be edited",
                    request.status
                )));
            }

            if let Some(justification) = data.justification {
                request.justification = justification;
            }
            if let Some(business_case) = data.business_case {
                request.business_case = business_case;
            }
            if let Some(items) = data.items {
                request.items = items.into_iter().map(LineItem::from).collect();
            }
            if let Some(priority) = data.priority {
                request.priority = priority;
            }
            if data.budget_code.is_some() {
                request.budget_code = data.budget_code;
            }
            if data.expected_delivery.is_some() {
                request.expected_delivery = data.expected_delivery;
            }
            if data.notes.is_some() {
                request.notes = data.notes;
            }
            request.recompute_totals();

            let ctx = TransitionContext::by(claims.user_id);
            let description = format!("Request updated, total {}", request.total_cost);
            workflow::record(request, "Request updated", description, &ctx);
            Ok(())
        })
        .await
    }

    pub async fn submit(&self, claims: &UserClaims, id: Uuid) -> AppResult<AcquisitionRequest> {
        self.mutate(id, |request| {
            ensure_owner(claims, request)?;
            let ctx = TransitionContext::by(claims.user_id).with_action("Request submitted");
            workflow::transition(request, AcquisitionStatus::Submitted, &ctx)?;
            Ok(())
        })
        .await
    }

    pub async fn start_review(
        &self,
        claims: &UserClaims,
        id: Uuid,
        data: AcquisitionDecision,
    ) -> AppResult<AcquisitionRequest> {
        claims.require(Capability::ApproveAcquisitions)?;
        self.mutate(id, |request| {
            let ctx = TransitionContext::by(claims.user_id)
                .with_action("Review started")
                .with_notes(data.notes);
            workflow::transition(request, AcquisitionStatus::UnderReview, &ctx)?;
            Ok(())
        })
        .await
    }

    pub async fn approve(
        &self,
        claims: &UserClaims,
        id: Uuid,
        data: AcquisitionDecision,
    ) -> AppResult<AcquisitionRequest> {
        claims.require(Capability::ApproveAcquisitions)?;
        let saved = self
            .mutate(id, |request| {
                let ctx = TransitionContext::by(claims.user_id)
                    .with_action("Request approved")
                    .with_notes(data.notes);
                workflow::transition(request, AcquisitionStatus::Approved, &ctx)?;
                if data.budget_code.is_some() {
                    request.budget_code = data.budget_code;
                }
                Ok(())
            })
            .await?;
        tracing::info!(request_id = %saved.id, total = %saved.total_cost, "acquisition approved");
        Ok(saved)
    }

    pub async fn reject(
        &self,
        claims: &UserClaims,
        id: Uuid,
        data: RejectAcquisition,
    ) -> AppResult<AcquisitionRequest> {
        claims.require(Capability::ApproveAcquisitions)?;
        data.validate()?;
        self.mutate(id, |request| {
            let ctx = TransitionContext::by(claims.user_id)
                .with_action("Request rejected")
                .with_reason(Some(data.reason.clone()))
                .with_notes(Some(data.reason));
            workflow::transition(request, AcquisitionStatus::Rejected, &ctx)?;
            Ok(())
        })
        .await
    }

    /// Attach a quote while the request is still being decided or just approved
    pub async fn add_quote(
        &self,
        claims: &UserClaims,
        id: Uuid,
        data: AddVendorQuote,
    ) -> AppResult<AcquisitionRequest> {
        claims.require(Capability::ApproveAcquisitions)?;
        data.validate()?;
        if data.quoted_price < Decimal::ZERO {
            return Err(AppError::Validation("quotedPrice cannot be negative".to_string()));
        }

        self.mutate(id, |request| {
            let open = AcquisitionRequest::is_awaiting_decision(request.status)
                || request.status == AcquisitionStatus::Approved;
            if !open {
                return Err(AppError::BusinessRule(format!(
                    "Quotes cannot be added to a request in status '{}'",
                    request.status
                )));
            }

            let ctx = TransitionContext::by(claims.user_id);
            let description = format!("Quote from {} for {}", data.vendor_name, data.quoted_price);
            request.vendor_quotes.push(VendorQuote {
                id: Uuid::new_v4(),
                vendor_name: data.vendor_name,
                vendor_email: data.vendor_email,
                quoted_price: data.quoted_price,
                delivery_time: data.delivery_time,
                warranty: data.warranty,
                notes: data.notes,
                quote_date: ctx.now,
                valid_until: data.valid_until,
                selected: false,
            });
            workflow::record(request, "Vendor quote added", description, &ctx);
            Ok(())
        })
        .await
    }

    pub async fn select_vendor(
        &self,
        claims: &UserClaims,
        id: Uuid,
        data: SelectVendor,
    ) -> AppResult<AcquisitionRequest> {
        claims.require(Capability::ApproveAcquisitions)?;
        self.mutate(id, |request| {
            let ctx = TransitionContext::by(claims.user_id);
            select_vendor(request, data.quote_id, data.po_number, &ctx)?;
            if data.expected_delivery.is_some() {
                request.expected_delivery = data.expected_delivery;
            }
            Ok(())
        })
        .await
    }

    pub async fn deliver(
        &self,
        claims: &UserClaims,
        id: Uuid,
        data: DeliverAcquisition,
    ) -> AppResult<AcquisitionRequest> {
        claims.require(Capability::ApproveAcquisitions)?;
        self.mutate(id, |request| {
            let ctx = TransitionContext::by(claims.user_id)
                .with_action("Items delivered")
                .with_notes(data.notes);
            workflow::transition(request, AcquisitionStatus::Delivered, &ctx)?;
            if data.actual_delivery.is_some() {
                request.actual_delivery = data.actual_delivery;
            }
            Ok(())
        })
        .await
    }

    pub async fn complete(
        &self,
        claims: &UserClaims,
        id: Uuid,
        data: AcquisitionDecision,
    ) -> AppResult<AcquisitionRequest> {
        claims.require(Capability::ApproveAcquisitions)?;
        self.mutate(id, |request| {
            let ctx = TransitionContext::by(claims.user_id)
                .with_action("Request completed")
                .with_notes(data.notes);
            workflow::transition(request, AcquisitionStatus::Completed, &ctx)?;
            Ok(())
        })
        .await
    }

    /// Budget use of a department for one calendar year
    pub async fn budget(
        &self,
        claims: &UserClaims,
        department: Department,
        year: Option<i32>,
    ) -> AppResult<BudgetSummary> {
        if claims.scoped_to_self() && claims.department.as_deref() != Some(department.as_str()) {
            return Err(AppError::Authorization(
                "You can only view your own department's budget".to_string(),
            ));
        }

        let year = year.unwrap_or_else(|| Utc::now().year());
        let budget = self.settings.budget().await?;
        let total_budget = Decimal::from_f64_retain(budget.department_annual_budget)
            .unwrap_or_default()
            .round_dp(2);
        let (used_budget, pending_requests) = self
            .repository
            .acquisitions
            .budget_usage(department, year)
            .await?;

        Ok(BudgetSummary {
            department,
            year,
            total_budget,
            used_budget,
            remaining_budget: total_budget - used_budget,
            pending_requests,
            utilization_percentage: utilization(used_budget, total_budget),
        })
    }

    pub async fn analytics(&self, range: DateRange) -> AppResult<AcquisitionAnalytics> {
        let analytics = &self.repository.analytics;
        Ok(AcquisitionAnalytics {
            request_stats: analytics.acquisition_status_stats(range).await?,
            department_spending: analytics.department_spending(range).await?,
            category_analysis: analytics.item_categories(range).await?,
            vendor_performance: analytics.vendor_performance(range).await?,
            date_range: range,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        acquisition::tests::{line, sample_request},
        enums::Role,
    };

    fn claims(role: Role, department: &str) -> UserClaims {
        UserClaims {
            sub: "tester".into(),
            user_id: Uuid::new_v4(),
            role,
            department: Some(department.into()),
            branch: None,
            permissions: crate::policy::default_capabilities(role),
            exp: 0,
            iat: 0,
        }
    }

    #[test]
    fn test_utilization() {
        assert_eq!(utilization(Decimal::from(25_000), Decimal::from(100_000)), 25.0);
        assert_eq!(utilization(Decimal::from(1), Decimal::from(3)), 33.33);
        assert_eq!(utilization(Decimal::from(10), Decimal::ZERO), 0.0);
    }

    #[test]
    fn test_visibility_by_department() {
        let request = sample_request(vec![line(1, 100)]);
        let colleague = claims(Role::Employee, "IT");
        let outsider = claims(Role::Employee, "Finance");
        let manager = claims(Role::Manager, "Finance");

        assert!(ensure_visible(&colleague, &request).is_ok());
        assert!(ensure_visible(&outsider, &request).is_err());
        assert!(ensure_visible(&manager, &request).is_ok());
    }

    #[test]
    fn test_only_requester_or_approver_edits() {
        let mut request = sample_request(vec![line(1, 100)]);
        let owner = claims(Role::Employee, "IT");
        request.requested_by = owner.user_id;

        assert!(ensure_owner(&owner, &request).is_ok());
        assert!(ensure_owner(&claims(Role::Employee, "IT"), &request).is_err());
        assert!(ensure_owner(&claims(Role::Manager, "HR"), &request).is_ok());
    }
}
