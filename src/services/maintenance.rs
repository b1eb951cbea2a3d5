//! Maintenance request service

use chrono::Utc;
use rust_decimal::Decimal;
use uuid::Uuid;
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::{
        analytics::{DateRange, MaintenanceAnalytics},
        enums::{Capability, MaintenanceStatus, Priority},
        maintenance::{
            AssignMaintenance, CreateMaintenance, Feedback, MaintenanceQuery, MaintenanceRequest,
            MaintenanceView, SubmitFeedback, UpdateMaintenance,
        },
        page_bounds,
        user::UserClaims,
    },
    policy::Resource,
    repository::Repository,
    workflow::{self, TransitionContext},
};

#[derive(Clone)]
pub struct MaintenanceService {
    repository: Repository,
}

impl MaintenanceService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Requests visible to the caller
    pub async fn search(
        &self,
        claims: &UserClaims,
        query: &MaintenanceQuery,
    ) -> AppResult<(Vec<MaintenanceView>, i64, i64, i64)> {
        let (page, limit, offset) = page_bounds(query.page, query.limit);
        let participant = claims.scoped_to_self().then_some(claims.user_id);
        let (requests, total) = self
            .repository
            .maintenance
            .search(query, participant, limit, offset)
            .await?;
        Ok((requests.into_iter().map(Into::into).collect(), total, page, limit))
    }

    pub async fn get(&self, claims: &UserClaims, id: Uuid) -> AppResult<MaintenanceView> {
        let request = self.repository.maintenance.get_by_id(id).await?;
        claims.require_on(
            Capability::ViewMaintenance,
            Resource::Participants(&request.participants()),
        )?;
        Ok(request.into())
    }

    pub async fn create(&self, claims: &UserClaims, data: CreateMaintenance) -> AppResult<MaintenanceRequest> {
        data.validate()?;
        if data.estimated_cost.map(|c| c < Decimal::ZERO).unwrap_or(false) {
            return Err(AppError::Validation("estimatedCost cannot be negative".to_string()));
        }
        if !self.repository.assets.exists(data.asset_id).await? {
            return Err(AppError::NotFound(format!("Asset with id {} not found", data.asset_id)));
        }
        if let Some(vendor) = data.assigned_vendor {
            if !self.repository.vendors.exists(vendor).await? {
                return Err(AppError::NotFound(format!("Vendor with id {} not found", vendor)));
            }
        }

        let now = Utc::now();
        let mut request = MaintenanceRequest {
            id: Uuid::new_v4(),
            title: data.title,
            description: data.description,
            asset_id: data.asset_id,
            requested_by: claims.user_id,
            assigned_to: None,
            assigned_vendor: data.assigned_vendor,
            priority: data.priority.unwrap_or(Priority::Medium),
            category: data.category,
            status: MaintenanceStatus::Pending,
            estimated_cost: data.estimated_cost,
            actual_cost: None,
            labor_cost: Decimal::ZERO,
            parts_cost: Decimal::ZERO,
            time_spent: 0.0,
            estimated_completion: data.estimated_completion,
            actual_completion: None,
            warranty_eligible: data.warranty_eligible,
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
        };

        let ctx = TransitionContext::by(claims.user_id);
        workflow::record(&mut request, "Request created", "Maintenance request submitted", &ctx);

        let created = self.repository.maintenance.create(&request).await?;
        tracing::info!(request_id = %created.id, asset_id = %created.asset_id, "maintenance request created");
        Ok(created)
    }

    /// Apply allow-listed fields, then the status change if one was asked for
    pub async fn update(
        &self,
        claims: &UserClaims,
        id: Uuid,
        data: UpdateMaintenance,
    ) -> AppResult<MaintenanceRequest> {
        data.validate()?;
        if data.costs().iter().flatten().any(|c| *c < Decimal::ZERO) {
            return Err(AppError::Validation("Costs cannot be negative".to_string()));
        }
        if matches!(
            data.status,
            Some(MaintenanceStatus::Approved) | Some(MaintenanceStatus::Rejected)
        ) {
            claims.require(Capability::ApproveMaintenance)?;
        }
        if let Some(assignee) = data.assigned_to {
            claims.require(Capability::ApproveMaintenance)?;
            if let Some(user) = assignee {
                self.ensure_user(user).await?;
            }
        }

        let mut tx = self.repository.pool.begin().await?;
        let mut request = self.repository.maintenance.get_for_update(&mut *tx, id).await?;
        claims.require_on(
            Capability::UpdateMaintenance,
            Resource::Participants(&request.participants()),
        )?;

        if let Some(priority) = data.priority {
            request.priority = priority;
        }
        if let Some(cost) = data.estimated_cost {
            request.estimated_cost = Some(cost);
        }
        if let Some(cost) = data.actual_cost {
            request.actual_cost = Some(cost);
        }
        if let Some(cost) = data.labor_cost {
            request.labor_cost = cost;
        }
        if let Some(cost) = data.parts_cost {
            request.parts_cost = cost;
        }
        if let Some(ref notes) = data.notes {
            request.notes = Some(notes.clone());
        }
        if let Some(resolution) = data.resolution {
            request.resolution = Some(resolution);
        }
        if let Some(due) = data.estimated_completion {
            request.estimated_completion = Some(due);
        }
        if let Some(used) = data.warranty_used {
            request.warranty_used = used;
        }
        if let Some(assignee) = data.assigned_to {
            request.assigned_to = assignee;
        }

        let ctx = TransitionContext::by(claims.user_id)
            .with_notes(data.notes)
            .with_reason(data.reason)
            .with_time_spent(data.time_spent);

        match data.status.filter(|s| *s != request.status) {
            Some(next) => {
                workflow::transition(&mut request, next, &ctx)?;
            }
            None => {
                if let Some(hours) = ctx.time_spent.filter(|h| *h > 0.0) {
                    request.time_spent += hours;
                    workflow::record(
                        &mut request,
                        "Work logged",
                        format!("{} hours logged", hours),
                        &ctx,
                    );
                }
            }
        }

        let saved = self.repository.maintenance.save(&mut *tx, &request).await?;
        tx.commit().await?;
        Ok(saved)
    }

    /// Assign a technician; a pending request is approved on assignment
    pub async fn assign(
        &self,
        claims: &UserClaims,
        id: Uuid,
        data: AssignMaintenance,
    ) -> AppResult<MaintenanceRequest> {
        claims.require(Capability::ApproveMaintenance)?;
        self.ensure_user(data.assigned_to).await?;

        let mut tx = self.repository.pool.begin().await?;
        let mut request = self.repository.maintenance.get_for_update(&mut *tx, id).await?;
        let previous = request.assigned_to;
        request.assigned_to = Some(data.assigned_to);

        let ctx = TransitionContext::by(claims.user_id).with_notes(data.notes);
        if request.status == MaintenanceStatus::Pending {
            let ctx = ctx.with_action(format!("Assigned to user {}", data.assigned_to));
            workflow::transition(&mut request, MaintenanceStatus::Approved, &ctx)?;
        } else {
            let description = match previous {
                Some(from) => format!("Reassigned from user {} to user {}", from, data.assigned_to),
                None => format!("Assigned to user {}", data.assigned_to),
            };
            workflow::record(&mut request, "Request reassigned", description, &ctx);
        }

        let saved = self.repository.maintenance.save(&mut *tx, &request).await?;
        tx.commit().await?;
        Ok(saved)
    }

    /// Requester rates a completed request
    pub async fn feedback(
        &self,
        claims: &UserClaims,
        id: Uuid,
        data: SubmitFeedback,
    ) -> AppResult<MaintenanceRequest> {
        data.validate()?;

        let mut tx = self.repository.pool.begin().await?;
        let mut request = self.repository.maintenance.get_for_update(&mut *tx, id).await?;
        if !claims.is_self(request.requested_by) {
            return Err(AppError::Authorization(
                "Only the requester can leave feedback".to_string(),
            ));
        }
        if request.status != MaintenanceStatus::Completed {
            return Err(AppError::BusinessRule(
                "Feedback can only be given on completed requests".to_string(),
            ));
        }

        let ctx = TransitionContext::by(claims.user_id);
        request.feedback = Some(Feedback {
            rating: data.rating,
            comment: data.comment,
            submitted_at: ctx.now,
        });
        workflow::record(
            &mut request,
            "Feedback submitted",
            format!("Rated {} out of 5", data.rating),
            &ctx,
        );

        let saved = self.repository.maintenance.save(&mut *tx, &request).await?;
        tx.commit().await?;
        Ok(saved)
    }

    pub async fn analytics(&self, range: DateRange) -> AppResult<MaintenanceAnalytics> {
        let analytics = &self.repository.analytics;
        Ok(MaintenanceAnalytics {
            stats: analytics.maintenance_status_stats().await?,
            cost_analytics: analytics.maintenance_monthly_costs(range).await?,
            avg_resolution_days: analytics
                .maintenance_avg_resolution_days(range)
                .await?
                .map(crate::depreciation::round2)
                .unwrap_or_default(),
            category_stats: analytics.maintenance_category_stats(range, false).await?,
            date_range: range,
        })
    }

    async fn ensure_user(&self, id: Uuid) -> AppResult<()> {
        if self.repository.users.exists(id).await? {
            Ok(())
        } else {
            Err(AppError::NotFound(format!("User with id {} not found", id)))
        }
    }
}
