//! Maintenance requests repository for database operations

use chrono::{DateTime, Utc};
use sqlx::{types::Json, PgConnection, Pool, Postgres};
use uuid::Uuid;

use super::{fetch_page, Filters};
use crate::{
    error::{AppError, AppResult},
    models::maintenance::{MaintenanceQuery, MaintenanceRequest},
};

#[derive(Clone)]
pub struct MaintenanceRepository {
    pool: Pool<Postgres>,
}

impl MaintenanceRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    pub async fn get_by_id(&self, id: Uuid) -> AppResult<MaintenanceRequest> {
        sqlx::query_as::<_, MaintenanceRequest>("SELECT * FROM maintenance_requests WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Maintenance request {} not found", id)))
    }

    /// Get a request and lock the row until the transaction ends
    pub async fn get_for_update(
        &self,
        conn: &mut PgConnection,
        id: Uuid,
    ) -> AppResult<MaintenanceRequest> {
        sqlx::query_as::<_, MaintenanceRequest>(
            "SELECT * FROM maintenance_requests WHERE id = $1 FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Maintenance request {} not found", id)))
    }

    /// Search requests; `participant` restricts to requests the user requested or is assigned to
    pub async fn search(
        &self,
        query: &MaintenanceQuery,
        participant: Option<Uuid>,
        limit: i64,
        offset: i64,
    ) -> AppResult<(Vec<MaintenanceRequest>, i64)> {
        let mut filters = Filters::default();
        filters
            .eq("status", query.status)
            .eq("priority", query.priority)
            .eq("category", query.category)
            .eq_uuid("assigned_to", query.assigned_to)
            .eq_uuid("asset_id", query.asset_id)
            .participant(&["requested_by", "assigned_to"], participant);

        Ok(fetch_page(
            &self.pool,
            "maintenance_requests",
            &filters,
            "created_at DESC",
            limit,
            offset,
        )
        .await?)
    }

    /// Requests created within the window, oldest first
    pub async fn list_created_between(
        &self,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> AppResult<Vec<MaintenanceRequest>> {
        let mut filters = Filters::default();
        filters.between("created_at", from, to);

        let query = format!(
            "SELECT * FROM maintenance_requests {} ORDER BY created_at",
            filters.where_clause()
        );
        let mut builder = sqlx::query_as::<_, MaintenanceRequest>(&query);
        for param in filters.params() {
            builder = builder.bind(param);
        }
        Ok(builder.fetch_all(&self.pool).await?)
    }

    pub async fn create(&self, request: &MaintenanceRequest) -> AppResult<MaintenanceRequest> {
        let row = sqlx::query_as::<_, MaintenanceRequest>(
            r#"
            INSERT INTO maintenance_requests (
                id, title, description, asset_id, requested_by, assigned_to, assigned_vendor,
                priority, category, status, estimated_cost, actual_cost, labor_cost, parts_cost,
                time_spent, estimated_completion, actual_completion, warranty_eligible,
                warranty_used, approved_by, approved_date, rejection_reason, notes, resolution,
                feedback, work_log, created_at, updated_at
            ) VALUES (
                $1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17,
                $18, $19, $20, $21, $22, $23, $24, $25, $26, $27, $28
            )
            RETURNING *
            "#,
        )
        .bind(request.id)
        .bind(&request.title)
        .bind(&request.description)
        .bind(request.asset_id)
        .bind(request.requested_by)
        .bind(request.assigned_to)
        .bind(request.assigned_vendor)
        .bind(request.priority)
        .bind(request.category)
        .bind(request.status)
        .bind(request.estimated_cost)
        .bind(request.actual_cost)
        .bind(request.labor_cost)
        .bind(request.parts_cost)
        .bind(request.time_spent)
        .bind(request.estimated_completion)
        .bind(request.actual_completion)
        .bind(request.warranty_eligible)
        .bind(request.warranty_used)
        .bind(request.approved_by)
        .bind(request.approved_date)
        .bind(&request.rejection_reason)
        .bind(&request.notes)
        .bind(&request.resolution)
        .bind(Json(&request.feedback))
        .bind(Json(&request.work_log))
        .bind(request.created_at)
        .bind(request.updated_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    /// Write back every mutable column of a locked request
    pub async fn save(
        &self,
        conn: &mut PgConnection,
        request: &MaintenanceRequest,
    ) -> AppResult<MaintenanceRequest> {
        let row = sqlx::query_as::<_, MaintenanceRequest>(
            r#"
            UPDATE maintenance_requests SET
                assigned_to = $2, assigned_vendor = $3, priority = $4, status = $5,
                estimated_cost = $6, actual_cost = $7, labor_cost = $8, parts_cost = $9,
                time_spent = $10, estimated_completion = $11, actual_completion = $12,
                warranty_used = $13, approved_by = $14, approved_date = $15,
                rejection_reason = $16, notes = $17, resolution = $18, feedback = $19,
                work_log = $20, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(request.id)
        .bind(request.assigned_to)
        .bind(request.assigned_vendor)
        .bind(request.priority)
        .bind(request.status)
        .bind(request.estimated_cost)
        .bind(request.actual_cost)
        .bind(request.labor_cost)
        .bind(request.parts_cost)
        .bind(request.time_spent)
        .bind(request.estimated_completion)
        .bind(request.actual_completion)
        .bind(request.warranty_used)
        .bind(request.approved_by)
        .bind(request.approved_date)
        .bind(&request.rejection_reason)
        .bind(&request.notes)
        .bind(&request.resolution)
        .bind(Json(&request.feedback))
        .bind(Json(&request.work_log))
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Maintenance request {} not found", request.id)))?;

        Ok(row)
    }
}
