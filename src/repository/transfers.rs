//! Transfer requests repository for database operations

use chrono::{DateTime, Utc};
use sqlx::{types::Json, PgConnection, Pool, Postgres};
use uuid::Uuid;

use super::{fetch_page, Filters};
use crate::{
    error::{conflict_on_unique, AppError, AppResult},
    models::transfer::{TransferQuery, TransferRequest},
};

#[derive(Clone)]
pub struct TransfersRepository {
    pool: Pool<Postgres>,
}

impl TransfersRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    pub async fn get_by_id(&self, id: Uuid) -> AppResult<TransferRequest> {
        sqlx::query_as::<_, TransferRequest>("SELECT * FROM transfer_requests WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Transfer request {} not found", id)))
    }

    pub async fn get_for_update(&self, conn: &mut PgConnection, id: Uuid) -> AppResult<TransferRequest> {
        sqlx::query_as::<_, TransferRequest>(
            "SELECT * FROM transfer_requests WHERE id = $1 FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Transfer request {} not found", id)))
    }

    /// Search transfers; `participant` restricts to transfers the user takes part in
    pub async fn search(
        &self,
        query: &TransferQuery,
        participant: Option<Uuid>,
        limit: i64,
        offset: i64,
    ) -> AppResult<(Vec<TransferRequest>, i64)> {
        let mut filters = Filters::default();
        filters
            .eq("status", query.status)
            .eq("priority", query.priority)
            .eq("transfer_type", query.transfer_type)
            .eq_uuid("asset_id", query.asset_id)
            .participant(&["requested_by", "from_user", "to_user", "approved_by"], participant);

        Ok(fetch_page(
            &self.pool,
            "transfer_requests",
            &filters,
            "created_at DESC",
            limit,
            offset,
        )
        .await?)
    }

    pub async fn list_created_between(
        &self,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> AppResult<Vec<TransferRequest>> {
        let mut filters = Filters::default();
        filters.between("created_at", from, to);

        let query = format!(
            "SELECT * FROM transfer_requests {} ORDER BY created_at",
            filters.where_clause()
        );
        let mut builder = sqlx::query_as::<_, TransferRequest>(&query);
        for param in filters.params() {
            builder = builder.bind(param);
        }
        Ok(builder.fetch_all(&self.pool).await?)
    }

    pub async fn create(&self, transfer: &TransferRequest) -> AppResult<TransferRequest> {
        let row = sqlx::query_as::<_, TransferRequest>(
            r#"
            INSERT INTO transfer_requests (
                id, transfer_number, asset_id, transfer_type, from_user, to_user, from_branch,
                to_branch, from_location, to_location, reason, requested_by, approved_by,
                approved_date, completed_date, status, priority, notes, estimated_delivery,
                actual_delivery, tracking_number, transfer_cost, requires_approval,
                rejection_reason, timeline, created_at, updated_at
            ) VALUES (
                $1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17,
                $18, $19, $20, $21, $22, $23, $24, $25, $26, $27
            )
            RETURNING *
            "#,
        )
        .bind(transfer.id)
        .bind(&transfer.transfer_number)
        .bind(transfer.asset_id)
        .bind(transfer.transfer_type)
        .bind(transfer.from_user)
        .bind(transfer.to_user)
        .bind(&transfer.from_branch)
        .bind(&transfer.to_branch)
        .bind(&transfer.from_location)
        .bind(&transfer.to_location)
        .bind(&transfer.reason)
        .bind(transfer.requested_by)
        .bind(transfer.approved_by)
        .bind(transfer.approved_date)
        .bind(transfer.completed_date)
        .bind(transfer.status)
        .bind(transfer.priority)
        .bind(&transfer.notes)
        .bind(transfer.estimated_delivery)
        .bind(transfer.actual_delivery)
        .bind(&transfer.tracking_number)
        .bind(transfer.transfer_cost)
        .bind(transfer.requires_approval)
        .bind(&transfer.rejection_reason)
        .bind(Json(&transfer.timeline))
        .bind(transfer.created_at)
        .bind(transfer.updated_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| conflict_on_unique(e, "Transfer number already in use, retry"))?;

        Ok(row)
    }

    pub async fn save(&self, conn: &mut PgConnection, transfer: &TransferRequest) -> AppResult<TransferRequest> {
        let row = sqlx::query_as::<_, TransferRequest>(
            r#"
            UPDATE transfer_requests SET
                approved_by = $2, approved_date = $3, completed_date = $4, status = $5,
                notes = $6, estimated_delivery = $7, actual_delivery = $8,
                tracking_number = $9, transfer_cost = $10, rejection_reason = $11,
                timeline = $12, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(transfer.id)
        .bind(transfer.approved_by)
        .bind(transfer.approved_date)
        .bind(transfer.completed_date)
        .bind(transfer.status)
        .bind(&transfer.notes)
        .bind(transfer.estimated_delivery)
        .bind(transfer.actual_delivery)
        .bind(&transfer.tracking_number)
        .bind(transfer.transfer_cost)
        .bind(&transfer.rejection_reason)
        .bind(Json(&transfer.timeline))
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Transfer request {} not found", transfer.id)))?;

        Ok(row)
    }
}
