//! Acquisition requests repository for database operations

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{types::Json, PgConnection, Pool, Postgres, Row};
use uuid::Uuid;

use super::{fetch_page, Filters};
use crate::{
    error::{conflict_on_unique, AppError, AppResult},
    models::{
        acquisition::{AcquisitionQuery, AcquisitionRequest},
        enums::Department,
    },
};

/// Scope applied to acquisition listings for callers without `view_all_requests`
#[derive(Debug, Clone)]
pub struct AcquisitionScope {
    pub user: Uuid,
    pub department: Option<String>,
}

#[derive(Clone)]
pub struct AcquisitionsRepository {
    pool: Pool<Postgres>,
}

impl AcquisitionsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    pub async fn get_by_id(&self, id: Uuid) -> AppResult<AcquisitionRequest> {
        sqlx::query_as::<_, AcquisitionRequest>("SELECT * FROM acquisition_requests WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Acquisition request {} not found", id)))
    }

    pub async fn get_for_update(
        &self,
        conn: &mut PgConnection,
        id: Uuid,
    ) -> AppResult<AcquisitionRequest> {
        sqlx::query_as::<_, AcquisitionRequest>(
            "SELECT * FROM acquisition_requests WHERE id = $1 FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Acquisition request {} not found", id)))
    }

    /// Search requests; a scope limits results to the user's own or their department's
    pub async fn search(
        &self,
        query: &AcquisitionQuery,
        scope: Option<&AcquisitionScope>,
        limit: i64,
        offset: i64,
    ) -> AppResult<(Vec<AcquisitionRequest>, i64)> {
        let mut filters = Filters::default();
        filters
            .eq("status", query.status)
            .eq("priority", query.priority)
            .eq("department", query.department);

        if let Some(scope) = scope {
            match &scope.department {
                Some(department) => {
                    filters.any_eq(&[
                        ("requested_by", "::uuid", scope.user.to_string()),
                        ("department", "", department.clone()),
                    ]);
                }
                None => {
                    filters.eq_uuid("requested_by", Some(scope.user));
                }
            }
        }

        Ok(fetch_page(
            &self.pool,
            "acquisition_requests",
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
    ) -> AppResult<Vec<AcquisitionRequest>> {
        let mut filters = Filters::default();
        filters.between("created_at", from, to);

        let query = format!(
            "SELECT * FROM acquisition_requests {} ORDER BY created_at",
            filters.where_clause()
        );
        let mut builder = sqlx::query_as::<_, AcquisitionRequest>(&query);
        for param in filters.params() {
            builder = builder.bind(param);
        }
        Ok(builder.fetch_all(&self.pool).await?)
    }

    /// (committed total, requests awaiting a decision) for a department and year
    pub async fn budget_usage(&self, department: Department, year: i32) -> AppResult<(Decimal, i64)> {
        let row = sqlx::query(
            r#"
            SELECT
                COALESCE(SUM(total_cost) FILTER (
                    WHERE status IN ('approved', 'ordered', 'delivered', 'completed')
                ), 0) AS used,
                COUNT(*) FILTER (WHERE status IN ('submitted', 'under-review')) AS pending
            FROM acquisition_requests
            WHERE department = $1 AND EXTRACT(YEAR FROM created_at)::int = $2
            "#,
        )
        .bind(department)
        .bind(year)
        .fetch_one(&self.pool)
        .await?;

        Ok((row.get::<Decimal, _>("used"), row.get::<i64, _>("pending")))
    }

    pub async fn create(&self, request: &AcquisitionRequest) -> AppResult<AcquisitionRequest> {
        let row = sqlx::query_as::<_, AcquisitionRequest>(
            r#"
            INSERT INTO acquisition_requests (
                id, request_number, requested_by, department, branch, status, priority,
                justification, business_case, items, total_cost, budget_code, approved_by,
                approved_date, rejection_reason, vendor_quotes, selected_vendor, po_number,
                expected_delivery, actual_delivery, notes, timeline, created_at, updated_at
            ) VALUES (
                $1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17,
                $18, $19, $20, $21, $22, $23, $24
            )
            RETURNING *
            "#,
        )
        .bind(request.id)
        .bind(&request.request_number)
        .bind(request.requested_by)
        .bind(request.department)
        .bind(&request.branch)
        .bind(request.status)
        .bind(request.priority)
        .bind(&request.justification)
        .bind(&request.business_case)
        .bind(Json(&request.items))
        .bind(request.total_cost)
        .bind(&request.budget_code)
        .bind(request.approved_by)
        .bind(request.approved_date)
        .bind(&request.rejection_reason)
        .bind(Json(&request.vendor_quotes))
        .bind(&request.selected_vendor)
        .bind(&request.po_number)
        .bind(request.expected_delivery)
        .bind(request.actual_delivery)
        .bind(&request.notes)
        .bind(Json(&request.timeline))
        .bind(request.created_at)
        .bind(request.updated_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| conflict_on_unique(e, "Request number already in use, retry"))?;

        Ok(row)
    }

    /// Write back a locked request; totals are recomputed before every save
    pub async fn save(
        &self,
        conn: &mut PgConnection,
        request: &mut AcquisitionRequest,
    ) -> AppResult<AcquisitionRequest> {
        request.recompute_totals();

        let row = sqlx::query_as::<_, AcquisitionRequest>(
            r#"
            UPDATE acquisition_requests SET
                status = $2, priority = $3, justification = $4, business_case = $5,
                items = $6, total_cost = $7, budget_code = $8, approved_by = $9,
                approved_date = $10, rejection_reason = $11, vendor_quotes = $12,
                selected_vendor = $13, po_number = $14, expected_delivery = $15,
                actual_delivery = $16, notes = $17, timeline = $18, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(request.id)
        .bind(request.status)
        .bind(request.priority)
        .bind(&request.justification)
        .bind(&request.business_case)
        .bind(Json(&request.items))
        .bind(request.total_cost)
        .bind(&request.budget_code)
        .bind(request.approved_by)
        .bind(request.approved_date)
        .bind(&request.rejection_reason)
        .bind(Json(&request.vendor_quotes))
        .bind(&request.selected_vendor)
        .bind(&request.po_number)
        .bind(request.expected_delivery)
        .bind(request.actual_delivery)
        .bind(&request.notes)
        .bind(Json(&request.timeline))
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Acquisition request {} not found", request.id)))?;

        Ok(row)
    }
}
