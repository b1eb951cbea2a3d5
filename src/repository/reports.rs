//! Reports repository for database operations

use sqlx::{types::Json, Pool, Postgres};
use uuid::Uuid;

use super::{fetch_page, Filters};
use crate::{
    error::{AppError, AppResult},
    models::{
        enums::ReportStatus,
        report::{Report, ReportMetadata, ReportQuery},
    },
};

#[derive(Clone)]
pub struct ReportsRepository {
    pool: Pool<Postgres>,
}

impl ReportsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    pub async fn get_by_id(&self, id: Uuid) -> AppResult<Report> {
        sqlx::query_as::<_, Report>("SELECT * FROM reports WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Report with id {} not found", id)))
    }

    /// `owner` restricts to reports generated by that user
    pub async fn search(
        &self,
        query: &ReportQuery,
        owner: Option<Uuid>,
        limit: i64,
        offset: i64,
    ) -> AppResult<(Vec<Report>, i64)> {
        let mut filters = Filters::default();
        filters
            .compare("config->>'type'", "=", "", query.report_type)
            .eq("status", query.status)
            .eq_uuid("generated_by", owner);

        Ok(fetch_page(&self.pool, "reports", &filters, "created_at DESC", limit, offset).await?)
    }

    pub async fn create(&self, report: &Report) -> AppResult<Report> {
        let row = sqlx::query_as::<_, Report>(
            r#"
            INSERT INTO reports (
                id, report_number, title, description, generated_by, config, status,
                metadata, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING *
            "#,
        )
        .bind(report.id)
        .bind(&report.report_number)
        .bind(&report.title)
        .bind(&report.description)
        .bind(report.generated_by)
        .bind(Json(&report.config))
        .bind(report.status)
        .bind(Json(&report.metadata))
        .bind(report.created_at)
        .bind(report.updated_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| crate::error::conflict_on_unique(e, "Report number already in use, retry"))?;

        Ok(row)
    }

    /// Record the outcome of a generation run
    pub async fn finish(&self, id: Uuid, status: ReportStatus, metadata: &ReportMetadata) -> AppResult<Report> {
        sqlx::query_as::<_, Report>(
            "UPDATE reports SET status = $2, metadata = $3, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(status)
        .bind(Json(metadata))
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Report with id {} not found", id)))
    }
}
