//! Assets repository for database operations

use sqlx::{types::Json, PgConnection, Pool, Postgres};
use uuid::Uuid;

use super::{fetch_page, Filters};
use crate::{
    error::{conflict_on_unique, AppError, AppResult},
    models::{
        asset::{Asset, AssetQuery},
        enums::{AssetCategory, AssetStatus},
    },
};

#[derive(Clone)]
pub struct AssetsRepository {
    pool: Pool<Postgres>,
}

impl AssetsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get asset by ID
    pub async fn get_by_id(&self, id: Uuid) -> AppResult<Asset> {
        sqlx::query_as::<_, Asset>("SELECT * FROM assets WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Asset with id {} not found", id)))
    }

    /// Get asset by ID and lock the row until the transaction ends
    pub async fn get_for_update(&self, conn: &mut PgConnection, id: Uuid) -> AppResult<Asset> {
        sqlx::query_as::<_, Asset>("SELECT * FROM assets WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Asset with id {} not found", id)))
    }

    pub async fn exists(&self, id: Uuid) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM assets WHERE id = $1)")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }

    /// Search assets with pagination
    pub async fn search(&self, query: &AssetQuery, limit: i64, offset: i64) -> AppResult<(Vec<Asset>, i64)> {
        let mut filters = Filters::default();
        filters
            .eq("category", query.category)
            .eq("status", query.status)
            .eq("branch", query.branch.as_deref())
            .eq_uuid("assigned_to", query.assigned_to)
            .search(&["name", "serial_number", "description"], query.search.as_deref());

        Ok(fetch_page(&self.pool, "assets", &filters, "created_at DESC", limit, offset).await?)
    }

    /// Every asset matching the optional filters, newest first
    pub async fn list_all(
        &self,
        branch: Option<&str>,
        category: Option<AssetCategory>,
        status: Option<AssetStatus>,
    ) -> AppResult<Vec<Asset>> {
        let mut filters = Filters::default();
        filters
            .eq("branch", branch)
            .eq("category", category)
            .eq("status", status);

        let query = format!("SELECT * FROM assets {} ORDER BY created_at DESC", filters.where_clause());
        let mut builder = sqlx::query_as::<_, Asset>(&query);
        for param in filters.params() {
            builder = builder.bind(param);
        }
        Ok(builder.fetch_all(&self.pool).await?)
    }

    /// Assets that are not retired
    pub async fn list_in_service(&self) -> AppResult<Vec<Asset>> {
        let rows = sqlx::query_as::<_, Asset>(
            "SELECT * FROM assets WHERE status <> 'Retired' ORDER BY category, name",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Insert a fully built asset
    pub async fn create(&self, asset: &Asset) -> AppResult<Asset> {
        let row = sqlx::query_as::<_, Asset>(
            r#"
            INSERT INTO assets (
                id, serial_number, name, category, status, condition, branch, location,
                assigned_to, purchase_date, purchase_price, current_value, vendor, warranty,
                warranty_expiry, description, qr_code_identifier, last_audit_date,
                next_audit_date, tags, custom_fields, timeline, created_by, created_at, updated_at
            ) VALUES (
                $1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17,
                $18, $19, $20, $21, $22, $23, $24, $25
            )
            RETURNING *
            "#,
        )
        .bind(asset.id)
        .bind(&asset.serial_number)
        .bind(&asset.name)
        .bind(asset.category)
        .bind(asset.status)
        .bind(asset.condition)
        .bind(&asset.branch)
        .bind(&asset.location)
        .bind(asset.assigned_to)
        .bind(asset.purchase_date)
        .bind(asset.purchase_price)
        .bind(asset.current_value)
        .bind(&asset.vendor)
        .bind(&asset.warranty)
        .bind(asset.warranty_expiry)
        .bind(&asset.description)
        .bind(&asset.qr_code_identifier)
        .bind(asset.last_audit_date)
        .bind(asset.next_audit_date)
        .bind(Json(&asset.tags))
        .bind(Json(&asset.custom_fields))
        .bind(Json(&asset.timeline))
        .bind(asset.created_by)
        .bind(asset.created_at)
        .bind(asset.updated_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| conflict_on_unique(e, "Asset with this serial number already exists"))?;

        Ok(row)
    }

    /// Write back every mutable column of a locked asset
    pub async fn save(&self, conn: &mut PgConnection, asset: &Asset) -> AppResult<Asset> {
        let row = sqlx::query_as::<_, Asset>(
            r#"
            UPDATE assets SET
                name = $2, category = $3, status = $4, condition = $5, branch = $6,
                location = $7, assigned_to = $8, current_value = $9, vendor = $10,
                warranty = $11, warranty_expiry = $12, description = $13,
                last_audit_date = $14, next_audit_date = $15, tags = $16,
                custom_fields = $17, timeline = $18, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(asset.id)
        .bind(&asset.name)
        .bind(asset.category)
        .bind(asset.status)
        .bind(asset.condition)
        .bind(&asset.branch)
        .bind(&asset.location)
        .bind(asset.assigned_to)
        .bind(asset.current_value)
        .bind(&asset.vendor)
        .bind(&asset.warranty)
        .bind(asset.warranty_expiry)
        .bind(&asset.description)
        .bind(asset.last_audit_date)
        .bind(asset.next_audit_date)
        .bind(Json(&asset.tags))
        .bind(Json(&asset.custom_fields))
        .bind(Json(&asset.timeline))
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Asset with id {} not found", asset.id)))?;

        Ok(row)
    }

    /// Delete asset
    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM assets WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Asset with id {} not found", id)));
        }
        Ok(())
    }
}
