//! Vendors repository for database operations

use chrono::Utc;
use sqlx::{types::Json, Pool, Postgres};
use uuid::Uuid;

use super::{fetch_page, Filters};
use crate::{
    error::{conflict_on_unique, AppError, AppResult},
    models::vendor::{CreateVendor, UpdateVendor, Vendor, VendorPerformance, VendorQuery},
};

#[derive(Clone)]
pub struct VendorsRepository {
    pool: Pool<Postgres>,
}

impl VendorsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    pub async fn get_by_id(&self, id: Uuid) -> AppResult<Vendor> {
        sqlx::query_as::<_, Vendor>("SELECT * FROM vendors WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Vendor with id {} not found", id)))
    }

    pub async fn exists(&self, id: Uuid) -> AppResult<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM vendors WHERE id = $1 AND is_active)")
                .bind(id)
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }

    /// Active vendors, best rated first, cheaper first on ties
    pub async fn search(&self, query: &VendorQuery, limit: i64, offset: i64) -> AppResult<(Vec<Vendor>, i64)> {
        let mut filters = Filters::default();
        filters
            .raw("is_active = TRUE")
            .eq("availability", query.availability)
            .search(&["name", "email"], query.search.as_deref());

        // JSONB containment on the specializations array
        let specialization = query
            .specialization
            .map(|s| serde_json::json!([s.as_str()]).to_string());
        filters
            .compare("specializations", "@>", "::jsonb", specialization)
            .compare("rating", ">=", "::float8", query.min_rating);

        Ok(fetch_page(
            &self.pool,
            "vendors",
            &filters,
            "rating DESC, hourly_rate ASC NULLS LAST, name",
            limit,
            offset,
        )
        .await?)
    }

    pub async fn create(&self, data: &CreateVendor) -> AppResult<Vendor> {
        let now = Utc::now();
        let row = sqlx::query_as::<_, Vendor>(
            r#"
            INSERT INTO vendors (
                id, name, email, phone, address, specializations, rating, response_time,
                hourly_rate, contract, certifications, service_areas, availability, is_active,
                performance, created_at, updated_at
            ) VALUES ($1, $2, LOWER($3), $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, TRUE, $14, $15, $15)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&data.name)
        .bind(&data.email)
        .bind(&data.phone)
        .bind(Json(&data.address))
        .bind(Json(&data.specializations))
        .bind(data.rating.unwrap_or(3.0))
        .bind(&data.response_time)
        .bind(data.hourly_rate)
        .bind(Json(&data.contract))
        .bind(Json(&data.certifications))
        .bind(Json(&data.service_areas))
        .bind(data.availability.unwrap_or_default())
        .bind(Json(VendorPerformance::default()))
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| conflict_on_unique(e, "Vendor with this email already exists"))?;

        Ok(row)
    }

    pub async fn update(&self, id: Uuid, data: &UpdateVendor) -> AppResult<Vendor> {
        let now = Utc::now();
        let mut sets = vec!["updated_at = $1".to_string()];
        let mut idx = 2;

        macro_rules! add_field {
            ($field:expr, $name:expr) => {
                if $field.is_some() {
                    sets.push(format!("{} = ${}", $name, idx));
                    idx += 1;
                }
            };
        }

        add_field!(data.name, "name");
        add_field!(data.email, "email");
        add_field!(data.phone, "phone");
        add_field!(data.address, "address");
        add_field!(data.specializations, "specializations");
        add_field!(data.rating, "rating");
        add_field!(data.response_time, "response_time");
        add_field!(data.hourly_rate, "hourly_rate");
        add_field!(data.contract, "contract");
        add_field!(data.certifications, "certifications");
        add_field!(data.service_areas, "service_areas");
        add_field!(data.availability, "availability");
        add_field!(data.is_active, "is_active");

        let query = format!(
            "UPDATE vendors SET {} WHERE id = ${} RETURNING *",
            sets.join(", "),
            idx
        );

        let mut builder = sqlx::query_as::<_, Vendor>(&query).bind(now);

        macro_rules! bind_field {
            (json $field:expr) => {
                if let Some(ref val) = $field {
                    builder = builder.bind(Json(val));
                }
            };
            ($field:expr) => {
                if let Some(ref val) = $field {
                    builder = builder.bind(val);
                }
            };
        }

        bind_field!(data.name);
        if let Some(ref email) = data.email {
            builder = builder.bind(email.to_lowercase());
        }
        bind_field!(data.phone);
        bind_field!(json data.address);
        bind_field!(json data.specializations);
        bind_field!(data.rating);
        bind_field!(data.response_time);
        bind_field!(data.hourly_rate);
        bind_field!(json data.contract);
        bind_field!(json data.certifications);
        bind_field!(json data.service_areas);
        bind_field!(data.availability);
        bind_field!(data.is_active);

        builder
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| conflict_on_unique(e, "Vendor with this email already exists"))?
            .ok_or_else(|| AppError::NotFound(format!("Vendor with id {} not found", id)))
    }

    /// Soft delete
    pub async fn deactivate(&self, id: Uuid) -> AppResult<()> {
        let result = sqlx::query("UPDATE vendors SET is_active = FALSE, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Vendor with id {} not found", id)));
        }
        Ok(())
    }
}
