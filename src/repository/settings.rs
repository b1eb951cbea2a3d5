//! Settings repository: one JSONB document per section

use serde::{de::DeserializeOwned, Serialize};
use sqlx::{types::Json, Pool, Postgres};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::settings::SettingsSection,
};

#[derive(Clone)]
pub struct SettingsRepository {
    pool: Pool<Postgres>,
}

impl SettingsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Stored section, `None` when it was never written
    pub async fn get<T: DeserializeOwned>(&self, section: SettingsSection) -> AppResult<Option<T>> {
        let value: Option<serde_json::Value> =
            sqlx::query_scalar("SELECT value FROM settings WHERE key = $1")
                .bind(section.key())
                .fetch_optional(&self.pool)
                .await?;

        value
            .map(serde_json::from_value)
            .transpose()
            .map_err(|e| AppError::Internal(format!("Corrupt '{}' settings: {}", section.key(), e)))
    }

    pub async fn put<T: Serialize + Sync>(
        &self,
        section: SettingsSection,
        value: &T,
        updated_by: Option<Uuid>,
    ) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO settings (key, value, updated_by, updated_at)
            VALUES ($1, $2, $3, NOW())
            ON CONFLICT (key) DO UPDATE
            SET value = EXCLUDED.value, updated_by = EXCLUDED.updated_by, updated_at = NOW()
            "#,
        )
        .bind(section.key())
        .bind(Json(value))
        .bind(updated_by)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Write `value` only when the section has no row yet
    pub async fn seed<T: Serialize + Sync>(&self, section: SettingsSection, value: &T) -> AppResult<bool> {
        let result = sqlx::query(
            "INSERT INTO settings (key, value) VALUES ($1, $2) ON CONFLICT (key) DO NOTHING",
        )
        .bind(section.key())
        .bind(Json(value))
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
