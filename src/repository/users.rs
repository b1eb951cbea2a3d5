//! Users repository for database operations

use chrono::Utc;
use sqlx::{types::Json, Pool, Postgres};
use uuid::Uuid;

use super::{fetch_page, Filters};
use crate::{
    error::{AppError, AppResult},
    models::{
        enums::{Capability, Role},
        user::{UpdateUser, User, UserPreferences, UserQuery},
    },
};

/// Fields of a new user, password already hashed
pub struct NewUser<'a> {
    pub username: &'a str,
    pub email: &'a str,
    pub password_hash: &'a str,
    pub name: &'a str,
    pub role: Role,
    pub department: Option<&'a str>,
    pub branch: Option<&'a str>,
    pub permissions: &'a [Capability],
}

#[derive(Clone)]
pub struct UsersRepository {
    pool: Pool<Postgres>,
}

impl UsersRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get user by ID
    pub async fn get_by_id(&self, id: Uuid) -> AppResult<User> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User with id {} not found", id)))
    }

    /// Get user by username or email, case-insensitive
    pub async fn get_by_login(&self, login: &str) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "SELECT * FROM users WHERE LOWER(username) = LOWER($1) OR LOWER(email) = LOWER($1)",
        )
        .bind(login)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    pub async fn exists(&self, id: Uuid) -> AppResult<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE id = $1 AND is_active)")
                .bind(id)
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }

    /// Check if username or email is already taken by another user
    pub async fn identity_taken(
        &self,
        username: Option<&str>,
        email: Option<&str>,
        exclude_id: Option<Uuid>,
    ) -> AppResult<bool> {
        let taken: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM users
                WHERE (LOWER(username) = LOWER($1) OR LOWER(email) = LOWER($2))
                  AND ($3::uuid IS NULL OR id != $3)
            )
            "#,
        )
        .bind(username)
        .bind(email)
        .bind(exclude_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(taken)
    }

    /// Active users, paged
    pub async fn search(&self, query: &UserQuery, limit: i64, offset: i64) -> AppResult<(Vec<User>, i64)> {
        let mut filters = Filters::default();
        filters
            .raw("is_active = TRUE")
            .eq("department", query.department.as_deref())
            .eq("role", query.role)
            .eq("branch", query.branch.as_deref())
            .search(&["name", "username", "email"], query.search.as_deref());

        Ok(fetch_page(&self.pool, "users", &filters, "name, username", limit, offset).await?)
    }

    pub async fn count(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    pub async fn count_active_admins(&self) -> AppResult<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE role = 'Admin' AND is_active")
                .fetch_one(&self.pool)
                .await?;
        Ok(count)
    }

    /// Create a new user
    pub async fn create(&self, user: &NewUser<'_>) -> AppResult<User> {
        let now = Utc::now();
        let row = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (
                id, username, email, password_hash, name, role, department, branch,
                is_active, permissions, preferences, created_at, updated_at
            ) VALUES ($1, $2, LOWER($3), $4, $5, $6, $7, $8, TRUE, $9, $10, $11, $11)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user.username)
        .bind(user.email)
        .bind(user.password_hash)
        .bind(user.name)
        .bind(user.role)
        .bind(user.department)
        .bind(user.branch)
        .bind(Json(user.permissions))
        .bind(Json(UserPreferences::default()))
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| crate::error::conflict_on_unique(e, "Username or email already exists"))?;

        Ok(row)
    }

    /// Update a user; the caller has already filtered out fields it may not change
    pub async fn update(&self, id: Uuid, data: &UpdateUser) -> AppResult<User> {
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
        add_field!(data.department, "department");
        add_field!(data.branch, "branch");
        add_field!(data.preferences, "preferences");
        add_field!(data.role, "role");
        add_field!(data.permissions, "permissions");
        add_field!(data.is_active, "is_active");

        let query = format!(
            "UPDATE users SET {} WHERE id = ${} RETURNING *",
            sets.join(", "),
            idx
        );

        let mut builder = sqlx::query_as::<_, User>(&query).bind(now);

        macro_rules! bind_field {
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
        bind_field!(data.department);
        bind_field!(data.branch);
        if let Some(ref preferences) = data.preferences {
            builder = builder.bind(Json(preferences));
        }
        bind_field!(data.role);
        if let Some(ref permissions) = data.permissions {
            builder = builder.bind(Json(permissions));
        }
        bind_field!(data.is_active);

        builder
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| crate::error::conflict_on_unique(e, "Email already exists"))?
            .ok_or_else(|| AppError::NotFound(format!("User with id {} not found", id)))
    }

    pub async fn set_password(&self, id: Uuid, password_hash: &str) -> AppResult<()> {
        sqlx::query("UPDATE users SET password_hash = $1, updated_at = NOW() WHERE id = $2")
            .bind(password_hash)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn touch_last_login(&self, id: Uuid) -> AppResult<()> {
        sqlx::query("UPDATE users SET last_login = NOW() WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn deactivate(&self, id: Uuid) -> AppResult<()> {
        let result =
            sqlx::query("UPDATE users SET is_active = FALSE, updated_at = NOW() WHERE id = $1")
                .bind(id)
                .execute(&self.pool)
                .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("User with id {} not found", id)));
        }
        Ok(())
    }

    /// Distinct non-empty values of `department` or `branch` among active users
    pub async fn distinct(&self, column: DistinctColumn) -> AppResult<Vec<String>> {
        let query = format!(
            "SELECT DISTINCT {0} FROM users WHERE is_active AND {0} IS NOT NULL AND {0} <> '' ORDER BY {0}",
            column.as_str()
        );
        let values: Vec<String> = sqlx::query_scalar(&query).fetch_all(&self.pool).await?;
        Ok(values)
    }
}

#[derive(Debug, Clone, Copy)]
pub enum DistinctColumn {
    Department,
    Branch,
}

impl DistinctColumn {
    fn as_str(&self) -> &'static str {
        match self {
            DistinctColumn::Department => "department",
            DistinctColumn::Branch => "branch",
        }
    }
}
