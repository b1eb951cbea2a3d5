//! Repository layer for database operations

pub mod acquisitions;
pub mod analytics;
pub mod assets;
pub mod maintenance;
pub mod reports;
pub mod settings;
pub mod transfers;
pub mod users;
pub mod vendors;

use sqlx::{Pool, Postgres};

/// Main repository struct holding database connection pool
#[derive(Clone)]
pub struct Repository {
    pub pool: Pool<Postgres>,
    pub users: users::UsersRepository,
    pub assets: assets::AssetsRepository,
    pub maintenance: maintenance::MaintenanceRepository,
    pub transfers: transfers::TransfersRepository,
    pub acquisitions: acquisitions::AcquisitionsRepository,
    pub vendors: vendors::VendorsRepository,
    pub reports: reports::ReportsRepository,
    pub settings: settings::SettingsRepository,
    pub analytics: analytics::AnalyticsRepository,
}

impl Repository {
    /// Create a new repository with the given database pool
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self {
            users: users::UsersRepository::new(pool.clone()),
            assets: assets::AssetsRepository::new(pool.clone()),
            maintenance: maintenance::MaintenanceRepository::new(pool.clone()),
            transfers: transfers::TransfersRepository::new(pool.clone()),
            acquisitions: acquisitions::AcquisitionsRepository::new(pool.clone()),
            vendors: vendors::VendorsRepository::new(pool.clone()),
            reports: reports::ReportsRepository::new(pool.clone()),
            settings: settings::SettingsRepository::new(pool.clone()),
            analytics: analytics::AnalyticsRepository::new(pool.clone()),
            pool,
        }
    }
}

/// WHERE clause assembled from optional filters.
///
/// Every value is bound as text and cast in SQL where the column is not TEXT.
#[derive(Debug, Default)]
pub(crate) struct Filters {
    conditions: Vec<String>,
    params: Vec<String>,
}

impl Filters {
    fn next(&mut self, value: String) -> usize {
        self.params.push(value);
        self.params.len()
    }

    /// `column = value` when the value is present
    pub fn eq<T: ToString>(&mut self, column: &str, value: Option<T>) -> &mut Self {
        if let Some(value) = value {
            let idx = self.next(value.to_string());
            self.conditions.push(format!("{} = ${}", column, idx));
        }
        self
    }

    /// `column = value::uuid` when the value is present
    pub fn eq_uuid(&mut self, column: &str, value: Option<uuid::Uuid>) -> &mut Self {
        if let Some(value) = value {
            let idx = self.next(value.to_string());
            self.conditions.push(format!("{} = ${}::uuid", column, idx));
        }
        self
    }

    /// `column <op> value<cast>` when the value is present
    pub fn compare<T: ToString>(
        &mut self,
        column: &str,
        op: &str,
        cast: &str,
        value: Option<T>,
    ) -> &mut Self {
        if let Some(value) = value {
            let idx = self.next(value.to_string());
            self.conditions.push(format!("{} {} ${}{}", column, op, idx, cast));
        }
        self
    }

    /// Case-insensitive substring match over any of `columns`
    pub fn search(&mut self, columns: &[&str], term: Option<&str>) -> &mut Self {
        if let Some(term) = term.map(str::trim).filter(|t| !t.is_empty()) {
            let idx = self.next(format!("%{}%", term.to_lowercase()));
            let ors: Vec<String> = columns
                .iter()
                .map(|c| format!("LOWER(COALESCE({}, '')) LIKE ${}", c, idx))
                .collect();
            self.conditions.push(format!("({})", ors.join(" OR ")));
        }
        self
    }

    /// Row where `user` appears in any of `columns`
    pub fn participant(&mut self, columns: &[&str], user: Option<uuid::Uuid>) -> &mut Self {
        if let Some(user) = user {
            let idx = self.next(user.to_string());
            let ors: Vec<String> = columns
                .iter()
                .map(|c| format!("{} = ${}::uuid", c, idx))
                .collect();
            self.conditions.push(format!("({})", ors.join(" OR ")));
        }
        self
    }

    /// Row matching any `(column, cast, value)` triple, e.g. `("requested_by", "::uuid", id)`
    pub fn any_eq(&mut self, pairs: &[(&str, &str, String)]) -> &mut Self {
        if pairs.is_empty() {
            return self;
        }
        let mut ors = Vec::with_capacity(pairs.len());
        for (column, cast, value) in pairs {
            let idx = self.next(value.clone());
            ors.push(format!("{} = ${}{}", column, idx, cast));
        }
        self.conditions.push(format!("({})", ors.join(" OR ")));
        self
    }

    /// `column >= value` / `column <= value` on a timestamp column
    pub fn between(
        &mut self,
        column: &str,
        from: Option<chrono::DateTime<chrono::Utc>>,
        to: Option<chrono::DateTime<chrono::Utc>>,
    ) -> &mut Self {
        if let Some(from) = from {
            let idx = self.next(from.to_rfc3339());
            self.conditions.push(format!("{} >= ${}::timestamptz", column, idx));
        }
        if let Some(to) = to {
            let idx = self.next(to.to_rfc3339());
            self.conditions.push(format!("{} <= ${}::timestamptz", column, idx));
        }
        self
    }

    /// Fixed condition with no parameter
    pub fn raw(&mut self, condition: &str) -> &mut Self {
        self.conditions.push(condition.to_string());
        self
    }

    pub fn where_clause(&self) -> String {
        if self.conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", self.conditions.join(" AND "))
        }
    }

    pub fn params(&self) -> &[String] {
        &self.params
    }
}

/// Run `SELECT COUNT(*)` and a paged `SELECT *` for `table` with the same filters
pub(crate) async fn fetch_page<T>(
    pool: &Pool<Postgres>,
    table: &str,
    filters: &Filters,
    order_by: &str,
    limit: i64,
    offset: i64,
) -> Result<(Vec<T>, i64), sqlx::Error>
where
    T: for<'r> sqlx::FromRow<'r, sqlx::postgres::PgRow> + Send + Unpin,
{
    let where_clause = filters.where_clause();

    let count_query = format!("SELECT COUNT(*) FROM {} {}", table, where_clause);
    let mut count_builder = sqlx::query_scalar::<_, i64>(&count_query);
    for param in filters.params() {
        count_builder = count_builder.bind(param);
    }
    let total = count_builder.fetch_one(pool).await?;

    let select_query = format!(
        "SELECT * FROM {} {} ORDER BY {} LIMIT {} OFFSET {}",
        table, where_clause, order_by, limit, offset
    );
    let mut builder = sqlx::query_as::<_, T>(&select_query);
    for param in filters.params() {
        builder = builder.bind(param);
    }
    let rows = builder.fetch_all(pool).await?;

    Ok((rows, total))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filters_number_parameters_in_order() {
        let user = uuid::Uuid::new_v4();
        let mut filters = Filters::default();
        filters
            .eq("status", Some("pending"))
            .eq::<&str>("priority", None)
            .participant(&["requested_by", "assigned_to"], Some(user))
            .raw("is_active = TRUE");

        assert_eq!(
            filters.where_clause(),
            "WHERE status = $1 AND (requested_by = $2::uuid OR assigned_to = $2::uuid) AND is_active = TRUE"
        );
        assert_eq!(filters.params(), &["pending".to_string(), user.to_string()]);
    }

    #[test]
    fn test_empty_filters() {
        let mut filters = Filters::default();
        filters.search(&["name"], Some("   "));
        assert_eq!(filters.where_clause(), "");
    }
}
