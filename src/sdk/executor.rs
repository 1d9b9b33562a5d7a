//! The SQL execution seam and its pooled implementation.

use crate::error::{SdkError, OBJECT_NOT_EXIST_OR_AUTHORIZED};
use async_trait::async_trait;
use serde_json::{Map, Value};
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};

/// One result row: column name to cell value.
pub type Row = Map<String, Value>;

/// What the SDK needs from a database connection.
#[async_trait]
pub trait Executor: Send + Sync {
    /// Run a statement, returning the number of affected rows.
    async fn exec(&self, sql: &str) -> Result<u64, SdkError>;

    /// Run a statement and collect every row.
    async fn query(&self, sql: &str) -> Result<Vec<Row>, SdkError>;
}

/// [`Executor`] over a `sqlx` connection pool.
#[derive(Clone)]
pub struct PgExecutor {
    pool: PgPool,
}

impl PgExecutor {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, SdkError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;
        Ok(Self::new(pool))
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl Executor for PgExecutor {
    async fn exec(&self, sql: &str) -> Result<u64, SdkError> {
        tracing::debug!(sql = %sql, "exec");
        let done = sqlx::query(sql).execute(&self.pool).await.map_err(classify)?;
        Ok(done.rows_affected())
    }

    async fn query(&self, sql: &str) -> Result<Vec<Row>, SdkError> {
        tracing::debug!(sql = %sql, "query");
        let rows = sqlx::query(sql).fetch_all(&self.pool).await.map_err(classify)?;
        Ok(rows.iter().map(row_to_map).collect())
    }
}

/// Error code the platform attaches to "object does not exist or not authorized".
pub(crate) const OBJECT_NOT_EXIST_CODE: &str = "002003";

/// Only the platform's missing-object error counts; "column does not exist" and similar stay driver errors.
pub(crate) fn is_object_not_exist(code: Option<&str>, message: &str) -> bool {
    code == Some(OBJECT_NOT_EXIST_CODE) || message.contains(OBJECT_NOT_EXIST_OR_AUTHORIZED)
}

/// Separate "object does not exist" failures from other driver errors.
pub(crate) fn classify(err: sqlx::Error) -> SdkError {
    if let sqlx::Error::Database(db) = &err {
        let code = db.code();
        if is_object_not_exist(code.as_deref(), db.message()) {
            return SdkError::ObjectNotExistOrAuthorized(db.message().to_string());
        }
    }
    SdkError::Db(err)
}

fn row_to_map(row: &PgRow) -> Row {
    use sqlx::{Column, Row as _};
    row.columns()
        .iter()
        .map(|col| (col.name().to_string(), cell_to_value(row, col.name())))
        .collect()
}

fn cell_to_value(row: &PgRow, name: &str) -> Value {
    use sqlx::Row as _;
    if let Ok(Some(n)) = row.try_get::<Option<i64>, _>(name) {
        return Value::Number(n.into());
    }
    if let Ok(Some(n)) = row.try_get::<Option<i32>, _>(name) {
        return Value::Number(n.into());
    }
    if let Ok(Some(n)) = row.try_get::<Option<f64>, _>(name) {
        if let Some(n) = serde_json::Number::from_f64(n) {
            return Value::Number(n);
        }
    }
    if let Ok(Some(b)) = row.try_get::<Option<bool>, _>(name) {
        return Value::Bool(b);
    }
    if let Ok(Some(d)) = row.try_get::<Option<chrono::DateTime<chrono::Utc>>, _>(name) {
        return Value::String(d.to_rfc3339());
    }
    if let Ok(Some(d)) = row.try_get::<Option<chrono::NaiveDateTime>, _>(name) {
        return Value::String(d.and_utc().to_rfc3339());
    }
    if let Ok(Some(u)) = row.try_get::<Option<uuid::Uuid>, _>(name) {
        return Value::String(u.to_string());
    }
    if let Ok(Some(s)) = row.try_get::<Option<String>, _>(name) {
        return Value::String(s);
    }
    if let Ok(Some(j)) = row.try_get::<Option<Value>, _>(name) {
        return j;
    }
    Value::Null
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_missing_object_errors_are_not_exist() {
        assert!(is_object_not_exist(
            None,
            "SQL compilation error: Object 'DB.SC.P' does not exist or not authorized."
        ));
        assert!(is_object_not_exist(Some("002003"), "Schema 'DB.SC' is gone"));
        assert!(!is_object_not_exist(Some("42703"), "column \"x\" does not exist"));
        assert!(!is_object_not_exist(None, "relation \"t\" does not exist"));
        assert!(!is_object_not_exist(Some("000904"), "invalid identifier 'NOPE'"));
    }

    #[test]
    fn driver_errors_without_the_platform_message_stay_db_errors() {
        let err = classify(sqlx::Error::RowNotFound);
        assert!(matches!(err, SdkError::Db(_)));
        assert!(!err.is_not_found());
    }
}
