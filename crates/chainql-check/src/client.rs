//! Database client trait for chainql-check
//!
//! Schema introspection only needs to read rows, so this trait stays minimal
//! and keeps chainql-check independent of the builder crate.

use crate::error::{CheckError, CheckResult};
use tokio_postgres::Row;
use tokio_postgres::types::ToSql;

/// A trait for types that can run read-only PostgreSQL queries.
///
/// Implemented for `tokio_postgres::Client` and `tokio_postgres::Transaction`.
#[async_trait::async_trait]
pub trait CheckClient: Sync {
    /// Execute a query and return all rows.
    async fn query(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> CheckResult<Vec<Row>>;

    /// Execute a query and return exactly one row.
    async fn query_one(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> CheckResult<Row>;
}

#[async_trait::async_trait]
impl CheckClient for tokio_postgres::Client {
    async fn query(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> CheckResult<Vec<Row>> {
        tokio_postgres::Client::query(self, sql, params)
            .await
            .map_err(CheckError::from)
    }

    async fn query_one(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> CheckResult<Row> {
        tokio_postgres::Client::query_one(self, sql, params)
            .await
            .map_err(CheckError::from)
    }
}

#[async_trait::async_trait]
impl<'a> CheckClient for tokio_postgres::Transaction<'a> {
    async fn query(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> CheckResult<Vec<Row>> {
        tokio_postgres::Transaction::query(self, sql, params)
            .await
            .map_err(CheckError::from)
    }

    async fn query_one(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> CheckResult<Row> {
        tokio_postgres::Transaction::query_one(self, sql, params)
            .await
            .map_err(CheckError::from)
    }
}

/// Extension trait for accessing row columns with better error handling.
pub trait RowExt {
    /// Get a column value by name, returning a CheckError on failure.
    fn try_get_column<'a, T>(&'a self, column: &str) -> CheckResult<T>
    where
        T: tokio_postgres::types::FromSql<'a>;
}

impl RowExt for Row {
    fn try_get_column<'a, T>(&'a self, column: &str) -> CheckResult<T>
    where
        T: tokio_postgres::types::FromSql<'a>,
    {
        self.try_get(column)
            .map_err(|e| CheckError::decode(column, e.to_string()))
    }
}
