//! Postgres execution for [`QueryBuilder`].
//!
//! Every terminal call first checks the builder: a captured error (or a missing
//! table) is returned as [`ChainError::Builder`] before the client is touched.

use crate::client::GenericClient;
use crate::config::ExecConfig;
use crate::error::{ChainError, ChainResult};
use crate::qb::{BuiltStatement, QueryBuilder};
use crate::row::FromRow;
use chainql_check::Catalog;
use std::future::Future;
use tokio_postgres::Row;

fn truncate_sql_bytes(sql: &str, max_bytes: usize) -> &str {
    if sql.len() <= max_bytes {
        return sql;
    }
    let mut end = max_bytes;
    while end > 0 && !sql.is_char_boundary(end) {
        end -= 1;
    }
    &sql[..end]
}

/// Build the statement for execution and log it.
pub(crate) fn prepare<C: Catalog + ?Sized>(
    qb: &QueryBuilder<'_, C>,
    config: &ExecConfig,
) -> ChainResult<BuiltStatement> {
    let built = qb.build()?;

    if config.log_sql {
        let sql = match config.max_logged_sql_len {
            Some(max) if built.sql.len() > max => {
                format!("{}...", truncate_sql_bytes(&built.sql, max))
            }
            _ => built.sql.clone(),
        };
        tracing::debug!(
            target: "chainql.sql",
            kind = ?built.kind,
            params = built.params.len(),
            sql = %sql,
            "executing"
        );
    }

    Ok(built)
}

async fn with_timeout<T>(
    config: &ExecConfig,
    fut: impl Future<Output = ChainResult<T>>,
) -> ChainResult<T> {
    match config.query_timeout {
        Some(limit) => tokio::time::timeout(limit, fut)
            .await
            .map_err(|_| ChainError::Timeout(limit))?,
        None => fut.await,
    }
}

impl<C: Catalog + ?Sized> QueryBuilder<'_, C> {
    /// Execute and return all rows.
    pub async fn query(&self, conn: &impl GenericClient) -> ChainResult<Vec<Row>> {
        self.query_with(conn, &ExecConfig::default()).await
    }

    /// Execute with an explicit [`ExecConfig`] and return all rows.
    pub async fn query_with(
        &self,
        conn: &impl GenericClient,
        config: &ExecConfig,
    ) -> ChainResult<Vec<Row>> {
        let built = prepare(self, config)?;
        with_timeout(config, conn.query(&built.sql, &built.params_ref())).await
    }

    /// Execute and return the first row; no rows is [`ChainError::NotFound`].
    pub async fn query_one(&self, conn: &impl GenericClient) -> ChainResult<Row> {
        self.query_one_with(conn, &ExecConfig::default()).await
    }

    pub async fn query_one_with(
        &self,
        conn: &impl GenericClient,
        config: &ExecConfig,
    ) -> ChainResult<Row> {
        let built = prepare(self, config)?;
        with_timeout(config, conn.query_one(&built.sql, &built.params_ref())).await
    }

    /// Execute and return the first row, if any.
    pub async fn query_opt(&self, conn: &impl GenericClient) -> ChainResult<Option<Row>> {
        self.query_opt_with(conn, &ExecConfig::default()).await
    }

    pub async fn query_opt_with(
        &self,
        conn: &impl GenericClient,
        config: &ExecConfig,
    ) -> ChainResult<Option<Row>> {
        let built = prepare(self, config)?;
        with_timeout(config, conn.query_opt(&built.sql, &built.params_ref())).await
    }

    /// Execute and map all rows to `T`.
    pub async fn fetch_all<T: FromRow>(&self, conn: &impl GenericClient) -> ChainResult<Vec<T>> {
        let rows = self.query(conn).await?;
        rows.iter().map(T::from_row).collect()
    }

    /// Execute and map the first row to `T`.
    pub async fn fetch_one<T: FromRow>(&self, conn: &impl GenericClient) -> ChainResult<T> {
        let row = self.query_one(conn).await?;
        T::from_row(&row)
    }

    /// Execute and map the first row, if any, to `T`.
    pub async fn fetch_opt<T: FromRow>(&self, conn: &impl GenericClient) -> ChainResult<Option<T>> {
        let row = self.query_opt(conn).await?;
        row.as_ref().map(T::from_row).transpose()
    }

    /// Execute and return the affected row count (for `DELETE`).
    pub async fn execute(&self, conn: &impl GenericClient) -> ChainResult<u64> {
        self.execute_with(conn, &ExecConfig::default()).await
    }

    pub async fn execute_with(
        &self,
        conn: &impl GenericClient,
        config: &ExecConfig,
    ) -> ChainResult<u64> {
        let built = prepare(self, config)?;
        with_timeout(config, conn.execute(&built.sql, &built.params_ref())).await
    }
}
