//! Blocking SQLite execution for [`QueryBuilder`].
//!
//! `rusqlite::Connection` also implements [`Catalog`], so one connection can
//! validate and run the same chain.

use crate::config::ExecConfig;
use crate::error::{ChainError, ChainResult};
use crate::exec::prepare;
use crate::qb::QueryBuilder;
use chainql_check::Catalog;
use rusqlite::{Connection, Row, params_from_iter};

impl<C: Catalog + ?Sized> QueryBuilder<'_, C> {
    /// Run on SQLite and map every row with `map`.
    pub fn query_sqlite<T, F>(&self, conn: &Connection, map: F) -> ChainResult<Vec<T>>
    where
        F: FnMut(&Row<'_>) -> rusqlite::Result<T>,
    {
        let built = prepare(self, &ExecConfig::default())?;
        let mut stmt = conn.prepare(&built.sql)?;
        let rows = stmt
            .query_map(params_from_iter(built.params.iter()), map)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Run on SQLite and map the first row; no rows is [`ChainError::NotFound`].
    pub fn query_row_sqlite<T, F>(&self, conn: &Connection, map: F) -> ChainResult<T>
    where
        F: FnOnce(&Row<'_>) -> rusqlite::Result<T>,
    {
        let built = prepare(self, &ExecConfig::default())?;
        let mut stmt = conn.prepare(&built.sql)?;
        let mut rows = stmt.query(params_from_iter(built.params.iter()))?;
        match rows.next()? {
            Some(row) => Ok(map(row)?),
            None => Err(ChainError::not_found("Expected one row, got none")),
        }
    }

    /// Run a statement on SQLite and return the affected row count.
    pub fn execute_sqlite(&self, conn: &Connection) -> ChainResult<usize> {
        let built = prepare(self, &ExecConfig::default())?;
        let affected = conn.execute(&built.sql, params_from_iter(built.params.iter()))?;
        Ok(affected)
    }
}
