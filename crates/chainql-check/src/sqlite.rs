//! Live catalog lookups against a SQLite connection.

use crate::catalog::Catalog;
use crate::error::{CheckError, CheckResult};
use rusqlite::{Connection, OptionalExtension, params};

impl Catalog for Connection {
    fn table_exists(&self, table: &str) -> CheckResult<bool> {
        let found = self
            .query_row(
                "SELECT name FROM sqlite_master WHERE type = 'table' AND name = ?1",
                params![table],
                |_| Ok(()),
            )
            .optional()?
            .is_some();

        tracing::debug!(target: "chainql.check", table, found, "sqlite table lookup");
        Ok(found)
    }

    fn columns_of(&self, table: &str) -> CheckResult<Vec<String>> {
        let mut stmt = self.prepare("SELECT name FROM pragma_table_info(?1) ORDER BY cid")?;
        let columns = stmt
            .query_map(params![table], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;

        if columns.is_empty() {
            return Err(CheckError::validation(format!(
                "table '{table}' reported no columns"
            )));
        }

        Ok(columns)
    }
}
