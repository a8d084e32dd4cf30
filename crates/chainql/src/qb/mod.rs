//! Schema-checked query builder.
//!
//! A [`QueryBuilder`] accumulates a single-table `SELECT` (or `DELETE`) through
//! chained calls. Table and selected column names are confirmed against a
//! [`Catalog`] as they are added. The first failure is captured on the builder
//! and every later call becomes a no-op, so a chain can be written without
//! checking each step:
//!
//! ```ignore
//! let q = chainql::query(&schema)
//!     .from("users")
//!     .select("age, name")
//!     .eq("age", 25)
//!     .order_by("name")
//!     .limit(10);
//!
//! if let Some(err) = q.error() {
//!     eprintln!("invalid query: {err}");
//! }
//! let rows = q.query(&client).await?;
//! ```
//!
//! The statement is re-rendered after every successful step. Values are never
//! spliced into the executed SQL; they are bound as `$1, $2, ...`.

mod render;
mod state;

pub use render::{ValueStyle, render};
pub use state::{Predicate, QueryState, StatementKind};

use crate::error::{QbError, QbResult};
use crate::value::Value;
use chainql_check::Catalog;
use std::fmt;
use tokio_postgres::types::ToSql;

/// Start a builder that validates names against `catalog`.
pub fn query<C: Catalog + ?Sized>(catalog: &C) -> QueryBuilder<'_, C> {
    QueryBuilder::new(catalog)
}

/// Shorthand for `query(catalog).from(table)`.
pub fn select_from<'c, C: Catalog + ?Sized>(catalog: &'c C, table: &str) -> QueryBuilder<'c, C> {
    QueryBuilder::new(catalog).from(table)
}

/// Shorthand for `query(catalog).delete(table)`.
pub fn delete_from<'c, C: Catalog + ?Sized>(catalog: &'c C, table: &str) -> QueryBuilder<'c, C> {
    QueryBuilder::new(catalog).delete(table)
}

/// Fluent builder with a sticky error slot.
pub struct QueryBuilder<'c, C: Catalog + ?Sized> {
    catalog: &'c C,
    state: QueryState,
    statement: String,
    error: Option<QbError>,
}

impl<'c, C: Catalog + ?Sized> QueryBuilder<'c, C> {
    pub fn new(catalog: &'c C) -> Self {
        let state = QueryState::default();
        let statement = render(&state, ValueStyle::Placeholder);
        Self {
            catalog,
            state,
            statement,
            error: None,
        }
    }

    /// Run one chain step.
    ///
    /// `f` must validate before it mutates: on `Err` the state is left untouched.
    fn step<F>(mut self, operation: &'static str, f: F) -> Self
    where
        F: FnOnce(&C, &mut QueryState) -> QbResult<()>,
    {
        if let Some(ref err) = self.error {
            tracing::trace!(
                target: "chainql.builder",
                operation,
                error = %err,
                "skipped, builder already failed"
            );
            return self;
        }

        match f(self.catalog, &mut self.state) {
            Ok(()) => {
                self.statement = render(&self.state, ValueStyle::Placeholder);
                tracing::debug!(
                    target: "chainql.builder",
                    operation,
                    table = %self.state.table,
                    "step applied"
                );
            }
            Err(err) => {
                tracing::warn!(
                    target: "chainql.builder",
                    operation,
                    error = %err,
                    "builder failed"
                );
                self.error = Some(err);
            }
        }
        self
    }

    // ==================== Table ====================

    /// Target `table` for a `SELECT`. The catalog must know it.
    ///
    /// Switches a `DELETE` chain back to `SELECT`. When the table changes, an
    /// explicit column selection must also exist on the new table.
    pub fn from(self, table: &str) -> Self {
        self.step("from", |catalog, state| {
            confirm_table(catalog, table)?;
            if state.table != table && !state.selected_columns.is_empty() {
                confirm_columns(catalog, table, &state.selected_columns)?;
            }
            state.table = table.to_string();
            state.kind = StatementKind::Select;
            Ok(())
        })
    }

    /// Switch to a `DELETE` against `table`, keeping any predicates.
    ///
    /// Without predicates the statement renders `WHERE 1=0` unless
    /// [`allow_delete_all`](Self::allow_delete_all) is set.
    pub fn delete(self, table: &str) -> Self {
        self.step("delete", |catalog, state| {
            confirm_table(catalog, table)?;
            state.table = table.to_string();
            state.kind = StatementKind::Delete;
            Ok(())
        })
    }

    /// Allow a `DELETE` with no predicates to remove every row.
    pub fn allow_delete_all(self, allow: bool) -> Self {
        self.step("allow_delete_all", |_, state| {
            state.allow_delete_all = allow;
            Ok(())
        })
    }

    // ==================== Columns ====================

    /// Select a comma-separated column list.
    ///
    /// `"*"` and an empty (or blank) string both mean every column. Each name is
    /// trimmed and must exist on the current table.
    pub fn select(self, columns: &str) -> Self {
        let trimmed = columns.trim();
        let requested = if trimmed.is_empty() || trimmed == "*" {
            Vec::new()
        } else {
            trimmed.split(',').map(|c| c.trim().to_string()).collect()
        };
        self.select_list(requested)
    }

    /// Array form of [`select`](Self::select). An empty slice or `["*"]` means every column.
    pub fn select_cols(self, columns: &[&str]) -> Self {
        let requested = match columns {
            [] => Vec::new(),
            [only] if only.trim() == "*" => Vec::new(),
            _ => columns.iter().map(|c| c.trim().to_string()).collect(),
        };
        self.select_list(requested)
    }

    fn select_list(self, requested: Vec<String>) -> Self {
        self.step("select", move |catalog, state| {
            if requested.is_empty() {
                state.selected_columns.clear();
                return Ok(());
            }
            if state.table.is_empty() {
                return Err(QbError::NoTable {
                    operation: "select",
                });
            }

            confirm_columns(catalog, &state.table, &requested)?;
            state.selected_columns = requested;
            Ok(())
        })
    }

    // ==================== Filtering & ordering ====================

    /// Add `column = value`. Predicates are joined with `AND` in call order.
    ///
    /// The column is not checked against the catalog.
    pub fn eq(self, column: &str, value: impl Into<Value>) -> Self {
        let value = value.into();
        self.step("eq", move |_, state| {
            state.predicates.push(Predicate {
                column: column.to_string(),
                value,
            });
            Ok(())
        })
    }

    /// Order by a single column (not checked against the catalog). An empty name clears it.
    ///
    /// A `DELETE` does not render `ORDER BY`; the value is kept for a later `from`.
    pub fn order_by(self, column: &str) -> Self {
        self.step("order_by", |_, state| {
            warn_ignored_by_delete(state, "order_by");
            state.order_by = (!column.is_empty()).then(|| column.to_string());
            Ok(())
        })
    }

    /// Limit the row count. `0` removes the limit; repeated calls replace it.
    ///
    /// A `DELETE` does not render `LIMIT` and removes every matching row.
    pub fn limit(self, n: u64) -> Self {
        self.step("limit", |_, state| {
            warn_ignored_by_delete(state, "limit");
            state.limit = (n > 0).then_some(n);
            Ok(())
        })
    }

    // ==================== Inspection ====================

    /// The captured error, if any step failed.
    pub fn error(&self) -> Option<&QbError> {
        self.error.as_ref()
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }

    pub fn state(&self) -> &QueryState {
        &self.state
    }

    pub fn kind(&self) -> StatementKind {
        self.state.kind
    }

    pub fn table(&self) -> &str {
        &self.state.table
    }

    pub fn selected_columns(&self) -> &[String] {
        &self.state.selected_columns
    }

    pub fn predicates(&self) -> &[Predicate] {
        &self.state.predicates
    }

    pub fn order_by_column(&self) -> Option<&str> {
        self.state.order_by.as_deref()
    }

    pub fn limit_value(&self) -> Option<u64> {
        self.state.limit
    }

    /// The rendered statement with `$n` placeholders.
    pub fn statement(&self) -> &str {
        &self.statement
    }

    /// Values bound to the placeholders, in order.
    pub fn params(&self) -> impl Iterator<Item = &Value> {
        self.state.predicates.iter().map(|p| &p.value)
    }

    /// The statement with values inlined as escaped literals. For logs only.
    pub fn to_preview_sql(&self) -> String {
        render(&self.state, ValueStyle::Literal)
    }

    /// Check the builder is executable and snapshot it.
    pub fn build(&self) -> QbResult<BuiltStatement> {
        if let Some(ref err) = self.error {
            return Err(err.clone());
        }
        if self.state.table.is_empty() {
            return Err(QbError::NoTable {
                operation: "execute",
            });
        }
        Ok(BuiltStatement {
            kind: self.state.kind,
            sql: self.statement.clone(),
            params: self.params().cloned().collect(),
        })
    }

    /// Collapse the chain into its statement or its error.
    pub fn into_result(self) -> QbResult<BuiltStatement> {
        self.build()
    }
}

fn confirm_table<C: Catalog + ?Sized>(catalog: &C, table: &str) -> QbResult<()> {
    match catalog.table_exists(table) {
        Ok(true) => Ok(()),
        Ok(false) => Err(QbError::table_not_found(table)),
        Err(err) => Err(QbError::schema_query_failed(err)),
    }
}

/// Every name in `columns` must be a column of `table`.
fn confirm_columns<C: Catalog + ?Sized>(
    catalog: &C,
    table: &str,
    columns: &[String],
) -> QbResult<()> {
    let available = catalog
        .columns_of(table)
        .map_err(QbError::schema_query_failed)?;

    match columns.iter().find(|c| !available.contains(*c)) {
        Some(missing) => Err(QbError::ColumnNotFound {
            column: missing.clone(),
            table: table.to_string(),
            available,
        }),
        None => Ok(()),
    }
}

fn warn_ignored_by_delete(state: &QueryState, operation: &'static str) {
    if state.kind == StatementKind::Delete {
        tracing::warn!(
            target: "chainql.builder",
            operation,
            table = %state.table,
            "DELETE ignores this clause"
        );
    }
}

impl<C: Catalog + ?Sized> Clone for QueryBuilder<'_, C> {
    fn clone(&self) -> Self {
        Self {
            catalog: self.catalog,
            state: self.state.clone(),
            statement: self.statement.clone(),
            error: self.error.clone(),
        }
    }
}

impl<C: Catalog + ?Sized> fmt::Debug for QueryBuilder<'_, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryBuilder")
            .field("state", &self.state)
            .field("statement", &self.statement)
            .field("error", &self.error)
            .finish_non_exhaustive()
    }
}

impl<C: Catalog + ?Sized> fmt::Display for QueryBuilder<'_, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_preview_sql())
    }
}

/// An executable statement: SQL text plus the values for its placeholders.
#[derive(Debug, Clone, PartialEq)]
pub struct BuiltStatement {
    pub kind: StatementKind,
    pub sql: String,
    pub params: Vec<Value>,
}

impl BuiltStatement {
    /// Get parameters as references for tokio-postgres.
    pub fn params_ref(&self) -> Vec<&(dyn ToSql + Sync)> {
        self.params.iter().map(|p| p as &(dyn ToSql + Sync)).collect()
    }
}
