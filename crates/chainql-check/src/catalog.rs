//! Synchronous catalog lookups used to validate builder input.
//!
//! A [`Catalog`] answers two questions: does a table exist, and which columns
//! does it have. "Not found" is an ordinary answer (`Ok(false)`); an `Err` means
//! the lookup itself could not be carried out.

use crate::error::{CheckError, CheckResult};
use crate::schema_introspect::DbSchema;
use std::sync::Arc;

/// Read-only access to table and column metadata.
pub trait Catalog {
    /// Whether `table` exists.
    fn table_exists(&self, table: &str) -> CheckResult<bool>;

    /// Column names of an existing table, in catalog order.
    fn columns_of(&self, table: &str) -> CheckResult<Vec<String>>;
}

impl Catalog for DbSchema {
    fn table_exists(&self, table: &str) -> CheckResult<bool> {
        let found = self.resolve_table(table).is_some();
        tracing::debug!(target: "chainql.check", table, found, "table lookup");
        Ok(found)
    }

    fn columns_of(&self, table: &str) -> CheckResult<Vec<String>> {
        let info = self.resolve_table(table).ok_or_else(|| {
            CheckError::validation(format!("table '{table}' is not in the schema snapshot"))
        })?;

        if info.columns.is_empty() {
            return Err(CheckError::validation(format!(
                "table '{}.{}' has no columns in the schema snapshot",
                info.schema, info.name
            )));
        }

        Ok(info.column_names())
    }
}

impl<C: Catalog + ?Sized> Catalog for &C {
    fn table_exists(&self, table: &str) -> CheckResult<bool> {
        (**self).table_exists(table)
    }

    fn columns_of(&self, table: &str) -> CheckResult<Vec<String>> {
        (**self).columns_of(table)
    }
}

impl<C: Catalog + ?Sized> Catalog for Box<C> {
    fn table_exists(&self, table: &str) -> CheckResult<bool> {
        (**self).table_exists(table)
    }

    fn columns_of(&self, table: &str) -> CheckResult<Vec<String>> {
        (**self).columns_of(table)
    }
}

impl<C: Catalog + ?Sized> Catalog for Arc<C> {
    fn table_exists(&self, table: &str) -> CheckResult<bool> {
        (**self).table_exists(table)
    }

    fn columns_of(&self, table: &str) -> CheckResult<Vec<String>> {
        (**self).columns_of(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema_introspect::{ColumnInfo, RelationKind, TableInfo};

    fn snapshot() -> DbSchema {
        DbSchema {
            schemas: vec!["public".to_string()],
            tables: vec![
                TableInfo {
                    schema: "public".to_string(),
                    name: "users".to_string(),
                    kind: RelationKind::Table,
                    columns: vec![
                        ColumnInfo::new("id", "bigint", 1),
                        ColumnInfo::new("age", "integer", 2),
                        ColumnInfo::new("name", "text", 3),
                    ],
                },
                TableInfo {
                    schema: "public".to_string(),
                    name: "broken".to_string(),
                    kind: RelationKind::Other,
                    columns: Vec::new(),
                },
            ],
        }
    }

    #[test]
    fn absent_table_is_not_an_error() {
        let schema = snapshot();
        assert!(schema.table_exists("users").unwrap());
        assert!(!schema.table_exists("ghosts").unwrap());
    }

    #[test]
    fn columns_in_catalog_order() {
        let schema = snapshot();
        assert_eq!(schema.columns_of("users").unwrap(), vec!["id", "age", "name"]);
    }

    #[test]
    fn table_without_columns_is_malformed() {
        let schema = snapshot();
        assert!(matches!(
            schema.columns_of("broken"),
            Err(CheckError::Validation(_))
        ));
    }

    #[test]
    fn shared_catalogs_delegate() {
        let shared: Arc<dyn Catalog> = Arc::new(snapshot());
        assert!(shared.table_exists("public.users").unwrap());
        let boxed: Box<dyn Catalog> = Box::new(snapshot());
        assert_eq!(boxed.columns_of("users").unwrap().len(), 3);
    }
}
