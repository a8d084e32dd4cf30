use crate::client::{CheckClient, RowExt};
use crate::error::{CheckError, CheckResult};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationKind {
    Table,
    PartitionedTable,
    View,
    MaterializedView,
    ForeignTable,
    Other,
}

impl RelationKind {
    fn from_relkind(relkind: i8) -> Self {
        // `relkind` is a Postgres "char"; tokio-postgres exposes it as i8.
        match relkind as u8 as char {
            'r' => Self::Table,
            'p' => Self::PartitionedTable,
            'v' => Self::View,
            'm' => Self::MaterializedView,
            'f' => Self::ForeignTable,
            _ => Self::Other,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnInfo {
    pub name: String,
    pub data_type: String,
    pub not_null: bool,
    pub default_expr: Option<String>,
    pub ordinal: i32,
}

impl ColumnInfo {
    /// Column with a free-form type and no default, mostly useful for hand-built snapshots.
    pub fn new(name: impl Into<String>, data_type: impl Into<String>, ordinal: i32) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.into(),
            not_null: false,
            default_expr: None,
            ordinal,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableInfo {
    pub schema: String,
    pub name: String,
    pub kind: RelationKind,
    pub columns: Vec<ColumnInfo>,
}

impl TableInfo {
    /// Column names ordered by their catalog ordinal.
    pub fn column_names(&self) -> Vec<String> {
        let mut columns: Vec<&ColumnInfo> = self.columns.iter().collect();
        columns.sort_by_key(|c| c.ordinal);
        columns.into_iter().map(|c| c.name.clone()).collect()
    }
}

/// Snapshot of the relations in a set of Postgres schemas.
///
/// `schemas` doubles as the search path used to resolve unqualified table names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DbSchema {
    pub schemas: Vec<String>,
    pub tables: Vec<TableInfo>,
}

impl DbSchema {
    pub fn find_table(&self, schema: &str, table: &str) -> Option<&TableInfo> {
        self.tables
            .iter()
            .find(|t| t.schema == schema && t.name == table)
    }

    /// Resolve `table` or `schema.table` against the snapshot.
    ///
    /// Unqualified names are looked up in `schemas` order, first match wins.
    pub fn resolve_table(&self, name: &str) -> Option<&TableInfo> {
        match name.split_once('.') {
            Some((schema, table)) => self.find_table(schema, table),
            None => self
                .schemas
                .iter()
                .find_map(|schema| self.find_table(schema, name)),
        }
    }
}

pub async fn schema_fingerprint<C: CheckClient + ?Sized>(
    client: &C,
    schemas: &[String],
) -> CheckResult<String> {
    let row = client
        .query_one(
            r#"
SELECT
  md5(
    COALESCE(
      string_agg(
        concat_ws(
          '|',
          n.nspname,
          c.relname,
          c.relkind::text,
          a.attnum::text,
          a.attname,
          pg_catalog.format_type(a.atttypid, a.atttypmod),
          a.attnotnull::text,
          COALESCE(pg_get_expr(ad.adbin, ad.adrelid), '')
        ),
        E'\n' ORDER BY n.nspname, c.relname, a.attnum
      ),
      ''
    )
  ) AS fingerprint
FROM pg_catalog.pg_class c
JOIN pg_catalog.pg_namespace n ON n.oid = c.relnamespace
JOIN pg_catalog.pg_attribute a ON a.attrelid = c.oid
LEFT JOIN pg_catalog.pg_attrdef ad ON ad.adrelid = c.oid AND ad.adnum = a.attnum
WHERE c.relkind IN ('r', 'p', 'v', 'm', 'f')
  AND a.attnum > 0
  AND NOT a.attisdropped
  AND n.nspname = ANY($1::text[])
"#,
            &[&schemas],
        )
        .await?;

    row.try_get_column::<String>("fingerprint")
}

pub async fn load_schema_from_db<C: CheckClient + ?Sized>(
    client: &C,
    schemas: &[String],
) -> CheckResult<(DbSchema, String)> {
    let fingerprint = schema_fingerprint(client, schemas).await?;

    let rows = client
        .query(
            r#"
SELECT
  n.nspname AS schema_name,
  c.relname AS table_name,
  c.relkind AS relkind,
  a.attname AS column_name,
  a.attnum::int4 AS ordinal,
  pg_catalog.format_type(a.atttypid, a.atttypmod) AS data_type,
  a.attnotnull AS not_null,
  pg_get_expr(ad.adbin, ad.adrelid) AS default_expr
FROM pg_catalog.pg_class c
JOIN pg_catalog.pg_namespace n ON n.oid = c.relnamespace
JOIN pg_catalog.pg_attribute a ON a.attrelid = c.oid
LEFT JOIN pg_catalog.pg_attrdef ad ON ad.adrelid = c.oid AND ad.adnum = a.attnum
WHERE c.relkind IN ('r', 'p', 'v', 'm', 'f')
  AND a.attnum > 0
  AND NOT a.attisdropped
  AND n.nspname = ANY($1::text[])
ORDER BY n.nspname, c.relname, a.attnum
"#,
            &[&schemas],
        )
        .await?;

    use std::collections::BTreeMap;
    let mut tables: BTreeMap<(String, String), TableInfo> = BTreeMap::new();

    for row in rows {
        let schema_name: String = row.try_get_column("schema_name")?;
        let table_name: String = row.try_get_column("table_name")?;
        let relkind: i8 = row.try_get_column("relkind")?;

        let column_name: String = row.try_get_column("column_name")?;
        let ordinal: i32 = row.try_get_column("ordinal")?;
        let data_type: String = row.try_get_column("data_type")?;
        let not_null: bool = row.try_get_column("not_null")?;
        let default_expr: Option<String> = row.try_get_column("default_expr")?;

        let key = (schema_name.clone(), table_name.clone());

        let table = tables.entry(key).or_insert_with(|| TableInfo {
            schema: schema_name,
            name: table_name,
            kind: RelationKind::from_relkind(relkind),
            columns: Vec::new(),
        });

        table.columns.push(ColumnInfo {
            name: column_name,
            data_type,
            not_null,
            default_expr,
            ordinal,
        });
    }

    let tables = tables.into_values().collect::<Vec<_>>();

    if tables.is_empty() {
        return Err(CheckError::validation(
            "No tables found in the selected schemas",
        ));
    }

    tracing::debug!(
        target: "chainql.check",
        tables = tables.len(),
        fingerprint = %fingerprint,
        "loaded schema from database"
    );

    Ok((
        DbSchema {
            schemas: schemas.to_vec(),
            tables,
        },
        fingerprint,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot() -> DbSchema {
        DbSchema {
            schemas: vec!["app".to_string(), "public".to_string()],
            tables: vec![
                TableInfo {
                    schema: "public".to_string(),
                    name: "users".to_string(),
                    kind: RelationKind::Table,
                    columns: vec![
                        ColumnInfo::new("name", "text", 3),
                        ColumnInfo::new("id", "bigint", 1),
                        ColumnInfo::new("age", "integer", 2),
                    ],
                },
                TableInfo {
                    schema: "app".to_string(),
                    name: "users".to_string(),
                    kind: RelationKind::View,
                    columns: vec![ColumnInfo::new("id", "bigint", 1)],
                },
            ],
        }
    }

    #[test]
    fn column_names_follow_ordinal() {
        let schema = snapshot();
        let users = schema.find_table("public", "users").unwrap();
        assert_eq!(users.column_names(), vec!["id", "age", "name"]);
    }

    #[test]
    fn unqualified_name_uses_search_order() {
        let schema = snapshot();
        let users = schema.resolve_table("users").unwrap();
        assert_eq!(users.schema, "app");
        assert_eq!(users.kind, RelationKind::View);
    }

    #[test]
    fn qualified_name_bypasses_search_order() {
        let schema = snapshot();
        let users = schema.resolve_table("public.users").unwrap();
        assert_eq!(users.schema, "public");
        assert!(schema.resolve_table("missing.users").is_none());
    }

    #[test]
    fn relkind_mapping() {
        assert_eq!(RelationKind::from_relkind(b'r' as i8), RelationKind::Table);
        assert_eq!(RelationKind::from_relkind(b'm' as i8), RelationKind::MaterializedView);
        assert_eq!(RelationKind::from_relkind(b'x' as i8), RelationKind::Other);
    }
}
