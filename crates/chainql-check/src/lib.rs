//! chainql-check
//!
//! Catalog lookups that let the chainql builder confirm table and column names
//! before a statement is assembled.
//!
//! Two catalogs ship with the crate:
//!
//! - [`DbSchema`]: a snapshot of Postgres relations, introspected from `pg_catalog`
//!   and optionally cached in a local directory (default: `./.chainql/`) so later
//!   runs can skip a full refresh while the schema fingerprint is unchanged.
//! - `rusqlite::Connection` (feature `sqlite`): live lookups through `sqlite_master`
//!   and `pragma_table_info`.
//!
//! # Example
//!
//! ```ignore
//! use chainql_check::{Catalog, SchemaCache, SchemaCacheConfig};
//!
//! let (cache, _) = SchemaCache::load_or_refresh(&client, &SchemaCacheConfig::default()).await?;
//! let schema = cache.into_schema();
//! assert!(schema.table_exists("users")?);
//! ```

pub mod catalog;
pub mod client;
pub mod error;
pub mod schema_cache;
pub mod schema_introspect;

#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use catalog::Catalog;
pub use client::{CheckClient, RowExt};
pub use error::{CheckError, CheckResult};
pub use schema_cache::{SchemaCache, SchemaCacheConfig, SchemaCacheLoad};
pub use schema_introspect::{
    ColumnInfo, DbSchema, RelationKind, TableInfo, load_schema_from_db, schema_fingerprint,
};
