//! # chainql
//!
//! A fluent, schema-checked query builder for single-table `SELECT` and `DELETE`
//! statements.
//!
//! ## Features
//!
//! - **Checked names**: tables and selected columns are confirmed against a
//!   [`Catalog`] while the chain is built
//! - **Sticky errors**: the first failure is kept on the builder and later calls
//!   become no-ops, so a chain needs no per-call error handling
//! - **Rebuild-on-write**: the statement is re-rendered from canonical state after
//!   every successful step
//! - **Bound values**: predicate values are sent as `$1, $2, ...` parameters, never
//!   spliced into SQL text
//! - **Postgres and SQLite**: async execution via `tokio-postgres`, blocking
//!   execution via `rusqlite` (feature `sqlite`)
//!
//! ## Example
//!
//! ```ignore
//! use chainql::{SchemaCache, SchemaCacheConfig};
//!
//! let (cache, _) = SchemaCache::load_or_refresh(&client, &SchemaCacheConfig::default()).await?;
//! let schema = cache.into_schema();
//!
//! let q = chainql::query(&schema)
//!     .from("users")
//!     .select("age, name")
//!     .eq("age", 25)
//!     .eq("name", "alec")
//!     .order_by("name");
//!
//! // SELECT age, name FROM users WHERE age = '25' AND name = 'alec' ORDER BY name
//! println!("{q}");
//!
//! let people: Vec<(String, String)> = q.fetch_all(&client).await?;
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod exec;
pub mod qb;
pub mod row;
pub mod value;

#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use client::GenericClient;
pub use config::ExecConfig;
pub use error::{ChainError, ChainResult, QbError, QbResult};
pub use qb::{
    BuiltStatement, Predicate, QueryBuilder, QueryState, StatementKind, ValueStyle, delete_from,
    query, render, select_from,
};
pub use row::{FromRow, RowExt};
pub use value::Value;

// Catalog lookups live in chainql-check; re-exported for convenience.
pub use chainql_check::{
    Catalog, CheckClient, CheckError, CheckResult, ColumnInfo, DbSchema, RelationKind,
    SchemaCache, SchemaCacheConfig, SchemaCacheLoad, TableInfo, load_schema_from_db,
};
