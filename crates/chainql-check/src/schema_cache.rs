use crate::client::CheckClient;
use crate::error::{CheckError, CheckResult};
use crate::schema_introspect::{DbSchema, load_schema_from_db, schema_fingerprint};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const CACHE_VERSION: u32 = 1;

#[derive(Debug, Clone)]
pub struct SchemaCacheConfig {
    /// Directory to store cache files (default: `./.chainql`).
    pub cache_dir: PathBuf,
    /// Cache file name inside `cache_dir` (default: `schema.json`).
    pub cache_file_name: String,
    /// Which PostgreSQL schemas to introspect (default: `["public"]`).
    pub schemas: Vec<String>,
}

impl Default for SchemaCacheConfig {
    fn default() -> Self {
        let cache_dir = std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(".chainql");

        Self {
            cache_dir,
            cache_file_name: "schema.json".to_string(),
            schemas: vec!["public".to_string()],
        }
    }
}

impl SchemaCacheConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cache_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cache_dir = dir.into();
        self
    }

    pub fn cache_file_name(mut self, name: impl Into<String>) -> Self {
        self.cache_file_name = name.into();
        self
    }

    pub fn schemas<I, S>(mut self, schemas: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.schemas = schemas.into_iter().map(Into::into).collect();
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaCacheLoad {
    /// Loaded from local cache (fingerprint unchanged).
    CacheHit,
    /// Loaded from database (cache missing/invalid or fingerprint changed).
    Refreshed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaCache {
    pub version: u32,
    pub retrieved_at: DateTime<Utc>,
    pub schemas: Vec<String>,
    pub fingerprint: String,
    pub schema: DbSchema,
}

impl SchemaCache {
    pub fn cache_path(config: &SchemaCacheConfig) -> PathBuf {
        config.cache_dir.join(&config.cache_file_name)
    }

    /// Reuse the on-disk snapshot while the database fingerprint matches it,
    /// otherwise introspect again and rewrite the file.
    pub async fn load_or_refresh<C: CheckClient + ?Sized>(
        client: &C,
        config: &SchemaCacheConfig,
    ) -> CheckResult<(Self, SchemaCacheLoad)> {
        let path = Self::cache_path(config);

        let cached = match read_cache_file(&path) {
            Ok(cached) if cached.matches(config) => Some(cached),
            Ok(_) => None,
            Err(err) => {
                tracing::debug!(
                    target: "chainql.check",
                    path = %path.display(),
                    error = %err,
                    "no usable schema cache"
                );
                None
            }
        };

        if let Some(cached) = cached {
            let fingerprint = schema_fingerprint(client, &config.schemas).await?;
            if fingerprint == cached.fingerprint {
                tracing::debug!(target: "chainql.check", path = %path.display(), "schema cache hit");
                return Ok((cached, SchemaCacheLoad::CacheHit));
            }
        }

        let refreshed = Self::refresh(client, config).await?;
        Ok((refreshed, SchemaCacheLoad::Refreshed))
    }

    /// Introspect the configured schemas and overwrite the cache file.
    pub async fn refresh<C: CheckClient + ?Sized>(
        client: &C,
        config: &SchemaCacheConfig,
    ) -> CheckResult<Self> {
        let (schema, fingerprint) = load_schema_from_db(client, &config.schemas).await?;
        let cache = SchemaCache {
            version: CACHE_VERSION,
            retrieved_at: Utc::now(),
            schemas: config.schemas.clone(),
            fingerprint,
            schema,
        };

        let path = Self::cache_path(config);
        write_cache_file(&path, &cache)?;
        tracing::debug!(
            target: "chainql.check",
            path = %path.display(),
            tables = cache.schema.tables.len(),
            "schema cache refreshed"
        );
        Ok(cache)
    }

    /// Whether this snapshot was taken with the same format and schema list.
    fn matches(&self, config: &SchemaCacheConfig) -> bool {
        self.version == CACHE_VERSION && self.schemas == config.schemas
    }

    /// The cached snapshot, usable directly as a [`crate::Catalog`].
    pub fn into_schema(self) -> DbSchema {
        self.schema
    }
}

fn io_error(path: &Path, err: std::io::Error) -> CheckError {
    CheckError::Other(format!("{}: {err}", path.display()))
}

fn read_cache_file(path: &Path) -> CheckResult<SchemaCache> {
    let data = std::fs::read(path).map_err(|e| io_error(path, e))?;
    serde_json::from_slice(&data)
        .map_err(|e| CheckError::Serialization(format!("invalid schema cache: {e}")))
}

// Written to a sibling temp file, then renamed into place.
fn write_cache_file(path: &Path, cache: &SchemaCache) -> CheckResult<()> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir).map_err(|e| io_error(dir, e))?;
    }

    let data = serde_json::to_vec_pretty(cache)
        .map_err(|e| CheckError::Serialization(format!("cannot encode schema cache: {e}")))?;

    let tmp = path.with_extension("json.tmp");
    std::fs::write(&tmp, data).map_err(|e| io_error(&tmp, e))?;
    std::fs::rename(&tmp, path).map_err(|e| io_error(path, e))
}
