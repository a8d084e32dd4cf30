use std::time::Duration;

/// Configuration for executing a built query.
#[derive(Debug, Clone)]
pub struct ExecConfig {
    /// Query timeout duration (Postgres only).
    pub query_timeout: Option<Duration>,
    /// Whether to emit the statement on the `chainql.sql` tracing target.
    pub log_sql: bool,
    /// Truncate logged SQL to this many bytes. `None` means no truncation.
    pub max_logged_sql_len: Option<usize>,
}

impl Default for ExecConfig {
    fn default() -> Self {
        Self {
            query_timeout: None,
            log_sql: true,
            max_logged_sql_len: Some(200),
        }
    }
}

impl ExecConfig {
    /// Create a new configuration with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set query timeout.
    pub fn timeout(mut self, duration: Duration) -> Self {
        self.query_timeout = Some(duration);
        self
    }

    /// Enable or disable statement logging.
    pub fn log_sql(mut self, enabled: bool) -> Self {
        self.log_sql = enabled;
        self
    }

    /// Set maximum SQL length to log.
    pub fn max_logged_sql_len(mut self, len: usize) -> Self {
        self.max_logged_sql_len = Some(len);
        self
    }

    /// Disable SQL truncation in logs.
    pub fn no_truncate(mut self) -> Self {
        self.max_logged_sql_len = None;
        self
    }
}
