use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    /// Collector artifact on disk; also what `GET /businesses` serves.
    pub data_path: PathBuf,
    /// Catalog source as given: a path or an `http(s)://` URL.
    /// `None` means "read `data_path`".
    pub source: Option<String>,
    pub request_timeout_secs: u64,
    pub user_agent: String,
    pub max_retries: u32,
    pub retry_backoff_base_secs: u64,
}

impl AppConfig {
    /// The catalog source string, falling back to the data file path.
    #[must_use]
    pub fn source_or_data_path(&self) -> String {
        self.source
            .clone()
            .unwrap_or_else(|| self.data_path.display().to_string())
    }

    /// Whether logs are written with ANSI colors (development only).
    #[must_use]
    pub fn ansi_logs(&self) -> bool {
        self.env == Environment::Development
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("data_path", &self.data_path)
            .field("source", &self.source.as_deref().map(redact_query))
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("user_agent", &self.user_agent)
            .field("max_retries", &self.max_retries)
            .field("retry_backoff_base_secs", &self.retry_backoff_base_secs)
            .finish()
    }
}

/// Endpoint URLs may carry keys in their query string; keep only the part
/// before `?` in debug output.
fn redact_query(source: &str) -> String {
    match source.split_once('?') {
        Some((base, _)) => format!("{base}?[redacted]"),
        None => source.to_string(),
    }
}
