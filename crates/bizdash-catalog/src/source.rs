//! Interchangeable payload transports: a local file or an HTTP endpoint.

use std::path::PathBuf;
use std::time::Duration;

use reqwest::Client;
use serde_json::Value;

use bizdash_core::AppConfig;

use crate::error::LoadError;
use crate::payload::parse_payload;
use crate::retry::retry_with_backoff;

/// Where a catalog payload comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    File(PathBuf),
    Http(String),
}

impl Source {
    /// `http://` and `https://` prefixes select HTTP; anything else is a path.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        let lowered = trimmed.to_ascii_lowercase();
        if lowered.starts_with("http://") || lowered.starts_with("https://") {
            Source::Http(trimmed.to_owned())
        } else {
            Source::File(PathBuf::from(trimmed))
        }
    }
}

impl std::fmt::Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Source::File(path) => write!(f, "file:{}", path.display()),
            Source::Http(url) => write!(f, "{url}"),
        }
    }
}

/// Fetches payloads from any [`Source`].
///
/// HTTP fetches honour the configured timeout and `User-Agent` and retry
/// transient failures with exponential backoff.
#[derive(Debug, Clone)]
pub struct SourceClient {
    client: Client,
    max_retries: u32,
    backoff_base_secs: u64,
}

impl SourceClient {
    /// # Errors
    ///
    /// Returns [`LoadError::Http`] if the underlying `reqwest::Client` cannot
    /// be constructed.
    pub fn new(
        timeout_secs: u64,
        user_agent: &str,
        max_retries: u32,
        backoff_base_secs: u64,
    ) -> Result<Self, LoadError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;
        Ok(Self {
            client,
            max_retries,
            backoff_base_secs,
        })
    }

    /// # Errors
    ///
    /// Returns [`LoadError::Http`] if the HTTP client cannot be constructed.
    pub fn from_app_config(config: &AppConfig) -> Result<Self, LoadError> {
        Self::new(
            config.request_timeout_secs,
            &config.user_agent,
            config.max_retries,
            config.retry_backoff_base_secs,
        )
    }

    /// Reads and parses the payload at `source`.
    ///
    /// # Errors
    ///
    /// - [`LoadError::Io`]: the file cannot be read.
    /// - [`LoadError::Http`]: network failure after all retries.
    /// - [`LoadError::UnexpectedStatus`]: non-2xx response (429/5xx after all retries).
    /// - [`LoadError::Deserialize`]: the body is not valid JSON.
    pub async fn fetch(&self, source: &Source) -> Result<Value, LoadError> {
        match source {
            Source::File(path) => {
                let bytes = tokio::fs::read(path).await.map_err(|e| LoadError::Io {
                    path: path.display().to_string(),
                    source: e,
                })?;
                tracing::debug!(path = %path.display(), bytes = bytes.len(), "read payload file");
                parse_payload(&bytes, &path.display().to_string())
            }
            Source::Http(url) => self.fetch_url(url).await,
        }
    }

    async fn fetch_url(&self, url: &str) -> Result<Value, LoadError> {
        retry_with_backoff(self.max_retries, self.backoff_base_secs, || async move {
            let response = self
                .client
                .get(url)
                .header(reqwest::header::ACCEPT, "application/json")
                .header(reqwest::header::CACHE_CONTROL, "no-cache")
                .send()
                .await?;

            let status = response.status();
            if !status.is_success() {
                return Err(LoadError::UnexpectedStatus {
                    status: status.as_u16(),
                    url: url.to_owned(),
                });
            }

            let body = response.bytes().await?;
            tracing::debug!(url, bytes = body.len(), "fetched payload");
            parse_payload(&body, url)
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_selects_http_for_urls() {
        assert_eq!(
            Source::parse("http://localhost:8000/businesses"),
            Source::Http("http://localhost:8000/businesses".to_owned())
        );
        assert_eq!(
            Source::parse(" HTTPS://example.com/data.json "),
            Source::Http("HTTPS://example.com/data.json".to_owned())
        );
    }

    #[test]
    fn parse_selects_file_for_paths() {
        assert_eq!(
            Source::parse("./businesses.json"),
            Source::File(PathBuf::from("./businesses.json"))
        );
        assert_eq!(
            Source::parse("httpdocs/businesses.json"),
            Source::File(PathBuf::from("httpdocs/businesses.json"))
        );
    }

    #[test]
    fn display_marks_file_sources() {
        assert_eq!(
            Source::File(PathBuf::from("data/b.json")).to_string(),
            "file:data/b.json"
        );
    }
}
