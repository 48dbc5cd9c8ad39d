//! Client configuration.

use std::path::PathBuf;

use url::Url;

/// Fallback API base when `HAULOG_API_URL` is unset or unparsable.
const DEFAULT_API_URL: &str = "http://127.0.0.1:8000/api/";

/// Configuration for the Haulog client.
#[derive(Clone, Debug)]
pub struct ClientConfig {
    /// Base URL of the backend API. Always carries a trailing slash so
    /// relative endpoint paths join underneath it.
    pub api_url: Url,
    /// Per-request timeout in seconds.
    pub request_timeout_secs: u64,
    /// Passphrase sealing persisted tokens at rest.
    pub store_key: String,
    /// Explicit session file path; `None` means the platform default.
    pub store_path: Option<PathBuf>,
}

impl ClientConfig {
    /// Reads configuration from environment variables with sensible defaults.
    ///
    /// | Variable                      | Default                       |
    /// |-------------------------------|-------------------------------|
    /// | `HAULOG_API_URL`              | `http://127.0.0.1:8000/api/`  |
    /// | `HAULOG_REQUEST_TIMEOUT_SECS` | `30`                          |
    /// | `HAULOG_STORE_KEY`            | dev key, change in production |
    /// | `HAULOG_STORE_PATH`           | `<data_dir>/haulog/session.json` |
    pub fn from_env() -> Self {
        let api_url = std::env::var("HAULOG_API_URL")
            .ok()
            .and_then(|raw| Self::parse_api_url(&raw))
            .unwrap_or_else(|| {
                Url::parse(DEFAULT_API_URL).expect("default API URL is valid")
            });
        let request_timeout_secs = std::env::var("HAULOG_REQUEST_TIMEOUT_SECS")
            .ok()
            .and_then(|raw| raw.parse().ok())
            .unwrap_or(30);
        let store_key = std::env::var("HAULOG_STORE_KEY")
            .unwrap_or_else(|_| "haulog-default-dev-key-change-in-production".into());
        let store_path = std::env::var("HAULOG_STORE_PATH").ok().map(PathBuf::from);
        Self {
            api_url,
            request_timeout_secs,
            store_key,
            store_path,
        }
    }

    /// Parse a base URL, normalizing to a trailing slash so `Url::join`
    /// appends endpoint paths instead of replacing the last segment.
    fn parse_api_url(raw: &str) -> Option<Url> {
        let normalized = if raw.ends_with('/') {
            raw.to_string()
        } else {
            format!("{raw}/")
        };
        Url::parse(&normalized).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_url_gains_trailing_slash() {
        let url = ClientConfig::parse_api_url("http://example.com/api").unwrap();
        assert_eq!(url.as_str(), "http://example.com/api/");
        assert_eq!(
            url.join("auth/login/").unwrap().as_str(),
            "http://example.com/api/auth/login/"
        );
    }

    #[test]
    fn existing_trailing_slash_is_kept() {
        let url = ClientConfig::parse_api_url("http://example.com/api/").unwrap();
        assert_eq!(url.as_str(), "http://example.com/api/");
    }

    #[test]
    fn garbage_url_is_rejected() {
        assert!(ClientConfig::parse_api_url("not a url").is_none());
    }
}
