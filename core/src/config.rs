//! Client configuration.

/// Environment variable naming the API base URL.
pub const BASE_URL_ENV: &str = "EXPENSE_API_URL";

/// Where the API listens when nothing else is configured.
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:5000";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub base_url: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }
}

impl ClientConfig {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim().trim_end_matches('/').to_string(),
        }
    }

    /// Read `EXPENSE_API_URL`, falling back to the default when unset or blank.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        match lookup(BASE_URL_ENV) {
            Some(url) if !url.trim().is_empty() => Self::new(&url),
            _ => Self::default(),
        }
    }
}
