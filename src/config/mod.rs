//! Run configuration
//!
//! Configuration arrives as an opaque key/value table (see [`loader`]) and is
//! turned into a [`RunConfig`] exactly once by [`ConfigValidator`]. Nothing
//! downstream sees the raw table; the engine and the job builders only read
//! a validated, immutable `RunConfig`.

use std::collections::HashMap;

pub mod loader;
pub mod validator;

pub use validator::ConfigValidator;

/// Key naming the server prefix of the remote system host
pub const PRIMARY_SERVER: &str = "PRIMARY_SERVER";
/// Key holding the session credential sent as a cookie header
pub const AUTH_COOKIE: &str = "AUTH_COOKIE";
/// Optional host suffix appended to the primary server
pub const BASE_DOMAIN: &str = "BASE_DOMAIN";
/// Optional full base URL; takes precedence over server + domain
pub const BASE_URL: &str = "BASE_URL";

/// Prefix for environment variables that override configuration keys
pub const ENV_PREFIX: &str = "SHEETSYNC_";

const DEFAULT_BASE_DOMAIN: &str = "mercurygate.net";

/// Raw key/value configuration as loaded from disk and the environment
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Settings {
    values: HashMap<String, String>,
}

impl Settings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut settings = Self::new();
        for (key, value) in pairs {
            settings.insert(key, value);
        }
        settings
    }

    /// Insert a key/value pair, trimming both sides
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        self.values
            .insert(key.trim().to_string(), value.trim().to_string());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Apply `SHEETSYNC_<KEY>` overrides from the process environment
    pub fn merge_env(&mut self) {
        self.merge_env_from(std::env::vars());
    }

    /// Apply `SHEETSYNC_<KEY>` overrides from the given variables
    pub fn merge_env_from<I>(&mut self, vars: I)
    where
        I: IntoIterator<Item = (String, String)>,
    {
        for (name, value) in vars {
            if let Some(key) = name.strip_prefix(ENV_PREFIX) {
                if key.is_empty() || value.trim().is_empty() {
                    continue;
                }
                tracing::debug!("Config key {} overridden from environment", key);
                self.insert(key, value);
            }
        }
    }
}

/// Configuration that passed validation for a specific run variant
///
/// Every key in the variant's required list is guaranteed present and
/// non-blank. The struct is never mutated after construction.
#[derive(Debug, Clone)]
pub struct RunConfig {
    primary_server: String,
    auth_cookie: String,
    settings: Settings,
}

impl RunConfig {
    pub(crate) fn new(primary_server: String, auth_cookie: String, settings: Settings) -> Self {
        Self {
            primary_server,
            auth_cookie,
            settings,
        }
    }

    pub fn primary_server(&self) -> &str {
        &self.primary_server
    }

    pub fn auth_cookie(&self) -> &str {
        &self.auth_cookie
    }

    /// Optional value; blank values read as absent
    pub fn get(&self, key: &str) -> Option<&str> {
        self.settings.get(key).filter(|v| !v.is_empty())
    }

    /// Optional value with a fallback
    pub fn get_or<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.get(key).unwrap_or(default)
    }

    /// Value the caller expects to have been validated as required
    pub fn require(&self, key: &str) -> crate::Result<&str> {
        self.get(key).ok_or_else(|| crate::Error::MissingConfigKey {
            key: key.to_string(),
        })
    }

    /// Base URL every endpoint is resolved against
    pub fn base_url(&self) -> String {
        if let Some(url) = self.get(BASE_URL) {
            return url.trim_end_matches('/').to_string();
        }
        format!(
            "https://{}.{}",
            self.primary_server,
            self.get_or(BASE_DOMAIN, DEFAULT_BASE_DOMAIN)
        )
    }
}
