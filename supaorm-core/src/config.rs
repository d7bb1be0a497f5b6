//! Client configuration

use crate::{Client, Error, Result};
use std::fmt;
use std::time::Duration;

/// Path of the PostgREST surface below the project URL
pub const DEFAULT_REST_PATH: &str = "/rest/v1";

/// Environment variable holding the project URL
pub const URL_ENV: &str = "SUPABASE_URL";

/// Environment variable holding the API key
pub const KEY_ENV: &str = "SUPABASE_KEY";

/// Connection parameters shared by every request a [`Client`] sends
#[derive(Clone)]
pub struct ClientConfig {
    /// Project URL, stored verbatim
    pub base_url: String,
    /// Sent as `apikey` and as a bearer token
    pub api_key: String,
    /// Prefix of table and rpc endpoints; empty for a bare PostgREST server
    pub rest_path: String,
    /// Postgres schema selected through `Accept-Profile` / `Content-Profile`
    pub schema: Option<String>,
    /// Per-request timeout applied by the transport
    pub timeout: Option<Duration>,
    /// Extra headers attached to every request
    pub default_headers: Vec<(String, String)>,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            rest_path: DEFAULT_REST_PATH.to_string(),
            schema: None,
            timeout: None,
            default_headers: Vec::new(),
        }
    }

    /// Read `SUPABASE_URL` and `SUPABASE_KEY` from the environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let base_url = lookup(URL_ENV)
            .filter(|v| !v.is_empty())
            .ok_or_else(|| Error::config(format!("{} is not set", URL_ENV)))?;
        let api_key = lookup(KEY_ENV)
            .filter(|v| !v.is_empty())
            .ok_or_else(|| Error::config(format!("{} is not set", KEY_ENV)))?;
        Ok(Self::new(base_url, api_key))
    }

    /// `{base_url}{rest_path}` without a doubled slash
    pub fn rest_url(&self) -> String {
        let base = self.base_url.trim_end_matches('/');
        let path = self.rest_path.trim_matches('/');
        if path.is_empty() {
            base.to_string()
        } else {
            format!("{}/{}", base, path)
        }
    }

    pub fn table_url(&self, table: &str) -> String {
        format!("{}/{}", self.rest_url(), table)
    }

    pub fn rpc_url(&self, procedure: &str) -> String {
        format!("{}/rpc/{}", self.rest_url(), procedure)
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .field("rest_path", &self.rest_path)
            .field("schema", &self.schema)
            .field("timeout", &self.timeout)
            .field("default_headers", &self.default_headers)
            .finish()
    }
}

/// Fluent builder for a configured [`Client`]
///
/// # Examples
/// ```
/// use std::time::Duration;
/// use supaorm_core::Client;
///
/// let client = Client::builder("http://localhost:3000", "anon-key")
///     .rest_path("")
///     .schema("api")
///     .timeout(Duration::from_secs(10))
///     .build()
///     .unwrap();
/// assert_eq!(client.config().rpc_url("ping"), "http://localhost:3000/rpc/ping");
/// ```
#[derive(Debug, Clone)]
pub struct ClientBuilder {
    config: ClientConfig,
}

impl ClientBuilder {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self::from_config(ClientConfig::new(base_url, api_key))
    }

    pub fn from_config(config: ClientConfig) -> Self {
        Self { config }
    }

    pub fn rest_path(mut self, path: impl Into<String>) -> Self {
        self.config.rest_path = path.into();
        self
    }

    pub fn schema(mut self, schema: impl Into<String>) -> Self {
        self.config.schema = Some(schema.into());
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = Some(timeout);
        self
    }

    /// Attach a header to every request sent by the client
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.config.default_headers.push((key.into(), value.into()));
        self
    }

    pub fn build(self) -> Result<Client> {
        Client::from_config(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_endpoints() {
        let config = ClientConfig::new("https://project.supabase.co", "key");
        assert_eq!(config.rest_url(), "https://project.supabase.co/rest/v1");
        assert_eq!(
            config.table_url("users"),
            "https://project.supabase.co/rest/v1/users"
        );
        assert_eq!(
            config.rpc_url("get_user_by_id"),
            "https://project.supabase.co/rest/v1/rpc/get_user_by_id"
        );
    }

    #[test]
    fn test_trailing_slash_and_empty_rest_path() {
        let mut config = ClientConfig::new("http://localhost:3000/", "key");
        config.rest_path = String::new();
        assert_eq!(config.table_url("users"), "http://localhost:3000/users");
        assert_eq!(config.rpc_url("execute_sql"), "http://localhost:3000/rpc/execute_sql");
    }

    #[test]
    fn test_from_lookup() {
        let vars: HashMap<&str, &str> = [
            (URL_ENV, "https://project.supabase.co"),
            (KEY_ENV, "service-key"),
        ]
        .into_iter()
        .collect();

        let config = ClientConfig::from_lookup(|name| vars.get(name).map(|v| v.to_string())).unwrap();
        assert_eq!(config.base_url, "https://project.supabase.co");
        assert_eq!(config.api_key, "service-key");
        assert_eq!(config.rest_path, DEFAULT_REST_PATH);
    }

    #[test]
    fn test_from_lookup_missing_key() {
        let err = ClientConfig::from_lookup(|name| {
            (name == URL_ENV).then(|| "https://project.supabase.co".to_string())
        })
        .unwrap_err();
        assert!(matches!(err, Error::Config { .. }));
        assert_eq!(err.to_string(), "Configuration error: SUPABASE_KEY is not set");
    }

    #[test]
    fn test_debug_redacts_key() {
        let config = ClientConfig::new("https://project.supabase.co", "secret-key");
        let debug = format!("{:?}", config);
        assert!(!debug.contains("secret-key"));
        assert!(debug.contains("<redacted>"));
    }

    #[test]
    fn test_builder_sets_fields() {
        let builder = ClientBuilder::new("http://localhost", "key")
            .schema("api")
            .timeout(Duration::from_secs(5))
            .header("X-Client-Info", "supaorm");
        assert_eq!(builder.config.schema.as_deref(), Some("api"));
        assert_eq!(builder.config.timeout, Some(Duration::from_secs(5)));
        assert_eq!(
            builder.config.default_headers,
            vec![("X-Client-Info".to_string(), "supaorm".to_string())]
        );
    }
}
