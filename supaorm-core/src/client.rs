//! REST client and query entry points

use crate::executor::{self, Method, PreparedRequest, RawResponse};
use crate::{ClientBuilder, ClientConfig, QueryBuilder, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use tracing::debug;

/// Handle to one PostgREST deployment
///
/// Cloning is cheap: clones share the configuration and the underlying
/// connection pool.
#[derive(Debug, Clone)]
pub struct Client {
    config: Arc<ClientConfig>,
    http: reqwest::Client,
}

impl Client {
    /// Create a client for `base_url` authenticated with `api_key`
    ///
    /// The URL is stored as given; a malformed URL only surfaces as a
    /// transport error once a request is sent.
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            config: Arc::new(ClientConfig::new(base_url, api_key)),
            http: reqwest::Client::new(),
        }
    }

    pub fn builder(base_url: impl Into<String>, api_key: impl Into<String>) -> ClientBuilder {
        ClientBuilder::new(base_url, api_key)
    }

    pub fn from_config(config: ClientConfig) -> Result<Self> {
        let mut http = reqwest::Client::builder();
        if let Some(timeout) = config.timeout {
            http = http.timeout(timeout);
        }

        Ok(Self {
            config: Arc::new(config),
            http: http.build()?,
        })
    }

    /// Build a client from `SUPABASE_URL` and `SUPABASE_KEY`
    pub fn from_env() -> Result<Self> {
        Self::from_config(ClientConfig::from_env()?)
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    pub fn api_key(&self) -> &str {
        &self.config.api_key
    }

    /// Start a query against `table`
    ///
    /// # Examples
    /// ```
    /// use supaorm_core::Client;
    ///
    /// let client = Client::new("https://project.supabase.co", "anon-key");
    /// let query = client.from("users").select(("id", "name")).where_("age", "gt", 18);
    /// assert_eq!(query.build_url(), "/users?select=id,name&age.gt.18");
    /// ```
    pub fn from(&self, table: &str) -> QueryBuilder {
        QueryBuilder::new(table).with_client(self.clone())
    }

    /// Alias for [`Client::from`]
    pub fn table(&self, table: &str) -> QueryBuilder {
        self.from(table)
    }

    /// Call a stored procedure with `params` as its JSON argument object
    pub async fn rpc<P, T>(&self, procedure: &str, params: &P) -> Result<T>
    where
        P: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let mut request = PreparedRequest::new(Method::Post, self.config.rpc_url(procedure));
        request.body = Some(serde_json::to_value(params)?);

        debug!(procedure, "calling stored procedure");
        let response = self.send(request).await?;
        Ok(serde_json::from_slice(&response.body)?)
    }

    /// Send an already prepared request, returning the raw response
    pub async fn send(&self, request: PreparedRequest) -> Result<RawResponse> {
        executor::dispatch(&self.http, &self.config, request).await
    }
}
