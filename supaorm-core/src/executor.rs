//! Request dispatch over the HTTP transport

use crate::{ClientConfig, Error, Result};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, CONTENT_RANGE};
use std::fmt::{self, Display};
use std::str::FromStr;
use tracing::{debug, warn};

/// HTTP methods a query can be sent with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Method {
    #[default]
    Get,
    Post,
    Patch,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
        }
    }

    /// Whether the request writes, which selects `Content-Profile` over
    /// `Accept-Profile` for schema selection
    pub fn is_write(&self) -> bool {
        !matches!(self, Method::Get)
    }
}

impl Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Method {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(Method::Get),
            "POST" => Ok(Method::Post),
            "PATCH" => Ok(Method::Patch),
            "DELETE" => Ok(Method::Delete),
            _ => Err(Error::unsupported_method(s)),
        }
    }
}

impl From<Method> for reqwest::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Patch => reqwest::Method::PATCH,
            Method::Delete => reqwest::Method::DELETE,
        }
    }
}

/// A fully serialized request, ready for the transport
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedRequest {
    pub method: Method,
    pub url: String,
    pub query: Vec<(String, String)>,
    pub headers: Vec<(String, String)>,
    pub body: Option<serde_json::Value>,
}

impl PreparedRequest {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            query: Vec::new(),
            headers: Vec::new(),
            body: None,
        }
    }

    /// First query value stored under `key`
    pub fn query_value(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn query_values<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.query
            .iter()
            .filter(move |(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Header value, matched case-insensitively
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Body and count metadata of a successful response
#[derive(Debug, Clone, PartialEq)]
pub struct RawResponse {
    pub status: u16,
    /// `Content-Range` as sent by the server, e.g. `0-9/120`
    pub content_range: Option<String>,
    pub body: Vec<u8>,
}

impl RawResponse {
    /// Total row count from `Content-Range`; `None` when the server sent
    /// no header or an unknown total (`0-9/*`)
    pub fn total_count(&self) -> Option<u64> {
        self.content_range
            .as_deref()
            .and_then(|range| range.rsplit_once('/'))
            .and_then(|(_, total)| total.trim().parse().ok())
    }
}

fn insert_header(headers: &mut HeaderMap, name: &str, value: &str) -> Result<()> {
    let header_name =
        HeaderName::from_bytes(name.as_bytes()).map_err(|_| Error::invalid_header(name))?;
    let header_value = HeaderValue::from_str(value).map_err(|_| Error::invalid_header(name))?;
    headers.insert(header_name, header_value);
    Ok(())
}

/// Merge every header layer into one map; later layers replace earlier
/// values for the same name
fn request_headers(config: &ClientConfig, request: &PreparedRequest) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();
    insert_header(&mut headers, "apikey", &config.api_key)?;
    insert_header(
        &mut headers,
        AUTHORIZATION.as_str(),
        &format!("Bearer {}", config.api_key),
    )?;
    for name in ["apikey", AUTHORIZATION.as_str()] {
        if let Some(value) = headers.get_mut(name) {
            value.set_sensitive(true);
        }
    }

    if let Some(schema) = &config.schema {
        let profile = if request.method.is_write() {
            "Content-Profile"
        } else {
            "Accept-Profile"
        };
        insert_header(&mut headers, profile, schema)?;
    }

    for (key, value) in config.default_headers.iter().chain(&request.headers) {
        insert_header(&mut headers, key, value)?;
    }

    Ok(headers)
}

/// Send one request and return the body of a successful response
pub(crate) async fn dispatch(
    http: &reqwest::Client,
    config: &ClientConfig,
    request: PreparedRequest,
) -> Result<RawResponse> {
    debug!(
        method = %request.method,
        url = %request.url,
        params = request.query.len(),
        "dispatching request"
    );

    let mut builder = http
        .request(request.method.into(), &request.url)
        .headers(request_headers(config, &request)?);

    if !request.query.is_empty() {
        builder = builder.query(&request.query);
    }

    if let Some(body) = &request.body {
        builder = builder.json(body);
    }

    if let Some(timeout) = config.timeout {
        builder = builder.timeout(timeout);
    }

    let response = builder.send().await?;
    let status = response.status();
    let content_range = response
        .headers()
        .get(CONTENT_RANGE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let body = response.bytes().await?;

    debug!(status = status.as_u16(), bytes = body.len(), "response received");

    if !status.is_success() {
        let text = String::from_utf8_lossy(&body).into_owned();
        warn!(status = status.as_u16(), url = %request.url, "request failed: {}", text);
        return Err(Error::api(status.as_u16(), text));
    }

    Ok(RawResponse {
        status: status.as_u16(),
        content_range,
        body: body.to_vec(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_from_str() {
        assert_eq!("GET".parse::<Method>().unwrap(), Method::Get);
        assert_eq!("patch".parse::<Method>().unwrap(), Method::Patch);
        assert_eq!("Delete".parse::<Method>().unwrap(), Method::Delete);
    }

    #[test]
    fn test_unsupported_method() {
        let err = "PUT".parse::<Method>().unwrap_err();
        assert!(matches!(err, Error::UnsupportedMethod { .. }));
        assert_eq!(err.to_string(), "Unsupported HTTP method: PUT");
    }

    #[test]
    fn test_method_defaults_to_get() {
        assert_eq!(Method::default(), Method::Get);
        assert!(!Method::Get.is_write());
        assert!(Method::Delete.is_write());
        assert_eq!(reqwest::Method::from(Method::Patch), reqwest::Method::PATCH);
    }

    #[test]
    fn test_prepared_request_lookup() {
        let mut request = PreparedRequest::new(Method::Get, "http://localhost/rest/v1/users");
        request.query.push(("and".to_string(), "age.gt.18".to_string()));
        request.query.push(("and".to_string(), "name.eq.John".to_string()));
        request.headers.push(("Range".to_string(), "0-9".to_string()));

        assert_eq!(request.query_value("and"), Some("age.gt.18"));
        assert_eq!(request.query_values("and").count(), 2);
        assert_eq!(request.header("range"), Some("0-9"));
        assert_eq!(request.header("Prefer"), None);
    }

    #[test]
    fn test_request_headers_later_layers_replace_earlier() {
        let mut config = ClientConfig::new("http://localhost", "anon-key");
        config.schema = Some("api".to_string());
        config.default_headers.push(("X-Client-Info".to_string(), "supaorm".to_string()));

        let mut request = PreparedRequest::new(Method::Get, "http://localhost/rest/v1/users");
        request.headers.push(("authorization".to_string(), "Bearer user-jwt".to_string()));
        request.headers.push(("X-Client-Info".to_string(), "custom".to_string()));

        let headers = request_headers(&config, &request).unwrap();
        assert_eq!(headers.get_all(AUTHORIZATION).iter().count(), 1);
        assert_eq!(headers[AUTHORIZATION], "Bearer user-jwt");
        assert_eq!(headers["apikey"], "anon-key");
        assert_eq!(headers["accept-profile"], "api");
        assert_eq!(headers.get_all("x-client-info").iter().count(), 1);
        assert_eq!(headers["x-client-info"], "custom");
    }

    #[test]
    fn test_request_headers_rejects_invalid_name() {
        let config = ClientConfig::new("http://localhost", "key");
        let mut request = PreparedRequest::new(Method::Get, "http://localhost/rest/v1/users");
        request.headers.push(("bad header".to_string(), "x".to_string()));

        let err = request_headers(&config, &request).unwrap_err();
        assert!(matches!(err, Error::InvalidHeader { .. }));
    }

    #[test]
    fn test_total_count() {
        let mut response = RawResponse {
            status: 206,
            content_range: Some("0-9/120".to_string()),
            body: Vec::new(),
        };
        assert_eq!(response.total_count(), Some(120));

        response.content_range = Some("0-9/*".to_string());
        assert_eq!(response.total_count(), None);

        response.content_range = None;
        assert_eq!(response.total_count(), None);
    }
}
