//! HTTP transport
//!
//! The endpoint code never talks to `reqwest` directly. It builds a URI with
//! [`build_uri`], hands it to a [`Transport`], and interprets the returned
//! [`Response`]. [`HttpTransport`] is the production implementation.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header;
use serde::de::DeserializeOwned;
use serde_json::Value;
use url::Url;

use crate::error::{Error, Result};
use crate::{TOKEN_HEADER, VERSION};

/// Status and raw body of a completed request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    pub body: Vec<u8>,
}

impl Response {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn is_not_found(&self) -> bool {
        self.status == 404
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_slice(&self.body)?)
    }

    /// True for a body that carries no record: nothing at all, `null`, `[]`
    /// or `{}`.
    pub fn is_empty_body(&self) -> bool {
        if self.body.iter().all(u8::is_ascii_whitespace) {
            return true;
        }
        match serde_json::from_slice::<Value>(&self.body) {
            Ok(Value::Null) => true,
            Ok(Value::Array(items)) => items.is_empty(),
            Ok(Value::Object(fields)) => fields.is_empty(),
            _ => false,
        }
    }
}

/// Joins `segments` onto `base`, escaping each one, then appends `query`.
pub fn build_uri(base: &str, segments: &[&str], query: &[(&str, &str)]) -> Result<String> {
    let mut url = Url::parse(base)?;
    {
        let mut path = url
            .path_segments_mut()
            .map_err(|_| Error::Config(format!("base URL cannot carry a path: {}", base)))?;
        path.pop_if_empty();
        path.extend(segments);
    }
    if !query.is_empty() {
        url.query_pairs_mut().extend_pairs(query);
    }
    Ok(url.into())
}

/// The three verbs the ACL endpoints use
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, uri: &str) -> Result<Response>;

    async fn put(&self, uri: &str, body: Option<Value>) -> Result<Response>;

    async fn delete(&self, uri: &str) -> Result<Response>;
}

/// `reqwest` backed transport
#[derive(Debug, Clone)]
pub struct HttpTransport {
    http: reqwest::Client,
}

impl HttpTransport {
    /// Builds a client that sends `token` (when given) on every request and
    /// gives up after `timeout`.
    pub fn new(token: Option<&str>, timeout: Duration) -> Result<Self> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/json"),
        );
        headers.insert(
            header::USER_AGENT,
            header::HeaderValue::from_str(&format!("consul-acl-rust/{}", VERSION))
                .map_err(|e| Error::Config(format!("invalid user agent: {}", e)))?,
        );
        if let Some(token) = token {
            let mut value = header::HeaderValue::from_str(token)
                .map_err(|e| Error::Config(format!("invalid ACL token: {}", e)))?;
            value.set_sensitive(true);
            headers.insert(TOKEN_HEADER, value);
        }

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()?;

        Ok(Self { http })
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<Response> {
        let response = request.send().await?;
        let status = response.status().as_u16();
        let body = response.bytes().await?;
        Ok(Response::new(status, body.to_vec()))
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, uri: &str) -> Result<Response> {
        self.send(self.http.get(uri)).await
    }

    async fn put(&self, uri: &str, body: Option<Value>) -> Result<Response> {
        let mut request = self.http.put(uri);
        if let Some(ref body) = body {
            request = request.json(body);
        }
        self.send(request).await
    }

    async fn delete(&self, uri: &str) -> Result<Response> {
        self.send(self.http.delete(uri)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_uri_joins_segments() {
        let uri = build_uri("http://127.0.0.1:8500/v1/acl", &["token", "self"], &[]).unwrap();
        assert_eq!(uri, "http://127.0.0.1:8500/v1/acl/token/self");
    }

    #[test]
    fn test_build_uri_trailing_slash_base() {
        let uri = build_uri("http://localhost:8500/v1/acl/", &["policies"], &[]).unwrap();
        assert_eq!(uri, "http://localhost:8500/v1/acl/policies");
    }

    #[test]
    fn test_build_uri_escapes_segments() {
        let uri = build_uri("http://localhost:8500/v1/acl", &["policy", "a/b c"], &[]).unwrap();
        assert_eq!(uri, "http://localhost:8500/v1/acl/policy/a%2Fb%20c");
    }

    #[test]
    fn test_build_uri_query() {
        let uri = build_uri("http://localhost:8500/v1/acl", &["list"], &[("dc", "dc2")]).unwrap();
        assert_eq!(uri, "http://localhost:8500/v1/acl/list?dc=dc2");
    }

    #[test]
    fn test_build_uri_rejects_bad_base() {
        assert!(build_uri("not a url", &["list"], &[]).is_err());
        assert!(matches!(
            build_uri("mailto:ops@example.com", &["list"], &[]),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_response_helpers() {
        let ok = Response::new(200, r#"{"ID":"abc"}"#);
        assert!(ok.is_success());
        assert!(!ok.is_empty_body());
        let value: Value = ok.json().unwrap();
        assert_eq!(value["ID"], "abc");

        assert!(Response::new(404, "").is_not_found());
        assert_eq!(Response::new(403, "Permission denied").text(), "Permission denied");
        assert!(!Response::new(500, "").is_success());
    }

    #[test]
    fn test_empty_bodies() {
        for body in ["", "  \n", "null", "[]", "{}"] {
            assert!(Response::new(200, body).is_empty_body(), "{:?}", body);
        }
        assert!(!Response::new(200, r#"[{"ID":"x"}]"#).is_empty_body());
        assert!(!Response::new(200, "true").is_empty_body());
    }
}
