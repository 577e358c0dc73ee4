//! Outbound HTTP seam
//!
//! Every request a script makes goes through a [`Transport`]. Production code uses
//! [`ReqwestTransport`]; the fetch interceptor wraps another transport to route matching
//! requests to virtual endpoints.

use std::sync::Arc;

use async_trait::async_trait;
use indexmap::IndexMap;
use serde_json::Value;
use url::Url;

use crate::error::TransportError;

/// Origin used to resolve relative URLs when only the path matters
pub const PLACEHOLDER_ORIGIN: &str = "http://localhost";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: String,
    pub url: String,
    pub headers: IndexMap<String, String>,
    pub body: Option<String>,
}

impl HttpRequest {
    pub fn new(method: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            method: method.into().to_uppercase(),
            url: url.into(),
            headers: IndexMap::new(),
            body: None,
        }
    }

    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    #[must_use]
    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// URL parsed against [`PLACEHOLDER_ORIGIN`] when relative
    pub fn parsed_url(&self) -> Result<Url, TransportError> {
        Url::parse(&self.url)
            .or_else(|_| Url::parse(PLACEHOLDER_ORIGIN).and_then(|base| base.join(&self.url)))
            .map_err(|e| TransportError::InvalidUrl {
                url: self.url.clone(),
                reason: e.to_string(),
            })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub status_text: String,
    pub headers: IndexMap<String, String>,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            status_text: status_text(status).to_string(),
            headers: IndexMap::new(),
            body: body.into(),
        }
    }

    /// JSON response with `Content-Type` and `Content-Length` set
    pub fn json(status: u16, value: &Value) -> Self {
        let body = value.to_string();
        let mut response = Self::new(status, body);
        response
            .headers
            .insert("content-type".to_string(), "application/json".to_string());
        response
            .headers
            .insert("content-length".to_string(), response.body.len().to_string());
        response
    }

    pub fn ok(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn text(&self) -> &str {
        &self.body
    }

    pub fn json_body(&self) -> Result<Value, serde_json::Error> {
        serde_json::from_str(&self.body)
    }

    /// Case-insensitive header lookup
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn is_json(&self) -> bool {
        self.header("content-type")
            .is_some_and(|ct| ct.to_ascii_lowercase().contains("json"))
    }

    /// Body as JSON when the content type says so, otherwise as a string
    pub fn payload(&self) -> Value {
        if self.is_json() {
            self.json_body()
                .unwrap_or_else(|_| Value::String(self.body.clone()))
        } else {
            Value::String(self.body.clone())
        }
    }
}

/// Canonical reason phrase for `status`, empty when unknown
pub fn status_text(status: u16) -> &'static str {
    reqwest::StatusCode::from_u16(status)
        .ok()
        .and_then(|s| s.canonical_reason())
        .unwrap_or("")
}

#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}

pub type SharedTransport = Arc<dyn Transport>;

/// Transport backed by a `reqwest` client
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
    base_url: Option<Url>,
}

impl ReqwestTransport {
    /// Relative request URLs are resolved against `base_url` when given.
    pub fn new(base_url: Option<Url>) -> Result<Self, TransportError> {
        // Every execution runs on its own short-lived tokio runtime, so pooled
        // connections would outlive the runtime that drives them.
        let client = reqwest::Client::builder()
            .pool_max_idle_per_host(0)
            .build()
            .map_err(|e| TransportError::Request {
                url: String::new(),
                reason: e.to_string(),
            })?;
        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> Option<&Url> {
        self.base_url.as_ref()
    }

    fn resolve(&self, url: &str) -> Result<Url, TransportError> {
        if let Ok(absolute) = Url::parse(url) {
            return Ok(absolute);
        }
        let Some(base) = &self.base_url else {
            return Err(TransportError::InvalidUrl {
                url: url.to_string(),
                reason: "relative URL without a configured base URL".to_string(),
            });
        };
        let joined = format!(
            "{}/{}",
            base.as_str().trim_end_matches('/'),
            url.trim_start_matches('/')
        );
        Url::parse(&joined).map_err(|e| TransportError::InvalidUrl {
            url: url.to_string(),
            reason: e.to_string(),
        })
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let url = self.resolve(&request.url)?;
        let method = reqwest::Method::from_bytes(request.method.as_bytes())
            .map_err(|_| TransportError::InvalidMethod(request.method.clone()))?;

        log::debug!("{method} {url}");
        let mut builder = self.client.request(method, url.clone());
        for (name, value) in &request.headers {
            builder = builder.header(name, value);
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let failed = |e: reqwest::Error| TransportError::Request {
            url: url.to_string(),
            reason: e.to_string(),
        };
        let response = builder.send().await.map_err(failed)?;
        let status = response.status();
        let headers = response
            .headers()
            .iter()
            .map(|(k, v)| (k.as_str().to_string(), String::from_utf8_lossy(v.as_bytes()).into_owned()))
            .collect();
        let body = response.text().await.map_err(failed)?;

        Ok(HttpResponse {
            status: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or("").to_string(),
            headers,
            body,
        })
    }
}

#[cfg(any(test, feature = "test-util"))]
pub use stub::StubTransport;

#[cfg(any(test, feature = "test-util"))]
mod stub {
    use std::sync::Mutex;
    use std::time::Duration;

    use super::{HttpRequest, HttpResponse, Transport, TransportError, async_trait};
    use serde_json::{Value, json};

    #[derive(Debug, Clone)]
    struct Route {
        method: String,
        path: String,
        response: HttpResponse,
        delay: Duration,
    }

    /// Answers requests from canned routes matched on method and path, and records them
    #[derive(Debug, Default)]
    pub struct StubTransport {
        routes: Mutex<Vec<Route>>,
        requests: Mutex<Vec<HttpRequest>>,
    }

    impl StubTransport {
        pub fn new() -> Self {
            Self::default()
        }

        #[must_use]
        pub fn with_json(self, method: &str, path: &str, status: u16, body: Value) -> Self {
            self.with_delayed_json(method, path, status, body, Duration::ZERO)
        }

        #[must_use]
        pub fn with_delayed_json(
            self,
            method: &str,
            path: &str,
            status: u16,
            body: Value,
            delay: Duration,
        ) -> Self {
            self.push(method, path, HttpResponse::json(status, &body), delay);
            self
        }

        #[must_use]
        pub fn with_text(self, method: &str, path: &str, status: u16, body: &str) -> Self {
            let mut response = HttpResponse::new(status, body);
            response
                .headers
                .insert("content-type".to_string(), "text/plain".to_string());
            self.push(method, path, response, Duration::ZERO);
            self
        }

        fn push(&self, method: &str, path: &str, response: HttpResponse, delay: Duration) {
            if let Ok(mut routes) = self.routes.lock() {
                routes.push(Route {
                    method: method.to_uppercase(),
                    path: path.to_string(),
                    response,
                    delay,
                });
            }
        }

        /// Requests received so far, in arrival order
        pub fn requests(&self) -> Vec<HttpRequest> {
            self.requests.lock().map(|r| r.clone()).unwrap_or_default()
        }
    }

    #[async_trait]
    impl Transport for StubTransport {
        async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
            let path = request.parsed_url()?.path().to_string();
            if let Ok(mut requests) = self.requests.lock() {
                requests.push(request.clone());
            }
            let route = self.routes.lock().ok().and_then(|routes| {
                routes
                    .iter()
                    .find(|r| r.method == request.method && r.path == path)
                    .cloned()
            });
            match route {
                Some(route) => {
                    if !route.delay.is_zero() {
                        tokio::time::sleep(route.delay).await;
                    }
                    Ok(route.response)
                }
                None => Ok(HttpResponse::json(404, &json!({ "error": "not found" }))),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_string, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_json_response_headers() {
        let response = HttpResponse::json(200, &json!({ "ok": true }));
        assert!(response.ok());
        assert_eq!(response.status_text, "OK");
        assert_eq!(response.header("Content-Type"), Some("application/json"));
        assert_eq!(response.header("content-length"), Some("11"));
        assert_eq!(response.payload(), json!({ "ok": true }));
    }

    #[test]
    fn test_text_payload() {
        let response = HttpResponse::new(500, "boom");
        assert!(!response.ok());
        assert_eq!(response.status_text, "Internal Server Error");
        assert_eq!(response.payload(), json!("boom"));
    }

    #[test]
    fn test_relative_url_parses_against_placeholder() {
        let request = HttpRequest::new("get", "/users/7?full=1");
        assert_eq!(request.method, "GET");
        let url = request.parsed_url().unwrap();
        assert_eq!(url.path(), "/users/7");
        assert_eq!(url.query(), Some("full=1"));
    }

    #[tokio::test]
    async fn test_reqwest_transport_resolves_base_url() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/users"))
            .and(header("x-trace", "abc"))
            .and(body_string(r#"{"name":"Ada"}"#))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "id": 1 })))
            .mount(&server)
            .await;

        let base = Url::parse(&format!("{}/api/", server.uri())).unwrap();
        let transport = ReqwestTransport::new(Some(base)).unwrap();
        let response = transport
            .send(
                HttpRequest::new("POST", "/users")
                    .with_header("x-trace", "abc")
                    .with_body(r#"{"name":"Ada"}"#),
            )
            .await
            .unwrap();

        assert_eq!(response.status, 201);
        assert_eq!(response.status_text, "Created");
        assert!(response.is_json());
        assert_eq!(response.payload(), json!({ "id": 1 }));
    }

    #[tokio::test]
    async fn test_reqwest_transport_requires_base_for_relative_urls() {
        let transport = ReqwestTransport::new(None).unwrap();
        let err = transport
            .send(HttpRequest::new("GET", "/users"))
            .await
            .unwrap_err();
        assert!(matches!(err, TransportError::InvalidUrl { .. }));
    }

    #[tokio::test]
    async fn test_stub_transport_routes_and_records() {
        let stub = StubTransport::new().with_json("GET", "/users/7", 200, json!({ "id": "7" }));
        let hit = stub.send(HttpRequest::new("GET", "/users/7?x=1")).await.unwrap();
        assert_eq!(hit.payload(), json!({ "id": "7" }));

        let miss = stub.send(HttpRequest::new("POST", "/users/7")).await.unwrap();
        assert_eq!(miss.status, 404);
        assert_eq!(stub.requests().len(), 2);
    }
}
