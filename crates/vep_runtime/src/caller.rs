//! Outbound calls made by scripts against the configured real endpoints

use std::sync::Arc;

use futures::future::try_join_all;
use indexmap::IndexMap;
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};
use vep_config::{HttpMethod, RealEndpointDescriptor};

use crate::error::CallError;
use crate::transport::{HttpRequest, SharedTransport};

/// Options accepted by `call` and its method-fixing siblings
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct CallOptions {
    pub method: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub params: Map<String, Value>,
    #[serde(deserialize_with = "null_as_default")]
    pub query: Map<String, Value>,
    #[serde(deserialize_with = "null_as_default")]
    pub headers: IndexMap<String, String>,
    pub body: Option<Value>,
}

impl CallOptions {
    #[must_use]
    pub fn with_method(mut self, method: HttpMethod) -> Self {
        self.method = Some(method.to_string());
        self
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// One entry of `parallel(...)`
#[derive(Debug, Clone, PartialEq)]
pub struct ParallelCall {
    pub endpoint_id: String,
    pub options: CallOptions,
}

/// Options accepted by `fetch`; `body` is sent verbatim
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct FetchOptions {
    pub method: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub headers: IndexMap<String, String>,
    pub body: Option<String>,
}

/// Resolves endpoint ids against a fixed descriptor list and sends requests
/// through the injected transport.
#[derive(Clone)]
pub struct EndpointCaller {
    endpoints: Arc<[RealEndpointDescriptor]>,
    transport: SharedTransport,
}

impl std::fmt::Debug for EndpointCaller {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EndpointCaller")
            .field("endpoints", &self.endpoints.len())
            .finish_non_exhaustive()
    }
}

impl EndpointCaller {
    pub fn new(endpoints: impl Into<Arc<[RealEndpointDescriptor]>>, transport: SharedTransport) -> Self {
        Self {
            endpoints: endpoints.into(),
            transport,
        }
    }

    pub fn endpoints(&self) -> &[RealEndpointDescriptor] {
        &self.endpoints
    }

    fn endpoint(&self, id: &str) -> Result<&RealEndpointDescriptor, CallError> {
        self.endpoints
            .iter()
            .find(|e| e.id == id)
            .ok_or_else(|| CallError::EndpointNotFound(id.to_string()))
    }

    /// Build the request `call(endpoint_id, options)` would send
    pub fn request_for(&self, endpoint_id: &str, options: &CallOptions) -> Result<HttpRequest, CallError> {
        let endpoint = self.endpoint(endpoint_id)?;

        let mut url = vep_transform::http::build_url(&endpoint.url, &Value::Object(options.params.clone()), &Value::Null);
        let query = vep_transform::http::build_query(&Value::Object(options.query.clone()));
        if !query.is_empty() {
            url.push(if url.contains('?') { '&' } else { '?' });
            url.push_str(&query);
        }

        let method = options
            .method
            .clone()
            .unwrap_or_else(|| endpoint.method.to_string());
        let mut request = HttpRequest::new(method, url).with_header("Content-Type", "application/json");
        for (name, value) in endpoint.headers.iter().flatten().chain(&options.headers) {
            set_header(&mut request.headers, name, value);
        }
        if let Some(body) = &options.body {
            request.body = Some(serde_json::to_string(body)?);
        }
        Ok(request)
    }

    /// Call a real endpoint by id; non-2xx responses fail with [`CallError::RequestFailed`]
    pub async fn call(&self, endpoint_id: &str, options: &CallOptions) -> Result<Value, CallError> {
        let request = self.request_for(endpoint_id, options)?;
        let (method, url) = (request.method.clone(), request.url.clone());
        log::debug!("call {endpoint_id}: {method} {url}");

        let response = self.transport.send(request).await?;
        if !response.ok() {
            return Err(CallError::RequestFailed {
                method,
                url,
                status: response.status,
                status_text: response.status_text,
            });
        }
        Ok(response.payload())
    }

    pub async fn get(&self, endpoint_id: &str, options: CallOptions) -> Result<Value, CallError> {
        self.call(endpoint_id, &options.with_method(HttpMethod::Get)).await
    }

    pub async fn post(&self, endpoint_id: &str, options: CallOptions) -> Result<Value, CallError> {
        self.call(endpoint_id, &options.with_method(HttpMethod::Post)).await
    }

    pub async fn put(&self, endpoint_id: &str, options: CallOptions) -> Result<Value, CallError> {
        self.call(endpoint_id, &options.with_method(HttpMethod::Put)).await
    }

    pub async fn delete(&self, endpoint_id: &str, options: CallOptions) -> Result<Value, CallError> {
        self.call(endpoint_id, &options.with_method(HttpMethod::Delete)).await
    }

    /// Run all calls concurrently; results keep the input order.
    pub async fn parallel(&self, calls: &[ParallelCall]) -> Result<Vec<Value>, CallError> {
        try_join_all(
            calls
                .iter()
                .map(|c| self.call(&c.endpoint_id, &c.options)),
        )
        .await
    }

    /// Fetch an arbitrary URL; non-2xx responses fail with [`CallError::FetchFailed`]
    pub async fn fetch(&self, url: &str, options: FetchOptions) -> Result<Value, CallError> {
        let method = options.method.unwrap_or_else(|| "GET".to_string());
        let mut request = HttpRequest::new(method, url);
        request.headers = options.headers;
        request.body = options.body;
        let method = request.method.clone();
        log::debug!("fetch: {method} {url}");

        let response = self.transport.send(request).await?;
        if !response.ok() {
            return Err(CallError::FetchFailed {
                method,
                url: url.to_string(),
                status: response.status,
                status_text: response.status_text,
            });
        }
        Ok(response.payload())
    }
}

/// Insert or replace a header, matching names case-insensitively
fn set_header(headers: &mut IndexMap<String, String>, name: &str, value: &str) {
    if let Some(i) = headers.keys().position(|k| k.eq_ignore_ascii_case(name)) {
        headers.shift_remove_index(i);
    }
    headers.insert(name.to_string(), value.to_string());
}

/// Validate every raw `parallel` entry before any request is sent.
///
/// Each entry needs a string `endpointId`; `options` is optional.
pub fn parse_parallel_calls(raw: &Value) -> Result<Vec<ParallelCall>, CallError> {
    let Some(entries) = raw.as_array() else {
        return Err(CallError::InvalidCall("parallel expects a list of calls".to_string()));
    };
    entries
        .iter()
        .enumerate()
        .map(|(i, entry)| {
            let endpoint_id = entry
                .get("endpointId")
                .and_then(Value::as_str)
                .filter(|id| !id.is_empty())
                .ok_or_else(|| CallError::InvalidCall(format!("parallel call at index {i} is missing endpointId")))?;
            let options = match entry.get("options") {
                None | Some(Value::Null) => CallOptions::default(),
                Some(raw) => serde_json::from_value(raw.clone())
                    .map_err(|e| CallError::InvalidCall(format!("parallel call at index {i} has invalid options: {e}")))?,
            };
            Ok(ParallelCall {
                endpoint_id: endpoint_id.to_string(),
                options,
            })
        })
        .collect()
}
