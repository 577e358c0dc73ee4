//! Routing outbound requests to virtual endpoints
//!
//! [`FetchInterceptor`] is a [`Transport`] placed in front of another one. Requests whose path
//! matches a registered virtual endpoint are executed locally and answered with a JSON
//! response; everything else is passed through untouched.
//!
//! Matching scans virtual endpoints in registration order and the first match wins. Patterns
//! are anchored to the whole path. A `:name` token (letters, digits and `_`) captures one
//! non-empty run of characters without `/`; everything else is compared literally, so
//! `/files/:id.json` matches `/files/7.json` with `id = "7"`. Methods are not part of matching.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, LazyLock, PoisonError, RwLock, Weak};

use async_trait::async_trait;
use indexmap::IndexMap;
use regex::Regex;
use serde_json::json;
use vep_config::{RealEndpointDescriptor, VirtualEndpointDefinition};
use vep_runtime::{
    ContextInput, HttpRequest, HttpResponse, SharedTransport, Transport, TransportError,
};

use crate::executor::{ExecutionResult, VirtualEndpointExecutor};

static PARAM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r":([A-Za-z0-9_]+)").expect("valid path param regex"));

/// Params captured from `path` when it matches `pattern`
pub fn match_path(pattern: &str, path: &str) -> Option<IndexMap<String, String>> {
    let mut names = Vec::new();
    let mut source = String::from("^");
    let mut literal_start = 0;
    for caps in PARAM.captures_iter(pattern) {
        let (Some(token), Some(name)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        source.push_str(&regex::escape(&pattern[literal_start..token.start()]));
        source.push_str("([^/]+)");
        names.push(name.as_str().to_string());
        literal_start = token.end();
    }
    source.push_str(&regex::escape(&pattern[literal_start..]));
    source.push('$');

    let matcher = Regex::new(&source).ok()?;
    let caps = matcher.captures(path)?;
    Some(
        names
            .into_iter()
            .zip(caps.iter().skip(1))
            .filter_map(|(name, value)| Some((name, value?.as_str().to_string())))
            .collect(),
    )
}

#[derive(Debug, Clone, Default)]
struct Routes {
    virtuals: Arc<[VirtualEndpointDefinition]>,
    reals: Arc<[RealEndpointDescriptor]>,
}

pub struct FetchInterceptor {
    inner: SharedTransport,
    /// Handed to executions so nested calls route through this interceptor too
    this: Weak<FetchInterceptor>,
    routes: RwLock<Routes>,
    installed: AtomicBool,
}

impl std::fmt::Debug for FetchInterceptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let routes = self.snapshot();
        f.debug_struct("FetchInterceptor")
            .field("installed", &self.is_installed())
            .field(
                "virtuals",
                &routes.virtuals.iter().map(|v| &v.path).collect::<Vec<_>>(),
            )
            .field("reals", &routes.reals.len())
            .finish_non_exhaustive()
    }
}

impl FetchInterceptor {
    /// A passthrough interceptor over `inner`; nothing is routed until [`Self::install`]
    pub fn new(inner: SharedTransport) -> Arc<Self> {
        Arc::new_cyclic(|this| Self {
            inner,
            this: this.clone(),
            routes: RwLock::new(Routes::default()),
            installed: AtomicBool::new(false),
        })
    }

    /// Start routing. Calling it again has no effect.
    pub fn install(&self) {
        if !self.installed.swap(true, Ordering::SeqCst) {
            log::debug!("Fetch interceptor installed");
        }
    }

    pub fn is_installed(&self) -> bool {
        self.installed.load(Ordering::SeqCst)
    }

    /// Replace both registration lists
    pub fn update(
        &self,
        virtuals: impl Into<Arc<[VirtualEndpointDefinition]>>,
        reals: impl Into<Arc<[RealEndpointDescriptor]>>,
    ) {
        let routes = Routes {
            virtuals: virtuals.into(),
            reals: reals.into(),
        };
        log::debug!(
            "Routing {} virtual endpoint(s) over {} real endpoint(s)",
            routes.virtuals.len(),
            routes.reals.len()
        );
        *self.routes.write().unwrap_or_else(PoisonError::into_inner) = routes;
    }

    /// Back to passthrough with no registrations. No-op unless installed.
    pub fn remove(&self) {
        if self.installed.swap(false, Ordering::SeqCst) {
            *self.routes.write().unwrap_or_else(PoisonError::into_inner) = Routes::default();
            log::debug!("Fetch interceptor removed");
        }
    }

    pub fn virtual_endpoints(&self) -> Arc<[VirtualEndpointDefinition]> {
        self.snapshot().virtuals
    }

    /// First virtual endpoint whose pattern matches `path`, with its captured params
    pub fn route(&self, path: &str) -> Option<(VirtualEndpointDefinition, IndexMap<String, String>)> {
        self.snapshot().virtuals.iter().find_map(|definition| {
            match_path(&definition.path, path).map(|params| (definition.clone(), params))
        })
    }

    fn snapshot(&self) -> Routes {
        self.routes
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn nested_transport(&self) -> SharedTransport {
        match self.this.upgrade() {
            Some(this) => this as SharedTransport,
            None => self.inner.clone(),
        }
    }

    async fn dispatch(
        &self,
        definition: VirtualEndpointDefinition,
        params: IndexMap<String, String>,
        request: &HttpRequest,
        url: &url::Url,
    ) -> HttpResponse {
        let input = ContextInput {
            params,
            query: url.query_pairs().into_owned().collect(),
            body: request
                .body
                .as_deref()
                .and_then(|body| serde_json::from_str(body).ok())
                .unwrap_or_else(|| json!({})),
            headers: request.headers.clone(),
        };

        log::info!(
            "{} {} -> virtual endpoint {}",
            request.method,
            url.path(),
            definition.id
        );
        let reals = self.snapshot().reals;
        let executor = VirtualEndpointExecutor::new(definition, reals, self.nested_transport());
        response_for(executor.execute(input).await)
    }
}

/// HTTP shape of an execution result: 200 with `data`, or 500 with `{ error }`
pub fn response_for(result: ExecutionResult) -> HttpResponse {
    match result {
        ExecutionResult::Success { data, .. } => HttpResponse::json(200, &data),
        ExecutionResult::Failure { error, .. } => {
            HttpResponse::json(500, &json!({ "error": error }))
        }
    }
}

#[async_trait]
impl Transport for FetchInterceptor {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        if !self.is_installed() {
            return self.inner.send(request).await;
        }
        let Ok(url) = request.parsed_url() else {
            return self.inner.send(request).await;
        };

        match self.route(url.path()) {
            Some((definition, params)) => Ok(self.dispatch(definition, params, &request, &url).await),
            None => self.inner.send(request).await,
        }
    }
}

static GLOBAL: RwLock<Option<Arc<FetchInterceptor>>> = RwLock::new(None);

/// Install the process-wide interceptor over `inner`.
///
/// When one is already installed its registrations are replaced and it is returned as is.
pub fn initialize_fetch_interceptor(
    inner: SharedTransport,
    virtuals: impl Into<Arc<[VirtualEndpointDefinition]>>,
    reals: impl Into<Arc<[RealEndpointDescriptor]>>,
) -> Arc<FetchInterceptor> {
    let mut global = GLOBAL.write().unwrap_or_else(PoisonError::into_inner);
    if let Some(existing) = global.as_ref() {
        existing.update(virtuals, reals);
        return existing.clone();
    }

    let interceptor = FetchInterceptor::new(inner);
    interceptor.update(virtuals, reals);
    interceptor.install();
    *global = Some(interceptor.clone());
    interceptor
}

/// Replace the registrations of the process-wide interceptor; `false` when none is installed
pub fn update_virtual_endpoints(
    virtuals: impl Into<Arc<[VirtualEndpointDefinition]>>,
    reals: impl Into<Arc<[RealEndpointDescriptor]>>,
) -> bool {
    let global = GLOBAL.read().unwrap_or_else(PoisonError::into_inner);
    match global.as_ref() {
        Some(interceptor) => {
            interceptor.update(virtuals, reals);
            true
        }
        None => false,
    }
}

/// Uninstall the process-wide interceptor, if any
pub fn cleanup_fetch_interceptor() {
    let taken = GLOBAL
        .write()
        .unwrap_or_else(PoisonError::into_inner)
        .take();
    if let Some(interceptor) = taken {
        interceptor.remove();
    }
}

/// The process-wide interceptor as a transport, when installed
pub fn global_transport() -> Option<SharedTransport> {
    GLOBAL
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .clone()
        .map(|interceptor| interceptor as SharedTransport)
}
