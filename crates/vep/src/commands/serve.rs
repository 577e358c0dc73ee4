use anyhow::{Context, Result};
use axum::{
    Router,
    body::Bytes,
    extract::State,
    http::{HeaderMap, HeaderName, HeaderValue, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
};
use clap::Parser;
use log::{error, info, warn};
use serde_json::json;
use vep_config::Config;
use vep_executor::cleanup_fetch_interceptor;
use vep_runtime::{HttpRequest, HttpResponse, SharedTransport};

use crate::commands::install_interceptor;
use crate::utils::styles::{fmt_bold, fmt_cyan, fmt_dimmed, fmt_green};

/// Headers describing one hop, never forwarded
const HOP_HEADERS: &[&str] = &[
    "host",
    "connection",
    "keep-alive",
    "content-length",
    "transfer-encoding",
    "upgrade",
];

#[derive(Debug, Clone, Parser)]
pub struct ServeCmd {
    /// Port to listen on
    #[arg(short, long, default_value = "8080")]
    pub port: u16,

    /// Host address to bind to (use 0.0.0.0 for external access)
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,
}

impl ServeCmd {
    pub(crate) async fn handle(&self, cfg: &Config) -> Result<()> {
        if cfg.base_url.is_none() {
            warn!(
                "No {} configured, requests that match no virtual endpoint will fail",
                fmt_bold("baseUrl")
            );
        }

        let interceptor = install_interceptor(cfg)?;
        let router = router(interceptor);

        let addr = format!("{}:{}", self.host, self.port);
        let tcp_listener = tokio::net::TcpListener::bind(&addr)
            .await
            .context(format!("Failed to bind {addr}"))?;
        log_banner(&addr, cfg);

        axum::serve(tcp_listener, router)
            .with_graceful_shutdown(async {
                if let Err(e) = tokio::signal::ctrl_c().await {
                    error!("Failed to listen for shutdown signal: {e}");
                }
            })
            .await?;

        cleanup_fetch_interceptor();
        info!("Shutting down...");
        Ok(())
    }
}

/// Every request goes through `transport`
pub(crate) fn router(transport: SharedTransport) -> Router {
    Router::new().fallback(proxy).with_state(transport)
}

async fn proxy(
    State(transport): State<SharedTransport>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let request = to_request(&method, &uri, &headers, &body);
    match transport.send(request).await {
        Ok(response) => into_response(response),
        Err(e) => {
            warn!("{method} {uri} failed: {e}");
            (
                StatusCode::BAD_GATEWAY,
                axum::Json(json!({ "error": e.to_string() })),
            )
                .into_response()
        }
    }
}

fn to_request(method: &Method, uri: &Uri, headers: &HeaderMap, body: &Bytes) -> HttpRequest {
    let target = uri
        .path_and_query()
        .map_or_else(|| uri.path().to_string(), ToString::to_string);
    let mut request = HttpRequest::new(method.as_str(), target);
    for (name, value) in headers {
        if HOP_HEADERS.contains(&name.as_str()) {
            continue;
        }
        if let Ok(value) = value.to_str() {
            request.headers.insert(name.to_string(), value.to_string());
        }
    }
    if !body.is_empty() {
        request.body = Some(String::from_utf8_lossy(body).into_owned());
    }
    request
}

fn into_response(response: HttpResponse) -> Response {
    let status = StatusCode::from_u16(response.status).unwrap_or(StatusCode::BAD_GATEWAY);
    let mut headers = HeaderMap::new();
    for (name, value) in &response.headers {
        if HOP_HEADERS.contains(&name.to_ascii_lowercase().as_str()) {
            continue;
        }
        if let (Ok(name), Ok(value)) = (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            headers.append(name, value);
        }
    }
    (status, headers, response.body).into_response()
}

fn log_banner(addr: &str, cfg: &Config) {
    info!("{}", fmt_cyan("VEP"));
    info!("Listening at http://{addr}...");
    match &cfg.base_url {
        Some(base_url) => info!("{}: {base_url}", fmt_bold("Proxying to")),
        None => info!("{}: {}", fmt_bold("Proxying to"), fmt_dimmed("nothing")),
    }
    if cfg.virtual_endpoints.is_empty() {
        info!("{}: {}", fmt_bold("Virtual endpoints"), fmt_dimmed("none"));
    } else {
        info!("{}:", fmt_bold("Virtual endpoints"));
        for v in &cfg.virtual_endpoints {
            info!("  • {} {} {}", v.method, fmt_green(&v.path), fmt_dimmed(&v.name));
        }
    }
}
