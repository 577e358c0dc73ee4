pub mod list;
pub mod new;
pub mod remove;
pub mod run;
pub mod serve;
pub mod templates;
pub mod validate;

use std::sync::Arc;

use anyhow::{Context, Result};
use vep_config::{Config, VirtualEndpointDefinition};
use vep_executor::{FetchInterceptor, initialize_fetch_interceptor};
use vep_runtime::ReqwestTransport;

/// Process-wide interceptor over a reqwest transport rooted at the configured base URL
pub(crate) fn install_interceptor(cfg: &Config) -> Result<Arc<FetchInterceptor>> {
    let inner = ReqwestTransport::new(cfg.base_url.clone()).context("Failed to create HTTP client")?;
    Ok(initialize_fetch_interceptor(
        Arc::new(inner),
        cfg.virtual_endpoints.clone(),
        cfg.endpoints.clone(),
    ))
}

pub(crate) fn find_virtual<'a>(cfg: &'a Config, key: &str) -> Result<&'a VirtualEndpointDefinition> {
    cfg.get_virtual(key)
        .with_context(|| format!("Virtual endpoint '{key}' not found"))
}
