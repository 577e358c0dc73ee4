//! # VEP Executor
//!
//! Runs virtual endpoints and makes them reachable like real ones.
//!
//! - [`VirtualEndpointExecutor`]: runs one definition in a fresh V8 isolate with a wall-clock
//!   timeout and reports an [`ExecutionResult`]
//! - [`validate_virtual_endpoint_code`]: static checks before a definition is saved
//! - [`FetchInterceptor`]: a [`Transport`](vep_runtime::Transport) that routes requests for
//!   virtual paths to the executor and passes everything else through
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use vep_config::{CreateVirtualEndpoint, RealEndpointDescriptor, VirtualEndpointDefinition};
//! use vep_executor::VirtualEndpointExecutor;
//! use vep_runtime::{ContextInput, ReqwestTransport};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let definition = VirtualEndpointDefinition::create(CreateVirtualEndpoint {
//!     name: "Hello".into(),
//!     path: "/hello".into(),
//!     code: "async function virtualEndpoint(context) { return { ok: true }; }".into(),
//!     ..Default::default()
//! });
//! let transport = Arc::new(ReqwestTransport::new(None)?);
//! let executor = VirtualEndpointExecutor::new(definition, Vec::<RealEndpointDescriptor>::new(), transport);
//!
//! let result = executor.execute(ContextInput::default()).await;
//! println!("{}", serde_json::to_string(&result)?);
//! # Ok(())
//! # }
//! ```

pub mod code;
pub mod executor;
pub mod interceptor;
pub mod validator;

#[cfg(test)]
mod tests;

pub use code::{CodeError, CodeShape};
pub use executor::{ExecutionResult, VirtualEndpointExecutor};
pub use interceptor::{
    FetchInterceptor, cleanup_fetch_interceptor, global_transport, initialize_fetch_interceptor,
    match_path, update_virtual_endpoints,
};
pub use validator::{ValidationResult, validate_virtual_endpoint_code};
