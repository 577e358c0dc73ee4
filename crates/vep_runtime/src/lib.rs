//! # VEP Runtime
//!
//! A Deno extension giving virtual endpoint scripts their `context`:
//!
//! - `context.input` / `context.meta`: request data and a timestamped snapshot of the
//!   real endpoints
//! - `call`, `get`, `post`, `put`, `delete`: calls against real endpoints by id
//! - `parallel(...calls)`: concurrent calls, results in input order
//! - `fetch(url, options)`: arbitrary outbound requests
//! - `utils`: the `vep_transform` helpers
//!
//! All network access goes through the [`Transport`] in the [`ExecutionState`], so a
//! script can reach nothing the host did not hand it. `console.*` output is forwarded
//! to the `log` facade under the `vep::console` target.
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use deno_core::{JsRuntime, RuntimeOptions};
//! use vep_config::{CreateVirtualEndpoint, VirtualEndpointDefinition};
//! use vep_runtime::{context, vep_runtime, ContextInput, ReqwestTransport};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let definition = VirtualEndpointDefinition::create(CreateVirtualEndpoint {
//!     name: "Hello".into(),
//!     path: "/hello".into(),
//!     code: "return { hello: 'world' };".into(),
//!     ..Default::default()
//! });
//! let transport = Arc::new(ReqwestTransport::new(None)?);
//! let state = context::build(&definition, ContextInput::default(), Arc::from(vec![]), transport);
//!
//! let mut runtime = JsRuntime::new(RuntimeOptions {
//!     extensions: vec![vep_runtime::init(state)],
//!     ..Default::default()
//! });
//! runtime.execute_script("<main>", "runVirtualEndpoint('return 1;')")?;
//! # Ok(())
//! # }
//! ```

pub mod caller;
pub mod context;
mod error;
mod js_error_impl;
mod ops;
pub mod transport;

#[cfg(test)]
mod tests;

pub use caller::{CallOptions, EndpointCaller, FetchOptions, ParallelCall};
pub use context::{ContextInput, ContextSnapshot, ExecutionState, Meta};
pub use error::{CallError, TransportError, UtilsError};
#[cfg(any(test, feature = "test-util"))]
pub use transport::StubTransport;
pub use transport::{HttpRequest, HttpResponse, ReqwestTransport, SharedTransport, Transport};

/// Global installed by the extension that runs one script body
pub const ENTRY_POINT: &str = "runVirtualEndpoint";

// Deno extension exposing the script context.
// Initialize with the `ExecutionState` of a single execution.
deno_core::extension!(
    vep_runtime,
    ops = [
        ops::op_vep_context,
        ops::op_vep_call,
        ops::op_vep_parallel,
        ops::op_vep_fetch,
        ops::op_vep_utils,
        ops::op_vep_deadline,
        ops::op_vep_log,
    ],
    esm_entry_point = "ext:vep_runtime/runtime.js",
    esm = [ dir "src", "runtime.js" ],
    options = {
        execution: ExecutionState,
    },
    state = |state, options| {
        state.put(options.execution);
    },
);
