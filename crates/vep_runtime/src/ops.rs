//! Deno ops backing the script context
//!
//! Payloads cross the boundary as JSON strings so numbers keep their JSON shape.

use deno_core::OpState;
use deno_core::op2;
use std::cell::RefCell;
use std::rc::Rc;

use serde_json::Value;

use crate::caller::{self, CallOptions, EndpointCaller, FetchOptions};
use crate::context::ExecutionState;
use crate::error::{CallError, UtilsError};

fn caller(state: &Rc<RefCell<OpState>>) -> EndpointCaller {
    state.borrow().borrow::<ExecutionState>().caller.clone()
}

/// Serialized `input`, `meta`, timeout and helper names
#[op2]
#[string]
pub(crate) fn op_vep_context(state: &mut OpState) -> Result<String, CallError> {
    let execution = state.borrow::<ExecutionState>();
    Ok(serde_json::to_string(&execution.snapshot)?)
}

/// Call a real endpoint by id
#[op2(async)]
#[string]
pub(crate) async fn op_vep_call(
    state: Rc<RefCell<OpState>>,
    #[string] endpoint_id: String,
    #[string] options: String,
) -> Result<String, CallError> {
    let caller = caller(&state);
    let options: CallOptions = serde_json::from_str(&options)?;
    let value = caller.call(&endpoint_id, &options).await?;
    Ok(serde_json::to_string(&value)?)
}

/// Concurrent calls, validated up front, results in input order
#[op2(async)]
#[string]
pub(crate) async fn op_vep_parallel(
    state: Rc<RefCell<OpState>>,
    #[string] calls: String,
) -> Result<String, CallError> {
    let caller = caller(&state);
    let raw: Value = serde_json::from_str(&calls)?;
    let calls = caller::parse_parallel_calls(&raw)?;
    let results = caller.parallel(&calls).await?;
    Ok(serde_json::to_string(&results)?)
}

/// Fetch an arbitrary URL
#[op2(async)]
#[string]
pub(crate) async fn op_vep_fetch(
    state: Rc<RefCell<OpState>>,
    #[string] url: String,
    #[string] options: String,
) -> Result<String, CallError> {
    let caller = caller(&state);
    let options: FetchOptions = serde_json::from_str(&options)?;
    let value = caller.fetch(&url, options).await?;
    Ok(serde_json::to_string(&value)?)
}

/// Run a `utils.*` helper
#[op2]
#[string]
#[allow(clippy::needless_pass_by_value)]
pub(crate) fn op_vep_utils(#[string] name: String, #[string] args: String) -> Result<String, UtilsError> {
    let args: Vec<Value> = serde_json::from_str(&args).unwrap_or_default();
    let out = vep_transform::dispatch(&name, &args)?;
    Ok(out.to_string())
}

/// Resolves once the execution's timeout has elapsed
#[op2(async)]
pub(crate) async fn op_vep_deadline(state: Rc<RefCell<OpState>>) {
    let timeout = state.borrow().borrow::<ExecutionState>().timeout();
    tokio::time::sleep(timeout).await;
}

/// Forward `console.*` output to the host log
#[op2(fast)]
#[allow(clippy::needless_pass_by_value)]
pub(crate) fn op_vep_log(#[string] level: String, #[string] message: String) {
    let level = match level.as_str() {
        "error" => log::Level::Error,
        "warn" => log::Level::Warn,
        "debug" | "trace" => log::Level::Debug,
        _ => log::Level::Info,
    };
    log::log!(target: "vep::console", level, "{message}");
}
