//! Running one virtual endpoint to an [`ExecutionResult`]
//!
//! Every execution gets its own OS thread, current-thread tokio runtime and V8 isolate.
//! Dropping the isolate at the end cancels whatever the script left in flight, and a
//! watchdog thread terminates scripts that spin without ever yielding.

use std::pin::pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::time::Duration;

use deno_core::{JsRuntime, PollEventLoopOptions, RuntimeOptions, v8};
use serde::Deserialize;
use serde::ser::{Serialize, SerializeStruct, Serializer};
use serde_json::Value;
use tokio::sync::oneshot;
use vep_config::{RealEndpointDescriptor, VirtualEndpointDefinition};
use vep_runtime::context::{self, now_ms};
use vep_runtime::{ContextInput, ExecutionState, SharedTransport};

use crate::code;

/// Extra time granted past the timeout before the isolate is forcibly stopped
const WATCHDOG_GRACE: Duration = Duration::from_millis(250);

/// Outcome of one execution.
///
/// Serializes as `{ success: true, data, executionTime }` or
/// `{ success: false, error, stack? }`.
#[derive(Debug, Clone, PartialEq)]
pub enum ExecutionResult {
    Success {
        data: Value,
        /// Milliseconds between context creation and settlement
        execution_time: u64,
    },
    Failure {
        error: String,
        stack: Option<String>,
    },
}

impl ExecutionResult {
    pub fn failure(error: impl Into<String>) -> Self {
        Self::Failure {
            error: error.into(),
            stack: None,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    pub fn data(&self) -> Option<&Value> {
        match self {
            Self::Success { data, .. } => Some(data),
            Self::Failure { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Success { .. } => None,
            Self::Failure { error, .. } => Some(error),
        }
    }
}

impl Serialize for ExecutionResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Success {
                data,
                execution_time,
            } => {
                let mut s = serializer.serialize_struct("ExecutionResult", 3)?;
                s.serialize_field("success", &true)?;
                s.serialize_field("data", data)?;
                s.serialize_field("executionTime", execution_time)?;
                s.end()
            }
            Self::Failure { error, stack } => {
                let mut s = serializer.serialize_struct("ExecutionResult", 3)?;
                s.serialize_field("success", &false)?;
                s.serialize_field("error", error)?;
                if let Some(stack) = stack {
                    s.serialize_field("stack", stack)?;
                } else {
                    s.skip_field("stack")?;
                }
                s.end()
            }
        }
    }
}

/// What `runVirtualEndpoint` resolves to
#[derive(Debug, Deserialize)]
struct Envelope {
    ok: bool,
    #[serde(default)]
    data: Value,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    stack: Option<String>,
}

impl Envelope {
    fn into_result(self, started_at: i64) -> ExecutionResult {
        if self.ok {
            ExecutionResult::Success {
                data: self.data,
                execution_time: u64::try_from(now_ms() - started_at).unwrap_or(0),
            }
        } else {
            ExecutionResult::Failure {
                error: self.message.unwrap_or_else(|| "Unknown error".to_string()),
                stack: self.stack,
            }
        }
    }
}

/// Runs one virtual endpoint definition against a fixed set of real endpoints
#[derive(Clone)]
pub struct VirtualEndpointExecutor {
    definition: VirtualEndpointDefinition,
    endpoints: Arc<[RealEndpointDescriptor]>,
    transport: SharedTransport,
}

impl std::fmt::Debug for VirtualEndpointExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VirtualEndpointExecutor")
            .field("definition", &self.definition.id)
            .field("endpoints", &self.endpoints.len())
            .finish_non_exhaustive()
    }
}

impl VirtualEndpointExecutor {
    pub fn new(
        definition: VirtualEndpointDefinition,
        endpoints: impl Into<Arc<[RealEndpointDescriptor]>>,
        transport: SharedTransport,
    ) -> Self {
        Self {
            definition,
            endpoints: endpoints.into(),
            transport,
        }
    }

    pub fn definition(&self) -> &VirtualEndpointDefinition {
        &self.definition
    }

    /// Execute with `input`. Never fails; every problem becomes [`ExecutionResult::Failure`].
    pub async fn execute(&self, input: ContextInput) -> ExecutionResult {
        let state = context::build(
            &self.definition,
            input,
            self.endpoints.clone(),
            self.transport.clone(),
        );
        let body = match code::wrap(&self.definition.code) {
            Ok(body) => body,
            Err(e) => return ExecutionResult::failure(e.to_string()),
        };

        log::debug!(
            "Executing virtual endpoint {} ({})",
            self.definition.name,
            self.definition.id
        );
        let (tx, rx) = oneshot::channel();
        let spawned = std::thread::Builder::new()
            .name(format!("vep-{}", self.definition.id))
            .spawn(move || {
                let _ = tx.send(run_isolated(&body, state));
            });
        if let Err(e) = spawned {
            return ExecutionResult::failure(format!("Failed to start execution thread: {e}"));
        }

        let result = rx.await.unwrap_or_else(|_| {
            ExecutionResult::failure("Execution thread exited without a result")
        });
        match &result {
            ExecutionResult::Success { execution_time, .. } => {
                log::debug!("{} succeeded in {execution_time}ms", self.definition.id);
            }
            ExecutionResult::Failure { error, .. } => {
                log::warn!("{} failed: {error}", self.definition.id);
            }
        }
        result
    }
}

/// Body of the per-execution thread
fn run_isolated(body: &str, state: ExecutionState) -> ExecutionResult {
    let rt = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => return ExecutionResult::failure(format!("Failed to create runtime: {e}")),
    };
    rt.block_on(run_script(body, state))
}

async fn run_script(body: &str, state: ExecutionState) -> ExecutionResult {
    let timeout = state.timeout();
    let started_at = state.started_at();
    let timeout_message = format!("Execution timeout after {}ms", timeout.as_millis());

    let mut runtime = JsRuntime::new(RuntimeOptions {
        extensions: vec![vep_runtime::vep_runtime::init(state)],
        ..Default::default()
    });
    let watchdog = Watchdog::arm(
        runtime.v8_isolate().thread_safe_handle(),
        timeout + WATCHDOG_GRACE,
    );

    let outcome =
        tokio::time::timeout(timeout + WATCHDOG_GRACE, evaluate(&mut runtime, body)).await;
    let terminated = watchdog.disarm();
    // In-flight ops die with the isolate
    drop(runtime);

    match outcome {
        Ok(Ok(envelope)) => envelope.into_result(started_at),
        Ok(Err(_)) if terminated => ExecutionResult::failure(timeout_message),
        Ok(Err(message)) => ExecutionResult::failure(message),
        Err(_) => ExecutionResult::failure(timeout_message),
    }
}

async fn evaluate(runtime: &mut JsRuntime, body: &str) -> Result<Envelope, String> {
    let body = serde_json::to_string(body).map_err(|e| e.to_string())?;
    let script = format!("{}({body})", vep_runtime::ENTRY_POINT);

    let promise = runtime
        .execute_script("<virtual-endpoint>", script)
        .map_err(|e| e.to_string())?;
    let resolve_future = runtime.resolve(promise);
    let resolved = runtime
        .with_event_loop_promise(resolve_future, PollEventLoopOptions::default())
        .await
        .map_err(|e| e.to_string())?;

    let envelope = {
        let main_context = runtime.main_context();
        let handle_scope_storage = pin!(v8::HandleScope::new(runtime.v8_isolate()));
        let handle_scope = &mut handle_scope_storage.init();
        let context = v8::Local::new(handle_scope, main_context);
        let context_scope = &mut v8::ContextScope::new(handle_scope, context);
        let local = v8::Local::new(context_scope, resolved);
        deno_core::serde_v8::from_v8::<String>(context_scope, local).map_err(|e| e.to_string())?
    };
    serde_json::from_str(&envelope).map_err(|e| format!("Invalid execution envelope: {e}"))
}

/// Terminates the isolate from another thread once `after` elapses
struct Watchdog {
    done: Option<mpsc::Sender<()>>,
    fired: Arc<AtomicBool>,
    thread: Option<std::thread::JoinHandle<()>>,
}

impl Watchdog {
    fn arm(isolate: v8::IsolateHandle, after: Duration) -> Self {
        let (done, rx) = mpsc::channel::<()>();
        let fired = Arc::new(AtomicBool::new(false));
        let flag = fired.clone();
        let thread = std::thread::Builder::new()
            .name("vep-watchdog".to_string())
            .spawn(move || {
                if let Err(RecvTimeoutError::Timeout) = rx.recv_timeout(after) {
                    flag.store(true, Ordering::SeqCst);
                    isolate.terminate_execution();
                }
            })
            .map_err(|e| log::warn!("Failed to start watchdog: {e}"))
            .ok();
        Self {
            done: Some(done),
            fired,
            thread,
        }
    }

    /// Stop the watchdog; `true` when it already terminated the isolate
    fn disarm(mut self) -> bool {
        drop(self.done.take());
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
        self.fired.load(Ordering::SeqCst)
    }
}
