//! Per-execution context handed to scripts

use std::sync::Arc;
use std::time::Duration;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use vep_config::{EndpointSummary, RealEndpointDescriptor, VirtualEndpointDefinition};

use crate::caller::EndpointCaller;
use crate::transport::SharedTransport;

/// Request data visible to scripts as `context.input`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContextInput {
    pub params: IndexMap<String, String>,
    pub query: IndexMap<String, String>,
    pub body: Value,
    pub headers: IndexMap<String, String>,
}

/// `context.meta`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Meta {
    pub endpoint_id: String,
    pub name: String,
    /// Milliseconds since the epoch, taken when the context was built
    pub timestamp: i64,
    pub endpoints: Vec<EndpointSummary>,
}

/// Serializable part of the context; capability functions are attached script-side
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContextSnapshot {
    pub input: ContextInput,
    pub meta: Meta,
    pub timeout_ms: u64,
    pub helpers: &'static [&'static str],
}

/// Everything one execution needs, placed in the isolate's op state
#[derive(Debug, Clone)]
pub struct ExecutionState {
    pub snapshot: ContextSnapshot,
    pub caller: EndpointCaller,
}

impl ExecutionState {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.snapshot.timeout_ms)
    }

    pub fn started_at(&self) -> i64 {
        self.snapshot.meta.timestamp
    }
}

pub fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Assemble the context for one execution of `definition`. Performs no I/O.
pub fn build(
    definition: &VirtualEndpointDefinition,
    input: ContextInput,
    endpoints: Arc<[RealEndpointDescriptor]>,
    transport: SharedTransport,
) -> ExecutionState {
    let meta = Meta {
        endpoint_id: definition.id.clone(),
        name: definition.name.clone(),
        timestamp: now_ms(),
        endpoints: endpoints.iter().map(RealEndpointDescriptor::summary).collect(),
    };
    ExecutionState {
        snapshot: ContextSnapshot {
            input,
            meta,
            timeout_ms: definition.timeout_ms(),
            helpers: vep_transform::HELPERS,
        },
        caller: EndpointCaller::new(endpoints, transport),
    }
}
