//! Tests for the VEP executor
//!
//! Every test here creates V8 isolates, so they run serially.

mod validator;

use vep_config::{
    CreateVirtualEndpoint, EndpointConfig, HttpMethod, RealEndpointDescriptor,
    VirtualEndpointDefinition,
};

fn definition(id: &str, path: &str, code: &str) -> VirtualEndpointDefinition {
    VirtualEndpointDefinition::create(CreateVirtualEndpoint {
        id: Some(id.to_string()),
        name: id.to_string(),
        path: path.to_string(),
        code: code.to_string(),
        ..Default::default()
    })
}

fn with_timeout(mut definition: VirtualEndpointDefinition, timeout: u64) -> VirtualEndpointDefinition {
    definition.config = EndpointConfig {
        timeout,
        cache: false,
    };
    definition
}

fn real_endpoints() -> Vec<RealEndpointDescriptor> {
    vec![
        RealEndpointDescriptor::new("u", "Get user", HttpMethod::Get, "/users/:id"),
        RealEndpointDescriptor::new("posts", "User posts", HttpMethod::Get, "/users/:id/posts"),
    ]
}
