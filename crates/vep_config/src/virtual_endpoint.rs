use chrono::{SecondsFormat, Utc};
use heck::ToLowerCamelCase;
use serde::{Deserialize, Serialize};

use crate::endpoint::HttpMethod;

pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;

fn default_timeout() -> u64 {
    DEFAULT_TIMEOUT_MS
}

/// Per-endpoint execution settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointConfig {
    /// Wall-clock budget for one execution, in milliseconds
    #[serde(default = "default_timeout")]
    pub timeout: u64,
    /// Reserved; not consulted by the executor
    #[serde(default)]
    pub cache: bool,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT_MS,
            cache: false,
        }
    }
}

/// Input shape produced by the "create virtual endpoint" dialog
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateVirtualEndpoint {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    pub path: String,
    #[serde(default)]
    pub method: HttpMethod,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub config: EndpointConfig,
}

/// A user-authored endpoint whose response is computed by script
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VirtualEndpointDefinition {
    pub id: String,
    pub name: String,
    pub path: String,
    #[serde(default)]
    pub method: HttpMethod,
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub config: EndpointConfig,
    #[serde(default)]
    pub description: String,
    /// Mirrors `name` for display-layer compatibility
    #[serde(default)]
    pub title: String,
    /// Mirrors `path` for display-layer compatibility
    #[serde(default)]
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

fn now_iso() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

impl VirtualEndpointDefinition {
    /// Build a definition from dialog input, generating `virtual-<millis>` when no id is given.
    pub fn create(input: CreateVirtualEndpoint) -> Self {
        let now = now_iso();
        let id = input
            .id
            .filter(|id| !id.trim().is_empty())
            .unwrap_or_else(|| format!("virtual-{}", Utc::now().timestamp_millis()));

        Self {
            id,
            title: input.name.clone(),
            url: input.path.clone(),
            name: input.name,
            path: input.path,
            method: input.method,
            code: input.code,
            config: input.config,
            description: input.description,
            created_at: Some(now.clone()),
            updated_at: Some(now),
        }
    }

    /// Replace code and metadata wholesale. `id` and `created_at` are retained.
    pub fn update(&mut self, input: CreateVirtualEndpoint) {
        self.title = input.name.clone();
        self.url = input.path.clone();
        self.name = input.name;
        self.path = input.path;
        self.method = input.method;
        self.code = input.code;
        self.config = input.config;
        self.description = input.description;
        self.updated_at = Some(now_iso());
    }

    /// Identifier derived from `name`, e.g. "Get User Profile" -> `getUserProfile`
    pub fn callable_name(&self) -> String {
        let ident = self.name.to_lower_camel_case();
        match ident.chars().next() {
            None => "virtualEndpoint".to_string(),
            Some(c) if c.is_ascii_digit() => format!("_{ident}"),
            Some(_) => ident,
        }
    }

    pub fn timeout_ms(&self) -> u64 {
        if self.config.timeout == 0 {
            DEFAULT_TIMEOUT_MS
        } else {
            self.config.timeout
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(name: &str) -> CreateVirtualEndpoint {
        CreateVirtualEndpoint {
            name: name.to_string(),
            path: "/virtual/user/:id".to_string(),
            code: "return 1;".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_create_generates_id_and_mirrors_fields() {
        let def = VirtualEndpointDefinition::create(input("User Profile"));

        assert!(def.id.starts_with("virtual-"));
        assert_eq!(def.title, "User Profile");
        assert_eq!(def.url, "/virtual/user/:id");
        assert_eq!(def.method, HttpMethod::Get);
        assert_eq!(def.config.timeout, 10_000);
        assert!(!def.config.cache);
        assert_eq!(def.created_at, def.updated_at);
    }

    #[test]
    fn test_create_keeps_explicit_id() {
        let mut cfg = input("x");
        cfg.id = Some("mine".into());
        assert_eq!(VirtualEndpointDefinition::create(cfg).id, "mine");
    }

    #[test]
    fn test_update_retains_identity() {
        let mut def = VirtualEndpointDefinition::create(input("First"));
        let id = def.id.clone();
        let created = def.created_at.clone();

        let mut next = input("Second");
        next.path = "/virtual/second".into();
        next.method = HttpMethod::Post;
        def.update(next);

        assert_eq!(def.id, id);
        assert_eq!(def.created_at, created);
        assert_eq!(def.name, "Second");
        assert_eq!(def.title, "Second");
        assert_eq!(def.url, "/virtual/second");
        assert_eq!(def.method, HttpMethod::Post);
    }

    #[test]
    fn test_callable_name() {
        let mut def = VirtualEndpointDefinition::create(input("Get user profile"));
        assert_eq!(def.callable_name(), "getUserProfile");

        def.name = "2 users".into();
        assert_eq!(def.callable_name(), "_2Users");

        def.name = String::new();
        assert_eq!(def.callable_name(), "virtualEndpoint");
    }

    #[test]
    fn test_config_defaults_when_missing() {
        let def: VirtualEndpointDefinition = serde_json::from_str(
            r#"{"id":"v1","name":"n","path":"/p","code":"return 1","config":{}}"#,
        )
        .unwrap();
        assert_eq!(def.config.timeout, 10_000);
        assert_eq!(def.method, HttpMethod::Get);
    }
}
