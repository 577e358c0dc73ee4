use anyhow::Result;
use camino::Utf8Path;
use clap::Parser;
use log::info;
use vep_config::{
    Config, CreateVirtualEndpoint, DEFAULT_TIMEOUT_MS, EndpointConfig, HttpMethod,
    VirtualEndpointDefinition, templates::template,
};
use vep_executor::validate_virtual_endpoint_code;

use crate::commands::validate::report;
use crate::utils::styles::{fmt_bold, fmt_cyan, fmt_dimmed, fmt_success};

#[derive(Debug, Clone, Parser)]
pub struct NewCmd {
    /// Display name of the virtual endpoint
    pub name: String,

    /// Path pattern to serve, e.g. /virtual/users/:id
    pub path: String,

    /// Template the code starts from (see `vep templates`)
    #[arg(long, short, default_value = "blank")]
    pub template: String,

    /// HTTP method
    #[arg(long, short, default_value_t = HttpMethod::Get)]
    pub method: HttpMethod,

    /// Optional description
    #[arg(long, short)]
    pub description: Option<String>,

    /// Execution timeout in milliseconds
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_MS)]
    pub timeout: u64,

    /// Replaces an existing virtual endpoint with the same name
    #[arg(long, short)]
    pub force: bool,
}

impl NewCmd {
    pub(crate) fn handle(&self, mut cfg: Config, path: &Utf8Path) -> Result<()> {
        if !self.path.starts_with('/') {
            anyhow::bail!("Path must start with '/', got '{}'", self.path);
        }

        let input = CreateVirtualEndpoint {
            id: None,
            name: self.name.clone(),
            path: self.path.clone(),
            method: self.method,
            description: self.description.clone().unwrap_or_default(),
            code: template(&self.template).code.to_string(),
            config: EndpointConfig {
                timeout: self.timeout,
                cache: false,
            },
        };

        let existing = cfg
            .virtual_endpoints
            .iter()
            .position(|v| v.name == self.name);
        let definition = match existing {
            Some(_) if !self.force => anyhow::bail!(
                "A virtual endpoint named '{}' already exists, use --force to replace it",
                self.name
            ),
            Some(index) => {
                let mut definition = cfg.virtual_endpoints[index].clone();
                definition.update(input);
                definition
            }
            None => VirtualEndpointDefinition::create(input),
        };

        let result = validate_virtual_endpoint_code(&definition.code);
        report(&definition.name, &result);
        if !result.valid {
            anyhow::bail!("Template '{}' produced invalid code", self.template);
        }

        let (name, id) = (definition.name.clone(), definition.id.clone());
        cfg.upsert_virtual(definition);
        cfg.save(path)?;

        info!(
            "{}",
            fmt_success(&format!(
                "{name} ({id}) saved to {path}",
                name = fmt_bold(&name),
                id = fmt_cyan(&id),
                path = fmt_dimmed(path.as_str()),
            ))
        );

        Ok(())
    }
}
