use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use serde_json::Value;
use vep_config::Config;
use vep_executor::{ExecutionResult, VirtualEndpointExecutor};
use vep_runtime::ContextInput;

use crate::commands::{find_virtual, install_interceptor};
use crate::utils::styles::{fmt_bold, fmt_dimmed, fmt_error, fmt_success};

#[derive(Debug, Clone, Parser)]
pub struct RunCmd {
    /// Id or name of the virtual endpoint to run
    pub name: String,

    /// Path parameter, repeatable (e.g. --param id=7)
    #[arg(long = "param", short = 'p', value_parser = parse_key_val)]
    pub params: Vec<(String, String)>,

    /// Query parameter, repeatable (e.g. --query page=2)
    #[arg(long = "query", short = 'Q', value_parser = parse_key_val)]
    pub query: Vec<(String, String)>,

    /// Request header, repeatable (e.g. --header authorization=token)
    #[arg(long = "header", short = 'H', value_parser = parse_key_val)]
    pub headers: Vec<(String, String)>,

    /// JSON request body
    #[arg(long, short)]
    pub body: Option<String>,
}

impl RunCmd {
    pub(crate) async fn handle(&self, cfg: &Config) -> Result<()> {
        let definition = find_virtual(cfg, &self.name)?.clone();
        let input = self.input()?;

        // Nested requests to other virtual endpoints route locally
        let transport = install_interceptor(cfg)?;
        let executor = VirtualEndpointExecutor::new(definition, cfg.endpoints.clone(), transport);
        let result = executor.execute(input).await;

        println!("{}", serde_json::to_string_pretty(&result)?);
        match result {
            ExecutionResult::Success { execution_time, .. } => {
                info!(
                    "{}",
                    fmt_success(&format!(
                        "{} finished {}",
                        fmt_bold(&executor.definition().name),
                        fmt_dimmed(&format!("in {execution_time}ms"))
                    ))
                );
                Ok(())
            }
            ExecutionResult::Failure { error, .. } => {
                info!("{}", fmt_error(&error));
                anyhow::bail!("{} failed", executor.definition().name)
            }
        }
    }

    fn input(&self) -> Result<ContextInput> {
        let body = match &self.body {
            Some(raw) => serde_json::from_str(raw).context("--body is not valid JSON")?,
            None => Value::Object(serde_json::Map::new()),
        };
        Ok(ContextInput {
            params: self.params.iter().cloned().collect(),
            query: self.query.iter().cloned().collect(),
            body,
            headers: self.headers.iter().cloned().collect(),
        })
    }
}

fn parse_key_val(raw: &str) -> Result<(String, String), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{raw}'"))?;
    if key.is_empty() {
        return Err(format!("missing key in '{raw}'"));
    }
    Ok((key.to_string(), value.to_string()))
}
