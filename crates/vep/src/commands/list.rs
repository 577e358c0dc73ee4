use anyhow::Result;
use clap::Parser;
use log::info;
use tabled::{Table, Tabled, settings::Style};
use vep_config::Config;

use crate::utils::styles::{fmt_bold, fmt_cyan, fmt_dimmed};

#[derive(Debug, Clone, Parser)]
pub struct ListCmd;

#[derive(Tabled)]
struct RealRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Method")]
    method: String,
    #[tabled(rename = "URL")]
    url: String,
}

#[derive(Tabled)]
struct VirtualRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Method")]
    method: String,
    #[tabled(rename = "Path")]
    path: String,
    #[tabled(rename = "Timeout")]
    timeout: String,
}

impl ListCmd {
    pub(crate) fn handle(&self, cfg: &Config) -> Result<()> {
        if let Some(base_url) = &cfg.base_url {
            info!("{}: {base_url}", fmt_bold("Base URL"));
        }

        info!("{}", fmt_cyan("Real endpoints"));
        if cfg.endpoints.is_empty() {
            info!("{}", fmt_dimmed("none"));
        } else {
            let rows = cfg.endpoints.iter().map(|e| RealRow {
                id: e.id.clone(),
                name: e.name.clone(),
                method: e.method.to_string(),
                url: e.url.clone(),
            });
            info!("{}", Table::new(rows).with(Style::rounded()));
        }

        info!("{}", fmt_cyan("Virtual endpoints"));
        if cfg.virtual_endpoints.is_empty() {
            info!("{}", fmt_dimmed("none"));
            info!(
                "Run {cmd} to create one",
                cmd = fmt_bold("vep new <NAME> <PATH>")
            );
        } else {
            let rows = cfg.virtual_endpoints.iter().map(|v| VirtualRow {
                id: v.id.clone(),
                name: v.name.clone(),
                method: v.method.to_string(),
                path: v.path.clone(),
                timeout: format!("{}ms", v.timeout_ms()),
            });
            info!("{}", Table::new(rows).with(Style::rounded()));
        }

        Ok(())
    }
}
