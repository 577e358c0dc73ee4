use anyhow::Result;
use clap::Parser;
use log::info;
use tabled::{Table, Tabled, settings::Style};
use vep_config::templates::{template, template_list};

use crate::utils::styles::{fmt_bold, fmt_dimmed};

#[derive(Debug, Clone, Parser)]
pub struct TemplatesCmd {
    /// Print the code of this template instead of listing all of them
    pub key: Option<String>,
}

#[derive(Tabled)]
struct TemplateRow {
    #[tabled(rename = "Key")]
    key: &'static str,
    #[tabled(rename = "Name")]
    name: &'static str,
    #[tabled(rename = "Description")]
    description: &'static str,
}

impl TemplatesCmd {
    pub(crate) fn handle(&self) -> Result<()> {
        match &self.key {
            Some(key) => {
                if !template_list().iter().any(|t| t.key == key.as_str()) {
                    anyhow::bail!("Unknown template '{key}'");
                }
                let t = template(key);
                info!("{} {}", fmt_bold(t.name), fmt_dimmed(t.description));
                info!("{}", t.code);
            }
            None => {
                let rows = template_list().into_iter().map(|t| TemplateRow {
                    key: t.key,
                    name: t.name,
                    description: t.description,
                });
                info!("{}", Table::new(rows).with(Style::rounded()));
                info!(
                    "Use {cmd} to print a template",
                    cmd = fmt_bold("vep templates <KEY>")
                );
            }
        }
        Ok(())
    }
}
