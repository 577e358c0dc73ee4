use anyhow::Result;
use camino::Utf8Path;
use clap::Parser;
use log::info;
use vep_config::Config;

use crate::utils::styles::{fmt_bold, fmt_dimmed, fmt_success};

#[derive(Debug, Clone, Parser)]
pub struct RemoveCmd {
    /// Id or name of the virtual endpoint to remove
    pub name: String,
}

impl RemoveCmd {
    pub(crate) fn handle(&self, mut cfg: Config, path: &Utf8Path) -> Result<()> {
        let removed = cfg.remove_virtual(&self.name)?;

        cfg.save(path)?;

        info!(
            "{}",
            fmt_success(&format!(
                "{name} removed from {path}",
                name = fmt_bold(&removed.name),
                path = fmt_dimmed(path.as_str()),
            ))
        );

        Ok(())
    }
}
