use anyhow::{Context, Result};
use camino::Utf8PathBuf;
use clap::Parser;
use log::{info, warn};
use vep_config::Config;
use vep_executor::{ValidationResult, validate_virtual_endpoint_code};

use crate::commands::find_virtual;
use crate::utils::styles::{fmt_bold, fmt_error, fmt_success, fmt_warning};

#[derive(Debug, Clone, Parser)]
pub struct ValidateCmd {
    /// Id or name of the virtual endpoint to validate
    #[arg(required_unless_present = "file")]
    pub name: Option<String>,

    /// Validate the code in this file instead of a configured endpoint
    #[arg(long, short, conflicts_with = "name")]
    pub file: Option<Utf8PathBuf>,
}

impl ValidateCmd {
    pub(crate) fn handle(&self, cfg: &Config) -> Result<()> {
        let (label, code) = match (&self.file, &self.name) {
            (Some(path), _) => (
                path.to_string(),
                std::fs::read_to_string(path).context(format!("Failed to read {path}"))?,
            ),
            (None, Some(name)) => {
                let definition = find_virtual(cfg, name)?;
                (definition.name.clone(), definition.code.clone())
            }
            (None, None) => anyhow::bail!("Pass a virtual endpoint name or --file"),
        };

        let result = validate_virtual_endpoint_code(&code);
        report(&label, &result);
        if !result.valid {
            anyhow::bail!("{label} is not valid");
        }
        Ok(())
    }
}

pub(crate) fn report(label: &str, result: &ValidationResult) {
    for error in &result.errors {
        info!("{}", fmt_error(error));
    }
    for warning in &result.warnings {
        warn!("{}", fmt_warning(warning));
    }
    if result.valid {
        info!("{}", fmt_success(&format!("{} is valid", fmt_bold(label))));
    }
}
