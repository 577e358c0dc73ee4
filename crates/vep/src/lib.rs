pub mod commands;
pub mod utils;

use camino::Utf8PathBuf;
use clap::{Parser, Subcommand};
use vep_config::Config;

use crate::commands::{
    list::ListCmd, new::NewCmd, remove::RemoveCmd, run::RunCmd, serve::ServeCmd,
    templates::TemplatesCmd, validate::ValidateCmd,
};

#[derive(Parser)]
#[command(name = "vep")]
#[command(version)]
#[command(about = "VEP - Virtual Endpoint Platform")]
#[command(
    long_about = "VEP layers scripted virtual endpoints over the real endpoints of an API. \
Virtual endpoints are JavaScript functions that call real endpoints, fan out in parallel and \
reshape the results, and are served alongside the real API as if they were part of it."
)]
#[command(after_help = "EXAMPLES:\n  \
    vep new \"User profile\" /virtual/users/:id --template combine\n  \
    vep validate \"User profile\"\n  \
    vep run \"User profile\" --param id=7\n  \
    vep serve --port 8080\n\
")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file path, defaults to ./vep.json
    #[arg(long, short = 'c', global = true, default_value_t = Config::default_path())]
    pub config: Utf8PathBuf,

    /// No logging except for errors
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Verbose logging (-v) or trace logging (-vv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

impl Cli {
    #[allow(clippy::missing_errors_doc)]
    pub async fn handle(&self) -> anyhow::Result<()> {
        let cfg = Config::load(&self.config)?;

        match &self.command {
            Commands::List(cmd) => cmd.handle(&cfg),
            Commands::Templates(cmd) => cmd.handle(),
            Commands::Validate(cmd) => cmd.handle(&cfg),
            Commands::New(cmd) => cmd.handle(cfg, &self.config),
            Commands::Remove(cmd) => cmd.handle(cfg, &self.config),
            Commands::Run(cmd) => cmd.handle(&cfg).await,
            Commands::Serve(cmd) => cmd.handle(&cfg).await,
        }
    }
}

#[derive(Debug, Subcommand)]
#[command(styles=utils::styles::get_styles())]
pub enum Commands {
    /// List real and virtual endpoints
    #[command(long_about = "List the real endpoints and virtual endpoints in the configuration.")]
    List(ListCmd),

    /// Show the built-in code templates
    #[command(long_about = "List the built-in templates, or print the code of one template.")]
    Templates(TemplatesCmd),

    /// Validate virtual endpoint code
    #[command(
        long_about = "Check a configured virtual endpoint, or a file of code, for syntax errors and discouraged patterns."
    )]
    Validate(ValidateCmd),

    /// Add a virtual endpoint to configuration
    #[command(long_about = "Create a virtual endpoint from a template and save it to the configuration.")]
    New(NewCmd),

    /// Remove a virtual endpoint from configuration
    #[command(long_about = "Remove a virtual endpoint from the configuration by id or name.")]
    Remove(RemoveCmd),

    /// Execute a virtual endpoint once
    #[command(
        long_about = "Execute a virtual endpoint with the given input and print the execution result as JSON."
    )]
    Run(RunCmd),

    /// Serve virtual endpoints over HTTP
    #[command(
        long_about = "Start an HTTP server that answers virtual endpoint paths locally and proxies every other request to the configured base URL."
    )]
    Serve(ServeCmd),
}
