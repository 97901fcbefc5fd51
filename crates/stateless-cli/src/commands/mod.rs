//! CLI command definitions and dispatch.

pub mod attachment;
pub mod job;
pub mod migrate;
pub mod serve;

use clap::{Parser, Subcommand};

use crate::output::OutputFormat;
use stateless_api::AppState;
use stateless_core::config::AppConfig;
use stateless_core::error::AppError;

/// Stateless Media: bucket synchronization for media libraries
#[derive(Debug, Parser)]
#[command(name = "stateless", version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/default.toml")]
    pub config: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Start the Stateless server
    Serve(serve::ServeArgs),
    /// Database migration management
    Migrate(migrate::MigrateArgs),
    /// Synchronization job management
    Job(job::JobArgs),
    /// Single-attachment processing
    Attachment(attachment::AttachmentArgs),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self) -> Result<(), AppError> {
        match &self.command {
            Commands::Serve(args) => serve::execute(args, &self.config).await,
            Commands::Migrate(args) => migrate::execute(args, &self.config).await,
            Commands::Job(args) => job::execute(args, &self.config, self.format).await,
            Commands::Attachment(args) => {
                attachment::execute(args, &self.config, self.format).await
            }
        }
    }
}

/// Helper: load configuration from file
pub fn load_config(config_path: &str) -> Result<AppConfig, AppError> {
    AppConfig::load_file(config_path)
}

/// Helper: connect the configured backends and wire the services
pub async fn connect(config_path: &str) -> Result<AppState, AppError> {
    let config = load_config(config_path)?;
    if config.database.is_memory() {
        crate::output::print_warning(
            "Database provider is 'memory'; nothing persists beyond this command.",
        );
    }
    stateless_api::build_state(config).await
}
