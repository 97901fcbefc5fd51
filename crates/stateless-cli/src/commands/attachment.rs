//! Single-attachment processing commands.

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use crate::output::{self, OutputFormat};
use stateless_core::error::AppError;
use stateless_entity::attachment::MimeClass;

/// Arguments for attachment commands
#[derive(Debug, Args)]
pub struct AttachmentArgs {
    /// Attachment subcommand
    #[command(subcommand)]
    pub command: AttachmentCommand,
}

/// Attachment subcommands
#[derive(Debug, Subcommand)]
pub enum AttachmentCommand {
    /// Ensure attachments are present locally and in the bucket
    Process {
        /// Attachment IDs
        #[arg(required = true)]
        ids: Vec<i64>,
    },
    /// Show failed attachments and progress markers per class
    Failed,
}

/// One row of `attachment failed`.
#[derive(Debug, Serialize, Tabled)]
pub struct ClassRow {
    /// Attachment class
    #[tabled(rename = "Class")]
    pub class: String,
    /// Failed attachment IDs
    #[tabled(rename = "Failed")]
    pub failed: String,
    /// First processed ID
    #[tabled(rename = "First processed")]
    pub first_processed: String,
    /// Lowest processed ID
    #[tabled(rename = "Last processed")]
    pub last_processed: String,
}

fn marker(value: Option<i64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_else(|| "-".to_string())
}

/// Execute attachment commands
pub async fn execute(
    args: &AttachmentArgs,
    config_path: &str,
    format: OutputFormat,
) -> Result<(), AppError> {
    let state = super::connect(config_path).await?;

    match &args.command {
        AttachmentCommand::Process { ids } => {
            let mut failures = 0;
            for id in ids {
                let result = state.processor.process(*id).await;
                if !result.ok {
                    failures += 1;
                }
                match format {
                    OutputFormat::Json => output::print_json(&result),
                    OutputFormat::Table => output::print_outcome(result.ok, &result.message),
                }
            }
            if failures > 0 {
                return Err(AppError::processing(format!(
                    "{failures} of {} attachment(s) failed.",
                    ids.len()
                )));
            }
        }
        AttachmentCommand::Failed => {
            let mut rows = Vec::new();
            for class in [MimeClass::Image, MimeClass::Other] {
                let failed = state.processor.registry().list(class).await?;
                let progress = state.processor.progress();
                rows.push(ClassRow {
                    class: class.to_string(),
                    failed: failed
                        .iter()
                        .map(i64::to_string)
                        .collect::<Vec<_>>()
                        .join(", "),
                    first_processed: marker(progress.first_processed(class).await?),
                    last_processed: marker(progress.last_processed(class).await?),
                });
            }
            output::print_list(&rows, format);
        }
    }

    Ok(())
}
