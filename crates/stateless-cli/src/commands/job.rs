//! Synchronization job commands.

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use crate::output::{self, OutputFormat};
use stateless_core::error::AppError;
use stateless_service::job::JobDetail;

/// Arguments for job commands
#[derive(Debug, Args)]
pub struct JobArgs {
    /// Job subcommand
    #[command(subcommand)]
    pub command: JobCommand,
}

/// Job subcommands
#[derive(Debug, Subcommand)]
pub enum JobCommand {
    /// Create a job over the attachments an action targets
    Create {
        /// `regenerate_images`, `sync_non_images`, or empty for everything
        #[arg(short, long, default_value = "")]
        action: String,
        /// Attachments per handler invocation
        #[arg(short, long)]
        bulk_size: Option<i32>,
        /// Leave the job in `new` instead of starting it
        #[arg(long)]
        no_start: bool,
    },
    /// List jobs that have not completed
    List,
    /// Show one job with its derived URLs
    Show {
        /// Job ID
        id: i64,
    },
    /// Apply a lifecycle step: start, pause, resume or stop
    Step {
        /// Job ID
        id: i64,
        /// Step name
        step: String,
    },
}

/// One row of `job list`.
#[derive(Debug, Serialize, Tabled)]
pub struct JobRow {
    /// Job ID
    #[tabled(rename = "ID")]
    pub id: i64,
    /// Display name
    #[tabled(rename = "Label")]
    pub label: String,
    /// Targeted attachment subset
    #[tabled(rename = "Type")]
    pub action: String,
    /// Lifecycle status
    #[tabled(rename = "Status")]
    pub status: String,
    /// Attachments per invocation
    #[tabled(rename = "Bulk")]
    pub bulk_size: i32,
    /// Payload size
    #[tabled(rename = "Items")]
    pub items: usize,
    /// Synced count
    #[tabled(rename = "Synced")]
    pub synced: usize,
    /// Failed count
    #[tabled(rename = "Failed")]
    pub failed: usize,
}

impl From<&JobDetail> for JobRow {
    fn from(detail: &JobDetail) -> Self {
        let job = &detail.job;
        Self {
            id: job.id,
            label: job.label.clone(),
            action: if job.action.as_str().is_empty() {
                "all".to_string()
            } else {
                job.action.to_string()
            },
            status: job.status.to_string(),
            bulk_size: job.bulk_size,
            items: job.payload.len(),
            synced: job.synced_items.len(),
            failed: job.failed_items.len(),
        }
    }
}

/// Execute job commands
pub async fn execute(
    args: &JobArgs,
    config_path: &str,
    format: OutputFormat,
) -> Result<(), AppError> {
    let state = super::connect(config_path).await?;

    match &args.command {
        JobCommand::Create {
            action,
            bulk_size,
            no_start,
        } => {
            let job = state.jobs.create(action, *bulk_size).await?;
            output::print_success(&format!(
                "Job {} created with {} item(s).",
                job.id,
                job.payload.len()
            ));

            if !no_start {
                let result = state.jobs.step(job.id, "start").await;
                output::print_outcome(result.ok, &result.message);
            }
        }
        JobCommand::List => {
            let mut rows = Vec::new();
            for id in state.jobs.list_incomplete().await? {
                rows.push(JobRow::from(&state.jobs.detail(id).await?));
            }
            output::print_list(&rows, format);
        }
        JobCommand::Show { id } => {
            let detail = state.jobs.detail(*id).await?;
            match format {
                OutputFormat::Json => output::print_json(&detail),
                OutputFormat::Table => print_detail(&detail),
            }
        }
        JobCommand::Step { id, step } => {
            let result = state.jobs.step(*id, step).await;
            match format {
                OutputFormat::Json => output::print_json(&result),
                OutputFormat::Table => output::print_outcome(result.ok, &result.message),
            }
        }
    }

    Ok(())
}

fn print_detail(detail: &JobDetail) {
    let row = JobRow::from(detail);
    output::print_kv("ID", &row.id.to_string());
    output::print_kv("Label", &row.label);
    output::print_kv("Type", &row.action);
    output::print_kv("Status", &row.status);
    output::print_kv("Bulk size", &row.bulk_size.to_string());
    output::print_kv("Items", &row.items.to_string());
    output::print_kv("Synced", &row.synced.to_string());
    output::print_kv("Failed", &row.failed.to_string());
    output::print_kv("Pending", &detail.job.pending_items().len().to_string());
    let next: Vec<String> = detail.job.next_batch().iter().map(i64::to_string).collect();
    output::print_kv("Next batch", &next.join(", "));
    output::print_kv("Created", &detail.job.created_on.to_rfc3339());
    output::print_kv("Updated", &detail.job.updated_on.to_rfc3339());
    output::print_kv("URL", &detail.url);
    output::print_kv("Start URL", &detail.url_start);
    output::print_kv("Callback URL", &detail.callback_url);
}
