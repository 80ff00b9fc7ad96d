//! Job command handlers
//!
//! Handles submitting, inspecting, cancelling and waiting on jobs.

use anyhow::Result;
use clap::{Args, Subcommand};
use colored::*;
use harvest_client::HarvestClient;
use harvest_core::domain::job::{JobRecord, JobStatus};
use harvest_core::domain::request::{
    Backend, CollectionMode, JobRequest, LoginType, SaveDataOption,
};
use std::time::Duration;

use super::parse_wire;
use crate::config::Config;

/// Job subcommands
#[derive(Subcommand)]
pub enum JobCommands {
    /// Submit a collection job
    Submit(SubmitArgs),
    /// Get job details
    Get {
        /// Job ID
        id: String,
    },
    /// List all retained jobs
    List,
    /// Cancel a pending or running job
    Cancel {
        /// Job ID
        id: String,
    },
    /// Wait until a job completes or fails
    Wait {
        /// Job ID
        id: String,

        #[command(flatten)]
        wait: WaitArgs,
    },
}

/// Arguments of `job submit`
#[derive(Args)]
pub struct SubmitArgs {
    /// Backend code (xhs, dy, ks, bili, wb, tieba, zhihu)
    #[arg(short, long, value_parser = parse_wire::<Backend>)]
    pub backend: Backend,

    /// Collection mode (search, detail, creator)
    #[arg(short, long, value_parser = parse_wire::<CollectionMode>, default_value = "search")]
    pub mode: CollectionMode,

    /// Comma separated search keywords
    #[arg(short, long)]
    pub keywords: Option<String>,

    /// Target post identifier or URL; repeat or comma separate
    #[arg(short = 'n', long = "note-id", value_delimiter = ',')]
    pub note_ids: Vec<String>,

    /// Login method (qrcode, phone, cookie)
    #[arg(long, value_parser = parse_wire::<LoginType>, default_value = "qrcode")]
    pub login_type: LoginType,

    /// Credential payload for cookie login
    #[arg(long, env = "HARVEST_COOKIES", hide_env_values = true)]
    pub cookies: Option<String>,

    /// First result page
    #[arg(long, default_value_t = 1)]
    pub start_page: u32,

    /// Upper bound on collected posts
    #[arg(long, default_value_t = 15)]
    pub max_notes: u32,

    /// Skip comment collection
    #[arg(long)]
    pub no_comments: bool,

    /// Also collect replies to comments
    #[arg(long)]
    pub sub_comments: bool,

    /// Where results are saved (csv, json, sqlite, db, mongodb)
    #[arg(long, value_parser = parse_wire::<SaveDataOption>, default_value = "json")]
    pub save: SaveDataOption,

    /// Block until the job finishes
    #[arg(short, long)]
    pub wait: bool,

    #[command(flatten)]
    pub wait_args: WaitArgs,
}

/// Polling options shared by `job wait` and `job submit --wait`
#[derive(Args, Clone, Copy)]
pub struct WaitArgs {
    /// Seconds between status polls
    #[arg(long, default_value_t = 2)]
    pub interval: u64,

    /// Give up after this many seconds
    #[arg(long, default_value_t = 3600)]
    pub timeout: u64,
}

impl SubmitArgs {
    fn into_request(self) -> JobRequest {
        let mut request = JobRequest::new(self.backend, self.mode);
        request.keywords = self.keywords;
        if !self.note_ids.is_empty() {
            request.note_ids = Some(self.note_ids);
        }
        request.login_type = self.login_type;
        request.cookies = self.cookies;
        request.start_page = self.start_page;
        request.max_notes_count = self.max_notes;
        request.enable_comments = !self.no_comments;
        request.enable_sub_comments = self.sub_comments;
        request.save_data_option = self.save;
        request
    }
}

/// Handle job commands
///
/// Routes job subcommands to their respective handlers.
pub async fn handle_job_command(command: JobCommands, config: &Config) -> Result<()> {
    let client = HarvestClient::new(&config.server_url);

    match command {
        JobCommands::Submit(args) => submit_job(&client, args).await,
        JobCommands::Get { id } => get_job(&client, &id).await,
        JobCommands::List => list_jobs(&client).await,
        JobCommands::Cancel { id } => cancel_job(&client, &id).await,
        JobCommands::Wait { id, wait } => wait_for_job(&client, &id, wait).await,
    }
}

/// Submit a job, optionally waiting for it
async fn submit_job(client: &HarvestClient, args: SubmitArgs) -> Result<()> {
    let wait = args.wait;
    let wait_args = args.wait_args;
    let request = args.into_request();

    let submitted = client.submit_job(&request).await?;

    println!("{}", "✓ Job submitted".green().bold());
    println!("  ID:      {}", submitted.id.cyan());
    println!("  Status:  {}", colorize_status(&submitted.status));
    println!("  Message: {}", submitted.message);

    if wait {
        println!();
        wait_for_job(client, &submitted.id, wait_args).await?;
    }

    Ok(())
}

/// Get and display a single job
async fn get_job(client: &HarvestClient, id: &str) -> Result<()> {
    let job = client.get_job(id).await?;

    print_job_details(&job);

    Ok(())
}

/// List all jobs
async fn list_jobs(client: &HarvestClient) -> Result<()> {
    let list = client.list_jobs().await?;

    if list.jobs.is_empty() {
        println!("{}", "No jobs found.".yellow());
    } else {
        println!("{}", format!("Found {} job(s):", list.total).bold());
        println!();
        for job in &list.jobs {
            print_job_summary(job);
        }
    }

    Ok(())
}

/// Cancel a job
async fn cancel_job(client: &HarvestClient, id: &str) -> Result<()> {
    let job = client.cancel_job(id).await?;

    println!(
        "{} {} (was {})",
        "✓ Cancellation requested for".green(),
        job.id.cyan(),
        colorize_status(&job.status)
    );

    Ok(())
}

/// Poll a job until it is terminal and print the outcome
async fn wait_for_job(client: &HarvestClient, id: &str, args: WaitArgs) -> Result<()> {
    println!("{}", format!("Waiting for job {}...", id).dimmed());

    let job = client
        .wait_for_job(
            id,
            Duration::from_secs(args.interval.max(1)),
            Duration::from_secs(args.timeout),
        )
        .await?;

    print_job_details(&job);

    if job.status == JobStatus::Failed {
        anyhow::bail!("job {} failed", job.id);
    }

    Ok(())
}

/// Print a one-entry job summary
fn print_job_summary(job: &JobRecord) {
    println!("  {} Job {}", "▸".cyan(), job.id.dimmed());
    println!("    Backend:  {} ({})", job.backend, job.mode);
    println!("    Status:   {}", colorize_status(&job.status));
    println!(
        "    Created:  {}",
        job.created_at
            .format("%Y-%m-%d %H:%M:%S")
            .to_string()
            .dimmed()
    );
    println!();
}

/// Print detailed job information
fn print_job_details(job: &JobRecord) {
    println!("{}", "Job Details:".bold());
    println!("  ID:        {}", job.id.cyan());
    println!("  Backend:   {}", job.backend);
    println!("  Mode:      {}", job.mode);
    println!("  Status:    {}", colorize_status(&job.status));
    println!("  Message:   {}", job.message);
    println!("  Created:   {}", job.created_at.format("%Y-%m-%d %H:%M:%S"));

    if let Some(started) = job.started_at {
        println!("  Started:   {}", started.format("%Y-%m-%d %H:%M:%S"));
    }

    let finished = job.completed_at.or(job.failed_at);
    if let Some(finished) = finished {
        println!("  Finished:  {}", finished.format("%Y-%m-%d %H:%M:%S"));

        if let Some(started) = job.started_at {
            let seconds = finished.signed_duration_since(started).num_seconds();
            println!("  Duration:  {}s", seconds);
        }
    }

    println!("\n{}", "Parameters:".bold());
    if let Ok(pretty) = serde_json::to_string_pretty(&job.parameters) {
        println!("{}", pretty);
    }
}

/// Colorize job status for display
fn colorize_status(status: &JobStatus) -> ColoredString {
    let status_str = status.to_string();
    match status {
        JobStatus::Pending => status_str.yellow(),
        JobStatus::Running => status_str.cyan(),
        JobStatus::Completed => status_str.green(),
        JobStatus::Failed => status_str.red(),
    }
}
