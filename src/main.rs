use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use qaplan::batch::{resolve_ticket_ids, BatchDriver};
use qaplan::completion::build_backend;
use qaplan::config::AppConfig;
use qaplan::pipeline::{PipelineRunner, RetryPolicy};
use qaplan::tracker::jira::JiraClient;

#[derive(Parser)]
#[command(name = "qaplan", about = "Generate QA test plans for issue tracker tickets")]
struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<String>,

    /// Comma-separated ticket IDs; overrides JIRA_TICKET_IDS
    #[arg(short, long)]
    tickets: Option<String>,

    /// Emit logs as JSON lines
    #[arg(long)]
    json_logs: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if cli.json_logs {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }

    let config = AppConfig::load(cli.config.as_deref())?;

    let ticket_ids = resolve_ticket_ids(cli.tickets, &config.batch)?;
    if ticket_ids.is_empty() {
        return Ok(());
    }

    tracing::info!(
        tickets = ticket_ids.len(),
        tracker = %config.jira.base_url,
        provider = ?config.completion.provider,
        model = %config.completion.model,
        "Starting test plan batch"
    );

    let tracker = Arc::new(JiraClient::new(&config.jira)?);
    let backend = build_backend(&config.completion)?;
    let runner = PipelineRunner::new(tracker, backend, RetryPolicy::from(&config.retry));

    let report = BatchDriver::new(runner).run(&ticket_ids).await;

    tracing::info!(
        total = report.entries.len(),
        published = report.published(),
        skipped = report.skipped(),
        rejected = report.rejected(),
        failed = report.failed(),
        elapsed_ms = (report.finished_at - report.started_at).num_milliseconds(),
        "Batch complete"
    );

    Ok(())
}
