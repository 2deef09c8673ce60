//! conductor-worker
//!
//! Polls one task queue on a Conductor server and answers every task with an
//! echo of its input. Useful to check connectivity and queue wiring.
//! With `--demo` it runs against an in-process queue instead of a server.

mod demo;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use clap::Parser;
use conductor_core::config::{DEFAULT_SERVER_URL, SERVER_URL_ENV};
use conductor_core::impls::HttpTaskResourceApi;
use conductor_core::ports::TaskExecutor;
use conductor_core::{
    Configuration, Task, TaskExecutionError, TaskResult, TaskRunner, TaskRunnerConfig,
};
use serde_json::Value;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "conductor-worker")]
#[command(about = "Poll a Conductor task queue and echo task input back as output")]
#[command(version)]
struct Cli {
    /// Server API base URL
    #[arg(long, env = SERVER_URL_ENV, default_value = DEFAULT_SERVER_URL)]
    server_url: String,

    /// Task definition name (queue) to poll
    #[arg(short, long)]
    task_name: String,

    /// Seconds to wait after a poll that returned nothing
    #[arg(short, long, default_value_t = 0.1)]
    poll_interval: f64,

    /// Worker id sent with each poll
    #[arg(short, long)]
    worker_id: Option<String>,

    /// Domain to poll in
    #[arg(short, long)]
    domain: Option<String>,

    /// Per-request HTTP timeout in seconds
    #[arg(long)]
    request_timeout: Option<u64>,

    /// Run against an in-process queue seeded with tasks instead of a server
    #[arg(long)]
    demo: bool,

    /// Number of tasks to seed in demo mode
    #[arg(long, default_value_t = 3)]
    demo_tasks: usize,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

/// Completes every task, copying `input_data` into `output_data`.
struct EchoExecutor {
    worker_id: Option<String>,
}

#[async_trait]
impl TaskExecutor for EchoExecutor {
    async fn execute(&self, task: &Task) -> Result<TaskResult, TaskExecutionError> {
        let mut result = TaskResult::from_task(task, self.worker_id.as_deref())
            .completed()
            .with_output(Value::Object(task.input_data.clone()));
        result.log(format!("echoed {} input fields", task.input_data.len()));
        Ok(result)
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut builder = TaskRunnerConfig::builder(&cli.task_name).poll_interval_secs(cli.poll_interval);
    if let Some(worker_id) = &cli.worker_id {
        builder = builder.worker_id(worker_id);
    }
    if let Some(domain) = &cli.domain {
        builder = builder.domain(domain);
    }
    let config = builder.build().context("invalid worker settings")?;

    let executor = Arc::new(EchoExecutor {
        worker_id: config.worker_id.clone(),
    });

    if cli.demo {
        demo::run_demo(config, executor, cli.demo_tasks).await;
        return Ok(());
    }

    let mut configuration =
        Configuration::new(&cli.server_url).context("invalid --server-url")?;
    if let Some(secs) = cli.request_timeout {
        configuration = configuration.with_request_timeout(Duration::from_secs(secs));
    }
    let task_resource =
        HttpTaskResourceApi::new(&configuration).context("failed to create HTTP client")?;

    info!(server_url = %configuration.server_api_url, "starting conductor worker");
    let runner = TaskRunner::new(Arc::new(task_resource), config, executor);
    let handle = tokio::spawn(async move { runner.run().await });

    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for Ctrl+C")?;
    info!("received Ctrl+C, stopping worker");
    handle.abort();
    let _ = handle.await;

    Ok(())
}
