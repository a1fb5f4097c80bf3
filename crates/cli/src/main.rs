//! `rusty-automation-tool` CLI entry-point.
//!
//! Available sub-commands:
//! - `serve`    — start the API server.
//! - `worker`   — start a queue worker.
//! - `migrate`  — run pending database migrations.
//! - `validate` — validate a workflow JSON file.

use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tracing::{error, info, warn};

use engine::config::{DbConfig, HttpConfig, RetryConfig};
use engine::{Registry, TriggerEvent, WorkflowRunner};
use queue::{JobTransport, PostgresJobTransport};

#[derive(Parser)]
#[command(
    name = "rusty-automation-tool",
    about = "High-performance workflow automation engine",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Start the REST API server.
    Serve {
        #[arg(long)]
        bind: Option<String>,
    },
    /// Start a background worker that processes queued jobs.
    Worker,
    /// Run pending database migrations.
    Migrate {
        #[arg(long, env = "DATABASE_URL")]
        database_url: String,
    },
    /// Validate a workflow definition JSON file.
    Validate {
        /// Path to the workflow JSON file.
        path: std::path::PathBuf,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Command::Serve { bind } => {
            let db_config = DbConfig::from_env();
            let http_config = HttpConfig::from_env();
            let bind = bind.unwrap_or(http_config.bind_addr);

            info!("Starting API server on {bind}");
            let pool = db::pool::create_pool(&db_config.database_url, db_config.max_connections)
                .await
                .expect("failed to connect to database");

            let transport: Arc<dyn JobTransport> = Arc::new(PostgresJobTransport::new(pool.clone()));
            api::serve(&bind, pool, transport).await.unwrap();
        }
        Command::Worker => {
            info!("Starting background worker");
            run_worker().await;
        }
        Command::Migrate { database_url } => {
            info!("Running migrations against {database_url}");
            let pool = db::pool::create_pool(&database_url, 2)
                .await
                .expect("failed to connect to database");
            db::pool::run_migrations(&pool)
                .await
                .expect("migration failed");
            info!("Migrations applied successfully");
        }
        Command::Validate { path } => {
            let content = std::fs::read_to_string(&path)
                .unwrap_or_else(|e| panic!("cannot read file {}: {e}", path.display()));

            let workflow: engine::Workflow = serde_json::from_str(&content)
                .unwrap_or_else(|e| panic!("invalid JSON: {e}"));

            match engine::dag::topological_sort(&workflow.nodes, &workflow.edges) {
                Ok(order) => {
                    let ids: Vec<&str> = order.iter().map(|n| n.id.as_str()).collect();
                    println!("workflow is valid. Execution order: {ids:?}");
                }
                Err(e) => {
                    eprintln!("validation failed: {e}");
                    std::process::exit(1);
                }
            }
        }
    }
}

/// Poll the job queue forever, running each claimed job to completion via
/// [`WorkflowRunner`]. No graceful shutdown: `Ctrl-C` kills it mid-job,
/// which is fine — a job that's never acked gets picked up again later.
async fn run_worker() {
    let db_config = DbConfig::from_env();
    let retry_config = RetryConfig::from_env();
    let http_config = HttpConfig::from_env();

    let pool = db::pool::create_pool(&db_config.database_url, db_config.max_connections)
        .await
        .expect("failed to connect to database");

    let transport = PostgresJobTransport::new(pool.clone());
    let runner = WorkflowRunner::new(pool, Registry::with_http_timeout(http_config.request_timeout));

    loop {
        match transport.poll().await {
            Ok(Some(job)) => {
                info!("processing job {} (execution {})", job.id, job.execution_id);

                let result = runner
                    .run(job.workflow_id, job.owner_id, TriggerEvent::with_data(job.payload.clone()))
                    .await;

                match result {
                    Ok(_) => {
                        if let Err(e) = transport.ack(job.id).await {
                            error!("failed to ack job {}: {}", job.id, e);
                        }
                    }
                    Err(err) => {
                        let max_attempts = if err.is_retriable() { retry_config.max_retries as i32 } else { 0 };
                        warn!("job {} failed ({}), max_attempts={}", job.id, err, max_attempts);
                        if let Err(e) = transport.nack(job.id, max_attempts).await {
                            error!("failed to nack job {}: {}", job.id, e);
                        }
                    }
                }
            }
            Ok(None) => {
                tokio::time::sleep(Duration::from_millis(500)).await;
            }
            Err(e) => {
                error!("failed to poll job queue: {}", e);
                tokio::time::sleep(retry_config.retry_base_delay).await;
            }
        }
    }
}
