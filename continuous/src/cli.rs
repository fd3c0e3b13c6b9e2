use crate::config::Config;
use crate::database::continuous::ContinuousStore;
use crate::database::init::migrate;
use crate::database::memory::MemoryStore;
use crate::database::open_interest::Window;
use crate::error::{Error, Result};
use crate::error;
use crate::services::tasks::{ContinuousTask, TaskReport};
use async_trait::async_trait;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use sqlx::PgPool;
use std::sync::Arc;
use tracing::info;

/// Shared handles for command processing.
pub struct Context {
    pub pool: Arc<PgPool>,
    pub config: Config,
    pub dry_run: bool,
}

/// Trait for processing commands
#[async_trait]
pub trait ProcessCommand {
    async fn process_command(&self, context: &Context) -> Result<()>;
}

#[derive(Debug, Parser)]
#[command(
    name = "continuous-contract",
    about = "Derive continuous futures contract series from daily open interest"
)]
pub struct CliArgs {
    /// Write to an in-memory store and print the rows instead of updating the database.
    #[arg(long, global = true)]
    pub dry_run: bool,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Recompute every product over its full open interest history.
    Full,
    /// Recompute every product over a trailing window of calendar days.
    Daily {
        #[arg(long)]
        days: Option<u32>,
    },
    /// Print a persisted continuous series as JSON lines.
    Show {
        #[arg(long)]
        code: String,
        #[arg(long)]
        start: Option<NaiveDate>,
        #[arg(long)]
        end: Option<NaiveDate>,
    },
    /// Create the tables if they do not exist.
    Migrate,
}

impl Commands {
    pub fn window(&self, config: &Config) -> Option<Window> {
        match self {
            Commands::Full => Some(Window::All),
            Commands::Daily { days } => Some(Window::LastDays(
                days.unwrap_or(config.daily_window_days),
            )),
            _ => None,
        }
    }
}

#[async_trait]
impl ProcessCommand for Commands {
    async fn process_command(&self, context: &Context) -> Result<()> {
        match self {
            Commands::Full | Commands::Daily { .. } => {
                let window = self
                    .window(&context.config)
                    .ok_or_else(|| error!(CustomError, "No window for {:?}", self))?;
                let report = run_task(context, window).await?;
                if report.is_success() {
                    Ok(())
                } else {
                    Err(error!(
                        CustomError,
                        "{} products failed: {}",
                        report.failed.len(),
                        report.failed.join(", ")
                    ))
                }
            }
            Commands::Show { code, start, end } => {
                let rows = context
                    .pool
                    .fetch_continuous_series(code, *start, *end)
                    .await?;
                for row in rows {
                    println!("{}", serde_json::to_string(&row)?);
                }
                Ok(())
            }
            Commands::Migrate => migrate(&context.pool).await,
        }
    }
}

async fn run_task(context: &Context, window: Window) -> Result<TaskReport> {
    let workers = context.config.workers;

    if context.dry_run {
        info!("Dry run, continuous rows are printed instead of stored");
        let store = Arc::new(MemoryStore::new());
        let task = ContinuousTask::new(context.pool.clone(), store.clone(), workers);
        let report = task.run(window).await?;

        for row in store.snapshot().await {
            println!("{}", serde_json::to_string(&row)?);
        }
        return Ok(report);
    }

    let task = ContinuousTask::new(context.pool.clone(), context.pool.clone(), workers);
    task.run(window).await
}
