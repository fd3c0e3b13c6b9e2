use clap::Parser;
use continuous::cli::{CliArgs, Context, ProcessCommand};
use continuous::config::Config;
use continuous::database::init::init_db;
use continuous::logger::system_logger;
use continuous::Result;
use dotenv::dotenv;
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env if available
    dotenv().ok();

    // Parse CLI arguments
    let args = CliArgs::parse();
    let config = Config::from_env()?;

    // Setup Logging
    system_logger(config.log_file.as_deref(), &config.log_level)?;

    // Initialize the database and obtain a connection pool
    let pool = init_db(&config).await?;

    let context = Context {
        pool: Arc::new(pool),
        config,
        dry_run: args.dry_run,
    };

    // Process the command
    if let Err(e) = args.command.process_command(&context).await {
        tracing::error!("Command failed: {}", e);
        return Err(e);
    }

    Ok(())
}
