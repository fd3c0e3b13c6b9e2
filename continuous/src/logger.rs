use crate::Result;
use std::fs::File;
use std::sync::Mutex;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::fmt::Layer;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::Registry;

/// Installs the global subscriber. With a log file the output is JSON lines,
/// otherwise human readable lines on stdout.
pub fn system_logger(log_file: Option<&str>, log_level: &str) -> Result<()> {
    let file_layer = match log_file {
        Some(path) => {
            let file = File::create(path)?;
            Some(
                Layer::new()
                    .json()
                    .with_writer(Mutex::new(file))
                    .with_file(true)
                    .with_line_number(true)
                    .with_thread_ids(true)
                    .with_target(true)
                    .with_span_events(FmtSpan::CLOSE),
            )
        }
        None => None,
    };

    let stdout_layer = match log_file {
        Some(_) => None,
        None => Some(Layer::new().with_writer(std::io::stdout).with_target(true)),
    };

    // Create an EnvFilter layer to control log levels
    let filter_layer = EnvFilter::new(log_level);

    let subscriber = Registry::default()
        .with(file_layer)
        .with(stdout_layer)
        .with(filter_layer);

    // Set the subscriber as the global default
    tracing::subscriber::set_global_default(subscriber)?;

    tracing::info!("Logging system initialized successfully.");

    Ok(())
}
