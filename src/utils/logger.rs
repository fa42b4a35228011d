use crate::config::toml_config::LoggingConfig;
use crate::utils::error::{Result, WhisperError};
use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

fn build_filter(verbose: bool, level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("whisperwire=debug,info")
        } else {
            EnvFilter::new(format!("whisperwire={level},warn"))
        }
    })
}

/// Installs the global subscriber: compact stdout, plus an optional log file.
pub fn init_logger(verbose: bool, config: &LoggingConfig) -> Result<()> {
    let filter = build_filter(verbose, config.level());

    let file_layer = if config.log_to_file {
        let path = Path::new(&config.log_file_path);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        let layer = tracing_subscriber::fmt::layer()
            .with_ansi(false)
            .with_writer(Mutex::new(file));

        if config.json {
            Some(layer.json().boxed())
        } else {
            Some(layer.boxed())
        }
    } else {
        None
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .compact(),
        )
        .try_init()
        .map_err(|e| WhisperError::config(format!("logger already initialised: {}", e)))
}

