// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError, info};
use std::io::Write;

use backtrans::app_config::{Config, LogLevel};
use backtrans::server::{ServerState, run_server};

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => LogLevel::Error,
            CliLogLevel::Warn => LogLevel::Warn,
            CliLogLevel::Info => LogLevel::Info,
            CliLogLevel::Debug => LogLevel::Debug,
            CliLogLevel::Trace => LogLevel::Trace,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "backtrans")]
#[command(author, version)]
#[command(about = "Multi-model translation consensus service")]
#[command(long_about = "Serves a translation API that queries multiple LLM \
backends in parallel, verifies each candidate through round-trip \
back-translation, and returns the best-scoring result.

CONFIGURATION:
    Settings are read from a JSON config file (see --config). The API key can
    also be supplied through the OPENROUTER_API_KEY environment variable.")]
struct CommandLineOptions {
    /// Configuration file path
    #[arg(short, long, default_value = "backtrans.json")]
    config_path: String,

    /// Bind address override, e.g. 127.0.0.1:8000
    #[arg(short, long)]
    bind: Option<String>,

    /// API key override (falls back to config file, then environment)
    #[arg(long, env = "OPENROUTER_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,
}

/// Custom logger implementation writing colored lines to stderr
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    /// Install as the global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        let logger = Box::new(CustomLogger::new(level));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    fn color_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "\x1B[1;31m",
            Level::Warn => "\x1B[1;33m",
            Level::Info => "\x1B[0;32m",
            Level::Debug => "\x1B[0;36m",
            Level::Trace => "\x1B[0;90m",
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S%.3f");
            let color = Self::color_for_level(record.level());
            let mut stderr = std::io::stderr();
            let _ = writeln!(
                stderr,
                "{}{} {:5} {}\x1B[0m",
                color,
                now,
                record.level(),
                record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let options = CommandLineOptions::parse();

    let mut config = Config::from_file_or_default(&options.config_path)
        .with_context(|| format!("Failed to load configuration from {}", options.config_path))?
        .with_env_overrides();

    if let Some(api_key) = options.api_key {
        config.provider.api_key = api_key;
    }
    if let Some(bind) = options.bind {
        config.server.bind = bind;
    }
    if let Some(level) = options.log_level {
        config.log_level = level.into();
    }

    CustomLogger::init(config.log_level.to_level_filter())
        .map_err(|e| anyhow::anyhow!("Failed to initialize logger: {}", e))?;

    // Credential and model-set validation happens once, here at the boundary
    config.validate()?;

    info!(
        "Starting consensus service with {} models",
        config.consensus.models.len()
    );

    let state = ServerState::from_config(&config);
    run_server(state, &config.server.bind).await
}
