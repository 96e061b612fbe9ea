//! Command-line arguments for the `subpool` binary

use crate::core::logging::LogFormat;
use clap::Parser;
use std::path::PathBuf;

/// Run a bounded worker pool against an in-process broker
///
/// Values given here override the configuration file.
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "subpool")]
#[command(about = "Bounded worker pool consuming a broker subject")]
#[command(version = crate::core::version::long_version())]
pub struct Args {
    /// Broker URL (memory://<name>)
    #[arg(short = 'u', long = "url", value_name = "URL")]
    pub url: Option<String>,

    /// Subject to subscribe to and publish on
    #[arg(short = 's', long = "subject", value_name = "SUBJECT")]
    pub subject: Option<String>,

    /// Number of concurrent workers
    #[arg(short = 'w', long = "pool-size", value_name = "COUNT")]
    pub pool_size: Option<usize>,

    /// Messages buffered between broker and workers
    #[arg(short = 'b', long = "queue-capacity", value_name = "COUNT")]
    pub queue_capacity: Option<usize>,

    /// Client name reported by the broker connections
    #[arg(long = "connection-name", value_name = "NAME")]
    pub connection_name: Option<String>,

    /// Configuration file path
    #[arg(short = 'c', long = "config-file", value_name = "FILE")]
    pub config_file: Option<PathBuf>,

    /// Number of demo messages to publish
    #[arg(short = 'n', long = "messages", value_name = "COUNT", default_value_t = 10)]
    pub messages: usize,

    /// Stop as soon as every message is published instead of waiting for Ctrl-C
    #[arg(short = 'd', long = "drain")]
    pub drain: bool,

    /// Simulated handler work per message, in milliseconds
    #[arg(long = "handler-delay", value_name = "MILLIS")]
    pub handler_delay: Option<u64>,

    /// Force coloured log output
    #[arg(long = "color", conflicts_with = "no_color")]
    pub color: bool,

    /// Disable coloured log output
    #[arg(long = "no-color")]
    pub no_color: bool,

    /// Log level
    #[arg(short = 'l', long = "log-level", value_name = "LEVEL", value_parser = ["trace", "debug", "info", "warn", "error", "off"])]
    pub log_level: Option<String>,

    /// Log output format
    #[arg(short = 'o', long = "log-format", value_name = "FORMAT")]
    pub log_format: Option<LogFormat>,

    /// Log file path (use 'none' to disable file logging)
    #[arg(short = 'f', long = "log-file", value_name = "FILE")]
    pub log_file: Option<PathBuf>,
}

impl Args {
    /// Explicit colour choice, `None` when neither flag was given
    pub fn color_override(&self) -> Option<bool> {
        match (self.color, self.no_color) {
            (true, _) => Some(true),
            (_, true) => Some(false),
            _ => None,
        }
    }

    /// Log file path with the `none` sentinel removed
    pub fn log_file_path(&self) -> Option<PathBuf> {
        self.log_file
            .clone()
            .filter(|path| path.as_os_str() != "none")
    }
}
