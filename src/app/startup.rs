//! Binary entry point
//!
//! Wires an in-process broker, a worker pool and a publisher together,
//! publishes the requested number of messages and shuts the pool down
//! either straight away (`--drain`) or on the first interrupt.

use crate::app::cli::args::Args;
use crate::app::cli::config::{PoolSettings, RunSettings};
use crate::app::error::AppError;
use crate::broker::InProcessBroker;
use crate::core::error_handling::log_error_with_context;
use crate::core::logging::init_logging;
use crate::core::shutdown::ShutdownCoordinator;
use crate::pool::WorkerPool;
use crate::publisher::Publisher;
use clap::Parser;
use std::io::IsTerminal;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// What a run accomplished
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub published: usize,
    pub handled: u64,
}

/// Parse the command line, run, and return the process exit code
pub async fn startup() -> i32 {
    let args = Args::parse();

    let file_settings = match PoolSettings::load(args.config_file.as_deref()).await {
        Ok(settings) => settings,
        Err(error) => {
            // Logging is not up yet
            eprintln!("Error: {}", error);
            return 1;
        }
    };
    let settings = RunSettings::resolve(&args, file_settings);

    let use_color = settings
        .color
        .unwrap_or_else(|| std::io::stderr().is_terminal());
    let log_file = settings
        .log_file
        .as_ref()
        .map(|path| path.to_string_lossy().into_owned());
    if let Err(error) = init_logging(
        settings.log_level.as_deref(),
        settings.log_format,
        log_file.as_deref(),
        use_color,
    ) {
        eprintln!(
            "Error: {}",
            AppError::Logging {
                message: error.to_string()
            }
        );
        return 1;
    }

    let coordinator = ShutdownCoordinator::new();
    coordinator.install_signal_handlers();

    match run(&settings, &coordinator).await {
        Ok(summary) => {
            println!(
                "published {} messages, handled {}",
                summary.published, summary.handled
            );
            0
        }
        Err(error) => {
            log_error_with_context(&error, "Running worker pool");
            1
        }
    }
}

/// Run one publish/consume cycle with the given settings
pub async fn run(
    settings: &RunSettings,
    coordinator: &ShutdownCoordinator,
) -> Result<RunSummary, AppError> {
    let broker = InProcessBroker::new(settings.broker_name()?);

    let handled = Arc::new(AtomicU64::new(0));
    let counter = Arc::clone(&handled);
    let delay = settings.handler_delay_ms.map(Duration::from_millis);
    let options = settings.pool_options().with_async_handler(move |message| {
        let counter = Arc::clone(&counter);
        async move {
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }
            log::debug!(
                "handled #{} on '{}': {}",
                message.header.sequence,
                message.subject,
                message.payload_str()
            );
            counter.fetch_add(1, Ordering::AcqRel);
        }
    });

    let pool = WorkerPool::connect(&broker, &settings.url, &settings.subject, options).await?;
    pool.run().await?;
    log::info!(
        "worker pool on '{}' running with {} workers",
        pool.subject(),
        pool.pool_size()
    );

    let publisher =
        Publisher::connect(&broker, &settings.url, settings.connect_options("publisher")).await?;

    let mut published = 0;
    for index in 0..settings.messages {
        if coordinator.is_shutdown_requested() {
            break;
        }
        let payload = format!("message {}", index + 1);
        publisher
            .publish(&settings.subject, payload.into_bytes())
            .await?;
        published += 1;
    }
    log::info!("published {} messages to '{}'", published, settings.subject);

    if !settings.drain && !coordinator.is_shutdown_requested() {
        log::info!("waiting for interrupt; press Ctrl-C to stop");
        coordinator.wait().await;
    }

    let stopped = pool.stop().await;
    publisher.close().await?;
    stopped?;

    Ok(RunSummary {
        published,
        handled: handled.load(Ordering::Acquire),
    })
}
