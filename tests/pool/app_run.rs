//! Tests for the publish/consume cycle behind the binary

use subpool::app::cli::args::Args;
use subpool::app::cli::config::{PoolSettings, RunSettings};
use subpool::app::error::AppError;
use subpool::app::startup::{run, RunSummary};
use subpool::core::shutdown::ShutdownCoordinator;
use subpool::PoolError;
use clap::Parser;
use std::time::Duration;

fn settings(args: &[&str]) -> RunSettings {
    let mut argv = vec!["subpool"];
    argv.extend_from_slice(args);
    RunSettings::resolve(&Args::try_parse_from(argv).unwrap(), PoolSettings::default())
}

#[tokio::test]
async fn test_drain_run_reports_counts() {
    let settings = settings(&["--drain", "--messages", "40", "-w", "4", "-b", "8"]);

    let summary = run(&settings, &ShutdownCoordinator::new()).await.unwrap();

    assert_eq!(
        summary,
        RunSummary {
            published: 40,
            handled: 40
        }
    );
}

#[tokio::test]
async fn test_run_waits_for_shutdown_without_drain() {
    let settings = settings(&["--messages", "5", "--handler-delay", "1"]);
    let coordinator = ShutdownCoordinator::new();

    let trigger = coordinator.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        trigger.trigger_shutdown();
    });

    let summary = tokio::time::timeout(Duration::from_secs(5), run(&settings, &coordinator))
        .await
        .expect("run should return after shutdown")
        .unwrap();
    assert_eq!(summary.handled, 5);
}

#[tokio::test]
async fn test_shutdown_before_publishing_publishes_nothing() {
    let settings = settings(&["--messages", "100"]);
    let coordinator = ShutdownCoordinator::new();
    coordinator.trigger_shutdown();

    let summary = run(&settings, &coordinator).await.unwrap();

    assert_eq!(summary.published, 0);
    assert_eq!(summary.handled, 0);
}

#[tokio::test]
async fn test_invalid_pool_size_is_a_pool_error() {
    let settings = settings(&["--drain", "--pool-size", "0"]);

    let result = run(&settings, &ShutdownCoordinator::new()).await;

    assert!(matches!(
        result,
        Err(AppError::Pool(PoolError::InvalidOptions { .. }))
    ));
}
