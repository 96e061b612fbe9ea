//! Reference scenarios for the worker pool

use crate::common::Collected;
use std::collections::HashSet;
use std::time::Duration;
use subpool::broker::{ConnectOptions, InProcessBroker};
use subpool::{PoolError, PoolOptions, Publisher, WorkerPool};

async fn publisher(broker: &InProcessBroker) -> Publisher {
    Publisher::connect(broker, broker.url(), ConnectOptions::new().with_name("scenario"))
        .await
        .expect("Should connect publisher")
}

#[tokio::test]
async fn test_scenario_single_message() {
    let broker = InProcessBroker::new("scenario-a");
    let collected = Collected::default();
    let sink = collected.clone();
    let options = PoolOptions::new()
        .with_pool_size(1)
        .with_queue_capacity(1)
        .with_message_handler(move |message| sink.push(message));
    let pool = WorkerPool::connect(&broker, broker.url(), "test", options)
        .await
        .unwrap();

    publisher(&broker)
        .await
        .publish("test", b"hello".to_vec())
        .await
        .unwrap();
    pool.run().await.unwrap();

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(collected.snapshot(), vec!["hello".to_string()]);
    assert!(pool.stop().await.is_ok());
}

#[tokio::test]
async fn test_scenario_run_twice() {
    let broker = InProcessBroker::new("scenario-b");
    let pool = WorkerPool::connect(&broker, broker.url(), "test", PoolOptions::new())
        .await
        .unwrap();

    assert_eq!(pool.run().await, Ok(()));
    assert_eq!(pool.run().await, Err(PoolError::AlreadyRunning));
    assert_eq!(pool.active_workers(), pool.pool_size());

    pool.stop().await.unwrap();
}

#[tokio::test]
async fn test_scenario_stop_twice_without_run() {
    let broker = InProcessBroker::new("scenario-c");
    let pool = WorkerPool::connect(&broker, broker.url(), "test", PoolOptions::new())
        .await
        .unwrap();

    assert_eq!(pool.stop().await, Ok(()));
    assert_eq!(pool.stop().await, Err(PoolError::AlreadyStopped));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_scenario_hundred_messages_four_workers() {
    let broker = InProcessBroker::new("scenario-d");
    let collected = Collected::default();
    let sink = collected.clone();
    let options = PoolOptions::new()
        .with_pool_size(4)
        .with_message_handler(move |message| sink.push(message));
    let pool = WorkerPool::connect(&broker, broker.url(), "test", options)
        .await
        .unwrap();
    pool.run().await.unwrap();

    let publisher = publisher(&broker).await;
    for i in 0..100 {
        publisher
            .publish("test", format!("{}", i).into_bytes())
            .await
            .unwrap();
    }
    pool.stop().await.unwrap();

    let handled = collected.snapshot();
    let unique: HashSet<String> = handled.iter().cloned().collect();
    let expected: HashSet<String> = (0..100).map(|i| i.to_string()).collect();
    assert_eq!(handled.len(), 100);
    assert_eq!(unique, expected);
    assert_eq!(pool.active_workers(), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_publishers_are_all_delivered() {
    let broker = InProcessBroker::new("scenario-many-publishers");
    let collected = Collected::default();
    let sink = collected.clone();
    let options = PoolOptions::new()
        .with_pool_size(3)
        .with_queue_capacity(2)
        .with_message_handler(move |message| sink.push(message));
    let pool = WorkerPool::connect(&broker, broker.url(), "test", options)
        .await
        .unwrap();
    pool.run().await.unwrap();

    let mut tasks = Vec::new();
    for producer in 0..4 {
        let publisher = publisher(&broker).await;
        tasks.push(tokio::spawn(async move {
            for i in 0..25 {
                publisher
                    .publish("test", format!("{}-{}", producer, i).into_bytes())
                    .await
                    .unwrap();
            }
        }));
    }
    for task in futures::future::join_all(tasks).await {
        task.unwrap();
    }
    pool.stop().await.unwrap();

    let unique: HashSet<String> = collected.snapshot().into_iter().collect();
    assert_eq!(unique.len(), 100);
}
