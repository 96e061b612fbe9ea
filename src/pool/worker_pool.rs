//! Bounded worker pool draining one subscription
//!
//! Construction wires connector → connection → subscription → queue. `run`
//! spawns the workers, `stop` retires the pool for good:
//!
//! 1. unsubscribe, so nothing new enters the queue
//! 2. close the queue, so workers exit once it is drained
//! 3. wait for every worker
//! 4. close the connection
//! 5. mark the pool stopped

use crate::broker::{BrokerConnection, Connector, Subscription};
use crate::pool::error::{PoolError, PoolResult};
use crate::pool::lifecycle::{LifecycleGuard, LifecycleState};
use crate::pool::options::{MessageHandler, PoolOptions};
use crate::queue::SubscriptionQueue;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task::JoinSet;

/// Decrements the live worker count when a worker task ends, panics included
struct ActiveWorker {
    active: Arc<AtomicUsize>,
}

impl Drop for ActiveWorker {
    fn drop(&mut self) {
        self.active.fetch_sub(1, Ordering::AcqRel);
    }
}

/// Fixed-size pool of workers consuming one broker subscription
///
/// # Example
///
/// ```rust
/// use subpool::broker::{BrokerConnection, ConnectOptions, Connector, InProcessBroker};
/// use subpool::pool::{PoolOptions, WorkerPool};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let broker = InProcessBroker::new("docs");
/// let options = PoolOptions::new()
///     .with_pool_size(2)
///     .with_queue_capacity(16)
///     .with_message_handler(|message| println!("{}", message.payload_str()));
///
/// let pool = WorkerPool::connect(&broker, broker.url(), "test", options).await?;
/// pool.run().await?;
///
/// let publisher = broker.connect(broker.url(), &ConnectOptions::new()).await?;
/// publisher.publish("test", b"hello".to_vec()).await?;
///
/// pool.stop().await?;
/// assert_eq!(pool.handled_count(), 1);
/// # Ok(())
/// # }
/// ```
pub struct WorkerPool {
    shared: Arc<PoolShared>,
    pool_size: usize,
    handler: Arc<dyn MessageHandler>,
    active_workers: Arc<AtomicUsize>,
}

/// State the shutdown task needs once it outlives the `stop` call
struct PoolShared {
    subject: String,
    connection: Box<dyn BrokerConnection>,
    subscription: Mutex<Option<Box<dyn Subscription>>>,
    queue: Arc<SubscriptionQueue>,
    lifecycle: LifecycleGuard,
    workers: Mutex<JoinSet<()>>,
    handled: Arc<AtomicU64>,
}

impl WorkerPool {
    /// Connect to `url`, subscribe to `subject` and return an idle pool
    ///
    /// If subscribing fails the connection is closed before the error is
    /// returned.
    pub async fn connect<C>(
        connector: &C,
        url: &str,
        subject: &str,
        options: PoolOptions,
    ) -> PoolResult<Self>
    where
        C: Connector + ?Sized,
    {
        options.validate()?;

        let connection = connector
            .connect(url, options.connect_options())
            .await
            .map_err(PoolError::Connection)?;

        connection.set_error_handler(options.error_callback());
        connection.set_disconnect_handler(options.disconnect_callback());
        connection.set_close_handler(options.close_callback());

        let queue = Arc::new(SubscriptionQueue::new(options.queue_capacity()));

        let subscription = match connection.subscribe(subject, Arc::clone(&queue)).await {
            Ok(subscription) => subscription,
            Err(source) => {
                connection.close().await;
                return Err(PoolError::Subscription {
                    subject: subject.to_string(),
                    source,
                });
            }
        };

        log::debug!(
            "worker pool subscribed to '{}' (workers: {}, queue capacity: {})",
            subject,
            options.pool_size(),
            queue.capacity()
        );

        Ok(Self {
            shared: Arc::new(PoolShared {
                subject: subject.to_string(),
                connection,
                subscription: Mutex::new(Some(subscription)),
                queue,
                lifecycle: LifecycleGuard::new(),
                workers: Mutex::new(JoinSet::new()),
                handled: Arc::new(AtomicU64::new(0)),
            }),
            pool_size: options.pool_size(),
            handler: options.handler(),
            active_workers: Arc::new(AtomicUsize::new(0)),
        })
    }

    /// Spawn the workers
    ///
    /// Only an idle pool can be started; any other state yields
    /// [`PoolError::AlreadyRunning`] without side effects.
    pub async fn run(&self) -> PoolResult<()> {
        // Held across the transition so a concurrent stop never misses a worker
        let mut workers = self.shared.workers.lock().await;
        self.shared.lifecycle.try_start()?;

        for worker_id in 0..self.pool_size {
            self.active_workers.fetch_add(1, Ordering::AcqRel);
            let guard = ActiveWorker {
                active: Arc::clone(&self.active_workers),
            };

            workers.spawn(worker_loop(
                worker_id,
                Arc::clone(&self.shared.queue),
                Arc::clone(&self.handler),
                Arc::clone(&self.shared.handled),
                guard,
            ));
        }

        log::debug!(
            "worker pool on '{}' started {} workers",
            self.shared.subject,
            self.pool_size
        );
        Ok(())
    }

    /// Retire the pool
    ///
    /// Every message queued when the subscription ends is handled before
    /// this returns (provided the pool was running). A pool that was never
    /// started discards its queue instead. A second call yields
    /// [`PoolError::AlreadyStopped`].
    ///
    /// A failing unsubscribe does not interrupt shutdown: the queue is still
    /// closed, workers are still awaited and the connection is still closed
    /// before the unsubscribe error is returned.
    ///
    /// The shutdown itself runs on its own task. Dropping this future (for
    /// example under `tokio::time::timeout`) stops the waiting, not the
    /// shutdown: the pool still reaches [`LifecycleState::Stopped`] and the
    /// connection is still closed.
    pub async fn stop(&self) -> PoolResult<()> {
        let previous = self.shared.lifecycle.begin_stop()?;

        let shutdown = tokio::spawn(Arc::clone(&self.shared).shutdown(previous));
        match shutdown.await {
            Ok(result) => result,
            Err(error) if error.is_panic() => std::panic::resume_unwind(error.into_panic()),
            Err(error) => {
                log::warn!(
                    "shutdown of worker pool on '{}' was cancelled: {}",
                    self.shared.subject,
                    error
                );
                Ok(())
            }
        }
    }

    /// Current lifecycle state
    ///
    /// [`LifecycleState::Stopping`] is transient: it is reported only while
    /// a `stop` is between unsubscribing and closing the connection, and is
    /// always followed by [`LifecycleState::Stopped`].
    pub fn state(&self) -> LifecycleState {
        self.shared.lifecycle.state()
    }

    pub fn subject(&self) -> &str {
        &self.shared.subject
    }

    pub fn pool_size(&self) -> usize {
        self.pool_size
    }

    pub fn queue_capacity(&self) -> usize {
        self.shared.queue.capacity()
    }

    /// Messages waiting in the queue
    pub fn queued(&self) -> usize {
        self.shared.queue.len()
    }

    /// Worker tasks that have not yet exited
    pub fn active_workers(&self) -> usize {
        self.active_workers.load(Ordering::Acquire)
    }

    /// Messages whose handler has completed
    pub fn handled_count(&self) -> u64 {
        self.shared.handled.load(Ordering::Acquire)
    }
}

impl PoolShared {
    async fn shutdown(self: Arc<Self>, previous: LifecycleState) -> PoolResult<()> {
        let unsubscribed = self.unsubscribe().await;

        if let Err(error) = self.queue.close() {
            log::warn!("failed to close queue for '{}': {}", self.subject, error);
        }

        if previous == LifecycleState::Idle {
            match self.queue.clear() {
                Ok(0) => {}
                Ok(discarded) => log::info!(
                    "worker pool on '{}' stopped before running, discarded {} queued messages",
                    self.subject,
                    discarded
                ),
                Err(error) => log::warn!("failed to clear queue for '{}': {}", self.subject, error),
            }
        }

        self.join_workers().await;
        self.connection.close().await;
        self.lifecycle.finish_stop();

        log::debug!(
            "worker pool on '{}' stopped after handling {} messages",
            self.subject,
            self.handled.load(Ordering::Acquire)
        );
        unsubscribed
    }

    async fn unsubscribe(&self) -> PoolResult<()> {
        let subscription = self.subscription.lock().await.take();
        match subscription {
            Some(mut subscription) => {
                subscription
                    .unsubscribe()
                    .await
                    .map_err(|source| PoolError::Unsubscribe {
                        subject: self.subject.clone(),
                        source,
                    })
            }
            None => Ok(()),
        }
    }

    async fn join_workers(&self) {
        let mut workers = self.workers.lock().await;
        while let Some(result) = workers.join_next().await {
            if let Err(error) = result {
                if error.is_panic() {
                    log::warn!("worker on '{}' panicked: {}", self.subject, error);
                } else {
                    log::warn!("worker on '{}' was cancelled: {}", self.subject, error);
                }
            }
        }
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        if !self.shared.lifecycle.state().is_retired() {
            // Release producers blocked on a full queue; the join set aborts the workers
            if let Err(error) = self.shared.queue.close() {
                log::warn!(
                    "failed to close queue for '{}' on drop: {}",
                    self.shared.subject,
                    error
                );
            }
            log::debug!("worker pool on '{}' dropped without stop", self.shared.subject);
        }
    }
}

async fn worker_loop(
    worker_id: usize,
    queue: Arc<SubscriptionQueue>,
    handler: Arc<dyn MessageHandler>,
    handled: Arc<AtomicU64>,
    _active: ActiveWorker,
) {
    loop {
        match queue.pop().await {
            Ok(Some(message)) => {
                handler.handle(message).await;
                handled.fetch_add(1, Ordering::AcqRel);
            }
            Ok(None) => break,
            Err(error) => {
                log::error!("worker {} stopping: {}", worker_id, error);
                break;
            }
        }
    }
    log::trace!("worker {} exited", worker_id);
}
