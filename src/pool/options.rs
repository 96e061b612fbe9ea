//! Worker pool configuration
//!
//! Everything a pool needs is fixed when it is constructed: queue capacity,
//! worker count, the message handler, the three transport callbacks and the
//! raw connection options.

use crate::broker::{
    BrokerError, CloseCallback, ConnectOptions, ConnectionStatus, DisconnectCallback,
    ErrorCallback, TransportCallbacks,
};
use crate::pool::error::{PoolError, PoolResult};
use crate::queue::BrokerMessage;
use async_trait::async_trait;
use std::future::Future;
use std::marker::PhantomData;
use std::sync::Arc;

pub const DEFAULT_QUEUE_CAPACITY: usize = 1;
pub const DEFAULT_POOL_SIZE: usize = 1;

/// Handles one message at a time inside a worker
///
/// The worker that dequeued the message awaits the handler before taking
/// the next one. A handler that never completes blocks its worker and with
/// it [`WorkerPool::stop`](crate::pool::WorkerPool::stop).
#[async_trait]
pub trait MessageHandler: Send + Sync {
    async fn handle(&self, message: BrokerMessage);
}

/// Adapter for plain synchronous closures
pub struct FnHandler<F> {
    handler: F,
}

impl<F> FnHandler<F>
where
    F: Fn(BrokerMessage) + Send + Sync + 'static,
{
    pub fn new(handler: F) -> Self {
        Self { handler }
    }
}

#[async_trait]
impl<F> MessageHandler for FnHandler<F>
where
    F: Fn(BrokerMessage) + Send + Sync + 'static,
{
    async fn handle(&self, message: BrokerMessage) {
        (self.handler)(message)
    }
}

/// Adapter for closures returning a future
pub struct AsyncFnHandler<F, Fut> {
    handler: F,
    _future: PhantomData<fn() -> Fut>,
}

impl<F, Fut> AsyncFnHandler<F, Fut>
where
    F: Fn(BrokerMessage) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    pub fn new(handler: F) -> Self {
        Self {
            handler,
            _future: PhantomData,
        }
    }
}

#[async_trait]
impl<F, Fut> MessageHandler for AsyncFnHandler<F, Fut>
where
    F: Fn(BrokerMessage) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    async fn handle(&self, message: BrokerMessage) {
        (self.handler)(message).await
    }
}

/// Logs the message body
pub fn default_message_handler() -> Arc<dyn MessageHandler> {
    Arc::new(FnHandler::new(|message: BrokerMessage| {
        log::info!("broker message: {}", message.payload_str())
    }))
}

/// Construction-time settings for a [`WorkerPool`](crate::pool::WorkerPool)
///
/// # Example
///
/// ```rust
/// use subpool::pool::PoolOptions;
///
/// let options = PoolOptions::new()
///     .with_pool_size(4)
///     .with_queue_capacity(64)
///     .with_message_handler(|message| println!("{}", message.payload_str()));
///
/// assert!(options.validate().is_ok());
/// ```
#[derive(Clone)]
pub struct PoolOptions {
    queue_capacity: usize,
    pool_size: usize,
    handler: Arc<dyn MessageHandler>,
    callbacks: TransportCallbacks,
    connect_options: ConnectOptions,
}

impl Default for PoolOptions {
    fn default() -> Self {
        Self {
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            pool_size: DEFAULT_POOL_SIZE,
            handler: default_message_handler(),
            callbacks: TransportCallbacks::default(),
            connect_options: ConnectOptions::default(),
        }
    }
}

impl std::fmt::Debug for PoolOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PoolOptions")
            .field("queue_capacity", &self.queue_capacity)
            .field("pool_size", &self.pool_size)
            .field("connect_options", &self.connect_options)
            .finish_non_exhaustive()
    }
}

impl PoolOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Maximum number of messages buffered between broker and workers
    pub fn with_queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity;
        self
    }

    /// Number of concurrent workers
    pub fn with_pool_size(mut self, size: usize) -> Self {
        self.pool_size = size;
        self
    }

    pub fn with_message_handler<F>(mut self, handler: F) -> Self
    where
        F: Fn(BrokerMessage) + Send + Sync + 'static,
    {
        self.handler = Arc::new(FnHandler::new(handler));
        self
    }

    pub fn with_async_handler<F, Fut>(mut self, handler: F) -> Self
    where
        F: Fn(BrokerMessage) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.handler = Arc::new(AsyncFnHandler::new(handler));
        self
    }

    /// Use an existing [`MessageHandler`] implementation
    pub fn with_handler(mut self, handler: Arc<dyn MessageHandler>) -> Self {
        self.handler = handler;
        self
    }

    pub fn with_error_handler<F>(mut self, handler: F) -> Self
    where
        F: Fn(Option<&str>, &BrokerError) + Send + Sync + 'static,
    {
        self.callbacks.on_error = Arc::new(handler);
        self
    }

    pub fn with_disconnect_handler<F>(mut self, handler: F) -> Self
    where
        F: Fn(Option<&BrokerError>) + Send + Sync + 'static,
    {
        self.callbacks.on_disconnect = Arc::new(handler);
        self
    }

    pub fn with_close_handler<F>(mut self, handler: F) -> Self
    where
        F: Fn(ConnectionStatus) + Send + Sync + 'static,
    {
        self.callbacks.on_close = Arc::new(handler);
        self
    }

    pub fn with_connect_options(mut self, options: ConnectOptions) -> Self {
        self.connect_options = options;
        self
    }

    pub fn queue_capacity(&self) -> usize {
        self.queue_capacity
    }

    pub fn pool_size(&self) -> usize {
        self.pool_size
    }

    pub fn connect_options(&self) -> &ConnectOptions {
        &self.connect_options
    }

    pub(crate) fn handler(&self) -> Arc<dyn MessageHandler> {
        Arc::clone(&self.handler)
    }

    pub(crate) fn error_callback(&self) -> ErrorCallback {
        Arc::clone(&self.callbacks.on_error)
    }

    pub(crate) fn disconnect_callback(&self) -> DisconnectCallback {
        Arc::clone(&self.callbacks.on_disconnect)
    }

    pub(crate) fn close_callback(&self) -> CloseCallback {
        Arc::clone(&self.callbacks.on_close)
    }

    /// Reject settings a pool cannot run with
    pub fn validate(&self) -> PoolResult<()> {
        if self.pool_size == 0 {
            return Err(PoolError::InvalidOptions {
                message: "pool size must be at least 1".to_string(),
            });
        }
        if self.queue_capacity == 0 {
            return Err(PoolError::InvalidOptions {
                message: "queue capacity must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}
