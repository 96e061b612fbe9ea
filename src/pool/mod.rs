//! Worker Pool Module
//!
//! A fixed number of workers draining one bounded subscription queue.
//!
//! ```text
//!   Broker ──deliver──▶ ┌──────────────────────┐      ┌──────────┐
//!                       │  SubscriptionQueue   │──pop─▶│ worker 0 │──▶ handler
//!                       │  (capacity N)        │──pop─▶│ worker 1 │──▶ handler
//!                       └──────────────────────┘  ... └──────────┘
//! ```
//!
//! Lifecycle is one-way: `idle → running → stopped` (or `idle → stopped`).
//! Starting twice yields [`PoolError::AlreadyRunning`], stopping twice
//! [`PoolError::AlreadyStopped`]; neither is fatal.

mod error;
mod lifecycle;
mod options;
mod traits;
mod worker_pool;

pub use error::{PoolError, PoolResult};
pub use lifecycle::{LifecycleGuard, LifecycleState};
pub use options::{
    default_message_handler, AsyncFnHandler, FnHandler, MessageHandler, PoolOptions,
    DEFAULT_POOL_SIZE, DEFAULT_QUEUE_CAPACITY,
};
pub use traits::Consumer;
pub use worker_pool::WorkerPool;

#[cfg(test)]
mod tests;
