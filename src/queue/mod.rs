//! Subscription Queue Component
//!
//! The bounded queue that a broker subscription feeds and a worker pool
//! drains.
//!
//! # Overview
//!
//! - **Bounded**: capacity fixed at construction; producers wait while full
//! - **Multiple Consumers**: every message is taken by exactly one consumer
//! - **Sequence Ordering**: each accepted message gets the next delivery sequence
//! - **Explicit Close**: closing rejects producers but lets consumers drain
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────┐
//! │  Broker delivery     │  push (waits while full)
//! └──────────┬───────────┘
//!            ▼
//! ┌─────────────────────────────────────┐
//! │ SubscriptionQueue (capacity N)      │
//! │  ┌───┬───┬───┬───┐                  │
//! │  │ 1 │ 2 │ 3 │...│                  │
//! │  └───┴───┴───┴───┘                  │
//! └────┬─────────┬─────────┬────────────┘
//!      │ pop     │ pop     │ pop
//! ┌────┴────┐ ┌──┴──────┐ ┌┴─────────┐
//! │Worker 0 │ │Worker 1 │ │Worker 2  │ (shared position)
//! └─────────┘ └─────────┘ └──────────┘
//! ```
//!
//! # Example Usage
//!
//! ```rust
//! use subpool::queue::{BrokerMessage, SubscriptionQueue};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let queue = SubscriptionQueue::new(16);
//! queue.push(BrokerMessage::new("jobs", "payload")).await?;
//! queue.close()?;
//!
//! while let Some(message) = queue.pop().await? {
//!     println!("{}: {}", message.header.sequence, message.payload_str());
//! }
//! # Ok(())
//! # }
//! ```

mod error;
mod internal;
mod message;

pub use error::{QueueError, QueueResult};
pub use internal::SubscriptionQueue;
pub use message::{BrokerMessage, MessageHeader};
