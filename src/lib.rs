pub mod app;
pub mod broker;
pub mod core;
pub mod pool;
pub mod publisher;
pub mod queue;

pub use broker::{BrokerError, InProcessBroker};
pub use pool::{Consumer, LifecycleState, PoolError, PoolOptions, WorkerPool};
pub use publisher::{MessagePublisher, Publisher};
pub use queue::BrokerMessage;
