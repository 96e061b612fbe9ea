//! Caller-facing consumer trait

use crate::pool::error::PoolResult;
use crate::pool::lifecycle::LifecycleState;
use crate::pool::worker_pool::WorkerPool;
use async_trait::async_trait;

/// Something that can be started once and stopped once
///
/// Lets callers hold a pool behind a trait object or swap in a mock.
#[async_trait]
pub trait Consumer: Send + Sync {
    async fn run(&self) -> PoolResult<()>;

    async fn stop(&self) -> PoolResult<()>;

    fn state(&self) -> LifecycleState;
}

#[async_trait]
impl Consumer for WorkerPool {
    async fn run(&self) -> PoolResult<()> {
        WorkerPool::run(self).await
    }

    async fn stop(&self) -> PoolResult<()> {
        WorkerPool::stop(self).await
    }

    fn state(&self) -> LifecycleState {
        WorkerPool::state(self)
    }
}
