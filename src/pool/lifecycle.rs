//! Lifecycle state machine for the worker pool
//!
//! The pool moves `idle → running → stopped` or `idle → stopped`; there is
//! no restart. `stopping` is a transient state held while shutdown is in
//! progress so a concurrent second `stop` is rejected instead of racing the
//! first one.

use crate::pool::error::{PoolError, PoolResult};
use std::sync::atomic::{AtomicU8, Ordering};

/// Observable state of a worker pool
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, strum_macros::Display, strum_macros::EnumString,
)]
#[strum(serialize_all = "lowercase")]
#[repr(u8)]
pub enum LifecycleState {
    Idle = 0,
    Running = 1,
    /// Transient: shutdown has begun and will end in `Stopped`
    Stopping = 2,
    Stopped = 3,
}

impl LifecycleState {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => LifecycleState::Idle,
            1 => LifecycleState::Running,
            2 => LifecycleState::Stopping,
            _ => LifecycleState::Stopped,
        }
    }

    /// Whether the pool has begun or finished its one-way shutdown
    pub fn is_retired(self) -> bool {
        matches!(self, LifecycleState::Stopping | LifecycleState::Stopped)
    }
}

/// Single atomic state with compare-and-swap transitions
#[derive(Debug)]
pub struct LifecycleGuard {
    state: AtomicU8,
}

impl Default for LifecycleGuard {
    fn default() -> Self {
        Self::new()
    }
}

impl LifecycleGuard {
    pub fn new() -> Self {
        Self {
            state: AtomicU8::new(LifecycleState::Idle as u8),
        }
    }

    pub fn state(&self) -> LifecycleState {
        LifecycleState::from_u8(self.state.load(Ordering::Acquire))
    }

    /// Transition `idle → running`
    ///
    /// Any other current state yields [`PoolError::AlreadyRunning`] and
    /// leaves the state untouched.
    pub fn try_start(&self) -> PoolResult<()> {
        self.state
            .compare_exchange(
                LifecycleState::Idle as u8,
                LifecycleState::Running as u8,
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .map(|_| ())
            .map_err(|_| PoolError::AlreadyRunning)
    }

    /// Transition `idle | running → stopping`, returning the state left
    ///
    /// A pool already stopping or stopped yields [`PoolError::AlreadyStopped`].
    pub fn begin_stop(&self) -> PoolResult<LifecycleState> {
        let mut current = self.state.load(Ordering::Acquire);
        loop {
            if LifecycleState::from_u8(current).is_retired() {
                return Err(PoolError::AlreadyStopped);
            }

            match self.state.compare_exchange_weak(
                current,
                LifecycleState::Stopping as u8,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(previous) => return Ok(LifecycleState::from_u8(previous)),
                Err(observed) => current = observed,
            }
        }
    }

    /// Complete shutdown: `stopping → stopped`
    pub fn finish_stop(&self) {
        self.state
            .store(LifecycleState::Stopped as u8, Ordering::Release);
    }
}
