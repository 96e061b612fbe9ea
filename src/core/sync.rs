//! Lock poisoning helpers
//!
//! A poisoned lock means a panic happened while the lock was held. The queue
//! and broker turn that into one of their own error variants instead of
//! unwrapping.

use std::sync::{LockResult, RwLockReadGuard, RwLockWriteGuard};

/// Map a poisoned mutex into an application error
///
/// # Examples
/// ```
/// use std::sync::Mutex;
/// use subpool::core::sync::handle_mutex_poison;
/// use subpool::queue::QueueError;
///
/// let mutex = Mutex::new(42);
/// let guard = handle_mutex_poison(mutex.lock(), |message| QueueError::Poisoned { message })
///     .unwrap();
/// assert_eq!(*guard, 42);
/// ```
pub fn handle_mutex_poison<T, E>(
    result: LockResult<T>,
    error_constructor: impl FnOnce(String) -> E,
) -> Result<T, E> {
    result.map_err(|poison_err| {
        error_constructor(format!(
            "mutex poisoned by a panic while the lock was held: {:?}",
            poison_err
        ))
    })
}

/// Map a poisoned RwLock read into an application error
pub fn handle_rwlock_read<T, E>(
    result: LockResult<RwLockReadGuard<T>>,
    error_constructor: impl FnOnce(String) -> E,
) -> Result<RwLockReadGuard<T>, E> {
    result.map_err(|poison_err| {
        error_constructor(format!(
            "RwLock poisoned by a panicking writer: {:?}",
            poison_err
        ))
    })
}

/// Map a poisoned RwLock write into an application error
pub fn handle_rwlock_write<T, E>(
    result: LockResult<RwLockWriteGuard<T>>,
    error_constructor: impl FnOnce(String) -> E,
) -> Result<RwLockWriteGuard<T>, E> {
    result.map_err(|poison_err| {
        error_constructor(format!(
            "RwLock poisoned by a panic while the lock was held: {:?}",
            poison_err
        ))
    })
}
