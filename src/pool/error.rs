//! Worker Pool Error Types

use crate::broker::BrokerError;
use crate::core::error_handling::ContextualError;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PoolError {
    #[error("Worker pool is already running")]
    AlreadyRunning,

    #[error("Worker pool is already stopped")]
    AlreadyStopped,

    #[error("Failed to connect to broker: {0}")]
    Connection(#[source] BrokerError),

    #[error("Failed to subscribe to '{subject}': {source}")]
    Subscription {
        subject: String,
        #[source]
        source: BrokerError,
    },

    #[error("Failed to unsubscribe from '{subject}': {source}")]
    Unsubscribe {
        subject: String,
        #[source]
        source: BrokerError,
    },

    #[error("Invalid worker pool options: {message}")]
    InvalidOptions { message: String },
}

impl PoolError {
    /// Lifecycle rejections leave the pool untouched and are safe to ignore
    pub fn is_lifecycle_rejection(&self) -> bool {
        matches!(self, PoolError::AlreadyRunning | PoolError::AlreadyStopped)
    }
}

impl ContextualError for PoolError {
    fn is_user_actionable(&self) -> bool {
        match self {
            PoolError::InvalidOptions { .. } => true,
            PoolError::Connection(source) | PoolError::Subscription { source, .. } => {
                source.is_user_actionable()
            }
            _ => false,
        }
    }

    fn user_message(&self) -> Option<&str> {
        match self {
            PoolError::InvalidOptions { message } => Some(message),
            PoolError::Connection(source) | PoolError::Subscription { source, .. } => {
                source.user_message()
            }
            _ => None,
        }
    }
}

/// Result type for worker pool operations
pub type PoolResult<T> = Result<T, PoolError>;
