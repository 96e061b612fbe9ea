//! Broker Error Types

use crate::queue::QueueError;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BrokerError {
    #[error("Connection to '{url}' failed: {reason}")]
    Connection { url: String, reason: String },

    #[error("Connection is closed")]
    ConnectionClosed,

    #[error("Invalid subject '{subject}': {reason}")]
    InvalidSubject { subject: String, reason: String },

    #[error("Subscription on '{subject}' is already closed")]
    SubscriptionClosed { subject: String },

    #[error("Delivery on '{subject}' failed: {source}")]
    Delivery {
        subject: String,
        #[source]
        source: QueueError,
    },

    #[error("Broker lock poisoned: {message}")]
    Poisoned { message: String },
}

impl crate::core::error_handling::ContextualError for BrokerError {
    fn is_user_actionable(&self) -> bool {
        matches!(
            self,
            BrokerError::Connection { .. } | BrokerError::InvalidSubject { .. }
        )
    }

    fn user_message(&self) -> Option<&str> {
        match self {
            BrokerError::Connection { reason, .. } => Some(reason),
            BrokerError::InvalidSubject { reason, .. } => Some(reason),
            _ => None,
        }
    }
}

/// Result type for broker operations
pub type BrokerResult<T> = Result<T, BrokerError>;
