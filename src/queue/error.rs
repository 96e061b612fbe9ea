//! Queue Error Types

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QueueError {
    #[error("Queue is closed (capacity: {capacity})")]
    Closed { capacity: usize },

    #[error("Queue lock poisoned: {message}")]
    Poisoned { message: String },
}

impl crate::core::error_handling::ContextualError for QueueError {
    fn is_user_actionable(&self) -> bool {
        false
    }

    fn user_message(&self) -> Option<&str> {
        None
    }
}

/// Result type for queue operations
pub type QueueResult<T> = Result<T, QueueError>;
