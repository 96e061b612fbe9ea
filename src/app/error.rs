//! Errors surfaced by the `subpool` binary

use crate::app::cli::config::ConfigError;
use crate::broker::BrokerError;
use crate::core::error_handling::ContextualError;
use crate::pool::PoolError;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Pool(#[from] PoolError),

    #[error(transparent)]
    Broker(#[from] BrokerError),

    #[error("Failed to initialise logging: {message}")]
    Logging { message: String },
}

impl ContextualError for AppError {
    fn is_user_actionable(&self) -> bool {
        match self {
            AppError::Config(error) => error.is_user_actionable(),
            AppError::Pool(error) => error.is_user_actionable(),
            AppError::Broker(error) => error.is_user_actionable(),
            AppError::Logging { .. } => true,
        }
    }

    fn user_message(&self) -> Option<&str> {
        match self {
            AppError::Config(error) => error.user_message(),
            AppError::Pool(error) => error.user_message(),
            AppError::Broker(error) => error.user_message(),
            AppError::Logging { message } => Some(message),
        }
    }
}
