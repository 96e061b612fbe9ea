//! Transport event callbacks
//!
//! Connections report asynchronous transport events through three
//! callbacks. They are informational only; nothing in the pool's control
//! flow depends on them.

use crate::broker::error::BrokerError;
use std::sync::Arc;

/// Lifecycle status of a broker connection
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
#[strum(serialize_all = "lowercase")]
pub enum ConnectionStatus {
    Connected,
    Disconnected,
    Closed,
}

/// Called with the affected subscription subject (if any) and the error
pub type ErrorCallback = Arc<dyn Fn(Option<&str>, &BrokerError) + Send + Sync>;

/// Called when the connection drops; the error is `None` for a clean close
pub type DisconnectCallback = Arc<dyn Fn(Option<&BrokerError>) + Send + Sync>;

/// Called once when the connection is closed for good
pub type CloseCallback = Arc<dyn Fn(ConnectionStatus) + Send + Sync>;

pub fn default_error_callback() -> ErrorCallback {
    Arc::new(|subject: Option<&str>, error: &BrokerError| match subject {
        Some(subject) => log::error!("broker error on '{}': {}", subject, error),
        None => log::error!("broker error: {}", error),
    })
}

pub fn default_disconnect_callback() -> DisconnectCallback {
    Arc::new(|error: Option<&BrokerError>| {
        if let Some(error) = error {
            log::warn!("broker disconnect error: {}", error);
        }
    })
}

pub fn default_close_callback() -> CloseCallback {
    Arc::new(|status| log::info!("broker connection closed. Status: {}", status))
}

/// The three callbacks registered on one connection
#[derive(Clone)]
pub struct TransportCallbacks {
    pub on_error: ErrorCallback,
    pub on_disconnect: DisconnectCallback,
    pub on_close: CloseCallback,
}

impl Default for TransportCallbacks {
    fn default() -> Self {
        Self {
            on_error: default_error_callback(),
            on_disconnect: default_disconnect_callback(),
            on_close: default_close_callback(),
        }
    }
}

impl std::fmt::Debug for TransportCallbacks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransportCallbacks").finish_non_exhaustive()
    }
}
