//! Traits for the broker collaborator
//!
//! The worker pool and publisher only talk to a broker through these
//! traits. A concrete client (network or in-process) provides the
//! connection, subscription delivery and transport callbacks.

use crate::broker::error::BrokerResult;
use crate::broker::events::{CloseCallback, ConnectionStatus, DisconnectCallback, ErrorCallback};
use crate::queue::{BrokerMessage, SubscriptionQueue};
use async_trait::async_trait;
use std::sync::Arc;

/// Transport-level options applied when connecting
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConnectOptions {
    /// Client name reported by the connection (diagnostics only)
    pub name: Option<String>,
}

impl ConnectOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

/// Opens connections to a broker
#[async_trait]
pub trait Connector: Send + Sync {
    async fn connect(
        &self,
        url: &str,
        options: &ConnectOptions,
    ) -> BrokerResult<Box<dyn BrokerConnection>>;
}

/// A live connection to a broker
#[async_trait]
pub trait BrokerConnection: Send + Sync {
    /// Publish a fully formed message
    async fn publish_message(&self, message: BrokerMessage) -> BrokerResult<()>;

    /// Publish a raw payload to a subject
    async fn publish(&self, subject: &str, payload: Vec<u8>) -> BrokerResult<()> {
        self.publish_message(BrokerMessage::new(subject, payload))
            .await
    }

    /// Deliver every message matching `subject` into `queue`
    async fn subscribe(
        &self,
        subject: &str,
        queue: Arc<SubscriptionQueue>,
    ) -> BrokerResult<Box<dyn Subscription>>;

    /// Close the connection; closing twice is a no-op
    async fn close(&self);

    fn status(&self) -> ConnectionStatus;

    fn set_error_handler(&self, callback: ErrorCallback);

    fn set_disconnect_handler(&self, callback: DisconnectCallback);

    fn set_close_handler(&self, callback: CloseCallback);
}

/// Handle to an active subscription
#[async_trait]
pub trait Subscription: Send + Sync {
    fn subject(&self) -> &str;

    /// Stop delivery into the subscription queue
    ///
    /// Messages already in the queue are left untouched.
    async fn unsubscribe(&mut self) -> BrokerResult<()>;
}
