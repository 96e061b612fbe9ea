//! Publisher for sending messages to a broker subject
//!
//! A thin pass-through over one broker connection: every publish is a
//! single send whose result comes straight from the broker client. There
//! is no queueing, retrying or batching here.

use crate::broker::{BrokerConnection, BrokerResult, ConnectOptions, Connector};
use crate::queue::BrokerMessage;
use async_trait::async_trait;

/// Anything that can publish payloads and later be closed
#[async_trait]
pub trait MessagePublisher: Send + Sync {
    async fn publish(&self, subject: &str, payload: Vec<u8>) -> BrokerResult<()>;

    async fn close(&self) -> BrokerResult<()>;
}

/// Publisher handle owning a broker connection
///
/// # Example
///
/// ```rust
/// use subpool::broker::{ConnectOptions, InProcessBroker};
/// use subpool::publisher::Publisher;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let broker = InProcessBroker::new("publisher-docs");
/// let publisher = Publisher::connect(&broker, broker.url(), ConnectOptions::new()).await?;
///
/// publisher.publish("events.created", b"payload".to_vec()).await?;
/// publisher.close().await?;
/// # Ok(())
/// # }
/// ```
pub struct Publisher {
    connection: Box<dyn BrokerConnection>,
}

impl Publisher {
    pub async fn connect<C>(connector: &C, url: &str, options: ConnectOptions) -> BrokerResult<Self>
    where
        C: Connector + ?Sized,
    {
        let connection = connector.connect(url, &options).await?;
        Ok(Self { connection })
    }

    /// Send `payload` to `subject`
    pub async fn publish(&self, subject: &str, payload: Vec<u8>) -> BrokerResult<()> {
        self.connection.publish(subject, payload).await
    }

    /// Send a message carrying a reply subject or metadata
    pub async fn publish_message(&self, message: BrokerMessage) -> BrokerResult<()> {
        self.connection.publish_message(message).await
    }

    /// Release the connection; later publishes fail with the client's error
    pub async fn close(&self) -> BrokerResult<()> {
        self.connection.close().await;
        Ok(())
    }
}

#[async_trait]
impl MessagePublisher for Publisher {
    async fn publish(&self, subject: &str, payload: Vec<u8>) -> BrokerResult<()> {
        Publisher::publish(self, subject, payload).await
    }

    async fn close(&self) -> BrokerResult<()> {
        Publisher::close(self).await
    }
}
