//! Shared helpers for worker pool tests

use crate::broker::{
    BrokerConnection, BrokerError, BrokerResult, CloseCallback, ConnectOptions, ConnectionStatus,
    Connector, DisconnectCallback, ErrorCallback, InProcessBroker, Subscription,
};
use crate::queue::{BrokerMessage, SubscriptionQueue};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::time::{sleep, Duration, Instant};

/// Poll `condition` until it holds or `limit` elapses
pub async fn wait_until<F>(limit: Duration, condition: F) -> bool
where
    F: Fn() -> bool,
{
    let deadline = Instant::now() + limit;
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        sleep(Duration::from_millis(5)).await;
    }
    condition()
}

/// Payload recorder usable as a message handler
#[derive(Clone, Default)]
pub struct Recorder {
    payloads: Arc<Mutex<Vec<String>>>,
}

impl Recorder {
    pub fn record(&self, message: BrokerMessage) {
        self.payloads
            .lock()
            .unwrap()
            .push(message.payload_str().into_owned());
    }

    pub fn payloads(&self) -> Vec<String> {
        self.payloads.lock().unwrap().clone()
    }

    pub fn count(&self) -> usize {
        self.payloads.lock().unwrap().len()
    }
}

pub async fn publisher_for(broker: &InProcessBroker) -> Box<dyn BrokerConnection> {
    broker
        .connect(broker.url(), &ConnectOptions::new().with_name("test-publisher"))
        .await
        .expect("Should connect publisher")
}

/// Connector whose connections fail on demand
pub struct ScriptedConnector {
    broker: InProcessBroker,
    fail_subscribe: bool,
    fail_unsubscribe: bool,
    closes: Arc<AtomicUsize>,
}

impl ScriptedConnector {
    pub fn new(broker: &InProcessBroker) -> Self {
        Self {
            broker: broker.clone(),
            fail_subscribe: false,
            fail_unsubscribe: false,
            closes: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn failing_subscribe(mut self) -> Self {
        self.fail_subscribe = true;
        self
    }

    pub fn failing_unsubscribe(mut self) -> Self {
        self.fail_unsubscribe = true;
        self
    }

    /// How many connections have been closed
    pub fn closes(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Connector for ScriptedConnector {
    async fn connect(
        &self,
        url: &str,
        options: &ConnectOptions,
    ) -> BrokerResult<Box<dyn BrokerConnection>> {
        let inner = self.broker.connect(url, options).await?;
        Ok(Box::new(ScriptedConnection {
            inner,
            fail_subscribe: self.fail_subscribe,
            fail_unsubscribe: self.fail_unsubscribe,
            closes: Arc::clone(&self.closes),
        }))
    }
}

struct ScriptedConnection {
    inner: Box<dyn BrokerConnection>,
    fail_subscribe: bool,
    fail_unsubscribe: bool,
    closes: Arc<AtomicUsize>,
}

#[async_trait]
impl BrokerConnection for ScriptedConnection {
    async fn publish_message(&self, message: BrokerMessage) -> BrokerResult<()> {
        self.inner.publish_message(message).await
    }

    async fn subscribe(
        &self,
        subject: &str,
        queue: Arc<SubscriptionQueue>,
    ) -> BrokerResult<Box<dyn Subscription>> {
        if self.fail_subscribe {
            return Err(BrokerError::Connection {
                url: "scripted".to_string(),
                reason: "subscription refused".to_string(),
            });
        }
        let inner = self.inner.subscribe(subject, queue).await?;
        Ok(Box::new(ScriptedSubscription {
            inner,
            fail_unsubscribe: self.fail_unsubscribe,
        }))
    }

    async fn close(&self) {
        self.closes.fetch_add(1, Ordering::SeqCst);
        self.inner.close().await
    }

    fn status(&self) -> ConnectionStatus {
        self.inner.status()
    }

    fn set_error_handler(&self, callback: ErrorCallback) {
        self.inner.set_error_handler(callback)
    }

    fn set_disconnect_handler(&self, callback: DisconnectCallback) {
        self.inner.set_disconnect_handler(callback)
    }

    fn set_close_handler(&self, callback: CloseCallback) {
        self.inner.set_close_handler(callback)
    }
}

struct ScriptedSubscription {
    inner: Box<dyn Subscription>,
    fail_unsubscribe: bool,
}

#[async_trait]
impl Subscription for ScriptedSubscription {
    fn subject(&self) -> &str {
        self.inner.subject()
    }

    async fn unsubscribe(&mut self) -> BrokerResult<()> {
        if self.fail_unsubscribe {
            return Err(BrokerError::Connection {
                url: "scripted".to_string(),
                reason: "unsubscribe refused".to_string(),
            });
        }
        self.inner.unsubscribe().await
    }
}
