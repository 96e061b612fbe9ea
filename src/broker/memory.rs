//! In-process broker
//!
//! A broker living inside the current process, addressed as
//! `memory://<name>`. It routes published messages to every subscription
//! whose filter matches the subject and pushes them into the subscription
//! queue, waiting while that queue is full.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use subpool::broker::{
//!     BrokerConnection, ConnectOptions, Connector, InProcessBroker, Subscription,
//! };
//! use subpool::queue::SubscriptionQueue;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let broker = InProcessBroker::new("local");
//! let connection = broker.connect(broker.url(), &ConnectOptions::new()).await?;
//!
//! let queue = Arc::new(SubscriptionQueue::new(8));
//! let mut subscription = connection.subscribe("orders.>", Arc::clone(&queue)).await?;
//!
//! connection.publish("orders.eu.created", b"42".to_vec()).await?;
//! assert_eq!(queue.len(), 1);
//!
//! subscription.unsubscribe().await?;
//! connection.close().await;
//! # Ok(())
//! # }
//! ```

use crate::broker::error::{BrokerError, BrokerResult};
use crate::broker::events::{
    CloseCallback, ConnectionStatus, DisconnectCallback, ErrorCallback, TransportCallbacks,
};
use crate::broker::subject::{subject_matches, validate_subject};
use crate::broker::traits::{BrokerConnection, ConnectOptions, Connector, Subscription};
use crate::core::sync::{handle_rwlock_read, handle_rwlock_write};
use crate::queue::{BrokerMessage, SubscriptionQueue};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

pub const MEMORY_SCHEME: &str = "memory://";

/// One subscription's routing entry
struct Route {
    filter: String,
    queue: Arc<SubscriptionQueue>,
    connection: Arc<ConnectionShared>,
}

/// Connection state shared between the broker and the connection handle
struct ConnectionShared {
    id: u64,
    label: String,
    status: RwLock<ConnectionStatus>,
    callbacks: RwLock<TransportCallbacks>,
}

impl ConnectionShared {
    fn status(&self) -> ConnectionStatus {
        self.status
            .read()
            .map(|status| *status)
            .unwrap_or(ConnectionStatus::Closed)
    }

    fn set_status(&self, status: ConnectionStatus) {
        if let Ok(mut current) = self.status.write() {
            *current = status;
        }
    }

    fn callbacks(&self) -> TransportCallbacks {
        self.callbacks
            .read()
            .map(|callbacks| callbacks.clone())
            .unwrap_or_default()
    }

    fn update_callbacks(&self, update: impl FnOnce(&mut TransportCallbacks)) {
        if let Ok(mut callbacks) = self.callbacks.write() {
            update(&mut callbacks);
        }
    }
}

struct BrokerState {
    routes: RwLock<HashMap<u64, Route>>,
    connections: RwLock<HashMap<u64, Arc<ConnectionShared>>>,
    next_id: AtomicU64,
    online: AtomicBool,
}

impl BrokerState {
    fn next_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::SeqCst)
    }

    fn poisoned(message: String) -> BrokerError {
        BrokerError::Poisoned { message }
    }

    /// Remove a connection and every route it owns; returns whether it was registered
    fn detach_connection(&self, connection_id: u64) -> bool {
        if let Ok(mut routes) = self.routes.write() {
            routes.retain(|_, route| route.connection.id != connection_id);
        }
        self.connections
            .write()
            .map(|mut connections| connections.remove(&connection_id).is_some())
            .unwrap_or(false)
    }
}

/// Broker that routes messages between connections in the same process
///
/// Cloning yields another handle to the same broker.
#[derive(Clone)]
pub struct InProcessBroker {
    url: String,
    state: Arc<BrokerState>,
}

impl InProcessBroker {
    /// Create a broker reachable at `memory://<name>`
    pub fn new(name: &str) -> Self {
        Self {
            url: format!("{}{}", MEMORY_SCHEME, name),
            state: Arc::new(BrokerState {
                routes: RwLock::new(HashMap::new()),
                connections: RwLock::new(HashMap::new()),
                next_id: AtomicU64::new(1),
                online: AtomicBool::new(true),
            }),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn is_online(&self) -> bool {
        self.state.online.load(Ordering::Acquire)
    }

    /// Number of open connections
    pub fn connection_count(&self) -> usize {
        self.state
            .connections
            .read()
            .map(|connections| connections.len())
            .unwrap_or(0)
    }

    /// Number of active subscriptions across all connections
    pub fn subscription_count(&self) -> usize {
        self.state
            .routes
            .read()
            .map(|routes| routes.len())
            .unwrap_or(0)
    }

    /// Take the broker offline
    ///
    /// Every open connection is dropped: its subscriptions stop receiving,
    /// its disconnect callback fires with an error and then its close
    /// callback fires. Further connection attempts fail.
    pub fn shutdown(&self) {
        self.state.online.store(false, Ordering::Release);

        let connections: Vec<Arc<ConnectionShared>> = self
            .state
            .connections
            .read()
            .map(|connections| connections.values().cloned().collect())
            .unwrap_or_default();

        let reason = BrokerError::Connection {
            url: self.url.clone(),
            reason: "broker shut down".to_string(),
        };

        for connection in connections {
            self.state.detach_connection(connection.id);
            connection.set_status(ConnectionStatus::Closed);

            let callbacks = connection.callbacks();
            (callbacks.on_disconnect)(Some(&reason));
            (callbacks.on_close)(ConnectionStatus::Closed);
        }

        log::debug!("in-process broker {} shut down", self.url);
    }
}

#[async_trait]
impl Connector for InProcessBroker {
    async fn connect(
        &self,
        url: &str,
        options: &ConnectOptions,
    ) -> BrokerResult<Box<dyn BrokerConnection>> {
        if url != self.url {
            return Err(BrokerError::Connection {
                url: url.to_string(),
                reason: format!("no in-process broker listening at {}", url),
            });
        }
        if !self.is_online() {
            return Err(BrokerError::Connection {
                url: url.to_string(),
                reason: "broker is shut down".to_string(),
            });
        }

        let id = self.state.next_id();
        let label = options
            .name
            .clone()
            .unwrap_or_else(|| format!("connection-{}", id));

        let shared = Arc::new(ConnectionShared {
            id,
            label,
            status: RwLock::new(ConnectionStatus::Connected),
            callbacks: RwLock::new(TransportCallbacks::default()),
        });

        handle_rwlock_write(self.state.connections.write(), BrokerState::poisoned)?
            .insert(id, Arc::clone(&shared));

        log::debug!("{} connected to {}", shared.label, self.url);

        Ok(Box::new(InProcessConnection {
            shared,
            broker: Arc::clone(&self.state),
        }))
    }
}

/// Connection handle returned by [`InProcessBroker`]
pub struct InProcessConnection {
    shared: Arc<ConnectionShared>,
    broker: Arc<BrokerState>,
}

impl InProcessConnection {
    fn ensure_connected(&self) -> BrokerResult<()> {
        match self.shared.status() {
            ConnectionStatus::Connected => Ok(()),
            _ => Err(BrokerError::ConnectionClosed),
        }
    }
}

#[async_trait]
impl BrokerConnection for InProcessConnection {
    async fn publish_message(&self, message: BrokerMessage) -> BrokerResult<()> {
        self.ensure_connected()?;
        validate_subject(&message.subject, false)?;

        // Snapshot the matching routes so no lock is held while waiting on a full queue
        let targets: Vec<(String, Arc<SubscriptionQueue>, Arc<ConnectionShared>)> = {
            let routes = handle_rwlock_read(self.broker.routes.read(), BrokerState::poisoned)?;
            routes
                .values()
                .filter(|route| subject_matches(&route.filter, &message.subject))
                .map(|route| {
                    (
                        route.filter.clone(),
                        Arc::clone(&route.queue),
                        Arc::clone(&route.connection),
                    )
                })
                .collect()
        };

        for (filter, queue, subscriber) in targets {
            if let Err(source) = queue.push(message.clone()).await {
                // Delivery failures belong to the subscriber, not the publisher
                let error = BrokerError::Delivery {
                    subject: message.subject.clone(),
                    source,
                };
                (subscriber.callbacks().on_error)(Some(&filter), &error);
            }
        }

        Ok(())
    }

    async fn subscribe(
        &self,
        subject: &str,
        queue: Arc<SubscriptionQueue>,
    ) -> BrokerResult<Box<dyn Subscription>> {
        self.ensure_connected()?;
        validate_subject(subject, true)?;

        let id = self.broker.next_id();
        handle_rwlock_write(self.broker.routes.write(), BrokerState::poisoned)?.insert(
            id,
            Route {
                filter: subject.to_string(),
                queue,
                connection: Arc::clone(&self.shared),
            },
        );

        log::debug!("{} subscribed to '{}'", self.shared.label, subject);

        Ok(Box::new(InProcessSubscription {
            id,
            subject: subject.to_string(),
            broker: Arc::clone(&self.broker),
            active: true,
        }))
    }

    async fn close(&self) {
        if self.shared.status() == ConnectionStatus::Closed {
            return;
        }

        self.broker.detach_connection(self.shared.id);
        self.shared.set_status(ConnectionStatus::Closed);

        let callbacks = self.shared.callbacks();
        (callbacks.on_disconnect)(None);
        (callbacks.on_close)(ConnectionStatus::Closed);
    }

    fn status(&self) -> ConnectionStatus {
        self.shared.status()
    }

    fn set_error_handler(&self, callback: ErrorCallback) {
        self.shared
            .update_callbacks(|callbacks| callbacks.on_error = callback);
    }

    fn set_disconnect_handler(&self, callback: DisconnectCallback) {
        self.shared
            .update_callbacks(|callbacks| callbacks.on_disconnect = callback);
    }

    fn set_close_handler(&self, callback: CloseCallback) {
        self.shared
            .update_callbacks(|callbacks| callbacks.on_close = callback);
    }
}

impl Drop for InProcessConnection {
    fn drop(&mut self) {
        // Dropping without close releases routes silently
        if self.broker.detach_connection(self.shared.id) {
            self.shared.set_status(ConnectionStatus::Closed);
        }
    }
}

/// Subscription handle returned by [`InProcessConnection::subscribe`]
pub struct InProcessSubscription {
    id: u64,
    subject: String,
    broker: Arc<BrokerState>,
    active: bool,
}

#[async_trait]
impl Subscription for InProcessSubscription {
    fn subject(&self) -> &str {
        &self.subject
    }

    async fn unsubscribe(&mut self) -> BrokerResult<()> {
        if !self.active {
            return Err(BrokerError::SubscriptionClosed {
                subject: self.subject.clone(),
            });
        }
        self.active = false;

        let removed =
            handle_rwlock_write(self.broker.routes.write(), BrokerState::poisoned)?.remove(&self.id);

        match removed {
            Some(_) => Ok(()),
            // The owning connection was closed underneath us
            None => Err(BrokerError::ConnectionClosed),
        }
    }
}
