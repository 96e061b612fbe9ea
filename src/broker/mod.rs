//! Broker Module
//!
//! The pub/sub broker collaborator the worker pool and publisher are built
//! on. The pool never depends on a concrete client: it talks to a broker
//! through the [`Connector`], [`BrokerConnection`] and [`Subscription`]
//! traits.
//!
//! ```text
//!   Publisher ──publish──▶ ┌───────────────┐
//!                          │    Broker     │──match subject──┐
//!                          └───────────────┘                 ▼
//!                                                ┌──────────────────────┐
//!                                                │  SubscriptionQueue   │
//!                                                └──────────────────────┘
//! ```
//!
//! [`InProcessBroker`] is the bundled implementation. It lives in the
//! current process and is addressed as `memory://<name>`.

mod error;
mod events;
mod memory;
mod subject;
mod traits;

pub use error::{BrokerError, BrokerResult};
pub use events::{
    default_close_callback, default_disconnect_callback, default_error_callback, CloseCallback,
    ConnectionStatus, DisconnectCallback, ErrorCallback, TransportCallbacks,
};
pub use memory::{InProcessBroker, InProcessConnection, InProcessSubscription, MEMORY_SCHEME};
pub use subject::{subject_matches, validate_subject, SINGLE_WILDCARD, TAIL_WILDCARD};
pub use traits::{BrokerConnection, ConnectOptions, Connector, Subscription};
