//! Broker message types
//!
//! A [`BrokerMessage`] is what a subscription hands to the worker pool. The
//! pool never looks inside the payload; it only moves the message from the
//! queue to the handler.

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::time::SystemTime;

/// Delivery metadata stamped on a message as it enters a subscription queue
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageHeader {
    /// Per-subscription delivery sequence, starting at 1 (0 until enqueued)
    pub sequence: u64,
    /// Time the message entered the subscription queue
    pub received_at: SystemTime,
}

/// A message delivered by the broker on a subject
///
/// # Example
///
/// ```rust
/// use subpool::queue::BrokerMessage;
///
/// let message = BrokerMessage::new("orders.created", b"{\"id\":7}".to_vec())
///     .with_reply("orders.ack")
///     .with_metadata("trace-id", "abc123");
///
/// assert_eq!(message.subject, "orders.created");
/// assert_eq!(message.metadata.get("trace-id").map(String::as_str), Some("abc123"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrokerMessage {
    pub subject: String,
    pub reply: Option<String>,
    pub metadata: BTreeMap<String, String>,
    pub payload: Vec<u8>,
    pub header: MessageHeader,
}

impl BrokerMessage {
    pub fn new(subject: impl Into<String>, payload: impl Into<Vec<u8>>) -> Self {
        Self {
            subject: subject.into(),
            reply: None,
            metadata: BTreeMap::new(),
            payload: payload.into(),
            header: MessageHeader {
                sequence: 0, // Assigned by the subscription queue
                received_at: SystemTime::now(),
            },
        }
    }

    pub fn with_reply(mut self, reply: impl Into<String>) -> Self {
        self.reply = Some(reply.into());
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Payload as text, replacing invalid UTF-8 sequences
    pub fn payload_str(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.payload)
    }

    pub fn len(&self) -> usize {
        self.payload.len()
    }

    pub fn is_empty(&self) -> bool {
        self.payload.is_empty()
    }
}
