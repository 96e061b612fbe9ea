//! Bounded subscription queue with explicit close
//!
//! This module provides the queue that sits between a broker subscription
//! and the worker pool:
//! - FIFO ordering with a per-queue delivery sequence
//! - Fixed capacity; producers wait while the queue is full
//! - Any number of consumers; each message is taken by exactly one
//! - Closing stops producers immediately while consumers drain what is left

use crate::core::sync::handle_mutex_poison;
use crate::queue::error::{QueueError, QueueResult};
use crate::queue::message::BrokerMessage;
use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};
use std::time::SystemTime;
use tokio::sync::Notify;

#[derive(Debug)]
struct QueueState {
    messages: VecDeque<BrokerMessage>,
    next_sequence: u64,
    closed: bool,
}

/// SubscriptionQueue is a bounded multi-producer/multi-consumer FIFO
///
/// Waiters register with a [`Notify`] before inspecting the state, so a
/// push, pop or close that happens between the check and the await is
/// never missed.
#[derive(Debug)]
pub struct SubscriptionQueue {
    state: Mutex<QueueState>,
    not_empty: Notify,
    not_full: Notify,
    capacity: usize,
}

impl SubscriptionQueue {
    /// Create a queue holding at most `capacity` messages (minimum 1)
    pub fn new(capacity: usize) -> Self {
        Self {
            state: Mutex::new(QueueState {
                messages: VecDeque::with_capacity(capacity.max(1)),
                next_sequence: 1,
                closed: false,
            }),
            not_empty: Notify::new(),
            not_full: Notify::new(),
            capacity: capacity.max(1),
        }
    }

    fn lock(&self) -> QueueResult<MutexGuard<'_, QueueState>> {
        handle_mutex_poison(self.state.lock(), |message| QueueError::Poisoned { message })
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of messages waiting to be taken
    pub fn len(&self) -> usize {
        self.lock().map(|state| state.messages.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_closed(&self) -> bool {
        self.lock().map(|state| state.closed).unwrap_or(true)
    }

    /// Sequence number the next accepted message will receive
    pub fn head_sequence(&self) -> u64 {
        self.lock().map(|state| state.next_sequence).unwrap_or(0)
    }

    /// Append a message, waiting while the queue is full
    ///
    /// Returns the delivery sequence assigned to the message, or
    /// [`QueueError::Closed`] if the queue is closed before space frees up.
    pub async fn push(&self, mut message: BrokerMessage) -> QueueResult<u64> {
        loop {
            let notified = self.not_full.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            {
                let mut state = self.lock()?;
                if state.closed {
                    return Err(QueueError::Closed {
                        capacity: self.capacity,
                    });
                }

                if state.messages.len() < self.capacity {
                    let sequence = state.next_sequence;
                    state.next_sequence += 1;
                    message.header.sequence = sequence;
                    message.header.received_at = SystemTime::now();
                    state.messages.push_back(message);
                    drop(state);

                    self.not_empty.notify_one();
                    return Ok(sequence);
                }
            }

            notified.await;
        }
    }

    /// Take the oldest message, waiting while the queue is empty
    ///
    /// Returns `Ok(None)` once the queue is closed and fully drained.
    pub async fn pop(&self) -> QueueResult<Option<BrokerMessage>> {
        loop {
            let notified = self.not_empty.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            {
                let mut state = self.lock()?;
                if let Some(message) = state.messages.pop_front() {
                    drop(state);

                    self.not_full.notify_one();
                    return Ok(Some(message));
                }

                if state.closed {
                    return Ok(None);
                }
            }

            notified.await;
        }
    }

    /// Close the queue
    ///
    /// Pending and future pushes fail; consumers keep receiving the messages
    /// already queued and then observe the end of the queue.
    pub fn close(&self) -> QueueResult<()> {
        {
            let mut state = self.lock()?;
            state.closed = true;
        }

        self.not_empty.notify_waiters();
        self.not_full.notify_waiters();
        Ok(())
    }

    /// Drop every queued message, returning how many were discarded
    pub fn clear(&self) -> QueueResult<usize> {
        let discarded = {
            let mut state = self.lock()?;
            let count = state.messages.len();
            state.messages.clear();
            count
        };

        self.not_full.notify_waiters();
        Ok(discarded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tokio::time::{timeout, Duration};

    fn message(data: &str) -> BrokerMessage {
        BrokerMessage::new("test", data)
    }

    #[tokio::test]
    async fn test_queue_creation() {
        let queue = SubscriptionQueue::new(4);

        assert_eq!(queue.capacity(), 4);
        assert_eq!(queue.len(), 0);
        assert_eq!(queue.head_sequence(), 1);
        assert!(!queue.is_closed());
    }

    #[tokio::test]
    async fn test_zero_capacity_is_raised_to_one() {
        let queue = SubscriptionQueue::new(0);
        assert_eq!(queue.capacity(), 1);
    }

    #[tokio::test]
    async fn test_push_assigns_monotonic_sequences() {
        let queue = SubscriptionQueue::new(8);

        assert_eq!(queue.push(message("a")).await.unwrap(), 1);
        assert_eq!(queue.push(message("b")).await.unwrap(), 2);
        assert_eq!(queue.head_sequence(), 3);

        let first = queue.pop().await.unwrap().unwrap();
        let second = queue.pop().await.unwrap().unwrap();
        assert_eq!(first.payload_str(), "a");
        assert_eq!(first.header.sequence, 1);
        assert_eq!(second.payload_str(), "b");
        assert_eq!(second.header.sequence, 2);
    }

    #[tokio::test]
    async fn test_push_waits_while_full() {
        let queue = Arc::new(SubscriptionQueue::new(1));
        queue.push(message("first")).await.unwrap();

        // Second push cannot complete until a slot frees up
        let blocked = timeout(Duration::from_millis(50), queue.push(message("second"))).await;
        assert!(blocked.is_err(), "push should wait on a full queue");

        let producer = {
            let queue = Arc::clone(&queue);
            tokio::spawn(async move { queue.push(message("second")).await })
        };

        let first = queue.pop().await.unwrap().unwrap();
        assert_eq!(first.payload_str(), "first");

        let sequence = timeout(Duration::from_secs(1), producer)
            .await
            .expect("producer should resume after pop")
            .unwrap()
            .unwrap();
        assert_eq!(sequence, 2);
        assert_eq!(queue.len(), 1);
    }

    #[tokio::test]
    async fn test_pop_waits_for_push() {
        let queue = Arc::new(SubscriptionQueue::new(2));

        let consumer = {
            let queue = Arc::clone(&queue);
            tokio::spawn(async move { queue.pop().await })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        queue.push(message("late")).await.unwrap();

        let received = timeout(Duration::from_secs(1), consumer)
            .await
            .unwrap()
            .unwrap()
            .unwrap()
            .unwrap();
        assert_eq!(received.payload_str(), "late");
    }

    #[tokio::test]
    async fn test_close_lets_consumers_drain_then_end() {
        let queue = SubscriptionQueue::new(3);
        queue.push(message("1")).await.unwrap();
        queue.push(message("2")).await.unwrap();

        queue.close().unwrap();

        assert_eq!(queue.pop().await.unwrap().unwrap().payload_str(), "1");
        assert_eq!(queue.pop().await.unwrap().unwrap().payload_str(), "2");
        assert!(queue.pop().await.unwrap().is_none());
        assert!(queue.pop().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_close_wakes_waiting_consumers() {
        let queue = Arc::new(SubscriptionQueue::new(1));

        let consumers: Vec<_> = (0..3)
            .map(|_| {
                let queue = Arc::clone(&queue);
                tokio::spawn(async move { queue.pop().await })
            })
            .collect();

        tokio::time::sleep(Duration::from_millis(20)).await;
        queue.close().unwrap();

        for consumer in consumers {
            let result = timeout(Duration::from_secs(1), consumer)
                .await
                .expect("close should wake every waiting consumer")
                .unwrap();
            assert!(matches!(result, Ok(None)));
        }
    }

    #[tokio::test]
    async fn test_push_after_close_fails() {
        let queue = SubscriptionQueue::new(1);
        queue.close().unwrap();

        match queue.push(message("rejected")).await {
            Err(QueueError::Closed { capacity }) => assert_eq!(capacity, 1),
            other => panic!("Expected Closed error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_close_fails_waiting_producers() {
        let queue = Arc::new(SubscriptionQueue::new(1));
        queue.push(message("fill")).await.unwrap();

        let producer = {
            let queue = Arc::clone(&queue);
            tokio::spawn(async move { queue.push(message("blocked")).await })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        queue.close().unwrap();

        let result = timeout(Duration::from_secs(1), producer)
            .await
            .unwrap()
            .unwrap();
        assert!(matches!(result, Err(QueueError::Closed { .. })));

        // The message queued before close is still there to drain
        assert_eq!(queue.pop().await.unwrap().unwrap().payload_str(), "fill");
    }

    #[tokio::test]
    async fn test_clear_discards_pending_messages() {
        let queue = SubscriptionQueue::new(4);
        for data in ["a", "b", "c"] {
            queue.push(message(data)).await.unwrap();
        }

        assert_eq!(queue.clear().unwrap(), 3);
        assert!(queue.is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_each_message_taken_exactly_once() {
        let queue = Arc::new(SubscriptionQueue::new(2));

        let consumers: Vec<_> = (0..4)
            .map(|_| {
                let queue = Arc::clone(&queue);
                tokio::spawn(async move {
                    let mut seen = Vec::new();
                    while let Some(message) = queue.pop().await.unwrap() {
                        seen.push(message.header.sequence);
                    }
                    seen
                })
            })
            .collect();

        for i in 0..200 {
            queue.push(message(&i.to_string())).await.unwrap();
        }
        queue.close().unwrap();

        let mut all = Vec::new();
        for consumer in consumers {
            let seen = consumer.await.unwrap();
            // Within one consumer, dequeue order is preserved
            assert!(seen.windows(2).all(|pair| pair[0] < pair[1]));
            all.extend(seen);
        }

        all.sort_unstable();
        let expected: Vec<u64> = (1..=200).collect();
        assert_eq!(all, expected);
    }
}
