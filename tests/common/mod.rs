//! Common test utilities shared by integration suites

use std::sync::{Arc, Mutex};
use subpool::queue::BrokerMessage;

/// Collects handled payloads across workers
#[derive(Clone, Default)]
pub struct Collected {
    payloads: Arc<Mutex<Vec<String>>>,
}

impl Collected {
    pub fn push(&self, message: BrokerMessage) {
        self.payloads
            .lock()
            .unwrap()
            .push(message.payload_str().into_owned());
    }

    pub fn snapshot(&self) -> Vec<String> {
        self.payloads.lock().unwrap().clone()
    }
}
