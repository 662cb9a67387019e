use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

/// Maximum number of exchanges kept in memory
pub const MAX_EXCHANGES: usize = 5;

/// One user/assistant turn pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exchange {
    pub user: String,
    pub assistant: String,
}

/// Bounded FIFO of recent exchanges, oldest evicted first
#[derive(Debug, Default)]
pub struct MessageHistory {
    entries: VecDeque<Exchange>,
}

impl MessageHistory {
    pub fn new() -> Self {
        Self {
            entries: VecDeque::with_capacity(MAX_EXCHANGES),
        }
    }

    pub fn push(&mut self, exchange: Exchange) {
        self.entries.push_back(exchange);
        while self.entries.len() > MAX_EXCHANGES {
            self.entries.pop_front();
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Exchange> {
        self.entries.iter()
    }
}
