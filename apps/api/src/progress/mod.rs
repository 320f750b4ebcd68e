//! Progress channel: the bounded queue between the generation handler and the
//! browser's event stream.
//!
//! The handler pushes human-readable status strings with [`ProgressChannel::send`];
//! the `/stream` handler drains them with [`ProgressChannel::recv`]. The queue is
//! per-process and drop-oldest: a producer never waits on a slow or absent browser.

pub mod stream;

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Local};
use serde::Serialize;
use tokio::sync::Notify;
use tracing::{debug, warn};

/// Toast style shown by the browser client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Info,
    Success,
    Error,
}

/// A single status message destined for the browser.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgressUpdate {
    pub message: String,
    pub category: Category,
    pub timestamp: DateTime<Local>,
}

impl ProgressUpdate {
    pub fn new(message: impl Into<String>, category: Category) -> Self {
        Self {
            message: message.into(),
            category,
            timestamp: Local::now(),
        }
    }
}

/// Bounded multi-producer queue of [`ProgressUpdate`]s with async receive.
pub struct ProgressChannel {
    queue: Mutex<VecDeque<ProgressUpdate>>,
    capacity: usize,
    notify: Notify,
}

impl ProgressChannel {
    /// Creates a channel holding at most `capacity` undelivered updates (minimum 1).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            queue: Mutex::new(VecDeque::with_capacity(capacity)),
            capacity,
            notify: Notify::new(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<ProgressUpdate>> {
        // A panic while holding the lock cannot leave the deque half-updated.
        self.queue.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Enqueues an update without blocking. When the queue is full the oldest
    /// undelivered update is discarded to make room.
    pub fn send(&self, message: impl Into<String>, category: Category) {
        let update = ProgressUpdate::new(message, category);
        debug!(category = ?update.category, "Queueing progress update: {}", update.message);
        {
            let mut queue = self.lock();
            if queue.len() >= self.capacity {
                if let Some(dropped) = queue.pop_front() {
                    warn!(
                        "Progress queue is full ({}), dropped oldest update: {}",
                        self.capacity, dropped.message
                    );
                }
            }
            queue.push_back(update);
        }
        self.notify.notify_one();
    }

    pub fn info(&self, message: impl Into<String>) {
        self.send(message, Category::Info);
    }

    pub fn success(&self, message: impl Into<String>) {
        self.send(message, Category::Success);
    }

    pub fn error(&self, message: impl Into<String>) {
        self.send(message, Category::Error);
    }

    /// Removes every pending update. Returns how many were discarded.
    pub fn clear(&self) -> usize {
        let mut queue = self.lock();
        let discarded = queue.len();
        queue.clear();
        discarded
    }

    pub fn try_recv(&self) -> Option<ProgressUpdate> {
        self.lock().pop_front()
    }

    /// Waits for the next update. Cancel-safe: an update is only removed from
    /// the queue in the same poll that returns it.
    pub async fn recv(&self) -> ProgressUpdate {
        loop {
            let notified = self.notify.notified();
            if let Some(update) = self.try_recv() {
                return update;
            }
            notified.await;
        }
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}
