//! Trailing-edge debounce on the tokio clock.

use std::time::Duration;
use tokio::time::Instant;

/// Fires once `delay` has passed since the last [`trigger`](Self::trigger).
#[derive(Debug, Clone)]
pub struct Debouncer {
    delay: Duration,
    deadline: Option<Instant>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            deadline: None,
        }
    }

    /// Cancel any pending fire and reschedule.
    pub fn trigger(&mut self) {
        self.deadline = Some(Instant::now() + self.delay);
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// Wait until the pending deadline, then clear it. Never resolves while
    /// nothing is pending, so it can sit in a `select!` arm.
    pub async fn wait(&mut self) {
        match self.deadline {
            Some(deadline) => {
                tokio::time::sleep_until(deadline).await;
                self.deadline = None;
            }
            None => std::future::pending().await,
        }
    }
}
