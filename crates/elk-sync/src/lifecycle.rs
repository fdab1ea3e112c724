//! Widget lifecycle: `Uninitialized → Mounting → Active → Disposed`.
//!
//! Operations that arrive before the diagram is active are queued and
//! replayed in arrival order once it activates. After disposal every
//! operation is rejected.

use crate::error::{Result, SyncError};
use std::collections::VecDeque;
use std::time::Duration;
use tokio::sync::oneshot;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LifecycleState {
    #[default]
    Uninitialized,
    /// Waiting for the canvas to become visible.
    Mounting,
    Active,
    Disposed,
}

/// Outcome of [`Lifecycle::admit`].
#[derive(Debug, PartialEq)]
pub enum Admission<Op> {
    /// Diagram is active: run now.
    Run(Op),
    /// Stored until activation.
    Queued,
}

pub struct Lifecycle<Op> {
    state: LifecycleState,
    queue: VecDeque<Op>,
    ready: Vec<oneshot::Sender<()>>,
}

impl<Op> Default for Lifecycle<Op> {
    fn default() -> Self {
        Self {
            state: LifecycleState::default(),
            queue: VecDeque::new(),
            ready: Vec::new(),
        }
    }
}

impl<Op> Lifecycle<Op> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.state == LifecycleState::Active
    }

    pub fn queued(&self) -> usize {
        self.queue.len()
    }

    /// Run, queue or reject `op` depending on the current state.
    pub fn admit(&mut self, op: Op) -> Result<Admission<Op>> {
        match self.state {
            LifecycleState::Active => Ok(Admission::Run(op)),
            LifecycleState::Uninitialized | LifecycleState::Mounting => {
                self.queue.push_back(op);
                Ok(Admission::Queued)
            }
            LifecycleState::Disposed => Err(SyncError::Lifecycle(self.state)),
        }
    }

    pub fn mount(&mut self) -> Result<()> {
        match self.state {
            LifecycleState::Uninitialized => {
                self.state = LifecycleState::Mounting;
                Ok(())
            }
            LifecycleState::Mounting => Ok(()),
            state => Err(SyncError::Lifecycle(state)),
        }
    }

    /// Become active and hand back the queued operations in arrival order.
    /// Activating twice is a no-op.
    pub fn activate(&mut self) -> Result<Vec<Op>> {
        match self.state {
            LifecycleState::Disposed => return Err(SyncError::Lifecycle(self.state)),
            LifecycleState::Active => return Ok(Vec::new()),
            LifecycleState::Uninitialized | LifecycleState::Mounting => {}
        }
        self.state = LifecycleState::Active;
        for tx in self.ready.drain(..) {
            let _ = tx.send(());
        }
        log::debug!("diagram active, replaying {} queued operation(s)", self.queue.len());
        Ok(self.queue.drain(..).collect())
    }

    /// Resolves once the diagram is active. Dropped without firing if the
    /// lifecycle is disposed first.
    pub fn on_ready(&mut self) -> oneshot::Receiver<()> {
        let (tx, rx) = oneshot::channel();
        if self.is_active() {
            let _ = tx.send(());
        } else if self.state != LifecycleState::Disposed {
            self.ready.push(tx);
        }
        rx
    }

    /// Enter the terminal state, dropping queued work. Returns how many
    /// operations were dropped.
    pub fn dispose(&mut self) -> usize {
        self.state = LifecycleState::Disposed;
        self.ready.clear();
        let dropped = self.queue.len();
        self.queue.clear();
        dropped
    }
}

/// Poll `probe` every `interval` until it reports visible.
///
/// Returns immediately if the first probe already succeeds.
pub async fn poll_until_visible(mut probe: impl FnMut() -> bool, interval: Duration) {
    let mut ticker = tokio::time::interval(interval);
    loop {
        ticker.tick().await;
        if probe() {
            return;
        }
    }
}
