//! Boundary to the externally owned document state.
//!
//! The store is a key/value map with change notifications and a save
//! operation. It is treated as eventually consistent: the engine reconciles
//! by value diff and never assumes its own writes are echoed (or not).

use crate::error::{Result, SyncError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tokio::sync::mpsc;

/// Keys the engine consumes or produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreKey {
    /// Layout-result tree (consumed).
    Layout,
    /// Symbol library (consumed).
    Symbols,
    /// Selected element ids (consumed and produced).
    Selection,
    /// Hovered element id (consumed and produced).
    Hover,
    /// Host-provided overlay reference (consumed).
    ControlOverlay,
    /// Nested JSON of the applied scene (produced).
    Rendered,
}

/// A change notification.
#[derive(Debug, Clone, PartialEq)]
pub struct StoreChange {
    pub key: StoreKey,
    pub value: Value,
    /// Value before the change; `Null` when the key was unset.
    pub previous: Value,
}

#[async_trait]
pub trait StateStore: Send + Sync {
    async fn get(&self, key: StoreKey) -> Result<Option<Value>>;

    async fn set(&self, key: StoreKey, value: Value) -> Result<()>;

    /// Persist pending changes.
    async fn save(&self) -> Result<()>;

    /// Receive every subsequent change, in delivery order.
    fn subscribe(&self) -> mpsc::UnboundedReceiver<StoreChange>;
}

// ─── In-memory store ─────────────────────────────────────────────────────

#[derive(Default)]
struct Inner {
    values: HashMap<StoreKey, Value>,
    writes: Vec<(StoreKey, Value)>,
    saves: usize,
    fail_writes: bool,
    subscribers: Vec<mpsc::UnboundedSender<StoreChange>>,
}

impl Inner {
    /// Store `value` and notify subscribers if it changed.
    fn put(&mut self, key: StoreKey, value: Value) {
        let previous = self.values.insert(key, value.clone()).unwrap_or(Value::Null);
        if previous == value {
            return;
        }
        let change = StoreChange {
            key,
            value,
            previous,
        };
        self.subscribers
            .retain(|tx| tx.send(change.clone()).is_ok());
    }
}

/// Store kept in memory. Engine writes (via [`StateStore::set`]) are
/// recorded separately from host writes (via [`MemoryStore::host_set`]).
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// A change made by the host side of the store.
    pub fn host_set(&self, key: StoreKey, value: Value) {
        self.lock().put(key, value);
    }

    /// Every engine write so far, in order.
    pub fn writes(&self) -> Vec<(StoreKey, Value)> {
        self.lock().writes.clone()
    }

    /// Engine writes to one key.
    pub fn writes_to(&self, key: StoreKey) -> Vec<Value> {
        self.lock()
            .writes
            .iter()
            .filter(|(k, _)| *k == key)
            .map(|(_, v)| v.clone())
            .collect()
    }

    pub fn clear_writes(&self) {
        self.lock().writes.clear();
    }

    pub fn saves(&self) -> usize {
        self.lock().saves
    }

    /// Make subsequent engine writes fail.
    pub fn fail_writes(&self, fail: bool) {
        self.lock().fail_writes = fail;
    }

    pub fn value(&self, key: StoreKey) -> Option<Value> {
        self.lock().values.get(&key).cloned()
    }
}

#[async_trait]
impl StateStore for MemoryStore {
    async fn get(&self, key: StoreKey) -> Result<Option<Value>> {
        Ok(self.value(key))
    }

    async fn set(&self, key: StoreKey, value: Value) -> Result<()> {
        let mut inner = self.lock();
        if inner.fail_writes {
            return Err(SyncError::Store(format!("write to {key:?} rejected")));
        }
        inner.writes.push((key, value.clone()));
        inner.put(key, value);
        Ok(())
    }

    async fn save(&self) -> Result<()> {
        let mut inner = self.lock();
        if inner.fail_writes {
            return Err(SyncError::Store("save rejected".into()));
        }
        inner.saves += 1;
        Ok(())
    }

    fn subscribe(&self) -> mpsc::UnboundedReceiver<StoreChange> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.lock().subscribers.push(tx);
        rx
    }
}
