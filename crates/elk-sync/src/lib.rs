pub mod action;
pub mod animation;
pub mod config;
pub mod coordinator;
pub mod debounce;
pub mod engine;
pub mod error;
pub mod input;
pub mod lifecycle;
pub mod message;
pub mod reconcile;
pub mod store;
pub mod viewport;

pub use action::{Action, ActionKind, ActionRegistry};
pub use config::SyncConfig;
pub use coordinator::{Coordinator, HostEvent};
pub use engine::{CharWidthMeasurer, LayoutEngine, PrecomputedLayout, TextMeasurer};
pub use error::{Result, SyncError};
pub use lifecycle::LifecycleState;
pub use message::HostCommand;
pub use reconcile::{AnimationPlan, reconcile};
pub use store::{MemoryStore, StateStore, StoreChange, StoreKey};
pub use viewport::Viewport;
