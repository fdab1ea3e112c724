use crate::lifecycle::LifecycleState;
use elk_core::TransformError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SyncError {
    /// The new layout could not be turned into a scene; the live scene is kept.
    #[error("transform failed: {0}")]
    Transform(#[from] TransformError),

    #[error("layout engine failed: {0}")]
    Layout(String),

    #[error("store error: {0}")]
    Store(String),

    #[error("text measurement failed: {0}")]
    Measure(String),

    #[error("invalid json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("operation not allowed while {0:?}")]
    Lifecycle(LifecycleState),
}

pub type Result<T> = std::result::Result<T, SyncError>;
