//! Engine configuration.
//!
//! Every field has a default, so a partial JSON object (or `{}`) is a valid
//! configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Duration of enter/exit fades, geometry morphs and animated viewport moves.
    pub animation_ms: u64,
    /// Quiet period after a layout/symbol change before re-rendering.
    pub debounce_ms: u64,
    /// Interval between host visibility checks while mounting.
    pub visibility_poll_ms: u64,
    /// Wheel zoom sensitivity: `zoom *= exp(-delta_y * wheel_zoom_factor)`.
    pub wheel_zoom_factor: f64,
    /// Lower zoom bound for wheel zoom.
    pub min_zoom: f64,
    /// Upper zoom bound for wheel zoom.
    pub max_zoom: f64,
    /// Track pointer hover and write it back to the store.
    pub hover_enabled: bool,
    /// Ask the text measurer for label sizes before layout.
    pub measure_labels: bool,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            animation_ms: 300,
            debounce_ms: 300,
            visibility_poll_ms: 300,
            wheel_zoom_factor: 0.005,
            min_zoom: 0.2,
            max_zoom: 32.0,
            hover_enabled: true,
            measure_labels: true,
        }
    }
}

impl SyncConfig {
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    pub fn animation(&self) -> Duration {
        Duration::from_millis(self.animation_ms)
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn visibility_poll(&self) -> Duration {
        Duration::from_millis(self.visibility_poll_ms)
    }

    /// Clamp a wheel-zoom result to the configured range.
    pub fn clamp_zoom(&self, zoom: f64) -> f64 {
        zoom.clamp(self.min_zoom, self.max_zoom)
    }
}
