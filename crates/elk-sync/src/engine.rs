//! External async collaborators: the layout engine and the text measurer.

use crate::error::Result;
use async_trait::async_trait;
use elk_core::measure::{MeasureRequest, Measurement};
use elk_core::model::LayoutNode;

/// Computes geometry for a layout tree.
#[async_trait]
pub trait LayoutEngine: Send + Sync {
    async fn layout(&self, tree: LayoutNode) -> Result<LayoutNode>;
}

/// Layout engine for trees that arrive already laid out.
#[derive(Debug, Default, Clone, Copy)]
pub struct PrecomputedLayout;

#[async_trait]
impl LayoutEngine for PrecomputedLayout {
    async fn layout(&self, tree: LayoutNode) -> Result<LayoutNode> {
        Ok(tree)
    }
}

/// Measures rendered label text.
#[async_trait]
pub trait TextMeasurer: Send + Sync {
    async fn measure(&self, batch: Vec<MeasureRequest>) -> Result<Vec<Measurement>>;
}

/// Measurer that sizes text by character count.
#[derive(Debug, Clone, Copy)]
pub struct CharWidthMeasurer {
    pub char_width: f64,
    pub line_height: f64,
}

impl Default for CharWidthMeasurer {
    fn default() -> Self {
        Self {
            char_width: 10.0,
            line_height: 10.0,
        }
    }
}

#[async_trait]
impl TextMeasurer for CharWidthMeasurer {
    async fn measure(&self, batch: Vec<MeasureRequest>) -> Result<Vec<Measurement>> {
        Ok(batch
            .into_iter()
            .map(|req| Measurement {
                width: self.char_width * req.text.chars().count() as f64,
                height: self.line_height,
                id: req.id,
            })
            .collect())
    }
}
