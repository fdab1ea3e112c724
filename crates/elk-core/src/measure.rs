//! Label measurement: requests to the external text measurer and backfill of
//! the returned sizes into the layout tree, before layout runs.

use crate::model::{LayoutElement, LayoutLabel, LayoutNode, for_each_label_mut, option_f64};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Spacing between a label and its sub-labels.
pub const LABEL_LABEL_SPACING: &str = "org.eclipse.elk.spacing.labelLabel";

/// One label to measure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeasureRequest {
    pub id: String,
    pub text: String,
    #[serde(default)]
    pub css_classes: Vec<String>,
}

/// Measured size of one label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    pub id: String,
    pub width: f64,
    pub height: f64,
}

/// Labels that carry text and an id but lack a width or height.
pub fn collect_label_requests(root: &LayoutNode) -> Vec<MeasureRequest> {
    root.descendants()
        .into_iter()
        .filter_map(|element| match element {
            LayoutElement::Label(label) => request_for(label),
            _ => None,
        })
        .collect()
}

fn request_for(label: &LayoutLabel) -> Option<MeasureRequest> {
    if label.width.is_some() && label.height.is_some() {
        return None;
    }
    Some(MeasureRequest {
        id: label.id.clone()?,
        text: label.text.clone()?,
        css_classes: label
            .properties
            .as_ref()
            .map(|p| p.classes())
            .unwrap_or_default(),
    })
}

/// Fill missing label sizes from `measurements`. Returns how many labels
/// were updated; measurements for unknown ids are ignored.
pub fn apply_measurements(root: &mut LayoutNode, measurements: &[Measurement]) -> usize {
    let by_id: HashMap<&str, &Measurement> =
        measurements.iter().map(|m| (m.id.as_str(), m)).collect();
    let mut updated = 0;
    for_each_label_mut(root, &mut |label| {
        let Some(m) = label.id.as_deref().and_then(|id| by_id.get(id)) else {
            return;
        };
        if label.width.is_none() {
            label.width = Some(m.width);
        }
        if label.height.is_none() {
            label.height = Some(m.height);
        }
        updated += 1;
    });
    updated
}

/// Rule-of-thumb sizes for labels still lacking geometry: ten units per
/// character wide, ten units tall.
pub fn estimate_label_sizes(root: &mut LayoutNode) {
    for_each_label_mut(root, &mut |label| {
        if label.width.is_none() {
            let chars = label.text.as_deref().map_or(0, |t| t.chars().count());
            label.width = Some(10.0 * chars as f64);
        }
        if label.height.is_none() {
            label.height = Some(10.0);
        }
    });
}

/// Size labels that own sub-labels: width grows by each sub-label's width
/// plus its label-label spacing, height is the tallest of them.
pub fn size_compound_labels(root: &mut LayoutNode) {
    for child in &mut root.children {
        size_compound_labels(child);
    }
    for port in &mut root.ports {
        port.labels.iter_mut().for_each(size_compound);
    }
    root.labels.iter_mut().for_each(size_compound);
    for edge in &mut root.edges {
        edge.labels.iter_mut().for_each(size_compound);
    }
}

fn size_compound(label: &mut LayoutLabel) {
    if label.labels.is_empty() {
        return;
    }
    let mut width = label.width.unwrap_or(0.0);
    let mut height = label.height.unwrap_or(0.0);
    for sub in &mut label.labels {
        size_compound(sub);
        let spacing = option_f64(sub.layout_options.as_ref(), LABEL_LABEL_SPACING).unwrap_or(0.0);
        width += sub.width.unwrap_or(0.0) + spacing;
        height = height.max(sub.height.unwrap_or(0.0));
    }
    label.width = Some(width);
    label.height = Some(height);
}
