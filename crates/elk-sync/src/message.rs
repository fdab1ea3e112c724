//! Host command messages.
//!
//! ```json
//! {"action": "center", "model_id": ["n1", "n2"], "animate": false}
//! {"action": "fit", "model_id": "n1", "padding": 20, "max_zoom": 2}
//! ```
//!
//! `model_id` may be one id, a list of ids, or absent/null (whole diagram).

use crate::action::Action;
use elk_core::id::ElementId;
use serde::{Deserialize, Deserializer};

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum HostCommand {
    Center {
        #[serde(default, deserialize_with = "model_ids")]
        model_id: Vec<ElementId>,
        #[serde(default = "yes")]
        animate: bool,
        #[serde(default)]
        retain_zoom: bool,
    },
    Fit {
        #[serde(default, deserialize_with = "model_ids")]
        model_id: Vec<ElementId>,
        #[serde(default = "yes")]
        animate: bool,
        /// Absent or null means unbounded.
        #[serde(default)]
        max_zoom: Option<f64>,
        #[serde(default)]
        padding: Option<f64>,
    },
}

fn yes() -> bool {
    true
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

fn model_ids<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<ElementId>, D::Error> {
    let ids = match Option::<OneOrMany>::deserialize(deserializer)? {
        None => Vec::new(),
        Some(OneOrMany::One(id)) => vec![id],
        Some(OneOrMany::Many(ids)) => ids,
    };
    Ok(ids.iter().map(|s| ElementId::intern(s)).collect())
}

impl HostCommand {
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// The viewport action this command requests.
    pub fn into_action(self) -> Action {
        match self {
            Self::Center {
                model_id,
                animate,
                retain_zoom,
            } => Action::Center {
                ids: model_id,
                animate,
                retain_zoom,
                zoom: None,
            },
            Self::Fit {
                model_id,
                animate,
                max_zoom,
                padding,
            } => Action::Fit {
                ids: model_id,
                padding: padding.unwrap_or(0.0),
                max_zoom: max_zoom.unwrap_or(f64::INFINITY),
                animate,
            },
        }
    }
}
