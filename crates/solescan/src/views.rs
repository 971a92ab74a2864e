//! Canonical shoe views and the view collector.
//!
//! A run receives at most one image per canonical view. The collector
//! partitions the five views into present and missing, in canonical order,
//! and never fails — an empty submission simply yields five missing views.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// One of the five fixed photograph angles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum View {
    Outsole,
    Lateral,
    Medial,
    Heel,
    Top,
}

impl View {
    /// All views in canonical order. Present/missing lists and model
    /// image parts always follow this order.
    pub const ALL: [View; 5] = [
        View::Outsole,
        View::Lateral,
        View::Medial,
        View::Heel,
        View::Top,
    ];

    /// The wire label for this view.
    pub fn label(&self) -> &'static str {
        match self {
            View::Outsole => "OUTSOLE",
            View::Lateral => "LATERAL",
            View::Medial => "MEDIAL",
            View::Heel => "HEEL",
            View::Top => "TOP",
        }
    }

    /// Parses a view label. Exactly the five canonical labels are
    /// recognized; anything else returns `None` and is ignored upstream.
    pub fn from_label(label: &str) -> Option<View> {
        match label {
            "OUTSOLE" => Some(View::Outsole),
            "LATERAL" => Some(View::Lateral),
            "MEDIAL" => Some(View::Medial),
            "HEEL" => Some(View::Heel),
            "TOP" => Some(View::Top),
            _ => None,
        }
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Raw image bytes with the declared media type, bound to one view of
/// one run. Never shared across runs.
#[derive(Debug, Clone)]
pub struct ViewImage {
    pub bytes: Vec<u8>,
    pub media_type: String,
}

impl ViewImage {
    pub fn new(bytes: Vec<u8>, media_type: impl Into<String>) -> Self {
        Self {
            bytes,
            media_type: media_type.into(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Result of collecting a submission: present views with their payloads
/// and missing views, both in canonical order.
#[derive(Debug, Clone)]
pub struct CollectedViews {
    pub present: Vec<(View, ViewImage)>,
    pub missing: Vec<View>,
}

impl CollectedViews {
    /// The present views without their payloads, in canonical order.
    pub fn present_views(&self) -> Vec<View> {
        self.present.iter().map(|(view, _)| *view).collect()
    }
}

/// Partitions a submission into present and missing views.
///
/// An entry counts as present only if it carries at least one byte;
/// zero-byte uploads are treated as missing. Collection always succeeds.
pub fn collect_views(mut uploads: HashMap<View, ViewImage>) -> CollectedViews {
    let mut present = Vec::new();
    let mut missing = Vec::new();

    for view in View::ALL {
        match uploads.remove(&view) {
            Some(image) if !image.is_empty() => present.push((view, image)),
            _ => missing.push(view),
        }
    }

    CollectedViews { present, missing }
}
