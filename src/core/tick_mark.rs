use serde::{Deserialize, Serialize};

/// One tick: value, label text, screen position and measured label size.
///
/// Pooled per axis and mutated in place across layout passes.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TickMark {
    pub value: f64,
    pub label: String,
    pub position: f64,
    pub visible: bool,
    pub width: f64,
    pub height: f64,
}

impl TickMark {
    #[must_use]
    pub fn new(value: f64, label: impl Into<String>) -> Self {
        Self {
            value,
            label: label.into(),
            position: 0.0,
            visible: true,
            width: 0.0,
            height: 0.0,
        }
    }

    /// Reassigns value and label; the measured size is refreshed by the caller.
    pub fn set_value(&mut self, value: f64, label: impl Into<String>) {
        self.value = value;
        self.label = label.into();
        self.visible = true;
    }

    /// Label extent along an axis of the given orientation.
    #[must_use]
    pub fn extent(&self, horizontal: bool) -> f64 {
        if horizontal { self.width } else { self.height }
    }

    #[must_use]
    pub fn label_start(&self, horizontal: bool) -> f64 {
        self.position - self.extent(horizontal) / 2.0
    }

    #[must_use]
    pub fn label_end(&self, horizontal: bool) -> f64 {
        self.position + self.extent(horizontal) / 2.0
    }
}
