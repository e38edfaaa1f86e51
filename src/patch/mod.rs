#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A named snapshot of every parameter, keyed by title so presets survive
/// table reordering across versions.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Preset {
    pub name: String,
    pub values: Vec<PresetValue>,
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct PresetValue {
    pub title: String,
    /// Normalized, 0.0 - 1.0.
    pub value: f64,
}

impl Preset {
    pub fn value(&self, title: &str) -> Option<f64> {
        self.values
            .iter()
            .find(|entry| entry.title == title)
            .map(|entry| entry.value)
    }
}
