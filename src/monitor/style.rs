//! Per-monitor plot style defaults.
//!
//! The crate does not render anything. It only carries the attributes a
//! renderer should apply to a monitor unless the caller overrides them.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Named style attributes, e.g. `{"color": "r", "linewidth": 3}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlotStyle(BTreeMap<String, Value>);

impl PlotStyle {
    /// An empty style.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an attribute and returns the style.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// Attribute named `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Number of attributes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True when no attribute is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Attributes in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// `overrides` with every attribute they lack taken from `self`.
    ///
    /// Nothing is saved.
    #[must_use]
    pub fn merged(&self, overrides: &Self) -> Self {
        let mut out = overrides.clone();
        for (k, v) in &self.0 {
            out.0.entry(k.clone()).or_insert_with(|| v.clone());
        }
        out
    }

    /// Saves `overrides` on top of the current attributes.
    pub fn update(&mut self, overrides: &Self) {
        for (k, v) in &overrides.0 {
            self.0.insert(k.clone(), v.clone());
        }
    }
}
