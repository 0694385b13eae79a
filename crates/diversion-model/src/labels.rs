//! Display labels for flow-graph nodes
//!
//! Labels are presentation data, so they are passed into graph construction
//! as a value instead of living in a global table. Any class without an
//! override falls back to a built-in label.

use crate::disposition::DispositionClass;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

const DEFAULT_SOURCE_LABEL: &str = "Total Waste Generated";

/// Label overrides for source, process and destination nodes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LabelConfig {
    /// Label of the single source node
    pub source: String,
    /// Process (category) node labels by class
    pub process: BTreeMap<DispositionClass, String>,
    /// Destination (facility) node labels by class
    pub destination: BTreeMap<DispositionClass, String>,
}

impl Default for LabelConfig {
    fn default() -> Self {
        Self {
            source: DEFAULT_SOURCE_LABEL.to_string(),
            process: BTreeMap::new(),
            destination: BTreeMap::new(),
        }
    }
}

impl LabelConfig {
    /// Built-in labels only
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the source label
    #[must_use]
    pub fn with_source(mut self, label: impl Into<String>) -> Self {
        self.source = label.into();
        self
    }

    /// Override one process label
    #[must_use]
    pub fn with_process(mut self, class: DispositionClass, label: impl Into<String>) -> Self {
        self.process.insert(class, label.into());
        self
    }

    /// Override one destination label
    #[must_use]
    pub fn with_destination(mut self, class: DispositionClass, label: impl Into<String>) -> Self {
        self.destination.insert(class, label.into());
        self
    }

    /// Label of the source node
    #[must_use]
    pub fn source_label(&self) -> &str {
        if self.source.trim().is_empty() {
            DEFAULT_SOURCE_LABEL
        } else {
            &self.source
        }
    }

    /// Label of the process node for `class`
    #[must_use]
    pub fn process_label(&self, class: DispositionClass) -> &str {
        self.process
            .get(&class)
            .map_or_else(|| default_process_label(class), String::as_str)
    }

    /// Label of the destination node for `class`
    #[must_use]
    pub fn destination_label(&self, class: DispositionClass) -> &str {
        self.destination
            .get(&class)
            .map_or_else(|| default_destination_label(class), String::as_str)
    }
}

fn default_process_label(class: DispositionClass) -> &'static str {
    match class {
        DispositionClass::Recycling => "Recyclables",
        DispositionClass::Compost => "Organics",
        DispositionClass::Reuse => "Reusables",
        DispositionClass::Landfill => "Landfill Waste",
    }
}

fn default_destination_label(class: DispositionClass) -> &'static str {
    match class {
        DispositionClass::Recycling => "Recycling Facility",
        DispositionClass::Compost => "Composting Facility",
        DispositionClass::Reuse => "Reuse Center",
        DispositionClass::Landfill => "Landfill",
    }
}
