//! Material classification table
//!
//! Maps free-form material names to whether the material is divertible and,
//! optionally, which disposition it is routed to. Names are matched after
//! normalization (trimmed, lowercased, internal whitespace collapsed).
//! Materials missing from the table resolve to
//! [`MaterialClassification::UNCLASSIFIED`], which is non-divertible.

use crate::disposition::DispositionClass;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Normalize a material name for table lookups and merging
#[must_use]
pub fn normalize_material_name(name: &str) -> String {
    name.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

/// How one material is handled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaterialClassification {
    /// Whether this material counts as diverted from landfill
    pub divertible: bool,
    /// Destination override; `None` keeps the record's own class
    #[serde(default)]
    pub destination: Option<DispositionClass>,
}

impl MaterialClassification {
    /// Fallback for materials missing from the table
    pub const UNCLASSIFIED: MaterialClassification = MaterialClassification {
        divertible: false,
        destination: None,
    };

    /// Divertible material routed to `class`
    #[inline]
    #[must_use]
    pub const fn divertible_to(class: DispositionClass) -> Self {
        Self {
            divertible: class.is_diverted(),
            destination: Some(class),
        }
    }

    /// Material that always ends up in landfill
    #[inline]
    #[must_use]
    pub const fn landfill() -> Self {
        Self {
            divertible: false,
            destination: Some(DispositionClass::Landfill),
        }
    }
}

/// Externally configurable material → classification lookup
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(
    from = "BTreeMap<String, MaterialClassification>",
    into = "BTreeMap<String, MaterialClassification>"
)]
pub struct MaterialTable {
    entries: BTreeMap<String, MaterialClassification>,
}

impl From<BTreeMap<String, MaterialClassification>> for MaterialTable {
    fn from(raw: BTreeMap<String, MaterialClassification>) -> Self {
        raw.into_iter().collect()
    }
}

impl From<MaterialTable> for BTreeMap<String, MaterialClassification> {
    fn from(table: MaterialTable) -> Self {
        table.entries
    }
}

impl FromIterator<(String, MaterialClassification)> for MaterialTable {
    fn from_iter<I: IntoIterator<Item = (String, MaterialClassification)>>(iter: I) -> Self {
        let mut table = Self::new();
        for (name, classification) in iter {
            table.insert(&name, classification);
        }
        table
    }
}

impl MaterialTable {
    /// Empty table; every lookup resolves to the unclassified default
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Built-in table for common municipal solid waste streams
    #[must_use]
    pub fn municipal_default() -> Self {
        use DispositionClass::{Compost, Recycling, Reuse};

        Self::new()
            .with("paper", MaterialClassification::divertible_to(Recycling))
            .with("cardboard", MaterialClassification::divertible_to(Recycling))
            .with("plastics", MaterialClassification::divertible_to(Recycling))
            .with("metals", MaterialClassification::divertible_to(Recycling))
            .with("glass", MaterialClassification::divertible_to(Recycling))
            .with("food", MaterialClassification::divertible_to(Compost))
            .with("yard", MaterialClassification::divertible_to(Compost))
            .with("wood", MaterialClassification::divertible_to(Reuse))
            .with("textiles", MaterialClassification::divertible_to(Reuse))
            .with("mixed", MaterialClassification::landfill())
            .with("other", MaterialClassification::landfill())
    }

    /// Insert or replace an entry, returning the previous classification
    pub fn insert(
        &mut self,
        name: &str,
        classification: MaterialClassification,
    ) -> Option<MaterialClassification> {
        self.entries
            .insert(normalize_material_name(name), classification)
    }

    /// Builder-style [`insert`](Self::insert)
    #[must_use]
    pub fn with(mut self, name: &str, classification: MaterialClassification) -> Self {
        self.insert(name, classification);
        self
    }

    /// Entry for `name`, if present
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<&MaterialClassification> {
        self.entries.get(&normalize_material_name(name))
    }

    /// Classification for `name`, falling back to non-divertible
    #[must_use]
    pub fn classify(&self, name: &str) -> MaterialClassification {
        self.lookup(name)
            .copied()
            .unwrap_or(MaterialClassification::UNCLASSIFIED)
    }

    /// True when `name` has an explicit entry
    #[must_use]
    pub fn is_known(&self, name: &str) -> bool {
        self.lookup(name).is_some()
    }

    /// Number of entries
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when the table has no entries
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in key order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &MaterialClassification)> + '_ {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }
}
