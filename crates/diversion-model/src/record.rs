//! Weight records and their per-class grouping

use crate::disposition::DispositionClass;
use crate::error::ModelError;
use crate::materials::normalize_material_name;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A named material with a non-negative mass, tagged with its disposition.
///
/// Records with zero kilograms are valid; they are kept in the record set but
/// never produce a flow edge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawWeightRecord")]
pub struct WeightRecord {
    label: String,
    kilograms: f64,
    disposition_class: DispositionClass,
}

#[derive(Deserialize)]
struct RawWeightRecord {
    label: String,
    kilograms: f64,
    disposition_class: DispositionClass,
}

impl TryFrom<RawWeightRecord> for WeightRecord {
    type Error = ModelError;

    fn try_from(raw: RawWeightRecord) -> Result<Self, Self::Error> {
        WeightRecord::new(raw.label, raw.kilograms, raw.disposition_class)
    }
}

impl WeightRecord {
    /// Create a record, rejecting empty labels and negative or non-finite weights.
    ///
    /// # Errors
    /// [`ModelError::EmptyLabel`], [`ModelError::NegativeWeight`] or
    /// [`ModelError::NonFiniteWeight`].
    pub fn new(
        label: impl Into<String>,
        kilograms: f64,
        disposition_class: DispositionClass,
    ) -> Result<Self, ModelError> {
        let label = label.into();
        let trimmed = label.trim();
        if trimmed.is_empty() {
            return Err(ModelError::EmptyLabel);
        }
        let kilograms = ModelError::check_weight(format!("weight of '{trimmed}'"), kilograms)?;
        Ok(Self {
            label: trimmed.to_string(),
            kilograms,
            disposition_class,
        })
    }

    /// Material or category label
    #[inline]
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Mass in kilograms
    #[inline]
    #[must_use]
    pub fn kilograms(&self) -> f64 {
        self.kilograms
    }

    /// Disposition class
    #[inline]
    #[must_use]
    pub fn disposition_class(&self) -> DispositionClass {
        self.disposition_class
    }

    /// True when the record carries no mass
    #[inline]
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.kilograms == 0.0
    }

    /// Copy of this record with the mass multiplied by `factor`.
    ///
    /// # Errors
    /// Fails if the scaled mass is negative or not finite.
    pub fn scaled(&self, factor: f64) -> Result<Self, ModelError> {
        Self::new(
            self.label.clone(),
            self.kilograms * factor,
            self.disposition_class,
        )
    }
}

/// Aggregated mass for one material inside a disposition class
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialTotal {
    /// Label of the first record seen for this material
    pub label: String,
    /// Normalized material key
    pub key: String,
    /// Summed mass
    pub kilograms: f64,
}

/// Records grouped into disposition buckets.
///
/// A record always lands in the bucket of its own class, so a bucket can
/// never hold a record of a different class.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(
    try_from = "BTreeMap<DispositionClass, Vec<WeightRecord>>",
    into = "BTreeMap<DispositionClass, Vec<WeightRecord>>"
)]
pub struct RecordsByClass {
    buckets: BTreeMap<DispositionClass, Vec<WeightRecord>>,
}

impl TryFrom<BTreeMap<DispositionClass, Vec<WeightRecord>>> for RecordsByClass {
    type Error = ModelError;

    fn try_from(buckets: BTreeMap<DispositionClass, Vec<WeightRecord>>) -> Result<Self, Self::Error> {
        for (class, records) in &buckets {
            if let Some(stray) = records.iter().find(|r| r.disposition_class != *class) {
                return Err(ModelError::BucketMismatch {
                    bucket: *class,
                    record: stray.label.clone(),
                    class: stray.disposition_class,
                });
            }
        }
        Ok(Self { buckets })
    }
}

impl From<RecordsByClass> for BTreeMap<DispositionClass, Vec<WeightRecord>> {
    fn from(records: RecordsByClass) -> Self {
        records.buckets
    }
}

impl RecordsByClass {
    /// Empty record set
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a record to the bucket of its class
    pub fn push(&mut self, record: WeightRecord) {
        self.buckets
            .entry(record.disposition_class)
            .or_default()
            .push(record);
    }

    /// Builder-style [`push`](Self::push)
    #[must_use]
    pub fn with(mut self, record: WeightRecord) -> Self {
        self.push(record);
        self
    }

    /// Records of one class, in insertion order
    #[must_use]
    pub fn records(&self, class: DispositionClass) -> &[WeightRecord] {
        self.buckets.get(&class).map_or(&[], Vec::as_slice)
    }

    /// Every record, class by class in canonical order
    pub fn iter(&self) -> impl Iterator<Item = &WeightRecord> + '_ {
        self.buckets.values().flatten()
    }

    /// Number of records across all buckets, zero-weight records included
    #[must_use]
    pub fn len(&self) -> usize {
        self.buckets.values().map(Vec::len).sum()
    }

    /// True when no records were supplied
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Summed mass of one class at full precision
    #[must_use]
    pub fn total(&self, class: DispositionClass) -> f64 {
        self.records(class).iter().map(WeightRecord::kilograms).sum()
    }

    /// Summed mass of all classes
    #[must_use]
    pub fn grand_total(&self) -> f64 {
        DispositionClass::ALL.iter().map(|c| self.total(*c)).sum()
    }

    /// Per-material totals of one class.
    ///
    /// Records whose labels normalize to the same key are merged; materials
    /// keep the order in which they were first seen.
    #[must_use]
    pub fn material_totals(&self, class: DispositionClass) -> Vec<MaterialTotal> {
        let mut totals: IndexMap<String, MaterialTotal> = IndexMap::new();
        for record in self.records(class) {
            let key = normalize_material_name(&record.label);
            totals
                .entry(key.clone())
                .or_insert_with(|| MaterialTotal {
                    label: record.label.clone(),
                    key,
                    kilograms: 0.0,
                })
                .kilograms += record.kilograms;
        }
        totals.into_values().collect()
    }
}

impl Extend<WeightRecord> for RecordsByClass {
    fn extend<I: IntoIterator<Item = WeightRecord>>(&mut self, iter: I) {
        for record in iter {
            self.push(record);
        }
    }
}

impl FromIterator<WeightRecord> for RecordsByClass {
    fn from_iter<I: IntoIterator<Item = WeightRecord>>(iter: I) -> Self {
        let mut records = Self::new();
        records.extend(iter);
        records
    }
}
