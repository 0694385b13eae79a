//! Testing utilities for the waste diversion workspace
//!
//! Shared fixtures, float assertions and proptest strategies.

#![allow(missing_docs)]
#![allow(clippy::missing_panics_doc)]

use diversion_model::{DispositionClass, RecordsByClass, WeightRecord};
use proptest::prelude::*;

pub fn record(label: &str, kilograms: f64, class: DispositionClass) -> WeightRecord {
    WeightRecord::new(label, kilograms, class).unwrap()
}

/// paper 100 (recycling), food 50 (compost), mixed 150 (landfill)
pub fn balanced_records() -> RecordsByClass {
    RecordsByClass::new()
        .with(record("paper", 100.0, DispositionClass::Recycling))
        .with(record("food", 50.0, DispositionClass::Compost))
        .with(record("mixed", 150.0, DispositionClass::Landfill))
}

/// A month of office waste across all four classes, with a zero record
pub fn office_month() -> RecordsByClass {
    RecordsByClass::new()
        .with(record("paper", 412.5, DispositionClass::Recycling))
        .with(record("cardboard", 230.0, DispositionClass::Recycling))
        .with(record("plastics", 88.25, DispositionClass::Recycling))
        .with(record("glass", 0.0, DispositionClass::Recycling))
        .with(record("food", 305.75, DispositionClass::Compost))
        .with(record("furniture", 64.0, DispositionClass::Reuse))
        .with(record("mixed", 120.5, DispositionClass::Landfill))
}

/// Assert `|actual - expected| <= epsilon`
#[track_caller]
pub fn assert_close(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() <= epsilon,
        "expected {expected} ± {epsilon}, got {actual}"
    );
}

pub fn arb_disposition() -> impl Strategy<Value = DispositionClass> {
    prop::sample::select(DispositionClass::ALL.to_vec())
}

/// Quarter-kilogram weights up to 25 t; every partial sum is exact in f64
pub fn arb_kilograms() -> impl Strategy<Value = f64> {
    (0u32..100_000).prop_map(|quarters| f64::from(quarters) * 0.25)
}

pub fn arb_material() -> impl Strategy<Value = String> {
    prop::sample::select(vec![
        "paper", "cardboard", "plastics", "metals", "glass", "food", "yard", "wood",
        "textiles", "mixed",
    ])
    .prop_map(str::to_string)
}

pub fn arb_record() -> impl Strategy<Value = WeightRecord> {
    (arb_material(), arb_kilograms(), arb_disposition())
        .prop_map(|(label, kg, class)| record(&label, kg, class))
}

pub fn arb_records_by_class() -> impl Strategy<Value = RecordsByClass> {
    prop::collection::vec(arb_record(), 0..40)
        .prop_map(|records| records.into_iter().collect())
}
