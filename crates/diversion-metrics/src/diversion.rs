//! Diversion Calculator
//!
//! Turns per-class mass into a diversion rate. Aggregation always runs at
//! full precision; only `diversion_rate_percent` on the returned
//! [`DiversionResult`] is rounded, to the policy's display precision.
//!
//! Results from several periods are merged by summing their breakdowns
//! and deriving the rate again ([`DiversionCalculator::combine`]).
//! Averaging percentages is never correct when periods differ in mass.

use crate::error::MetricsError;
use diversion_flow::FlowGraph;
use diversion_model::{DispositionClass, ModelError, RecordsByClass};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::iter::Sum;
use std::ops::Add;
use tracing::debug;

/// Default display precision for percentages
pub const DEFAULT_DISPLAY_DECIMALS: u32 = 2;

/// Default certification threshold
pub const DEFAULT_CERTIFICATION_THRESHOLD_PERCENT: f64 = 90.0;

/// Mass per disposition class, in kilograms
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Breakdown {
    /// Recycled mass
    pub recycled: f64,
    /// Composted mass
    pub composted: f64,
    /// Reused mass
    pub reused: f64,
    /// Landfilled mass
    pub landfilled: f64,
}

impl Breakdown {
    /// Validated breakdown.
    ///
    /// # Errors
    /// [`MetricsError::InvalidInput`] if any value is negative or not finite.
    pub fn new(
        recycled: f64,
        composted: f64,
        reused: f64,
        landfilled: f64,
    ) -> Result<Self, MetricsError> {
        Self {
            recycled,
            composted,
            reused,
            landfilled,
        }
        .validated()
    }

    /// Breakdown from a per-class map; missing classes count as zero.
    ///
    /// # Errors
    /// [`MetricsError::InvalidInput`] if any value is negative or not finite.
    pub fn from_class_totals(totals: &BTreeMap<DispositionClass, f64>) -> Result<Self, MetricsError> {
        let get = |class| totals.get(&class).copied().unwrap_or(0.0);
        Self::new(
            get(DispositionClass::Recycling),
            get(DispositionClass::Compost),
            get(DispositionClass::Reuse),
            get(DispositionClass::Landfill),
        )
    }

    /// Mass of one class
    #[must_use]
    pub fn get(&self, class: DispositionClass) -> f64 {
        match class {
            DispositionClass::Recycling => self.recycled,
            DispositionClass::Compost => self.composted,
            DispositionClass::Reuse => self.reused,
            DispositionClass::Landfill => self.landfilled,
        }
    }

    /// Add mass to one class
    pub fn add_to(&mut self, class: DispositionClass, kilograms: f64) {
        match class {
            DispositionClass::Recycling => self.recycled += kilograms,
            DispositionClass::Compost => self.composted += kilograms,
            DispositionClass::Reuse => self.reused += kilograms,
            DispositionClass::Landfill => self.landfilled += kilograms,
        }
    }

    /// Recycled + composted + reused
    #[must_use]
    pub fn diverted(&self) -> f64 {
        (self.recycled + self.composted + self.reused).max(0.0)
    }

    /// All four classes
    #[must_use]
    pub fn total(&self) -> f64 {
        (self.diverted() + self.landfilled).max(0.0)
    }

    /// Diversion rate at full precision; 0 when nothing was generated
    #[must_use]
    pub fn rate_percent(&self) -> f64 {
        percent_of(self.diverted(), self.total())
    }

    fn validated(self) -> Result<Self, MetricsError> {
        ModelError::check_weight("recycled", self.recycled)?;
        ModelError::check_weight("composted", self.composted)?;
        ModelError::check_weight("reused", self.reused)?;
        ModelError::check_weight("landfilled", self.landfilled)?;
        Ok(self)
    }
}

impl Add for Breakdown {
    type Output = Breakdown;

    fn add(self, rhs: Self) -> Self::Output {
        Self {
            recycled: self.recycled + rhs.recycled,
            composted: self.composted + rhs.composted,
            reused: self.reused + rhs.reused,
            landfilled: self.landfilled + rhs.landfilled,
        }
    }
}

impl Sum for Breakdown {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), Add::add)
    }
}

impl<'a> Sum<&'a Breakdown> for Breakdown {
    fn sum<I: Iterator<Item = &'a Breakdown>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

/// Diversion metrics for one period (or a merge of periods)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DiversionResult {
    /// Total generated mass (full precision)
    pub total_generated: f64,
    /// Mass kept out of landfill (full precision)
    pub total_diverted: f64,
    /// Diversion rate, rounded to display precision
    pub diversion_rate_percent: f64,
    /// Mass per class (full precision)
    pub breakdown: Breakdown,
}

impl DiversionResult {
    /// Rate recomputed from the breakdown at full precision
    #[must_use]
    pub fn exact_rate_percent(&self) -> f64 {
        self.breakdown.rate_percent()
    }

    /// Landfilled share at full precision
    #[must_use]
    pub fn landfill_rate_percent(&self) -> f64 {
        percent_of(self.breakdown.landfilled, self.total_generated)
    }

    /// True when nothing was generated
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.total_generated == 0.0
    }
}

/// Rounding and certification rules
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RatePolicy {
    /// Decimal places kept in `diversion_rate_percent`
    pub display_decimals: u32,
    /// Minimum rate for the certification flag
    pub certification_threshold_percent: f64,
}

impl Default for RatePolicy {
    fn default() -> Self {
        Self {
            display_decimals: DEFAULT_DISPLAY_DECIMALS,
            certification_threshold_percent: DEFAULT_CERTIFICATION_THRESHOLD_PERCENT,
        }
    }
}

/// Diversion rate calculator
#[derive(Debug, Clone, Copy, Default)]
pub struct DiversionCalculator {
    policy: RatePolicy,
}

impl DiversionCalculator {
    /// Calculator with 2-decimal display and a 90% certification threshold
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Calculator with a custom policy
    #[must_use]
    pub fn with_policy(policy: RatePolicy) -> Self {
        Self { policy }
    }

    /// Active policy
    #[inline]
    #[must_use]
    pub fn policy(&self) -> &RatePolicy {
        &self.policy
    }

    /// Result from four raw class totals.
    ///
    /// # Errors
    /// [`MetricsError::InvalidInput`] if any value is negative or not finite;
    /// negative input is rejected, never clamped.
    pub fn from_breakdown(
        &self,
        recycled: f64,
        composted: f64,
        reused: f64,
        landfilled: f64,
    ) -> Result<DiversionResult, MetricsError> {
        let breakdown = Breakdown::new(recycled, composted, reused, landfilled)?;
        Ok(self.finish(breakdown))
    }

    /// Result from an already assembled breakdown.
    ///
    /// # Errors
    /// [`MetricsError::InvalidInput`] if any value is negative or not finite.
    pub fn from_totals(&self, breakdown: Breakdown) -> Result<DiversionResult, MetricsError> {
        Ok(self.finish(breakdown.validated()?))
    }

    /// Result from the mass entering each destination node of a graph.
    ///
    /// # Errors
    /// [`MetricsError::Flow`] when a destination receiving mass has no
    /// disposition class; [`MetricsError::InvalidInput`] when destination
    /// inflows are negative or not finite.
    pub fn from_graph(&self, graph: &FlowGraph) -> Result<DiversionResult, MetricsError> {
        let totals = graph.destination_totals()?;
        let breakdown = Breakdown::from_class_totals(&totals)?;
        Ok(self.finish(breakdown))
    }

    /// Result straight from record totals, without building a graph.
    ///
    /// # Errors
    /// [`MetricsError::InvalidInput`] if a class total overflows to infinity.
    pub fn from_records(&self, records: &RecordsByClass) -> Result<DiversionResult, MetricsError> {
        let mut breakdown = Breakdown::default();
        for class in DispositionClass::ALL {
            breakdown.add_to(class, records.total(class));
        }
        self.from_totals(breakdown)
    }

    /// Merge results by summing their breakdowns and deriving the rate again
    pub fn combine<'a, I>(&self, results: I) -> DiversionResult
    where
        I: IntoIterator<Item = &'a DiversionResult>,
    {
        let breakdown: Breakdown = results.into_iter().map(|r| &r.breakdown).sum();
        self.finish(breakdown)
    }

    /// Informational certification flag, judged on the full-precision rate
    #[must_use]
    pub fn is_certified(&self, result: &DiversionResult) -> bool {
        !result.is_empty()
            && result.exact_rate_percent() >= self.policy.certification_threshold_percent
    }

    fn finish(&self, breakdown: Breakdown) -> DiversionResult {
        let total_generated = breakdown.total();
        let total_diverted = breakdown.diverted();
        let rate = percent_of(total_diverted, total_generated);
        let result = DiversionResult {
            total_generated,
            total_diverted,
            diversion_rate_percent: round_to(rate, self.policy.display_decimals),
            breakdown,
        };
        debug!(
            total_generated,
            total_diverted,
            rate_percent = result.diversion_rate_percent,
            "diversion computed"
        );
        result
    }
}

fn percent_of(part: f64, whole: f64) -> f64 {
    if whole > 0.0 {
        part / whole * 100.0
    } else {
        0.0
    }
}

/// Round half away from zero to `decimals` places
#[must_use]
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let scale = 10f64.powi(i32::try_from(decimals).unwrap_or(i32::MAX));
    if !scale.is_finite() {
        return value;
    }
    (value * scale).round() / scale
}

#[cfg(test)]
mod tests {
    use super::*;
    use diversion_flow::{FlowEdge, FlowGraphBuilder, FlowNode, NodeRole};
    use diversion_model::WeightRecord;

    fn calc() -> DiversionCalculator {
        DiversionCalculator::new()
    }

    #[test]
    fn half_diverted() {
        let result = calc().from_breakdown(100.0, 50.0, 0.0, 150.0).unwrap();
        assert_eq!(result.total_generated, 300.0);
        assert_eq!(result.total_diverted, 150.0);
        assert_eq!(result.diversion_rate_percent, 50.0);
        assert_eq!(result.breakdown.landfilled, 150.0);
    }

    #[test]
    fn zero_generation_is_zero_percent() {
        let result = calc().from_breakdown(0.0, 0.0, 0.0, 0.0).unwrap();
        assert_eq!(result.diversion_rate_percent, 0.0);
        assert!(!result.diversion_rate_percent.is_nan());
        assert!(result.is_empty());
    }

    #[test]
    fn negative_input_is_rejected() {
        let err = calc().from_breakdown(10.0, -1.0, 0.0, 0.0).unwrap_err();
        match err {
            MetricsError::InvalidInput(ModelError::NegativeWeight { field, value }) => {
                assert_eq!(field, "composted");
                assert_eq!(value, -1.0);
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn nan_input_is_rejected() {
        assert!(calc().from_breakdown(f64::NAN, 0.0, 0.0, 0.0).is_err());
    }

    #[test]
    fn rate_is_rounded_only_at_the_boundary() {
        let result = calc().from_breakdown(1.0, 0.0, 0.0, 2.0).unwrap();
        assert_eq!(result.diversion_rate_percent, 33.33);
        assert!((result.exact_rate_percent() - 100.0 / 3.0).abs() < 1e-12);
        assert_eq!(result.total_generated, 3.0);
    }

    #[test]
    fn display_precision_follows_policy() {
        let calc = DiversionCalculator::with_policy(RatePolicy {
            display_decimals: 0,
            ..RatePolicy::default()
        });
        let result = calc.from_breakdown(2.0, 0.0, 0.0, 1.0).unwrap();
        assert_eq!(result.diversion_rate_percent, 67.0);
    }

    #[test]
    fn combine_uses_summed_totals() {
        // 90% of 1000 kg and 10% of 10 kg: averaging would give 50%
        let big = calc().from_breakdown(900.0, 0.0, 0.0, 100.0).unwrap();
        let small = calc().from_breakdown(1.0, 0.0, 0.0, 9.0).unwrap();
        let merged = calc().combine([&big, &small]);

        assert_eq!(merged.total_generated, 1010.0);
        assert_eq!(merged.total_diverted, 901.0);
        assert_eq!(merged.diversion_rate_percent, 89.21);
    }

    #[test]
    fn combine_of_nothing_is_empty() {
        let merged = calc().combine(std::iter::empty());
        assert!(merged.is_empty());
        assert_eq!(merged.diversion_rate_percent, 0.0);
    }

    #[test]
    fn certification_uses_threshold() {
        let passing = calc().from_breakdown(90.0, 0.0, 0.0, 10.0).unwrap();
        let failing = calc().from_breakdown(89.0, 0.0, 0.0, 11.0).unwrap();
        assert!(calc().is_certified(&passing));
        assert!(!calc().is_certified(&failing));
    }

    #[test]
    fn certification_ignores_display_rounding() {
        // 89.996% rounds to 90.00 for display but is below the threshold
        let result = calc().from_breakdown(89.996, 0.0, 0.0, 10.004).unwrap();
        assert_eq!(result.diversion_rate_percent, 90.0);
        assert!(!calc().is_certified(&result));
    }

    #[test]
    fn from_graph_reads_destination_inflows() {
        let records = [
            WeightRecord::new("paper", 100.0, DispositionClass::Recycling).unwrap(),
            WeightRecord::new("food", 50.0, DispositionClass::Compost).unwrap(),
            WeightRecord::new("mixed", 150.0, DispositionClass::Landfill).unwrap(),
        ]
        .into_iter()
        .collect();
        let graph = FlowGraphBuilder::default()
            .with_material_breakdown(true)
            .build(&records);

        let from_graph = calc().from_graph(&graph).unwrap();
        let from_records = calc().from_records(&records).unwrap();
        assert_eq!(from_graph, from_records);
        assert_eq!(from_graph.diversion_rate_percent, 50.0);
    }

    #[test]
    fn from_records_rejects_overflowing_totals() {
        let records = [
            WeightRecord::new("paper", f64::MAX, DispositionClass::Recycling).unwrap(),
            WeightRecord::new("cardboard", f64::MAX, DispositionClass::Recycling).unwrap(),
        ]
        .into_iter()
        .collect();

        assert!(matches!(
            calc().from_records(&records),
            Err(MetricsError::InvalidInput(ModelError::NonFiniteWeight { .. }))
        ));
    }

    #[test]
    fn from_graph_rejects_unclassified_destination() {
        let graph = FlowGraph::from_parts(
            vec![
                FlowNode::new("source_total", "Total", NodeRole::Source),
                FlowNode::new("site", "Transfer Station", NodeRole::Destination),
            ],
            vec![FlowEdge::new("source_total", "site", 10.0)],
        );
        assert!(matches!(
            calc().from_graph(&graph),
            Err(MetricsError::Flow(_))
        ));
    }

    #[test]
    fn from_graph_on_empty_graph() {
        let result = calc().from_graph(&FlowGraph::empty()).unwrap();
        assert!(result.is_empty());
    }

    #[test]
    fn landfill_rate_complements_diversion() {
        let result = calc().from_breakdown(30.0, 20.0, 10.0, 40.0).unwrap();
        assert_eq!(result.landfill_rate_percent(), 40.0);
        assert_eq!(result.exact_rate_percent(), 60.0);
    }

    #[test]
    fn round_to_half_away_from_zero() {
        assert_eq!(round_to(12.345_6, 2), 12.35);
        assert_eq!(round_to(0.0, 2), 0.0);
        assert_eq!(round_to(99.999, 1), 100.0);
    }
}
