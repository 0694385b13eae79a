//! Quartering Audit Extrapolation
//!
//! A quartering audit weighs a pile of waste, repeatedly halves or quarters
//! it, and sorts what remains by material. The ratio of the weight before
//! quartering to the weight that remains (the extrapolation factor) scales
//! each sampled material up to an estimate for the whole pile.
//!
//! Nothing unusual about a sample is an error here. Zero remaining weight
//! gives a factor of 1, an empty sample gives an empty estimate, and small
//! samples are flagged as advisory metadata.

use crate::diversion::{Breakdown, DiversionCalculator, DiversionResult};
use crate::error::MetricsError;
use diversion_model::{DispositionClass, MaterialTable, ModelError, WeightRecord};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Default minimum remaining sample weight for an adequate sample
pub const DEFAULT_MIN_SAMPLE_KG: f64 = 50.0;

/// Default minimum remaining share of the pile for an adequate sample
pub const DEFAULT_MIN_SAMPLE_FRACTION: f64 = 0.10;

/// Weights recorded during one quartering audit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawAuditSample")]
pub struct AuditSample {
    total_weight_before_quartering: f64,
    remaining_weight_after_quartering: f64,
    sampled_materials: Vec<WeightRecord>,
}

#[derive(Deserialize)]
struct RawAuditSample {
    total_weight_before_quartering: f64,
    remaining_weight_after_quartering: f64,
    #[serde(default)]
    sampled_materials: Vec<WeightRecord>,
}

impl TryFrom<RawAuditSample> for AuditSample {
    type Error = MetricsError;

    fn try_from(raw: RawAuditSample) -> Result<Self, Self::Error> {
        AuditSample::new(
            raw.total_weight_before_quartering,
            raw.remaining_weight_after_quartering,
            raw.sampled_materials,
        )
    }
}

impl AuditSample {
    /// Validated audit sample.
    ///
    /// A total below the remaining weight is accepted here and flagged by
    /// [`AuditExtrapolator::analyze`].
    ///
    /// # Errors
    /// [`MetricsError::InvalidInput`] for negative or non-finite weights.
    pub fn new(
        total_weight_before_quartering: f64,
        remaining_weight_after_quartering: f64,
        sampled_materials: Vec<WeightRecord>,
    ) -> Result<Self, MetricsError> {
        ModelError::check_weight("total weight before quartering", total_weight_before_quartering)?;
        ModelError::check_weight(
            "remaining weight after quartering",
            remaining_weight_after_quartering,
        )?;
        Ok(Self {
            total_weight_before_quartering,
            remaining_weight_after_quartering,
            sampled_materials,
        })
    }

    /// Weight of the pile before quartering
    #[inline]
    #[must_use]
    pub fn total_weight_before_quartering(&self) -> f64 {
        self.total_weight_before_quartering
    }

    /// Weight left after quartering
    #[inline]
    #[must_use]
    pub fn remaining_weight_after_quartering(&self) -> f64 {
        self.remaining_weight_after_quartering
    }

    /// Sorted materials
    #[inline]
    #[must_use]
    pub fn sampled_materials(&self) -> &[WeightRecord] {
        &self.sampled_materials
    }

    /// Summed weight of the sorted materials
    #[must_use]
    pub fn sampled_total(&self) -> f64 {
        self.sampled_materials.iter().map(WeightRecord::kilograms).sum()
    }

    /// Share of the pile that remained.
    ///
    /// Infinite when a non-empty sample came from a pile recorded as zero,
    /// `None` when both weights are zero.
    #[must_use]
    pub fn sample_fraction(&self) -> Option<f64> {
        let fraction = self.remaining_weight_after_quartering / self.total_weight_before_quartering;
        (!fraction.is_nan()).then_some(fraction)
    }
}

/// Ratio of pile weight to remaining sample weight.
///
/// Returns `1.0` when nothing remained after quartering: an empty sample
/// carries no scaling information, and downstream consumers still need a
/// deterministic multiplier.
#[must_use]
pub fn compute_extrapolation_factor(sample: &AuditSample) -> f64 {
    if sample.remaining_weight_after_quartering == 0.0 {
        1.0
    } else {
        sample.total_weight_before_quartering / sample.remaining_weight_after_quartering
    }
}

/// Minimum-sample rule of the audit methodology
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SampleAdequacyRule {
    /// A sample at least this heavy is always adequate
    pub min_sample_kg: f64,
    /// A sample at least this share of the pile is adequate
    pub min_sample_fraction: f64,
}

impl Default for SampleAdequacyRule {
    fn default() -> Self {
        Self {
            min_sample_kg: DEFAULT_MIN_SAMPLE_KG,
            min_sample_fraction: DEFAULT_MIN_SAMPLE_FRACTION,
        }
    }
}

impl SampleAdequacyRule {
    /// `remaining >= min_kg || remaining / total >= min_fraction`
    #[must_use]
    pub fn is_adequate(&self, sample: &AuditSample) -> bool {
        sample.remaining_weight_after_quartering >= self.min_sample_kg
            || sample
                .sample_fraction()
                .is_some_and(|fraction| fraction >= self.min_sample_fraction)
    }
}

/// One sampled material scaled to the whole pile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtrapolatedRecord {
    /// Scaled record; label and class are preserved
    pub record: WeightRecord,
    /// Weight as found in the sample
    pub sampled_kilograms: f64,
    /// Whether the material counts as diverted
    pub divertible: bool,
    /// Whether the material table had an entry for it
    pub classified: bool,
    /// Where the mass is counted when computing diversion
    pub destination: DispositionClass,
}

/// Advisory findings about an audit sample
#[derive(Debug, Clone, PartialEq, Serialize, thiserror::Error)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AuditWarning {
    /// Pile weight is below the remaining sample weight
    #[error("total weight before quartering ({total} kg) is below the remaining sample weight ({remaining} kg)")]
    TotalBelowSample {
        /// Recorded pile weight
        total: f64,
        /// Remaining sample weight
        remaining: f64,
    },

    /// Nothing remained after quartering, so the factor defaulted to 1
    #[error("remaining sample weight is zero; extrapolation factor defaults to 1")]
    ZeroSampleWeight,

    /// Sample is below both adequacy thresholds
    #[error(
        "sample of {remaining} kg is below {min_sample_kg} kg and {:.1}% of the pile",
        .min_sample_fraction * 100.0
    )]
    InadequateSample {
        /// Remaining sample weight
        remaining: f64,
        /// Weight threshold in force
        min_sample_kg: f64,
        /// Share threshold in force
        min_sample_fraction: f64,
    },

    /// Material missing from the classification table
    #[error("material '{label}' is not in the classification table; counted as non-divertible")]
    UnclassifiedMaterial {
        /// Material label as sampled
        label: String,
    },

    /// Sorted materials weigh more than the remaining sample
    #[error("sorted materials weigh {sampled} kg, more than the remaining sample of {remaining} kg")]
    SampledExceedsRemaining {
        /// Summed weight of the sorted materials
        sampled: f64,
        /// Remaining sample weight
        remaining: f64,
    },

    /// Table marks a material divertible but its class is landfill
    #[error("material '{label}' is divertible but routed to landfill; counted as landfilled")]
    DivertibleRoutedToLandfill {
        /// Material label as sampled
        label: String,
    },
}

/// Everything derived from one audit sample
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuditReport {
    /// Extrapolation factor
    pub factor: f64,
    /// Advisory minimum-sample flag
    pub sample_adequate: bool,
    /// Scaled materials, in sample order
    pub extrapolated: Vec<ExtrapolatedRecord>,
    /// Diversion of the extrapolated population
    pub diversion: DiversionResult,
    /// Advisory findings
    pub warnings: Vec<AuditWarning>,
}

/// Scales audit samples to population estimates
#[derive(Debug, Clone, Copy, Default)]
pub struct AuditExtrapolator {
    rule: SampleAdequacyRule,
    calculator: DiversionCalculator,
}

impl AuditExtrapolator {
    /// Extrapolator with the 50 kg / 10% adequacy rule
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Custom adequacy rule
    #[must_use]
    pub fn with_rule(mut self, rule: SampleAdequacyRule) -> Self {
        self.rule = rule;
        self
    }

    /// Custom diversion calculator
    #[must_use]
    pub fn with_calculator(mut self, calculator: DiversionCalculator) -> Self {
        self.calculator = calculator;
        self
    }

    /// Active adequacy rule
    #[inline]
    #[must_use]
    pub fn rule(&self) -> &SampleAdequacyRule {
        &self.rule
    }

    /// See [`compute_extrapolation_factor`]
    #[must_use]
    pub fn compute_extrapolation_factor(&self, sample: &AuditSample) -> f64 {
        compute_extrapolation_factor(sample)
    }

    /// Advisory minimum-sample flag
    #[must_use]
    pub fn is_sample_adequate(&self, sample: &AuditSample) -> bool {
        self.rule.is_adequate(sample)
    }

    /// Scale every sampled material by the extrapolation factor.
    ///
    /// Divertibility comes from `table`; materials missing from it are
    /// non-divertible. An empty sample yields an empty list.
    ///
    /// # Errors
    /// [`MetricsError::InvalidInput`] if a scaled weight overflows.
    pub fn extrapolate(
        &self,
        sample: &AuditSample,
        table: &MaterialTable,
    ) -> Result<Vec<ExtrapolatedRecord>, MetricsError> {
        let factor = compute_extrapolation_factor(sample);
        sample
            .sampled_materials
            .iter()
            .map(|material| {
                let classification = table.classify(material.label());
                let destination = if classification.divertible {
                    classification
                        .destination
                        .unwrap_or(material.disposition_class())
                } else {
                    DispositionClass::Landfill
                };
                Ok(ExtrapolatedRecord {
                    record: material.scaled(factor)?,
                    sampled_kilograms: material.kilograms(),
                    divertible: classification.divertible,
                    classified: table.is_known(material.label()),
                    destination,
                })
            })
            .collect()
    }

    /// Sum extrapolated weights by where they are counted
    #[must_use]
    pub fn breakdown_of(extrapolated: &[ExtrapolatedRecord]) -> Breakdown {
        let mut breakdown = Breakdown::default();
        for item in extrapolated {
            breakdown.add_to(item.destination, item.record.kilograms());
        }
        breakdown
    }

    /// Diversion of an extrapolated population.
    ///
    /// # Errors
    /// [`MetricsError::InvalidInput`] if the summed weights are not finite.
    pub fn diversion(
        &self,
        extrapolated: &[ExtrapolatedRecord],
    ) -> Result<DiversionResult, MetricsError> {
        self.calculator.from_totals(Self::breakdown_of(extrapolated))
    }

    /// Factor, adequacy, extrapolation, diversion and warnings in one pass.
    ///
    /// # Errors
    /// [`MetricsError::InvalidInput`] if a scaled weight overflows.
    pub fn analyze(
        &self,
        sample: &AuditSample,
        table: &MaterialTable,
    ) -> Result<AuditReport, MetricsError> {
        let factor = compute_extrapolation_factor(sample);
        let sample_adequate = self.is_sample_adequate(sample);
        let extrapolated = self.extrapolate(sample, table)?;
        let diversion = self.diversion(&extrapolated)?;
        let warnings = self.collect_warnings(sample, sample_adequate, &extrapolated);

        if sample_adequate {
            debug!(
                factor,
                materials = extrapolated.len(),
                rate_percent = diversion.diversion_rate_percent,
                "audit sample extrapolated"
            );
        } else {
            warn!(
                factor,
                remaining_kg = sample.remaining_weight_after_quartering,
                "audit sample below adequacy thresholds"
            );
        }

        Ok(AuditReport {
            factor,
            sample_adequate,
            extrapolated,
            diversion,
            warnings,
        })
    }

    fn collect_warnings(
        &self,
        sample: &AuditSample,
        sample_adequate: bool,
        extrapolated: &[ExtrapolatedRecord],
    ) -> Vec<AuditWarning> {
        let mut warnings = Vec::new();
        let total = sample.total_weight_before_quartering;
        let remaining = sample.remaining_weight_after_quartering;

        if total < remaining {
            warnings.push(AuditWarning::TotalBelowSample { total, remaining });
        }
        if remaining == 0.0 {
            warnings.push(AuditWarning::ZeroSampleWeight);
        }
        if !sample_adequate {
            warnings.push(AuditWarning::InadequateSample {
                remaining,
                min_sample_kg: self.rule.min_sample_kg,
                min_sample_fraction: self.rule.min_sample_fraction,
            });
        }
        let sampled = sample.sampled_total();
        if remaining > 0.0 && sampled > remaining {
            warnings.push(AuditWarning::SampledExceedsRemaining { sampled, remaining });
        }
        for item in extrapolated {
            if !item.classified {
                warnings.push(AuditWarning::UnclassifiedMaterial {
                    label: item.record.label().to_string(),
                });
            } else if item.divertible && item.destination == DispositionClass::Landfill {
                warnings.push(AuditWarning::DivertibleRoutedToLandfill {
                    label: item.record.label().to_string(),
                });
            }
        }
        warnings
    }
}
