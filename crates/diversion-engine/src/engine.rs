//! Diversion Engine
//!
//! The in-process API used by request handlers. Each call is a pure
//! function of its arguments and the engine's immutable configuration, so
//! one engine can be shared across threads without locking.

use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::period::{first_overlap, ReportingPeriod};
use diversion_flow::{FlowGraph, FlowGraphBuilder, FlowGraphValidator, ValidationReport};
use diversion_metrics::{
    AuditExtrapolator, AuditReport, AuditSample, Breakdown, DiversionCalculator, DiversionResult,
    ExtrapolatedRecord,
};
use diversion_model::{LabelConfig, MaterialTable, RecordsByClass};
use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, instrument, warn};

/// What a diversion rate can be computed from
#[derive(Debug, Clone, Copy)]
pub enum DiversionInput<'a> {
    /// Four class totals
    Breakdown(Breakdown),
    /// Mass entering the destination nodes of a graph
    Graph(&'a FlowGraph),
    /// Record totals, without building a graph
    Records(&'a RecordsByClass),
}

impl From<Breakdown> for DiversionInput<'_> {
    fn from(breakdown: Breakdown) -> Self {
        Self::Breakdown(breakdown)
    }
}

impl<'a> From<&'a FlowGraph> for DiversionInput<'a> {
    fn from(graph: &'a FlowGraph) -> Self {
        Self::Graph(graph)
    }
}

impl<'a> From<&'a RecordsByClass> for DiversionInput<'a> {
    fn from(records: &'a RecordsByClass) -> Self {
        Self::Records(records)
    }
}

/// Everything derived from one reporting period
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeriodReport {
    /// Period the records belong to
    pub period: ReportingPeriod,
    /// Flow graph of the period's records
    pub graph: FlowGraph,
    /// Validation of that graph
    pub validation: ValidationReport,
    /// Diversion read from that graph
    pub diversion: DiversionResult,
    /// Informational certification flag
    pub certified: bool,
}

/// Per-period reports plus their merge
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeriodSummary {
    /// One report per input period, in input order
    pub periods: Vec<PeriodReport>,
    /// Merge of every period, derived from summed totals
    pub combined: DiversionResult,
    /// Certification flag for the merged result
    pub certified: bool,
}

impl PeriodSummary {
    /// Reports whose graph failed validation
    pub fn invalid_periods(&self) -> impl Iterator<Item = &PeriodReport> + '_ {
        self.periods.iter().filter(|report| !report.validation.is_valid)
    }
}

/// Waste diversion analytics facade
#[derive(Debug, Clone)]
pub struct DiversionEngine {
    config: EngineConfig,
    builder: FlowGraphBuilder,
    validator: FlowGraphValidator,
    calculator: DiversionCalculator,
    extrapolator: AuditExtrapolator,
}

impl Default for DiversionEngine {
    fn default() -> Self {
        Self::assemble(EngineConfig::default())
    }
}

impl DiversionEngine {
    /// Engine over a validated configuration.
    ///
    /// # Errors
    /// [`EngineError::Config`] if the configuration is out of range.
    pub fn new(config: EngineConfig) -> Result<Self, EngineError> {
        config.validate()?;
        Ok(Self::assemble(config))
    }

    fn assemble(config: EngineConfig) -> Self {
        let builder = FlowGraphBuilder::new(config.labels.clone())
            .with_material_breakdown(config.include_material_breakdown);
        let validator = FlowGraphValidator::with_context(config.validation_context());
        let calculator = DiversionCalculator::with_policy(config.rate_policy());
        let extrapolator = AuditExtrapolator::new()
            .with_rule(config.sample_adequacy)
            .with_calculator(calculator);
        Self {
            config,
            builder,
            validator,
            calculator,
            extrapolator,
        }
    }

    /// Active configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Flow graph using the configured labels
    #[instrument(skip_all, fields(records = records.len()))]
    pub fn build_flow_graph(&self, records: &RecordsByClass) -> FlowGraph {
        self.builder.build(records)
    }

    /// Flow graph using caller-supplied labels
    #[instrument(skip_all, fields(records = records.len()))]
    pub fn build_flow_graph_with_labels(
        &self,
        records: &RecordsByClass,
        labels: &LabelConfig,
    ) -> FlowGraph {
        FlowGraphBuilder::new(labels.clone())
            .with_material_breakdown(self.config.include_material_breakdown)
            .build(records)
    }

    /// Structural and mass-balance report; never fails
    #[instrument(skip_all, fields(nodes = graph.nodes().len(), edges = graph.edges().len()))]
    pub fn validate_flow_graph(&self, graph: &FlowGraph) -> ValidationReport {
        self.validator.validate(graph)
    }

    /// Diversion from a breakdown, a graph or a record set.
    ///
    /// # Errors
    /// [`EngineError::Metrics`] for negative or non-finite input, or a
    /// graph destination without a disposition class.
    #[instrument(skip_all)]
    pub fn compute_diversion<'a>(
        &self,
        input: impl Into<DiversionInput<'a>>,
    ) -> Result<DiversionResult, EngineError> {
        let result = match input.into() {
            DiversionInput::Breakdown(breakdown) => self.calculator.from_totals(breakdown)?,
            DiversionInput::Graph(graph) => self.calculator.from_graph(graph)?,
            DiversionInput::Records(records) => self.calculator.from_records(records)?,
        };
        Ok(result)
    }

    /// Informational certification flag under the configured threshold
    #[must_use]
    pub fn is_certified(&self, result: &DiversionResult) -> bool {
        self.calculator.is_certified(result)
    }

    /// Merge results from separate periods by summing their totals
    pub fn combine<'a, I>(&self, results: I) -> DiversionResult
    where
        I: IntoIterator<Item = &'a DiversionResult>,
    {
        self.calculator.combine(results)
    }

    /// Scale a quartering sample to the whole pile using `table`.
    ///
    /// # Errors
    /// [`EngineError::Metrics`] if a scaled weight overflows.
    #[instrument(skip_all, fields(materials = sample.sampled_materials().len()))]
    pub fn extrapolate_audit(
        &self,
        sample: &AuditSample,
        table: &MaterialTable,
    ) -> Result<Vec<ExtrapolatedRecord>, EngineError> {
        Ok(self.extrapolator.extrapolate(sample, table)?)
    }

    /// Full audit analysis against the configured material table.
    ///
    /// # Errors
    /// [`EngineError::Metrics`] if a scaled weight overflows.
    #[instrument(skip_all, fields(materials = sample.sampled_materials().len()))]
    pub fn analyze_audit(&self, sample: &AuditSample) -> Result<AuditReport, EngineError> {
        Ok(self.extrapolator.analyze(sample, &self.config.materials)?)
    }

    /// Graph, validation and diversion for one period.
    ///
    /// # Errors
    /// [`EngineError::Metrics`] if the graph's destinations cannot be read.
    pub fn analyze_period(
        &self,
        period: ReportingPeriod,
        records: &RecordsByClass,
    ) -> Result<PeriodReport, EngineError> {
        let graph = self.builder.build(records);
        let validation = self.validator.validate(&graph);
        let diversion = self.calculator.from_graph(&graph)?;
        let certified = self.calculator.is_certified(&diversion);
        debug!(
            %period,
            rate_percent = diversion.diversion_rate_percent,
            valid = validation.is_valid,
            "period analyzed"
        );
        Ok(PeriodReport {
            period,
            graph,
            validation,
            diversion,
            certified,
        })
    }

    /// Analyze independent periods in parallel and merge them.
    ///
    /// Reports come back in input order. The combined result is derived
    /// from summed totals; overlapping periods are logged but still summed.
    ///
    /// # Errors
    /// The first [`EngineError`] raised by any period.
    #[instrument(skip_all, fields(periods = periods.len()))]
    pub fn summarize_periods(
        &self,
        periods: &[(ReportingPeriod, RecordsByClass)],
    ) -> Result<PeriodSummary, EngineError> {
        let labels: Vec<ReportingPeriod> = periods.iter().map(|(period, _)| *period).collect();
        if let Some((first, second)) = first_overlap(&labels) {
            warn!(%first, %second, "reporting periods overlap; shared mass is counted twice");
        }

        let reports = periods
            .par_iter()
            .map(|(period, records)| self.analyze_period(*period, records))
            .collect::<Result<Vec<_>, _>>()?;

        let combined = self
            .calculator
            .combine(reports.iter().map(|report| &report.diversion));
        let certified = self.calculator.is_certified(&combined);
        debug!(
            periods = reports.len(),
            rate_percent = combined.diversion_rate_percent,
            "periods summarized"
        );
        Ok(PeriodSummary {
            periods: reports,
            combined,
            certified,
        })
    }
}
