use diversion_flow::FlowGraphBuilder;
use diversion_metrics::{
    AuditExtrapolator, AuditSample, Breakdown, DiversionCalculator, RatePolicy,
};
use diversion_model::{DispositionClass, MaterialTable};
use diversion_test_utils::{arb_kilograms, arb_records_by_class, office_month, record};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

fn arb_breakdown() -> impl Strategy<Value = Breakdown> {
    (arb_kilograms(), arb_kilograms(), arb_kilograms(), arb_kilograms())
        .prop_map(|(r, c, u, l)| Breakdown::new(r, c, u, l).unwrap())
}

fn exact() -> DiversionCalculator {
    DiversionCalculator::with_policy(RatePolicy {
        display_decimals: 12,
        ..RatePolicy::default()
    })
}

proptest! {
    #[test]
    fn prop_rate_is_a_percentage(b in arb_breakdown()) {
        let result = DiversionCalculator::new().from_totals(b).unwrap();
        prop_assert!((0.0..=100.0).contains(&result.diversion_rate_percent));
        prop_assert_eq!(result.total_generated, result.total_diverted + b.landfilled);
    }

    #[test]
    fn prop_more_diversion_never_lowers_the_rate(b in arb_breakdown(), extra in 1u32..4000) {
        let calc = exact();
        let before = calc.from_totals(b).unwrap();
        let mut more = b;
        more.recycled += f64::from(extra) * 0.25;
        let after = calc.from_totals(more).unwrap();
        prop_assert!(after.exact_rate_percent() >= before.exact_rate_percent());
    }

    #[test]
    fn prop_more_landfill_never_raises_the_rate(b in arb_breakdown(), extra in 1u32..4000) {
        let calc = exact();
        let before = calc.from_totals(b).unwrap();
        let mut more = b;
        more.landfilled += f64::from(extra) * 0.25;
        let after = calc.from_totals(more).unwrap();
        prop_assert!(after.exact_rate_percent() <= before.exact_rate_percent());
    }

    #[test]
    fn prop_combine_equals_summed_breakdowns(parts in prop::collection::vec(arb_breakdown(), 1..8)) {
        let calc = DiversionCalculator::new();
        let results: Vec<_> = parts.iter().map(|b| calc.from_totals(*b).unwrap()).collect();
        let combined = calc.combine(&results);
        let summed = calc.from_totals(parts.iter().sum()).unwrap();
        prop_assert_eq!(combined, summed);
    }

    #[test]
    fn prop_graph_and_records_agree(records in arb_records_by_class()) {
        let calc = DiversionCalculator::new();
        let graph = FlowGraphBuilder::default().build(&records);
        prop_assert_eq!(calc.from_graph(&graph).unwrap(), calc.from_records(&records).unwrap());
    }
}

/// Two periods of very different mass: the merged rate follows the mass.
#[test]
fn combining_periods_weights_by_mass() {
    let calc = DiversionCalculator::new();
    let small = calc.from_breakdown(9.0, 0.0, 0.0, 1.0).unwrap();
    let large = calc.from_breakdown(100.0, 0.0, 0.0, 900.0).unwrap();

    let merged = calc.combine([&small, &large]);

    assert_eq!(small.diversion_rate_percent, 90.0);
    assert_eq!(large.diversion_rate_percent, 10.0);
    assert_eq!(merged.total_generated, 1010.0);
    assert_eq!(merged.diversion_rate_percent, 10.79);
}

#[test]
fn office_month_rate() {
    let result = DiversionCalculator::new().from_records(&office_month()).unwrap();

    assert_eq!(result.total_generated, 1221.0);
    assert_eq!(result.breakdown.recycled, 730.75);
    assert_eq!(result.total_diverted, 1100.5);
    assert_eq!(result.diversion_rate_percent, 90.13);
    assert!(DiversionCalculator::new().is_certified(&result));
}

/// Audit scenario: 200 kg pile, 50 kg remaining, paper 10 and mixed 15.
#[test]
fn audit_extrapolates_to_the_whole_pile() {
    let sample = AuditSample::new(
        200.0,
        50.0,
        vec![
            record("paper", 10.0, DispositionClass::Recycling),
            record("mixed", 15.0, DispositionClass::Landfill),
        ],
    )
    .unwrap();

    let report = AuditExtrapolator::new()
        .analyze(&sample, &MaterialTable::municipal_default())
        .unwrap();

    assert_eq!(report.factor, 4.0);
    assert!(report.sample_adequate);
    assert!(report.warnings.is_empty());
    let weights: Vec<f64> = report
        .extrapolated
        .iter()
        .map(|e| e.record.kilograms())
        .collect();
    assert_eq!(weights, vec![40.0, 60.0]);
    assert_eq!(report.diversion.diversion_rate_percent, 40.0);
}

#[test]
fn audit_report_serializes_warnings_by_kind() {
    let sample = AuditSample::new(300.0, 20.0, vec![]).unwrap();
    let report = AuditExtrapolator::new()
        .analyze(&sample, &MaterialTable::new())
        .unwrap();
    let json = serde_json::to_value(&report).unwrap();

    assert_eq!(json["sample_adequate"], false);
    assert_eq!(json["warnings"][0]["kind"], "inadequate_sample");
}
