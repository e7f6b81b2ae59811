mod common;

use common::synthetic_data::{perturb, sample_function};
use fuzzy_ident::{BuildState, BuilderParams, SugenoBuilder};

#[test]
fn sinc_identification_reduces_error() {
    let points = sample_function(|x| x.sin() / x, -10.0, 10.0, 0.1);
    assert_eq!(points.len(), 199); // x = 0 is dropped

    let mut builder = SugenoBuilder::new(BuilderParams::default());
    builder.set_data_from_points(&points);
    let baseline = builder.sum_squared_error();
    assert!(baseline > 0.0);

    builder.build_all();

    assert_eq!(builder.state(), BuildState::Converged);
    assert!(builder.steps_done() <= 100, "steps={}", builder.steps_done());
    assert!(builder.controller().rules_count() >= 1);
    assert_eq!(
        builder.controller().rules_count(),
        builder.memberships().len()
    );

    let sse = builder.sum_squared_error();
    assert!(
        sse < 0.5 * baseline,
        "sse={sse} did not materially improve on baseline={baseline}"
    );
}

#[test]
fn noisy_line_is_identified() {
    let clean = sample_function(|x| 0.5 * x - 1.0, -5.0, 5.0, 0.25);
    let points = perturb(&clean, 0.02);

    let mut builder = SugenoBuilder::new(BuilderParams::default());
    builder.set_data_from_points(&points);
    builder.build_all();

    assert!(builder.controller().rules_count() >= 1);
    // The identified controller tracks the generating line away from the
    // domain edges.
    let cntl = builder.controller_mut();
    for i in -8..=8 {
        let x = 0.5 * i as f64;
        let y = cntl.evaluate(x);
        assert!(cntl.is_last_result_valid());
        let want = 0.5 * x - 1.0;
        assert!((y - want).abs() < 0.5, "x={x} y={y} want={want}");
    }
}

#[test]
fn removal_is_monotone_and_bounded() {
    let points = sample_function(|x| x.sin() / x, -10.0, 10.0, 0.1);
    let mut builder = SugenoBuilder::new(BuilderParams::default());
    builder.set_data_from_points(&points);
    let total = builder.samples().len();

    let mut prev_removed = 0usize;
    let mut steps = 0usize;
    while builder.build_step() {
        steps += 1;
        assert!(steps <= total, "induction failed to terminate");
        let removed = builder.removed_points().len();
        assert!(removed >= prev_removed, "removed count decreased");
        assert!(removed <= total);
        prev_removed = removed;
    }
    builder.build_controller();
    assert_eq!(
        builder.controller().rules_count(),
        builder.memberships().len()
    );
}

#[test]
fn step_and_all_agree_on_rule_count() {
    let points = sample_function(|x| x.sin(), -6.0, 6.0, 0.1);

    let mut stepped = SugenoBuilder::new(BuilderParams::default());
    stepped.set_data_from_points(&points);
    while stepped.steps_done() < 100 && stepped.build_step() {}
    stepped.build_controller();

    let mut all_at_once = SugenoBuilder::new(BuilderParams::default());
    all_at_once.set_data_from_points(&points);
    all_at_once.build_all();

    assert_eq!(
        stepped.controller().rules_count(),
        all_at_once.controller().rules_count()
    );
    assert_eq!(stepped.steps_done(), all_at_once.steps_done());
}
