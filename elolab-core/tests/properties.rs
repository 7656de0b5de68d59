use approx::assert_relative_eq;
use proptest::prelude::*;

use elolab_core::constants::{FLOOR_MINUTES, LANDMARK_POOL};
use elolab_core::{
    build_schedule, clamp_minutes, expand_grid, run_sweep_sequential, timeout_rate, AbsoluteModel, ArchetypeProfile,
    ArchetypeTable, DrawPlan, PerformanceModel, RawDraws, RunConfig, SweepParameter, TimedElo, TimingTag,
};

fn absolute_config() -> RunConfig {
    RunConfig {
        id: "base".into(),
        time_limit: 10.0,
        initial_uncertainty: 0.5,
        test_mode: true,
        model: PerformanceModel::Absolute(AbsoluteModel::default()),
        fresh_seed: 0,
    }
}

proptest! {
    #[test]
    fn minutes_never_fall_below_floor(
        mean in 0.01f64..60.0,
        dispersion in 0.0f64..20.0,
        z in -10.0f64..10.0,
        u in 0.0f64..1.0,
        limit in 0.0f64..60.0,
    ) {
        let profile = ArchetypeProfile::new("P", 0.5, mean, dispersion);
        let perf = AbsoluteModel::default().sample(&profile, limit, z, u);
        prop_assert!(perf.minutes_used >= FLOOR_MINUTES);
        prop_assert!(clamp_minutes(mean + z * dispersion, FLOOR_MINUTES) >= FLOOR_MINUTES);
    }

    #[test]
    fn same_draws_give_same_minutes_at_any_limit(
        z in -5.0f64..5.0,
        u in 0.0f64..1.0,
        a in 0.0f64..60.0,
        b in 0.0f64..60.0,
    ) {
        let profile = ArchetypeProfile::new("Average", 0.65, 9.0, 2.0);
        let model = AbsoluteModel::default();
        let pa = model.sample(&profile, a, z, u);
        let pb = model.sample(&profile, b, z, u);
        prop_assert_eq!(pa.minutes_used, pb.minutes_used);
        // Correctness only differs when exactly one of the limits was exceeded
        if pa.tag == pb.tag {
            prop_assert_eq!(pa.correct, pb.correct);
        }
        if pa.tag == TimingTag::Timeout {
            prop_assert!(!pa.correct);
        }
    }

    #[test]
    fn timeout_rate_is_monotone_in_limit(
        seed in any::<u64>(),
        mut limits in prop::collection::vec(0.5f64..40.0, 2..5),
    ) {
        limits.sort_by(|a, b| a.partial_cmp(b).unwrap());
        let table = ArchetypeTable::absolute_default().unwrap();
        let schedule = build_schedule(seed, 40, &table, &LANDMARK_POOL, DrawPlan::Standardized).unwrap();
        let configs = expand_grid(&absolute_config(), SweepParameter::TimeLimit, &limits);
        let outcomes = run_sweep_sequential(&configs, &schedule, TimedElo::for_population).unwrap();

        for pair in outcomes.windows(2) {
            for i in 0..table.len() {
                prop_assert!(pair[0].counts.timeouts[i] >= pair[1].counts.timeouts[i]);
                prop_assert_eq!(pair[0].counts.visits[i], pair[1].counts.visits[i]);
            }
        }
    }

    #[test]
    fn schedules_are_reproducible(seed in any::<u64>(), rounds in 1usize..80) {
        let table = ArchetypeTable::absolute_default().unwrap();
        let a = build_schedule(seed, rounds, &table, &LANDMARK_POOL, DrawPlan::Standardized).unwrap();
        let b = build_schedule(seed, rounds, &table, &LANDMARK_POOL, DrawPlan::Standardized).unwrap();
        prop_assert_eq!(a.entries(), b.entries());
        prop_assert_eq!(a.len(), rounds);
        for entry in a.entries() {
            match entry.draws {
                RawDraws::Standardized { u, .. } => prop_assert!((0.0..1.0).contains(&u)),
                other => prop_assert!(false, "unexpected draws {:?}", other),
            }
        }
    }

    #[test]
    fn rate_stays_in_unit_interval(visits in 0usize..1000, frac in 0.0f64..=1.0) {
        let timeouts = (visits as f64 * frac).floor() as usize;
        let rate = timeout_rate(visits, timeouts);
        prop_assert!((0.0..=1.0).contains(&rate));
    }
}

#[test]
fn answer_score_halves_at_the_limit() {
    assert_relative_eq!(TimedElo::answer_score(10.0, 10.0, true), 0.5);
    assert_relative_eq!(TimedElo::answer_score(2.5, 10.0, true), 0.875);
    assert_relative_eq!(TimedElo::answer_score(3.0, 10.0, false), 0.0);
}

#[test]
fn expected_score_is_logistic() {
    let engine = TimedElo::default();
    assert_relative_eq!(engine.expected_score(0.0, 0.0), 0.5);
    assert_relative_eq!(engine.expected_score(1.0, 0.0), 0.731_058_578_630_004_9, epsilon = 1e-12);
    assert_relative_eq!(
        engine.expected_score(0.7, -0.2) + engine.expected_score(-0.2, 0.7),
        1.0,
        epsilon = 1e-12
    );
}

#[test]
fn relative_means_scale_with_limit() {
    let table = ArchetypeTable::relative_default(20.0).unwrap();
    let means: Vec<f64> = table.profiles().iter().map(|p| p.mean_time).collect();
    assert_relative_eq!(means[0], 18.0, epsilon = 1e-9);
    assert_relative_eq!(means[1], 14.0, epsilon = 1e-9);
    assert_relative_eq!(means[2], 10.0, epsilon = 1e-9);
    assert_relative_eq!(table.profiles()[0].dispersion, 2.0, epsilon = 1e-9);
}
