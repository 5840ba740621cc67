// Property-based tests for the link-budget equations.
// CI: 256 cases (default). Soak: PROPTEST_CASES=10000 cargo test --release

use fibernet_engine::*;
use proptest::prelude::*;

fn config_256() -> ProptestConfig {
    ProptestConfig {
        cases: std::env::var("PROPTEST_CASES")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(256),
        failure_persistence: None,
        ..ProptestConfig::default()
    }
}

// ---------------------------------------------------------------------------
// Generators (inside the validated parameter ranges)
// ---------------------------------------------------------------------------

fn arb_optical() -> impl Strategy<Value = OpticalParameters> {
    (-10.0f64..=10.0, -40.0f64..=-10.0).prop_map(|(tx, rx)| OpticalParameters::new(tx, rx))
}

fn arb_loss() -> impl Strategy<Value = LossParameters> {
    (0.01f64..1.0, 0.0f64..0.5, 0.0f64..1.5, 0.0f64..6.0).prop_map(|(f, s, c, m)| LossParameters {
        fiber_loss_per_km: f,
        splice_loss: s,
        connector_loss: c,
        safety_margin: m,
    })
}

fn arb_segment() -> impl Strategy<Value = NetworkSegment> {
    (0.0f64..120.0, 0u32..40, 0u32..8)
        .prop_map(|(km, s, c)| NetworkSegment::new("seg", km, s, c))
}

proptest! {
    #![proptest_config(config_256())]

    #[test]
    fn loss_and_margin_follow_equations(
        optical in arb_optical(),
        loss in arb_loss(),
        segment in arb_segment(),
    ) {
        let r = compute(&optical, &loss, &segment);
        let expected_loss = segment.fiber_length_km * loss.fiber_loss_per_km
            + f64::from(segment.splice_count) * loss.splice_loss
            + f64::from(segment.connector_count) * loss.connector_loss;

        prop_assert!((r.total_loss - expected_loss).abs() < 1e-9);
        prop_assert!((r.available_margin - (r.power_budget - r.total_loss - loss.safety_margin)).abs() < 1e-9);
        prop_assert_eq!(r.status, LinkStatus::from_margin(r.available_margin));
    }

    #[test]
    fn quality_score_bounded(
        budget in -20.0f64..60.0,
        total_loss in 0.0f64..80.0,
        margin in -50.0f64..50.0,
    ) {
        let q = quality_score(budget, total_loss, margin);
        prop_assert!((0.0..=100.0).contains(&q), "score {} out of range", q);
    }

    #[test]
    fn quality_score_monotonic_in_margin(
        budget in 0.1f64..60.0,
        total_loss in 0.0f64..80.0,
        lo in -30.0f64..30.0,
        step in 0.0f64..30.0,
    ) {
        let a = quality_score(budget, total_loss, lo);
        let b = quality_score(budget, total_loss, lo + step);
        prop_assert!(b >= a, "score dropped from {} to {} as margin grew", a, b);
    }

    #[test]
    fn max_distance_leaves_zero_margin(
        optical in arb_optical(),
        loss in arb_loss(),
        splices in 0u32..20,
        connectors in 0u32..6,
    ) {
        let km = max_distance(&optical, &loss, splices, connectors);
        prop_assert!(km >= 0.0);

        let r = compute(&optical, &loss, &NetworkSegment::new("max", km, splices, connectors));
        if km > 0.0 {
            prop_assert!(r.available_margin.abs() < 1e-6, "margin {} at max distance", r.available_margin);
        } else {
            prop_assert!(r.available_margin <= 1e-9);
        }
    }

    #[test]
    fn required_tx_power_is_inverse(
        rx in -40.0f64..=-10.0,
        loss in arb_loss(),
        segment in arb_segment(),
    ) {
        let tx = required_tx_power(rx, &segment, &loss);
        let r = compute(&OpticalParameters::new(tx, rx), &loss, &segment);
        prop_assert!(r.available_margin.abs() < 1e-9);
    }
}
