// Property-based tests for plan-vs-built reconciliation.
// CI: 256 cases (default). Soak: PROPTEST_CASES=10000 cargo test --release

use std::collections::{BTreeSet, HashMap};

use fibernet_recon::model::{ComplianceStatus, Presence};
use fibernet_recon::{compare, CableRecord, ToleranceConfig};
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
// Generators
// ---------------------------------------------------------------------------

/// Small name pool so plan and build overlap often; duplicates allowed.
fn arb_records(max: usize) -> impl Strategy<Value = Vec<CableRecord>> {
    prop::collection::vec(
        (0u8..12, 0.0f64..20.0, prop::sample::select(vec!["Planned", "In Service", "in service"])),
        0..max,
    )
    .prop_map(|rows| {
        rows.into_iter()
            .map(|(id, km, status)| CableRecord {
                name: format!("C{id}"),
                fiber_length_km: km,
                construction_status: status.to_string(),
                specification: "ADSS".to_string(),
                planned_loss_db: None,
            })
            .collect()
    })
}

proptest! {
    #![proptest_config(config_256())]

    #[test]
    fn every_name_appears_exactly_once(
        planned in arb_records(16),
        built in arb_records(16),
    ) {
        let out = compare(&planned, &built, None, &ToleranceConfig::default());

        let mut seen: HashMap<&str, usize> = HashMap::new();
        for c in &out.comparisons {
            *seen.entry(c.cable_id.as_str()).or_insert(0) += 1;
        }
        let expected: BTreeSet<&str> = planned
            .iter()
            .chain(built.iter())
            .map(|r| r.name.as_str())
            .collect();

        prop_assert_eq!(seen.len(), expected.len());
        for name in &expected {
            prop_assert_eq!(seen.get(name).copied(), Some(1), "cable {} not compared once", name);
        }
        prop_assert_eq!(out.summary.total_cables, out.comparisons.len());
    }

    #[test]
    fn presence_matches_sides(
        planned in arb_records(16),
        built in arb_records(16),
    ) {
        let out = compare(&planned, &built, None, &ToleranceConfig::default());
        for c in &out.comparisons {
            let in_plan = planned.iter().any(|r| r.name == c.cable_id);
            let in_build = built.iter().any(|r| r.name == c.cable_id);
            let expected = match (in_plan, in_build) {
                (true, true) => Presence::Both,
                (true, false) => Presence::PlannedOnly,
                _ => Presence::BuiltOnly,
            };
            prop_assert_eq!(c.presence, expected);
            if expected != Presence::Both {
                prop_assert_eq!(c.compliance_status, ComplianceStatus::MajorDeviation);
            }
        }
    }

    #[test]
    fn discrepancies_sorted_by_severity(
        planned in arb_records(16),
        built in arb_records(16),
    ) {
        let out = compare(&planned, &built, None, &ToleranceConfig::default());

        for pair in out.discrepancies.windows(2) {
            prop_assert!(pair[0].severity >= pair[1].severity,
                "{} ({}) listed before {} ({})",
                pair[0].cable_id, pair[0].severity, pair[1].cable_id, pair[1].severity);
        }

        let non_compliant = out
            .comparisons
            .iter()
            .filter(|c| c.compliance_status != ComplianceStatus::Compliant)
            .count();
        prop_assert_eq!(out.discrepancies.len(), non_compliant);
        prop_assert!(out.discrepancies.iter().all(|d| d.severity != ComplianceStatus::Compliant));
    }

    #[test]
    fn tier_counts_add_up(
        planned in arb_records(16),
        built in arb_records(16),
    ) {
        let s = compare(&planned, &built, None, &ToleranceConfig::default()).summary;
        prop_assert_eq!(s.compliant + s.minor_deviations + s.major_deviations, s.total_cables);
        prop_assert!((0.0..=100.0).contains(&s.compliance_rate));
    }
}
