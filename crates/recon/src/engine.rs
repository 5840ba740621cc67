use fibernet_core::{Cable, NetworkSnapshot, OpmMeasurement};

use crate::classify::{classify_matched, classify_not_built, classify_unplanned};
use crate::config::ToleranceConfig;
use crate::evidence::{compute_summary, discrepancies, recommendations};
use crate::matcher::{index_measurements, match_by_name, CableMatch};
use crate::model::{CableRecord, ComparisonMeta, ComparisonResult, NetworkComparison};

/// Reconcile planned against built cables.
///
/// Measurements attach to cables by `cable_id == name`. Comparisons come back
/// with planned cables first (document order), then unplanned ones.
pub fn compare(
    planned: &[CableRecord],
    built: &[CableRecord],
    measurements: Option<&[OpmMeasurement]>,
    tolerance: &ToleranceConfig,
) -> NetworkComparison {
    let opm = index_measurements(measurements.unwrap_or(&[]));

    let comparisons: Vec<ComparisonResult> = match_by_name(planned, built)
        .into_iter()
        .map(|m| match m {
            CableMatch::Matched { planned, built } => {
                classify_matched(planned, built, opm.get(planned.name.as_str()).copied(), tolerance)
            }
            CableMatch::PlannedOnly(planned) => classify_not_built(planned),
            CableMatch::BuiltOnly(built) => {
                classify_unplanned(built, opm.get(built.name.as_str()).copied())
            }
        })
        .collect();

    let summary = compute_summary(&comparisons);
    let discrepancies = discrepancies(&comparisons);
    let recommendations = recommendations(&summary, tolerance);

    log::info!(
        "compared {} cable(s): {} compliant, {} minor, {} major",
        summary.total_cables,
        summary.compliant,
        summary.minor_deviations,
        summary.major_deviations
    );

    NetworkComparison {
        meta: ComparisonMeta {
            engine_version: env!("CARGO_PKG_VERSION").to_string(),
            tolerance: *tolerance,
            measurements_supplied: measurements.is_some(),
        },
        comparisons,
        summary,
        discrepancies,
        recommendations,
    }
}

/// `compare` over two parsed documents.
///
/// `planned_loss` gives the attenuation the design predicts for a planned
/// cable. Cables it returns `None` for skip the loss check.
pub fn compare_snapshots<F>(
    planned: &NetworkSnapshot,
    built: &NetworkSnapshot,
    measurements: Option<&[OpmMeasurement]>,
    tolerance: &ToleranceConfig,
    planned_loss: F,
) -> NetworkComparison
where
    F: Fn(&Cable) -> Option<f64>,
{
    let planned: Vec<CableRecord> = planned
        .cables
        .iter()
        .map(|cable| {
            let record = CableRecord::from_cable(cable);
            match planned_loss(cable) {
                Some(db) => record.with_planned_loss(db),
                None => record,
            }
        })
        .collect();
    compare(&planned, &CableRecord::from_snapshot(built), measurements, tolerance)
}
