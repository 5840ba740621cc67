// Per-cable link budgets for a parsed network

use fibernet_core::{Cable, NetworkSnapshot};
use serde::{Deserialize, Serialize};

use crate::budget::{compute, CalculationResult, LossBreakdown};
use crate::params::{LossParameters, NetworkSegment, OpticalParameters};

/// Turns a cable into a budget segment when the design carries no
/// splice or connector counts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SegmentEstimator {
    /// One splice per this many meters of cable.
    pub splice_spacing_m: f64,
    pub min_splices: u32,
    pub connectors_per_cable: u32,
}

impl Default for SegmentEstimator {
    fn default() -> Self {
        Self {
            splice_spacing_m: 2000.0,
            min_splices: 2,
            connectors_per_cable: 2,
        }
    }
}

impl SegmentEstimator {
    pub fn segment_for(&self, cable: &Cable) -> NetworkSegment {
        let length_m = cable.fiber_length.max(0.0);
        let by_length = if self.splice_spacing_m > 0.0 && length_m.is_finite() {
            // Saturating float-to-int cast.
            (length_m / self.splice_spacing_m).floor() as u32
        } else {
            0
        };

        NetworkSegment::new(
            cable.name.clone(),
            length_m / 1000.0,
            by_length.max(self.min_splices),
            self.connectors_per_cable,
        )
    }

    /// Total attenuation the plan implies for `cable`.
    pub fn estimated_loss_db(&self, cable: &Cable, loss: &LossParameters) -> f64 {
        LossBreakdown::for_segment(&self.segment_for(cable), loss).total_loss_db
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CableBudget {
    pub cable_name: String,
    pub segment: NetworkSegment,
    pub result: CalculationResult,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NetworkBudgetReport {
    pub results: Vec<CableBudget>,
    pub total_segments: usize,
    /// 0 for a network without cables.
    pub average_quality_score: f64,
    pub total_network_loss_db: f64,
}

/// Link budget for every cable in `snapshot`, in document order.
pub fn analyze_network(
    snapshot: &NetworkSnapshot,
    optical: &OpticalParameters,
    loss: &LossParameters,
    estimator: &SegmentEstimator,
) -> NetworkBudgetReport {
    let results: Vec<CableBudget> = snapshot
        .cables
        .iter()
        .map(|cable| {
            let segment = estimator.segment_for(cable);
            let result = compute(optical, loss, &segment);
            CableBudget {
                cable_name: cable.name.clone(),
                segment,
                result,
            }
        })
        .collect();

    let total_segments = results.len();
    let average_quality_score = if total_segments == 0 {
        0.0
    } else {
        results.iter().map(|r| r.result.quality_score).sum::<f64>() / total_segments as f64
    };
    let total_network_loss_db = results.iter().map(|r| r.result.total_loss).sum();

    log::info!(
        "analyzed {} cable(s), average quality {:.1}, total loss {:.2} dB",
        total_segments,
        average_quality_score,
        total_network_loss_db
    );

    NetworkBudgetReport {
        results,
        total_segments,
        average_quality_score,
        total_network_loss_db,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fibernet_core::Coordinate;

    fn cable(name: &str, length_m: f64) -> Cable {
        Cable {
            name: name.into(),
            specification: "ADSS 24C".into(),
            number_of_cores: 24,
            fiber_length: length_m,
            construction_status: "Planned".into(),
            path: vec![Coordinate::new(106.8, -6.2, 0.0), Coordinate::new(106.81, -6.21, 0.0)],
        }
    }

    #[test]
    fn short_cable_gets_minimum_splices() {
        let seg = SegmentEstimator::default().segment_for(&cable("C1", 850.0));
        assert_eq!(seg.name, "C1");
        assert_eq!(seg.splice_count, 2);
        assert_eq!(seg.connector_count, 2);
        assert!((seg.fiber_length_km - 0.85).abs() < 1e-12);
    }

    #[test]
    fn long_cable_splices_by_spacing() {
        let seg = SegmentEstimator::default().segment_for(&cable("C2", 9_500.0));
        assert_eq!(seg.splice_count, 4);
    }

    #[test]
    fn zero_spacing_falls_back_to_minimum() {
        let est = SegmentEstimator { splice_spacing_m: 0.0, ..SegmentEstimator::default() };
        assert_eq!(est.segment_for(&cable("C3", 5_000.0)).splice_count, 2);
    }

    #[test]
    fn estimated_loss() {
        let loss = LossParameters { connector_loss: 0.25, ..LossParameters::default() };
        // 4 km * 0.35 + 2 * 0.1 + 2 * 0.25
        let db = SegmentEstimator::default().estimated_loss_db(&cable("C4", 4_000.0), &loss);
        assert!((db - 2.1).abs() < 1e-9);
    }

    #[test]
    fn report_aggregates() {
        let snapshot = NetworkSnapshot {
            cables: vec![cable("A", 1_000.0), cable("B", 3_000.0)],
            ..NetworkSnapshot::default()
        };
        let loss = LossParameters::default();
        let report = analyze_network(&snapshot, &OpticalParameters::default(), &loss, &SegmentEstimator::default());

        assert_eq!(report.total_segments, 2);
        assert_eq!(report.results[0].cable_name, "A");
        assert_eq!(report.results[1].segment.splice_count, 2);
        let expected_total = (0.35 + 0.2 + 1.0) + (1.05 + 0.2 + 1.0);
        assert!((report.total_network_loss_db - expected_total).abs() < 1e-9);
        let avg = (report.results[0].result.quality_score + report.results[1].result.quality_score) / 2.0;
        assert!((report.average_quality_score - avg).abs() < 1e-12);
    }

    #[test]
    fn empty_network() {
        let report = analyze_network(
            &NetworkSnapshot::default(),
            &OpticalParameters::default(),
            &LossParameters::default(),
            &SegmentEstimator::default(),
        );
        assert_eq!(report.total_segments, 0);
        assert_eq!(report.average_quality_score, 0.0);
        assert_eq!(report.total_network_loss_db, 0.0);
    }
}
