use fibernet_core::OpmMeasurement;

use crate::config::ToleranceConfig;
use crate::model::{CableRecord, ComparisonResult, ComplianceStatus, Presence, NOT_BUILT, NOT_PLANNED};

/// Compare a cable present in both plan and build.
///
/// Length tier first; the loss check only runs for cables inside the
/// length band, and only when both a measurement and a planned loss exist.
/// A status mismatch adds a remark without changing the tier.
pub fn classify_matched(
    planned: &CableRecord,
    built: &CableRecord,
    measurement: Option<&OpmMeasurement>,
    tolerance: &ToleranceConfig,
) -> ComparisonResult {
    let length_variance_km = built.fiber_length_km - planned.fiber_length_km;
    let length_variance_pct = if planned.fiber_length_km > 0.0 {
        length_variance_km / planned.fiber_length_km * 100.0
    } else {
        0.0
    };

    let status_match =
        planned.construction_status.to_lowercase() == built.construction_status.to_lowercase();

    let measured_loss_db = measurement.map(|m| m.loss_db);
    let loss_variance_db = match (measured_loss_db, planned.planned_loss_db) {
        (Some(measured), Some(expected)) => Some(measured - expected),
        _ => None,
    };

    let mut remarks = Vec::new();
    let abs_pct = length_variance_pct.abs();

    let compliance_status = if abs_pct <= tolerance.length_pct {
        match loss_variance_db {
            Some(delta) if delta.abs() > tolerance.loss_db => {
                remarks.push(format!("Loss variance detected: {delta:+.2} dB"));
                ComplianceStatus::MinorDeviation
            }
            _ => ComplianceStatus::Compliant,
        }
    } else if abs_pct <= tolerance.major_pct {
        remarks.push(format!("Length variance: {length_variance_pct:.1}%"));
        ComplianceStatus::MinorDeviation
    } else {
        remarks.push(format!("Significant length variance: {length_variance_pct:.1}%"));
        ComplianceStatus::MajorDeviation
    };

    if !status_match {
        remarks.push(format!(
            "Status mismatch: {} -> {}",
            planned.construction_status, built.construction_status
        ));
    }

    ComparisonResult {
        cable_id: planned.name.clone(),
        presence: Presence::Both,
        planned_length_km: planned.fiber_length_km,
        built_length_km: built.fiber_length_km,
        length_variance_km,
        length_variance_pct,
        planned_status: planned.construction_status.clone(),
        built_status: built.construction_status.clone(),
        status_match,
        planned_loss_db: planned.planned_loss_db,
        measured_loss_db,
        loss_variance_db,
        compliance_status,
        remarks,
    }
}

/// A planned cable with no built counterpart. Always a major deviation.
pub fn classify_not_built(planned: &CableRecord) -> ComparisonResult {
    ComparisonResult {
        cable_id: planned.name.clone(),
        presence: Presence::PlannedOnly,
        planned_length_km: planned.fiber_length_km,
        built_length_km: 0.0,
        length_variance_km: -planned.fiber_length_km,
        length_variance_pct: -100.0,
        planned_status: planned.construction_status.clone(),
        built_status: NOT_BUILT.to_string(),
        status_match: false,
        planned_loss_db: planned.planned_loss_db,
        measured_loss_db: None,
        loss_variance_db: None,
        compliance_status: ComplianceStatus::MajorDeviation,
        remarks: vec!["Cable planned but not built".to_string()],
    }
}

/// A built cable the plan never mentioned. Always a major deviation.
pub fn classify_unplanned(built: &CableRecord, measurement: Option<&OpmMeasurement>) -> ComparisonResult {
    ComparisonResult {
        cable_id: built.name.clone(),
        presence: Presence::BuiltOnly,
        planned_length_km: 0.0,
        built_length_km: built.fiber_length_km,
        length_variance_km: built.fiber_length_km,
        length_variance_pct: 100.0,
        planned_status: NOT_PLANNED.to_string(),
        built_status: built.construction_status.clone(),
        status_match: false,
        planned_loss_db: None,
        measured_loss_db: measurement.map(|m| m.loss_db),
        loss_variance_db: None,
        compliance_status: ComplianceStatus::MajorDeviation,
        remarks: vec!["Cable built but not in original plan".to_string()],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fibernet_core::OpmStatus;

    fn rec(name: &str, km: f64, status: &str) -> CableRecord {
        CableRecord {
            name: name.into(),
            fiber_length_km: km,
            construction_status: status.into(),
            specification: "ADSS 24C".into(),
            planned_loss_db: None,
        }
    }

    fn opm(cable: &str, loss_db: f64) -> OpmMeasurement {
        OpmMeasurement {
            cable_id: cable.into(),
            segment_name: "S1".into(),
            date: None,
            tx_power_dbm: 3.0,
            rx_power_dbm: 3.0 - loss_db,
            loss_db,
            length_km: 2.0,
            wavelength_nm: 1550,
            status: OpmStatus::Pass,
            remarks: None,
            measured_by: None,
        }
    }

    fn tol() -> ToleranceConfig {
        ToleranceConfig::default()
    }

    #[test]
    fn small_variance_with_status_change_is_compliant() {
        let r = classify_matched(&rec("C1", 10.0, "Planned"), &rec("C1", 10.2, "In Service"), None, &tol());
        assert_eq!(r.compliance_status, ComplianceStatus::Compliant);
        assert!((r.length_variance_pct - 2.0).abs() < 1e-9);
        assert!((r.length_variance_km - 0.2).abs() < 1e-9);
        assert!(!r.status_match);
        assert_eq!(r.remarks, vec!["Status mismatch: Planned -> In Service".to_string()]);
    }

    #[test]
    fn status_compare_ignores_case() {
        let r = classify_matched(&rec("C1", 2.0, "IN SERVICE"), &rec("C1", 2.0, "in service"), None, &tol());
        assert!(r.status_match);
        assert!(r.remarks.is_empty());
    }

    #[test]
    fn minor_length_band() {
        let r = classify_matched(&rec("C1", 2.0, "Built"), &rec("C1", 2.14, "Built"), None, &tol());
        assert_eq!(r.compliance_status, ComplianceStatus::MinorDeviation);
        assert_eq!(r.remarks, vec!["Length variance: 7.0%".to_string()]);
    }

    #[test]
    fn band_edges_are_inclusive() {
        let t = ToleranceConfig { length_pct: 6.25, major_pct: 25.0, loss_db: 0.5 };
        let r = classify_matched(&rec("C1", 2.0, "Built"), &rec("C1", 2.125, "Built"), None, &t);
        assert_eq!(r.compliance_status, ComplianceStatus::Compliant);

        let r = classify_matched(&rec("C1", 2.0, "Built"), &rec("C1", 2.5, "Built"), None, &t);
        assert_eq!(r.compliance_status, ComplianceStatus::MinorDeviation);
    }

    #[test]
    fn major_length_band_shorter_cable() {
        let r = classify_matched(&rec("C1", 2.0, "Built"), &rec("C1", 1.5, "Built"), None, &tol());
        assert_eq!(r.compliance_status, ComplianceStatus::MajorDeviation);
        assert_eq!(r.length_variance_pct, -25.0);
        assert_eq!(r.remarks, vec!["Significant length variance: -25.0%".to_string()]);
    }

    #[test]
    fn zero_planned_length_has_zero_pct() {
        let r = classify_matched(&rec("C1", 0.0, "Built"), &rec("C1", 3.0, "Built"), None, &tol());
        assert_eq!(r.length_variance_pct, 0.0);
        assert_eq!(r.length_variance_km, 3.0);
        assert_eq!(r.compliance_status, ComplianceStatus::Compliant);
    }

    #[test]
    fn loss_within_tolerance() {
        let planned = rec("C1", 2.0, "Built").with_planned_loss(1.5);
        let m = opm("C1", 1.75);
        let r = classify_matched(&planned, &rec("C1", 2.0, "Built"), Some(&m), &tol());
        assert_eq!(r.compliance_status, ComplianceStatus::Compliant);
        assert_eq!(r.measured_loss_db, Some(1.75));
        assert_eq!(r.loss_variance_db, Some(0.25));
    }

    #[test]
    fn loss_beyond_tolerance_is_minor() {
        let planned = rec("C1", 2.0, "Built").with_planned_loss(1.5);
        let m = opm("C1", 2.25);
        let r = classify_matched(&planned, &rec("C1", 2.0, "Built"), Some(&m), &tol());
        assert_eq!(r.compliance_status, ComplianceStatus::MinorDeviation);
        assert_eq!(r.remarks, vec!["Loss variance detected: +0.75 dB".to_string()]);
    }

    #[test]
    fn measurement_without_planned_loss_skips_loss_check() {
        let m = opm("C1", 9.0);
        let r = classify_matched(&rec("C1", 2.0, "Built"), &rec("C1", 2.0, "Built"), Some(&m), &tol());
        assert_eq!(r.compliance_status, ComplianceStatus::Compliant);
        assert_eq!(r.measured_loss_db, Some(9.0));
        assert_eq!(r.loss_variance_db, None);
    }

    #[test]
    fn length_tier_wins_over_loss() {
        let planned = rec("C1", 2.0, "Built").with_planned_loss(1.0);
        let m = opm("C1", 5.0);
        let r = classify_matched(&planned, &rec("C1", 2.5, "Built"), Some(&m), &tol());
        assert_eq!(r.compliance_status, ComplianceStatus::MajorDeviation);
        assert_eq!(r.loss_variance_db, Some(4.0));
        assert_eq!(r.remarks.len(), 1);
    }

    #[test]
    fn not_built() {
        let r = classify_not_built(&rec("C2", 5.0, "Planned"));
        assert_eq!(r.presence, Presence::PlannedOnly);
        assert_eq!(r.built_status, "Not Built");
        assert_eq!(r.built_length_km, 0.0);
        assert_eq!(r.length_variance_km, -5.0);
        assert_eq!(r.length_variance_pct, -100.0);
        assert_eq!(r.compliance_status, ComplianceStatus::MajorDeviation);
        assert_eq!(r.remarks, vec!["Cable planned but not built".to_string()]);
    }

    #[test]
    fn unplanned() {
        let m = opm("C9", 1.2);
        let r = classify_unplanned(&rec("C9", 1.0, "In Service"), Some(&m));
        assert_eq!(r.presence, Presence::BuiltOnly);
        assert_eq!(r.planned_status, "Not Planned");
        assert_eq!(r.length_variance_pct, 100.0);
        assert_eq!(r.measured_loss_db, Some(1.2));
        assert_eq!(r.compliance_status, ComplianceStatus::MajorDeviation);
    }
}
