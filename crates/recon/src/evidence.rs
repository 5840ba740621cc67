use crate::config::ToleranceConfig;
use crate::model::{ComparisonResult, ComparisonSummary, ComplianceStatus, Discrepancy, Presence};

const EXCELLENT_RATE: f64 = 95.0;
const GOOD_RATE: f64 = 85.0;

/// Compute summary statistics from classified comparisons.
pub fn compute_summary(results: &[ComparisonResult]) -> ComparisonSummary {
    let mut summary = ComparisonSummary {
        total_cables: results.len(),
        ..ComparisonSummary::default()
    };

    for r in results {
        match r.compliance_status {
            ComplianceStatus::Compliant => summary.compliant += 1,
            ComplianceStatus::MinorDeviation => summary.minor_deviations += 1,
            ComplianceStatus::MajorDeviation => summary.major_deviations += 1,
        }
        match r.presence {
            Presence::PlannedOnly => summary.not_built += 1,
            Presence::BuiltOnly => summary.unplanned += 1,
            Presence::Both => {}
        }
        summary.total_planned_length_km += r.planned_length_km;
        summary.total_built_length_km += r.built_length_km;
    }

    if summary.total_cables > 0 {
        summary.compliance_rate = summary.compliant as f64 / summary.total_cables as f64 * 100.0;
    }
    summary.overall_length_variance_km = summary.total_built_length_km - summary.total_planned_length_km;
    if summary.total_planned_length_km > 0.0 {
        summary.overall_length_variance_pct =
            summary.overall_length_variance_km / summary.total_planned_length_km * 100.0;
    }

    summary
}

/// Every non-compliant comparison, majors first. Order within a tier follows `results`.
pub fn discrepancies(results: &[ComparisonResult]) -> Vec<Discrepancy> {
    let mut out: Vec<Discrepancy> = results
        .iter()
        .filter(|r| r.compliance_status != ComplianceStatus::Compliant)
        .map(|r| Discrepancy {
            cable_id: r.cable_id.clone(),
            severity: r.compliance_status,
            length_variance_pct: r.length_variance_pct,
            remarks: r.remarks.clone(),
        })
        .collect();

    // sort_by is stable
    out.sort_by(|a, b| b.severity.cmp(&a.severity));
    out
}

/// Follow-up actions derived from the summary counts.
pub fn recommendations(summary: &ComparisonSummary, tolerance: &ToleranceConfig) -> Vec<String> {
    let mut out = Vec::new();

    if summary.major_deviations > 0 {
        out.push("Critical: Investigate major deviations immediately".to_string());
        out.push(format!("Review cables with >{}% length variance", tolerance.major_pct));
    }

    if summary.minor_deviations > 0 {
        out.push("Warning: Minor deviations detected".to_string());
        out.push("Document reasons for length variances".to_string());
    }

    if summary.compliance_rate >= EXCELLENT_RATE {
        out.push("Excellent: Network implementation highly compliant with plan".to_string());
    } else if summary.compliance_rate >= GOOD_RATE {
        out.push("Good: Network implementation mostly compliant".to_string());
    } else {
        out.push("Review: Multiple compliance issues detected".to_string());
    }

    if summary.not_built > 0 {
        out.push(format!("{} planned cables not yet built", summary.not_built));
    }
    if summary.unplanned > 0 {
        out.push(format!(
            "{} unplanned cables built - update design documentation",
            summary.unplanned
        ));
    }

    out
}
