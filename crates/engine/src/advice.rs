use crate::budget::{CalculationResult, LinkStatus};

/// Splice loss above this share of fiber loss gets its own advice line.
const SPLICE_SHARE_THRESHOLD: f64 = 0.3;
const ROUTE_QUALITY_THRESHOLD: f64 = 70.0;

/// Remediation advice for a computed link, most urgent first.
pub fn recommend(result: &CalculationResult) -> Vec<String> {
    let mut out: Vec<String> = match result.status {
        LinkStatus::Critical => vec![
            "CRITICAL: Link margin is negative. Connection may fail.".into(),
            "Reduce fiber length or increase transmit power".into(),
            "Minimize splice and connector count".into(),
            "Use lower loss fiber (e.g., G.657.A2)".into(),
        ],
        LinkStatus::Warning => vec![
            "WARNING: Link margin is below recommended threshold".into(),
            "Consider adding optical amplifiers for long distances".into(),
            "Ensure high-quality splices (< 0.05 dB)".into(),
            "Regular maintenance to prevent degradation".into(),
        ],
        LinkStatus::Ok => vec!["Link quality is good".into()],
    };

    let breakdown = &result.details.loss_breakdown;
    if breakdown.splice_loss_db > breakdown.fiber_loss_db * SPLICE_SHARE_THRESHOLD {
        out.push("Splice loss is significant. Consider reducing splice count".into());
    }

    if result.quality_score < ROUTE_QUALITY_THRESHOLD {
        out.push("Consider route optimization to improve quality score".into());
    }

    out
}
