use std::fmt;

use serde::Serialize;

use crate::params::{FiberType, LossParameters, NetworkSegment, OpticalParameters, Wavelength};
use crate::units::dbm_to_mw;

/// Margin at or above this is `Ok`.
pub const OK_MARGIN_DB: f64 = 3.0;
/// Margin at or above this (and below `OK_MARGIN_DB`) is `Warning`.
pub const WARNING_MARGIN_DB: f64 = 0.0;
/// Margin treated as full marks in the quality score.
pub const IDEAL_MARGIN_DB: f64 = 10.0;

const LOSS_EFFICIENCY_WEIGHT: f64 = 40.0;
const MARGIN_WEIGHT: f64 = 60.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum LinkStatus {
    #[serde(rename = "OK")]
    Ok,
    Warning,
    Critical,
}

impl LinkStatus {
    pub fn from_margin(available_margin: f64) -> Self {
        if available_margin >= OK_MARGIN_DB {
            Self::Ok
        } else if available_margin >= WARNING_MARGIN_DB {
            Self::Warning
        } else {
            Self::Critical
        }
    }
}

impl fmt::Display for LinkStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ok => write!(f, "OK"),
            Self::Warning => write!(f, "Warning"),
            Self::Critical => write!(f, "Critical"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LossBreakdown {
    pub fiber_loss_db: f64,
    pub splice_loss_db: f64,
    pub connector_loss_db: f64,
    pub total_loss_db: f64,
}

impl LossBreakdown {
    pub fn for_segment(segment: &NetworkSegment, loss: &LossParameters) -> Self {
        let fiber_loss_db = segment.fiber_length_km * loss.fiber_loss_per_km;
        let splice_loss_db = f64::from(segment.splice_count) * loss.splice_loss;
        let connector_loss_db = f64::from(segment.connector_count) * loss.connector_loss;
        Self {
            fiber_loss_db,
            splice_loss_db,
            connector_loss_db,
            total_loss_db: fiber_loss_db + splice_loss_db + connector_loss_db,
        }
    }
}

/// Inputs echoed back with the loss breakdown.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalculationDetails {
    pub segment_name: String,
    pub tx_power_dbm: f64,
    pub rx_sensitivity_dbm: f64,
    pub wavelength: Wavelength,
    pub fiber_type: FiberType,
    pub loss_breakdown: LossBreakdown,
    pub fiber_length_km: f64,
    pub fiber_length_m: f64,
    pub splice_count: u32,
    pub connector_count: u32,
    pub safety_margin_db: f64,
    pub loss_per_km_db: f64,
    /// Power arriving at the receiver, `tx_power - total_loss`.
    pub expected_rx_power_dbm: f64,
    pub expected_rx_power_mw: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalculationResult {
    pub power_budget: f64,
    pub total_loss: f64,
    pub available_margin: f64,
    pub status: LinkStatus,
    /// 0..=100.
    pub quality_score: f64,
    pub details: CalculationDetails,
}

/// Power budget, loss and margin for one segment.
pub fn compute(
    optical: &OpticalParameters,
    loss: &LossParameters,
    segment: &NetworkSegment,
) -> CalculationResult {
    let power_budget = optical.power_budget();
    let breakdown = LossBreakdown::for_segment(segment, loss);
    let total_loss = breakdown.total_loss_db;
    let available_margin = power_budget - total_loss - loss.safety_margin;
    let status = LinkStatus::from_margin(available_margin);
    let quality_score = quality_score(power_budget, total_loss, available_margin);

    log::debug!(
        "segment '{}': margin {:.2} dB, status {}, quality {:.2}",
        segment.name,
        available_margin,
        status,
        quality_score
    );

    let expected_rx_power_dbm = optical.tx_power - total_loss;
    CalculationResult {
        power_budget,
        total_loss,
        available_margin,
        status,
        quality_score,
        details: CalculationDetails {
            segment_name: segment.name.clone(),
            tx_power_dbm: optical.tx_power,
            rx_sensitivity_dbm: optical.rx_sensitivity,
            wavelength: optical.wavelength,
            fiber_type: optical.fiber_type,
            loss_breakdown: breakdown,
            fiber_length_km: segment.fiber_length_km,
            fiber_length_m: segment.fiber_length_km * 1000.0,
            splice_count: segment.splice_count,
            connector_count: segment.connector_count,
            safety_margin_db: loss.safety_margin,
            loss_per_km_db: loss.fiber_loss_per_km,
            expected_rx_power_dbm,
            expected_rx_power_mw: dbm_to_mw(expected_rx_power_dbm),
        },
    }
}

/// 40% loss efficiency + 60% margin headroom, with 10 dB margin as full marks.
pub fn quality_score(power_budget: f64, total_loss: f64, available_margin: f64) -> f64 {
    if power_budget <= 0.0 {
        return 0.0;
    }

    let loss_efficiency = (1.0 - total_loss / power_budget).clamp(0.0, 1.0) * LOSS_EFFICIENCY_WEIGHT;
    let margin_adequacy =
        (available_margin / IDEAL_MARGIN_DB * MARGIN_WEIGHT).clamp(0.0, MARGIN_WEIGHT);

    (loss_efficiency + margin_adequacy).clamp(0.0, 100.0)
}

/// Longest fiber run (km) that still leaves zero margin. Never negative.
///
/// Lossless fiber (`fiber_loss_per_km == 0`) with headroom left is unbounded.
pub fn max_distance(
    optical: &OpticalParameters,
    loss: &LossParameters,
    splice_count: u32,
    connector_count: u32,
) -> f64 {
    let available_for_fiber = optical.power_budget()
        - f64::from(splice_count) * loss.splice_loss
        - f64::from(connector_count) * loss.connector_loss
        - loss.safety_margin;

    if loss.fiber_loss_per_km <= 0.0 {
        return if available_for_fiber > 0.0 { f64::INFINITY } else { 0.0 };
    }

    (available_for_fiber / loss.fiber_loss_per_km).max(0.0)
}

/// Transmit power (dBm) that leaves exactly the safety margin.
pub fn required_tx_power(rx_sensitivity: f64, segment: &NetworkSegment, loss: &LossParameters) -> f64 {
    rx_sensitivity + LossBreakdown::for_segment(segment, loss).total_loss_db + loss.safety_margin
}

/// `compute` over each segment independently, in order.
pub fn analyze(
    optical: &OpticalParameters,
    loss: &LossParameters,
    segments: &[NetworkSegment],
) -> Vec<CalculationResult> {
    segments.iter().map(|s| compute(optical, loss, s)).collect()
}
