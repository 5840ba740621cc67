use std::fmt;

use serde::Serialize;

/// Outcome column of an optical power meter run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum OpmStatus {
    Pass,
    Fail,
    Warning,
    Unknown,
}

impl OpmStatus {
    /// Case-insensitive; anything unrecognised is `Unknown`.
    pub fn parse(text: &str) -> Self {
        match text.trim().to_lowercase().as_str() {
            "pass" => Self::Pass,
            "fail" => Self::Fail,
            "warning" => Self::Warning,
            _ => Self::Unknown,
        }
    }
}

impl fmt::Display for OpmStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pass => write!(f, "Pass"),
            Self::Fail => write!(f, "Fail"),
            Self::Warning => write!(f, "Warning"),
            Self::Unknown => write!(f, "Unknown"),
        }
    }
}

/// Outcome column of an acceptance test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum AtpResult {
    Pass,
    Fail,
    Unknown,
}

impl AtpResult {
    pub fn parse(text: &str) -> Self {
        match text.trim().to_lowercase().as_str() {
            "pass" => Self::Pass,
            "fail" => Self::Fail,
            _ => Self::Unknown,
        }
    }
}

impl fmt::Display for AtpResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pass => write!(f, "Pass"),
            Self::Fail => write!(f, "Fail"),
            Self::Unknown => write!(f, "Unknown"),
        }
    }
}

/// One optical power meter reading. `cable_id` joins to `Cable::name`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OpmMeasurement {
    pub cable_id: String,
    pub segment_name: String,
    pub date: Option<String>,
    pub tx_power_dbm: f64,
    pub rx_power_dbm: f64,
    pub loss_db: f64,
    pub length_km: f64,
    pub wavelength_nm: u32,
    pub status: OpmStatus,
    pub remarks: Option<String>,
    pub measured_by: Option<String>,
}

/// One acceptance-test row for a distribution point core.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AtpMeasurement {
    pub odp_id: String,
    pub test_date: Option<String>,
    pub optical_loss_db: f64,
    pub reflectance_db: Option<f64>,
    pub test_result: AtpResult,
    /// 1-based.
    pub fiber_core: u32,
    pub remarks: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MeasurementSummary {
    pub total_measurements: usize,
    pub passed: usize,
    pub failed: usize,
    pub warning: usize,
    pub pass_rate: f64,
    pub average_loss_db: f64,
    pub average_length_km: f64,
    pub total_length_km: f64,
}

impl MeasurementSummary {
    pub fn from_opm(measurements: &[OpmMeasurement]) -> Self {
        if measurements.is_empty() {
            return Self::default();
        }

        let total = measurements.len();
        let count = |status: OpmStatus| measurements.iter().filter(|m| m.status == status).count();
        let passed = count(OpmStatus::Pass);
        let total_loss: f64 = measurements.iter().map(|m| m.loss_db).sum();
        let total_length_km: f64 = measurements.iter().map(|m| m.length_km).sum();

        Self {
            total_measurements: total,
            passed,
            failed: count(OpmStatus::Fail),
            warning: count(OpmStatus::Warning),
            pass_rate: passed as f64 / total as f64 * 100.0,
            average_loss_db: total_loss / total as f64,
            average_length_km: total_length_km / total as f64,
            total_length_km,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AtpSummary {
    pub total_tests: usize,
    pub passed: usize,
    pub failed: usize,
    pub pass_rate: f64,
    pub average_loss_db: f64,
}

impl AtpSummary {
    pub fn from_atp(measurements: &[AtpMeasurement]) -> Self {
        if measurements.is_empty() {
            return Self::default();
        }

        let total = measurements.len();
        let passed = measurements.iter().filter(|m| m.test_result == AtpResult::Pass).count();
        let failed = measurements.iter().filter(|m| m.test_result == AtpResult::Fail).count();
        let total_loss: f64 = measurements.iter().map(|m| m.optical_loss_db).sum();

        Self {
            total_tests: total,
            passed,
            failed,
            pass_rate: passed as f64 / total as f64 * 100.0,
            average_loss_db: total_loss / total as f64,
        }
    }
}
