use fibernet_core::{Cable, NetworkSnapshot};
use serde::Serialize;

use crate::config::ToleranceConfig;

pub const NOT_BUILT: &str = "Not Built";
pub const NOT_PLANNED: &str = "Not Planned";

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// A cable reduced to the fields the comparison reads, keyed by `name`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CableRecord {
    pub name: String,
    pub fiber_length_km: f64,
    pub construction_status: String,
    pub specification: String,
    /// Loss the design predicts for this cable, dB. Filled by the caller.
    pub planned_loss_db: Option<f64>,
}

impl CableRecord {
    pub fn from_cable(cable: &Cable) -> Self {
        Self {
            name: cable.name.clone(),
            fiber_length_km: cable.fiber_length_km(),
            construction_status: cable.construction_status.clone(),
            specification: cable.specification.clone(),
            planned_loss_db: None,
        }
    }

    /// Every cable in document order.
    pub fn from_snapshot(snapshot: &NetworkSnapshot) -> Vec<Self> {
        snapshot.cables.iter().map(Self::from_cable).collect()
    }

    pub fn with_planned_loss(mut self, loss_db: f64) -> Self {
        self.planned_loss_db = Some(loss_db);
        self
    }
}

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

/// Ordered by severity: `Compliant < MinorDeviation < MajorDeviation`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum ComplianceStatus {
    Compliant,
    #[serde(rename = "Minor Deviation")]
    MinorDeviation,
    #[serde(rename = "Major Deviation")]
    MajorDeviation,
}

impl std::fmt::Display for ComplianceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Compliant => write!(f, "Compliant"),
            Self::MinorDeviation => write!(f, "Minor Deviation"),
            Self::MajorDeviation => write!(f, "Major Deviation"),
        }
    }
}

/// Which side(s) of the comparison a cable was found on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Presence {
    Both,
    PlannedOnly,
    BuiltOnly,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonResult {
    pub cable_id: String,
    pub presence: Presence,
    pub planned_length_km: f64,
    pub built_length_km: f64,
    pub length_variance_km: f64,
    pub length_variance_pct: f64,
    pub planned_status: String,
    pub built_status: String,
    pub status_match: bool,
    pub planned_loss_db: Option<f64>,
    pub measured_loss_db: Option<f64>,
    /// `measured - planned`, when both are known.
    pub loss_variance_db: Option<f64>,
    pub compliance_status: ComplianceStatus,
    pub remarks: Vec<String>,
}

// ---------------------------------------------------------------------------
// Summary + Output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ComparisonSummary {
    pub total_cables: usize,
    pub compliant: usize,
    pub minor_deviations: usize,
    pub major_deviations: usize,
    pub not_built: usize,
    pub unplanned: usize,
    /// Percent, 0 when there is nothing to compare.
    pub compliance_rate: f64,
    pub total_planned_length_km: f64,
    pub total_built_length_km: f64,
    pub overall_length_variance_km: f64,
    pub overall_length_variance_pct: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Discrepancy {
    pub cable_id: String,
    pub severity: ComplianceStatus,
    pub length_variance_pct: f64,
    pub remarks: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NetworkComparison {
    pub meta: ComparisonMeta,
    pub comparisons: Vec<ComparisonResult>,
    pub summary: ComparisonSummary,
    pub discrepancies: Vec<Discrepancy>,
    pub recommendations: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonMeta {
    pub engine_version: String,
    pub tolerance: ToleranceConfig,
    pub measurements_supplied: bool,
}
