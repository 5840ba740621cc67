use std::fmt;

use serde::Serialize;

// ---------------------------------------------------------------------------
// Geometry
// ---------------------------------------------------------------------------

/// WGS84 position as it appears in the source document.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Coordinate {
    pub longitude: f64,
    pub latitude: f64,
    /// 0.0 when the tuple carries no altitude.
    pub altitude: f64,
}

impl Coordinate {
    pub fn new(longitude: f64, latitude: f64, altitude: f64) -> Self {
        Self { longitude, latitude, altitude }
    }
}

// ---------------------------------------------------------------------------
// Entities
// ---------------------------------------------------------------------------

/// Utility pole carrying aerial cable.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Pole {
    pub name: String,
    pub designator: String,
    pub construction_status: String,
    pub material_type: String,
    pub usage: String,
    pub coordinate: Coordinate,
}

/// Passive splice/distribution node (ODP).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DistributionPoint {
    pub name: String,
    pub specification: String,
    pub splice_type: String,
    pub construction_status: String,
    pub coordinate: Coordinate,
}

/// Fiber cable with its physical path.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Cable {
    pub name: String,
    pub specification: String,
    pub number_of_cores: u32,
    /// Meters.
    pub fiber_length: f64,
    pub construction_status: String,
    /// Never empty.
    pub path: Vec<Coordinate>,
}

impl Cable {
    pub fn fiber_length_km(&self) -> f64 {
        self.fiber_length / 1000.0
    }
}

/// Infrastructure category assigned at parse time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Pole,
    DistributionPoint,
    Cable,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pole => write!(f, "pole"),
            Self::DistributionPoint => write!(f, "distribution_point"),
            Self::Cable => write!(f, "cable"),
        }
    }
}

/// Why a classified placemark was left out of the typed collections.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum GeometryError {
    /// No `<Point>` / `<LineString>` coordinates element at all.
    Missing { expected: &'static str },
    /// The coordinates element held no well-formed tuple.
    NoValidCoordinates { expected: &'static str },
}

impl fmt::Display for GeometryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing { expected } => write!(f, "no {expected} geometry"),
            Self::NoValidCoordinates { expected } => {
                write!(f, "{expected} geometry has no valid coordinate tuples")
            }
        }
    }
}

impl std::error::Error for GeometryError {}

/// Audit-trail entry; one per placemark, in document order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RawPlacemark {
    pub name: String,
    pub description: String,
    /// `None` when no keyword set matched.
    pub kind: Option<EntityKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub geometry_error: Option<GeometryError>,
}

impl RawPlacemark {
    /// True when the placemark landed in a typed collection.
    pub fn is_accepted(&self) -> bool {
        self.kind.is_some() && self.geometry_error.is_none()
    }
}

// ---------------------------------------------------------------------------
// Snapshot
// ---------------------------------------------------------------------------

/// Output of one parser run over one document.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NetworkSnapshot {
    pub poles: Vec<Pole>,
    pub distribution_points: Vec<DistributionPoint>,
    pub cables: Vec<Cable>,
    pub raw_placemarks: Vec<RawPlacemark>,
}

impl NetworkSnapshot {
    pub fn statistics(&self) -> NetworkStatistics {
        NetworkStatistics::from_snapshot(self)
    }

    pub fn cable(&self, name: &str) -> Option<&Cable> {
        self.cables.iter().find(|c| c.name == name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NetworkStatistics {
    pub total_poles: usize,
    pub total_distribution_points: usize,
    pub total_cables: usize,
    pub poles_in_service: usize,
    pub poles_planned: usize,
    pub total_cable_length_m: f64,
    pub total_cable_length_km: f64,
    pub raw_placemarks: usize,
    pub unclassified_placemarks: usize,
}

impl NetworkStatistics {
    pub fn from_snapshot(snapshot: &NetworkSnapshot) -> Self {
        let status_contains = |needle: &str| {
            snapshot
                .poles
                .iter()
                .filter(|p| p.construction_status.to_lowercase().contains(needle))
                .count()
        };
        let total_cable_length_m: f64 = snapshot.cables.iter().map(|c| c.fiber_length).sum();

        Self {
            total_poles: snapshot.poles.len(),
            total_distribution_points: snapshot.distribution_points.len(),
            total_cables: snapshot.cables.len(),
            poles_in_service: status_contains("service"),
            poles_planned: status_contains("planned"),
            total_cable_length_m,
            total_cable_length_km: total_cable_length_m / 1000.0,
            raw_placemarks: snapshot.raw_placemarks.len(),
            unclassified_placemarks: snapshot
                .raw_placemarks
                .iter()
                .filter(|r| r.kind.is_none())
                .count(),
        }
    }
}
