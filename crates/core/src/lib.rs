//! `fibernet-core` — value types shared by the parsers and engines.
//!
//! Everything here is created by one parse or compute step and never
//! mutated afterwards. Derived figures (counts, sums) are pure functions
//! over these values.

pub mod measurement;
pub mod network;

pub use measurement::{
    AtpMeasurement, AtpResult, AtpSummary, MeasurementSummary, OpmMeasurement, OpmStatus,
};
pub use network::{
    Cable, Coordinate, DistributionPoint, EntityKind, GeometryError, NetworkSnapshot,
    NetworkStatistics, Pole, RawPlacemark,
};
