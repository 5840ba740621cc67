//! `fibernet-recon` — plan-vs-built reconciliation engine.
//!
//! Pure engine crate: receives parsed cable records (and optional power
//! meter readings), returns classified comparisons + summary.
//! No CLI or IO dependencies.

pub mod classify;
pub mod config;
pub mod engine;
pub mod error;
pub mod evidence;
pub mod matcher;
pub mod model;

pub use config::ToleranceConfig;
pub use engine::{compare, compare_snapshots};
pub use error::ReconError;
pub use model::{
    CableRecord, ComparisonMeta, ComparisonResult, ComparisonSummary, ComplianceStatus,
    Discrepancy, NetworkComparison, Presence,
};
