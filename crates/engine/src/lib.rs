//! `fibernet-engine` — optical link-budget engine.
//!
//! Pure functions of their inputs: no hidden state, safe to call from any
//! number of threads. Parameter ranges are checked by the `validate()`
//! methods; the computations themselves never fail.

pub mod advice;
pub mod budget;
pub mod error;
pub mod network;
pub mod params;
pub mod units;

pub use advice::recommend;
pub use budget::{
    analyze, compute, max_distance, quality_score, required_tx_power, CalculationDetails,
    CalculationResult, LinkStatus, LossBreakdown,
};
pub use error::BudgetError;
pub use network::{analyze_network, CableBudget, NetworkBudgetReport, SegmentEstimator};
pub use params::{FiberType, LossParameters, NetworkSegment, OpticalParameters, Wavelength};
