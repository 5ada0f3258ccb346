//! Pure reductions over a closed-trade log.

pub mod drawdown;
pub mod equity;
pub mod performance;
pub mod periods;

pub const DEFAULT_ANNUALIZATION_FACTOR: f64 = 252.0;
