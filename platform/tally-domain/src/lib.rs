//! Trade simulation and performance aggregation core.
//!
//! Bars and per-bar actions go in, a trade log comes out; everything
//! downstream of the trade log (equity, drawdown, summary statistics) is a
//! pure reduction over it.

pub mod entities;
pub mod error;
pub mod repositories;
pub mod services;
pub mod value_objects;

pub use error::SimulationError;
