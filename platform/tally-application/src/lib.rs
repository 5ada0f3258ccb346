pub mod backtesting;
pub mod benchmarking;
pub mod config;
pub mod experiments;
pub mod meta;
pub mod reporting;
mod shared;
pub mod validation;
