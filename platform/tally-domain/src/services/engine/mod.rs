pub mod backtest;
pub mod simulator;
