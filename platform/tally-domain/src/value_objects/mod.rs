pub mod action;
pub mod bar;
pub mod drawdown_point;
pub mod equity_point;
pub mod reason;
pub mod side;
pub mod timeframe;
pub mod trade;
