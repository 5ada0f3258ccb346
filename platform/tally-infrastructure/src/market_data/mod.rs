pub mod ohlcv;
pub mod synthetic;
