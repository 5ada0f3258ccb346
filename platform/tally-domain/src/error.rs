use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SimulationError {
    #[error("bars/signals length mismatch: {bars} bars vs {signals} signals")]
    LengthMismatch { bars: usize, signals: usize },
}
