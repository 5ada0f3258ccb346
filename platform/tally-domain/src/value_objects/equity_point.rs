use crate::value_objects::timeframe::format_timestamp;
use serde::{Deserialize, Serialize};

/// One point of the equity curve. `timestamp == None` marks the initial
/// capital point, labelled `"Start"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquityPoint {
    pub timestamp: Option<i64>,
    pub equity: f64,
}

pub const START_LABEL: &str = "Start";

impl EquityPoint {
    pub fn start(equity: f64) -> Self {
        Self {
            timestamp: None,
            equity,
        }
    }

    pub fn at(timestamp: i64, equity: f64) -> Self {
        Self {
            timestamp: Some(timestamp),
            equity,
        }
    }

    pub fn label(&self) -> String {
        point_label(self.timestamp)
    }
}

pub(crate) fn point_label(timestamp: Option<i64>) -> String {
    match timestamp {
        Some(ts) => format_timestamp(ts),
        None => START_LABEL.to_string(),
    }
}
