use crate::value_objects::equity_point::point_label;
use serde::{Deserialize, Serialize};

/// Drawdown from the running peak, index-aligned with the equity curve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrawdownPoint {
    pub timestamp: Option<i64>,
    pub drawdown_pct: f64,
}

impl DrawdownPoint {
    pub fn label(&self) -> String {
        point_label(self.timestamp)
    }
}
