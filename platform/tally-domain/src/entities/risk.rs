use serde::{Deserialize, Serialize};

/// Fixed-quantity sizing plus optional protective exits. A percentage of 0 disables that exit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    pub position_size: f64,
    pub stop_loss_pct: f64,
    pub take_profit_pct: f64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            position_size: 1.0,
            stop_loss_pct: 0.0,
            take_profit_pct: 0.0,
        }
    }
}

impl SimulationConfig {
    /// Problems that do not stop a run but make its P&L degenerate.
    pub fn warnings(&self) -> Vec<String> {
        let mut warnings = Vec::new();
        if self.position_size.is_nan() || self.position_size <= 0.0 {
            warnings.push(format!(
                "position_size={} is not positive; pnl will be degenerate",
                self.position_size
            ));
        }
        if self.stop_loss_pct >= 100.0 {
            warnings.push(format!(
                "stop_loss_pct={} can never close a long position",
                self.stop_loss_pct
            ));
        }
        if self.take_profit_pct >= 100.0 {
            warnings.push(format!(
                "take_profit_pct={} can never close a short position",
                self.take_profit_pct
            ));
        }
        warnings
    }
}
