use crate::value_objects::reason::TradeReason;
use crate::value_objects::side::Side;
use serde::{Deserialize, Serialize};

/// A closed, realized entry/exit pair. Immutable once appended to the trade log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    pub entry_timestamp: i64,
    pub exit_timestamp: i64,
    pub side: Side,
    pub entry_price: f64,
    pub exit_price: f64,
    pub quantity: f64,
    pub pnl: f64,
    pub pnl_percent: f64,
    pub duration: String,
    pub entry_reason: TradeReason,
    pub exit_reason: TradeReason,
}

impl Trade {
    /// Per-trade return as a fraction (`pnl_percent / 100`).
    pub fn return_fraction(&self) -> f64 {
        self.pnl_percent / 100.0
    }
}

/// `pnl / (entry_price * quantity) * 100`, or 0 when the notional is zero.
pub fn pnl_percent(pnl: f64, entry_price: f64, quantity: f64) -> f64 {
    let notional = entry_price * quantity;
    if notional == 0.0 {
        return 0.0;
    }
    pnl / notional * 100.0
}

/// Renders a holding period as `"3h 15m"`, or `"45m"` below one hour.
/// Both parts truncate toward zero.
pub fn format_duration(seconds: i64) -> String {
    let hours = seconds / 3600;
    let minutes = (seconds / 60) % 60;
    if hours > 0 {
        format!("{hours}h {minutes}m")
    } else {
        format!("{minutes}m")
    }
}
