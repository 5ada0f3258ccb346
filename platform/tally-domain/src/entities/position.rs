use crate::value_objects::reason::TradeReason;
use crate::value_objects::side::Side;
use crate::value_objects::trade::{format_duration, pnl_percent, Trade};
use serde::Serialize;

/// The single open position owned by the simulator while it runs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Position {
    pub side: Side,
    pub entry_timestamp: i64,
    pub entry_price: f64,
    pub quantity: f64,
    pub entry_reason: TradeReason,
}

impl Position {
    pub fn open(side: Side, timestamp: i64, price: f64, quantity: f64) -> Self {
        Self {
            side,
            entry_timestamp: timestamp,
            entry_price: price,
            quantity,
            entry_reason: TradeReason::StrategySignal,
        }
    }

    /// Price at which the stop fires, or `None` when the stop is disabled.
    pub fn stop_price(&self, stop_loss_pct: f64) -> Option<f64> {
        if stop_loss_pct <= 0.0 {
            return None;
        }
        let fraction = stop_loss_pct / 100.0;
        Some(match self.side {
            Side::Long => self.entry_price * (1.0 - fraction),
            Side::Short => self.entry_price * (1.0 + fraction),
        })
    }

    /// Price at which the target fires, or `None` when the target is disabled.
    pub fn target_price(&self, take_profit_pct: f64) -> Option<f64> {
        if take_profit_pct <= 0.0 {
            return None;
        }
        let fraction = take_profit_pct / 100.0;
        Some(match self.side {
            Side::Long => self.entry_price * (1.0 + fraction),
            Side::Short => self.entry_price * (1.0 - fraction),
        })
    }

    pub fn close(self, exit_timestamp: i64, exit_price: f64, exit_reason: TradeReason) -> Trade {
        let pnl = self.side.pnl(self.entry_price, exit_price, self.quantity);
        Trade {
            entry_timestamp: self.entry_timestamp,
            exit_timestamp,
            side: self.side,
            entry_price: self.entry_price,
            exit_price,
            quantity: self.quantity,
            pnl,
            pnl_percent: pnl_percent(pnl, self.entry_price, self.quantity),
            duration: format_duration(exit_timestamp - self.entry_timestamp),
            entry_reason: self.entry_reason,
            exit_reason,
        }
    }
}
