use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Why a position was opened or closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TradeReason {
    #[serde(rename = "Strategy Signal")]
    StrategySignal,
    #[serde(rename = "Stop Loss")]
    StopLoss,
    #[serde(rename = "Take Profit")]
    TakeProfit,
}

impl TradeReason {
    pub fn as_str(self) -> &'static str {
        match self {
            TradeReason::StrategySignal => "Strategy Signal",
            TradeReason::StopLoss => "Stop Loss",
            TradeReason::TakeProfit => "Take Profit",
        }
    }
}

impl fmt::Display for TradeReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TradeReason {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "Strategy Signal" => Ok(TradeReason::StrategySignal),
            "Stop Loss" => Ok(TradeReason::StopLoss),
            "Take Profit" => Ok(TradeReason::TakeProfit),
            other => Err(format!("invalid trade reason: {other}")),
        }
    }
}
