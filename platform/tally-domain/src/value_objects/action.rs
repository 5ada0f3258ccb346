use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Per-bar decision emitted by a signal source; `signals[i]` pertains to `bars[i]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Action {
    Buy,
    Sell,
    Hold,
}

impl Action {
    /// Integer encoding used by external signal producers: 1 / -1 / 0.
    pub fn from_code(code: i64) -> Result<Self, String> {
        match code {
            1 => Ok(Action::Buy),
            -1 => Ok(Action::Sell),
            0 => Ok(Action::Hold),
            other => Err(format!("invalid action code: {other}")),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Action::Buy => "BUY",
            Action::Sell => "SELL",
            Action::Hold => "HOLD",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Action {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        match trimmed.to_uppercase().as_str() {
            "BUY" => return Ok(Action::Buy),
            "SELL" => return Ok(Action::Sell),
            "HOLD" => return Ok(Action::Hold),
            _ => (),
        }
        let code: i64 = trimmed
            .parse()
            .map_err(|_| format!("invalid action: {value}"))?;
        Self::from_code(code)
    }
}
