use serde::{Deserialize, Serialize};

/// One line of a run's `logs.jsonl`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEvent {
    pub run_id: String,
    pub timestamp: i64,
    pub stage: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,
    pub action: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub details: serde_json::Value,
}

impl AuditEvent {
    pub fn new(run_id: &str, timestamp: i64, stage: &str, action: &str) -> Self {
        Self {
            run_id: run_id.to_string(),
            timestamp,
            stage: stage.to_string(),
            symbol: None,
            action: action.to_string(),
            error: None,
            details: serde_json::Value::Null,
        }
    }

    pub fn with_symbol(mut self, symbol: &str) -> Self {
        self.symbol = Some(symbol.to_string());
        self
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = details;
        self
    }
}
