use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Timeframe {
    pub label: String,
    pub step_seconds: i64,
}

impl Timeframe {
    pub fn parse(value: &str) -> Result<Self, String> {
        let normalized = value.trim().to_lowercase();
        let (label, step_seconds) = match normalized.as_str() {
            "1m" | "1min" => ("1min", 60),
            "5m" | "5min" => ("5min", 300),
            "15m" | "15min" => ("15min", 900),
            "30m" | "30min" => ("30min", 1_800),
            "1h" | "1hour" => ("1hour", 3_600),
            "4h" | "4hour" => ("4hour", 14_400),
            "1d" | "1day" => ("1day", 86_400),
            "1w" | "1week" => ("1week", 604_800),
            _ => return Err(format!("unsupported timeframe: {value}")),
        };
        Ok(Self {
            label: label.to_string(),
            step_seconds,
        })
    }
}

/// `YYYY-MM-DD HH:MM:SS` in UTC. Out-of-range timestamps fall back to the raw number.
pub fn format_timestamp(timestamp: i64) -> String {
    match Utc.timestamp_opt(timestamp, 0) {
        chrono::LocalResult::Single(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
        _ => timestamp.to_string(),
    }
}

/// Accepts RFC3339, `YYYY-MM-DD HH:MM:SS` (UTC) or epoch seconds.
pub fn parse_timestamp(value: &str) -> Result<i64, String> {
    let trimmed = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(dt.timestamp());
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%d %H:%M:%S") {
        return Ok(naive.and_utc().timestamp());
    }
    trimmed
        .parse::<i64>()
        .map_err(|_| format!("invalid timestamp: {value}"))
}
