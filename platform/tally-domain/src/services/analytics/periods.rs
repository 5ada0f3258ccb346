use crate::entities::summary::MonthlyReturn;
use crate::value_objects::equity_point::EquityPoint;
use chrono::{TimeZone, Utc};

pub const TOTAL_LABEL: &str = "Total";

/// Calendar-month returns over the equity curve followed by a `Total` row.
/// Each month is measured from the last equity before it; the first point is the first base.
pub fn monthly_returns(equity: &[EquityPoint]) -> Vec<MonthlyReturn> {
    let mut rows = Vec::new();
    let (Some(first), Some(last)) = (equity.first(), equity.last()) else {
        return rows;
    };
    if equity.len() < 2 {
        return rows;
    }

    let mut base = first.equity;
    let mut current: Option<(String, f64)> = None;
    for point in &equity[1..] {
        let Some(key) = point.timestamp.and_then(month_key) else {
            continue;
        };
        match current.as_mut() {
            Some((month, month_end)) if *month == key => *month_end = point.equity,
            _ => {
                if let Some((month, month_end)) = current.take() {
                    rows.push(row(month, base, month_end));
                    base = month_end;
                }
                current = Some((key, point.equity));
            }
        }
    }
    if let Some((month, month_end)) = current {
        rows.push(row(month, base, month_end));
    }

    rows.push(row(TOTAL_LABEL.to_string(), first.equity, last.equity));
    rows
}

fn row(month: String, base: f64, end: f64) -> MonthlyReturn {
    let return_pct = if base != 0.0 {
        (end - base) / base * 100.0
    } else {
        0.0
    };
    MonthlyReturn { month, return_pct }
}

fn month_key(timestamp: i64) -> Option<String> {
    Utc.timestamp_opt(timestamp, 0)
        .single()
        .map(|dt| dt.format("%Y-%m").to_string())
}
