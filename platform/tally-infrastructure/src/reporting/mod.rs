use tally_domain::repositories::artifacts::RunReport;
use tally_domain::services::audit::AuditEvent;
use tally_domain::value_objects::drawdown_point::DrawdownPoint;
use tally_domain::value_objects::equity_point::EquityPoint;
use tally_domain::value_objects::trade::Trade;
use std::fs;
use std::io::Write;
use std::path::Path;

pub fn write_audit_jsonl(path: &Path, events: &[AuditEvent]) -> Result<(), String> {
    let mut file =
        fs::File::create(path).map_err(|err| format!("failed to create logs: {}", err))?;
    for event in events {
        let line = serde_json::to_string(event)
            .map_err(|err| format!("failed to serialize audit event: {}", err))?;
        file.write_all(line.as_bytes())
            .and_then(|_| file.write_all(b"\n"))
            .map_err(|err| format!("failed to write audit event: {}", err))?;
    }
    Ok(())
}

const TRADE_COLUMNS: [&str; 11] = [
    "entry_timestamp",
    "exit_timestamp",
    "side",
    "entry_price",
    "exit_price",
    "quantity",
    "pnl",
    "pnl_percent",
    "duration",
    "entry_reason",
    "exit_reason",
];

pub fn write_trades_csv(path: &Path, trades: &[Trade]) -> Result<(), String> {
    let mut wtr = csv::Writer::from_path(path)
        .map_err(|err| format!("failed to create trades csv {}: {}", path.display(), err))?;
    wtr.write_record(TRADE_COLUMNS)
        .map_err(|err| format!("failed to write trades csv header: {}", err))?;

    for trade in trades {
        wtr.write_record([
            trade.entry_timestamp.to_string(),
            trade.exit_timestamp.to_string(),
            trade.side.as_str().to_string(),
            trade.entry_price.to_string(),
            trade.exit_price.to_string(),
            trade.quantity.to_string(),
            trade.pnl.to_string(),
            trade.pnl_percent.to_string(),
            trade.duration.clone(),
            trade.entry_reason.as_str().to_string(),
            trade.exit_reason.as_str().to_string(),
        ])
        .map_err(|err| format!("failed to write trades row: {}", err))?;
    }

    wtr.flush()
        .map_err(|err| format!("failed to flush trades csv: {}", err))
}

#[derive(Debug, Clone, serde::Deserialize)]
struct TradeRecord {
    entry_timestamp: i64,
    exit_timestamp: i64,
    side: String,
    entry_price: f64,
    exit_price: f64,
    quantity: f64,
    pnl: f64,
    pnl_percent: f64,
    duration: String,
    entry_reason: String,
    exit_reason: String,
}

pub fn read_trades_csv(path: &Path) -> Result<Vec<Trade>, String> {
    let mut rdr = csv::Reader::from_path(path)
        .map_err(|err| format!("failed to open trades csv {}: {}", path.display(), err))?;
    let mut trades = Vec::new();
    for result in rdr.deserialize::<TradeRecord>() {
        let record = result.map_err(|err| format!("failed to parse trade record: {}", err))?;
        trades.push(Trade {
            entry_timestamp: record.entry_timestamp,
            exit_timestamp: record.exit_timestamp,
            side: record.side.parse()?,
            entry_price: record.entry_price,
            exit_price: record.exit_price,
            quantity: record.quantity,
            pnl: record.pnl,
            pnl_percent: record.pnl_percent,
            duration: record.duration,
            entry_reason: record.entry_reason.parse()?,
            exit_reason: record.exit_reason.parse()?,
        });
    }
    Ok(trades)
}

/// `label,timestamp_utc,equity`; the Start row has an empty timestamp.
pub fn write_equity_csv(path: &Path, points: &[EquityPoint]) -> Result<(), String> {
    let mut wtr = csv::Writer::from_path(path)
        .map_err(|err| format!("failed to create equity csv {}: {}", path.display(), err))?;
    wtr.write_record(["label", "timestamp_utc", "equity"])
        .map_err(|err| format!("failed to write equity csv header: {}", err))?;

    for point in points {
        wtr.write_record([
            point.label(),
            point.timestamp.map(|ts| ts.to_string()).unwrap_or_default(),
            point.equity.to_string(),
        ])
        .map_err(|err| format!("failed to write equity row: {}", err))?;
    }

    wtr.flush()
        .map_err(|err| format!("failed to flush equity csv: {}", err))
}

#[derive(Debug, Clone, serde::Deserialize)]
struct EquityRecord {
    timestamp_utc: Option<i64>,
    equity: f64,
}

pub fn read_equity_csv(path: &Path) -> Result<Vec<EquityPoint>, String> {
    let mut rdr = csv::Reader::from_path(path)
        .map_err(|err| format!("failed to open equity csv {}: {}", path.display(), err))?;
    let mut points = Vec::new();
    for result in rdr.deserialize::<EquityRecord>() {
        let record = result.map_err(|err| format!("failed to parse equity record: {}", err))?;
        points.push(EquityPoint {
            timestamp: record.timestamp_utc,
            equity: record.equity,
        });
    }
    Ok(points)
}

pub fn write_drawdown_csv(path: &Path, points: &[DrawdownPoint]) -> Result<(), String> {
    let mut wtr = csv::Writer::from_path(path)
        .map_err(|err| format!("failed to create drawdown csv {}: {}", path.display(), err))?;
    wtr.write_record(["label", "timestamp_utc", "drawdown_pct"])
        .map_err(|err| format!("failed to write drawdown csv header: {}", err))?;

    for point in points {
        wtr.write_record([
            point.label(),
            point.timestamp.map(|ts| ts.to_string()).unwrap_or_default(),
            point.drawdown_pct.to_string(),
        ])
        .map_err(|err| format!("failed to write drawdown row: {}", err))?;
    }

    wtr.flush()
        .map_err(|err| format!("failed to flush drawdown csv: {}", err))
}

pub fn summary_json(report: &RunReport<'_>) -> serde_json::Value {
    serde_json::json!({
        "meta": report.meta,
        "config_snapshot": report.config_snapshot,
        "summary": report.summary,
        "monthly_returns": report.monthly_returns,
    })
}

pub fn write_summary_json(path: &Path, report: &RunReport<'_>) -> Result<(), String> {
    let json = serde_json::to_string_pretty(&summary_json(report))
        .map_err(|err| format!("failed to serialize summary: {}", err))?;
    fs::write(path, json).map_err(|err| format!("failed to write summary: {}", err))
}

fn meta_str<'a>(meta: Option<&'a serde_json::Value>, key: &str) -> &'a str {
    meta.and_then(|meta| meta.get(key))
        .and_then(|value| value.as_str())
        .unwrap_or("unknown")
}

fn escape_html(raw: &str) -> String {
    raw.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

pub fn render_summary_html(report: &RunReport<'_>) -> String {
    let run_id = escape_html(meta_str(report.meta, "run_id"));
    let symbol = escape_html(meta_str(report.meta, "symbol"));
    let timeframe = escape_html(meta_str(report.meta, "timeframe"));
    let s = report.summary;

    let metric_rows = [
        ("total_trades", s.total_trades.to_string()),
        ("winning_trades", s.winning_trades.to_string()),
        ("losing_trades", s.losing_trades.to_string()),
        ("win_rate", format!("{:.2}%", s.win_rate)),
        ("profit_factor", format!("{:.4}", s.profit_factor)),
        ("total_pnl", format!("{:.4}", s.total_pnl)),
        ("max_drawdown", format!("{:.2}%", s.max_drawdown)),
        ("max_drawdown_duration", s.max_drawdown_duration.to_string()),
        ("sharpe_ratio", format!("{:.4}", s.sharpe_ratio)),
        ("sortino_ratio", format!("{:.4}", s.sortino_ratio)),
        ("average_win", format!("{:.4}", s.average_win)),
        ("average_loss", format!("{:.4}", s.average_loss)),
        ("largest_win", format!("{:.4}", s.largest_win)),
        ("largest_loss", format!("{:.4}", s.largest_loss)),
        ("max_consecutive_wins", s.max_consecutive_wins.to_string()),
        ("max_consecutive_losses", s.max_consecutive_losses.to_string()),
        ("final_equity", format!("{:.2}", s.final_equity)),
        ("total_return_percent", format!("{:.2}%", s.total_return_percent)),
    ]
    .iter()
    .map(|(name, value)| format!("    <tr><th>{name}</th><td>{value}</td></tr>"))
    .collect::<Vec<_>>()
    .join("\n");

    let monthly_rows = report
        .monthly_returns
        .iter()
        .map(|row| {
            format!(
                "    <tr><th>{}</th><td>{:.2}%</td></tr>",
                escape_html(&row.month),
                row.return_pct
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        r#"<!DOCTYPE html>
<html>
<head>
  <meta charset="utf-8"/>
  <title>Tally Summary</title>
  <style>
    body {{ font-family: ui-sans-serif, system-ui; padding: 24px; }}
    table {{ border-collapse: collapse; width: 520px; margin-bottom: 24px; }}
    th, td {{ border: 1px solid #ddd; padding: 8px; }}
    th {{ background: #f6f6f6; text-align: left; }}
    code {{ background: #f2f2f2; padding: 2px 6px; border-radius: 4px; }}
  </style>
</head>
<body>
  <h1>Tally Summary</h1>
  <p><strong>run_id:</strong> <code>{run_id}</code></p>
  <p><strong>symbol:</strong> <code>{symbol}</code></p>
  <p><strong>timeframe:</strong> <code>{timeframe}</code></p>
  <h2>Metrics</h2>
  <table>
{metric_rows}
  </table>
  <h2>Monthly returns</h2>
  <table>
{monthly_rows}
  </table>
</body>
</html>"#
    )
}

pub fn write_summary_html(path: &Path, report: &RunReport<'_>) -> Result<(), String> {
    let mut file =
        fs::File::create(path).map_err(|err| format!("failed to create html: {}", err))?;
    file.write_all(render_summary_html(report).as_bytes())
        .map_err(|err| format!("failed to write html: {}", err))
}

#[cfg(test)]
mod tests {
    use super::{render_summary_html, summary_json};
    use tally_domain::entities::summary::{MonthlyReturn, Summary};
    use tally_domain::repositories::artifacts::RunReport;

    #[test]
    fn summary_json_uses_camel_case_fields() {
        let summary = Summary {
            total_trades: 2,
            total_pnl: 4.5,
            ..Summary::default()
        };
        let monthly = vec![MonthlyReturn {
            month: "Total".to_string(),
            return_pct: 1.5,
        }];
        let report = RunReport {
            summary: &summary,
            monthly_returns: &monthly,
            meta: None,
            config_snapshot: None,
        };
        let json = summary_json(&report);
        assert_eq!(json["summary"]["totalTrades"], 2);
        assert_eq!(json["summary"]["totalPnL"], 4.5);
        assert_eq!(json["monthly_returns"][0]["return"], 1.5);
        assert!(json["meta"].is_null());
    }

    #[test]
    fn html_escapes_meta_and_lists_months() {
        let summary = Summary::default();
        let monthly = vec![MonthlyReturn {
            month: "2024-01".to_string(),
            return_pct: 2.0,
        }];
        let meta = serde_json::json!({ "run_id": "<x>", "symbol": "NQ", "timeframe": "1h" });
        let report = RunReport {
            summary: &summary,
            monthly_returns: &monthly,
            meta: Some(&meta),
            config_snapshot: None,
        };
        let html = render_summary_html(&report);
        assert!(html.contains("&lt;x&gt;"));
        assert!(html.contains("<th>2024-01</th><td>2.00%</td>"));
    }
}
