use crate::backtesting::trade_events;
use crate::config::{parse_config_str, Config};
use crate::shared::{annualization_factor, config_snapshot_json, sort_events, summary_meta_json};
use tally_domain::entities::summary::Summary;
use tally_domain::repositories::artifacts::{ArtifactReader, ArtifactWriter, RunReport};
use tally_domain::services::analytics::DEFAULT_ANNUALIZATION_FACTOR;
use tally_domain::services::audit::AuditEvent;
use tally_domain::services::engine::backtest::{analyze, BacktestResults};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::info_span;

pub struct GenerateReportResult {
    pub input_dir: PathBuf,
    pub run_id: String,
    pub initial_capital: f64,
    pub summary: Summary,
    pub wrote_html: bool,
}

/// Rebuilds every derived artifact of a run directory from its `trades.csv`.
pub fn generate_report(
    input_dir: &Path,
    reader: &dyn ArtifactReader,
    writer: &dyn ArtifactWriter,
) -> Result<GenerateReportResult, String> {
    let _span = info_span!("generate_report", input_dir = %input_dir.display()).entered();

    let stage_start = Instant::now();
    let trades_path = input_dir.join("trades.csv");
    let equity_path = input_dir.join("equity.csv");
    let config_path = input_dir.join("config_snapshot.toml");

    if !reader.exists(&trades_path) {
        return Err(format!("missing trades.csv in {}", input_dir.display()));
    }
    let trades = reader.read_trades_csv(&trades_path)?;

    let config = match reader.read_config_snapshot_toml(&config_path)? {
        Some(raw) => match parse_config_str(&raw) {
            Ok(config) => Some(config),
            Err(err) => {
                tracing::warn!(error = %err, "ignoring unparseable config snapshot");
                None
            }
        },
        None => None,
    };

    let initial_capital = match &config {
        Some(config) => config.run.initial_capital,
        None => initial_capital_from_equity(reader, &equity_path)?,
    };
    let factor = config
        .as_ref()
        .map(annualization_factor)
        .unwrap_or(DEFAULT_ANNUALIZATION_FACTOR);

    let results = analyze(trades, initial_capital, factor);
    metrics::histogram!("tally.report.generate_ms")
        .record(stage_start.elapsed().as_millis() as f64);
    metrics::gauge!("tally.report.trades").set(results.trades.len() as f64);

    let run_id = config
        .as_ref()
        .map(|config| config.run.run_id.clone())
        .unwrap_or_else(|| {
            input_dir
                .file_name()
                .and_then(|name| name.to_str())
                .unwrap_or("unknown")
                .to_string()
        });
    let wrote_html = config.as_ref().map(Config::html_report).unwrap_or(false);

    write_report(input_dir, &run_id, config.as_ref(), &results, wrote_html, writer)?;

    tracing::info!(
        run_id = %run_id,
        trades = results.summary.total_trades,
        initial_capital,
        "report regenerated"
    );

    Ok(GenerateReportResult {
        input_dir: input_dir.to_path_buf(),
        run_id,
        initial_capital,
        summary: results.summary,
        wrote_html,
    })
}

fn initial_capital_from_equity(reader: &dyn ArtifactReader, equity_path: &Path) -> Result<f64, String> {
    if !reader.exists(equity_path) {
        return Err(format!(
            "cannot determine initial capital: no config_snapshot.toml and no {}",
            equity_path.display()
        ));
    }
    let equity = reader.read_equity_csv(equity_path)?;
    equity
        .iter()
        .find(|point| point.timestamp.is_none())
        .or_else(|| equity.first())
        .map(|point| point.equity)
        .ok_or_else(|| format!("{} has no rows", equity_path.display()))
}

fn write_report(
    input_dir: &Path,
    run_id: &str,
    config: Option<&Config>,
    results: &BacktestResults,
    html: bool,
    writer: &dyn ArtifactWriter,
) -> Result<(), String> {
    writer.write_equity_csv(input_dir.join("equity.csv").as_path(), &results.equity)?;
    writer.write_drawdown_csv(
        input_dir.join("drawdown.csv").as_path(),
        &results.drawdown.points,
    )?;

    let meta = config.map(|config| summary_meta_json(config, &results.equity, None, None));
    let snapshot = config.map(config_snapshot_json).transpose()?;
    let report = RunReport {
        summary: &results.summary,
        monthly_returns: &results.monthly_returns,
        meta: meta.as_ref(),
        config_snapshot: snapshot.as_ref(),
    };
    writer.write_summary_json(input_dir.join("summary.json").as_path(), &report)?;
    if html {
        writer.write_summary_html(input_dir.join("summary.html").as_path(), &report)?;
    }

    let symbol = config.map(|config| config.run.symbol.as_str());
    let end_ts = results
        .trades
        .last()
        .map(|trade| trade.exit_timestamp)
        .unwrap_or(0);
    let mut events = trade_events(run_id, symbol, &results.trades);
    events.push(
        AuditEvent::new(run_id, end_ts, "report", "recompute").with_details(serde_json::json!({
            "input_dir": input_dir.display().to_string(),
            "trades": results.trades.len(),
        })),
    );
    events.push(
        AuditEvent::new(run_id, end_ts, "summary", "complete").with_details(serde_json::json!({
            "meta": meta,
            "trades": results.summary.total_trades,
            "win_rate": results.summary.win_rate,
            "total_pnl": results.summary.total_pnl,
            "sharpe_ratio": results.summary.sharpe_ratio,
            "max_drawdown": results.summary.max_drawdown,
        })),
    );
    sort_events(&mut events);
    writer.write_audit_jsonl(input_dir.join("logs.jsonl").as_path(), &events)
}
