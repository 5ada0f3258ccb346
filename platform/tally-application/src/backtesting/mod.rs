use crate::config::Config;
use crate::shared::{
    build_backtest_config, config_snapshot_json, ohlcv_query, resolve_strategy, sort_events,
    summary_meta_json, timing_event,
};
use tally_domain::entities::risk::SimulationConfig;
use tally_domain::repositories::artifacts::{ArtifactWriter, RunReport};
use tally_domain::repositories::market_data::MarketDataRepository;
use tally_domain::repositories::signals::SignalRepository;
use tally_domain::services::audit::AuditEvent;
use tally_domain::services::engine::backtest::{self as engine, BacktestResults};
use tally_domain::value_objects::trade::Trade;
use std::path::PathBuf;
use std::time::Instant;
use tracing::info_span;

pub struct BacktestRun {
    pub run_dir: PathBuf,
    pub bars: usize,
    pub results: BacktestResults,
}

pub fn run_backtest(
    config: &Config,
    config_toml: &str,
    out: Option<PathBuf>,
    market_data: &dyn MarketDataRepository,
    signals_repo: &dyn SignalRepository,
    artifacts: &dyn ArtifactWriter,
) -> Result<PathBuf, String> {
    run_backtest_detailed(config, config_toml, out, market_data, signals_repo, artifacts)
        .map(|run| run.run_dir)
}

pub fn run_backtest_detailed(
    config: &Config,
    config_toml: &str,
    out: Option<PathBuf>,
    market_data: &dyn MarketDataRepository,
    signals_repo: &dyn SignalRepository,
    artifacts: &dyn ArtifactWriter,
) -> Result<BacktestRun, String> {
    let _span = info_span!(
        "run_backtest",
        run_id = %config.run.run_id,
        symbol = %config.run.symbol,
        timeframe = %config.run.timeframe
    )
    .entered();

    let run_id = config.run.run_id.as_str();
    let symbol = config.run.symbol.as_str();
    let mut audit_extras: Vec<AuditEvent> = Vec::new();
    let engine_config = build_backtest_config(config);
    check_risk(&engine_config.simulation)?;

    let stage_start = Instant::now();
    let query = ohlcv_query(config)?;
    let (mut bars, data_report) = market_data.load_ohlcv(&query)?;
    let loaded_rows = bars.len();
    if let Some(max_bars) = config.data.max_bars {
        bars.truncate(max_bars);
    }
    metrics::histogram!("tally.backtest.load_ohlcv_ms")
        .record(stage_start.elapsed().as_millis() as f64);
    audit_extras.push(timing_event(
        run_id,
        "timing",
        Some(symbol),
        "load_ohlcv",
        stage_start.elapsed().as_millis() as u64,
        serde_json::json!({
            "rows": loaded_rows,
            "used_rows": bars.len(),
            "duplicates": data_report.duplicates,
            "gaps": data_report.gaps,
            "out_of_order": data_report.out_of_order,
            "invalid_close": data_report.invalid_close,
        }),
    ));
    if !data_report.is_clean() {
        tracing::warn!(
            duplicates = data_report.duplicates,
            out_of_order = data_report.out_of_order,
            invalid_close = data_report.invalid_close,
            "bar series has quality issues; simulating in file order"
        );
    }

    let stage_start = Instant::now();
    let strategy = resolve_strategy(config, signals_repo, bars.len())?;
    let signals = strategy.signals_for(&bars);
    metrics::histogram!("tally.backtest.signals_ms")
        .record(stage_start.elapsed().as_millis() as f64);

    let stage_start = Instant::now();
    let results = engine::run_backtest(&bars, &signals, &engine_config)
        .map_err(|err| format!("simulation rejected inputs: {err}"))?;
    let engine_ms = stage_start.elapsed().as_millis() as f64;
    metrics::histogram!("tally.backtest.engine_ms").record(engine_ms);
    metrics::gauge!("tally.backtest.bars_processed").set(bars.len() as f64);
    metrics::gauge!("tally.backtest.trades").set(results.trades.len() as f64);
    metrics::gauge!("tally.backtest.engine_bars_per_sec").set(if engine_ms > 0.0 {
        (bars.len() as f64) / (engine_ms / 1000.0)
    } else {
        0.0
    });
    audit_extras.push(timing_event(
        run_id,
        "timing",
        Some(symbol),
        "run_engine",
        engine_ms as u64,
        serde_json::json!({ "bars": bars.len(), "signals": signals.len() }),
    ));

    tracing::info!(
        trades = results.summary.total_trades,
        win_rate = results.summary.win_rate,
        total_pnl = results.summary.total_pnl,
        final_equity = results.summary.final_equity,
        "backtest complete"
    );

    let run_dir = write_outputs(
        config,
        config_toml,
        out,
        &results,
        bars.len(),
        bars.first().map(|bar| bar.timestamp).unwrap_or(0),
        artifacts,
        audit_extras,
    )?;

    Ok(BacktestRun {
        run_dir,
        bars: bars.len(),
        results,
    })
}

fn check_risk(simulation: &SimulationConfig) -> Result<(), String> {
    for (name, value) in [
        ("risk.stop_loss_pct", simulation.stop_loss_pct),
        ("risk.take_profit_pct", simulation.take_profit_pct),
    ] {
        if !value.is_finite() || value < 0.0 {
            return Err(format!("{name} must be finite and >= 0"));
        }
    }
    for warning in simulation.warnings() {
        tracing::warn!("{warning}");
    }
    Ok(())
}

pub(crate) fn trade_events(run_id: &str, symbol: Option<&str>, trades: &[Trade]) -> Vec<AuditEvent> {
    trades
        .iter()
        .map(|trade| {
            let event = AuditEvent::new(run_id, trade.exit_timestamp, "trade", trade.side.as_str())
                .with_details(serde_json::json!({
                    "entry_timestamp": trade.entry_timestamp,
                    "entry_price": trade.entry_price,
                    "exit_price": trade.exit_price,
                    "quantity": trade.quantity,
                    "pnl": trade.pnl,
                    "pnl_percent": trade.pnl_percent,
                    "entry_reason": trade.entry_reason,
                    "exit_reason": trade.exit_reason,
                }));
            match symbol {
                Some(symbol) => event.with_symbol(symbol),
                None => event,
            }
        })
        .collect()
}

#[allow(clippy::too_many_arguments)]
fn write_outputs(
    config: &Config,
    config_toml: &str,
    out: Option<PathBuf>,
    results: &BacktestResults,
    bars: usize,
    start_ts: i64,
    artifacts: &dyn ArtifactWriter,
    mut audit_extras: Vec<AuditEvent>,
) -> Result<PathBuf, String> {
    let base_dir = out.unwrap_or_else(|| PathBuf::from(&config.paths.out_dir));
    let run_dir = base_dir.join(&config.run.run_id);
    artifacts.ensure_dir(&run_dir)?;

    artifacts.write_trades_csv(run_dir.join("trades.csv").as_path(), &results.trades)?;
    artifacts.write_equity_csv(run_dir.join("equity.csv").as_path(), &results.equity)?;
    artifacts.write_drawdown_csv(
        run_dir.join("drawdown.csv").as_path(),
        &results.drawdown.points,
    )?;

    let meta = summary_meta_json(
        config,
        &results.equity,
        Some(bars),
        results.open_position.as_ref(),
    );
    let config_snapshot = config_snapshot_json(config)?;
    let report = RunReport {
        summary: &results.summary,
        monthly_returns: &results.monthly_returns,
        meta: Some(&meta),
        config_snapshot: Some(&config_snapshot),
    };
    artifacts.write_summary_json(run_dir.join("summary.json").as_path(), &report)?;

    let run_id = config.run.run_id.as_str();
    let symbol = config.run.symbol.as_str();
    let mut audit_events = Vec::with_capacity(results.trades.len() + audit_extras.len() + 2);
    audit_events.push(
        AuditEvent::new(run_id, start_ts, "run", "start")
            .with_symbol(symbol)
            .with_details(serde_json::json!({
                "bars": bars,
                "initial_capital": config.run.initial_capital,
                "strategy": config.strategy.kind,
            })),
    );
    audit_events.extend(trade_events(run_id, Some(symbol), &results.trades));
    audit_events.append(&mut audit_extras);
    let end_ts = results
        .trades
        .last()
        .map(|trade| trade.exit_timestamp)
        .unwrap_or(start_ts);
    audit_events.push(
        AuditEvent::new(run_id, end_ts, "summary", "complete")
            .with_symbol(symbol)
            .with_details(serde_json::json!({
                "trades": results.summary.total_trades,
                "win_rate": results.summary.win_rate,
                "total_pnl": results.summary.total_pnl,
                "sharpe_ratio": results.summary.sharpe_ratio,
                "max_drawdown": results.summary.max_drawdown,
                "open_position": results.open_position.is_some(),
            })),
    );
    sort_events(&mut audit_events);
    artifacts.write_audit_jsonl(run_dir.join("logs.jsonl").as_path(), &audit_events)?;

    if config.html_report() {
        artifacts.write_summary_html(run_dir.join("summary.html").as_path(), &report)?;
    }

    artifacts
        .write_config_snapshot_toml(run_dir.join("config_snapshot.toml").as_path(), config_toml)?;

    Ok(run_dir)
}
