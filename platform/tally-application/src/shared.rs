use crate::config::{Config, StrategyChoice};
use crate::meta::{engine_name, engine_version};
use tally_domain::entities::position::Position;
use tally_domain::entities::risk::SimulationConfig;
use tally_domain::error::SimulationError;
use tally_domain::repositories::market_data::OhlcvQuery;
use tally_domain::repositories::signals::SignalRepository;
use tally_domain::services::analytics::DEFAULT_ANNUALIZATION_FACTOR;
use tally_domain::services::audit::AuditEvent;
use tally_domain::services::engine::backtest::BacktestConfig;
use tally_domain::services::strategy::StrategyKind;
use tally_domain::value_objects::equity_point::EquityPoint;
use tally_domain::value_objects::timeframe::Timeframe;
use std::path::Path;

pub fn normalize_timeframe_label(value: &str) -> Result<String, String> {
    Timeframe::parse(value).map(|tf| tf.label)
}

pub fn ohlcv_query(config: &Config) -> Result<OhlcvQuery, String> {
    let timeframe = Timeframe::parse(&config.run.timeframe)?;
    Ok(OhlcvQuery {
        symbol: config.run.symbol.clone(),
        timeframe: timeframe.label,
        expected_step_seconds: Some(timeframe.step_seconds),
    })
}

pub fn annualization_factor(config: &Config) -> f64 {
    config
        .metrics
        .as_ref()
        .and_then(|metrics| metrics.annualization_factor)
        .unwrap_or(DEFAULT_ANNUALIZATION_FACTOR)
}

pub fn build_backtest_config(config: &Config) -> BacktestConfig {
    BacktestConfig {
        simulation: SimulationConfig {
            position_size: config.risk.position_size,
            stop_loss_pct: config.risk.stop_loss_pct,
            take_profit_pct: config.risk.take_profit_pct,
        },
        initial_capital: config.run.initial_capital,
        annualization_factor: annualization_factor(config),
    }
}

pub fn resolve_sma_windows(config: &Config) -> (usize, usize) {
    let short = config.strategy.sma_short.unwrap_or(10) as usize;
    let long = config.strategy.sma_long.unwrap_or(30) as usize;
    (short, long)
}

pub fn resolve_strategy(
    config: &Config,
    signals_repo: &dyn SignalRepository,
    bar_count: usize,
) -> Result<StrategyKind, String> {
    match config.strategy.kind {
        StrategyChoice::BuyAndHold => Ok(StrategyKind::BuyAndHold),
        StrategyChoice::Hold => Ok(StrategyKind::Hold),
        StrategyChoice::SmaCrossover => {
            let (short, long) = resolve_sma_windows(config);
            Ok(StrategyKind::SmaCrossover { short, long })
        }
        StrategyChoice::SignalsCsv => {
            let path = config
                .strategy
                .signals_csv
                .as_deref()
                .ok_or_else(|| "strategy.kind=signals_csv requires strategy.signals_csv".to_string())?;
            let actions = signals_repo.load_signals(Path::new(path))?;
            if actions.len() != bar_count {
                let mismatch = SimulationError::LengthMismatch {
                    bars: bar_count,
                    signals: actions.len(),
                };
                return Err(format!("signals_csv {path} rejected: {mismatch}"));
            }
            Ok(StrategyKind::Scripted(actions))
        }
    }
}

pub fn summary_meta_json(
    config: &Config,
    equity: &[EquityPoint],
    bars: Option<usize>,
    open_position: Option<&Position>,
) -> serde_json::Value {
    let end = equity.last().and_then(|point| point.timestamp);
    serde_json::json!({
        "engine": engine_name(),
        "version": engine_version(),
        "run_id": config.run.run_id,
        "symbol": config.run.symbol,
        "timeframe": config.run.timeframe,
        "initial_capital": config.run.initial_capital,
        "bars": bars,
        "last_exit": end,
        "open_position": open_position,
    })
}

pub fn config_snapshot_json(config: &Config) -> Result<serde_json::Value, String> {
    serde_json::to_value(config).map_err(|err| format!("failed to snapshot config: {err}"))
}

pub fn timing_event(
    run_id: &str,
    stage: &str,
    symbol: Option<&str>,
    action: &str,
    duration_ms: u64,
    details: serde_json::Value,
) -> AuditEvent {
    let event = AuditEvent::new(run_id, 0, stage, action).with_details(serde_json::json!({
        "duration_ms": duration_ms,
        "details": details,
    }));
    match symbol {
        Some(symbol) => event.with_symbol(symbol),
        None => event,
    }
}

pub fn sort_events(events: &mut [AuditEvent]) {
    events.sort_by(|a, b| {
        a.timestamp
            .cmp(&b.timestamp)
            .then_with(|| a.stage.cmp(&b.stage))
            .then_with(|| a.action.cmp(&b.action))
    });
}
