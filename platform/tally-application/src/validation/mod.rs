use crate::config::{Config, DataSource, StrategyChoice};
use crate::shared::{normalize_timeframe_label, ohlcv_query, resolve_sma_windows};
use tally_domain::repositories::market_data::MarketDataRepository;
use tally_domain::services::ohlcv::DataQualityReport;
use std::time::Instant;
use tracing::info_span;

#[derive(Debug, Default, Clone, PartialEq)]
pub struct ConfigCheck {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ConfigCheck {
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Static checks that need no data.
pub fn check_config(config: &Config) -> ConfigCheck {
    let mut check = ConfigCheck::default();

    if !config.run.initial_capital.is_finite() || config.run.initial_capital <= 0.0 {
        check
            .errors
            .push("run.initial_capital must be finite and > 0".to_string());
    }
    if let Err(err) = normalize_timeframe_label(&config.run.timeframe) {
        check.errors.push(format!("run.timeframe: {err}"));
    }

    for (name, value) in [
        ("risk.stop_loss_pct", config.risk.stop_loss_pct),
        ("risk.take_profit_pct", config.risk.take_profit_pct),
    ] {
        if !value.is_finite() || value < 0.0 {
            check.errors.push(format!("{name} must be finite and >= 0"));
        } else if value >= 100.0 {
            check
                .warnings
                .push(format!("{name}={value} can produce a non-positive exit price"));
        }
    }
    if config.risk.position_size.is_nan() || config.risk.position_size <= 0.0 {
        check.warnings.push(format!(
            "risk.position_size={} is not positive; pnl will be degenerate",
            config.risk.position_size
        ));
    }

    match config.strategy.kind {
        StrategyChoice::SmaCrossover => {
            let (short, long) = resolve_sma_windows(config);
            if short == 0 || long == 0 {
                check
                    .errors
                    .push("strategy.sma_short and strategy.sma_long must be > 0".to_string());
            } else if short >= long {
                check.errors.push(format!(
                    "strategy.sma_short ({short}) must be < strategy.sma_long ({long})"
                ));
            }
        }
        StrategyChoice::SignalsCsv if config.strategy.signals_csv.is_none() => {
            check
                .errors
                .push("strategy.kind=signals_csv requires strategy.signals_csv".to_string());
        }
        _ => {}
    }

    match config.data.source {
        DataSource::Csv if config.data.ohlcv_csv.is_none() => {
            check
                .errors
                .push("data.source=csv requires data.ohlcv_csv".to_string());
        }
        DataSource::Synthetic => {
            if config.data.synthetic_bars == Some(0) {
                check
                    .errors
                    .push("data.synthetic_bars must be > 0".to_string());
            }
            if config.data.seed.is_none() {
                check
                    .warnings
                    .push("data.seed not set; the default seed is used".to_string());
            }
        }
        _ => {}
    }

    if config.data.max_bars == Some(0) {
        check.errors.push("data.max_bars must be > 0".to_string());
    }

    if let Some(factor) = config.metrics.as_ref().and_then(|m| m.annualization_factor) {
        if !factor.is_finite() || factor <= 0.0 {
            check
                .errors
                .push("metrics.annualization_factor must be finite and > 0".to_string());
        }
    }

    check
}

pub fn validate(
    config: &Config,
    strict: bool,
    market_data: &dyn MarketDataRepository,
) -> Result<serde_json::Value, String> {
    let _span = info_span!(
        "validate",
        strict = strict,
        run_id = %config.run.run_id,
        symbol = %config.run.symbol,
        timeframe = %config.run.timeframe
    )
    .entered();

    let check = check_config(config);
    for warning in &check.warnings {
        tracing::warn!("{warning}");
    }
    if !check.is_ok() {
        return Err(format!("invalid config: {}", check.errors.join("; ")));
    }

    let stage_start = Instant::now();
    let query = ohlcv_query(config)?;
    let (bars, report) = market_data.load_ohlcv(&query)?;
    metrics::histogram!("tally.validate.load_ohlcv_ms")
        .record(stage_start.elapsed().as_millis() as f64);

    metrics::gauge!("tally.validate.ohlcv.gaps").set(report.gaps as f64);
    metrics::gauge!("tally.validate.ohlcv.duplicates").set(report.duplicates as f64);
    metrics::gauge!("tally.validate.ohlcv.out_of_order").set(report.out_of_order as f64);
    metrics::gauge!("tally.validate.ohlcv.invalid_close").set(report.invalid_close as f64);

    if strict && !report.is_clean() {
        return Err(format!(
            "strict validation failed: duplicates={} out_of_order={} invalid_close={}",
            report.duplicates, report.out_of_order, report.invalid_close
        ));
    }

    Ok(serde_json::json!({
        "ohlcv": data_quality_json(&report, bars.len()),
        "timeframe": query.timeframe,
        "expected_step_seconds": query.expected_step_seconds,
        "warnings": check.warnings,
        "strict": strict,
    }))
}

fn data_quality_json(report: &DataQualityReport, rows: usize) -> serde_json::Value {
    serde_json::json!({
        "rows": rows,
        "duplicates": report.duplicates,
        "gaps": report.gaps,
        "out_of_order": report.out_of_order,
        "invalid_close": report.invalid_close,
        "first_timestamp": report.first_timestamp,
        "last_timestamp": report.last_timestamp,
        "first_gap": report.first_gap,
        "first_duplicate": report.first_duplicate,
        "first_out_of_order": report.first_out_of_order,
        "first_invalid_close": report.first_invalid_close,
        "max_gap_seconds": report.max_gap_seconds,
    })
}
