use tally_domain::services::engine::backtest::{analyze, BacktestConfig, BacktestResults};
use tally_domain::services::engine::simulator::simulate_with_outcome;
use tally_domain::services::strategy::StrategyKind;
use tally_domain::value_objects::bar::Bar;
use std::time::Instant;
use tracing::info_span;

pub const BENCH_SMA_SHORT: usize = 10;
pub const BENCH_SMA_LONG: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BenchMode {
    /// Signal generation plus simulation only.
    Engine,
    /// Signals, simulation and every analytics stage.
    Pipeline,
}

impl BenchMode {
    pub fn parse(value: &str) -> Result<Self, String> {
        match value.trim().to_lowercase().as_str() {
            "engine" => Ok(Self::Engine),
            "pipeline" => Ok(Self::Pipeline),
            _ => Err("unsupported mode (use: engine | pipeline)".to_string()),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Engine => "engine",
            Self::Pipeline => "pipeline",
        }
    }
}

pub struct BenchSummary {
    pub mode: BenchMode,
    pub bars_requested: usize,
    pub bars_processed: u64,
    pub elapsed_ms: u64,
    pub bars_per_sec: f64,
    pub results: BacktestResults,
}

/// Deterministic oscillating series; the first SMA cross is upward.
pub fn bench_bars(bars: usize, step_seconds: i64) -> Vec<Bar> {
    let start_ts = 1_700_000_000i64;
    let mut out = Vec::with_capacity(bars);
    let mut previous_close = 100.0f64;
    for i in 0..bars {
        let phase = (i as f64) * std::f64::consts::TAU / 200.0;
        let drift = (i as f64) * 0.001;
        let close = (100.0 - 5.0 * phase.sin() + drift).max(0.01);
        let open = previous_close;
        let high = open.max(close) * 1.001;
        let low = open.min(close) * 0.999;
        let volume = 1000.0 + ((i as f64) * 0.01).sin().abs() * 100.0;
        out.push(Bar {
            timestamp: start_ts + (i as i64) * step_seconds,
            open,
            high,
            low,
            close,
            volume,
        });
        previous_close = close;
    }
    out
}

pub fn run_bench(bars: usize, step_seconds: i64, mode: &str) -> Result<BenchSummary, String> {
    if bars == 0 {
        return Err("bars must be > 0".to_string());
    }
    if step_seconds <= 0 {
        return Err("step_seconds must be > 0".to_string());
    }
    let bench_mode = BenchMode::parse(mode)?;

    let _span = info_span!("bench", mode = bench_mode.as_str(), bars = bars).entered();

    let series = bench_bars(bars, step_seconds);
    let config = BacktestConfig::default();
    let strategy = StrategyKind::SmaCrossover {
        short: BENCH_SMA_SHORT,
        long: BENCH_SMA_LONG,
    };

    let start = Instant::now();
    let signals = strategy.signals_for(&series);
    let outcome = simulate_with_outcome(&series, &signals, config.simulation)
        .map_err(|err| format!("bench simulation failed: {err}"))?;
    let results = match bench_mode {
        BenchMode::Engine => BacktestResults {
            trades: outcome.trades,
            equity: Vec::new(),
            drawdown: Default::default(),
            summary: Default::default(),
            monthly_returns: Vec::new(),
            open_position: outcome.open_position,
        },
        BenchMode::Pipeline => {
            let mut results = analyze(
                outcome.trades,
                config.initial_capital,
                config.annualization_factor,
            );
            results.open_position = outcome.open_position;
            results
        }
    };

    let elapsed = start.elapsed();
    let elapsed_ms = elapsed.as_millis() as u64;
    let bars_processed = signals.len() as u64;
    let bars_per_sec = if elapsed.as_secs_f64() > 0.0 {
        bars_processed as f64 / elapsed.as_secs_f64()
    } else {
        0.0
    };

    metrics::histogram!("tally.bench.elapsed_ms").record(elapsed_ms as f64);
    metrics::gauge!("tally.bench.bars_per_sec").set(bars_per_sec);
    metrics::gauge!("tally.bench.trades").set(results.trades.len() as f64);
    tracing::info!(
        bars_processed,
        elapsed_ms,
        bars_per_sec,
        trades = results.trades.len(),
        "bench complete"
    );

    Ok(BenchSummary {
        mode: bench_mode,
        bars_requested: bars,
        bars_processed,
        elapsed_ms,
        bars_per_sec,
        results,
    })
}
