use tally_application::config::{Config, DataSource, StrategyChoice};
use tally_application::meta::engine_name;
use std::path::PathBuf;

pub(super) fn print_config_summary(command: &str, config: &Config, out: Option<&PathBuf>) {
    println!(
        "{} cli: {} (run_id={}, symbol={}, timeframe={}, initial_capital={})",
        engine_name(),
        command,
        config.run.run_id,
        config.run.symbol,
        config.run.timeframe,
        config.run.initial_capital
    );
    println!(
        "data: source={}, ohlcv_csv={}, max_bars={}, out_dir={}",
        match config.data.source {
            DataSource::Csv => "csv",
            DataSource::Synthetic => "synthetic",
        },
        config.data.ohlcv_csv.as_deref().unwrap_or("none"),
        config
            .data
            .max_bars
            .map(|max| max.to_string())
            .unwrap_or_else(|| "all".to_string()),
        config.paths.out_dir
    );
    if config.data.source == DataSource::Synthetic {
        println!(
            "synthetic: bars={}, seed={}, start={}",
            config
                .data
                .synthetic_bars
                .map(|bars| bars.to_string())
                .unwrap_or_else(|| "default".to_string()),
            config
                .data
                .seed
                .unwrap_or(crate::infra::DEFAULT_SYNTHETIC_SEED),
            config.data.start.as_deref().unwrap_or("default")
        );
    }
    println!(
        "strategy: kind={}, sma_short={}, sma_long={}, signals_csv={}",
        match config.strategy.kind {
            StrategyChoice::BuyAndHold => "buy_and_hold",
            StrategyChoice::SmaCrossover => "sma_crossover",
            StrategyChoice::Hold => "hold",
            StrategyChoice::SignalsCsv => "signals_csv",
        },
        display_opt(config.strategy.sma_short),
        display_opt(config.strategy.sma_long),
        config.strategy.signals_csv.as_deref().unwrap_or("none")
    );
    println!(
        "risk: position_size={}, stop_loss_pct={}, take_profit_pct={}",
        config.risk.position_size, config.risk.stop_loss_pct, config.risk.take_profit_pct
    );
    if let Some(out_dir) = out {
        println!("output dir: {}", out_dir.display());
    }
}

fn display_opt(value: Option<u64>) -> String {
    value
        .map(|v| v.to_string())
        .unwrap_or_else(|| "-".to_string())
}
