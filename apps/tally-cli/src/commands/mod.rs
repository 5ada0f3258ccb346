mod backtest;
mod bench;
mod common;
mod report;
mod sweep;
mod validate;

use std::path::PathBuf;
use std::time::Instant;

pub enum Command {
    Backtest {
        config: PathBuf,
        out: Option<PathBuf>,
    },
    Validate {
        config: PathBuf,
        strict: bool,
        out: Option<PathBuf>,
    },
    Report {
        input: PathBuf,
    },
    Sweep {
        config: PathBuf,
    },
    Bench {
        bars: usize,
        step_seconds: i64,
        mode: String,
        json: bool,
    },
}

impl Command {
    fn name(&self) -> &'static str {
        match self {
            Command::Backtest { .. } => "backtest",
            Command::Validate { .. } => "validate",
            Command::Report { .. } => "report",
            Command::Sweep { .. } => "sweep",
            Command::Bench { .. } => "bench",
        }
    }
}

pub fn run(command: Command) -> Result<(), String> {
    let name = command.name();
    let start = Instant::now();
    let result = match command {
        Command::Backtest { config, out } => backtest::run_backtest(config, out),
        Command::Validate {
            config,
            strict,
            out,
        } => validate::run_validate(config, strict, out),
        Command::Report { input } => report::run_report(input),
        Command::Sweep { config } => sweep::run_sweep(config),
        Command::Bench {
            bars,
            step_seconds,
            mode,
            json,
        } => bench::run_bench(bars, step_seconds, mode, json),
    };
    let result_label = if result.is_ok() { "ok" } else { "err" };
    metrics::histogram!("tally.cli.command_ms", "command" => name, "result" => result_label)
        .record(start.elapsed().as_millis() as f64);
    result
}
