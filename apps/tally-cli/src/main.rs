mod commands;
mod infra;
mod obs;

use clap::{Parser, Subcommand};
use commands::Command;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "tally")]
#[command(about = "Tally backtesting CLI", version, arg_required_else_help = true)]
#[command(
    after_help = "Examples:\n  tally backtest --config configs/sample.toml --out runs/\n  tally validate --config configs/sample.toml --strict\n  tally report --input runs/<run_id>/\n  tally sweep --config configs/sweep.toml\n  tally bench --bars 100000 --mode pipeline\n"
)]
struct Cli {
    /// Default log filter when TALLY_LOG is not set.
    #[arg(long, global = true, default_value = "info")]
    log_level: String,
    /// Log output format: pretty | json.
    #[arg(long, global = true, default_value = "pretty")]
    log_format: String,
    /// Serve Prometheus metrics on this address (host:port).
    #[arg(long, global = true)]
    metrics_addr: Option<String>,
    #[command(subcommand)]
    command: CliCommand,
}

#[derive(Subcommand)]
enum CliCommand {
    /// Run a backtest and write its artifacts under the output directory.
    Backtest {
        #[arg(long)]
        config: PathBuf,
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Check a config and the data quality of its bar series.
    Validate {
        #[arg(long)]
        config: PathBuf,
        #[arg(long, default_value_t = false)]
        strict: bool,
        /// Write the JSON report to this file.
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Rebuild equity, drawdown and summary artifacts from a run directory.
    Report {
        #[arg(long)]
        input: PathBuf,
    },
    /// Run a parameter grid over a base config.
    Sweep {
        #[arg(long)]
        config: PathBuf,
    },
    Bench {
        /// Number of synthetic bars to generate.
        #[arg(long, default_value_t = 500_000)]
        bars: usize,
        /// Timeframe step in seconds for timestamps.
        #[arg(long, default_value_t = 60)]
        step_seconds: i64,
        /// Benchmark mode: engine (simulation only) or pipeline (simulation + analytics).
        #[arg(long, default_value = "pipeline")]
        mode: String,
        /// Print a single JSON line instead of human output.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
}

fn main() {
    let cli = Cli::parse();

    if let Err(err) = obs::init_tracing(&cli.log_level, &cli.log_format) {
        eprintln!("error: {}", err);
        std::process::exit(1);
    }
    if let Err(err) = obs::init_metrics(cli.metrics_addr.as_deref()) {
        eprintln!("error: {}", err);
        std::process::exit(1);
    }

    let command = match cli.command {
        CliCommand::Backtest { config, out } => Command::Backtest { config, out },
        CliCommand::Validate {
            config,
            strict,
            out,
        } => Command::Validate {
            config,
            strict,
            out,
        },
        CliCommand::Report { input } => Command::Report { input },
        CliCommand::Sweep { config } => Command::Sweep { config },
        CliCommand::Bench {
            bars,
            step_seconds,
            mode,
            json,
        } => Command::Bench {
            bars,
            step_seconds,
            mode,
            json,
        },
    };

    if let Err(err) = commands::run(command) {
        eprintln!("error: {}", err);
        std::process::exit(1);
    }
}
