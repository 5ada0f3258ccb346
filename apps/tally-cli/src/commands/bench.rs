use tally_application::benchmarking::{self, BenchSummary};

pub(super) fn run_bench(
    bars: usize,
    step_seconds: i64,
    mode: String,
    json: bool,
) -> Result<(), String> {
    if bars == 0 {
        return Err("--bars must be > 0".to_string());
    }
    if step_seconds <= 0 {
        return Err("--step-seconds must be > 0".to_string());
    }

    let summary = benchmarking::run_bench(bars, step_seconds, &mode)
        .map_err(|err| err.replace("unsupported mode", "unsupported --mode"))?;

    if json {
        println!("{}", bench_json(&summary));
    } else {
        println!(
            "bench: mode={} bars={} elapsed_ms={} bars_per_sec={:.2}",
            summary.mode.as_str(),
            summary.bars_processed,
            summary.elapsed_ms,
            summary.bars_per_sec
        );
        let s = &summary.results.summary;
        println!(
            "bench: trades={} total_pnl={:.4} sharpe={:.4} max_drawdown={:.4}",
            summary.results.trades.len(),
            s.total_pnl,
            s.sharpe_ratio,
            s.max_drawdown
        );
    }

    Ok(())
}

fn bench_json(summary: &BenchSummary) -> serde_json::Value {
    serde_json::json!({
        "mode": summary.mode.as_str(),
        "bars_requested": summary.bars_requested,
        "bars_processed": summary.bars_processed,
        "elapsed_ms": summary.elapsed_ms,
        "bars_per_sec": summary.bars_per_sec,
        "trades": summary.results.trades.len(),
    })
}
