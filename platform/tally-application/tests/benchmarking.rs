use tally_application::benchmarking::{bench_bars, run_bench, BenchMode};

#[test]
fn run_bench_rejects_invalid_args() {
    assert!(run_bench(0, 60, "engine").is_err());
    assert!(run_bench(10, 0, "engine").is_err());
    assert!(run_bench(10, 60, "nope").is_err());
}

#[test]
fn bench_bars_are_deterministic_and_evenly_spaced() {
    let a = bench_bars(300, 60);
    assert_eq!(a, bench_bars(300, 60));
    assert!(a.windows(2).all(|w| w[1].timestamp - w[0].timestamp == 60));
    assert!(a.iter().all(|b| b.high >= b.close && b.low <= b.close));
}

#[test]
fn run_bench_engine_processes_all_bars_and_trades() {
    let out = run_bench(1000, 60, "engine").expect("bench engine");
    assert_eq!(out.mode, BenchMode::Engine);
    assert_eq!(out.bars_requested, 1000);
    assert_eq!(out.bars_processed, 1000);
    assert!(!out.results.trades.is_empty());
    assert!(out.results.equity.is_empty());
}

#[test]
fn run_bench_pipeline_fills_analytics() {
    let out = run_bench(1000, 60, "Pipeline").expect("bench pipeline");
    assert_eq!(out.mode, BenchMode::Pipeline);
    assert_eq!(out.results.summary.total_trades, out.results.trades.len());
    assert_eq!(out.results.equity.len(), out.results.trades.len() + 1);
    assert_eq!(out.results.drawdown.points.len(), out.results.equity.len());
}
