use tally_application::experiments::sweep;
use std::path::PathBuf;

pub(super) fn run_sweep(sweep_path: PathBuf) -> Result<(), String> {
    let sweep_file = sweep::load_sweep_file(&sweep_path)?;
    let base_path = sweep::resolve_base_config_path(&sweep_path, &sweep_file.base.config);
    let base_config = tally_application::config::load_config(&base_path)?;
    super::common::print_config_summary("sweep", &base_config, None);

    let overall_start = std::time::Instant::now();
    let crate::infra::SweepDeps {
        market_data,
        signals_repo,
        artifacts,
    } = crate::infra::build_sweep_deps(&base_config)?;

    let result = sweep::run_sweep(&sweep_path, market_data.as_ref(), &signals_repo, &artifacts)?;

    for run in &result.runs {
        match (&run.metrics, &run.error) {
            (Some(m), _) => println!(
                "run {}: ok trades={} total_pnl={:.4} sharpe={:.4} max_drawdown={:.2}",
                run.run_id, m.trades, m.total_pnl, m.sharpe, m.max_drawdown
            ),
            (None, error) => println!(
                "run {}: {} {}",
                run.run_id,
                run.status,
                error.as_deref().unwrap_or("")
            ),
        }
    }
    println!("sweep output: {}", result.sweep_dir.display());
    println!(
        "{} cli: sweep {} runs={} ok={} total_ms={}",
        tally_application::meta::engine_name(),
        result.sweep_id,
        result.runs.len(),
        result.ok_runs(),
        overall_start.elapsed().as_millis()
    );
    Ok(())
}
