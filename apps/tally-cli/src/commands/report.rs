use std::path::PathBuf;

pub(super) fn run_report(input: PathBuf) -> Result<(), String> {
    let deps = crate::infra::build_reporting_deps();
    let result = tally_application::reporting::generate_report(
        input.as_path(),
        deps.reader.as_ref(),
        deps.writer.as_ref(),
    )?;
    println!(
        "{} cli: report regenerated (run_id={}, trades={}, total_pnl={:.4}, html={})",
        tally_application::meta::engine_name(),
        result.run_id,
        result.summary.total_trades,
        result.summary.total_pnl,
        result.wrote_html
    );
    println!("report output: {}", result.input_dir.display());
    Ok(())
}
