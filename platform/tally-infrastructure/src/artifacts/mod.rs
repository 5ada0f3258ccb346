use crate::reporting;
use tally_domain::repositories::artifacts::{ArtifactReader, ArtifactWriter, RunReport};
use tally_domain::services::audit::AuditEvent;
use tally_domain::value_objects::drawdown_point::DrawdownPoint;
use tally_domain::value_objects::equity_point::EquityPoint;
use tally_domain::value_objects::trade::Trade;
use std::fs;
use std::path::Path;
use std::time::Instant;

#[derive(Debug, Default, Clone, Copy)]
pub struct FilesystemArtifactWriter;

impl FilesystemArtifactWriter {
    pub fn new() -> Self {
        Self
    }
}

fn record_write_metrics(kind: &'static str, start: Instant, result: &Result<(), String>) {
    let result_label = if result.is_ok() { "ok" } else { "err" };
    metrics::counter!(
        "tally.infra.artifacts.write.calls_total",
        "kind" => kind,
        "result" => result_label
    )
    .increment(1);
    metrics::histogram!("tally.infra.artifacts.write_ms", "kind" => kind, "result" => result_label)
        .record(start.elapsed().as_millis() as f64);
}

fn record_read_metrics<T>(kind: &'static str, start: Instant, result: &Result<T, String>) {
    let result_label = if result.is_ok() { "ok" } else { "err" };
    metrics::counter!(
        "tally.infra.artifacts.read.calls_total",
        "kind" => kind,
        "result" => result_label
    )
    .increment(1);
    metrics::histogram!("tally.infra.artifacts.read_ms", "kind" => kind, "result" => result_label)
        .record(start.elapsed().as_millis() as f64);
}

fn timed_write(kind: &'static str, write: impl FnOnce() -> Result<(), String>) -> Result<(), String> {
    let start = Instant::now();
    let result = write();
    record_write_metrics(kind, start, &result);
    if let Err(err) = &result {
        tracing::warn!(kind, error = %err, "artifact write failed");
    }
    result
}

impl ArtifactWriter for FilesystemArtifactWriter {
    fn ensure_dir(&self, path: &Path) -> Result<(), String> {
        timed_write("ensure_dir", || {
            fs::create_dir_all(path)
                .map_err(|err| format!("failed to create dir {}: {}", path.display(), err))
        })
    }

    fn write_trades_csv(&self, path: &Path, trades: &[Trade]) -> Result<(), String> {
        timed_write("trades_csv", || reporting::write_trades_csv(path, trades))
    }

    fn write_equity_csv(&self, path: &Path, points: &[EquityPoint]) -> Result<(), String> {
        timed_write("equity_csv", || reporting::write_equity_csv(path, points))
    }

    fn write_drawdown_csv(&self, path: &Path, points: &[DrawdownPoint]) -> Result<(), String> {
        timed_write("drawdown_csv", || reporting::write_drawdown_csv(path, points))
    }

    fn write_summary_json(&self, path: &Path, report: &RunReport<'_>) -> Result<(), String> {
        timed_write("summary_json", || reporting::write_summary_json(path, report))
    }

    fn write_summary_html(&self, path: &Path, report: &RunReport<'_>) -> Result<(), String> {
        timed_write("summary_html", || reporting::write_summary_html(path, report))
    }

    fn write_audit_jsonl(&self, path: &Path, events: &[AuditEvent]) -> Result<(), String> {
        timed_write("logs_jsonl", || reporting::write_audit_jsonl(path, events))
    }

    fn write_config_snapshot_toml(&self, path: &Path, contents: &str) -> Result<(), String> {
        timed_write("config_snapshot_toml", || {
            fs::write(path, contents).map_err(|err| {
                format!(
                    "failed to write config snapshot {}: {}",
                    path.display(),
                    err
                )
            })
        })
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct FilesystemArtifactReader;

impl FilesystemArtifactReader {
    pub fn new() -> Self {
        Self
    }
}

impl ArtifactReader for FilesystemArtifactReader {
    fn read_trades_csv(&self, path: &Path) -> Result<Vec<Trade>, String> {
        let start = Instant::now();
        let result = reporting::read_trades_csv(path);
        record_read_metrics("trades_csv", start, &result);
        result
    }

    fn read_equity_csv(&self, path: &Path) -> Result<Vec<EquityPoint>, String> {
        let start = Instant::now();
        let result = reporting::read_equity_csv(path);
        record_read_metrics("equity_csv", start, &result);
        result
    }

    fn read_config_snapshot_toml(&self, path: &Path) -> Result<Option<String>, String> {
        let start = Instant::now();
        if !path.exists() {
            record_read_metrics(
                "config_snapshot_toml",
                start,
                &Ok::<Option<String>, String>(None),
            );
            return Ok(None);
        }
        let result = fs::read_to_string(path)
            .map(Some)
            .map_err(|err| format!("failed to read config snapshot {}: {}", path.display(), err));
        record_read_metrics("config_snapshot_toml", start, &result);
        result
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }
}
