use crate::entities::summary::{MonthlyReturn, Summary};
use crate::services::audit::AuditEvent;
use crate::value_objects::drawdown_point::DrawdownPoint;
use crate::value_objects::equity_point::EquityPoint;
use crate::value_objects::trade::Trade;
use std::path::Path;

/// What goes into `summary.json` and `summary.html`.
#[derive(Debug, Clone, Copy)]
pub struct RunReport<'a> {
    pub summary: &'a Summary,
    pub monthly_returns: &'a [MonthlyReturn],
    pub meta: Option<&'a serde_json::Value>,
    pub config_snapshot: Option<&'a serde_json::Value>,
}

pub trait ArtifactWriter {
    fn ensure_dir(&self, path: &Path) -> Result<(), String>;
    fn write_trades_csv(&self, path: &Path, trades: &[Trade]) -> Result<(), String>;
    fn write_equity_csv(&self, path: &Path, points: &[EquityPoint]) -> Result<(), String>;
    fn write_drawdown_csv(&self, path: &Path, points: &[DrawdownPoint]) -> Result<(), String>;
    fn write_summary_json(&self, path: &Path, report: &RunReport<'_>) -> Result<(), String>;
    fn write_summary_html(&self, path: &Path, report: &RunReport<'_>) -> Result<(), String>;
    fn write_audit_jsonl(&self, path: &Path, events: &[AuditEvent]) -> Result<(), String>;
    fn write_config_snapshot_toml(&self, path: &Path, contents: &str) -> Result<(), String>;
}

pub trait ArtifactReader {
    fn read_trades_csv(&self, path: &Path) -> Result<Vec<Trade>, String>;
    fn read_equity_csv(&self, path: &Path) -> Result<Vec<EquityPoint>, String>;
    fn read_config_snapshot_toml(&self, path: &Path) -> Result<Option<String>, String>;
    fn exists(&self, path: &Path) -> bool;
}
