use crate::backtesting::run_backtest_detailed;
use crate::config::Config;
use crate::shared::ohlcv_query;
use crate::validation::check_config;
use tally_domain::entities::summary::Summary;
use tally_domain::repositories::artifacts::ArtifactWriter;
use tally_domain::repositories::market_data::{MarketDataRepository, OhlcvQuery};
use tally_domain::repositories::signals::SignalRepository;
use tally_domain::services::ohlcv::DataQualityReport;
use tally_domain::value_objects::bar::Bar;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::mpsc;
use std::time::Instant;
use tracing::info_span;

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SweepFile {
    pub base: SweepBase,
    pub sweep: SweepMeta,
    #[serde(default)]
    pub params: Vec<SweepParam>,
    pub leaderboard: Option<LeaderboardConfig>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SweepBase {
    /// Resolved relative to the sweep file.
    pub config: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SweepMeta {
    pub id: String,
    pub parallelism: Option<usize>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SweepParam {
    pub path: String,
    pub values: Vec<toml::Value>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LeaderboardConfig {
    pub sort_by: Option<String>,
    pub descending: Option<bool>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SweepRunEntry {
    pub run_id: String,
    pub params: BTreeMap<String, toml::Value>,
    pub status: String,
    pub error: Option<String>,
    pub metrics: Option<RunMetrics>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RunMetrics {
    pub bars_processed: u64,
    pub trades: u64,
    pub win_rate: f64,
    pub profit_factor: f64,
    pub total_pnl: f64,
    pub sharpe: f64,
    pub sortino: f64,
    pub max_drawdown: f64,
    pub final_equity: f64,
    pub total_return_percent: f64,
}

impl RunMetrics {
    pub fn from_summary(summary: &Summary, bars_processed: usize) -> Self {
        Self {
            bars_processed: bars_processed as u64,
            trades: summary.total_trades as u64,
            win_rate: summary.win_rate,
            profit_factor: summary.profit_factor,
            total_pnl: summary.total_pnl,
            sharpe: summary.sharpe_ratio,
            sortino: summary.sortino_ratio,
            max_drawdown: summary.max_drawdown,
            final_equity: summary.final_equity,
            total_return_percent: summary.total_return_percent,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SweepResult {
    pub sweep_id: String,
    pub sweep_dir: PathBuf,
    pub base_config: String,
    pub runs: Vec<SweepRunEntry>,
}

impl SweepResult {
    pub fn ok_runs(&self) -> usize {
        self.runs.iter().filter(|run| run.status == "ok").count()
    }
}

pub fn load_sweep_file(sweep_path: &Path) -> Result<SweepFile, String> {
    let raw = std::fs::read_to_string(sweep_path).map_err(|err| {
        format!(
            "failed to read sweep config {}: {err}",
            sweep_path.display()
        )
    })?;
    toml::from_str(&raw)
        .map_err(|err| format!("failed to parse sweep TOML {}: {err}", sweep_path.display()))
}

pub fn run_sweep(
    sweep_path: &Path,
    market_data: &dyn MarketDataRepository,
    signals_repo: &(dyn SignalRepository + Sync),
    artifacts: &(dyn ArtifactWriter + Sync),
) -> Result<SweepResult, String> {
    let sweep = load_sweep_file(sweep_path)?;
    validate_param_paths(&sweep.params)?;

    let _span = info_span!(
        "run_sweep",
        sweep_id = %sweep.sweep.id,
        params = sweep.params.len()
    )
    .entered();

    let base_config_path = resolve_base_config_path(sweep_path, &sweep.base.config);
    let (base_config, base_toml_str) =
        crate::config::load_config_with_source(base_config_path.as_path())?;
    let base_toml_value: toml::Value = toml::from_str(&base_toml_str)
        .map_err(|err| format!("failed to parse base config TOML as value: {err}"))?;

    let out_dir = PathBuf::from(&base_config.paths.out_dir);
    let sweep_dir = out_dir.join("sweeps").join(&sweep.sweep.id);
    artifacts.ensure_dir(&sweep_dir)?;

    let stage_start = Instant::now();
    let (bars, report) = market_data.load_ohlcv(&ohlcv_query(&base_config)?)?;
    metrics::histogram!("tally.sweep.load_ohlcv_ms")
        .record(stage_start.elapsed().as_millis() as f64);
    let in_memory_market = InMemoryMarketDataRepository { bars, report };

    let grid = expand_grid(&sweep.params);
    let mut entries: Vec<Option<SweepRunEntry>> = vec![None; grid.len()];
    let mut plans: Vec<SweepRunPlan> = Vec::with_capacity(grid.len());

    for (order_idx, assignment) in grid.iter().enumerate() {
        let mut toml_value = base_toml_value.clone();
        apply_assignment(&mut toml_value, assignment)?;

        let run_id = format!("{}__{}", sweep.sweep.id, assignment_hash(assignment));
        set_run_id(&mut toml_value, &run_id)?;

        let config_toml = toml::to_string_pretty(&toml_value)
            .map_err(|err| format!("failed to serialize sweep config TOML: {err}"))?;
        let config: Config = match toml::from_str(&config_toml) {
            Ok(config) => config,
            Err(err) => {
                entries[order_idx] = Some(SweepRunEntry {
                    run_id,
                    params: assignment.clone(),
                    status: "error".to_string(),
                    error: Some(format!("generated config is invalid: {err}")),
                    metrics: None,
                });
                continue;
            }
        };

        plans.push(SweepRunPlan {
            order_idx,
            run_id,
            params: assignment.clone(),
            config,
            config_toml,
        });
    }

    let parallelism = normalize_parallelism(sweep.sweep.parallelism);
    tracing::info!(
        runs = grid.len(),
        planned = plans.len(),
        parallelism,
        "sweep grid expanded"
    );

    let stage_start = Instant::now();
    let mut executed = if parallelism <= 1 || plans.len() <= 1 {
        execute_plans_serial(&plans, &in_memory_market, signals_repo, artifacts)?
    } else {
        execute_plans_parallel(
            &plans,
            parallelism,
            &in_memory_market,
            signals_repo,
            artifacts,
        )?
    };
    metrics::histogram!("tally.sweep.execute_ms")
        .record(stage_start.elapsed().as_millis() as f64);

    executed.sort_by_key(|(order_idx, _)| *order_idx);
    for (order_idx, entry) in executed {
        entries[order_idx] = Some(entry);
    }

    let mut runs = Vec::with_capacity(entries.len());
    for entry in entries {
        runs.push(entry.ok_or_else(|| {
            format!(
                "internal sweep error: missing run entry (sweep '{}')",
                sweep.sweep.id
            )
        })?);
    }

    let result = SweepResult {
        sweep_id: sweep.sweep.id.clone(),
        sweep_dir: sweep_dir.clone(),
        base_config: base_config_path.display().to_string(),
        runs,
    };
    metrics::gauge!("tally.sweep.runs").set(result.runs.len() as f64);
    metrics::gauge!("tally.sweep.ok_runs").set(result.ok_runs() as f64);

    write_manifest(&sweep_dir, &result)?;
    write_results_csv(&sweep_dir, &result)?;
    write_leaderboard_csv(&sweep_dir, &result, sweep.leaderboard.as_ref())?;

    tracing::info!(
        runs = result.runs.len(),
        ok = result.ok_runs(),
        sweep_dir = %sweep_dir.display(),
        "sweep complete"
    );
    Ok(result)
}

#[derive(Debug, Clone)]
struct SweepRunPlan {
    order_idx: usize,
    run_id: String,
    params: BTreeMap<String, toml::Value>,
    config: Config,
    config_toml: String,
}

enum WorkerMessage {
    Entry {
        order_idx: usize,
        entry: SweepRunEntry,
    },
    Fatal(String),
}

fn normalize_parallelism(value: Option<usize>) -> usize {
    value.unwrap_or(1).max(1)
}

fn execute_plans_serial(
    plans: &[SweepRunPlan],
    market_data: &(dyn MarketDataRepository + Sync),
    signals_repo: &(dyn SignalRepository + Sync),
    artifacts: &(dyn ArtifactWriter + Sync),
) -> Result<Vec<(usize, SweepRunEntry)>, String> {
    Ok(plans
        .iter()
        .map(|plan| {
            (
                plan.order_idx,
                execute_run_plan(plan, market_data, signals_repo, artifacts),
            )
        })
        .collect())
}

fn execute_plans_parallel(
    plans: &[SweepRunPlan],
    parallelism: usize,
    market_data: &(dyn MarketDataRepository + Sync),
    signals_repo: &(dyn SignalRepository + Sync),
    artifacts: &(dyn ArtifactWriter + Sync),
) -> Result<Vec<(usize, SweepRunEntry)>, String> {
    let worker_count = parallelism.max(1).min(plans.len());
    let next_index = AtomicUsize::new(0);
    let aborted = AtomicBool::new(false);
    let (tx, rx) = mpsc::channel::<WorkerMessage>();

    std::thread::scope(|scope| {
        for _ in 0..worker_count {
            let tx = tx.clone();
            let next_index_ref = &next_index;
            let aborted_ref = &aborted;
            scope.spawn(move || loop {
                if aborted_ref.load(Ordering::Relaxed) {
                    break;
                }

                let plan_idx = next_index_ref.fetch_add(1, Ordering::Relaxed);
                if plan_idx >= plans.len() {
                    break;
                }

                let plan = &plans[plan_idx];
                let entry = execute_run_plan(plan, market_data, signals_repo, artifacts);
                if tx
                    .send(WorkerMessage::Entry {
                        order_idx: plan.order_idx,
                        entry,
                    })
                    .is_err()
                {
                    aborted_ref.store(true, Ordering::Relaxed);
                    let _ = tx.send(WorkerMessage::Fatal(
                        "sweep result channel closed".to_string(),
                    ));
                    break;
                }
            });
        }

        drop(tx);

        let mut entries: Vec<(usize, SweepRunEntry)> = Vec::with_capacity(plans.len());
        let mut fatal_error: Option<String> = None;
        while let Ok(message) = rx.recv() {
            match message {
                WorkerMessage::Entry { order_idx, entry } => {
                    if fatal_error.is_none() {
                        entries.push((order_idx, entry));
                    }
                }
                WorkerMessage::Fatal(err) => {
                    if fatal_error.is_none() {
                        fatal_error = Some(err);
                    }
                }
            }
        }

        if let Some(err) = fatal_error {
            return Err(err);
        }
        if entries.len() != plans.len() {
            return Err(format!(
                "internal sweep error: expected {} results, got {}",
                plans.len(),
                entries.len()
            ));
        }

        Ok(entries)
    })
}

/// A failing grid point becomes an `error` entry; it never aborts the sweep.
fn execute_run_plan(
    plan: &SweepRunPlan,
    market_data: &(dyn MarketDataRepository + Sync),
    signals_repo: &(dyn SignalRepository + Sync),
    artifacts: &(dyn ArtifactWriter + Sync),
) -> SweepRunEntry {
    let check = check_config(&plan.config);
    let result = if check.is_ok() {
        run_backtest_detailed(
            &plan.config,
            &plan.config_toml,
            None,
            market_data,
            signals_repo,
            artifacts,
        )
    } else {
        Err(format!("invalid config: {}", check.errors.join("; ")))
    };

    match result {
        Ok(run) => SweepRunEntry {
            run_id: plan.run_id.clone(),
            params: plan.params.clone(),
            status: "ok".to_string(),
            error: None,
            metrics: Some(RunMetrics::from_summary(&run.results.summary, run.bars)),
        },
        Err(err) => {
            tracing::warn!(run_id = %plan.run_id, error = %err, "sweep run failed");
            SweepRunEntry {
                run_id: plan.run_id.clone(),
                params: plan.params.clone(),
                status: "error".to_string(),
                error: Some(err),
                metrics: None,
            }
        }
    }
}

pub fn resolve_base_config_path(sweep_path: &Path, base: &str) -> PathBuf {
    let p = PathBuf::from(base);
    if p.is_absolute() {
        p
    } else {
        sweep_path
            .parent()
            .unwrap_or_else(|| Path::new("."))
            .join(p)
    }
}

/// Bars are loaded once per sweep, so nothing that shapes the series may vary.
fn validate_param_paths(params: &[SweepParam]) -> Result<(), String> {
    for p in params {
        let path = p.path.trim();
        if path.is_empty() {
            return Err("sweep param path cannot be empty".to_string());
        }
        let forbidden_prefixes = ["run.run_id", "run.symbol", "run.timeframe", "data.", "paths.out_dir"];
        if forbidden_prefixes.iter().any(|pre| path.starts_with(pre)) {
            return Err(format!("sweep param path not allowed: {}", p.path));
        }
        if p.values.is_empty() {
            return Err(format!("sweep param has no values: {}", p.path));
        }
    }
    Ok(())
}

pub fn expand_grid(params: &[SweepParam]) -> Vec<BTreeMap<String, toml::Value>> {
    let mut out: Vec<BTreeMap<String, toml::Value>> = vec![BTreeMap::new()];
    for p in params {
        let mut next: Vec<BTreeMap<String, toml::Value>> =
            Vec::with_capacity(out.len() * p.values.len());
        for base in &out {
            for v in &p.values {
                let mut m = base.clone();
                m.insert(p.path.trim().to_string(), v.clone());
                next.push(m);
            }
        }
        out = next;
    }
    out
}

pub fn assignment_hash(assignment: &BTreeMap<String, toml::Value>) -> String {
    let canonical = serde_json::to_string(assignment)
        .unwrap_or_else(|_| "{\"error\":\"assignment\"}".to_string());
    let mut hasher = Sha256::new();
    hasher.update(canonical.as_bytes());
    let bytes = hasher.finalize();
    to_hex_short(&bytes[..], 12)
}

fn to_hex_short(bytes: &[u8], chars: usize) -> String {
    const HEX: &[u8; 16] = b"0123456789abcdef";
    let mut out = String::with_capacity(chars);
    for b in bytes {
        for nibble in [b >> 4, b & 0x0f] {
            if out.len() >= chars {
                return out;
            }
            out.push(HEX[nibble as usize] as char);
        }
    }
    out
}

fn set_run_id(root: &mut toml::Value, run_id: &str) -> Result<(), String> {
    set_path_value(root, "run.run_id", toml::Value::String(run_id.to_string()))
}

fn apply_assignment(
    root: &mut toml::Value,
    assignment: &BTreeMap<String, toml::Value>,
) -> Result<(), String> {
    for (path, value) in assignment {
        set_path_value(root, path, value.clone())?;
    }
    Ok(())
}

/// Writes `value` at a dotted path. Intermediate tables must exist; the
/// final key is created if it is missing, so optional fields can be swept.
fn set_path_value(root: &mut toml::Value, path: &str, value: toml::Value) -> Result<(), String> {
    let parts: Vec<&str> = path
        .split('.')
        .map(|p| p.trim())
        .filter(|p| !p.is_empty())
        .collect();
    let Some((last, parents)) = parts.split_last() else {
        return Err("empty path".to_string());
    };
    let mut cur = root;
    for key in parents {
        cur = cur
            .get_mut(*key)
            .ok_or_else(|| format!("path not found: {}", path))?;
        if !cur.is_table() {
            return Err(format!("path is not a table: {}", path));
        }
    }
    let table = cur
        .as_table_mut()
        .ok_or_else(|| format!("path is not a table: {}", path))?;
    table.insert((*last).to_string(), value);
    Ok(())
}

fn write_manifest(dir: &Path, result: &SweepResult) -> Result<(), String> {
    let path = dir.join("manifest.json");
    let json = serde_json::to_string_pretty(result)
        .map_err(|err| format!("failed to serialize manifest: {err}"))?;
    std::fs::write(&path, json)
        .map_err(|err| format!("failed to write {}: {err}", path.display()))
}

const METRIC_COLUMNS: [&str; 10] = [
    "bars_processed",
    "trades",
    "win_rate",
    "profit_factor",
    "total_pnl",
    "sharpe",
    "sortino",
    "max_drawdown",
    "final_equity",
    "total_return_percent",
];

fn metric_cells(m: &RunMetrics) -> Vec<String> {
    vec![
        m.bars_processed.to_string(),
        m.trades.to_string(),
        m.win_rate.to_string(),
        m.profit_factor.to_string(),
        m.total_pnl.to_string(),
        m.sharpe.to_string(),
        m.sortino.to_string(),
        m.max_drawdown.to_string(),
        m.final_equity.to_string(),
        m.total_return_percent.to_string(),
    ]
}

fn params_cell(params: &BTreeMap<String, toml::Value>) -> String {
    params
        .iter()
        .map(|(path, value)| format!("{path}={value}"))
        .collect::<Vec<_>>()
        .join(";")
}

fn write_results_csv(dir: &Path, result: &SweepResult) -> Result<(), String> {
    let path = dir.join("results.csv");
    let mut wtr = csv::Writer::from_path(&path)
        .map_err(|err| format!("failed to create {}: {err}", path.display()))?;
    let mut header = vec!["run_id", "params", "status"];
    header.extend(METRIC_COLUMNS);
    header.push("error");
    wtr.write_record(&header)
        .map_err(|err| format!("failed to write results header: {err}"))?;

    for r in &result.runs {
        let mut record = vec![r.run_id.clone(), params_cell(&r.params), r.status.clone()];
        match &r.metrics {
            Some(m) => record.extend(metric_cells(m)),
            None => record.extend(METRIC_COLUMNS.iter().map(|_| String::new())),
        }
        record.push(r.error.clone().unwrap_or_default());
        wtr.write_record(record)
            .map_err(|err| format!("failed to write results row: {err}"))?;
    }
    wtr.flush()
        .map_err(|err| format!("failed to flush {}: {err}", path.display()))
}

/// Successful runs ranked by one metric; `sharpe` descending unless configured.
pub fn leaderboard<'a>(
    result: &'a SweepResult,
    cfg: Option<&LeaderboardConfig>,
) -> Vec<(&'a SweepRunEntry, RunMetrics)> {
    let sort_by = cfg
        .and_then(|c| c.sort_by.as_deref())
        .unwrap_or("sharpe")
        .trim()
        .to_lowercase();
    let descending = cfg.and_then(|c| c.descending).unwrap_or(true);

    let mut rows: Vec<(&SweepRunEntry, RunMetrics)> = result
        .runs
        .iter()
        .filter(|r| r.status == "ok")
        .filter_map(|r| r.metrics.map(|m| (r, m)))
        .collect();
    rows.sort_by(|(_, a), (_, b)| {
        let av = metric_value(a, &sort_by);
        let bv = metric_value(b, &sort_by);
        let ord = bv.partial_cmp(&av).unwrap_or(std::cmp::Ordering::Equal);
        if descending {
            ord
        } else {
            ord.reverse()
        }
    });
    rows
}

fn write_leaderboard_csv(
    dir: &Path,
    result: &SweepResult,
    cfg: Option<&LeaderboardConfig>,
) -> Result<(), String> {
    let rows = leaderboard(result, cfg);

    let path = dir.join("leaderboard.csv");
    let mut wtr = csv::Writer::from_path(&path)
        .map_err(|err| format!("failed to create {}: {err}", path.display()))?;
    let mut header = vec!["rank", "run_id", "params"];
    header.extend(METRIC_COLUMNS);
    wtr.write_record(&header)
        .map_err(|err| format!("failed to write leaderboard header: {err}"))?;

    for (idx, (r, m)) in rows.iter().enumerate() {
        let mut record = vec![(idx + 1).to_string(), r.run_id.clone(), params_cell(&r.params)];
        record.extend(metric_cells(m));
        wtr.write_record(record)
            .map_err(|err| format!("failed to write leaderboard row: {err}"))?;
    }
    wtr.flush()
        .map_err(|err| format!("failed to flush {}: {err}", path.display()))
}

fn metric_value(m: &RunMetrics, key: &str) -> f64 {
    match key {
        "total_pnl" | "net_profit" | "pnl" => m.total_pnl,
        "max_drawdown" | "max_dd" => m.max_drawdown,
        "trades" => m.trades as f64,
        "bars_processed" => m.bars_processed as f64,
        "win_rate" => m.win_rate,
        "profit_factor" => m.profit_factor,
        "sortino" => m.sortino,
        "final_equity" => m.final_equity,
        "total_return_percent" | "return" => m.total_return_percent,
        _ => m.sharpe,
    }
}

#[derive(Default)]
struct InMemoryMarketDataRepository {
    bars: Vec<Bar>,
    report: DataQualityReport,
}

impl MarketDataRepository for InMemoryMarketDataRepository {
    fn load_ohlcv(&self, _query: &OhlcvQuery) -> Result<(Vec<Bar>, DataQualityReport), String> {
        Ok((self.bars.clone(), self.report.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn int(v: i64) -> toml::Value {
        toml::Value::Integer(v)
    }

    #[test]
    fn expand_grid_is_deterministic() {
        let params = vec![
            SweepParam {
                path: "strategy.sma_short".to_string(),
                values: vec![int(1), int(2)],
            },
            SweepParam {
                path: "strategy.sma_long".to_string(),
                values: vec![int(10), int(20)],
            },
        ];
        let grid = expand_grid(&params);
        assert_eq!(grid.len(), 4);
        assert_eq!(grid[0]["strategy.sma_short"].as_integer(), Some(1));
        assert_eq!(grid[0]["strategy.sma_long"].as_integer(), Some(10));
        assert_eq!(grid[3]["strategy.sma_short"].as_integer(), Some(2));
        assert_eq!(grid[3]["strategy.sma_long"].as_integer(), Some(20));
    }

    #[test]
    fn expand_grid_without_params_is_single_base_run() {
        let grid = expand_grid(&[]);
        assert_eq!(grid.len(), 1);
        assert!(grid[0].is_empty());
    }

    #[test]
    fn assignment_hash_is_stable_and_short() {
        let mut a = BTreeMap::new();
        a.insert("risk.stop_loss_pct".to_string(), toml::Value::Float(1.0));
        let first = assignment_hash(&a);
        assert_eq!(first.len(), 12);
        assert_eq!(first, assignment_hash(&a.clone()));

        a.insert("risk.stop_loss_pct".to_string(), toml::Value::Float(2.0));
        assert_ne!(first, assignment_hash(&a));
    }

    #[test]
    fn set_path_value_requires_existing_tables() {
        let mut v: toml::Value = toml::from_str("[a]\nb=1\n").unwrap();
        let err = set_path_value(&mut v, "x.c", int(2)).unwrap_err();
        assert!(err.contains("path not found"));

        set_path_value(&mut v, "a.c", int(2)).expect("new leaf");
        assert_eq!(v["a"]["c"].as_integer(), Some(2));

        let err = set_path_value(&mut v, "a.b.c", int(3)).unwrap_err();
        assert!(err.contains("not a table"));
    }

    #[test]
    fn rejects_series_shaping_params() {
        for path in ["run.symbol", "data.max_bars", "paths.out_dir", "run.run_id"] {
            let params = vec![SweepParam {
                path: path.to_string(),
                values: vec![int(1)],
            }];
            assert!(validate_param_paths(&params).is_err(), "{path}");
        }
        let empty = vec![SweepParam {
            path: "risk.stop_loss_pct".to_string(),
            values: Vec::new(),
        }];
        assert!(validate_param_paths(&empty).is_err());
    }

    #[test]
    fn normalize_parallelism_guards_invalid_values() {
        assert_eq!(normalize_parallelism(None), 1);
        assert_eq!(normalize_parallelism(Some(0)), 1);
        assert_eq!(normalize_parallelism(Some(4)), 4);
    }

    fn entry(run_id: &str, sharpe: f64, total_pnl: f64) -> SweepRunEntry {
        SweepRunEntry {
            run_id: run_id.to_string(),
            params: BTreeMap::new(),
            status: "ok".to_string(),
            error: None,
            metrics: Some(RunMetrics {
                bars_processed: 10,
                trades: 1,
                win_rate: 100.0,
                profit_factor: 0.0,
                total_pnl,
                sharpe,
                sortino: 0.0,
                max_drawdown: 0.0,
                final_equity: 0.0,
                total_return_percent: 0.0,
            }),
        }
    }

    #[test]
    fn leaderboard_sorts_by_metric_and_skips_errors() {
        let mut failed = entry("failed", 99.0, 99.0);
        failed.status = "error".to_string();
        failed.metrics = None;
        let result = SweepResult {
            sweep_id: "s".to_string(),
            sweep_dir: PathBuf::from("unused"),
            base_config: "base.toml".to_string(),
            runs: vec![entry("a", 0.5, 30.0), failed, entry("b", 1.5, 10.0)],
        };

        let by_sharpe: Vec<&str> = leaderboard(&result, None)
            .iter()
            .map(|(r, _)| r.run_id.as_str())
            .collect();
        assert_eq!(by_sharpe, vec!["b", "a"]);

        let cfg = LeaderboardConfig {
            sort_by: Some("total_pnl".to_string()),
            descending: Some(false),
        };
        let by_pnl_asc: Vec<&str> = leaderboard(&result, Some(&cfg))
            .iter()
            .map(|(r, _)| r.run_id.as_str())
            .collect();
        assert_eq!(by_pnl_asc, vec!["b", "a"]);
    }
}
