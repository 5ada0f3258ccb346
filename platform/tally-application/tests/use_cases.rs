use tally_application::config::{parse_config_str, Config};
use tally_domain::repositories::artifacts::{ArtifactReader, ArtifactWriter, RunReport};
use tally_domain::repositories::market_data::{MarketDataRepository, OhlcvQuery};
use tally_domain::repositories::signals::SignalRepository;
use tally_domain::services::audit::AuditEvent;
use tally_domain::services::ohlcv::DataQualityReport;
use tally_domain::value_objects::action::Action;
use tally_domain::value_objects::bar::Bar;
use tally_domain::value_objects::drawdown_point::DrawdownPoint;
use tally_domain::value_objects::equity_point::EquityPoint;
use tally_domain::value_objects::reason::TradeReason;
use tally_domain::value_objects::side::Side;
use tally_domain::value_objects::trade::Trade;
use std::cell::RefCell;
use std::path::{Path, PathBuf};

#[derive(Default)]
struct FakeMarketDataRepo {
    bars: Vec<Bar>,
    report: DataQualityReport,
}

impl MarketDataRepository for FakeMarketDataRepo {
    fn load_ohlcv(&self, _query: &OhlcvQuery) -> Result<(Vec<Bar>, DataQualityReport), String> {
        Ok((self.bars.clone(), self.report.clone()))
    }
}

#[derive(Default)]
struct FakeSignalRepo {
    actions: Vec<Action>,
    requested: RefCell<Vec<PathBuf>>,
}

impl SignalRepository for FakeSignalRepo {
    fn load_signals(&self, path: &Path) -> Result<Vec<Action>, String> {
        self.requested.borrow_mut().push(path.to_path_buf());
        Ok(self.actions.clone())
    }
}

#[derive(Default)]
struct RecordingWriter {
    ensured_dirs: RefCell<Vec<PathBuf>>,
    trades_written: RefCell<Option<usize>>,
    equity_written: RefCell<Option<Vec<EquityPoint>>>,
    drawdown_written: RefCell<Option<usize>>,
    summary_written: RefCell<Option<serde_json::Value>>,
    summary_html_written: RefCell<bool>,
    audit_written: RefCell<Option<Vec<AuditEvent>>>,
    config_snapshot: RefCell<Option<String>>,
}

impl ArtifactWriter for RecordingWriter {
    fn ensure_dir(&self, path: &Path) -> Result<(), String> {
        self.ensured_dirs.borrow_mut().push(path.to_path_buf());
        Ok(())
    }

    fn write_trades_csv(&self, _path: &Path, trades: &[Trade]) -> Result<(), String> {
        *self.trades_written.borrow_mut() = Some(trades.len());
        Ok(())
    }

    fn write_equity_csv(&self, _path: &Path, points: &[EquityPoint]) -> Result<(), String> {
        *self.equity_written.borrow_mut() = Some(points.to_vec());
        Ok(())
    }

    fn write_drawdown_csv(&self, _path: &Path, points: &[DrawdownPoint]) -> Result<(), String> {
        *self.drawdown_written.borrow_mut() = Some(points.len());
        Ok(())
    }

    fn write_summary_json(&self, _path: &Path, report: &RunReport<'_>) -> Result<(), String> {
        let json = serde_json::json!({
            "summary": report.summary,
            "monthly_returns": report.monthly_returns,
            "meta": report.meta,
            "config_snapshot": report.config_snapshot,
        });
        *self.summary_written.borrow_mut() = Some(json);
        Ok(())
    }

    fn write_summary_html(&self, _path: &Path, _report: &RunReport<'_>) -> Result<(), String> {
        *self.summary_html_written.borrow_mut() = true;
        Ok(())
    }

    fn write_audit_jsonl(&self, _path: &Path, events: &[AuditEvent]) -> Result<(), String> {
        *self.audit_written.borrow_mut() = Some(events.to_vec());
        Ok(())
    }

    fn write_config_snapshot_toml(&self, _path: &Path, contents: &str) -> Result<(), String> {
        *self.config_snapshot.borrow_mut() = Some(contents.to_string());
        Ok(())
    }
}

#[derive(Default)]
struct FakeReader {
    trades: Vec<Trade>,
    equity: Vec<EquityPoint>,
    config_toml: Option<String>,
}

impl ArtifactReader for FakeReader {
    fn read_trades_csv(&self, _path: &Path) -> Result<Vec<Trade>, String> {
        Ok(self.trades.clone())
    }

    fn read_equity_csv(&self, _path: &Path) -> Result<Vec<EquityPoint>, String> {
        Ok(self.equity.clone())
    }

    fn read_config_snapshot_toml(&self, _path: &Path) -> Result<Option<String>, String> {
        Ok(self.config_toml.clone())
    }

    fn exists(&self, _path: &Path) -> bool {
        true
    }
}

const BASE_TOML: &str = r#"
[run]
run_id = "test_run"
symbol = "NQ"
timeframe = "1h"
initial_capital = 1000.0

[data]
source = "synthetic"
seed = 1

[strategy]
kind = "signals_csv"
signals_csv = "signals.csv"

[risk]
position_size = 1.0

[paths]
out_dir = "runs/"

[report]
html = false
"#;

fn minimal_config() -> Config {
    parse_config_str(BASE_TOML).expect("base config")
}

fn hourly_bars(closes: &[f64]) -> Vec<Bar> {
    closes
        .iter()
        .enumerate()
        .map(|(i, close)| Bar {
            timestamp: 1_704_067_200 + (i as i64) * 3600,
            open: *close,
            high: *close,
            low: *close,
            close: *close,
            volume: 10.0,
        })
        .collect()
}

#[test]
fn run_backtest_writes_summary_and_snapshot() {
    let config = minimal_config();
    let market = FakeMarketDataRepo {
        bars: hourly_bars(&[100.0, 101.0, 102.0, 103.0, 104.0]),
        report: DataQualityReport::default(),
    };
    let signals = FakeSignalRepo {
        actions: vec![
            Action::Buy,
            Action::Hold,
            Action::Hold,
            Action::Hold,
            Action::Sell,
        ],
        ..FakeSignalRepo::default()
    };
    let writer = RecordingWriter::default();

    let out_dir = std::env::temp_dir().join("tally_app_tests");
    let run_dir = tally_application::backtesting::run_backtest(
        &config,
        BASE_TOML,
        Some(out_dir.clone()),
        &market,
        &signals,
        &writer,
    )
    .expect("run_backtest");

    assert!(run_dir.ends_with("test_run"));
    assert_eq!(writer.ensured_dirs.borrow().as_slice(), &[out_dir.join("test_run")]);
    assert_eq!(
        signals.requested.borrow().as_slice(),
        &[PathBuf::from("signals.csv")]
    );
    assert_eq!(writer.config_snapshot.borrow().as_deref(), Some(BASE_TOML));
    assert_eq!(*writer.trades_written.borrow(), Some(1));
    assert_eq!(*writer.drawdown_written.borrow(), Some(2));

    let equity = writer.equity_written.borrow();
    let equity = equity.as_ref().expect("equity written");
    assert_eq!(equity.len(), 2);
    assert_eq!(equity[0], EquityPoint::start(1000.0));
    assert_eq!(equity[1].equity, 1004.0);

    let summary_json = writer.summary_written.borrow();
    let json = summary_json.as_ref().expect("summary json written");
    assert_eq!(json["summary"]["totalTrades"], 1);
    assert_eq!(json["summary"]["totalPnL"], 4.0);
    assert_eq!(json["summary"]["finalEquity"], 1004.0);
    assert_eq!(json["meta"]["run_id"], "test_run");
    assert_eq!(json["meta"]["bars"], 5);
    assert_eq!(json["config_snapshot"]["strategy"]["kind"], "signals_csv");

    let audit = writer.audit_written.borrow();
    let audit = audit.as_ref().expect("audit written");
    assert!(audit.iter().any(|e| e.stage == "run" && e.action == "start"));
    assert!(audit.iter().any(|e| e.stage == "trade" && e.action == "Long"));
    assert!(audit
        .iter()
        .any(|e| e.stage == "summary" && e.action == "complete"));
    assert!(audit
        .windows(2)
        .all(|pair| pair[0].timestamp <= pair[1].timestamp));
    assert!(!*writer.summary_html_written.borrow());
}

#[test]
fn run_backtest_truncates_to_max_bars_before_matching_signals() {
    let mut config = minimal_config();
    config.data.max_bars = Some(3);
    let market = FakeMarketDataRepo {
        bars: hourly_bars(&[100.0, 101.0, 102.0, 103.0, 104.0]),
        report: DataQualityReport::default(),
    };
    let signals = FakeSignalRepo {
        actions: vec![Action::Buy, Action::Hold, Action::Hold],
        ..FakeSignalRepo::default()
    };
    let writer = RecordingWriter::default();

    let run = tally_application::backtesting::run_backtest_detailed(
        &config,
        BASE_TOML,
        Some(std::env::temp_dir()),
        &market,
        &signals,
        &writer,
    )
    .expect("run_backtest_detailed");

    assert_eq!(run.bars, 3);
    assert!(run.results.trades.is_empty());
    let open = run.results.open_position.as_ref().expect("still long");
    assert_eq!(open.side, Side::Long);
    assert_eq!(open.entry_price, 100.0);
    assert_eq!(run.results.summary.final_equity, 1000.0);
}

#[test]
fn run_backtest_rejects_signal_file_of_wrong_length() {
    let config = minimal_config();
    let market = FakeMarketDataRepo {
        bars: hourly_bars(&[100.0, 101.0, 102.0, 103.0, 104.0]),
        report: DataQualityReport::default(),
    };
    let signals = FakeSignalRepo {
        actions: vec![Action::Buy],
        ..FakeSignalRepo::default()
    };
    let writer = RecordingWriter::default();

    let err = tally_application::backtesting::run_backtest_detailed(
        &config,
        BASE_TOML,
        Some(std::env::temp_dir()),
        &market,
        &signals,
        &writer,
    )
    .err()
    .expect("5 bars with 1 signal must be rejected");

    assert!(err.contains("5 bars vs 1 signals"), "{err}");
    assert!(writer.ensured_dirs.borrow().is_empty());
    assert!(writer.trades_written.borrow().is_none());
}

#[test]
fn run_backtest_rejects_negative_stop_loss() {
    let mut config = minimal_config();
    config.risk.stop_loss_pct = -1.0;

    let market = FakeMarketDataRepo {
        bars: hourly_bars(&[10.0]),
        report: DataQualityReport::default(),
    };
    let signals = FakeSignalRepo::default();
    let writer = RecordingWriter::default();

    let err = tally_application::backtesting::run_backtest(
        &config,
        "",
        Some(std::env::temp_dir()),
        &market,
        &signals,
        &writer,
    )
    .expect_err("should fail");
    assert!(err.contains("stop_loss_pct"));
    assert!(writer.ensured_dirs.borrow().is_empty());
}

#[test]
fn validate_strict_fails_on_duplicates_but_tolerates_gaps() {
    let config = minimal_config();
    let gappy = FakeMarketDataRepo {
        bars: hourly_bars(&[1.0, 2.0]),
        report: DataQualityReport {
            gaps: 3,
            ..DataQualityReport::default()
        },
    };
    let json = tally_application::validation::validate(&config, true, &gappy)
        .expect("gaps are not fatal");
    assert_eq!(json["ohlcv"]["gaps"], 3);
    assert_eq!(json["ohlcv"]["rows"], 2);
    assert_eq!(json["timeframe"], "1hour");

    let duplicated = FakeMarketDataRepo {
        bars: Vec::new(),
        report: DataQualityReport {
            duplicates: 1,
            ..DataQualityReport::default()
        },
    };
    let err = tally_application::validation::validate(&config, true, &duplicated)
        .expect_err("strict should fail");
    assert!(err.contains("strict validation failed"));

    tally_application::validation::validate(&config, false, &duplicated)
        .expect("lenient mode only reports");
}

#[test]
fn validate_rejects_inverted_sma_windows_before_loading() {
    let mut config = minimal_config();
    config.strategy.kind = tally_application::config::StrategyChoice::SmaCrossover;
    config.strategy.sma_short = Some(30);
    config.strategy.sma_long = Some(10);
    let market = FakeMarketDataRepo::default();

    let err = tally_application::validation::validate(&config, false, &market)
        .expect_err("invalid windows");
    assert!(err.contains("sma_short"));
}

fn sample_trade(exit_timestamp: i64, pnl: f64) -> Trade {
    Trade {
        entry_timestamp: exit_timestamp - 3600,
        exit_timestamp,
        side: Side::Long,
        entry_price: 100.0,
        exit_price: 100.0 + pnl,
        quantity: 1.0,
        pnl,
        pnl_percent: pnl,
        duration: "1h 0m".to_string(),
        entry_reason: TradeReason::StrategySignal,
        exit_reason: TradeReason::StrategySignal,
    }
}

#[test]
fn generate_report_writes_html_when_enabled() {
    let config_toml = BASE_TOML.replace("html = false", "html = true");
    let reader = FakeReader {
        trades: vec![sample_trade(1_704_070_800, 10.0)],
        equity: Vec::new(),
        config_toml: Some(config_toml),
    };
    let writer = RecordingWriter::default();

    let tmp_dir = std::env::temp_dir().join("tally_report_test");
    let result = tally_application::reporting::generate_report(tmp_dir.as_path(), &reader, &writer)
        .expect("generate report");

    assert_eq!(result.run_id, "test_run");
    assert_eq!(result.initial_capital, 1000.0);
    assert_eq!(result.summary.final_equity, 1010.0);
    assert!(result.wrote_html);
    assert!(*writer.summary_html_written.borrow());
    assert!(writer.config_snapshot.borrow().is_none());
    let audit = writer.audit_written.borrow();
    assert!(audit.as_ref().map(|events| events.len()).unwrap_or(0) >= 2);
}

#[test]
fn generate_report_falls_back_to_equity_start_row() {
    let reader = FakeReader {
        trades: vec![sample_trade(1_704_070_800, -5.0)],
        equity: vec![
            EquityPoint::start(500.0),
            EquityPoint::at(1_704_070_800, 495.0),
        ],
        config_toml: None,
    };
    let writer = RecordingWriter::default();

    let tmp_dir = std::env::temp_dir().join("tally_report_fallback");
    let result = tally_application::reporting::generate_report(tmp_dir.as_path(), &reader, &writer)
        .expect("generate report");

    assert_eq!(result.run_id, "tally_report_fallback");
    assert_eq!(result.initial_capital, 500.0);
    assert_eq!(result.summary.final_equity, 495.0);
    assert!(!result.wrote_html);
    let summary_json = writer.summary_written.borrow();
    let json = summary_json.as_ref().expect("summary json written");
    assert!(json["meta"].is_null());
}
