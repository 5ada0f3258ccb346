use tally_domain::entities::risk::SimulationConfig;
use tally_domain::repositories::artifacts::{ArtifactReader, ArtifactWriter};
use tally_domain::services::analytics::equity::build_equity_curve;
use tally_domain::services::engine::simulator::simulate;
use tally_domain::value_objects::action::Action;
use tally_domain::value_objects::bar::Bar;
use tally_domain::value_objects::reason::TradeReason;
use tally_infrastructure::artifacts::{FilesystemArtifactReader, FilesystemArtifactWriter};
use std::path::PathBuf;

fn test_temp_dir(prefix: &str) -> PathBuf {
    let unique = format!(
        "{}_{}_{}",
        prefix,
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .expect("clock before UNIX_EPOCH")
            .as_nanos()
    );
    std::env::temp_dir().join(unique)
}

fn bar(timestamp: i64, close: f64, low: f64, high: f64) -> Bar {
    Bar {
        timestamp,
        open: close,
        high,
        low,
        close,
        volume: 1.0,
    }
}

#[test]
fn trades_and_equity_survive_a_filesystem_round_trip() {
    let dir = test_temp_dir("tally_artifacts");
    let writer = FilesystemArtifactWriter::new();
    let reader = FilesystemArtifactReader::new();
    writer.ensure_dir(&dir).expect("dir");

    let bars = vec![
        bar(1_704_067_200, 100.0, 100.0, 100.0),
        bar(1_704_070_800, 101.0, 100.0, 102.0),
        bar(1_704_074_400, 102.0, 90.0, 103.0),
        bar(1_704_078_000, 99.0, 99.0, 99.0),
    ];
    let signals = vec![Action::Buy, Action::Sell, Action::Buy, Action::Hold];
    let config = SimulationConfig {
        position_size: 2.0,
        stop_loss_pct: 5.0,
        take_profit_pct: 0.0,
    };
    let trades = simulate(&bars, &signals, config).expect("simulate");
    assert_eq!(trades.len(), 2);
    assert_eq!(trades[1].exit_reason, TradeReason::StopLoss);

    let trades_path = dir.join("trades.csv");
    writer.write_trades_csv(&trades_path, &trades).expect("write trades");
    assert!(reader.exists(&trades_path));
    assert_eq!(reader.read_trades_csv(&trades_path).expect("read trades"), trades);

    let equity = build_equity_curve(&trades, 1000.0);
    let equity_path = dir.join("equity.csv");
    writer.write_equity_csv(&equity_path, &equity).expect("write equity");
    let raw = std::fs::read_to_string(&equity_path).expect("raw equity");
    assert!(raw.starts_with("label,timestamp_utc,equity\nStart,,1000\n"), "{raw}");
    assert_eq!(reader.read_equity_csv(&equity_path).expect("read equity"), equity);

    let missing = dir.join("config_snapshot.toml");
    assert_eq!(reader.read_config_snapshot_toml(&missing).expect("read"), None);
    writer
        .write_config_snapshot_toml(&missing, "[run]\n")
        .expect("write snapshot");
    assert_eq!(
        reader.read_config_snapshot_toml(&missing).expect("read"),
        Some("[run]\n".to_string())
    );

    let _ = std::fs::remove_dir_all(&dir);
}
