use tally_application::config::{Config, DataSource};
use tally_domain::repositories::artifacts::{ArtifactReader, ArtifactWriter};
use tally_domain::repositories::market_data::MarketDataRepository;
use tally_domain::repositories::signals::SignalRepository;
use tally_domain::value_objects::timeframe::parse_timestamp;
use tally_infrastructure::artifacts::{FilesystemArtifactReader, FilesystemArtifactWriter};
use tally_infrastructure::market_data::ohlcv::CsvMarketDataRepository;
use tally_infrastructure::market_data::synthetic::{SyntheticMarketDataRepository, SyntheticParams};
use tally_infrastructure::signals::CsvSignalRepository;

/// Seed used for synthetic data when the config does not pin one.
pub const DEFAULT_SYNTHETIC_SEED: u64 = 42;

pub struct EngineDeps {
    pub market_data: Box<dyn MarketDataRepository>,
    pub signals_repo: Box<dyn SignalRepository>,
    pub artifacts: Box<dyn ArtifactWriter>,
}

pub struct ValidateDeps {
    pub market_data: Box<dyn MarketDataRepository>,
}

pub struct ReportingDeps {
    pub reader: Box<dyn ArtifactReader>,
    pub writer: Box<dyn ArtifactWriter>,
}

/// Sweep workers share these across threads, so they stay concrete.
pub struct SweepDeps {
    pub market_data: Box<dyn MarketDataRepository>,
    pub signals_repo: CsvSignalRepository,
    pub artifacts: FilesystemArtifactWriter,
}

pub fn build_engine_deps(config: &Config) -> Result<EngineDeps, String> {
    Ok(EngineDeps {
        market_data: build_market_data_repo(config)?,
        signals_repo: Box::new(CsvSignalRepository::new()),
        artifacts: Box::new(FilesystemArtifactWriter::new()),
    })
}

pub fn build_validate_deps(config: &Config) -> Result<ValidateDeps, String> {
    Ok(ValidateDeps {
        market_data: build_market_data_repo(config)?,
    })
}

pub fn build_reporting_deps() -> ReportingDeps {
    ReportingDeps {
        reader: Box::new(FilesystemArtifactReader::new()),
        writer: Box::new(FilesystemArtifactWriter::new()),
    }
}

pub fn build_sweep_deps(base_config: &Config) -> Result<SweepDeps, String> {
    Ok(SweepDeps {
        market_data: build_market_data_repo(base_config)?,
        signals_repo: CsvSignalRepository::new(),
        artifacts: FilesystemArtifactWriter::new(),
    })
}

fn build_market_data_repo(config: &Config) -> Result<Box<dyn MarketDataRepository>, String> {
    match config.data.source {
        DataSource::Csv => {
            let path = config
                .data
                .ohlcv_csv
                .as_deref()
                .filter(|path| !path.trim().is_empty())
                .ok_or_else(|| "data.source = \"csv\" requires data.ohlcv_csv".to_string())?;
            Ok(Box::new(CsvMarketDataRepository::new(path)))
        }
        DataSource::Synthetic => {
            let params = synthetic_params(config)?;
            let seed = config.data.seed.unwrap_or(DEFAULT_SYNTHETIC_SEED);
            Ok(Box::new(SyntheticMarketDataRepository::new(params, seed)))
        }
    }
}

fn synthetic_params(config: &Config) -> Result<SyntheticParams, String> {
    let defaults = SyntheticParams::default();
    let start_timestamp = match config.data.start.as_deref() {
        Some(raw) => parse_timestamp(raw).map_err(|err| format!("invalid data.start: {err}"))?,
        None => defaults.start_timestamp,
    };
    Ok(SyntheticParams {
        bars: config.data.synthetic_bars.unwrap_or(defaults.bars),
        start_timestamp,
        base_price: config.data.base_price.unwrap_or(defaults.base_price),
        volatility: config.data.volatility.unwrap_or(defaults.volatility),
        ..defaults
    })
}

#[cfg(test)]
mod tests {
    use super::{synthetic_params, DEFAULT_SYNTHETIC_SEED};
    use tally_application::config::parse_config_str;

    const SYNTHETIC: &str = r#"
[run]
run_id = "syn"
symbol = "NQ"
timeframe = "1h"
initial_capital = 10000.0

[data]
source = "synthetic"
synthetic_bars = 48
start = "2024-03-01T00:00:00Z"
base_price = 100.0

[strategy]
kind = "hold"

[risk]
position_size = 1.0

[paths]
out_dir = "runs"
"#;

    #[test]
    fn synthetic_params_take_config_overrides() {
        let config = parse_config_str(SYNTHETIC).expect("config");
        let params = synthetic_params(&config).expect("params");
        assert_eq!(params.bars, 48);
        assert_eq!(params.start_timestamp, 1_709_251_200);
        assert_eq!(params.base_price, 100.0);
        assert_eq!(params.volatility, 0.02);
        assert_eq!(DEFAULT_SYNTHETIC_SEED, 42);
    }

    #[test]
    fn synthetic_params_reject_bad_start() {
        let raw = SYNTHETIC.replace("2024-03-01T00:00:00Z", "yesterday");
        let config = parse_config_str(&raw).expect("config");
        let err = synthetic_params(&config).expect_err("bad start");
        assert!(err.contains("data.start"));
    }
}
