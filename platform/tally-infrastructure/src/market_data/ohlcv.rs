use tally_domain::repositories::market_data::{MarketDataRepository, OhlcvQuery};
use tally_domain::services::ohlcv::{data_quality_from_bars, DataQualityReport};
use tally_domain::value_objects::bar::Bar;
use tally_domain::value_objects::timeframe::parse_timestamp;
use serde::Deserialize;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::time::Instant;

#[derive(Debug, Deserialize)]
pub struct OhlcvRecord {
    pub timestamp_utc: String,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

/// Rows come back in file order. Duplicates, disorder and bad closes are
/// only reported; the caller decides whether they are fatal.
pub fn load_csv_with_step(
    path: &Path,
    expected_step_seconds: Option<i64>,
) -> Result<(Vec<Bar>, DataQualityReport), String> {
    let file = File::open(path)
        .map_err(|err| format!("failed to open OHLCV CSV {}: {}", path.display(), err))?;
    let mut reader = csv::Reader::from_reader(file);

    let mut bars = Vec::new();
    for (row, result) in reader.deserialize::<OhlcvRecord>().enumerate() {
        // header is line 1
        let line = row + 2;
        let record =
            result.map_err(|err| format!("failed to parse CSV row at line {line}: {err}"))?;
        let timestamp = parse_timestamp(&record.timestamp_utc)
            .map_err(|err| format!("line {line}: {err}"))?;
        bars.push(Bar {
            timestamp,
            open: record.open,
            high: record.high,
            low: record.low,
            close: record.close,
            volume: record.volume,
        });
    }

    let report = data_quality_from_bars(&bars, expected_step_seconds);
    Ok((bars, report))
}

#[derive(Debug, Clone)]
pub struct CsvMarketDataRepository {
    path: PathBuf,
}

impl CsvMarketDataRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl MarketDataRepository for CsvMarketDataRepository {
    fn load_ohlcv(&self, query: &OhlcvQuery) -> Result<(Vec<Bar>, DataQualityReport), String> {
        let _span = tracing::info_span!(
            "infra.csv.load_ohlcv",
            path = %self.path.display(),
            symbol = %query.symbol,
            timeframe = %query.timeframe
        )
        .entered();
        let start = Instant::now();
        let result = load_csv_with_step(&self.path, query.expected_step_seconds);
        let result_label = if result.is_ok() { "ok" } else { "err" };
        metrics::histogram!("tally.infra.csv.load_ms", "result" => result_label)
            .record(start.elapsed().as_millis() as f64);
        if let Ok((bars, report)) = &result {
            tracing::debug!(
                rows = bars.len(),
                gaps = report.gaps,
                duplicates = report.duplicates,
                "ohlcv csv loaded"
            );
        }
        result
    }
}
