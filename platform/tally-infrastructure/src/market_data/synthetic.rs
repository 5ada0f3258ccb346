use chrono::{TimeZone, Timelike, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;
use tally_domain::repositories::market_data::{MarketDataRepository, OhlcvQuery};
use tally_domain::services::ohlcv::{data_quality_from_bars, DataQualityReport};
use tally_domain::value_objects::bar::Bar;

pub const TICK_SIZE: f64 = 0.25;

/// Regular session in UTC hours; bars outside it move with reduced volatility.
const SESSION_START_HOUR: f64 = 13.5;
const SESSION_END_HOUR: f64 = 20.0;
const OFF_SESSION_VOL_MULTIPLIER: f64 = 0.3;

#[derive(Debug, Clone, PartialEq)]
pub struct SyntheticParams {
    pub bars: usize,
    pub start_timestamp: i64,
    pub step_seconds: i64,
    pub base_price: f64,
    /// Per-bar standard deviation of returns.
    pub volatility: f64,
    pub trend_strength: f64,
    pub volume_base: f64,
}

impl Default for SyntheticParams {
    fn default() -> Self {
        Self {
            bars: 500,
            start_timestamp: 1_704_067_200,
            step_seconds: 3600,
            base_price: 18_500.0,
            volatility: 0.02,
            trend_strength: 0.1,
            volume_base: 2000.0,
        }
    }
}

pub fn round_to_tick(price: f64) -> f64 {
    (price / TICK_SIZE).round() * TICK_SIZE
}

/// Gaussian random walk with drift. The same seed always yields the same series.
pub fn generate_bars(params: &SyntheticParams, seed: u64) -> Vec<Bar> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut bars = Vec::with_capacity(params.bars);
    let mut price = params.base_price;

    for i in 0..params.bars {
        let timestamp = params.start_timestamp + (i as i64) * params.step_seconds;
        let volatility = params.volatility * session_multiplier(timestamp);

        let drift = normal(&mut rng) * params.trend_strength * 0.001;
        let shock = normal(&mut rng) * volatility;
        let open = price;
        let close = (open + (drift + shock) * open).max(TICK_SIZE);

        let intrabar = volatility * 0.5 * open;
        let high = open.max(close) + normal(&mut rng).abs() * intrabar;
        let low = (open.min(close) - normal(&mut rng).abs() * intrabar).max(TICK_SIZE);

        let volume_multiplier: f64 = rng.gen_range(0.5..2.0);
        let volume = (params.volume_base * volume_multiplier).floor();

        let open = round_to_tick(open);
        let close = round_to_tick(close);
        bars.push(Bar {
            timestamp,
            open,
            // Rounding must not let the wick fall inside the body.
            high: round_to_tick(high).max(open.max(close)),
            low: round_to_tick(low).min(open.min(close)),
            close,
            volume,
        });
        price = close;
    }
    bars
}

fn normal(rng: &mut StdRng) -> f64 {
    rng.sample(StandardNormal)
}

fn session_multiplier(timestamp: i64) -> f64 {
    let Some(dt) = Utc.timestamp_opt(timestamp, 0).single() else {
        return 1.0;
    };
    let hour = dt.hour() as f64 + dt.minute() as f64 / 60.0;
    if (SESSION_START_HOUR..SESSION_END_HOUR).contains(&hour) {
        1.0
    } else {
        OFF_SESSION_VOL_MULTIPLIER
    }
}

#[derive(Debug, Clone)]
pub struct SyntheticMarketDataRepository {
    params: SyntheticParams,
    seed: u64,
}

impl SyntheticMarketDataRepository {
    pub fn new(params: SyntheticParams, seed: u64) -> Self {
        Self { params, seed }
    }
}

impl MarketDataRepository for SyntheticMarketDataRepository {
    /// The query's expected step overrides the configured one so bars line up with the timeframe.
    fn load_ohlcv(&self, query: &OhlcvQuery) -> Result<(Vec<Bar>, DataQualityReport), String> {
        let mut params = self.params.clone();
        if let Some(step) = query.expected_step_seconds {
            if step <= 0 {
                return Err(format!("invalid step for synthetic bars: {step}"));
            }
            params.step_seconds = step;
        }
        if !params.base_price.is_finite() || params.base_price <= 0.0 {
            return Err("synthetic base_price must be finite and > 0".to_string());
        }
        if !params.volatility.is_finite() || params.volatility < 0.0 {
            return Err("synthetic volatility must be finite and >= 0".to_string());
        }

        let bars = generate_bars(&params, self.seed);
        tracing::debug!(
            symbol = %query.symbol,
            bars = bars.len(),
            seed = self.seed,
            "synthetic bars generated"
        );
        let report = data_quality_from_bars(&bars, Some(params.step_seconds));
        Ok((bars, report))
    }
}

#[cfg(test)]
mod tests {
    use super::{generate_bars, round_to_tick, SyntheticParams, TICK_SIZE};
    use proptest::prelude::*;

    #[test]
    fn same_seed_same_series() {
        let params = SyntheticParams {
            bars: 64,
            ..SyntheticParams::default()
        };
        assert_eq!(generate_bars(&params, 7), generate_bars(&params, 7));
        assert_ne!(generate_bars(&params, 7), generate_bars(&params, 8));
    }

    #[test]
    fn timestamps_follow_step() {
        let params = SyntheticParams {
            bars: 3,
            start_timestamp: 1000,
            step_seconds: 60,
            ..SyntheticParams::default()
        };
        let ts: Vec<i64> = generate_bars(&params, 1).iter().map(|b| b.timestamp).collect();
        assert_eq!(ts, vec![1000, 1060, 1120]);
    }

    #[test]
    fn rounds_to_quarter_tick() {
        assert_eq!(round_to_tick(100.1), 100.0);
        assert_eq!(round_to_tick(100.13), 100.25);
        assert_eq!(round_to_tick(100.9), 101.0);
    }

    proptest! {
        #![proptest_config(ProptestConfig { cases: 32, ..ProptestConfig::default() })]

        #[test]
        fn bars_are_well_formed(seed in any::<u64>()) {
            let params = SyntheticParams { bars: 100, ..SyntheticParams::default() };
            for bar in generate_bars(&params, seed) {
                prop_assert!(bar.high >= bar.open.max(bar.close));
                prop_assert!(bar.low <= bar.open.min(bar.close));
                prop_assert!(bar.close >= TICK_SIZE);
                prop_assert_eq!((bar.close / TICK_SIZE).fract(), 0.0);
                prop_assert!(bar.volume >= 0.0);
            }
        }
    }
}
