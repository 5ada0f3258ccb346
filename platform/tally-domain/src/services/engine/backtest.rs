use crate::entities::position::Position;
use crate::entities::risk::SimulationConfig;
use crate::entities::summary::{MonthlyReturn, Summary};
use crate::error::SimulationError;
use crate::services::analytics::drawdown::{build_drawdown_curve, DrawdownCurve};
use crate::services::analytics::equity::build_equity_curve;
use crate::services::analytics::performance::summarize_with;
use crate::services::analytics::periods::monthly_returns;
use crate::services::analytics::DEFAULT_ANNUALIZATION_FACTOR;
use crate::services::engine::simulator::simulate_with_outcome;
use crate::value_objects::action::Action;
use crate::value_objects::bar::Bar;
use crate::value_objects::equity_point::EquityPoint;
use crate::value_objects::trade::Trade;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BacktestConfig {
    pub simulation: SimulationConfig,
    pub initial_capital: f64,
    pub annualization_factor: f64,
}

impl Default for BacktestConfig {
    fn default() -> Self {
        Self {
            simulation: SimulationConfig::default(),
            initial_capital: 10_000.0,
            annualization_factor: DEFAULT_ANNUALIZATION_FACTOR,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BacktestResults {
    pub trades: Vec<Trade>,
    pub equity: Vec<EquityPoint>,
    pub drawdown: DrawdownCurve,
    pub summary: Summary,
    pub monthly_returns: Vec<MonthlyReturn>,
    /// Informational only; never counted as a trade.
    pub open_position: Option<Position>,
}

/// Everything derived from a trade log once the simulation is done.
pub fn analyze(
    trades: Vec<Trade>,
    initial_capital: f64,
    annualization_factor: f64,
) -> BacktestResults {
    let equity = build_equity_curve(&trades, initial_capital);
    let drawdown = build_drawdown_curve(&equity);
    let summary = summarize_with(&trades, initial_capital, annualization_factor, &drawdown);
    let monthly_returns = monthly_returns(&equity);
    BacktestResults {
        trades,
        equity,
        drawdown,
        summary,
        monthly_returns,
        open_position: None,
    }
}

pub fn run_backtest(
    bars: &[Bar],
    signals: &[Action],
    config: &BacktestConfig,
) -> Result<BacktestResults, SimulationError> {
    let outcome = simulate_with_outcome(bars, signals, config.simulation)?;
    let mut results = analyze(
        outcome.trades,
        config.initial_capital,
        config.annualization_factor,
    );
    results.open_position = outcome.open_position;
    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::{analyze, run_backtest, BacktestConfig};
    use crate::entities::position::Position;
    use crate::services::analytics::performance::summarize;
    use crate::value_objects::action::Action;
    use crate::value_objects::bar::Bar;
    use crate::value_objects::reason::TradeReason;
    use crate::value_objects::side::Side;

    #[test]
    fn composes_curves_and_summary() {
        let bars: Vec<Bar> = [100.0, 110.0, 105.0, 99.0]
            .iter()
            .enumerate()
            .map(|(idx, close)| Bar {
                timestamp: 1_704_067_200 + idx as i64 * 3600,
                open: *close,
                high: *close,
                low: *close,
                close: *close,
                volume: 1.0,
            })
            .collect();
        let signals = vec![Action::Buy, Action::Sell, Action::Buy, Action::Hold];
        let results = run_backtest(&bars, &signals, &BacktestConfig::default()).unwrap();

        assert_eq!(results.trades.len(), 1);
        assert_eq!(results.equity.len(), 2);
        assert_eq!(results.drawdown.points.len(), results.equity.len());
        assert_eq!(results.summary.final_equity, 10_010.0);
        assert_eq!(results.open_position.map(|p| p.entry_price), Some(105.0));
        assert_eq!(results.monthly_returns.last().map(|r| r.month.as_str()), Some("Total"));
    }

    #[test]
    fn summary_drawdown_comes_from_the_returned_curve() {
        let trades: Vec<_> = [(100.0, 120.0), (100.0, 70.0), (100.0, 90.0), (100.0, 150.0)]
            .iter()
            .enumerate()
            .map(|(idx, (entry, exit))| {
                let ts = 1_704_067_200 + idx as i64 * 3600;
                Position::open(Side::Long, ts, *entry, 1.0).close(
                    ts + 60,
                    *exit,
                    TradeReason::StrategySignal,
                )
            })
            .collect();
        let standalone = summarize(&trades, 1_000.0);
        let results = analyze(trades, 1_000.0, 252.0);

        assert!(results.drawdown.max_drawdown_pct > 0.0);
        assert_eq!(results.summary.max_drawdown, results.drawdown.max_drawdown_pct);
        assert_eq!(
            results.summary.max_drawdown_duration,
            results.drawdown.max_drawdown_duration
        );
        assert_eq!(results.summary.max_drawdown_duration, 2);
        assert_eq!(standalone.max_drawdown, results.summary.max_drawdown);
    }
}
