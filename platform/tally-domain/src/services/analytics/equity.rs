use crate::value_objects::equity_point::EquityPoint;
use crate::value_objects::trade::Trade;

/// `Start` at `initial_capital`, then one point per trade at its exit timestamp.
pub fn build_equity_curve(trades: &[Trade], initial_capital: f64) -> Vec<EquityPoint> {
    let mut curve = Vec::with_capacity(trades.len() + 1);
    curve.push(EquityPoint::start(initial_capital));
    let mut equity = initial_capital;
    for trade in trades {
        equity += trade.pnl;
        curve.push(EquityPoint::at(trade.exit_timestamp, equity));
    }
    curve
}

#[cfg(test)]
mod tests {
    use super::build_equity_curve;
    use crate::entities::position::Position;
    use crate::value_objects::reason::TradeReason;
    use crate::value_objects::side::Side;

    #[test]
    fn accumulates_pnl_in_closing_order() {
        let trades = vec![
            Position::open(Side::Long, 0, 100.0, 1.0).close(60, 110.0, TradeReason::StrategySignal),
            Position::open(Side::Short, 120, 100.0, 2.0).close(180, 103.0, TradeReason::StopLoss),
        ];
        let curve = build_equity_curve(&trades, 1_000.0);
        assert_eq!(curve.len(), 3);
        assert_eq!(curve[0].label(), "Start");
        assert_eq!(curve[1].equity, 1_010.0);
        assert_eq!(curve[1].timestamp, Some(60));
        assert_eq!(curve[2].equity, 1_004.0);
    }

    #[test]
    fn empty_log_is_just_start() {
        let curve = build_equity_curve(&[], 500.0);
        assert_eq!(curve.len(), 1);
        assert_eq!(curve[0].equity, 500.0);
    }
}
