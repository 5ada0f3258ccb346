use crate::entities::summary::Summary;
use crate::services::analytics::drawdown::{build_drawdown_curve, DrawdownCurve};
use crate::services::analytics::equity::build_equity_curve;
use crate::services::analytics::DEFAULT_ANNUALIZATION_FACTOR;
use crate::value_objects::trade::Trade;

/// Standalone entry point that derives the drawdown curve itself.
pub fn summarize(trades: &[Trade], initial_capital: f64) -> Summary {
    let drawdown = build_drawdown_curve(&build_equity_curve(trades, initial_capital));
    summarize_with(trades, initial_capital, DEFAULT_ANNUALIZATION_FACTOR, &drawdown)
}

/// Every ratio degrades to 0 on empty or degenerate inputs instead of faulting.
/// Drawdown fields are copied from `drawdown`, which must come from the same trades.
pub fn summarize_with(
    trades: &[Trade],
    initial_capital: f64,
    annualization_factor: f64,
    drawdown: &DrawdownCurve,
) -> Summary {
    let mut summary = Summary {
        total_trades: trades.len(),
        ..Summary::default()
    };

    let mut gross_win = 0.0;
    let mut gross_loss = 0.0;
    let mut returns = Vec::with_capacity(trades.len());

    for trade in trades {
        summary.total_pnl += trade.pnl;

        if trade.pnl > 0.0 {
            summary.winning_trades += 1;
            gross_win += trade.pnl;
            summary.largest_win = summary.largest_win.max(trade.pnl);
            summary.consecutive_wins += 1;
            summary.consecutive_losses = 0;
            summary.max_consecutive_wins = summary.max_consecutive_wins.max(summary.consecutive_wins);
        } else if trade.pnl < 0.0 {
            let loss = trade.pnl.abs();
            summary.losing_trades += 1;
            gross_loss += loss;
            summary.largest_loss = summary.largest_loss.max(loss);
            summary.consecutive_losses += 1;
            summary.consecutive_wins = 0;
            summary.max_consecutive_losses =
                summary.max_consecutive_losses.max(summary.consecutive_losses);
        }

        returns.push(trade.return_fraction());
    }

    summary.final_equity = initial_capital + summary.total_pnl;
    if initial_capital != 0.0 {
        summary.total_return_percent = summary.total_pnl / initial_capital * 100.0;
    }
    if summary.total_trades > 0 {
        summary.win_rate = summary.winning_trades as f64 / summary.total_trades as f64 * 100.0;
    }
    if summary.winning_trades > 0 {
        summary.average_win = gross_win / summary.winning_trades as f64;
    }
    if summary.losing_trades > 0 {
        summary.average_loss = gross_loss / summary.losing_trades as f64;
    }
    if gross_loss > 0.0 {
        summary.profit_factor = gross_win / gross_loss;
    }

    summary.sharpe_ratio = sharpe_ratio(&returns, annualization_factor);
    summary.sortino_ratio = sortino_ratio(&returns, annualization_factor);

    summary.max_drawdown = drawdown.max_drawdown_pct;
    summary.max_drawdown_duration = drawdown.max_drawdown_duration;

    summary
}

/// `mean * sqrt(factor) / sample_std`. Zero below two returns or with zero dispersion.
pub fn sharpe_ratio(returns: &[f64], annualization_factor: f64) -> f64 {
    let mean = mean(returns);
    let std_dev = sample_std_dev(returns, mean);
    annualized_ratio(mean, std_dev, annualization_factor)
}

/// Same numerator as Sharpe over the downside deviation: the sample deviation of the
/// negative returns taken around 0. Zero below two negative returns.
pub fn sortino_ratio(returns: &[f64], annualization_factor: f64) -> f64 {
    let downside: Vec<f64> = returns.iter().copied().filter(|r| *r < 0.0).collect();
    let downside_dev = sample_std_dev(&downside, 0.0);
    annualized_ratio(mean(returns), downside_dev, annualization_factor)
}

fn annualized_ratio(mean: f64, std_dev: f64, annualization_factor: f64) -> f64 {
    if std_dev > 0.0 && std_dev.is_finite() {
        mean * annualization_factor.max(0.0).sqrt() / std_dev
    } else {
        0.0
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

fn sample_std_dev(values: &[f64], center: f64) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let sum_sq: f64 = values.iter().map(|v| (v - center).powi(2)).sum();
    (sum_sq / (values.len() - 1) as f64).sqrt()
}
