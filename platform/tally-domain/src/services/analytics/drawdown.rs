use crate::value_objects::drawdown_point::DrawdownPoint;
use crate::value_objects::equity_point::EquityPoint;
use serde::Serialize;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DrawdownCurve {
    pub points: Vec<DrawdownPoint>,
    pub max_drawdown_pct: f64,
    /// Longest run of consecutive points strictly below the running peak.
    pub max_drawdown_duration: usize,
}

/// Percentage decline from the running peak, index-aligned with `equity`.
/// A non-positive peak yields 0 rather than a division fault.
pub fn build_drawdown_curve(equity: &[EquityPoint]) -> DrawdownCurve {
    let mut curve = DrawdownCurve {
        points: Vec::with_capacity(equity.len()),
        ..DrawdownCurve::default()
    };
    let Some(first) = equity.first() else {
        return curve;
    };

    let mut peak = first.equity;
    let mut underwater = 0usize;
    for point in equity {
        if point.equity > peak {
            peak = point.equity;
        }

        let drawdown_pct = if peak > 0.0 {
            (peak - point.equity) / peak * 100.0
        } else {
            0.0
        };

        if point.equity < peak {
            underwater += 1;
            curve.max_drawdown_duration = curve.max_drawdown_duration.max(underwater);
        } else {
            underwater = 0;
        }
        curve.max_drawdown_pct = curve.max_drawdown_pct.max(drawdown_pct);
        curve.points.push(DrawdownPoint {
            timestamp: point.timestamp,
            drawdown_pct,
        });
    }

    curve
}

#[cfg(test)]
mod tests {
    use super::build_drawdown_curve;
    use crate::value_objects::equity_point::EquityPoint;

    #[test]
    fn tracks_peak_depth_and_duration() {
        let equity = vec![
            EquityPoint::start(100.0),
            EquityPoint::at(1, 120.0),
            EquityPoint::at(2, 90.0),
            EquityPoint::at(3, 108.0),
            EquityPoint::at(4, 130.0),
            EquityPoint::at(5, 117.0),
        ];
        let curve = build_drawdown_curve(&equity);
        let pct: Vec<f64> = curve.points.iter().map(|p| p.drawdown_pct).collect();
        assert_eq!(pct[0], 0.0);
        assert_eq!(pct[1], 0.0);
        assert!((pct[2] - 25.0).abs() < 1e-9);
        assert!((pct[3] - 10.0).abs() < 1e-9);
        assert_eq!(pct[4], 0.0);
        assert!((pct[5] - 10.0).abs() < 1e-9);
        assert!((curve.max_drawdown_pct - 25.0).abs() < 1e-9);
        assert_eq!(curve.max_drawdown_duration, 2);
        assert_eq!(curve.points[0].label(), "Start");
    }

    #[test]
    fn zero_peak_is_guarded() {
        let equity = vec![EquityPoint::start(0.0), EquityPoint::at(1, -5.0)];
        let curve = build_drawdown_curve(&equity);
        assert!(curve.points.iter().all(|p| p.drawdown_pct == 0.0));
        assert_eq!(curve.max_drawdown_duration, 1);
    }

    #[test]
    fn empty_curve() {
        let curve = build_drawdown_curve(&[]);
        assert!(curve.points.is_empty());
        assert_eq!(curve.max_drawdown_pct, 0.0);
    }
}
