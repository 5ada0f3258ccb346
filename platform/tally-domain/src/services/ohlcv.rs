use crate::value_objects::bar::Bar;
use serde::Serialize;

/// Advisory counts over a bar series. The simulator never enforces any of them.
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct DataQualityReport {
    pub duplicates: usize,
    pub gaps: usize,
    pub out_of_order: usize,
    pub invalid_close: usize,
    pub first_timestamp: Option<i64>,
    pub last_timestamp: Option<i64>,
    pub first_gap: Option<i64>,
    pub first_duplicate: Option<i64>,
    pub first_out_of_order: Option<i64>,
    pub first_invalid_close: Option<i64>,
    pub max_gap_seconds: Option<i64>,
}

impl DataQualityReport {
    /// True when the series has no duplicate, out-of-order or invalid-close rows. Gaps are tolerated.
    pub fn is_clean(&self) -> bool {
        self.duplicates == 0 && self.out_of_order == 0 && self.invalid_close == 0
    }
}

pub fn data_quality_from_bars(
    bars: &[Bar],
    expected_step_seconds: Option<i64>,
) -> DataQualityReport {
    let mut report = DataQualityReport::default();
    let (Some(first), Some(last)) = (bars.first(), bars.last()) else {
        return report;
    };

    let step = expected_step_seconds.unwrap_or(1).max(1);
    report.first_timestamp = Some(first.timestamp);
    report.last_timestamp = Some(last.timestamp);

    let mut last_ts: Option<i64> = None;
    for bar in bars {
        let ts = bar.timestamp;

        if !bar.close.is_finite() || bar.close <= 0.0 {
            report.invalid_close += 1;
            report.first_invalid_close.get_or_insert(ts);
        }

        if let Some(prev) = last_ts {
            if ts == prev {
                report.duplicates += 1;
                report.first_duplicate.get_or_insert(ts);
            } else if ts < prev {
                report.out_of_order += 1;
                report.first_out_of_order.get_or_insert(ts);
            } else {
                let diff = ts - prev;
                if diff > step {
                    report.gaps += 1;
                    report.first_gap.get_or_insert(ts);
                    report.max_gap_seconds =
                        Some(report.max_gap_seconds.map_or(diff, |current| current.max(diff)));
                }
            }
        }

        last_ts = Some(ts);
    }

    report
}

#[cfg(test)]
mod tests {
    use super::data_quality_from_bars;
    use crate::value_objects::bar::Bar;

    fn bar(ts: i64, close: f64) -> Bar {
        Bar {
            timestamp: ts,
            open: close,
            high: close,
            low: close,
            close,
            volume: 1.0,
        }
    }

    #[test]
    fn counts_duplicates_gaps_and_disorder() {
        let bars = vec![
            bar(60, 1.0),
            bar(120, 1.0),
            bar(120, 1.0),
            bar(300, 1.0),
            bar(240, 0.0),
        ];
        let report = data_quality_from_bars(&bars, Some(60));
        assert_eq!(report.duplicates, 1);
        assert_eq!(report.gaps, 1);
        assert_eq!(report.max_gap_seconds, Some(180));
        assert_eq!(report.out_of_order, 1);
        assert_eq!(report.first_out_of_order, Some(240));
        assert_eq!(report.invalid_close, 1);
        assert_eq!(report.first_timestamp, Some(60));
        assert_eq!(report.last_timestamp, Some(240));
        assert!(!report.is_clean());
    }

    #[test]
    fn empty_series_is_clean() {
        let report = data_quality_from_bars(&[], Some(60));
        assert!(report.is_clean());
        assert_eq!(report.first_timestamp, None);
    }
}
