//! Golden cross detection.
//!
//! A bar is a signal when the short average closes strictly above the long
//! average after being at or below it on the previous bar. Undefined
//! averages on either bar rule the signal out.

use crate::domain::annotate::{AnnotatedBar, AnnotatedSeries};

/// True when `curr` is a golden cross relative to `prev`.
pub fn is_cross_above(prev: &AnnotatedBar, curr: &AnnotatedBar) -> bool {
    match (prev.averages(), curr.averages()) {
        (Some((short_prev, long_prev)), Some((short_curr, long_curr))) => {
            short_curr > long_curr && short_prev <= long_prev
        }
        _ => false,
    }
}

pub fn detect_signals(series: AnnotatedSeries) -> AnnotatedSeries {
    let flags: Vec<bool> = (0..series.bars.len())
        .map(|i| i > 0 && is_cross_above(&series.bars[i - 1], &series.bars[i]))
        .collect();

    let bars = series
        .bars
        .into_iter()
        .zip(flags)
        .map(|(bar, signal)| AnnotatedBar { signal, ..bar })
        .collect();

    AnnotatedSeries { bars, ..series }
}
