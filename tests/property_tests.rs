//! Property tests for the moving-average and crossover invariants.
//!
//! Uses proptest to verify:
//! 1. MA definedness: an average exists iff its full window exists
//! 2. Crossover iff: a bar is flagged exactly when short crosses above long
//! 3. Trade invariants: exit after entry, return derived from the two closes
//! 4. Aggregation: counts add up and rates stay in range

mod common;

use common::*;
use goldencross::domain::annotate::annotate;
use goldencross::domain::backtest::analyze_series;
use goldencross::domain::indicator::calculate_sma;
use goldencross::domain::metrics::summarize;
use goldencross::domain::signal::detect_signals;
use goldencross::domain::strategy::{OverlapPolicy, StrategyParameters};
use proptest::prelude::*;

// ── Strategies (proptest) ────────────────────────────────────────────

fn arb_closes() -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(
        (1.0..500.0_f64).prop_map(|p| (p * 100.0).round() / 100.0),
        1..120,
    )
}

fn arb_windows() -> impl Strategy<Value = (usize, usize)> {
    (1usize..15, 1usize..40)
}

fn arb_holding_days() -> impl Strategy<Value = u32> {
    prop_oneof![4 => 1u32..40, 1 => Just(u32::MAX)]
}

fn arb_params() -> impl Strategy<Value = StrategyParameters> {
    (1usize..8, 2usize..25, arb_holding_days(), 1.0..30.0_f64, 1.0..40.0_f64, any::<bool>()).prop_map(
        |(short_window, long_window, max_holding_days, stop_loss_pct, take_profit_pct, overlap)| {
            StrategyParameters {
                short_window,
                long_window,
                max_holding_days,
                stop_loss_pct,
                take_profit_pct,
                overlap: if overlap {
                    OverlapPolicy::Independent
                } else {
                    OverlapPolicy::SuppressWhileOpen
                },
            }
        },
    )
}

// ── 1. MA definedness ────────────────────────────────────────────────

proptest! {
    #[test]
    fn sma_defined_iff_window_full(closes in arb_closes(), period in 1usize..40) {
        let bars = bars_from_closes("2020-01-01", &closes);
        let sma = calculate_sma(&bars, period);

        prop_assert_eq!(sma.len(), bars.len());
        for (i, value) in sma.iter().enumerate() {
            prop_assert_eq!(value.is_some(), i + 1 >= period);
        }
    }

    #[test]
    fn annotated_averages_follow_both_windows(closes in arb_closes(), (short, long) in arb_windows()) {
        let bars = bars_from_closes("2020-01-01", &closes);
        let series = annotate(&bars, short, long);

        for (i, ab) in series.bars.iter().enumerate() {
            prop_assert_eq!(ab.short_ma.is_some(), i + 1 >= short);
            prop_assert_eq!(ab.long_ma.is_some(), i + 1 >= long);
            prop_assert_eq!(&ab.bar, &bars[i]);
        }
    }
}

// ── 2. Crossover iff ─────────────────────────────────────────────────

proptest! {
    #[test]
    fn signal_iff_cross_above(closes in arb_closes(), (short, long) in arb_windows()) {
        let bars = bars_from_closes("2020-01-01", &closes);
        let series = detect_signals(annotate(&bars, short, long));

        if let Some(first) = series.bars.first() {
            prop_assert!(!first.signal);
        }
        for i in 1..series.bars.len() {
            let prev = &series.bars[i - 1];
            let curr = &series.bars[i];
            let crossed = match (prev.short_ma, prev.long_ma, curr.short_ma, curr.long_ma) {
                (Some(ps), Some(pl), Some(cs), Some(cl)) => ps <= pl && cs > cl,
                _ => false,
            };
            prop_assert_eq!(curr.signal, crossed, "bar {}", i);
        }
    }
}

// ── 3. Trade invariants ──────────────────────────────────────────────

proptest! {
    #[test]
    fn trades_are_well_formed(closes in arb_closes(), params in arb_params()) {
        let bars = bars_from_closes("2020-01-01", &closes);
        prop_assume!(bars.len() >= params.long_window);

        let analysis = analyze_series("PROP", &bars, &params).unwrap();
        prop_assert!(analysis.trades.len() <= analysis.signals);

        for trade in &analysis.trades {
            prop_assert!(trade.exit_date > trade.entry_date);
            prop_assert!(trade.holding_days >= 1);
            prop_assert!(trade.holding_days <= i64::from(params.max_holding_days));
            prop_assert_eq!(
                trade.return_pct,
                (trade.exit_price / trade.entry_price - 1.0) * 100.0
            );
        }
    }
}

// ── 4. Aggregation ───────────────────────────────────────────────────

proptest! {
    #[test]
    fn summary_counts_add_up(closes in arb_closes(), params in arb_params()) {
        let bars = bars_from_closes("2020-01-01", &closes);
        prop_assume!(bars.len() >= params.long_window);

        let trades = analyze_series("PROP", &bars, &params).unwrap().trades;
        let summary = summarize(&trades);

        prop_assert_eq!(summary.total_trades, trades.len());
        prop_assert_eq!(summary.winning_trades + summary.losing_trades, trades.len());
        prop_assert_eq!(summary.exit_reasons.total(), trades.len());
        prop_assert!((0.0..=100.0).contains(&summary.win_rate));
        prop_assert!(summary.std_dev_return >= 0.0);
        prop_assert!(summary.sharpe_ratio.is_finite());
    }
}
