//! Staged take-profit and stop-loss exit rules.
//!
//! Entries are scanned newest first. Per entry, the first matching rule wins
//! (thresholds are compared with a `1e-9` tolerance):
//!
//! 1. TP1: `!tp1_done && pnl >= tp1_pct`, close `tp1_sell_fraction` of the
//!    remaining size
//! 2. SL: `pnl <= -sl_pct` (disabled when `sl_pct <= 0`), close fully
//! 3. TP2: `tp1_done && pnl >= tp2_pct`, close fully
//!
//! The scan stops at the first entry that produces a decision. Evaluation is
//! pure; the orchestrator applies the decision once execution is confirmed.

use super::position::{Entry, ExitReason, Side};
use super::strategy::ExitParams;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExitDecision {
    pub side: Side,
    pub index: usize,
    pub reason: ExitReason,
    pub size: f64,
}

impl ExitDecision {
    pub fn is_partial(&self) -> bool {
        matches!(self.reason, ExitReason::Tp1)
    }
}

/// Which rule, if any, fires for a single entry at `price`.
pub fn check_entry(entry: &Entry, side: Side, price: f64, params: &ExitParams) -> Option<(ExitReason, f64)> {
    if !entry.tp1_done && entry.reached_profit(side, price, params.tp1_pct) {
        return Some((ExitReason::Tp1, entry.remaining_size * params.tp1_sell_fraction));
    }

    if entry.should_stop_loss(side, price, params.sl_pct) {
        return Some((ExitReason::StopLoss, entry.remaining_size));
    }

    if entry.tp1_done && entry.reached_profit(side, price, params.tp2_pct) {
        return Some((ExitReason::Tp2, entry.remaining_size));
    }

    None
}

/// Scan one side's entries newest first and return the first exit decision.
pub fn evaluate_side(entries: &[Entry], side: Side, price: f64, params: &ExitParams) -> Option<ExitDecision> {
    entries
        .iter()
        .enumerate()
        .rev()
        .find_map(|(index, entry)| {
            check_entry(entry, side, price, params).map(|(reason, size)| ExitDecision {
                side,
                index,
                reason,
                size,
            })
        })
}

/// Longs are scanned before shorts.
pub fn evaluate(
    long_entries: &[Entry],
    short_entries: &[Entry],
    price: f64,
    params: &ExitParams,
) -> Option<ExitDecision> {
    evaluate_side(long_entries, Side::Long, price, params)
        .or_else(|| evaluate_side(short_entries, Side::Short, price, params))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn params() -> ExitParams {
        ExitParams {
            tp1_pct: 0.08,
            tp2_pct: 0.14,
            sl_pct: 0.18,
            tp1_sell_fraction: 0.9,
        }
    }

    fn entry(price: f64, size: f64, tp1_done: bool) -> Entry {
        Entry {
            entry_price: price,
            remaining_size: size,
            tp1_done,
        }
    }

    #[test]
    fn tp1_long() {
        let (reason, size) = check_entry(&entry(100.0, 1.0, false), Side::Long, 108.0, &params()).unwrap();
        assert_eq!(reason, ExitReason::Tp1);
        assert_relative_eq!(size, 0.9);
    }

    #[test]
    fn tp1_not_repeated() {
        let e = entry(100.0, 0.1, true);
        assert_eq!(check_entry(&e, Side::Long, 110.0, &params()), None);
    }

    #[test]
    fn tp2_requires_tp1() {
        let fresh = entry(100.0, 1.0, false);
        // 120 qualifies for TP2 but TP1 has not fired yet: TP1 wins.
        let (reason, _) = check_entry(&fresh, Side::Long, 120.0, &params()).unwrap();
        assert_eq!(reason, ExitReason::Tp1);

        let scaled = entry(100.0, 0.1, true);
        let (reason, size) = check_entry(&scaled, Side::Long, 114.0, &params()).unwrap();
        assert_eq!(reason, ExitReason::Tp2);
        assert_relative_eq!(size, 0.1);
    }

    #[test]
    fn stop_loss_long() {
        let (reason, size) = check_entry(&entry(100.0, 1.0, false), Side::Long, 82.0, &params()).unwrap();
        assert_eq!(reason, ExitReason::StopLoss);
        assert_relative_eq!(size, 1.0);
    }

    #[test]
    fn stop_loss_after_tp1() {
        let (reason, size) = check_entry(&entry(100.0, 0.1, true), Side::Long, 80.0, &params()).unwrap();
        assert_eq!(reason, ExitReason::StopLoss);
        assert_relative_eq!(size, 0.1);
    }

    #[test]
    fn stop_loss_disabled() {
        let p = ExitParams { sl_pct: 0.0, ..params() };
        assert_eq!(check_entry(&entry(100.0, 1.0, false), Side::Long, 10.0, &p), None);
    }

    #[test]
    fn short_side_thresholds() {
        // short pnl = entry/price - 1; 100/92 - 1 = 0.0869...
        let (reason, _) = check_entry(&entry(100.0, 1.0, false), Side::Short, 92.0, &params()).unwrap();
        assert_eq!(reason, ExitReason::Tp1);

        // 100/125 - 1 = -0.2
        let (reason, _) = check_entry(&entry(100.0, 1.0, false), Side::Short, 125.0, &params()).unwrap();
        assert_eq!(reason, ExitReason::StopLoss);

        // 100/87 - 1 = 0.149...
        let (reason, _) = check_entry(&entry(100.0, 0.1, true), Side::Short, 87.0, &params()).unwrap();
        assert_eq!(reason, ExitReason::Tp2);
    }

    #[test]
    fn nothing_in_the_band() {
        let e = entry(100.0, 1.0, false);
        assert_eq!(check_entry(&e, Side::Long, 105.0, &params()), None);
        assert_eq!(check_entry(&e, Side::Long, 90.0, &params()), None);
    }

    #[test]
    fn newest_entry_checked_first() {
        let entries = vec![entry(100.0, 1.0, false), entry(100.0, 2.0, false)];
        let d = evaluate_side(&entries, Side::Long, 110.0, &params()).unwrap();
        assert_eq!(d.index, 1);
        assert_relative_eq!(d.size, 1.8);
    }

    #[test]
    fn scan_continues_past_non_qualifying_newer_entry() {
        // Older entry at 90 is +11% at 100; newer entry at 99 is only +1%.
        let entries = vec![entry(90.0, 1.0, false), entry(99.0, 1.0, false)];
        let d = evaluate_side(&entries, Side::Long, 100.0, &params()).unwrap();
        assert_eq!(d.index, 0);
        assert_eq!(d.reason, ExitReason::Tp1);
        assert!(d.is_partial());
    }

    #[test]
    fn longs_before_shorts() {
        let longs = vec![entry(100.0, 1.0, false)];
        let shorts = vec![entry(130.0, 1.0, false)];
        // long +10% (TP1) and short 130/110-1 = +18% (TP1): long wins
        let d = evaluate(&longs, &shorts, 110.0, &params()).unwrap();
        assert_eq!(d.side, Side::Long);

        let d = evaluate(&[], &shorts, 110.0, &params()).unwrap();
        assert_eq!(d.side, Side::Short);
        assert_eq!(d.index, 0);
    }

    #[test]
    fn empty_ledger_yields_nothing() {
        assert_eq!(evaluate(&[], &[], 100.0, &params()), None);
    }
}
