//! Strategy parameters for the MA-crossover / staged take-profit rule set.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyParams {
    pub ma_fast: usize,
    pub ma_slow: usize,
    /// Long-horizon trend filter window.
    pub ma_trend: usize,
    /// Fraction of account equity committed per new entry.
    pub buy_pct: f64,
    pub tp1_pct: f64,
    pub tp2_pct: f64,
    /// Stop-loss threshold; `0` disables the stop.
    pub sl_pct: f64,
    /// Fraction of the remaining size closed when TP1 fires.
    pub tp1_sell_fraction: f64,
}

impl Default for StrategyParams {
    fn default() -> Self {
        StrategyParams {
            ma_fast: 10,
            ma_slow: 20,
            ma_trend: 120,
            buy_pct: 0.15,
            tp1_pct: 0.08,
            tp2_pct: 0.14,
            sl_pct: 0.18,
            tp1_sell_fraction: 0.9,
        }
    }
}

impl StrategyParams {
    pub fn exit_params(&self) -> ExitParams {
        ExitParams {
            tp1_pct: self.tp1_pct,
            tp2_pct: self.tp2_pct,
            sl_pct: self.sl_pct,
            tp1_sell_fraction: self.tp1_sell_fraction,
        }
    }
}

/// The subset of parameters the exit rule evaluator needs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExitParams {
    pub tp1_pct: f64,
    pub tp2_pct: f64,
    pub sl_pct: f64,
    pub tp1_sell_fraction: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let p = StrategyParams::default();
        assert_eq!(p.ma_fast, 10);
        assert_eq!(p.ma_slow, 20);
        assert_eq!(p.ma_trend, 120);
        assert_eq!(p.buy_pct, 0.15);
        assert_eq!(p.tp1_pct, 0.08);
        assert_eq!(p.tp2_pct, 0.14);
        assert_eq!(p.sl_pct, 0.18);
        assert_eq!(p.tp1_sell_fraction, 0.9);
    }

    #[test]
    fn exit_params_copies_thresholds() {
        let p = StrategyParams {
            tp1_pct: 0.05,
            sl_pct: 0.0,
            ..StrategyParams::default()
        };
        let e = p.exit_params();
        assert_eq!(e.tp1_pct, 0.05);
        assert_eq!(e.tp2_pct, 0.14);
        assert_eq!(e.sl_pct, 0.0);
        assert_eq!(e.tp1_sell_fraction, 0.9);
    }
}
