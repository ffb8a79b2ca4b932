//! Position sides and ledger entries.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Tolerance for threshold comparisons, so that e.g. 100 -> 114 counts as +14%.
pub const EPSILON: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Long,
    Short,
}

impl Side {
    pub fn is_long(&self) -> bool {
        matches!(self, Side::Long)
    }

    /// Order direction that opens a position on this side.
    pub fn opening_order(&self) -> OrderSide {
        match self {
            Side::Long => OrderSide::Buy,
            Side::Short => OrderSide::Sell,
        }
    }

    /// Order direction that reduces or closes a position on this side.
    pub fn closing_order(&self) -> OrderSide {
        match self {
            Side::Long => OrderSide::Sell,
            Side::Short => OrderSide::Buy,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Long => write!(f, "long"),
            Side::Short => write!(f, "short"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderSide {
    Buy,
    Sell,
}

impl fmt::Display for OrderSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderSide::Buy => write!(f, "BUY"),
            OrderSide::Sell => write!(f, "SELL"),
        }
    }
}

/// Which exit rule produced a reduction or close.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ExitReason {
    Tp1,
    StopLoss,
    Tp2,
}

impl ExitReason {
    /// Only TP2 closes count as completed trades.
    pub fn counts_as_completed(&self) -> bool {
        matches!(self, ExitReason::Tp2)
    }
}

impl fmt::Display for ExitReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExitReason::Tp1 => write!(f, "TP1"),
            ExitReason::StopLoss => write!(f, "SL"),
            ExitReason::Tp2 => write!(f, "TP2"),
        }
    }
}

/// One open position slice with its own cost basis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entry {
    pub entry_price: f64,
    pub remaining_size: f64,
    pub tp1_done: bool,
}

impl Entry {
    pub fn new(entry_price: f64, size: f64) -> Self {
        Entry {
            entry_price,
            remaining_size: size,
            tp1_done: false,
        }
    }

    /// Fractional profit at `price`: long `price/entry - 1`, short `entry/price - 1`.
    pub fn pnl_pct(&self, side: Side, price: f64) -> f64 {
        match side {
            Side::Long => price / self.entry_price - 1.0,
            Side::Short => self.entry_price / price - 1.0,
        }
    }

    /// True when the entry is at least `threshold` in profit at `price`.
    pub fn reached_profit(&self, side: Side, price: f64, threshold: f64) -> bool {
        self.pnl_pct(side, price) >= threshold - EPSILON
    }

    /// Stop-loss is disabled when `sl_pct <= 0`.
    pub fn should_stop_loss(&self, side: Side, price: f64, sl_pct: f64) -> bool {
        if sl_pct <= 0.0 {
            return false;
        }
        self.pnl_pct(side, price) <= -sl_pct + EPSILON
    }

    /// Realized profit of closing `size` units at `exit_price`.
    pub fn realized_pnl(&self, side: Side, exit_price: f64, size: f64) -> f64 {
        match side {
            Side::Long => (exit_price - self.entry_price) * size,
            Side::Short => (self.entry_price - exit_price) * size,
        }
    }
}
