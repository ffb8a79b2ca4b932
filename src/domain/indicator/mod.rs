//! Moving-average indicators used by the rule set.
//!
//! - `sma`: simple moving average over a close window
//! - `crossover`: crossed-up / crossed-down events between two series
//! - `IndicatorCalculator`: rolling close window producing an `IndicatorSnapshot`
//!   per bar

pub mod crossover;
pub mod sma;

use std::collections::VecDeque;
use std::fmt;

use crossover::{crossed_down, crossed_up};
use sma::sma;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndicatorType {
    Sma(usize),
}

impl fmt::Display for IndicatorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndicatorType::Sma(period) => write!(f, "SMA({})", period),
        }
    }
}

/// Indicator values at the latest bar, plus what is needed for crossovers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndicatorSnapshot {
    pub close: f64,
    pub prev_close: f64,
    pub fast: f64,
    pub prev_fast: f64,
    pub slow: f64,
    pub prev_slow: f64,
    pub trend: f64,
}

impl IndicatorSnapshot {
    pub fn crossed_above_fast(&self) -> bool {
        crossed_up(&[self.prev_close, self.close], &[self.prev_fast, self.fast], 1)
    }

    pub fn crossed_above_slow(&self) -> bool {
        crossed_up(&[self.prev_close, self.close], &[self.prev_slow, self.slow], 1)
    }

    pub fn crossed_below_fast(&self) -> bool {
        crossed_down(&[self.prev_close, self.close], &[self.prev_fast, self.fast], 1)
    }

    pub fn crossed_below_slow(&self) -> bool {
        crossed_down(&[self.prev_close, self.close], &[self.prev_slow, self.slow], 1)
    }
}

/// Rolling close window. Values are recomputed from the window on every
/// bar, so they match `sma(closes, n)` over the full history exactly.
#[derive(Debug, Clone)]
pub struct IndicatorCalculator {
    fast: usize,
    slow: usize,
    trend: usize,
    closes: VecDeque<f64>,
}

impl IndicatorCalculator {
    pub fn new(fast: usize, slow: usize, trend: usize) -> Self {
        IndicatorCalculator {
            fast,
            slow,
            trend,
            closes: VecDeque::with_capacity(fast.max(slow).max(trend) + 1),
        }
    }

    fn capacity(&self) -> usize {
        self.fast.max(self.slow).max(self.trend) + 1
    }

    /// Closes needed before the first snapshot: the crossover MAs need one
    /// extra close for their previous value.
    pub fn required_history(&self) -> usize {
        (self.fast + 1).max(self.slow + 1).max(self.trend)
    }

    pub fn indicator_types(&self) -> [IndicatorType; 3] {
        [
            IndicatorType::Sma(self.fast),
            IndicatorType::Sma(self.slow),
            IndicatorType::Sma(self.trend),
        ]
    }

    pub fn len(&self) -> usize {
        self.closes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.closes.is_empty()
    }

    pub fn is_warm(&self) -> bool {
        self.closes.len() >= self.required_history()
    }

    pub fn push(&mut self, close: f64) {
        if self.closes.len() == self.capacity() {
            self.closes.pop_front();
        }
        self.closes.push_back(close);
    }

    /// Feed history without evaluating anything.
    pub fn warm_up<I: IntoIterator<Item = f64>>(&mut self, closes: I) {
        for close in closes {
            self.push(close);
        }
    }

    pub fn snapshot(&self) -> Option<IndicatorSnapshot> {
        if !self.is_warm() {
            return None;
        }
        let window: Vec<f64> = self.closes.iter().copied().collect();
        let n = window.len();
        let prev = &window[..n - 1];

        Some(IndicatorSnapshot {
            close: window[n - 1],
            prev_close: window[n - 2],
            fast: sma(&window, self.fast)?,
            prev_fast: sma(prev, self.fast)?,
            slow: sma(&window, self.slow)?,
            prev_slow: sma(prev, self.slow)?,
            trend: sma(&window, self.trend)?,
        })
    }
}
