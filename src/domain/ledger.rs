//! Position ledger: open entries per side and completed-trade counters.
//!
//! `StrategyState` is the unit persisted between live runs. Entries are kept
//! in insertion order (oldest first); callers needing priority order scan in
//! reverse.

use serde::{Deserialize, Serialize};

use super::error::{EngineError, ScaletraderError};
use super::position::{Entry, ExitReason, Side};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StrategyState {
    pub long_entries: Vec<Entry>,
    pub short_entries: Vec<Entry>,
    pub completed_long_trades: u64,
    pub completed_short_trades: u64,
}

impl StrategyState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self, side: Side) -> &[Entry] {
        match side {
            Side::Long => &self.long_entries,
            Side::Short => &self.short_entries,
        }
    }

    fn entries_mut(&mut self, side: Side) -> &mut Vec<Entry> {
        match side {
            Side::Long => &mut self.long_entries,
            Side::Short => &mut self.short_entries,
        }
    }

    pub fn entry(&self, side: Side, index: usize) -> Result<&Entry, EngineError> {
        self.entries(side)
            .get(index)
            .ok_or(EngineError::EntryNotFound { side, index })
    }

    fn entry_mut(&mut self, side: Side, index: usize) -> Result<&mut Entry, EngineError> {
        self.entries_mut(side)
            .get_mut(index)
            .ok_or(EngineError::EntryNotFound { side, index })
    }

    pub fn completed(&self, side: Side) -> u64 {
        match side {
            Side::Long => self.completed_long_trades,
            Side::Short => self.completed_short_trades,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.long_entries.is_empty() && self.short_entries.is_empty()
    }

    /// Total remaining size across all entries on one side.
    pub fn open_size(&self, side: Side) -> f64 {
        self.entries(side).iter().map(|e| e.remaining_size).sum()
    }

    pub fn open(&mut self, side: Side, price: f64, size: f64) -> Result<(), EngineError> {
        if !(price > 0.0) || !price.is_finite() {
            return Err(EngineError::InvalidPrice { price });
        }
        if !(size > 0.0) || !size.is_finite() {
            return Err(EngineError::InvalidSize { size });
        }
        self.entries_mut(side).push(Entry::new(price, size));
        Ok(())
    }

    /// Decrease an entry's remaining size. Removes the entry when it reaches zero.
    /// Returns `true` if the entry was removed.
    pub fn reduce(&mut self, side: Side, index: usize, amount: f64) -> Result<bool, EngineError> {
        let entry = self.entry_mut(side, index)?;
        if !(amount > 0.0) || amount > entry.remaining_size {
            return Err(EngineError::InvalidReduction {
                side,
                index,
                amount,
                remaining: entry.remaining_size,
            });
        }
        entry.remaining_size -= amount;
        if entry.remaining_size == 0.0 {
            self.entries_mut(side).remove(index);
            return Ok(true);
        }
        Ok(false)
    }

    pub fn mark_tp1(&mut self, side: Side, index: usize) -> Result<(), EngineError> {
        self.entry_mut(side, index)?.tp1_done = true;
        Ok(())
    }

    /// Remove an entry entirely. Only TP2 closes bump the completed counter.
    pub fn close(&mut self, side: Side, index: usize, reason: ExitReason) -> Result<Entry, EngineError> {
        if index >= self.entries(side).len() {
            return Err(EngineError::EntryNotFound { side, index });
        }
        let entry = self.entries_mut(side).remove(index);
        if reason.counts_as_completed() {
            match side {
                Side::Long => self.completed_long_trades += 1,
                Side::Short => self.completed_short_trades += 1,
            }
        }
        Ok(entry)
    }

    pub fn to_json(&self) -> Result<String, ScaletraderError> {
        serde_json::to_string_pretty(self).map_err(|e| ScaletraderError::State {
            reason: format!("failed to serialize state: {}", e),
        })
    }

    /// Parse a persisted state. Entries must carry a positive finite price
    /// and remaining size, as `open` and `reduce` guarantee.
    pub fn from_json(data: &str) -> Result<Self, ScaletraderError> {
        let state: StrategyState = serde_json::from_str(data).map_err(|e| ScaletraderError::State {
            reason: format!("failed to parse state: {}", e),
        })?;
        state.check_entries()?;
        Ok(state)
    }

    fn check_entries(&self) -> Result<(), ScaletraderError> {
        for side in [Side::Long, Side::Short] {
            for (index, entry) in self.entries(side).iter().enumerate() {
                let valid = |v: f64| v > 0.0 && v.is_finite();
                if !valid(entry.entry_price) || !valid(entry.remaining_size) {
                    return Err(ScaletraderError::State {
                        reason: format!(
                            "corrupt {} entry {}: price {}, remaining {}",
                            side, index, entry.entry_price, entry.remaining_size
                        ),
                    });
                }
            }
        }
        Ok(())
    }
}
