#![allow(dead_code)]

use chrono::NaiveDate;
use scaletrader::domain::error::ScaletraderError;
use scaletrader::domain::ledger::StrategyState;
pub use scaletrader::domain::ohlcv::PriceBar;
use scaletrader::domain::strategy::StrategyParams;
use scaletrader::domain::trade_log::{Action, Fill, TradeEvent};
use scaletrader::ports::data_port::DataPort;
use scaletrader::ports::execution_port::ExecutionPort;
use scaletrader::ports::state_port::StatePort;
use scaletrader::ports::trade_log_port::TradeLogPort;
use std::cell::RefCell;
use std::collections::HashMap;

pub struct MockDataPort {
    pub data: HashMap<String, Vec<PriceBar>>,
    pub errors: HashMap<String, String>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
        }
    }

    pub fn with_bars(mut self, symbol: &str, bars: Vec<PriceBar>) -> Self {
        self.data.insert(symbol.to_string(), bars);
        self
    }

    pub fn with_error(mut self, symbol: &str, reason: &str) -> Self {
        self.errors.insert(symbol.to_string(), reason.to_string());
        self
    }
}

impl DataPort for MockDataPort {
    fn fetch_bars(&self, symbol: &str) -> Result<Vec<PriceBar>, ScaletraderError> {
        if let Some(reason) = self.errors.get(symbol) {
            return Err(ScaletraderError::Data {
                reason: reason.clone(),
            });
        }
        Ok(self.data.get(symbol).cloned().unwrap_or_default())
    }
}

/// Fills at the requested price, or refuses everything when `reject` is set.
pub struct MockExecutionPort {
    pub reject: bool,
    pub submitted: Vec<Action>,
}

impl MockExecutionPort {
    pub fn filling() -> Self {
        Self {
            reject: false,
            submitted: Vec::new(),
        }
    }

    pub fn rejecting() -> Self {
        Self {
            reject: true,
            submitted: Vec::new(),
        }
    }
}

impl ExecutionPort for MockExecutionPort {
    fn submit(&mut self, action: &Action) -> Result<Fill, ScaletraderError> {
        self.submitted.push(*action);
        if self.reject {
            return Err(ScaletraderError::Execution {
                reason: "exchange unavailable".into(),
            });
        }
        Ok(Fill::at(action.price, action.size))
    }
}

/// Keeps the state as a JSON string, so every save/load is a real round trip.
pub struct MemoryStatePort {
    pub json: RefCell<Option<String>>,
    pub saves: RefCell<usize>,
}

impl MemoryStatePort {
    pub fn empty() -> Self {
        Self {
            json: RefCell::new(None),
            saves: RefCell::new(0),
        }
    }

    pub fn with_state(state: &StrategyState) -> Self {
        let port = Self::empty();
        *port.json.borrow_mut() = Some(state.to_json().unwrap());
        port
    }

    pub fn current(&self) -> Option<StrategyState> {
        self.json
            .borrow()
            .as_deref()
            .map(|s| StrategyState::from_json(s).unwrap())
    }
}

impl StatePort for MemoryStatePort {
    fn load(&self) -> Result<Option<StrategyState>, ScaletraderError> {
        self.json
            .borrow()
            .as_deref()
            .map(StrategyState::from_json)
            .transpose()
    }

    fn save(&self, state: &StrategyState) -> Result<(), ScaletraderError> {
        *self.json.borrow_mut() = Some(state.to_json()?);
        *self.saves.borrow_mut() += 1;
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryTradeLog {
    pub events: Vec<TradeEvent>,
}

impl TradeLogPort for MemoryTradeLog {
    fn append(&mut self, event: &TradeEvent) -> Result<(), ScaletraderError> {
        self.events.push(event.clone());
        Ok(())
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// One bar per day starting 2024-01-01.
pub fn bars_from_closes(closes: &[f64]) -> Vec<PriceBar> {
    let start = date(2024, 1, 1);
    closes
        .iter()
        .enumerate()
        .map(|(i, &c)| PriceBar::from_close(start + chrono::Duration::days(i as i64), c))
        .collect()
}

/// Short windows so scenarios stay readable: 4 closes warm the indicators.
pub fn small_params() -> StrategyParams {
    StrategyParams {
        ma_fast: 2,
        ma_slow: 3,
        ma_trend: 4,
        buy_pct: 0.1,
        tp1_pct: 0.08,
        tp2_pct: 0.14,
        sl_pct: 0.18,
        tp1_sell_fraction: 0.9,
    }
}

/// Dip-and-recover block: long at 104, TP1 at 113, TP2 at 119.
pub const LONG_CYCLE: [f64; 7] = [130.0, 120.0, 100.0, 95.0, 104.0, 113.0, 119.0];

/// A longer series mixing entries on both sides, exits and one bad bar.
pub fn mixed_series() -> Vec<f64> {
    let mut closes = LONG_CYCLE.to_vec();
    closes.extend([70.0, 80.0, 100.0, 105.0, 96.0, 88.0, 84.0, 0.0, 90.0]);
    closes.extend((0..120).map(|i| {
        let t = i as f64;
        100.0 + 18.0 * (t * 0.21).sin() + 6.0 * (t * 1.3).cos()
    }));
    closes
}

pub fn single_long(price: f64, size: f64) -> StrategyState {
    let mut state = StrategyState::new();
    state.open(scaletrader::domain::position::Side::Long, price, size).unwrap();
    state
}
