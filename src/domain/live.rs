//! One-shot live step, run once per closed daily bar.
//!
//! load state → warm indicators on all but the latest bar → evaluate the
//! latest bar → submit → confirm or reject → save state → append trade log.
//!
//! A refused order is not an error: the state is saved unchanged and the
//! next scheduled run evaluates again.

use chrono::NaiveDate;
use tracing::{error, info, warn};

use super::engine::Engine;
use super::error::{EngineError, ScaletraderError};
use super::ledger::StrategyState;
use super::ohlcv;
use super::strategy::StrategyParams;
use super::trade_log::{Action, TradeEvent};
use crate::ports::data_port::DataPort;
use crate::ports::execution_port::ExecutionPort;
use crate::ports::state_port::StatePort;
use crate::ports::trade_log_port::TradeLogPort;

/// Account figures the engine sizes entries against.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AccountSnapshot {
    pub equity: f64,
    pub cash: f64,
}

#[derive(Debug, Clone)]
pub struct LiveOutcome {
    pub date: NaiveDate,
    pub close: f64,
    pub action: Option<Action>,
    pub event: Option<TradeEvent>,
    pub execution_error: Option<String>,
    pub skipped: Option<EngineError>,
    pub state: StrategyState,
}

impl LiveOutcome {
    pub fn executed(&self) -> bool {
        self.event.is_some()
    }
}

pub struct LivePorts<'a> {
    pub data: &'a dyn DataPort,
    pub execution: &'a mut dyn ExecutionPort,
    pub state: &'a dyn StatePort,
    pub trade_log: &'a mut dyn TradeLogPort,
}

pub fn run_live_step(
    symbol: &str,
    params: &StrategyParams,
    account: AccountSnapshot,
    mut ports: LivePorts<'_>,
) -> Result<LiveOutcome, ScaletraderError> {
    let bars = ports.data.fetch_bars(symbol)?;
    ohlcv::validate_series(&bars)?;

    let state = ports.state.load()?.unwrap_or_default();
    info!(
        symbol,
        longs = state.long_entries.len(),
        shorts = state.short_entries.len(),
        "state loaded"
    );
    let mut engine = Engine::with_state(params.clone(), state);

    let minimum = engine.indicators().required_history();
    let Some((latest, history)) = bars.split_last() else {
        return Err(ScaletraderError::InsufficientData {
            symbol: symbol.to_string(),
            bars: 0,
            minimum,
        });
    };
    if bars.len() < minimum {
        return Err(ScaletraderError::InsufficientData {
            symbol: symbol.to_string(),
            bars: bars.len(),
            minimum,
        });
    }

    engine.warm_up(history);

    let mut outcome = LiveOutcome {
        date: latest.date,
        close: latest.close,
        action: None,
        event: None,
        execution_error: None,
        skipped: None,
        state: StrategyState::new(),
    };

    match engine.evaluate(latest, account.equity, account.cash) {
        Ok(Some(action)) => {
            outcome.action = Some(action);
            match ports.execution.submit(&action) {
                Ok(fill) => outcome.event = Some(engine.confirm(&fill)?),
                Err(e) => {
                    error!(symbol, %action, error = %e, "order failed; state left unchanged");
                    engine.reject()?;
                    outcome.execution_error = Some(e.to_string());
                }
            }
        }
        Ok(None) => info!(symbol, date = %latest.date, "no action"),
        Err(e) if e.is_skippable() => {
            warn!(symbol, date = %latest.date, reason = %e, "bar skipped");
            outcome.skipped = Some(e);
        }
        Err(e) => return Err(e.into()),
    }

    ports.state.save(engine.state())?;
    if let Some(event) = &outcome.event {
        ports.trade_log.append(event)?;
    }

    outcome.state = engine.into_state();
    Ok(outcome)
}
