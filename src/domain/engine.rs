//! Per-bar engine orchestrator.
//!
//! Each `evaluate` call proposes at most one `Action`. The ledger is not
//! touched until the caller reports the outcome: `confirm` applies the
//! mutation and returns a `TradeEvent`, `reject` drops the proposal. While a
//! proposal is outstanding the engine is `AwaitingConfirmation` and refuses
//! to evaluate.
//!
//! Per bar:
//! 1. refuse if awaiting confirmation
//! 2. reject non-positive prices (nothing mutated)
//! 3. update indicators, skip while warming up
//! 4. entry signal: size = equity * buy_pct / price; longs need
//!    cash >= equity * buy_pct, shorts are unconstrained
//! 5. otherwise exit rules, longs before shorts

use chrono::NaiveDate;
use tracing::{debug, info, warn};

use super::error::EngineError;
use super::exit_rules;
use super::indicator::IndicatorCalculator;
use super::ledger::StrategyState;
use super::ohlcv::PriceBar;
use super::position::{ExitReason, Side};
use super::signal::{self, Signal};
use super::strategy::StrategyParams;
use super::trade_log::{Action, Fill, Operation, TradeEvent};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnginePhase {
    Idle,
    AwaitingConfirmation,
}

#[derive(Debug, Clone)]
struct PendingAction {
    action: Action,
    date: NaiveDate,
}

#[derive(Debug, Clone)]
pub struct Engine {
    params: StrategyParams,
    indicators: IndicatorCalculator,
    state: StrategyState,
    pending: Option<PendingAction>,
}

impl Engine {
    pub fn new(params: StrategyParams) -> Self {
        Self::with_state(params, StrategyState::new())
    }

    pub fn with_state(params: StrategyParams, state: StrategyState) -> Self {
        let indicators = IndicatorCalculator::new(params.ma_fast, params.ma_slow, params.ma_trend);
        Engine {
            params,
            indicators,
            state,
            pending: None,
        }
    }

    pub fn params(&self) -> &StrategyParams {
        &self.params
    }

    pub fn state(&self) -> &StrategyState {
        &self.state
    }

    pub fn into_state(self) -> StrategyState {
        self.state
    }

    pub fn indicators(&self) -> &IndicatorCalculator {
        &self.indicators
    }

    pub fn phase(&self) -> EnginePhase {
        match self.pending {
            Some(_) => EnginePhase::AwaitingConfirmation,
            None => EnginePhase::Idle,
        }
    }

    pub fn pending(&self) -> Option<&Action> {
        self.pending.as_ref().map(|p| &p.action)
    }

    /// Feed history closes without evaluating any rules. Non-positive
    /// closes are skipped, as `evaluate` would skip them.
    pub fn warm_up(&mut self, bars: &[PriceBar]) {
        for bar in bars {
            if is_valid_price(bar.close) {
                self.indicators.push(bar.close);
            }
        }
    }

    pub fn evaluate(
        &mut self,
        bar: &PriceBar,
        account_equity: f64,
        available_cash: f64,
    ) -> Result<Option<Action>, EngineError> {
        if self.pending.is_some() {
            return Err(EngineError::ActionPending);
        }

        let price = bar.close;
        if !is_valid_price(price) {
            return Err(EngineError::InvalidPrice { price });
        }

        self.indicators.push(price);
        let snap = self.indicators.snapshot().ok_or(EngineError::WarmingUp {
            have: self.indicators.len(),
            need: self.indicators.required_history(),
        })?;

        let action = match signal::detect(&snap) {
            Signal::None => None,
            sig => self.size_entry(sig, price, account_equity, available_cash),
        };

        let action = action.or_else(|| {
            exit_rules::evaluate(
                &self.state.long_entries,
                &self.state.short_entries,
                price,
                &self.params.exit_params(),
            )
            .map(|d| Action::exit(d.side, d.index, d.reason, d.size, price))
        });

        if let Some(action) = action {
            info!(date = %bar.date, %action, "proposing action");
            self.pending = Some(PendingAction {
                action,
                date: bar.date,
            });
        }

        Ok(action)
    }

    fn size_entry(&self, sig: Signal, price: f64, equity: f64, cash: f64) -> Option<Action> {
        let side = sig.side()?;
        let amount = equity * self.params.buy_pct;
        let size = amount / price;

        if !(size > 0.0) || !size.is_finite() {
            warn!(%side, equity, "entry signal ignored: non-positive size");
            return None;
        }
        if side == Side::Long && cash < amount {
            debug!(cash, amount, "long signal ignored: insufficient cash");
            return None;
        }

        debug!(%side, price, amount, size, "entry signal");
        Some(Action::open(side, size, price))
    }

    /// Apply the outstanding action after the execution sink filled it.
    pub fn confirm(&mut self, fill: &Fill) -> Result<TradeEvent, EngineError> {
        if !is_valid_price(fill.price) {
            return Err(EngineError::InvalidPrice { price: fill.price });
        }
        let PendingAction { action, date } = self.pending.take().ok_or(EngineError::NoPendingAction)?;

        let realized_pnl = match (action.operation, action.entry_index, action.reason) {
            (Operation::Open, _, _) => {
                self.state.open(action.side, action.price, action.size)?;
                0.0
            }
            (Operation::ExitPartial, Some(index), Some(ExitReason::Tp1)) => {
                let entry = self.state.entry(action.side, index)?.clone();
                let removed = self.state.reduce(action.side, index, action.size)?;
                if !removed {
                    self.state.mark_tp1(action.side, index)?;
                }
                entry.realized_pnl(action.side, fill.price, action.size)
            }
            (Operation::ExitFull, Some(index), Some(reason)) => {
                let entry = self.state.close(action.side, index, reason)?;
                entry.realized_pnl(action.side, fill.price, entry.remaining_size)
            }
            _ => {
                return Err(EngineError::EntryNotFound {
                    side: action.side,
                    index: action.entry_index.unwrap_or(usize::MAX),
                });
            }
        };

        let event = TradeEvent {
            date,
            side: action.side,
            operation: action.operation,
            reason: action.reason,
            order_side: action.order_side(),
            price: fill.price,
            size: action.size,
            commission: fill.commission,
            realized_pnl,
        };
        info!(
            date = %event.date,
            side = %event.side,
            operation = %event.operation,
            price = event.price,
            size = event.size,
            realized_pnl = event.realized_pnl,
            "action confirmed"
        );
        Ok(event)
    }

    /// Drop the outstanding action; the ledger is left exactly as it was.
    pub fn reject(&mut self) -> Result<Action, EngineError> {
        let pending = self.pending.take().ok_or(EngineError::NoPendingAction)?;
        warn!(date = %pending.date, action = %pending.action, "action rejected");
        Ok(pending.action)
    }
}

fn is_valid_price(price: f64) -> bool {
    price.is_finite() && price > 0.0
}
