//! Fill simulation for backtests.
//!
//! Fills happen immediately at the action price with percentage slippage
//! (buys fill higher, sells lower) and a commission on the traded value.
//! The broker nets long and short entries into one signed position, so
//! shorting credits cash and equity is `cash + position * mark`.

use tracing::debug;

use super::error::ScaletraderError;
use super::position::OrderSide;
use super::trade_log::{Action, Fill, Operation};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExecutionConfig {
    /// Fraction of traded value, e.g. 0.0005 for 0.05%.
    pub commission_pct: f64,
    /// Fraction of price, e.g. 0.0003 for 0.03%.
    pub slippage_pct: f64,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        ExecutionConfig {
            commission_pct: 0.0,
            slippage_pct: 0.0,
        }
    }
}

pub fn calculate_commission(trade_value: f64, config: &ExecutionConfig) -> f64 {
    trade_value.abs() * config.commission_pct
}

/// Buy: `price * (1 + slippage)`. Sell: `price * (1 - slippage)`.
pub fn apply_slippage(market_price: f64, order_side: OrderSide, slippage_pct: f64) -> f64 {
    match order_side {
        OrderSide::Buy => market_price * (1.0 + slippage_pct),
        OrderSide::Sell => market_price * (1.0 - slippage_pct),
    }
}

#[derive(Debug, Clone)]
pub struct SimBroker {
    config: ExecutionConfig,
    cash: f64,
    position: f64,
    total_commission: f64,
}

impl SimBroker {
    pub fn new(initial_cash: f64, config: ExecutionConfig) -> Self {
        SimBroker {
            config,
            cash: initial_cash,
            position: 0.0,
            total_commission: 0.0,
        }
    }

    pub fn cash(&self) -> f64 {
        self.cash
    }

    /// Net units held; negative when net short.
    pub fn position(&self) -> f64 {
        self.position
    }

    pub fn total_commission(&self) -> f64 {
        self.total_commission
    }

    pub fn equity(&self, mark_price: f64) -> f64 {
        self.cash + self.position * mark_price
    }

    /// Fill `action` immediately. Opening buys that cost more than the
    /// available cash are refused and leave the account untouched. Buys that
    /// cover a short always fill, even if cash goes negative.
    pub fn execute(&mut self, action: &Action) -> Result<Fill, ScaletraderError> {
        if !(action.size > 0.0) || !action.size.is_finite() {
            return Err(ScaletraderError::Execution {
                reason: format!("invalid order size {}", action.size),
            });
        }
        if !(action.price > 0.0) || !action.price.is_finite() {
            return Err(ScaletraderError::Execution {
                reason: format!("invalid order price {}", action.price),
            });
        }

        let order_side = action.order_side();
        let price = apply_slippage(action.price, order_side, self.config.slippage_pct);
        let value = price * action.size;
        let commission = calculate_commission(value, &self.config);

        match order_side {
            OrderSide::Buy => {
                let opening = action.operation == Operation::Open;
                if opening && value + commission > self.cash {
                    return Err(ScaletraderError::Execution {
                        reason: format!(
                            "insufficient cash: need {:.2}, have {:.2}",
                            value + commission,
                            self.cash
                        ),
                    });
                }
                self.cash -= value + commission;
                self.position += action.size;
            }
            OrderSide::Sell => {
                self.cash += value - commission;
                self.position -= action.size;
            }
        }
        self.total_commission += commission;

        debug!(%order_side, price, size = action.size, commission, cash = self.cash, "simulated fill");
        Ok(Fill {
            price,
            size: action.size,
            commission,
        })
    }
}
