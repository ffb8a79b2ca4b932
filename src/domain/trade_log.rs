//! Engine actions, execution fills and the fixed-shape trade event record.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::position::{ExitReason, OrderSide, Side};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Operation {
    Open,
    ExitPartial,
    ExitFull,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Open => write!(f, "open"),
            Operation::ExitPartial => write!(f, "exitPartial"),
            Operation::ExitFull => write!(f, "exitFull"),
        }
    }
}

/// What the engine asks the caller to execute. Ephemeral.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Action {
    pub operation: Operation,
    pub side: Side,
    pub size: f64,
    pub price: f64,
    pub entry_index: Option<usize>,
    pub reason: Option<ExitReason>,
}

impl Action {
    pub fn open(side: Side, size: f64, price: f64) -> Self {
        Action {
            operation: Operation::Open,
            side,
            size,
            price,
            entry_index: None,
            reason: None,
        }
    }

    pub fn exit(side: Side, index: usize, reason: ExitReason, size: f64, price: f64) -> Self {
        let operation = match reason {
            ExitReason::Tp1 => Operation::ExitPartial,
            ExitReason::StopLoss | ExitReason::Tp2 => Operation::ExitFull,
        };
        Action {
            operation,
            side,
            size,
            price,
            entry_index: Some(index),
            reason: Some(reason),
        }
    }

    /// Market order direction implied by this action.
    pub fn order_side(&self) -> OrderSide {
        match self.operation {
            Operation::Open => self.side.opening_order(),
            Operation::ExitPartial | Operation::ExitFull => self.side.closing_order(),
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} size={:.8} @ {:.2}",
            self.order_side(),
            self.side,
            self.operation,
            self.size,
            self.price
        )?;
        if let Some(reason) = self.reason {
            write!(f, " [{}]", reason)?;
        }
        Ok(())
    }
}

/// Execution report from the execution sink.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Fill {
    pub price: f64,
    pub size: f64,
    pub commission: f64,
}

impl Fill {
    pub fn at(price: f64, size: f64) -> Self {
        Fill {
            price,
            size,
            commission: 0.0,
        }
    }
}

/// Append-only record of one confirmed fill.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeEvent {
    pub date: NaiveDate,
    pub side: Side,
    pub operation: Operation,
    pub reason: Option<ExitReason>,
    pub order_side: OrderSide,
    pub price: f64,
    pub size: f64,
    pub commission: f64,
    pub realized_pnl: f64,
}

impl TradeEvent {
    pub fn is_exit(&self) -> bool {
        !matches!(self.operation, Operation::Open)
    }
}
