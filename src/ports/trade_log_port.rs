//! Append-only trade log port.

use crate::domain::error::ScaletraderError;
use crate::domain::trade_log::TradeEvent;

pub trait TradeLogPort {
    fn append(&mut self, event: &TradeEvent) -> Result<(), ScaletraderError>;
}
