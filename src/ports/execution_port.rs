//! Execution sink port. A real exchange client plugs in here.

use crate::domain::error::ScaletraderError;
use crate::domain::trade_log::{Action, Fill};

pub trait ExecutionPort {
    /// Submit a market order for `action`. An `Err` means nothing was
    /// filled and the engine must be told to reject the action.
    fn submit(&mut self, action: &Action) -> Result<Fill, ScaletraderError>;
}
