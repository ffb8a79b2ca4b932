//! Strategy state persistence port.

use crate::domain::error::ScaletraderError;
use crate::domain::ledger::StrategyState;

pub trait StatePort {
    /// `Ok(None)` when nothing has been saved yet.
    fn load(&self) -> Result<Option<StrategyState>, ScaletraderError>;
    fn save(&self, state: &StrategyState) -> Result<(), ScaletraderError>;
}
