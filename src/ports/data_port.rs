//! Bar source port.

use crate::domain::error::ScaletraderError;
use crate::domain::ohlcv::PriceBar;

pub trait DataPort {
    /// Daily bars for `symbol`, oldest first.
    fn fetch_bars(&self, symbol: &str) -> Result<Vec<PriceBar>, ScaletraderError>;
}
