//! Entry signal detection.
//!
//! - `NewLong`: close crossed above both the fast and slow MA on this bar
//!   while still below the trend MA
//! - `NewShort`: close crossed below both MAs while above the trend MA
//!
//! Long is checked before short.

use crate::domain::indicator::IndicatorSnapshot;
use crate::domain::position::Side;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    NewLong,
    NewShort,
    None,
}

impl Signal {
    pub fn side(&self) -> Option<Side> {
        match self {
            Signal::NewLong => Some(Side::Long),
            Signal::NewShort => Some(Side::Short),
            Signal::None => None,
        }
    }
}

pub fn detect(snap: &IndicatorSnapshot) -> Signal {
    let price = snap.close;

    if snap.crossed_above_fast() && snap.crossed_above_slow() && price < snap.trend {
        return Signal::NewLong;
    }

    if snap.crossed_below_fast() && snap.crossed_below_slow() && price > snap.trend {
        return Signal::NewShort;
    }

    Signal::None
}
