//! OHLCV price bar representation.

use chrono::NaiveDate;

use crate::domain::error::ScaletraderError;

#[derive(Debug, Clone, PartialEq)]
pub struct PriceBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl PriceBar {
    /// A bar whose prices are all `close`. Handy when only closes matter.
    pub fn from_close(date: NaiveDate, close: f64) -> Self {
        PriceBar {
            date,
            open: close,
            high: close,
            low: close,
            close,
            volume: 0.0,
        }
    }
}

/// Check that dates are strictly increasing (no duplicates, no reordering).
pub fn validate_series(bars: &[PriceBar]) -> Result<(), ScaletraderError> {
    for pair in bars.windows(2) {
        if pair[1].date <= pair[0].date {
            return Err(ScaletraderError::Data {
                reason: format!(
                    "bars out of order: {} follows {}",
                    pair[1].date, pair[0].date
                ),
            });
        }
    }
    Ok(())
}

pub fn closes(bars: &[PriceBar]) -> Vec<f64> {
    bars.iter().map(|b| b.close).collect()
}
