//! CSV file bar source.
//!
//! Expects a header row `date,open,high,low,close,volume`. Dates may be
//! plain `YYYY-MM-DD` or carry a time of day (`YYYY-MM-DD HH:MM:SS[.f]`),
//! which is dropped since bars are daily. Rows are returned in file order;
//! ordering is checked by `ohlcv::validate_series`.

use crate::domain::error::ScaletraderError;
use crate::domain::ohlcv::PriceBar;
use crate::ports::data_port::DataPort;
use chrono::{NaiveDate, NaiveDateTime};
use std::fs;
use std::path::PathBuf;
use tracing::debug;

pub struct CsvAdapter {
    path: PathBuf,
}

impl CsvAdapter {
    /// `path` is either a single CSV file or a directory of `<SYMBOL>.csv`.
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    fn csv_path(&self, symbol: &str) -> PathBuf {
        if self.path.is_dir() {
            self.path.join(format!("{}.csv", symbol))
        } else {
            self.path.clone()
        }
    }
}

pub fn parse_bar_date(value: &str) -> Result<NaiveDate, ScaletraderError> {
    let value = value.trim();
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Ok(date);
    }
    NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S%.f")
        .map(|dt| dt.date())
        .map_err(|e| ScaletraderError::Data {
            reason: format!("invalid date '{}': {}", value, e),
        })
}

fn parse_field(record: &csv::StringRecord, index: usize, name: &str) -> Result<f64, ScaletraderError> {
    record
        .get(index)
        .ok_or_else(|| ScaletraderError::Data {
            reason: format!("missing {} column", name),
        })?
        .trim()
        .parse()
        .map_err(|e| ScaletraderError::Data {
            reason: format!("invalid {} value: {}", name, e),
        })
}

impl DataPort for CsvAdapter {
    fn fetch_bars(&self, symbol: &str) -> Result<Vec<PriceBar>, ScaletraderError> {
        let path = self.csv_path(symbol);
        let content = fs::read_to_string(&path).map_err(|e| ScaletraderError::Data {
            reason: format!("failed to read {}: {}", path.display(), e),
        })?;

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let mut bars = Vec::new();

        for result in rdr.records() {
            let record = result.map_err(|e| ScaletraderError::Data {
                reason: format!("CSV parse error: {}", e),
            })?;

            let date_str = record.get(0).ok_or_else(|| ScaletraderError::Data {
                reason: "missing date column".into(),
            })?;

            bars.push(PriceBar {
                date: parse_bar_date(date_str)?,
                open: parse_field(&record, 1, "open")?,
                high: parse_field(&record, 2, "high")?,
                low: parse_field(&record, 3, "low")?,
                close: parse_field(&record, 4, "close")?,
                volume: parse_field(&record, 5, "volume")?,
            });
        }

        debug!(symbol, path = %path.display(), bars = bars.len(), "bars loaded");
        Ok(bars)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const CSV: &str = "date,open,high,low,close,volume\n\
        2024-01-15,100.0,110.0,90.0,105.0,500\n\
        2024-01-16,105.0,115.0,100.0,110.0,600.5\n\
        2024-01-17,110.0,120.0,105.0,115.0,550\n";

    fn setup_test_data() -> (TempDir, PathBuf) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().to_path_buf();
        fs::write(path.join("BTCUSDT.csv"), CSV).unwrap();
        fs::write(path.join("EMPTY.csv"), "date,open,high,low,close,volume\n").unwrap();
        (dir, path)
    }

    #[test]
    fn fetch_bars_from_directory() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path);
        let bars = adapter.fetch_bars("BTCUSDT").unwrap();

        assert_eq!(bars.len(), 3);
        assert_eq!(bars[0].date, NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
        assert_eq!(bars[0].open, 100.0);
        assert_eq!(bars[0].high, 110.0);
        assert_eq!(bars[0].low, 90.0);
        assert_eq!(bars[0].close, 105.0);
        assert_eq!(bars[1].volume, 600.5);
    }

    #[test]
    fn fetch_bars_from_single_file_ignores_symbol() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path.join("BTCUSDT.csv"));
        assert_eq!(adapter.fetch_bars("anything").unwrap().len(), 3);
    }

    #[test]
    fn empty_file_yields_no_bars() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path);
        assert!(adapter.fetch_bars("EMPTY").unwrap().is_empty());
    }

    #[test]
    fn missing_file_is_data_error() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path);
        let result = adapter.fetch_bars("XYZ");
        assert!(matches!(result, Err(ScaletraderError::Data { .. })));
    }

    #[test]
    fn timestamped_dates_accepted() {
        assert_eq!(
            parse_bar_date("2023-03-01 00:00:00.000").unwrap(),
            NaiveDate::from_ymd_opt(2023, 3, 1).unwrap()
        );
        assert_eq!(
            parse_bar_date("2023-03-01 00:00:00").unwrap(),
            NaiveDate::from_ymd_opt(2023, 3, 1).unwrap()
        );
        assert!(parse_bar_date("01/03/2023").is_err());
    }

    #[test]
    fn bad_close_is_data_error() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("bad.csv");
        fs::write(&file, "date,open,high,low,close,volume\n2024-01-15,1,1,1,abc,1\n").unwrap();
        let err = CsvAdapter::new(file).fetch_bars("bad").unwrap_err();
        assert!(err.to_string().contains("invalid close value"));
    }

    #[test]
    fn out_of_order_rows_kept_for_validation() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("swapped.csv");
        fs::write(
            &file,
            "date,open,high,low,close,volume\n2024-01-16,1,1,1,110,1\n2024-01-15,1,1,1,105,1\n",
        )
        .unwrap();
        let bars = CsvAdapter::new(file).fetch_bars("swapped").unwrap();
        assert_eq!(bars[0].date, NaiveDate::from_ymd_opt(2024, 1, 16).unwrap());

        let err = crate::domain::ohlcv::validate_series(&bars).unwrap_err();
        assert!(matches!(err, ScaletraderError::Data { .. }));
    }
}
