//! Append-only CSV trade log. The header is written only when the file is
//! new or empty, so repeated live runs keep appending to one file.

use crate::domain::error::ScaletraderError;
use crate::domain::trade_log::TradeEvent;
use crate::ports::trade_log_port::TradeLogPort;
use std::fs::OpenOptions;
use std::path::PathBuf;

pub struct CsvTradeLogAdapter {
    path: PathBuf,
}

impl CsvTradeLogAdapter {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    fn needs_header(&self) -> bool {
        std::fs::metadata(&self.path)
            .map(|m| m.len() == 0)
            .unwrap_or(true)
    }

    /// Append a batch of events, e.g. a whole backtest run.
    pub fn append_all(&mut self, events: &[TradeEvent]) -> Result<(), ScaletraderError> {
        events.iter().try_for_each(|e| self.append(e))
    }
}

impl TradeLogPort for CsvTradeLogAdapter {
    fn append(&mut self, event: &TradeEvent) -> Result<(), ScaletraderError> {
        let has_headers = self.needs_header();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        let mut writer = csv::WriterBuilder::new()
            .has_headers(has_headers)
            .from_writer(file);
        writer.serialize(event).map_err(|e| ScaletraderError::Data {
            reason: format!("failed to write trade log {}: {}", self.path.display(), e),
        })?;
        writer.flush()?;
        Ok(())
    }
}
