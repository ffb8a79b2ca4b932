//! JSON file persistence for `StrategyState`.
//!
//! Saves go through a sibling `.tmp` file that is fsynced and then renamed
//! over the target, so a crash mid-write leaves the previous state intact.

use crate::domain::error::ScaletraderError;
use crate::domain::ledger::StrategyState;
use crate::ports::state_port::StatePort;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;

pub struct JsonStateAdapter {
    path: PathBuf,
}

impl JsonStateAdapter {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

fn state_error(action: &str, path: &Path, e: std::io::Error) -> ScaletraderError {
    ScaletraderError::State {
        reason: format!("failed to {} {}: {}", action, path.display(), e),
    }
}

impl StatePort for JsonStateAdapter {
    fn load(&self) -> Result<Option<StrategyState>, ScaletraderError> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "no state file, starting empty");
            return Ok(None);
        }
        let data = fs::read_to_string(&self.path).map_err(|e| state_error("read", &self.path, e))?;
        StrategyState::from_json(&data).map(Some)
    }

    fn save(&self, state: &StrategyState) -> Result<(), ScaletraderError> {
        let json = state.to_json()?;
        let temp_path = self.temp_path();

        let mut file = File::create(&temp_path).map_err(|e| state_error("create", &temp_path, e))?;
        file.write_all(json.as_bytes())
            .map_err(|e| state_error("write", &temp_path, e))?;
        file.sync_all().map_err(|e| state_error("sync", &temp_path, e))?;
        fs::rename(&temp_path, &self.path).map_err(|e| state_error("rename", &self.path, e))?;

        debug!(path = %self.path.display(), "state saved");
        Ok(())
    }
}
