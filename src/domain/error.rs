//! Domain error types.

use crate::domain::position::Side;

/// Errors raised by the ledger and the engine orchestrator.
///
/// `InvalidPrice` and `WarmingUp` are input errors: the bar is skipped and
/// nothing is mutated. The remaining variants are bookkeeping invariant
/// violations and must never be clamped away.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EngineError {
    #[error("invalid price {price}: must be positive")]
    InvalidPrice { price: f64 },

    #[error("indicators warming up: have {have} closes, need {need}")]
    WarmingUp { have: usize, need: usize },

    #[error("an action is awaiting confirmation")]
    ActionPending,

    #[error("no action is awaiting confirmation")]
    NoPendingAction,

    #[error("invalid size {size}: must be positive")]
    InvalidSize { size: f64 },

    #[error("invalid reduction of {side} entry {index}: amount {amount}, remaining {remaining}")]
    InvalidReduction {
        side: Side,
        index: usize,
        amount: f64,
        remaining: f64,
    },

    #[error("no {side} entry at index {index}")]
    EntryNotFound { side: Side, index: usize },
}

impl EngineError {
    /// Input errors skip the bar; everything else indicates a logic defect.
    pub fn is_skippable(&self) -> bool {
        matches!(
            self,
            EngineError::InvalidPrice { .. } | EngineError::WarmingUp { .. }
        )
    }
}

/// Top-level error type for scaletrader.
#[derive(Debug, thiserror::Error)]
pub enum ScaletraderError {
    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("data error: {reason}")]
    Data { reason: String },

    #[error("insufficient data for {symbol}: have {bars} bars, need {minimum}")]
    InsufficientData {
        symbol: String,
        bars: usize,
        minimum: usize,
    },

    #[error("state error: {reason}")]
    State { reason: String },

    #[error("execution error: {reason}")]
    Execution { reason: String },

    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&ScaletraderError> for std::process::ExitCode {
    fn from(err: &ScaletraderError) -> Self {
        let code: u8 = match err {
            ScaletraderError::Io(_) => 1,
            ScaletraderError::ConfigParse { .. }
            | ScaletraderError::ConfigMissing { .. }
            | ScaletraderError::ConfigInvalid { .. } => 2,
            ScaletraderError::Data { .. } | ScaletraderError::InsufficientData { .. } => 3,
            ScaletraderError::State { .. } => 4,
            ScaletraderError::Execution { .. } | ScaletraderError::Engine(_) => 5,
        };
        std::process::ExitCode::from(code)
    }
}
