//! Paper execution sink: fills every order at the requested price plus
//! slippage, or refuses everything when configured to reject.

use crate::domain::error::ScaletraderError;
use crate::domain::execution::{apply_slippage, calculate_commission, ExecutionConfig};
use crate::domain::trade_log::{Action, Fill};
use crate::ports::execution_port::ExecutionPort;
use tracing::info;

pub struct PaperExecutionAdapter {
    config: ExecutionConfig,
    reject: bool,
    submitted: Vec<Action>,
}

impl PaperExecutionAdapter {
    pub fn new(config: ExecutionConfig) -> Self {
        Self {
            config,
            reject: false,
            submitted: Vec::new(),
        }
    }

    pub fn rejecting(config: ExecutionConfig) -> Self {
        Self {
            reject: true,
            ..Self::new(config)
        }
    }

    pub fn submitted(&self) -> &[Action] {
        &self.submitted
    }
}

impl ExecutionPort for PaperExecutionAdapter {
    fn submit(&mut self, action: &Action) -> Result<Fill, ScaletraderError> {
        self.submitted.push(*action);
        if self.reject {
            return Err(ScaletraderError::Execution {
                reason: format!("paper broker rejected {}", action),
            });
        }

        let price = apply_slippage(action.price, action.order_side(), self.config.slippage_pct);
        let commission = calculate_commission(price * action.size, &self.config);
        info!(%action, fill_price = price, commission, "paper fill");
        Ok(Fill {
            price,
            size: action.size,
            commission,
        })
    }
}
