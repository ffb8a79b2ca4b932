//! Port traits: the boundaries between the domain and the outside world.

pub mod config_port;
pub mod data_port;
pub mod execution_port;
pub mod state_port;
pub mod trade_log_port;
