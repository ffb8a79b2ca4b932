//! Core domain types and logic.

pub mod ohlcv;
pub mod position;
pub mod ledger;
pub mod indicator;
pub mod signal;
pub mod exit_rules;
pub mod trade_log;
pub mod engine;
pub mod strategy;
pub mod execution;
pub mod backtest;
pub mod metrics;
pub mod live;
pub mod config_validation;
pub mod error;
