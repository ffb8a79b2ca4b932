//! scaletrader: moving-average crossover strategy with staged take-profit
//! and stop-loss exits, run as a backtest or as a once-per-bar live step.
//!
//! Hexagonal architecture: domain logic in [`domain`], port traits in [`ports`],
//! concrete implementations in [`adapters`].

pub mod domain;
pub mod ports;
pub mod adapters;
pub mod cli;
