//! Configuration validation.
//!
//! Keys left out of the file fall back to the defaults in
//! `StrategyParams::default()` and `BacktestConfig::default()`, so only
//! values that are present and out of range are rejected.

use crate::domain::backtest::BacktestConfig;
use crate::domain::error::ScaletraderError;
use crate::domain::strategy::StrategyParams;
use crate::ports::config_port::ConfigPort;

pub fn validate_strategy_config(config: &dyn ConfigPort) -> Result<(), ScaletraderError> {
    validate_ma_windows(config)?;
    validate_buy_pct(config)?;
    validate_take_profit(config)?;
    validate_stop_loss(config)?;
    validate_tp1_sell_fraction(config)?;
    Ok(())
}

pub fn validate_backtest_config(config: &dyn ConfigPort) -> Result<(), ScaletraderError> {
    validate_initial_capital(config)?;
    validate_commission(config)?;
    validate_slippage(config)?;
    validate_risk_free_rate(config)?;
    Ok(())
}

pub fn validate_live_config(config: &dyn ConfigPort) -> Result<(), ScaletraderError> {
    let equity = config.get_double("live", "equity", 0.0);
    if equity < 0.0 {
        return Err(invalid("live", "equity", "equity must be non-negative"));
    }
    let cash = config.get_double("live", "cash", 0.0);
    if cash < 0.0 {
        return Err(invalid("live", "cash", "cash must be non-negative"));
    }
    Ok(())
}

fn invalid(section: &str, key: &str, reason: &str) -> ScaletraderError {
    ScaletraderError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: reason.to_string(),
    }
}

fn validate_ma_windows(config: &dyn ConfigPort) -> Result<(), ScaletraderError> {
    let defaults = StrategyParams::default();
    let fast = config.get_int("strategy", "ma_fast", defaults.ma_fast as i64);
    let slow = config.get_int("strategy", "ma_slow", defaults.ma_slow as i64);
    let trend = config.get_int("strategy", "ma_trend", defaults.ma_trend as i64);

    for (key, value) in [("ma_fast", fast), ("ma_slow", slow), ("ma_trend", trend)] {
        if value < 1 {
            return Err(invalid("strategy", key, &format!("{key} must be at least 1")));
        }
    }
    if fast >= slow {
        return Err(invalid("strategy", "ma_fast", "ma_fast must be shorter than ma_slow"));
    }
    Ok(())
}

fn validate_buy_pct(config: &dyn ConfigPort) -> Result<(), ScaletraderError> {
    let value = config.get_double("strategy", "buy_pct", StrategyParams::default().buy_pct);
    if value <= 0.0 || value > 1.0 {
        return Err(invalid("strategy", "buy_pct", "buy_pct must be in (0, 1]"));
    }
    Ok(())
}

fn validate_take_profit(config: &dyn ConfigPort) -> Result<(), ScaletraderError> {
    let defaults = StrategyParams::default();
    let tp1 = config.get_double("strategy", "tp1_pct", defaults.tp1_pct);
    if tp1 <= 0.0 {
        return Err(invalid("strategy", "tp1_pct", "tp1_pct must be positive"));
    }
    let tp2 = config.get_double("strategy", "tp2_pct", defaults.tp2_pct);
    if tp2 <= tp1 {
        return Err(invalid("strategy", "tp2_pct", "tp2_pct must be greater than tp1_pct"));
    }
    Ok(())
}

fn validate_stop_loss(config: &dyn ConfigPort) -> Result<(), ScaletraderError> {
    let value = config.get_double("strategy", "sl_pct", StrategyParams::default().sl_pct);
    if value < 0.0 {
        return Err(invalid("strategy", "sl_pct", "sl_pct must be non-negative (0 disables)"));
    }
    Ok(())
}

fn validate_tp1_sell_fraction(config: &dyn ConfigPort) -> Result<(), ScaletraderError> {
    let value = config.get_double(
        "strategy",
        "tp1_sell_fraction",
        StrategyParams::default().tp1_sell_fraction,
    );
    if value <= 0.0 || value >= 1.0 {
        return Err(invalid(
            "strategy",
            "tp1_sell_fraction",
            "tp1_sell_fraction must be in (0, 1)",
        ));
    }
    Ok(())
}

fn validate_initial_capital(config: &dyn ConfigPort) -> Result<(), ScaletraderError> {
    let value = config.get_double(
        "backtest",
        "initial_capital",
        BacktestConfig::default().initial_capital,
    );
    if value <= 0.0 {
        return Err(invalid("backtest", "initial_capital", "initial_capital must be positive"));
    }
    Ok(())
}

fn validate_commission(config: &dyn ConfigPort) -> Result<(), ScaletraderError> {
    let value = config.get_double("backtest", "commission_pct", 0.0);
    if value < 0.0 {
        return Err(invalid("backtest", "commission_pct", "commission_pct must be non-negative"));
    }
    Ok(())
}

fn validate_slippage(config: &dyn ConfigPort) -> Result<(), ScaletraderError> {
    let value = config.get_double("backtest", "slippage_pct", 0.0);
    if value < 0.0 {
        return Err(invalid("backtest", "slippage_pct", "slippage_pct must be non-negative"));
    }
    Ok(())
}

fn validate_risk_free_rate(config: &dyn ConfigPort) -> Result<(), ScaletraderError> {
    let value = config.get_double("backtest", "risk_free_rate", 0.0);
    if !(0.0..1.0).contains(&value) {
        return Err(invalid("backtest", "risk_free_rate", "risk_free_rate must be between 0 and 1"));
    }
    Ok(())
}
