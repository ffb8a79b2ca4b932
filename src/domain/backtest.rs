//! Backtest driver: replays a bar series through the engine and a
//! simulated broker.
//!
//! Per bar the account is marked to the bar close, the engine is evaluated
//! with that equity and the free cash, and any proposed action is filled
//! immediately. A refused fill is rejected back to the engine, so the same
//! action can be proposed again on a later bar. Warm-up and invalid-price
//! bars are skipped; ledger invariant violations abort the run.

use chrono::NaiveDate;
use tracing::{debug, info, warn};

use super::engine::Engine;
use super::error::ScaletraderError;
use super::execution::{ExecutionConfig, SimBroker};
use super::ledger::StrategyState;
use super::ohlcv::{self, PriceBar};
use super::strategy::StrategyParams;
use super::trade_log::{Action, TradeEvent};

#[derive(Debug, Clone, PartialEq)]
pub struct BacktestConfig {
    pub initial_capital: f64,
    pub commission_pct: f64,
    pub slippage_pct: f64,
    pub risk_free_rate: f64,
}

impl Default for BacktestConfig {
    fn default() -> Self {
        BacktestConfig {
            initial_capital: 80_000.0,
            commission_pct: 0.0005,
            slippage_pct: 0.0003,
            risk_free_rate: 0.0,
        }
    }
}

impl BacktestConfig {
    pub fn execution_config(&self) -> ExecutionConfig {
        ExecutionConfig {
            commission_pct: self.commission_pct,
            slippage_pct: self.slippage_pct,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EquityPoint {
    pub date: NaiveDate,
    pub equity: f64,
}

#[derive(Debug, Clone)]
pub struct BacktestResult {
    pub initial_capital: f64,
    pub final_cash: f64,
    pub final_position: f64,
    pub total_commission: f64,
    pub state: StrategyState,
    pub actions: Vec<(NaiveDate, Action)>,
    pub trades: Vec<TradeEvent>,
    pub rejected: usize,
    pub equity_curve: Vec<EquityPoint>,
}

impl BacktestResult {
    pub fn final_equity(&self) -> f64 {
        self.equity_curve
            .last()
            .map(|p| p.equity)
            .unwrap_or(self.initial_capital)
    }
}

pub fn run_backtest(
    bars: &[PriceBar],
    params: &StrategyParams,
    config: &BacktestConfig,
) -> Result<BacktestResult, ScaletraderError> {
    ohlcv::validate_series(bars)?;

    let mut engine = Engine::new(params.clone());
    let mut broker = SimBroker::new(config.initial_capital, config.execution_config());
    let mut actions = Vec::new();
    let mut trades = Vec::new();
    let mut rejected = 0usize;
    let mut equity_curve = Vec::with_capacity(bars.len());
    let mut mark: Option<f64> = None;

    info!(
        bars = bars.len(),
        initial_capital = config.initial_capital,
        "backtest started"
    );

    for bar in bars {
        if bar.close.is_finite() && bar.close > 0.0 {
            mark = Some(bar.close);
        }
        let mark_price = mark.unwrap_or(0.0);
        let equity = broker.equity(mark_price);

        match engine.evaluate(bar, equity, broker.cash()) {
            Ok(Some(action)) => {
                actions.push((bar.date, action));
                match broker.execute(&action) {
                    Ok(fill) => trades.push(engine.confirm(&fill)?),
                    Err(e) => {
                        warn!(date = %bar.date, error = %e, "fill refused");
                        engine.reject()?;
                        rejected += 1;
                    }
                }
            }
            Ok(None) => {}
            Err(e) if e.is_skippable() => {
                debug!(date = %bar.date, reason = %e, "bar skipped");
            }
            Err(e) => return Err(e.into()),
        }

        equity_curve.push(EquityPoint {
            date: bar.date,
            equity: broker.equity(mark_price),
        });
    }

    let result = BacktestResult {
        initial_capital: config.initial_capital,
        final_cash: broker.cash(),
        final_position: broker.position(),
        total_commission: broker.total_commission(),
        state: engine.into_state(),
        actions,
        trades,
        rejected,
        equity_curve,
    };
    info!(
        fills = result.trades.len(),
        rejected = result.rejected,
        final_equity = result.final_equity(),
        "backtest finished"
    );
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::position::{ExitReason, Side};
    use crate::domain::trade_log::Operation;

    fn bars(closes: &[f64]) -> Vec<PriceBar> {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        closes
            .iter()
            .enumerate()
            .map(|(i, &c)| PriceBar::from_close(start + chrono::Duration::days(i as i64), c))
            .collect()
    }

    fn params() -> StrategyParams {
        StrategyParams {
            ma_fast: 2,
            ma_slow: 3,
            ma_trend: 4,
            buy_pct: 0.1,
            tp1_pct: 0.08,
            tp2_pct: 0.14,
            sl_pct: 0.18,
            tp1_sell_fraction: 0.9,
        }
    }

    fn frictionless() -> BacktestConfig {
        BacktestConfig {
            initial_capital: 10_000.0,
            commission_pct: 0.0,
            slippage_pct: 0.0,
            risk_free_rate: 0.0,
        }
    }

    #[test]
    fn default_config() {
        let c = BacktestConfig::default();
        assert!((c.initial_capital - 80_000.0).abs() < f64::EPSILON);
        assert!((c.commission_pct - 0.0005).abs() < f64::EPSILON);
        assert!((c.slippage_pct - 0.0003).abs() < f64::EPSILON);
        assert_eq!(c.execution_config().commission_pct, c.commission_pct);
    }

    #[test]
    fn flat_series_trades_nothing() {
        let result = run_backtest(&bars(&[100.0; 20]), &params(), &frictionless()).unwrap();
        assert!(result.trades.is_empty());
        assert!(result.state.is_empty());
        assert_eq!(result.equity_curve.len(), 20);
        assert!((result.final_equity() - 10_000.0).abs() < f64::EPSILON);
    }

    #[test]
    fn empty_series() {
        let result = run_backtest(&[], &params(), &frictionless()).unwrap();
        assert!(result.equity_curve.is_empty());
        assert!((result.final_equity() - 10_000.0).abs() < f64::EPSILON);
    }

    #[test]
    fn long_entry_then_staged_exit() {
        // dip entry at 104, then TP1 at 113 (+8.65%) and TP2 at 119 (+14.4%)
        let closes = [130.0, 120.0, 100.0, 95.0, 104.0, 113.0, 119.0];
        let result = run_backtest(&bars(&closes), &params(), &frictionless()).unwrap();

        let ops: Vec<(Operation, Option<ExitReason>)> =
            result.trades.iter().map(|t| (t.operation, t.reason)).collect();
        assert_eq!(
            ops,
            vec![
                (Operation::Open, None),
                (Operation::ExitPartial, Some(ExitReason::Tp1)),
                (Operation::ExitFull, Some(ExitReason::Tp2)),
            ]
        );
        assert!(result.state.entries(Side::Long).is_empty());
        assert_eq!(result.state.completed_long_trades, 1);
        assert!(result.final_position.abs() < 1e-9);
        assert!(result.final_equity() > 10_000.0);
    }

    #[test]
    fn refused_fill_is_rejected_and_counted() {
        // buy_pct 1.0 with commission makes the first long unaffordable
        let p = StrategyParams {
            buy_pct: 1.0,
            ..params()
        };
        let config = BacktestConfig {
            commission_pct: 0.01,
            ..frictionless()
        };
        let closes = [130.0, 120.0, 100.0, 95.0, 104.0];
        let result = run_backtest(&bars(&closes), &p, &config).unwrap();
        assert_eq!(result.actions.len(), 1);
        assert!(result.trades.is_empty());
        assert_eq!(result.rejected, 1);
        assert!(result.state.is_empty());
    }

    #[test]
    fn invalid_price_bar_is_skipped() {
        let closes = [100.0, 100.0, 0.0, 100.0, 100.0, 100.0];
        let result = run_backtest(&bars(&closes), &params(), &frictionless()).unwrap();
        assert!(result.trades.is_empty());
        assert_eq!(result.equity_curve.len(), 6);
    }

    #[test]
    fn unordered_bars_rejected() {
        let mut series = bars(&[100.0, 101.0]);
        series.swap(0, 1);
        let err = run_backtest(&series, &params(), &frictionless()).unwrap_err();
        assert!(matches!(err, ScaletraderError::Data { .. }));
    }
}
