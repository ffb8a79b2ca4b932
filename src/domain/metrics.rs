//! Performance metrics for a finished backtest.
//!
//! Returns are annualised on a 365-day year (bars are daily and markets
//! trade every day). Win/loss statistics are computed per exit fill, since
//! a staged exit realises profit in several pieces.

use super::backtest::{BacktestResult, EquityPoint};
use super::position::ExitReason;
use super::trade_log::TradeEvent;

const PERIODS_PER_YEAR: f64 = 365.0;

#[derive(Debug, Clone, PartialEq)]
pub struct Metrics {
    pub final_equity: f64,
    pub total_return: f64,
    pub annualized_return: f64,
    pub sharpe_ratio: f64,
    pub sortino_ratio: f64,
    pub max_drawdown: f64,
    pub max_drawdown_duration: i64,
    pub entries_opened: usize,
    pub tp1_exits: usize,
    pub tp2_exits: usize,
    pub stop_loss_exits: usize,
    pub completed_long_trades: u64,
    pub completed_short_trades: u64,
    pub exits_won: usize,
    pub exits_lost: usize,
    pub win_rate: f64,
    pub profit_factor: f64,
    pub largest_win: f64,
    pub largest_loss: f64,
    pub realized_pnl: f64,
    pub total_commission: f64,
}

impl Metrics {
    pub fn compute(result: &BacktestResult, risk_free_rate: f64) -> Self {
        let equity_curve = &result.equity_curve;
        let initial_capital = result.initial_capital;
        let final_equity = result.final_equity();

        let total_return = if initial_capital > 0.0 {
            final_equity / initial_capital - 1.0
        } else {
            0.0
        };

        let periods = equity_curve.len() as f64;
        let annualized_return = if periods > 0.0 && total_return > -1.0 {
            (1.0 + total_return).powf(PERIODS_PER_YEAR / periods) - 1.0
        } else {
            0.0
        };

        let (max_drawdown, max_drawdown_duration) = compute_drawdown(equity_curve);

        let daily_rf = risk_free_rate / PERIODS_PER_YEAR;
        let (sharpe_ratio, sortino_ratio) = compute_risk_adjusted(equity_curve, daily_rf);

        let stats = ExitStats::from_events(&result.trades);

        Metrics {
            final_equity,
            total_return,
            annualized_return,
            sharpe_ratio,
            sortino_ratio,
            max_drawdown,
            max_drawdown_duration,
            entries_opened: stats.opened,
            tp1_exits: stats.tp1,
            tp2_exits: stats.tp2,
            stop_loss_exits: stats.stop_loss,
            completed_long_trades: result.state.completed_long_trades,
            completed_short_trades: result.state.completed_short_trades,
            exits_won: stats.won,
            exits_lost: stats.lost,
            win_rate: stats.win_rate(),
            profit_factor: stats.profit_factor(),
            largest_win: stats.largest_win,
            largest_loss: stats.largest_loss,
            realized_pnl: stats.total_wins - stats.total_losses,
            total_commission: result.total_commission,
        }
    }
}

#[derive(Debug, Default)]
struct ExitStats {
    opened: usize,
    tp1: usize,
    tp2: usize,
    stop_loss: usize,
    won: usize,
    lost: usize,
    breakeven: usize,
    total_wins: f64,
    total_losses: f64,
    largest_win: f64,
    largest_loss: f64,
}

impl ExitStats {
    fn from_events(events: &[TradeEvent]) -> Self {
        let mut stats = ExitStats::default();
        for event in events {
            match event.reason {
                None => {
                    stats.opened += 1;
                    continue;
                }
                Some(ExitReason::Tp1) => stats.tp1 += 1,
                Some(ExitReason::Tp2) => stats.tp2 += 1,
                Some(ExitReason::StopLoss) => stats.stop_loss += 1,
            }

            let pnl = event.realized_pnl;
            if pnl > 0.0 {
                stats.won += 1;
                stats.total_wins += pnl;
                stats.largest_win = stats.largest_win.max(pnl);
            } else if pnl < 0.0 {
                stats.lost += 1;
                stats.total_losses += pnl.abs();
                stats.largest_loss = stats.largest_loss.max(pnl.abs());
            } else {
                stats.breakeven += 1;
            }
        }
        stats
    }

    fn win_rate(&self) -> f64 {
        let total = self.won + self.lost + self.breakeven;
        if total > 0 {
            self.won as f64 / total as f64
        } else {
            0.0
        }
    }

    fn profit_factor(&self) -> f64 {
        if self.total_losses > 0.0 {
            self.total_wins / self.total_losses
        } else if self.total_wins > 0.0 {
            f64::INFINITY
        } else {
            0.0
        }
    }
}

/// Maximum peak-to-trough drawdown (fraction of peak) and the longest run
/// of bars spent below a peak.
fn compute_drawdown(equity_curve: &[EquityPoint]) -> (f64, i64) {
    let Some(first) = equity_curve.first() else {
        return (0.0, 0);
    };

    let mut peak = first.equity;
    let mut max_dd = 0.0_f64;
    let mut max_dd_duration = 0i64;
    let mut current_dd_duration = 0i64;

    for point in equity_curve {
        if point.equity >= peak {
            peak = point.equity;
            current_dd_duration = 0;
        } else if peak > 0.0 {
            max_dd = max_dd.max((peak - point.equity) / peak);
            current_dd_duration += 1;
            max_dd_duration = max_dd_duration.max(current_dd_duration);
        }
    }

    (max_dd, max_dd_duration)
}

fn compute_risk_adjusted(equity_curve: &[EquityPoint], daily_rf: f64) -> (f64, f64) {
    if equity_curve.len() < 2 {
        return (0.0, 0.0);
    }

    let returns: Vec<f64> = equity_curve
        .windows(2)
        .map(|w| {
            let prev = w[0].equity;
            if prev > 0.0 {
                (w[1].equity - prev) / prev
            } else {
                0.0
            }
        })
        .collect();

    let n = returns.len() as f64;
    let mean = returns.iter().sum::<f64>() / n;
    let variance = returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / n;
    let stddev = variance.sqrt();
    let excess_return = mean - daily_rf;

    let sharpe = if stddev > 0.0 {
        (excess_return / stddev) * PERIODS_PER_YEAR.sqrt()
    } else {
        0.0
    };

    let downside_variance = returns
        .iter()
        .filter(|&&r| r < daily_rf)
        .map(|&r| (r - daily_rf).powi(2))
        .sum::<f64>()
        / n;
    let downside_stddev = downside_variance.sqrt();

    let sortino = if downside_stddev > 0.0 {
        (excess_return / downside_stddev) * PERIODS_PER_YEAR.sqrt()
    } else {
        0.0
    };

    (sharpe, sortino)
}
