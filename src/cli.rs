//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::csv_trade_log_adapter::CsvTradeLogAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::json_state_adapter::JsonStateAdapter;
use crate::adapters::paper_execution_adapter::PaperExecutionAdapter;
use crate::domain::backtest::{self as backtest_engine, BacktestConfig};
use crate::domain::config_validation::{
    validate_backtest_config, validate_live_config, validate_strategy_config,
};
use crate::domain::error::ScaletraderError;
use crate::domain::indicator::IndicatorCalculator;
use crate::domain::ledger::StrategyState;
use crate::domain::live::{self, AccountSnapshot, LiveOutcome, LivePorts};
use crate::domain::metrics::Metrics;
use crate::domain::position::Side;
use crate::domain::strategy::StrategyParams;
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;
use crate::ports::state_port::StatePort;

const DEFAULT_SYMBOL: &str = "BTCUSDT";

#[derive(Parser, Debug)]
#[command(name = "scaletrader", about = "MA-crossover strategy with staged exits: backtest and daily live step")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Replay a bar history through the strategy
    Backtest {
        #[arg(short, long)]
        config: PathBuf,
        /// Bar CSV file or directory (overrides [data] path)
        #[arg(short, long)]
        data: Option<PathBuf>,
        #[arg(long)]
        symbol: Option<String>,
        /// Write every fill to this CSV file
        #[arg(short, long)]
        trades: Option<PathBuf>,
    },
    /// Evaluate the latest bar once and persist the state
    Live {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(short, long)]
        data: Option<PathBuf>,
        #[arg(long)]
        symbol: Option<String>,
        /// State file (overrides [live] state_path)
        #[arg(short, long)]
        state: Option<PathBuf>,
        #[arg(long)]
        equity: Option<f64>,
        #[arg(long)]
        cash: Option<f64>,
        /// Make the paper broker refuse every order
        #[arg(long)]
        reject: bool,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Print a saved strategy state
    State {
        #[arg(short, long)]
        state: PathBuf,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Backtest {
            config,
            data,
            symbol,
            trades,
        } => run_backtest(&config, data.as_ref(), symbol.as_deref(), trades.as_ref()),
        Command::Live {
            config,
            data,
            symbol,
            state,
            equity,
            cash,
            reject,
        } => run_live(&LiveArgs {
            config_path: config,
            data_path: data,
            symbol,
            state_path: state,
            equity,
            cash,
            reject,
        }),
        Command::Validate { config } => run_validate(&config),
        Command::State { state } => run_state(&state),
    }
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path).map_err(|e| {
        let err = ScaletraderError::ConfigParse {
            file: path.display().to_string(),
            reason: e.to_string(),
        };
        eprintln!("error: {err}");
        ExitCode::from(&err)
    })
}

fn fail(err: &ScaletraderError) -> ExitCode {
    eprintln!("error: {err}");
    err.into()
}

fn get_window(adapter: &dyn ConfigPort, key: &str, default: usize) -> Result<usize, ScaletraderError> {
    let value = adapter.get_int("strategy", key, default as i64);
    usize::try_from(value)
        .ok()
        .filter(|&v| v >= 1)
        .ok_or_else(|| ScaletraderError::ConfigInvalid {
            section: "strategy".into(),
            key: key.into(),
            reason: format!("{key} must be at least 1"),
        })
}

pub fn build_strategy_params(adapter: &dyn ConfigPort) -> Result<StrategyParams, ScaletraderError> {
    let d = StrategyParams::default();
    Ok(StrategyParams {
        ma_fast: get_window(adapter, "ma_fast", d.ma_fast)?,
        ma_slow: get_window(adapter, "ma_slow", d.ma_slow)?,
        ma_trend: get_window(adapter, "ma_trend", d.ma_trend)?,
        buy_pct: adapter.get_double("strategy", "buy_pct", d.buy_pct),
        tp1_pct: adapter.get_double("strategy", "tp1_pct", d.tp1_pct),
        tp2_pct: adapter.get_double("strategy", "tp2_pct", d.tp2_pct),
        sl_pct: adapter.get_double("strategy", "sl_pct", d.sl_pct),
        tp1_sell_fraction: adapter.get_double("strategy", "tp1_sell_fraction", d.tp1_sell_fraction),
    })
}

pub fn build_backtest_config(adapter: &dyn ConfigPort) -> BacktestConfig {
    let d = BacktestConfig::default();
    BacktestConfig {
        initial_capital: adapter.get_double("backtest", "initial_capital", d.initial_capital),
        commission_pct: adapter.get_double("backtest", "commission_pct", d.commission_pct),
        slippage_pct: adapter.get_double("backtest", "slippage_pct", d.slippage_pct),
        risk_free_rate: adapter.get_double("backtest", "risk_free_rate", d.risk_free_rate),
    }
}

pub fn resolve_data_path(
    data_override: Option<&PathBuf>,
    adapter: &dyn ConfigPort,
) -> Result<PathBuf, ScaletraderError> {
    if let Some(path) = data_override {
        return Ok(path.clone());
    }
    adapter
        .get_string("data", "path")
        .filter(|s| !s.trim().is_empty())
        .map(PathBuf::from)
        .ok_or_else(|| ScaletraderError::ConfigMissing {
            section: "data".into(),
            key: "path".into(),
        })
}

pub fn resolve_symbol(symbol_override: Option<&str>, adapter: &dyn ConfigPort) -> String {
    symbol_override
        .map(str::to_string)
        .or_else(|| adapter.get_string("data", "symbol"))
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_SYMBOL.to_string())
}

/// Load and validate the strategy parameters from a config file.
fn load_strategy(adapter: &FileConfigAdapter) -> Result<StrategyParams, ScaletraderError> {
    validate_strategy_config(adapter)?;
    build_strategy_params(adapter)
}

fn run_backtest(
    config_path: &Path,
    data_override: Option<&PathBuf>,
    symbol_override: Option<&str>,
    trades_path: Option<&PathBuf>,
) -> ExitCode {
    eprintln!("Loading config from {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    let params = match load_strategy(&adapter) {
        Ok(p) => p,
        Err(e) => return fail(&e),
    };
    if let Err(e) = validate_backtest_config(&adapter) {
        return fail(&e);
    }
    let bt_config = build_backtest_config(&adapter);

    let data_path = match resolve_data_path(data_override, &adapter) {
        Ok(p) => p,
        Err(e) => return fail(&e),
    };
    let symbol = resolve_symbol(symbol_override, &adapter);

    let bars = match CsvAdapter::new(data_path.clone()).fetch_bars(&symbol) {
        Ok(b) => b,
        Err(e) => return fail(&e),
    };
    let minimum = IndicatorCalculator::new(params.ma_fast, params.ma_slow, params.ma_trend)
        .required_history();
    if bars.len() < minimum {
        return fail(&ScaletraderError::InsufficientData {
            symbol,
            bars: bars.len(),
            minimum,
        });
    }

    eprintln!("===== Backtest Start =====");
    eprintln!("Data: {} ({} bars)", data_path.display(), bars.len());
    eprintln!(
        "Initial Cash: {:.2}, Commission: {}, Slippage: {}",
        bt_config.initial_capital, bt_config.commission_pct, bt_config.slippage_pct
    );

    let result = match backtest_engine::run_backtest(&bars, &params, &bt_config) {
        Ok(r) => r,
        Err(e) => return fail(&e),
    };
    let metrics = Metrics::compute(&result, bt_config.risk_free_rate);

    eprintln!("\n===== Summary =====");
    eprintln!("Final Value:      {:.4}", metrics.final_equity);
    eprintln!("Total Return:     {:.4}%", metrics.total_return * 100.0);
    eprintln!("Annual Return:    {:.4}%", metrics.annualized_return * 100.0);
    eprintln!("Max Drawdown:     {:.4}%", metrics.max_drawdown * 100.0);
    eprintln!("Sharpe Ratio:     {:.4}", metrics.sharpe_ratio);
    eprintln!("Sortino Ratio:    {:.4}", metrics.sortino_ratio);
    eprintln!("Entries Opened:   {}", metrics.entries_opened);
    eprintln!(
        "Exits:            {} TP1, {} TP2, {} SL",
        metrics.tp1_exits, metrics.tp2_exits, metrics.stop_loss_exits
    );
    eprintln!("Exit Win Rate:    {:.1}%", metrics.win_rate * 100.0);
    eprintln!("Profit Factor:    {:.2}", metrics.profit_factor);
    eprintln!("Realized PnL:     {:.2}", metrics.realized_pnl);
    eprintln!("Commission Paid:  {:.2}", metrics.total_commission);
    if result.rejected > 0 {
        eprintln!("Refused Orders:   {}", result.rejected);
    }
    eprintln!("Long Trades (Completed):  {}", metrics.completed_long_trades);
    eprintln!("Short Trades (Completed): {}", metrics.completed_short_trades);
    eprintln!(
        "Total Completed Entries:  {}",
        metrics.completed_long_trades + metrics.completed_short_trades
    );
    eprintln!(
        "Still Open:       {} long, {} short",
        result.state.long_entries.len(),
        result.state.short_entries.len()
    );

    if let Some(path) = trades_path {
        let mut log = CsvTradeLogAdapter::new(path.clone());
        if let Err(e) = log.append_all(&result.trades) {
            return fail(&e);
        }
        eprintln!("\nTrades written to: {}", path.display());
    }

    ExitCode::SUCCESS
}

pub struct LiveArgs {
    pub config_path: PathBuf,
    pub data_path: Option<PathBuf>,
    pub symbol: Option<String>,
    pub state_path: Option<PathBuf>,
    pub equity: Option<f64>,
    pub cash: Option<f64>,
    pub reject: bool,
}

fn run_live(args: &LiveArgs) -> ExitCode {
    let adapter = match load_config(&args.config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };
    let params = match load_strategy(&adapter) {
        Ok(p) => p,
        Err(e) => return fail(&e),
    };
    if let Err(e) = validate_backtest_config(&adapter).and_then(|_| validate_live_config(&adapter)) {
        return fail(&e);
    }

    let data_path = match resolve_data_path(args.data_path.as_ref(), &adapter) {
        Ok(p) => p,
        Err(e) => return fail(&e),
    };
    let symbol = resolve_symbol(args.symbol.as_deref(), &adapter);
    let state_path = args.state_path.clone().unwrap_or_else(|| {
        PathBuf::from(
            adapter
                .get_string("live", "state_path")
                .unwrap_or_else(|| "state.json".to_string()),
        )
    });
    let trade_log_path = PathBuf::from(
        adapter
            .get_string("live", "trade_log")
            .unwrap_or_else(|| "trades.csv".to_string()),
    );

    let initial_capital = build_backtest_config(&adapter).initial_capital;
    let equity = args
        .equity
        .unwrap_or_else(|| adapter.get_double("live", "equity", initial_capital));
    let cash = args
        .cash
        .unwrap_or_else(|| adapter.get_double("live", "cash", equity));
    let reject = args.reject || adapter.get_bool("live", "reject_orders", false);

    let data = CsvAdapter::new(data_path);
    let state = JsonStateAdapter::new(state_path);
    let exec_config = build_backtest_config(&adapter).execution_config();
    let mut execution = if reject {
        PaperExecutionAdapter::rejecting(exec_config)
    } else {
        PaperExecutionAdapter::new(exec_config)
    };
    let mut trade_log = CsvTradeLogAdapter::new(trade_log_path);

    let outcome = live::run_live_step(
        &symbol,
        &params,
        AccountSnapshot { equity, cash },
        LivePorts {
            data: &data,
            execution: &mut execution,
            state: &state,
            trade_log: &mut trade_log,
        },
    );

    match outcome {
        Ok(outcome) => {
            print_live_summary(&symbol, &outcome, equity, cash);
            ExitCode::SUCCESS
        }
        Err(e) => fail(&e),
    }
}

fn print_live_summary(symbol: &str, outcome: &LiveOutcome, equity: f64, cash: f64) {
    eprintln!("\n===== Strategy Daily Run =====");
    eprintln!("Symbol: {} | Bar: {} | Close: {:.2}", symbol, outcome.date, outcome.close);

    match (&outcome.event, &outcome.execution_error, &outcome.skipped) {
        (Some(event), _, _) => {
            eprintln!("\n--- Executed Order ---");
            eprintln!(
                "{} {} {} | size: {:.6} | price: {:.2} | pnl: {:.2}",
                event.order_side, event.side, event.operation, event.size, event.price, event.realized_pnl
            );
        }
        (None, Some(err), _) => eprintln!("\nOrder failed: {err}"),
        (None, None, Some(reason)) => eprintln!("\nBar skipped: {reason}"),
        (None, None, None) => eprintln!("\nNo orders executed on this run."),
    }

    eprintln!("\n--- Account ---");
    eprintln!("Equity: {:.2} | Cash: {:.2}", equity, cash);

    print_state(&outcome.state);
    eprintln!("==============================");
}

fn print_state(state: &StrategyState) {
    eprintln!("\n--- Strategy State ---");
    for side in [Side::Long, Side::Short] {
        eprintln!(
            "{} entries: {} (open size {:.6}), completed: {}",
            side,
            state.entries(side).len(),
            state.open_size(side),
            state.completed(side)
        );
        for (i, entry) in state.entries(side).iter().enumerate() {
            eprintln!(
                "  #{}: entry {:.2}, remaining {:.6}, tp1 {}",
                i,
                entry.entry_price,
                entry.remaining_size,
                if entry.tp1_done { "done" } else { "pending" }
            );
        }
    }
}

fn run_validate(config_path: &Path) -> ExitCode {
    eprintln!("Validating config: {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    let params = match load_strategy(&adapter) {
        Ok(p) => p,
        Err(e) => return fail(&e),
    };
    if let Err(e) = validate_backtest_config(&adapter).and_then(|_| validate_live_config(&adapter)) {
        return fail(&e);
    }

    let calc = IndicatorCalculator::new(params.ma_fast, params.ma_slow, params.ma_trend);
    let indicators: Vec<String> = calc.indicator_types().iter().map(|t| t.to_string()).collect();
    eprintln!("\nIndicators:   {}", indicators.join(", "));
    eprintln!("Warm-up bars: {}", calc.required_history());
    eprintln!(
        "Entry size:   {:.1}% of equity",
        params.buy_pct * 100.0
    );
    eprintln!(
        "Exits:        TP1 +{:.1}% (sell {:.0}%), TP2 +{:.1}%, SL {}",
        params.tp1_pct * 100.0,
        params.tp1_sell_fraction * 100.0,
        params.tp2_pct * 100.0,
        if params.sl_pct > 0.0 {
            format!("-{:.1}%", params.sl_pct * 100.0)
        } else {
            "disabled".to_string()
        }
    );
    eprintln!("\nConfiguration is valid.");
    ExitCode::SUCCESS
}

fn run_state(state_path: &Path) -> ExitCode {
    let adapter = JsonStateAdapter::new(state_path.to_path_buf());
    match adapter.load() {
        Ok(Some(state)) => {
            eprintln!("State file: {}", state_path.display());
            print_state(&state);
            ExitCode::SUCCESS
        }
        Ok(None) => {
            eprintln!("No state saved at {}", state_path.display());
            ExitCode::SUCCESS
        }
        Err(e) => fail(&e),
    }
}
