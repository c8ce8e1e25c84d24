//! Poloniex public API - command line front end
//!
//! Subcommands:
//! - ticker, volume, currencies: legacy market summaries as JSON
//! - price, trades: markets API snapshots as JSON
//! - order-book: either API, printed as a ladder
//! - chart: legacy candlestick data as JSON
//! - candles: markets API candles as CSV
//! - trade-history: full trade history for a window, paginated into CSV

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod commands;

#[derive(Parser, Debug)]
#[command(name = "poloniex-public")]
#[command(about = "Poloniex public market data: tickers, order books, candles and trade history", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// JSON file with `legacy_url` / `markets_url` (defaults to environment)
    #[arg(short, long, global = true)]
    config: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Ticker for every pair, or one pair
    Ticker {
        /// Currency pair, e.g. "USDT_BTC"
        pair: Option<String>,
    },

    /// 24-hour volume for all markets
    Volume,

    /// Currency details
    Currencies,

    /// Latest price of a symbol
    Price {
        /// Market symbol, e.g. "BTC_USDT"
        symbol: String,
    },

    /// Order book of a market
    OrderBook {
        /// "BTC_USDT" for the markets API, "USDT_BTC" with --legacy
        market: String,

        /// Use the legacy returnOrderBook command
        #[arg(long)]
        legacy: bool,

        /// Depth (legacy only)
        #[arg(long, default_value = "50")]
        depth: u32,

        /// Price aggregation scale (markets only)
        #[arg(long, default_value = "-1", allow_hyphen_values = true)]
        scale: i32,

        /// Number of levels (markets only)
        #[arg(long, default_value = "10")]
        limit: u32,
    },

    /// Most recent trades of a symbol
    Trades {
        /// Market symbol, e.g. "BTC_USDT"
        symbol: String,

        #[arg(short, long, default_value = "500")]
        limit: u32,
    },

    /// Legacy candlestick chart data
    Chart {
        /// Currency pair, e.g. "USDT_BTC"
        pair: String,

        /// Period in seconds: 300, 900, 1800, 7200, 14400 or 86400
        #[arg(short, long, default_value = "300")]
        period: u32,

        /// Window start ("YYYY-MM-DD HH:MM:SS" UTC, or epoch seconds)
        #[arg(long)]
        start: String,

        /// Window end ("YYYY-MM-DD HH:MM:SS" UTC, or epoch seconds)
        #[arg(long)]
        end: String,
    },

    /// Markets API candles as CSV
    Candles {
        /// Market symbol, e.g. "BTC_USDT"
        symbol: String,

        /// Interval name, e.g. "MINUTE_5", "HOUR_4", "DAY_1"
        #[arg(short, long, default_value = "HOUR_1")]
        interval: String,

        #[arg(short, long, default_value = "100")]
        limit: u32,

        /// Window start ("YYYY-MM-DD HH:MM:SS" UTC, or epoch milliseconds)
        #[arg(long)]
        start: Option<String>,

        /// Window end ("YYYY-MM-DD HH:MM:SS" UTC, or epoch milliseconds)
        #[arg(long)]
        end: Option<String>,

        /// CSV output file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Download the full trade history of a window to CSV
    TradeHistory {
        /// Currency pair, e.g. "USDT_BTC"
        pair: String,

        /// Window start ("YYYY-MM-DD HH:MM:SS" UTC, or epoch seconds)
        #[arg(long)]
        start: String,

        /// Window end ("YYYY-MM-DD HH:MM:SS" UTC, or epoch seconds)
        #[arg(long)]
        end: String,

        /// CSV output file (defaults to {pair}_trades.csv)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

impl Commands {
    fn name(&self) -> &'static str {
        match self {
            Commands::Ticker { .. } => "ticker",
            Commands::Volume => "volume",
            Commands::Currencies => "currencies",
            Commands::Price { .. } => "price",
            Commands::OrderBook { .. } => "order_book",
            Commands::Trades { .. } => "trades",
            Commands::Chart { .. } => "chart",
            Commands::Candles { .. } => "candles",
            Commands::TradeHistory { .. } => "trade_history",
        }
    }
}

fn setup_logging(verbose: bool, command_name: &str) -> Result<()> {
    std::fs::create_dir_all("logs")?;

    // {command}_{date}.log
    let log_filename = format!(
        "{}_{}.log",
        command_name,
        chrono::Local::now().format("%Y-%m-%d_%H-%M-%S")
    );
    let log_path = PathBuf::from("logs").join(&log_filename);

    // Keep the HTTP stack quiet even in verbose mode
    let level = if verbose { "debug" } else { "info" };
    let filter_str = format!(
        "{},hyper=warn,hyper_util=warn,reqwest=warn,rustls=warn,h2=warn",
        level
    );
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&filter_str));

    let file_appender = tracing_appender::rolling::never("logs", &log_filename);

    // Console goes to stderr so JSON/CSV on stdout stays clean
    let console_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_line_number(true)
        .with_file(true)
        .with_ansi(true);

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(file_appender)
        .with_target(true)
        .with_line_number(true)
        .with_file(true)
        .with_ansi(false);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .init();

    info!("Log file: {}", log_path.display());
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.command.name())?;

    let config = cli.config;
    match cli.command {
        Commands::Ticker { pair } => commands::market::ticker(config, pair),
        Commands::Volume => commands::market::volume(config),
        Commands::Currencies => commands::market::currencies(config),
        Commands::Price { symbol } => commands::market::price(config, symbol),
        Commands::OrderBook {
            market,
            legacy,
            depth,
            scale,
            limit,
        } => commands::market::order_book(config, market, legacy, depth, scale, limit),
        Commands::Trades { symbol, limit } => commands::market::trades(config, symbol, limit),
        Commands::Chart {
            pair,
            period,
            start,
            end,
        } => commands::market::chart(config, pair, period, start, end),
        Commands::Candles {
            symbol,
            interval,
            limit,
            start,
            end,
            output,
        } => commands::market::candles(config, symbol, interval, limit, start, end, output),
        Commands::TradeHistory {
            pair,
            start,
            end,
            output,
        } => commands::download::run(config, pair, start, end, output),
    }
}
