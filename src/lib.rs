//! Poloniex Public API
//!
//! A blocking client for Poloniex's public market-data endpoints: tickers,
//! volumes, currencies, order books, chart data and candles, plus a
//! backward-paginating trade-history downloader.

pub mod config;
pub mod poloniex;

pub use config::ClientConfig;
pub use poloniex::{ApiError, ApiResult, PublicClient};
