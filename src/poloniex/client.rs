//! Poloniex public market-data client
//!
//! One client covers both public APIs: the legacy `?command=` interface and
//! the `/markets/...` REST interface. Every method builds a [`Command`], runs
//! it through the [`Executor`] and shapes the JSON into typed records.

use std::collections::HashMap;

use serde_json::Value;
use tracing::debug;

use super::candles::CandleTable;
use super::command::Command;
use super::dates::DateInput;
use super::error::{ApiError, ApiResult, ParameterKind};
use super::executor::Executor;
use super::interval::{is_valid_chart_period, Interval};
use super::orderbook::{
    reshape_flat_levels, reshape_level_pairs, FlatBookPayload, LegacyBookPayload, OrderBook,
};
use super::paginator::{collect_pages, TradePages, TRADE_HISTORY};
use super::transport::{HttpTransport, Transport};
use super::types::{ChartBar, Currency, MarketPrice, MarketTrade, Ticker, Trade, Volume24h};
use crate::config::ClientConfig;

pub const DEFAULT_BOOK_SCALE: i32 = -1;
pub const DEFAULT_BOOK_LIMIT: u32 = 10;
pub const DEFAULT_TRADES_LIMIT: u32 = 500;
pub const DEFAULT_CANDLES_LIMIT: u32 = 100;

const CHART_DATA: &str = "returnChartData";

/// Blocking client for the public market-data endpoints
#[derive(Debug, Clone)]
pub struct PublicClient<T = HttpTransport> {
    executor: Executor<T>,
}

impl PublicClient<HttpTransport> {
    /// Client against the production endpoints
    pub fn new() -> Self {
        Self::with_config(ClientConfig::default())
    }

    pub fn with_config(config: ClientConfig) -> Self {
        Self {
            executor: Executor::new(config),
        }
    }

    /// Client configured from `POLONIEX_PUBLIC_URL` / `POLONIEX_MARKETS_URL`
    pub fn from_env() -> Self {
        Self::with_config(ClientConfig::from_env())
    }
}

impl Default for PublicClient<HttpTransport> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Transport> PublicClient<T> {
    pub fn with_transport(transport: T, config: ClientConfig) -> Self {
        Self {
            executor: Executor::with_transport(transport, config),
        }
    }

    pub fn executor(&self) -> &Executor<T> {
        &self.executor
    }

    // =========================================================================
    // Legacy API
    // =========================================================================

    /// Summary for every currency pair, keyed by pair
    pub fn tickers(&self) -> ApiResult<HashMap<String, Ticker>> {
        self.executor.execute_as(&Command::legacy("returnTicker"))
    }

    /// 24-hour volume per market plus totals for the primary currencies
    pub fn volume_24h(&self) -> ApiResult<Volume24h> {
        self.executor.execute_as(&Command::legacy("return24hVolume"))
    }

    /// Currency details, keyed by currency code
    pub fn currencies(&self) -> ApiResult<HashMap<String, Currency>> {
        self.executor.execute_as(&Command::legacy("returnCurrencies"))
    }

    /// Order book for one pair. `depth` is passed through as given.
    pub fn order_book(&self, pair: &str, depth: u32) -> ApiResult<OrderBook> {
        let command = Command::legacy("returnOrderBook")
            .param("currencyPair", pair)
            .param("depth", depth);
        let payload: LegacyBookPayload = self.executor.execute_as(&command)?;
        debug!(
            "Order book {}: {} asks, {} bids, seq {:?}, frozen {}",
            pair,
            payload.asks.len(),
            payload.bids.len(),
            payload.seq,
            payload.is_frozen
        );

        Ok(OrderBook {
            asks: reshape_level_pairs(&payload.asks).map_err(|e| ApiError::request(&command, e))?,
            bids: reshape_level_pairs(&payload.bids).map_err(|e| ApiError::request(&command, e))?,
        })
    }

    /// Candlestick data for one pair.
    ///
    /// `period` must be one of [`CHART_PERIODS`](super::interval::CHART_PERIODS);
    /// anything else fails before a request is made.
    pub fn chart_data(
        &self,
        pair: &str,
        period: u32,
        start: impl Into<DateInput>,
        end: impl Into<DateInput>,
    ) -> ApiResult<Vec<ChartBar>> {
        if !is_valid_chart_period(period) {
            return Err(ApiError::invalid(ParameterKind::BadPeriod, CHART_DATA, period));
        }
        let start = start.into().secs_for(CHART_DATA)?;
        let end = end.into().secs_for(CHART_DATA)?;

        let command = Command::legacy(CHART_DATA)
            .param("currencyPair", pair)
            .param("start", start)
            .param("end", end)
            .param("period", period);
        self.executor.execute_as(&command)
    }

    /// Every trade of `pair` inside `[start, end]`, newest first
    pub fn trade_history(
        &self,
        pair: &str,
        start: impl Into<DateInput>,
        end: impl Into<DateInput>,
    ) -> ApiResult<Vec<Trade>> {
        collect_pages(self.trade_history_pages(pair, start, end)?)
    }

    /// Same walk as [`trade_history`](Self::trade_history), one page per
    /// `next()`. Nothing is requested until the first page is pulled.
    pub fn trade_history_pages(
        &self,
        pair: &str,
        start: impl Into<DateInput>,
        end: impl Into<DateInput>,
    ) -> ApiResult<TradePages<'_, T>> {
        let start = start.into().secs_for(TRADE_HISTORY)?;
        let end = end.into().secs_for(TRADE_HISTORY)?;
        Ok(TradePages::new(&self.executor, pair, start, end))
    }

    // =========================================================================
    // Markets API
    // =========================================================================

    /// Latest price for one symbol
    pub fn price(&self, symbol: &str) -> ApiResult<MarketPrice> {
        let command = Command::market(format!("/markets/{}/price", symbol));
        self.executor.execute_as(&command)
    }

    /// Order book for one symbol. `scale` and `limit` are passed through.
    pub fn market_order_book(&self, symbol: &str, scale: i32, limit: u32) -> ApiResult<OrderBook> {
        let command = Command::market(format!("/markets/{}/orderBook", symbol))
            .param("scale", scale)
            .param("limit", limit);
        let payload: FlatBookPayload = self.executor.execute_as(&command)?;
        debug!(
            "Order book {}: {} ask cells, {} bid cells, ts {:?}",
            symbol,
            payload.asks.len(),
            payload.bids.len(),
            payload.ts
        );

        Ok(OrderBook {
            asks: reshape_flat_levels(&payload.asks).map_err(|e| ApiError::request(&command, e))?,
            bids: reshape_flat_levels(&payload.bids).map_err(|e| ApiError::request(&command, e))?,
        })
    }

    /// Most recent trades for one symbol
    pub fn trades(&self, symbol: &str, limit: u32) -> ApiResult<Vec<MarketTrade>> {
        let command = Command::market(format!("/markets/{}/trades", symbol)).param("limit", limit);
        self.executor.execute_as(&command)
    }

    /// Candles for one symbol as a typed table.
    ///
    /// `interval` must be an [`Interval`] name such as `HOUR_4`; an unknown
    /// name fails before a request is made. Window bounds are sent as epoch
    /// milliseconds.
    pub fn candles(
        &self,
        symbol: &str,
        interval: &str,
        limit: u32,
        start_time: Option<DateInput>,
        end_time: Option<DateInput>,
    ) -> ApiResult<CandleTable> {
        let path = format!("/markets/{}/candles", symbol);
        let interval = Interval::from_name(interval).map_err(|_| {
            ApiError::invalid(ParameterKind::BadPeriod, path.as_str(), interval)
        })?;
        let start_time = start_time.map(|d| d.millis_for(&path)).transpose()?;
        let end_time = end_time.map(|d| d.millis_for(&path)).transpose()?;

        let command = Command::market(path)
            .param("interval", interval)
            .param("limit", limit)
            .param_opt("startTime", start_time)
            .param_opt("endTime", end_time);
        let raw: Vec<Vec<Value>> = self.executor.execute_as(&command)?;

        CandleTable::from_raw(symbol, &raw).map_err(|e| ApiError::request(&command, e))
    }

    /// Length of a named candle interval in seconds
    pub fn interval_seconds(&self, name: &str) -> ApiResult<u64> {
        Interval::from_name(name).map(|interval| interval.seconds())
    }
}
