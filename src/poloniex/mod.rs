//! Poloniex public market-data API client
//! No API key needed; both the legacy `?command=` API and the `/markets` API.

mod candles;
mod client;
mod command;
mod dates;
mod error;
mod executor;
mod interval;
mod orderbook;
mod paginator;
mod transport;
mod types;

pub use candles::{
    CandleRow, CandleTable, COLUMNS as CANDLE_COLUMNS, RAW_COLUMNS as RAW_CANDLE_COLUMNS,
};
pub use client::{
    PublicClient, DEFAULT_BOOK_LIMIT, DEFAULT_BOOK_SCALE, DEFAULT_CANDLES_LIMIT,
    DEFAULT_TRADES_LIMIT,
};
pub use command::{ApiFlavor, Command};
pub use dates::{format_date, parse_date, parse_date_millis, DateInput, DATE_FORMAT};
pub use error::{ApiError, ApiResult, ParameterKind, RequestFailure};
pub use executor::Executor;
pub use interval::{is_valid_chart_period, Interval, CHART_PERIODS};
pub use orderbook::{reshape_flat_levels, reshape_level_pairs, OrderBook, OrderBookEntry};
pub use paginator::{collect_pages, TradePages};
pub use transport::{HttpTransport, Transport};
pub use types::*;
