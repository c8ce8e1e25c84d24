//! Candle table builder for `/markets/{symbol}/candles`
//!
//! The endpoint returns bare rows with no column names. Each row is labelled
//! with [`RAW_COLUMNS`], gets two derived sell-side columns, has its count and
//! time columns cast to integers and is stamped with the queried symbol. The
//! output column set and order is [`COLUMNS`].

use serde::Serialize;
use serde_json::Value;
use std::io::Write;
use tracing::debug;

use super::dates::format_date;
use super::error::RequestFailure;
use super::interval::Interval;

/// Column order of a raw candle row as sent by the server
pub const RAW_COLUMNS: [&str; 14] = [
    "low",
    "high",
    "open",
    "close",
    "amount",
    "quantity",
    "buyTakerAmount",
    "buyTakerQuantity",
    "tradeCount",
    "ts",
    "weightedAverage",
    "interval",
    "startTime",
    "closeTime",
];

/// Output columns, in order
pub const COLUMNS: [&str; 16] = [
    "symbol",
    "low",
    "high",
    "open",
    "close",
    "amount",
    "quantity",
    "buyTakerAmount",
    "buyTakerQuantity",
    "sellTakerAmount",
    "sellTakerQuantity",
    "tradeCount",
    "weightedAverage",
    "interval",
    "startTime",
    "closeTime",
];

/// One typed candle. Field order matches [`COLUMNS`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CandleRow {
    pub symbol: String,
    pub low: f64,
    pub high: f64,
    pub open: f64,
    pub close: f64,
    /// Quote currency volume
    pub amount: f64,
    /// Base currency volume
    pub quantity: f64,
    pub buy_taker_amount: f64,
    pub buy_taker_quantity: f64,
    pub sell_taker_amount: f64,
    pub sell_taker_quantity: f64,
    pub trade_count: i64,
    pub weighted_average: f64,
    pub interval: Interval,
    /// Epoch milliseconds
    pub start_time: i64,
    /// Epoch milliseconds
    pub close_time: i64,
    /// Server timestamp of the row, epoch milliseconds; not an output column
    #[serde(skip)]
    pub ts: i64,
}

impl CandleRow {
    /// Build a row from one raw server row
    pub fn from_raw(symbol: &str, raw: &[Value]) -> Result<Self, RequestFailure> {
        if raw.len() < RAW_COLUMNS.len() {
            return Err(RequestFailure::Malformed(format!(
                "candle row has {} columns, expected {}",
                raw.len(),
                RAW_COLUMNS.len()
            )));
        }

        let real = |idx: usize| -> Result<f64, RequestFailure> {
            number(&raw[idx]).ok_or_else(|| bad_cell(idx, &raw[idx]))
        };
        let whole = |idx: usize| -> Result<i64, RequestFailure> {
            integer(&raw[idx]).ok_or_else(|| bad_cell(idx, &raw[idx]))
        };

        let amount = real(4)?;
        let quantity = real(5)?;
        let buy_taker_amount = real(6)?;
        let buy_taker_quantity = real(7)?;
        let interval: Interval =
            serde_json::from_value(raw[11].clone()).map_err(|_| bad_cell(11, &raw[11]))?;

        Ok(CandleRow {
            symbol: symbol.to_string(),
            low: real(0)?,
            high: real(1)?,
            open: real(2)?,
            close: real(3)?,
            amount,
            quantity,
            buy_taker_amount,
            buy_taker_quantity,
            sell_taker_amount: amount - buy_taker_amount,
            sell_taker_quantity: quantity - buy_taker_quantity,
            trade_count: whole(8)?,
            weighted_average: real(10)?,
            interval,
            start_time: whole(12)?,
            close_time: whole(13)?,
            ts: whole(9)?,
        })
    }
}

fn bad_cell(idx: usize, value: &Value) -> RequestFailure {
    RequestFailure::Malformed(format!(
        "candle column {} has unexpected value {}",
        RAW_COLUMNS[idx], value
    ))
}

fn number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

// Integer columns truncate toward zero when the server sends a fraction
fn integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().map(|f| f as i64))
        }
        _ => None,
    }
}

/// Typed candles for one symbol, in server order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CandleTable {
    rows: Vec<CandleRow>,
}

impl CandleTable {
    /// Label, derive and cast a raw candle matrix
    pub fn from_raw(symbol: &str, raw: &[Vec<Value>]) -> Result<Self, RequestFailure> {
        let rows = raw
            .iter()
            .map(|row| CandleRow::from_raw(symbol, row))
            .collect::<Result<Vec<_>, _>>()?;

        let table = CandleTable { rows };
        debug!("Candles shape: {} x {}", table.len(), COLUMNS.len());
        if let Some((min, max)) = table.start_time_range() {
            debug!(
                "Min ts: {} | Max ts: {}",
                format_date(min.div_euclid(1000)),
                format_date(max.div_euclid(1000))
            );
        }
        Ok(table)
    }

    pub fn columns(&self) -> &'static [&'static str] {
        &COLUMNS
    }

    pub fn rows(&self) -> &[CandleRow] {
        &self.rows
    }

    pub fn into_rows(self) -> Vec<CandleRow> {
        self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Earliest and latest `startTime`
    pub fn start_time_range(&self) -> Option<(i64, i64)> {
        let min = self.rows.iter().map(|r| r.start_time).min()?;
        let max = self.rows.iter().map(|r| r.start_time).max()?;
        Some((min, max))
    }

    /// Write the table as CSV with a [`COLUMNS`] header
    pub fn write_csv<W: Write>(&self, writer: W) -> csv::Result<()> {
        let mut wtr = csv::Writer::from_writer(writer);
        if self.rows.is_empty() {
            wtr.write_record(COLUMNS)?;
        }
        for row in &self.rows {
            wtr.serialize(row)?;
        }
        wtr.flush()?;
        Ok(())
    }
}

impl IntoIterator for CandleTable {
    type Item = CandleRow;
    type IntoIter = std::vec::IntoIter<CandleRow>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.into_iter()
    }
}
