//! Order book snapshots and the reshaping of both wire formats into one type

use itertools::Itertools;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

use super::error::RequestFailure;
use super::types::deserialize_flag;

/// Order book entry
#[derive(Debug, Clone, PartialEq)]
pub struct OrderBookEntry {
    pub price: f64,
    pub quantity: f64,
}

/// Order book snapshot: price (as sent by the server) -> quantity
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrderBook {
    pub asks: HashMap<String, f64>,
    pub bids: HashMap<String, f64>,
}

impl OrderBook {
    /// Get sorted bid entries (highest price first)
    pub fn sorted_bids(&self) -> Vec<OrderBookEntry> {
        let mut entries = parse_levels(&self.bids);
        entries.sort_by(|a, b| b.price.total_cmp(&a.price));
        entries
    }

    /// Get sorted ask entries (lowest price first)
    pub fn sorted_asks(&self) -> Vec<OrderBookEntry> {
        let mut entries = parse_levels(&self.asks);
        entries.sort_by(|a, b| a.price.total_cmp(&b.price));
        entries
    }

    /// Get best bid price
    pub fn best_bid(&self) -> Option<f64> {
        self.sorted_bids().first().map(|e| e.price)
    }

    /// Get best ask price
    pub fn best_ask(&self) -> Option<f64> {
        self.sorted_asks().first().map(|e| e.price)
    }

    /// Get bid-ask spread
    pub fn spread(&self) -> Option<f64> {
        match (self.best_bid(), self.best_ask()) {
            (Some(bid), Some(ask)) => Some(ask - bid),
            _ => None,
        }
    }
}

fn parse_levels(levels: &HashMap<String, f64>) -> Vec<OrderBookEntry> {
    levels
        .iter()
        .filter_map(|(price, quantity)| {
            Some(OrderBookEntry {
                price: price.parse().ok()?,
                quantity: *quantity,
            })
        })
        .collect()
}

/// Reshape `[price0, qty0, price1, qty1, ...]` into price -> quantity.
///
/// Even positions are keys, odd positions are cast to `f64`. A dangling
/// trailing price is dropped; a repeated price keeps the later quantity.
pub fn reshape_flat_levels(flat: &[Value]) -> Result<HashMap<String, f64>, RequestFailure> {
    flat.iter()
        .tuples()
        .map(|(price, quantity)| -> Result<(String, f64), RequestFailure> {
            Ok((price_key(price)?, quantity_of(quantity)?))
        })
        .collect()
}

/// Reshape `[[price, qty], ...]` into price -> quantity
pub fn reshape_level_pairs(
    pairs: &[(Value, Value)],
) -> Result<HashMap<String, f64>, RequestFailure> {
    pairs
        .iter()
        .map(|(price, quantity)| -> Result<(String, f64), RequestFailure> {
            Ok((price_key(price)?, quantity_of(quantity)?))
        })
        .collect()
}

fn price_key(value: &Value) -> Result<String, RequestFailure> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(RequestFailure::Malformed(format!(
            "order book price is not a string or number: {}",
            other
        ))),
    }
}

fn quantity_of(value: &Value) -> Result<f64, RequestFailure> {
    let quantity = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    };
    quantity.ok_or_else(|| {
        RequestFailure::Malformed(format!("order book quantity is not numeric: {}", value))
    })
}

/// `returnOrderBook` body
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct LegacyBookPayload {
    pub asks: Vec<(Value, Value)>,
    pub bids: Vec<(Value, Value)>,
    #[serde(default, deserialize_with = "deserialize_flag")]
    pub is_frozen: bool,
    #[serde(default)]
    pub seq: Option<u64>,
}

/// `/markets/{symbol}/orderBook` body
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct FlatBookPayload {
    pub asks: Vec<Value>,
    pub bids: Vec<Value>,
    #[serde(default)]
    pub ts: Option<i64>,
}
